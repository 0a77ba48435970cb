//! ViaCEP API client
//!
//! Wire format: `GET {base}/ws/{cep}/json/` returns either the address
//! fields or `{"erro": true}` for a CEP that does not exist.

use crate::types::Address;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Everything that can go wrong between a submission and a populated form.
/// Display texts are what the message banner shows to the user.
#[derive(Error, Debug)]
pub enum LookupError {
    /// Input failed local validation; no request was made.
    #[error("CEP inválido. Digite 8 dígitos numéricos.")]
    InvalidCep,

    #[error("Formato de CEP inválido na requisição.")]
    BadRequest,

    #[error("Erro na requisição: {0}")]
    Http(u16),

    /// HTTP succeeded but the API flagged the CEP as nonexistent.
    #[error("CEP não encontrado.")]
    NotFound,

    #[error("Ocorreu um erro ao buscar o CEP: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Raw response body. All address fields are optional - the API omits what
/// it does not know.
#[derive(Deserialize)]
struct CepPayload {
    #[serde(default)]
    erro: bool,
    logradouro: Option<String>,
    bairro: Option<String>,
    localidade: Option<String>,
    uf: Option<String>,
}

impl From<CepPayload> for Address {
    fn from(payload: CepPayload) -> Self {
        Self {
            street: payload.logradouro.unwrap_or_default(),
            district: payload.bairro.unwrap_or_default(),
            city: payload.localidade.unwrap_or_default(),
            state: payload.uf.unwrap_or_default(),
        }
    }
}

/// Fetch the address for an already-normalized 8-digit CEP.
///
/// `base_url` is `constants::VIACEP_BASE_URL` in production and a mock
/// server in tests.
pub async fn fetch_address(
    client: &reqwest::Client,
    base_url: &str,
    cep: &str,
) -> Result<Address, LookupError> {
    let url = format!("{}/ws/{}/json/", base_url, cep);
    debug!(url = %url, "Fetching address");

    let response = client.get(&url).send().await?;
    let status = response.status();
    if !status.is_success() {
        if status == reqwest::StatusCode::BAD_REQUEST {
            return Err(LookupError::BadRequest);
        }
        return Err(LookupError::Http(status.as_u16()));
    }

    let payload: CepPayload = response.json().await?;
    if payload.erro {
        return Err(LookupError::NotFound);
    }
    Ok(payload.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn block_on<F: std::future::Future>(fut: F) -> F::Output {
        tokio::runtime::Runtime::new().unwrap().block_on(fut)
    }

    #[test]
    fn maps_full_payload_into_address() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/ws/01310100/json/");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "logradouro": "Rua X",
                    "bairro": "B",
                    "localidade": "C",
                    "uf": "ST"
                }));
        });

        let client = reqwest::Client::new();
        let address =
            block_on(fetch_address(&client, &server.base_url(), "01310100")).unwrap();

        mock.assert();
        assert_eq!(
            address,
            Address {
                street: "Rua X".into(),
                district: "B".into(),
                city: "C".into(),
                state: "ST".into(),
            }
        );
    }

    #[test]
    fn absent_fields_map_to_empty_strings() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/ws/01310100/json/");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({ "logradouro": "Rua X" }));
        });

        let client = reqwest::Client::new();
        let address =
            block_on(fetch_address(&client, &server.base_url(), "01310100")).unwrap();

        assert_eq!(address.street, "Rua X");
        assert_eq!(address.district, "");
        assert_eq!(address.city, "");
        assert_eq!(address.state, "");
    }

    #[test]
    fn erro_flag_is_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/ws/99999999/json/");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({ "erro": true }));
        });

        let client = reqwest::Client::new();
        let err =
            block_on(fetch_address(&client, &server.base_url(), "99999999")).unwrap_err();

        assert!(matches!(err, LookupError::NotFound));
        assert_eq!(err.to_string(), "CEP não encontrado.");
    }

    #[test]
    fn status_400_is_bad_request() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/ws/00000000/json/");
            then.status(400);
        });

        let client = reqwest::Client::new();
        let err =
            block_on(fetch_address(&client, &server.base_url(), "00000000")).unwrap_err();

        assert!(matches!(err, LookupError::BadRequest));
        assert_eq!(err.to_string(), "Formato de CEP inválido na requisição.");
    }

    #[test]
    fn other_non_2xx_carries_the_status_code() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/ws/01310100/json/");
            then.status(500);
        });

        let client = reqwest::Client::new();
        let err =
            block_on(fetch_address(&client, &server.base_url(), "01310100")).unwrap_err();

        assert!(matches!(err, LookupError::Http(500)));
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn malformed_body_is_a_transport_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/ws/01310100/json/");
            then.status(200)
                .header("Content-Type", "application/json")
                .body("not json");
        });

        let client = reqwest::Client::new();
        let err =
            block_on(fetch_address(&client, &server.base_url(), "01310100")).unwrap_err();

        assert!(matches!(err, LookupError::Transport(_)));
    }
}
