//! Lookup workflow: validate input, fetch the address, settle the form state

use super::App;
use crate::cep;
use crate::constants::VIACEP_BASE_URL;
use crate::types::{Address, LookupState};
use crate::viacep::{self, LookupError};
use eframe::egui;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Run one lookup to completion and settle the shared state.
///
/// The block after the awaited call is the single settle point - it runs on
/// every path (resolved, not-found, HTTP error, transport error), so the
/// spinner always hides and the submit control always re-enables once this
/// particular call resolves.
async fn run_lookup(
    cep: String,
    base_url: String,
    state: Arc<Mutex<LookupState>>,
    client: reqwest::Client,
    ctx: egui::Context,
) {
    let result = viacep::fetch_address(&client, &base_url, &cep).await;

    let mut s = state.lock().unwrap();
    s.active_count -= 1;
    match result {
        Ok(address) => {
            info!(cep = %cep, city = %address.city, "Lookup resolved");
            s.address = address;
            s.message = None;
        }
        Err(e) => {
            warn!(cep = %cep, error = %e, "Lookup failed");
            s.address = Address::default();
            s.message = Some(e.to_string());
        }
    }
    drop(s);
    ctx.request_repaint();
}

/// Validate raw input and kick off a lookup task. Validation failures are
/// recorded synchronously and never reach the network.
fn submit(
    raw_input: &str,
    state: &Arc<Mutex<LookupState>>,
    client: &reqwest::Client,
    runtime: &tokio::runtime::Runtime,
    ctx: &egui::Context,
    base_url: &str,
) {
    let cep = cep::normalize(raw_input);

    {
        let mut s = state.lock().unwrap();
        if !cep::is_valid(&cep) {
            s.message = Some(LookupError::InvalidCep.to_string());
            s.address = Address::default();
            return;
        }
        // Clear any previous error before the call goes out
        s.message = None;
        s.active_count += 1;
    }

    info!(cep = %cep, "Lookup started");
    runtime.spawn(run_lookup(
        cep,
        base_url.to_string(),
        state.clone(),
        client.clone(),
        ctx.clone(),
    ));
}

impl App {
    pub fn submit_lookup(&mut self, ctx: &egui::Context) {
        submit(
            &self.cep_input,
            &self.lookup_state,
            &self.http,
            &self.runtime,
            ctx,
            VIACEP_BASE_URL,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::time::{Duration, Instant};

    struct Harness {
        state: Arc<Mutex<LookupState>>,
        client: reqwest::Client,
        runtime: tokio::runtime::Runtime,
        ctx: egui::Context,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                state: Arc::new(Mutex::new(LookupState::default())),
                client: reqwest::Client::new(),
                runtime: tokio::runtime::Runtime::new().unwrap(),
                ctx: egui::Context::default(),
            }
        }

        fn submit(&self, raw: &str, base_url: &str) {
            submit(raw, &self.state, &self.client, &self.runtime, &self.ctx, base_url);
        }

        fn wait_settled(&self) {
            let deadline = Instant::now() + Duration::from_secs(5);
            while self.state.lock().unwrap().active_count > 0 {
                assert!(Instant::now() < deadline, "lookup never settled");
                std::thread::sleep(Duration::from_millis(10));
            }
        }
    }

    #[test]
    fn short_input_fails_locally_without_a_request() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET);
            then.status(200);
        });

        let h = Harness::new();
        h.submit("123", &server.base_url());

        let s = h.state.lock().unwrap();
        assert_eq!(s.active_count, 0);
        assert_eq!(
            s.message.as_deref(),
            Some("CEP inválido. Digite 8 dígitos numéricos.")
        );
        assert!(s.address.is_empty());
        drop(s);
        mock.assert_hits(0);
    }

    #[test]
    fn masked_input_is_sent_normalized_and_populates_the_form() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/ws/01310100/json/");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "logradouro": "Avenida Paulista",
                    "bairro": "Bela Vista",
                    "localidade": "São Paulo",
                    "uf": "SP"
                }));
        });

        let h = Harness::new();
        h.submit("01310-100", &server.base_url());
        h.wait_settled();

        mock.assert();
        let s = h.state.lock().unwrap();
        assert_eq!(s.address.street, "Avenida Paulista");
        assert_eq!(s.address.state, "SP");
        assert_eq!(s.message, None);
    }

    #[test]
    fn loading_brackets_the_call_even_on_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/ws/01310100/json/");
            then.status(500).delay(Duration::from_millis(100));
        });

        let h = Harness::new();
        h.submit("01310100", &server.base_url());
        assert_eq!(h.state.lock().unwrap().active_count, 1);

        h.wait_settled();
        let s = h.state.lock().unwrap();
        assert_eq!(s.active_count, 0);
        assert!(s.message.as_deref().unwrap().contains("500"));
        assert!(s.address.is_empty());
    }

    #[test]
    fn failed_lookup_clears_previously_populated_fields() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/ws/01310100/json/");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({ "logradouro": "Rua X", "uf": "ST" }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/ws/99999999/json/");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({ "erro": true }));
        });

        let h = Harness::new();
        h.submit("01310100", &server.base_url());
        h.wait_settled();
        assert!(!h.state.lock().unwrap().address.is_empty());

        h.submit("99999999", &server.base_url());
        h.wait_settled();
        let s = h.state.lock().unwrap();
        assert!(s.address.is_empty());
        assert_eq!(s.message.as_deref(), Some("CEP não encontrado."));
    }

    #[test]
    fn new_submission_clears_a_previous_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/ws/01310100/json/");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({ "logradouro": "Rua X" }));
        });

        let h = Harness::new();
        h.submit("123", &server.base_url());
        assert!(h.state.lock().unwrap().message.is_some());

        h.submit("01310-100", &server.base_url());
        h.wait_settled();
        assert_eq!(h.state.lock().unwrap().message, None);
    }

    #[test]
    fn unreachable_host_surfaces_a_transport_message() {
        let h = Harness::new();
        // Port 9 (discard) refuses connections on loopback
        h.submit("01310100", "http://127.0.0.1:9");
        h.wait_settled();

        let s = h.state.lock().unwrap();
        assert!(s
            .message
            .as_deref()
            .unwrap()
            .starts_with("Ocorreu um erro ao buscar o CEP"));
        assert!(s.address.is_empty());
    }
}
