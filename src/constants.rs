//! Application constants and configuration

pub const VIACEP_BASE_URL: &str = "https://viacep.com.br";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A CEP is valid once it has exactly this many digits.
pub const CEP_DIGITS: usize = 8;
