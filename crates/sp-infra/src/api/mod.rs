//! Preferences backends.

mod http;
mod in_memory;
mod wire;

use serde::{Deserialize, Serialize};

pub use http::{HttpPreferenceApi, HttpPreferenceApiConfig};
pub use in_memory::{ApiOperation, InMemoryPreferenceApi, LatencyConfig};

/// Backend selected at wiring time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiBackend {
    #[default]
    Mock,
    Http,
}

impl std::str::FromStr for ApiBackend {
    type Err = UnknownBackend;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mock" | "memory" => Ok(Self::Mock),
            "http" => Ok(Self::Http),
            _ => Err(UnknownBackend(value.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown preferences backend: {0} (expected \"mock\" or \"http\")")]
pub struct UnknownBackend(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_names() {
        assert_eq!("mock".parse::<ApiBackend>().unwrap(), ApiBackend::Mock);
        assert_eq!(" HTTP ".parse::<ApiBackend>().unwrap(), ApiBackend::Http);
        assert!("grpc".parse::<ApiBackend>().is_err());
    }
}
