//! Chat client factory.
//!
//! Creates chat clients based on application configuration. Handles
//! provider resolution and secret injection.

use crate::client::ChatClient;
use crate::providers::OpenAiClient;
use ragline_core::{AppError, AppResult};
use std::sync::Arc;

/// Create a chat client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("openai")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key (required for all current providers)
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or a required
/// secret is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn ChatClient>> {
    match provider.to_lowercase().as_str() {
        "openai" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("OpenAI provider requires an API key".to_string())
            })?;

            let client = match endpoint {
                Some(url) => OpenAiClient::with_base_url(api_key, url),
                None => OpenAiClient::new(api_key),
            };
            Ok(Arc::new(client))
        }
        _ => Err(AppError::Config(format!(
            "Unknown chat provider: {}",
            provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_openai_client() {
        let client = create_client("openai", None, Some("sk-test"));
        assert!(client.is_ok());
        assert_eq!(client.unwrap().provider_name(), "openai");
    }

    #[test]
    fn test_create_openai_with_custom_endpoint() {
        let client = create_client("openai", Some("http://localhost:8080/v1"), Some("sk-test"));
        assert!(client.is_ok());
    }

    #[test]
    fn test_openai_requires_api_key() {
        match create_client("openai", None, None) {
            Err(err) => assert!(err.to_string().contains("requires an API key")),
            Ok(_) => panic!("Expected error for OpenAI without API key"),
        }
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", None, Some("key")) {
            Err(err) => assert!(err.to_string().contains("Unknown chat provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
