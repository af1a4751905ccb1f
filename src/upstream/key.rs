//! API key resolution.

use std::env;
use std::fmt;

/// Resolves the upstream API key for a request.
///
/// An inline configured key wins; otherwise the named environment variable
/// is consulted at call time, matching deployments where the secret is
/// injected into the process environment.
#[derive(Clone)]
pub struct ApiKeyProvider {
    configured: Option<String>,
    env_var: String,
}

/// The configured key must not reach a log line, so `Debug` only reports
/// whether one is present.
impl fmt::Debug for ApiKeyProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyProvider")
            .field("configured", &self.configured.as_ref().map(|_| "<redacted>"))
            .field("env_var", &self.env_var)
            .finish()
    }
}

impl ApiKeyProvider {
    pub fn new(configured: Option<String>, env_var: String) -> Self {
        Self { configured, env_var }
    }

    /// Resolve the key, or `None` when no source yields one.
    ///
    /// A non-unicode environment value counts as absent; the caller maps
    /// `None` to the configuration error response.
    pub fn resolve(&self) -> Option<String> {
        if let Some(key) = &self.configured {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }

        match env::var(&self.env_var) {
            Ok(key) if !key.is_empty() => Some(key),
            Ok(_) => None,
            Err(env::VarError::NotPresent) => None,
            Err(env::VarError::NotUnicode(_)) => {
                tracing::warn!(
                    variable = %self.env_var,
                    "API key environment variable is not valid unicode"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_key_wins() {
        let provider = ApiKeyProvider::new(
            Some("inline-key".to_string()),
            "PROMPT_PROXY_TEST_UNSET".to_string(),
        );
        assert_eq!(provider.resolve().as_deref(), Some("inline-key"));
    }

    #[test]
    fn empty_inline_key_falls_through_to_env() {
        let var = "PROMPT_PROXY_TEST_KEY_FALLTHROUGH";
        env::set_var(var, "env-key");
        let provider = ApiKeyProvider::new(Some(String::new()), var.to_string());
        assert_eq!(provider.resolve().as_deref(), Some("env-key"));
        env::remove_var(var);
    }

    #[test]
    fn absent_everywhere_is_none() {
        let provider =
            ApiKeyProvider::new(None, "PROMPT_PROXY_TEST_KEY_DEFINITELY_UNSET".to_string());
        assert_eq!(provider.resolve(), None);
    }

    #[test]
    fn empty_env_value_is_none() {
        let var = "PROMPT_PROXY_TEST_KEY_EMPTY";
        env::set_var(var, "");
        let provider = ApiKeyProvider::new(None, var.to_string());
        assert_eq!(provider.resolve(), None);
        env::remove_var(var);
    }

    #[test]
    fn debug_output_redacts_the_key() {
        let provider = ApiKeyProvider::new(
            Some("super-secret-value".to_string()),
            "GEMINI_API_KEY".to_string(),
        );
        let rendered = format!("{:?}", provider);
        assert!(!rendered.contains("super-secret-value"));
        assert!(rendered.contains("redacted"));
        assert!(rendered.contains("GEMINI_API_KEY"));
    }
}
