use std::env;

/// Backend connection configuration.
///
/// Reads from the `VITAFIT_BACKEND_URL` environment variable, falling back to
/// `http://localhost:8000` when unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Base address of the planning backend, without a trailing slash.
    pub base_url: String,
}

impl BackendConfig {
    /// The default base address used when nothing else is configured.
    pub const DEFAULT_URL: &str = "http://localhost:8000";

    /// Environment variable consulted by [`Self::from_env`].
    pub const ENV_VAR: &str = "VITAFIT_BACKEND_URL";

    /// Build a config from the environment.
    ///
    /// Priority: `VITAFIT_BACKEND_URL` env var, then [`Self::DEFAULT_URL`].
    pub fn from_env() -> Self {
        let base_url = env::var(Self::ENV_VAR).unwrap_or_else(|_| Self::DEFAULT_URL.to_owned());
        Self::new(base_url)
    }

    /// Build a config from an explicit address (tests, CLI flags).
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// Full URL for an endpoint path such as `/predict_exercise`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_url() {
        let cfg = BackendConfig::new(BackendConfig::DEFAULT_URL);
        assert_eq!(cfg.base_url, "http://localhost:8000");
    }

    #[test]
    fn trailing_slashes_are_trimmed() {
        let cfg = BackendConfig::new("http://api.example.com:9000//");
        assert_eq!(cfg.base_url, "http://api.example.com:9000");
    }

    #[test]
    fn endpoint_joins_paths() {
        let cfg = BackendConfig::new("http://127.0.0.1:8000/");
        assert_eq!(cfg.endpoint("/ai/chat"), "http://127.0.0.1:8000/ai/chat");
        assert_eq!(cfg.endpoint("predict_diet"), "http://127.0.0.1:8000/predict_diet");
    }
}
