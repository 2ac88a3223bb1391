/// Environment variable naming the storage emulator host, as understood by the Cloud SDKs.
pub const EMULATOR_HOST_ENV: &str = "STORAGE_EMULATOR_HOST";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the emulator. The JSON API lives under `/storage/v1` of this endpoint.
    pub endpoint: String,
    pub project_id: String,
    pub bucket: String,
    pub object_name: String,
    pub content: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:4443".to_string(),
            project_id: "test-project".to_string(),
            bucket: "test-bucket".to_string(),
            object_name: "test-file.txt".to_string(),
            content: "Hello, this is a test file for GCS emulator!".to_string(),
        }
    }
}

impl Config {
    /// Default configuration with the endpoint taken from `STORAGE_EMULATOR_HOST` when it is set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(host) = std::env::var(EMULATOR_HOST_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
        {
            config.endpoint = normalize_endpoint(host.trim());
        }
        config
    }
}

/// The emulator host is commonly given as `host:port`; the client needs a full URL.
fn normalize_endpoint(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = Config::default();
        assert_eq!(config.endpoint, "http://localhost:4443");
        assert_eq!(config.project_id, "test-project");
        assert_eq!(config.bucket, "test-bucket");
        assert_eq!(config.object_name, "test-file.txt");
    }

    #[test]
    fn test_from_env_without_override() {
        temp_env::with_var_unset(EMULATOR_HOST_ENV, || {
            assert_eq!(Config::from_env(), Config::default());
        });
    }

    #[test]
    fn test_from_env_host_port() {
        temp_env::with_var(EMULATOR_HOST_ENV, Some("127.0.0.1:9023"), || {
            assert_eq!(Config::from_env().endpoint, "http://127.0.0.1:9023");
        });
    }

    #[test]
    fn test_from_env_full_url() {
        temp_env::with_var(EMULATOR_HOST_ENV, Some("https://gcs.internal:8443/"), || {
            assert_eq!(Config::from_env().endpoint, "https://gcs.internal:8443");
        });
    }

    #[test]
    fn test_from_env_blank_is_ignored() {
        temp_env::with_var(EMULATOR_HOST_ENV, Some("  "), || {
            assert_eq!(Config::from_env().endpoint, Config::default().endpoint);
        });
    }
}
