// Configuration constants for the server

use speech_core::DEFAULT_BASE_URL;

#[derive(Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Provider credential. Absence is a configuration error surfaced per
    /// request, not a startup failure.
    pub api_key: Option<String>,
    pub provider_base_url: String,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            api_key: None,
            provider_base_url: DEFAULT_BASE_URL.to_string(),
            cors_allowed_origins: None,
            static_dir: "static".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080);

        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let provider_base_url = std::env::var("OPENAI_BASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .ok()
            .map(|origins| origins.split(',').map(|s| s.trim().to_string()).collect());

        let static_dir = std::env::var("STATIC_DIR")
            .ok()
            .unwrap_or_else(|| "static".to_string());

        Self {
            port,
            api_key,
            provider_base_url,
            cors_allowed_origins,
            static_dir,
        }
    }
}
