use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config::from_env()
});

pub const DEFAULT_PLACES_ENDPOINT: &str =
    "https://maps.googleapis.com/maps/api/place/textsearch/json";
pub const DEFAULT_DETAILS_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/place/details/json";
pub const DEFAULT_DIRECTIONS_ENDPOINT: &str =
    "https://maps.googleapis.com/maps/api/directions/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub google_maps: GoogleMapsConfig,
    pub classifier: ClassifierConfig,
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone)]
pub struct GoogleMapsConfig {
    /// Server-side key, sent on every provider call.
    pub api_key: String,
    /// Browser key, handed to the frontend and used in embeddable map links.
    pub client_key: Option<String>,
    pub places_endpoint: String,
    pub details_endpoint: String,
    pub directions_endpoint: String,
    pub max_results: usize,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub probe_timeout: Duration,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub static_dir: String,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Requests allowed per client within `rate_limit_window`.
    pub rate_limit: u32,
    pub rate_limit_window: Duration,
    pub allowed_origins: Vec<String>,
    pub client_api_key: Option<String>,
    pub body_limit_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Zero disables the search cache.
    pub ttl: Duration,
    pub purge_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            google_maps: GoogleMapsConfig {
                api_key: String::new(),
                client_key: None,
                places_endpoint: DEFAULT_PLACES_ENDPOINT.to_string(),
                details_endpoint: DEFAULT_DETAILS_ENDPOINT.to_string(),
                directions_endpoint: DEFAULT_DIRECTIONS_ENDPOINT.to_string(),
                max_results: 10,
                request_timeout: Duration::from_secs(10),
            },
            classifier: ClassifierConfig {
                base_url: "http://localhost:3000".to_string(),
                model: "llama2".to_string(),
                api_key: None,
                probe_timeout: Duration::from_secs(5),
                request_timeout: Duration::from_secs(30),
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3001,
                environment: Environment::Development,
                static_dir: "public".to_string(),
            },
            security: SecurityConfig {
                rate_limit: 100,
                rate_limit_window: Duration::from_secs(15 * 60),
                allowed_origins: vec![
                    "http://localhost:3001".to_string(),
                    "http://localhost:8080".to_string(),
                    "http://127.0.0.1:3001".to_string(),
                ],
                client_api_key: None,
                body_limit_bytes: 10 * 1024 * 1024,
            },
            cache: CacheConfig {
                ttl: Duration::from_secs(300),
                purge_interval: Duration::from_secs(60),
            },
        }
    }
}

impl Config {
    /// Build a config from the process environment, falling back to defaults
    /// for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Config::default();

        let api_key = get_env_or_default("GOOGLE_MAPS_API_KEY", "");
        if api_key.is_empty() {
            log::warn!("GOOGLE_MAPS_API_KEY is not set");
        }
        let client_key = get_env_opt("GOOGLE_MAPS_CLIENT_KEY");
        if client_key.is_none() {
            log::warn!("GOOGLE_MAPS_CLIENT_KEY is not set");
        }

        let llm_timeout_ms = get_env_parsed(
            "LLM_TIMEOUT",
            defaults.classifier.request_timeout.as_millis() as u64,
        );

        let allowed_origins = get_env_opt("ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.security.allowed_origins);

        Config {
            google_maps: GoogleMapsConfig {
                api_key,
                client_key,
                places_endpoint: get_env_or_default(
                    "GOOGLE_PLACES_ENDPOINT",
                    &defaults.google_maps.places_endpoint,
                ),
                details_endpoint: get_env_or_default(
                    "GOOGLE_DETAILS_ENDPOINT",
                    &defaults.google_maps.details_endpoint,
                ),
                directions_endpoint: get_env_or_default(
                    "GOOGLE_DIRECTIONS_ENDPOINT",
                    &defaults.google_maps.directions_endpoint,
                ),
                max_results: get_env_parsed("MAX_RESULTS", defaults.google_maps.max_results),
                request_timeout: defaults.google_maps.request_timeout,
            },
            classifier: ClassifierConfig {
                base_url: get_env_or_default("OPEN_WEBUI_URL", &defaults.classifier.base_url),
                model: get_env_or_default("OPEN_WEBUI_MODEL", &defaults.classifier.model),
                api_key: get_env_opt("OPEN_WEBUI_API_KEY"),
                probe_timeout: defaults.classifier.probe_timeout,
                request_timeout: Duration::from_millis(llm_timeout_ms),
            },
            server: ServerConfig {
                host: get_env_or_default("HOST", &defaults.server.host),
                port: get_env_parsed("PORT", defaults.server.port),
                environment: Environment::parse(&get_env_or_default("APP_ENV", "development")),
                static_dir: get_env_or_default("STATIC_DIR", &defaults.server.static_dir),
            },
            security: SecurityConfig {
                rate_limit: get_env_parsed("API_RATE_LIMIT", defaults.security.rate_limit),
                rate_limit_window: defaults.security.rate_limit_window,
                allowed_origins,
                client_api_key: get_env_opt("CLIENT_API_KEY"),
                body_limit_bytes: defaults.security.body_limit_bytes,
            },
            cache: CacheConfig {
                ttl: Duration::from_secs(get_env_parsed(
                    "CACHE_TTL_SECS",
                    defaults.cache.ttl.as_secs(),
                )),
                purge_interval: defaults.cache.purge_interval,
            },
        }
    }

    pub fn is_development(&self) -> bool {
        self.server.environment == Environment::Development
    }
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_parsed<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("invalid value for {key}: {raw:?}, using default {default}");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse("production"), Environment::Production);
        assert_eq!(Environment::parse(" PROD "), Environment::Production);
        assert_eq!(Environment::parse("staging"), Environment::Development);
        assert_eq!(Environment::parse(""), Environment::Development);
    }

    #[test]
    fn test_defaults_match_service_limits() {
        let config = Config::default();
        assert_eq!(config.google_maps.max_results, 10);
        assert_eq!(config.google_maps.request_timeout, Duration::from_secs(10));
        assert_eq!(config.classifier.probe_timeout, Duration::from_secs(5));
        assert_eq!(config.classifier.request_timeout, Duration::from_secs(30));
        assert_eq!(config.cache.ttl, Duration::from_secs(300));
        assert!(config.is_development());
    }
}
