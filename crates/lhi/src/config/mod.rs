use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;

use crate::access::{MasterCode, ProductType};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub admin: AdminConfig,
    pub access: AccessConfig,
    pub narrative: NarrativeConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let admin = AdminConfig {
            email: env::var("ADMIN_EMAIL").unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.to_string()),
            name: env::var("ADMIN_NAME").unwrap_or_else(|_| DEFAULT_ADMIN_NAME.to_string()),
            password: env::var("ADMIN_PASSWORD")
                .ok()
                .filter(|value| !value.is_empty())
                .map(SecretString::from),
            session_ttl_minutes: parse_number(
                "ADMIN_SESSION_TTL_MINUTES",
                DEFAULT_SESSION_TTL_MINUTES,
            )?,
        };

        let access = AccessConfig {
            master_codes: match env::var("ACCESS_MASTER_CODES") {
                Ok(raw) => parse_master_codes(&raw)?,
                Err(_) => Vec::new(),
            },
        };

        let narrative = NarrativeConfig {
            api_key: env::var("NARRATIVE_API_KEY")
                .ok()
                .filter(|value| !value.is_empty())
                .map(SecretString::from),
            api_base: env::var("NARRATIVE_API_BASE")
                .unwrap_or_else(|_| DEFAULT_NARRATIVE_API_BASE.to_string()),
            model: env::var("NARRATIVE_MODEL")
                .unwrap_or_else(|_| DEFAULT_NARRATIVE_MODEL.to_string()),
            timeout_secs: parse_number("NARRATIVE_TIMEOUT_SECS", DEFAULT_NARRATIVE_TIMEOUT_SECS)?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            admin,
            access,
            narrative,
        })
    }
}

const DEFAULT_ADMIN_EMAIL: &str = "admin@lhi.local";
const DEFAULT_ADMIN_NAME: &str = "Administrator";
const DEFAULT_SESSION_TTL_MINUTES: u64 = 720;
const DEFAULT_NARRATIVE_API_BASE: &str = "https://api.deepseek.com/v1";
const DEFAULT_NARRATIVE_MODEL: &str = "deepseek-chat";
const DEFAULT_NARRATIVE_TIMEOUT_SECS: u64 = 30;

fn parse_number(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { name }),
        Err(_) => Ok(default),
    }
}

/// Parse `CODE:LHI|LCI,OTHER:ALL` into master code entries.
pub fn parse_master_codes(raw: &str) -> Result<Vec<MasterCode>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let invalid = || ConfigError::InvalidMasterCode {
                entry: entry.to_string(),
            };
            let (code, products) = entry.split_once(':').ok_or_else(invalid)?;
            let code = code.trim();
            if code.is_empty() {
                return Err(invalid());
            }
            let products = products
                .split('|')
                .map(|product| product.trim().parse::<ProductType>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| invalid())?;
            if products.is_empty() {
                return Err(invalid());
            }
            Ok(MasterCode::new(code, products))
        })
        .collect()
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// The single administrator allowed into the dashboard endpoints.
#[derive(Debug)]
pub struct AdminConfig {
    pub email: String,
    pub name: String,
    /// Login is disabled when unset.
    pub password: Option<SecretString>,
    pub session_ttl_minutes: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            email: DEFAULT_ADMIN_EMAIL.to_string(),
            name: DEFAULT_ADMIN_NAME.to_string(),
            password: None,
            session_ttl_minutes: DEFAULT_SESSION_TTL_MINUTES,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AccessConfig {
    pub master_codes: Vec<MasterCode>,
}

/// Chat-completions endpoint used for narrative reports.
#[derive(Debug)]
pub struct NarrativeConfig {
    pub api_key: Option<SecretString>,
    pub api_base: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_NARRATIVE_API_BASE.to_string(),
            model: DEFAULT_NARRATIVE_MODEL.to_string(),
            timeout_secs: DEFAULT_NARRATIVE_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { name: &'static str },
    InvalidMasterCode { entry: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { name } => {
                write!(f, "{name} must be a non-negative integer")
            }
            ConfigError::InvalidMasterCode { entry } => write!(
                f,
                "ACCESS_MASTER_CODES entry '{entry}' must look like CODE:LHI|LCI"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidMasterCode { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "ADMIN_EMAIL",
            "ADMIN_NAME",
            "ADMIN_PASSWORD",
            "ADMIN_SESSION_TTL_MINUTES",
            "ACCESS_MASTER_CODES",
            "NARRATIVE_API_KEY",
            "NARRATIVE_API_BASE",
            "NARRATIVE_MODEL",
            "NARRATIVE_TIMEOUT_SECS",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.admin.password.is_none());
        assert_eq!(config.admin.session_ttl_minutes, 720);
        assert!(config.access.master_codes.is_empty());
        assert!(config.narrative.api_key.is_none());
        assert_eq!(config.narrative.model, "deepseek-chat");
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_admin_and_narrative_secrets() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ADMIN_PASSWORD", "hunter2");
        env::set_var("NARRATIVE_API_KEY", "sk-abc");
        env::set_var("NARRATIVE_TIMEOUT_SECS", "5");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(
            config.admin.password.as_ref().map(|p| p.expose_secret()),
            Some("hunter2")
        );
        assert_eq!(
            config.narrative.api_key.as_ref().map(|k| k.expose_secret()),
            Some("sk-abc")
        );
        assert_eq!(config.narrative.timeout_secs, 5);
        reset_env();
    }

    #[test]
    fn rejects_non_numeric_ttl() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ADMIN_SESSION_TTL_MINUTES", "soon");
        let err = AppConfig::load().expect_err("ttl must be numeric");
        assert!(err.to_string().contains("ADMIN_SESSION_TTL_MINUTES"));
        reset_env();
    }

    #[test]
    fn parses_master_code_list() {
        let codes = parse_master_codes("lhi159951:LHI, LCI2025:lci|all").expect("parses");
        assert_eq!(codes.len(), 2);
        assert_eq!(codes[0].code(), "LHI159951");
        assert_eq!(codes[0].products(), &[ProductType::Lhi]);
        assert_eq!(codes[1].products(), &[ProductType::Lci, ProductType::All]);

        assert!(parse_master_codes("NOPRODUCT").is_err());
        assert!(parse_master_codes("CODE:XYZ").is_err());
        assert!(parse_master_codes("").expect("empty ok").is_empty());
    }
}
