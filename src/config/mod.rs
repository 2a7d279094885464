use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub payments: PaymentConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderTokenFormat {
    #[default]
    Uuid,
    Timestamp,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentConfig {
    #[serde(default = "default_methods")]
    pub methods: Vec<String>,
    #[serde(default)]
    pub order_token_format: OrderTokenFormat,
    #[serde(default = "default_pay_url_base")]
    pub pay_url_base: String,
}

fn default_methods() -> Vec<String> {
    vec!["wechat".to_string(), "alipay".to_string()]
}

fn default_pay_url_base() -> String {
    "https://pay.example.com/pay/".to_string()
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            methods: default_methods(),
            order_token_format: OrderTokenFormat::default(),
            pay_url_base: default_pay_url_base(),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.url", "sqlite://lyceum.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("database.max_lifetime_secs", 3600)?
            .set_default("auth.token_ttl_hours", 24)?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with LYCEUM__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("LYCEUM").separator("__"))

            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "sqlite://lyceum.db?mode=rwc".to_string(),
                max_connections: 10,
                acquire_timeout_secs: 30,
                max_lifetime_secs: 3600,
            },
            auth: AuthConfig {
                jwt_secret: "change-me-in-production".to_string(),
                token_ttl_hours: 24,
            },
            payments: PaymentConfig::default(),
        }
    }
}
