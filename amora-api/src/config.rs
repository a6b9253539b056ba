use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_discovery_page_size")]
    pub discovery_page_size: usize,
    #[serde(default = "default_discovery_timeout_secs")]
    pub discovery_timeout_secs: u64,
    #[serde(default = "default_profile_timeout_secs")]
    pub profile_timeout_secs: u64,
}

fn default_port() -> u16 {
    3004
}
fn default_jwt_secret() -> String {
    "development-secret-change-in-production".into()
}
fn default_discovery_page_size() -> usize {
    50
}
fn default_discovery_timeout_secs() -> u64 {
    15
}
fn default_profile_timeout_secs() -> u64 {
    10
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("AMORA_API").separator("__"))
            .build()?;
        Ok(config.try_deserialize().unwrap_or_else(|_| Self {
            port: default_port(),
            jwt_secret: default_jwt_secret(),
            discovery_page_size: default_discovery_page_size(),
            discovery_timeout_secs: default_discovery_timeout_secs(),
            profile_timeout_secs: default_profile_timeout_secs(),
        }))
    }

    pub fn discovery_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.discovery_timeout_secs)
    }

    pub fn profile_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.profile_timeout_secs)
    }
}
