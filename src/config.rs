use std::{env, path::PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is not valid: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub api_base_url: String,
    pub google_client_id: String,
    pub prefs_path: PathBuf,
    pub branding_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid {
                    name: "PORT",
                    value,
                })?,
            None => 8080,
        };

        let api_base_url = lookup("API_BASE_URL")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::Missing("API_BASE_URL"))?;
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                name: "API_BASE_URL",
                value: api_base_url,
            });
        }

        Ok(Self {
            port,
            api_base_url,
            google_client_id: lookup("GOOGLE_CLIENT_ID").unwrap_or_default(),
            prefs_path: lookup("APP_PREFS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/preferences.json")),
            branding_path: lookup("APP_BRANDING_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("assets/customize.txt")),
        })
    }
}
