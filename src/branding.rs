use std::{collections::HashMap, path::Path};
use tokio::fs;
use tracing::error;

/// Organisation details shown in the page header and footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branding {
    pub org: String,
    pub tagline: String,
    pub mobile: String,
    pub address: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            org: "Task Manager".to_string(),
            tagline: "Manage your tasks efficiently".to_string(),
            mobile: "N/A".to_string(),
            address: "N/A".to_string(),
        }
    }
}

impl Branding {
    /// Parses `Key: value` lines. Values keep any further colons and lose
    /// their double quotes; unknown keys are ignored.
    pub fn parse(text: &str) -> Self {
        let entries: HashMap<&str, String> = text
            .lines()
            .filter_map(|line| line.split_once(':'))
            .map(|(key, value)| (key.trim(), value.trim().replace('"', "")))
            .collect();

        let defaults = Branding::default();
        let pick = |key: &str, fallback: String| {
            entries
                .get(key)
                .filter(|value| !value.is_empty())
                .cloned()
                .unwrap_or(fallback)
        };

        Self {
            org: pick("Org", defaults.org),
            tagline: pick("Tagline", defaults.tagline),
            mobile: pick("Mobile", defaults.mobile),
            address: pick("Address", defaults.address),
        }
    }
}

pub async fn load_branding(path: &Path) -> Branding {
    match fs::read_to_string(path).await {
        Ok(text) => Branding::parse(&text),
        Err(err) => {
            error!("failed to load customization data from {}: {err}", path.display());
            Branding::default()
        }
    }
}
