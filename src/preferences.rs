use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::Path, path::PathBuf, sync::Arc};
use tokio::{fs, sync::Mutex};
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Default,
    Dark,
    Light,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Default, Theme::Dark, Theme::Light];

    pub fn next(self) -> Theme {
        let index = Theme::ALL.iter().position(|theme| *theme == self).unwrap_or(0);
        Theme::ALL[(index + 1) % Theme::ALL.len()]
    }

    pub fn name(self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn body_class(self) -> &'static str {
        match self {
            Theme::Default => "",
            Theme::Dark => "theme-dark",
            Theme::Light => "theme-light",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Preferences {
    pub themes: BTreeMap<String, Theme>,
}

/// Durable per-browser preferences, written through to a JSON file.
#[derive(Clone)]
pub struct PreferenceStore {
    path: PathBuf,
    data: Arc<Mutex<Preferences>>,
}

impl PreferenceStore {
    pub fn new(path: PathBuf, data: Preferences) -> Self {
        Self {
            path,
            data: Arc::new(Mutex::new(data)),
        }
    }

    pub async fn open(path: PathBuf) -> Self {
        let data = load_preferences(&path).await;
        Self::new(path, data)
    }

    pub async fn theme(&self, visitor_id: &str) -> Theme {
        let data = self.data.lock().await;
        data.themes.get(visitor_id).copied().unwrap_or_default()
    }

    /// Advances to the next theme in the cycle and persists it.
    pub async fn toggle_theme(&self, visitor_id: &str) -> Result<Theme, AppError> {
        let mut data = self.data.lock().await;
        let next = data
            .themes
            .get(visitor_id)
            .copied()
            .unwrap_or_default()
            .next();
        data.themes.insert(visitor_id.to_string(), next);
        persist_preferences(&self.path, &data).await?;
        Ok(next)
    }
}

pub async fn load_preferences(path: &Path) -> Preferences {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse preferences file: {err}");
                Preferences::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Preferences::default(),
        Err(err) => {
            error!("failed to read preferences file: {err}");
            Preferences::default()
        }
    }
}

async fn persist_preferences(path: &Path, data: &Preferences) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}
