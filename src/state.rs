use crate::branding::Branding;
use crate::gateway::ApiClient;
use crate::preferences::PreferenceStore;
use crate::session::SessionStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub api: ApiClient,
    pub sessions: SessionStore,
    pub prefs: PreferenceStore,
    pub branding: Arc<Branding>,
    pub google_client_id: Arc<str>,
}

impl AppState {
    pub fn new(
        api: ApiClient,
        prefs: PreferenceStore,
        branding: Branding,
        google_client_id: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            api,
            sessions: SessionStore::new(),
            prefs,
            branding: Arc::new(branding),
            google_client_id: google_client_id.into(),
        }
    }
}
