use crate::errors::AppError;
use crate::session::Visit;
use crate::state::AppState;
use axum::{
    extract::State,
    response::{Redirect, Response},
    Form,
};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct ThemeForm {
    #[serde(default)]
    return_to: Option<String>,
}

/// Only local absolute paths are followed back.
fn same_site(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//") && !target.contains('\\')
}

pub async fn toggle(
    State(state): State<AppState>,
    visit: Visit,
    Form(form): Form<ThemeForm>,
) -> Result<Response, AppError> {
    let target = form.return_to.unwrap_or_else(|| "/".to_string());
    if !same_site(&target) {
        return Err(AppError::bad_request("return_to must be a local path"));
    }

    let theme = state.prefs.toggle_theme(&visit.visitor_id).await?;
    info!(visitor = %visit.visitor_id, theme = theme.name(), "theme changed");
    Ok(visit.respond(Redirect::to(&target)))
}
