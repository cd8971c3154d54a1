pub mod admin;
pub mod performance;
pub mod portal;
pub mod theme;

use crate::access::{self, PORTAL_PATH, Page, PageState};
use crate::errors::ApiError;
use crate::session::{Identity, Visit};
use crate::state::AppState;
use crate::ui::feedback::{Modal, Toast};
use crate::ui::{Chrome, render_page};
use axum::{
    extract::State,
    response::{Html, Redirect, Response},
};
use tracing::{error, info};

/// A fully assembled page waiting for the shared chrome.
pub(crate) struct Screen {
    pub title: &'static str,
    pub path: String,
    pub user_name: Option<String>,
    pub toasts: Vec<Toast>,
    pub modal: Option<Modal>,
    pub body: String,
}

/// Renders `screen` with the visitor's theme. Toasts flashed by an earlier
/// redirect come first.
pub(crate) async fn show(state: &AppState, visit: &Visit, screen: Screen) -> Response {
    let mut toasts = state.sessions.take_flash(&visit.session_id).await;
    toasts.extend(screen.toasts);
    let theme = state.prefs.theme(&visit.visitor_id).await;

    let html = render_page(
        &Chrome {
            title: screen.title,
            path: &screen.path,
            theme,
            branding: &state.branding,
            user_name: screen.user_name.as_deref(),
            toasts: &toasts,
            modal: screen.modal.as_ref(),
        },
        &screen.body,
    );
    visit.respond(Html(html))
}

pub(crate) async fn redirect(
    state: &AppState,
    visit: &Visit,
    to: &str,
    toast: Option<Toast>,
) -> Response {
    if let Some(toast) = toast {
        state.sessions.push_flash(&visit.session_id, toast).await;
    }
    visit.respond(Redirect::to(to))
}

/// Runs the role check for `page`. Anything short of `Ready` comes back as
/// the redirect to send instead.
pub(crate) async fn guard(state: &AppState, visit: &Visit, page: Page) -> Result<Identity, Response> {
    let identity = state.sessions.identity(&visit.session_id).await;
    match access::verify(&state.api, identity, page).await {
        PageState::Ready(identity) => Ok(identity),
        PageState::Redirecting { to, toast } => Err(redirect(state, visit, to, toast).await),
        other => {
            error!(?other, ?page, "page verification did not settle");
            Err(redirect(state, visit, PORTAL_PATH, None).await)
        }
    }
}

/// Error toast for a failed page load, `None` when the load succeeded.
pub(crate) fn load_failure<T>(result: &Result<T, ApiError>, operation: &str) -> Option<Toast> {
    result
        .as_ref()
        .err()
        .map(|err| Toast::error(err.user_message(operation)))
}

pub(crate) fn write_success(message: String, fallback: &str) -> Toast {
    if message.trim().is_empty() {
        Toast::success(fallback)
    } else {
        Toast::success(message)
    }
}

/// The backend's own reason for a rejected write, or a generic line when the
/// request never produced an answer.
pub(crate) fn write_failure(err: &ApiError, activity: &str) -> Toast {
    match err {
        ApiError::Rejected(message) => Toast::error(message.as_str()),
        _ => Toast::error(format!("An error occurred while {activity}.")),
    }
}

pub async fn root() -> Redirect {
    Redirect::to(PORTAL_PATH)
}

pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn logout(State(state): State<AppState>, visit: Visit) -> Response {
    if !state.sessions.sign_out(&visit.session_id).await {
        return visit.respond(Redirect::to(PORTAL_PATH));
    }
    info!("session signed out");
    redirect(&state, &visit, PORTAL_PATH, Some(Toast::info("You have been signed out."))).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::feedback::Severity;

    #[test]
    fn writes_prefer_backend_message() {
        let toast = write_success("Employee added".into(), "Saved.");
        assert_eq!(toast, Toast::success("Employee added"));

        let toast = write_success(String::new(), "Saved.");
        assert_eq!(toast.message, "Saved.");

        let toast = write_failure(
            &ApiError::Rejected("Email already exists".into()),
            "adding the employee",
        );
        assert_eq!(toast, Toast::error("Email already exists"));
    }

    #[test]
    fn transport_failures_get_generic_text() {
        let toast = write_failure(&ApiError::Transport("refused".into()), "assigning the task");
        assert_eq!(toast.severity, Severity::Error);
        assert_eq!(toast.message, "An error occurred while assigning the task.");
    }

    #[test]
    fn successful_loads_raise_nothing() {
        let ok: Result<Vec<u8>, ApiError> = Ok(Vec::new());
        assert!(load_failure(&ok, "load tasks").is_none());
        let failed: Result<Vec<u8>, ApiError> = Err(ApiError::Rejected("sheet missing".into()));
        assert_eq!(
            load_failure(&failed, "load tasks").map(|toast| toast.message),
            Some("Failed to load tasks: sheet missing".to_string())
        );
    }
}
