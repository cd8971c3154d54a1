use super::{Screen, show};
use crate::access::PORTAL_PATH;
use crate::errors::ApiError;
use crate::models::Role;
use crate::session::{Visit, decode_identity_token};
use crate::state::AppState;
use crate::ui::feedback::Modal;
use crate::ui::views::{PortalView, portal_body};
use axum::{
    extract::State,
    response::{Redirect, Response},
    Form,
};
use serde::Deserialize;
use tracing::{error, info, warn};

/// What the identity provider posts back in redirect mode. Extra fields such
/// as the CSRF token are ignored.
#[derive(Debug, Deserialize)]
pub struct CredentialForm {
    #[serde(default)]
    credential: String,
}

async fn portal_with(state: &AppState, visit: &Visit, modal: Option<Modal>) -> Response {
    let body = portal_body(&PortalView {
        google_client_id: &state.google_client_id,
    });
    show(
        state,
        visit,
        Screen {
            title: "Sign In",
            path: PORTAL_PATH.to_string(),
            user_name: None,
            toasts: Vec::new(),
            modal,
            body,
        },
    )
    .await
}

pub async fn page(State(state): State<AppState>, visit: Visit) -> Response {
    portal_with(&state, &visit, None).await
}

fn failed(message: &str) -> Modal {
    Modal::notice("Authentication Failed", message, PORTAL_PATH)
}

fn broken() -> Modal {
    Modal::notice(
        "Authentication Error",
        "An error occurred during authentication. Please try again.",
        PORTAL_PATH,
    )
}

/// Where a role check sends a freshly signed-in user, or the modal to show
/// when it cannot.
pub(crate) fn landing_for(role: Result<Role, ApiError>) -> Result<&'static str, Modal> {
    match role {
        Ok(role) => role.landing_path().ok_or_else(|| {
            warn!(%role, "unknown user role");
            failed("Unknown user role. Please contact support.")
        }),
        Err(ApiError::Rejected(message)) => {
            warn!("failed to get user role: {message}");
            Err(failed("Could not determine user role. Please try again."))
        }
        Err(_) => Err(broken()),
    }
}

pub async fn credential(
    State(state): State<AppState>,
    visit: Visit,
    Form(form): Form<CredentialForm>,
) -> Response {
    let identity = match decode_identity_token(&form.credential) {
        Ok(identity) => identity,
        Err(err) => {
            error!("sign-in rejected: {err}");
            return portal_with(&state, &visit, Some(broken())).await;
        }
    };

    state.sessions.sign_in(&visit.session_id, identity.clone()).await;
    let role = state.api.user_role(&identity.email).await;

    match landing_for(role) {
        Ok(landing) => {
            info!(email = %identity.email, landing, "signed in");
            visit.respond(Redirect::to(landing))
        }
        Err(modal) => {
            state.sessions.sign_out(&visit.session_id).await;
            portal_with(&state, &visit, Some(modal)).await
        }
    }
}
