use crate::errors::ApiError;
use crate::gateway::ApiClient;
use crate::models::Role;
use crate::session::Identity;
use crate::ui::feedback::Toast;
use tracing::warn;

pub const PORTAL_PATH: &str = "/portal";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Admin,
    Performance,
}

impl Page {
    /// The admin dashboard is for admins only. Anyone with a known role may
    /// look at their own tasks and performance.
    pub fn admits(self, role: &Role) -> bool {
        match self {
            Page::Admin => matches!(role, Role::Admin),
            Page::Performance => matches!(role, Role::Admin | Role::User),
        }
    }
}

/// Lifecycle of one protected page view. `Redirecting` is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState {
    Unauthenticated,
    Verifying(Identity),
    Ready(Identity),
    Redirecting {
        to: &'static str,
        toast: Option<Toast>,
    },
}

impl PageState {
    fn redirect(to: &'static str, toast: Option<Toast>) -> Self {
        PageState::Redirecting { to, toast }
    }

    /// Page load: a known identity moves on to verification, no identity
    /// sends the browser to sign in.
    pub fn begin(self, identity: Option<Identity>) -> Self {
        match self {
            PageState::Unauthenticated => match identity {
                Some(identity) => PageState::Verifying(identity),
                None => PageState::redirect(PORTAL_PATH, None),
            },
            other => other,
        }
    }

    /// Outcome of the role check for `page`.
    pub fn resolve(self, page: Page, role: Result<Role, ApiError>) -> Self {
        let PageState::Verifying(identity) = self else {
            return self;
        };

        match role {
            Ok(role) if page.admits(&role) => PageState::Ready(identity),
            Ok(role) => match role.landing_path() {
                Some(landing) => {
                    warn!(email = %identity.email, %role, ?page, "role mismatch");
                    PageState::redirect(
                        landing,
                        Some(Toast::error(
                            "Access Denied: You are not authorized to view this page.",
                        )),
                    )
                }
                None => {
                    warn!(email = %identity.email, %role, "unknown role");
                    PageState::redirect(
                        PORTAL_PATH,
                        Some(Toast::error("Unknown user role. Please contact support.")),
                    )
                }
            },
            Err(ApiError::Rejected(message)) => PageState::redirect(
                PORTAL_PATH,
                Some(Toast::error(format!("Could not determine user role: {message}"))),
            ),
            Err(_) => PageState::redirect(
                PORTAL_PATH,
                Some(Toast::error(
                    "An error occurred during authorization. Please try again.",
                )),
            ),
        }
    }
}

pub async fn verify(api: &ApiClient, identity: Option<Identity>, page: Page) -> PageState {
    match PageState::Unauthenticated.begin(identity) {
        PageState::Verifying(identity) => {
            let role = api.user_role(&identity.email).await;
            PageState::Verifying(identity).resolve(page, role)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::mock::MockGateway;
    use serde_json::json;
    use std::sync::Arc;

    fn asha() -> Identity {
        Identity {
            email: "asha@example.com".into(),
            name: "Asha".into(),
        }
    }

    fn verifying() -> PageState {
        PageState::Unauthenticated.begin(Some(asha()))
    }

    #[test]
    fn missing_identity_goes_to_portal_quietly() {
        assert_eq!(
            PageState::Unauthenticated.begin(None),
            PageState::Redirecting {
                to: PORTAL_PATH,
                toast: None
            }
        );
    }

    #[test]
    fn matching_role_is_ready() {
        let state = verifying().resolve(Page::Admin, Ok(Role::Admin));
        assert_eq!(state, PageState::Ready(asha()));
        let state = verifying().resolve(Page::Performance, Ok(Role::User));
        assert_eq!(state, PageState::Ready(asha()));
    }

    #[test]
    fn user_is_sent_to_own_landing_from_admin() {
        let state = verifying().resolve(Page::Admin, Ok(Role::User));
        let PageState::Redirecting { to, toast: Some(toast) } = state else {
            panic!("expected redirect with toast");
        };
        assert_eq!(to, "/performance");
        assert!(toast.message.starts_with("Access Denied"));
    }

    #[test]
    fn admins_may_view_their_own_performance() {
        let state = verifying().resolve(Page::Performance, Ok(Role::Admin));
        assert_eq!(state, PageState::Ready(asha()));
    }

    #[test]
    fn unknown_roles_never_reach_a_protected_page() {
        for role in ["Manager", "admin", "", "USER"] {
            for page in [Page::Admin, Page::Performance] {
                let state = verifying().resolve(page, Ok(Role::from(role.to_string())));
                assert!(
                    matches!(state, PageState::Redirecting { to: PORTAL_PATH, .. }),
                    "{role:?} reached {page:?}"
                );
            }
        }
    }

    #[test]
    fn failures_during_verification_force_sign_in() {
        let state = verifying().resolve(Page::Admin, Err(ApiError::Transport("down".into())));
        assert!(matches!(state, PageState::Redirecting { to: PORTAL_PATH, toast: Some(_) }));
        let state = verifying().resolve(Page::Admin, Err(ApiError::Rejected("no such user".into())));
        let PageState::Redirecting { toast: Some(toast), .. } = state else {
            panic!("expected redirect");
        };
        assert!(toast.message.contains("no such user"));
    }

    #[test]
    fn redirecting_is_terminal() {
        let done = PageState::Redirecting {
            to: PORTAL_PATH,
            toast: None,
        };
        assert_eq!(done.clone().begin(Some(asha())), done);
        assert_eq!(done.clone().resolve(Page::Admin, Ok(Role::Admin)), done);
    }

    #[tokio::test]
    async fn verify_checks_role_for_session_email() {
        let mock = Arc::new(MockGateway::new());
        mock.respond("getUserRole", json!({ "status": "success", "role": "Admin" }));
        let api = ApiClient::new(mock.clone());

        let state = verify(&api, Some(asha()), Page::Admin).await;
        assert_eq!(state, PageState::Ready(asha()));
        let calls = mock.calls_for("getUserRole");
        assert_eq!(calls[0].params, vec![("email".to_string(), "asha@example.com".to_string())]);
    }

    #[tokio::test]
    async fn verify_without_identity_makes_no_call() {
        let mock = Arc::new(MockGateway::new());
        let api = ApiClient::new(mock.clone());
        let state = verify(&api, None, Page::Performance).await;
        assert!(matches!(state, PageState::Redirecting { to: PORTAL_PATH, toast: None }));
        assert!(mock.calls().is_empty());
    }
}
