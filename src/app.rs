use crate::handlers::{self, admin, performance, portal, theme};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/portal", get(portal::page))
        .route("/portal/credential", post(portal::credential))
        .route("/logout", get(handlers::logout))
        .route("/admin", get(admin::page))
        .route("/admin/employees", post(admin::add_employee))
        .route("/admin/tasks", post(admin::add_task))
        .route("/admin/assignments", post(admin::assign_task))
        .route("/performance", get(performance::page))
        .route("/performance/tasks/done", post(performance::mark_done))
        .route("/theme", post(theme::toggle))
        .with_state(state)
}
