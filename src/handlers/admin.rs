use super::{Screen, guard, load_failure, redirect, show, write_failure, write_success};
use crate::access::Page;
use crate::errors::ApiError;
use crate::models::{NewAssignment, NewEmployee, NewTask};
use crate::session::{Identity, Visit};
use crate::state::AppState;
use crate::stats::FilterCriteria;
use crate::ui::feedback::Toast;
use crate::ui::views::{AdminDrafts, AdminView, admin_body};
use axum::{
    extract::{Query, State},
    response::Response,
    Form,
};
use tracing::{info, warn};

pub const ADMIN_PATH: &str = "/admin";

/// `/admin` with the active filters, so a theme switch or a write keeps them.
fn admin_path(criteria: &FilterCriteria) -> String {
    format!("{ADMIN_PATH}{}", criteria.query_string())
}

pub async fn page(
    State(state): State<AppState>,
    visit: Visit,
    Query(criteria): Query<FilterCriteria>,
) -> Response {
    let identity = match guard(&state, &visit, Page::Admin).await {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    render(&state, &visit, identity, criteria.normalized(), AdminDrafts::default(), Vec::new()).await
}

async fn render(
    state: &AppState,
    visit: &Visit,
    identity: Identity,
    criteria: FilterCriteria,
    drafts: AdminDrafts,
    mut toasts: Vec<Toast>,
) -> Response {
    let (employees, tasks, summary, filtered) = tokio::join!(
        state.api.employees(),
        state.api.tasks(),
        state.api.stats_all(),
        state.api.filtered_stats(&criteria),
    );

    toasts.extend(
        [
            load_failure(&employees, "load employees"),
            load_failure(&tasks, "load tasks"),
            load_failure(&summary, "load global performance stats"),
            load_failure(&filtered, "load filtered stats"),
        ]
        .into_iter()
        .flatten(),
    );

    let body = admin_body(&AdminView {
        employees: &employees,
        tasks: &tasks,
        summary: &summary,
        filtered: &filtered,
        criteria: &criteria,
        drafts: &drafts,
    });

    show(
        state,
        visit,
        Screen {
            title: "Admin Dashboard",
            path: admin_path(&criteria),
            user_name: Some(identity.name),
            toasts,
            modal: None,
            body,
        },
    )
    .await
}

/// Success goes back to the dashboard through a redirect. A failure renders
/// the dashboard in place, with the rejected values still in their form.
async fn settle(
    state: &AppState,
    visit: &Visit,
    identity: Identity,
    criteria: FilterCriteria,
    outcome: Result<Toast, (Toast, AdminDrafts)>,
) -> Response {
    match outcome {
        Ok(toast) => redirect(state, visit, &admin_path(&criteria), Some(toast)).await,
        Err((toast, drafts)) => render(state, visit, identity, criteria, drafts, vec![toast]).await,
    }
}

fn rejected(err: &ApiError, activity: &str) -> Toast {
    warn!(%err, "{activity} failed");
    write_failure(err, activity)
}

pub async fn add_employee(
    State(state): State<AppState>,
    visit: Visit,
    Query(criteria): Query<FilterCriteria>,
    Form(employee): Form<NewEmployee>,
) -> Response {
    let identity = match guard(&state, &visit, Page::Admin).await {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    info!(admin = %identity.email, email = %employee.email, "adding employee");

    let outcome = match state.api.add_employee(&employee).await {
        Ok(message) => Ok(write_success(message, "Employee added.")),
        Err(err) => Err((
            rejected(&err, "adding the employee"),
            AdminDrafts {
                employee: Some(employee),
                ..Default::default()
            },
        )),
    };
    settle(&state, &visit, identity, criteria.normalized(), outcome).await
}

pub async fn add_task(
    State(state): State<AppState>,
    visit: Visit,
    Query(criteria): Query<FilterCriteria>,
    Form(task): Form<NewTask>,
) -> Response {
    let identity = match guard(&state, &visit, Page::Admin).await {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    info!(admin = %identity.email, task = %task.name, "adding task");

    let outcome = match state.api.add_task(&task).await {
        Ok(message) => Ok(write_success(message, "Task added.")),
        Err(err) => Err((
            rejected(&err, "adding the task"),
            AdminDrafts {
                task: Some(task),
                ..Default::default()
            },
        )),
    };
    settle(&state, &visit, identity, criteria.normalized(), outcome).await
}

pub async fn assign_task(
    State(state): State<AppState>,
    visit: Visit,
    Query(criteria): Query<FilterCriteria>,
    Form(assignment): Form<NewAssignment>,
) -> Response {
    let identity = match guard(&state, &visit, Page::Admin).await {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    info!(
        admin = %identity.email,
        task = %assignment.task_id,
        assignee = %assignment.assigned_to,
        "assigning task"
    );

    let outcome = match state.api.assign_task(&assignment).await {
        Ok(message) => Ok(write_success(message, "Task assigned.")),
        Err(err) => Err((
            rejected(&err, "assigning the task"),
            AdminDrafts {
                assignment: Some(assignment),
                ..Default::default()
            },
        )),
    };
    settle(&state, &visit, identity, criteria.normalized(), outcome).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_path_keeps_active_filters() {
        assert_eq!(admin_path(&FilterCriteria::default()), "/admin");
        let criteria = FilterCriteria {
            department: Some("sales & ops".into()),
            from: Some("2025-07-01".into()),
            ..Default::default()
        };
        assert_eq!(
            admin_path(&criteria),
            "/admin?department=sales%20%26%20ops&from=2025-07-01"
        );
    }
}
