use super::{Screen, guard, load_failure, redirect, show};
use crate::access::Page;
use crate::errors::ApiError;
use crate::models::MarkDoneRequest;
use crate::session::Visit;
use crate::state::AppState;
use crate::ui::feedback::{Modal, ModalAction, Toast};
use crate::ui::views::{PerformanceView, performance_body};
use axum::{
    extract::{Query, State},
    response::Response,
    Form,
};
use serde::Deserialize;
use tracing::info;

pub const PERFORMANCE_PATH: &str = "/performance";
const MARK_DONE_PATH: &str = "/performance/tasks/done";

#[derive(Debug, Default, Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    confirm: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

fn confirmation(task_id: &str, planned_date: &str) -> Modal {
    Modal::new(
        "Confirm Task Completion",
        format!("Are you sure you want to mark \"{task_id}\" as done?"),
    )
    .action(ModalAction::link("Cancel", "btn btn-danger", PERFORMANCE_PATH))
    .action(ModalAction::post(
        "Confirm",
        "btn btn-success",
        MARK_DONE_PATH,
        vec![
            ("taskId".to_string(), task_id.to_string()),
            ("plannedDate".to_string(), planned_date.to_string()),
        ],
    ))
}

pub async fn page(
    State(state): State<AppState>,
    visit: Visit,
    Query(query): Query<ConfirmQuery>,
) -> Response {
    let identity = match guard(&state, &visit, Page::Performance).await {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    let (tasks, summary) = tokio::join!(
        state.api.user_tasks(&identity.email),
        state.api.my_performance(&identity.email),
    );

    let toasts = [
        load_failure(&tasks, "load tasks"),
        load_failure(&summary, "load performance"),
    ]
    .into_iter()
    .flatten()
    .collect();

    let modal = match (query.confirm.as_deref(), query.date.as_deref()) {
        (Some(task_id), Some(date)) if !task_id.trim().is_empty() => {
            Some(confirmation(task_id, date))
        }
        _ => None,
    };

    let body = performance_body(&PerformanceView {
        tasks: &tasks,
        summary: &summary,
    });

    show(
        &state,
        &visit,
        Screen {
            title: "My Performance",
            path: PERFORMANCE_PATH.to_string(),
            user_name: Some(identity.name),
            toasts,
            modal,
            body,
        },
    )
    .await
}

pub async fn mark_done(
    State(state): State<AppState>,
    visit: Visit,
    Form(request): Form<MarkDoneRequest>,
) -> Response {
    let identity = match guard(&state, &visit, Page::Performance).await {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    info!(email = %identity.email, task = %request.task_id, date = %request.planned_date, "marking task done");

    let result = state
        .api
        .mark_task_done(&identity.email, &request.task_id, &request.planned_date)
        .await;
    let toast = match result {
        Ok(_) => Toast::success("Task marked as done!"),
        Err(ApiError::Rejected(message)) => {
            Toast::error(format!("Failed to mark task done: {message}"))
        }
        Err(_) => Toast::error("An error occurred while marking the task done."),
    };
    redirect(&state, &visit, PERFORMANCE_PATH, Some(toast)).await
}
