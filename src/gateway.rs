use crate::errors::ApiError;
use crate::models::{
    Employee, FilteredStatsRow, NewAssignment, NewEmployee, NewTask, PerformanceSummary, Role,
    StatCounts, TaskDefinition, TaskInstance,
};
use crate::stats::FilterCriteria;
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

pub type Params = Vec<(&'static str, String)>;

/// Single-endpoint access to the spreadsheet backend. Every call is
/// fire-once: no retries, no timeout, no caching.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn get(&self, action: &str, params: Params) -> Result<Value, ApiError>;
    async fn post(&self, action: &str, params: Params) -> Result<Value, ApiError>;
}

pub struct HttpGateway {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpGateway {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

fn with_action(action: &str, params: Params) -> Vec<(&str, String)> {
    let mut pairs = Vec::with_capacity(params.len() + 1);
    pairs.push(("action", action.to_string()));
    pairs.extend(params);
    pairs
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn get(&self, action: &str, params: Params) -> Result<Value, ApiError> {
        debug!(action, "backend read");
        let response = self
            .client
            .get(&self.endpoint)
            .query(&with_action(action, params))
            .send()
            .await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn post(&self, action: &str, params: Params) -> Result<Value, ApiError> {
        debug!(action, "backend write");
        let response = self
            .client
            .post(&self.endpoint)
            .form(&with_action(action, params))
            .send()
            .await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[derive(Debug, Deserialize)]
struct EnvelopeHeader {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<String>,
}

struct Envelope<T> {
    message: Option<String>,
    payload: T,
}

#[derive(Debug, Deserialize)]
struct RolePayload {
    #[serde(default)]
    role: Option<Role>,
}

#[derive(Debug, Deserialize)]
struct EmployeesPayload {
    #[serde(default)]
    employees: Option<Vec<Employee>>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct TasksPayload<T> {
    #[serde(default)]
    tasks: Option<Vec<T>>,
}

#[derive(Debug, Deserialize)]
struct SummaryPayload {
    #[serde(default)]
    summary: Option<Vec<StatCounts>>,
}

#[derive(Debug, Deserialize)]
struct FilteredPayload {
    #[serde(default)]
    data: Option<Vec<FilteredStatsRow>>,
}

/// Typed operations over a [`Gateway`]. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    gateway: Arc<dyn Gateway>,
}

impl ApiClient {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    async fn read<T: DeserializeOwned>(&self, action: &str, params: Params) -> Result<T, ApiError> {
        let result = self.gateway.get(action, params).await;
        unwrap_envelope(action, result)
    }

    async fn write(&self, action: &str, params: Params) -> Result<String, ApiError> {
        let result = self.gateway.post(action, params).await;
        let envelope: Envelope<IgnoredAny> = open_envelope(action, result)?;
        Ok(envelope.message.unwrap_or_default())
    }

    pub async fn user_role(&self, email: &str) -> Result<Role, ApiError> {
        let payload: RolePayload = self
            .read("getUserRole", vec![("email", email.to_string())])
            .await?;
        Ok(payload.role.unwrap_or_else(|| Role::Other(String::new())))
    }

    pub async fn add_employee(&self, employee: &NewEmployee) -> Result<String, ApiError> {
        self.write(
            "addEmployee",
            vec![
                ("name", employee.name.clone()),
                ("email", employee.email.clone()),
                ("department", employee.department.clone()),
            ],
        )
        .await
    }

    pub async fn employees(&self) -> Result<Vec<Employee>, ApiError> {
        let payload: EmployeesPayload = self.read("getAllEmployees", Vec::new()).await?;
        Ok(payload.employees.unwrap_or_default())
    }

    pub async fn add_task(&self, task: &NewTask) -> Result<String, ApiError> {
        self.write(
            "addTask",
            vec![
                ("name", task.name.clone()),
                ("description", task.description.clone()),
            ],
        )
        .await
    }

    pub async fn tasks(&self) -> Result<Vec<TaskDefinition>, ApiError> {
        let payload: TasksPayload<TaskDefinition> = self.read("getAllTasks", Vec::new()).await?;
        Ok(payload.tasks.unwrap_or_default())
    }

    pub async fn assign_task(&self, assignment: &NewAssignment) -> Result<String, ApiError> {
        self.write(
            "assignTask",
            vec![
                ("task", assignment.task_id.clone()),
                ("assignedTo", assignment.assigned_to.clone()),
                ("recurrence", assignment.recurrence.clone()),
                ("startDate", assignment.start_date.clone()),
            ],
        )
        .await
    }

    pub async fn user_tasks(&self, email: &str) -> Result<Vec<TaskInstance>, ApiError> {
        let payload: TasksPayload<TaskInstance> = self
            .read("getUserTasks", vec![("email", email.to_string())])
            .await?;
        Ok(payload.tasks.unwrap_or_default())
    }

    pub async fn mark_task_done(
        &self,
        email: &str,
        task_id: &str,
        planned_date: &str,
    ) -> Result<String, ApiError> {
        self.write(
            "markTaskDone",
            vec![
                ("email", email.to_string()),
                ("taskID", task_id.to_string()),
                ("plannedDate", planned_date.to_string()),
            ],
        )
        .await
    }

    pub async fn my_performance(&self, email: &str) -> Result<PerformanceSummary, ApiError> {
        self.read("getMyPerformance", vec![("email", email.to_string())])
            .await
    }

    pub async fn stats_all(&self) -> Result<Vec<StatCounts>, ApiError> {
        let payload: SummaryPayload = self.read("getStatsAll", Vec::new()).await?;
        Ok(payload.summary.unwrap_or_default())
    }

    pub async fn filtered_stats(
        &self,
        criteria: &FilterCriteria,
    ) -> Result<Vec<FilteredStatsRow>, ApiError> {
        let payload: FilteredPayload = self.read("getFilteredStats", criteria.to_params()).await?;
        Ok(payload.data.unwrap_or_default())
    }
}

fn open_envelope<T: DeserializeOwned>(
    action: &str,
    result: Result<Value, ApiError>,
) -> Result<Envelope<T>, ApiError> {
    let document = result.inspect_err(|err| error!(action, "backend call failed: {err}"))?;
    let header = EnvelopeHeader::deserialize(&document)
        .map_err(ApiError::from)
        .inspect_err(|err| error!(action, "unexpected backend envelope: {err}"))?;
    if header.status != "success" {
        let message = header
            .message
            .unwrap_or_else(|| "Unknown error".to_string());
        error!(action, "backend rejected request: {message}");
        return Err(ApiError::Rejected(message));
    }
    let payload = T::deserialize(document)
        .map_err(ApiError::from)
        .inspect_err(|err| error!(action, "unexpected backend payload: {err}"))?;
    Ok(Envelope {
        message: header.message,
        payload,
    })
}

fn unwrap_envelope<T: DeserializeOwned>(
    action: &str,
    result: Result<Value, ApiError>,
) -> Result<T, ApiError> {
    open_envelope(action, result).map(|envelope| envelope.payload)
}

pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Verb {
        Get,
        Post,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RecordedCall {
        pub verb: Verb,
        pub action: String,
        pub params: Vec<(String, String)>,
    }

    /// In-memory gateway that replays canned documents per action and
    /// records every call it receives.
    #[derive(Default)]
    pub struct MockGateway {
        responses: Mutex<HashMap<String, Result<Value, ApiError>>>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl MockGateway {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(&self, action: &str, document: Value) -> &Self {
            self.set(action, Ok(document));
            self
        }

        pub fn fail(&self, action: &str, err: ApiError) -> &Self {
            self.set(action, Err(err));
            self
        }

        fn set(&self, action: &str, result: Result<Value, ApiError>) {
            if let Ok(mut responses) = self.responses.lock() {
                responses.insert(action.to_string(), result);
            }
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
        }

        pub fn calls_for(&self, action: &str) -> Vec<RecordedCall> {
            self.calls()
                .into_iter()
                .filter(|call| call.action == action)
                .collect()
        }

        fn answer(&self, verb: Verb, action: &str, params: Params) -> Result<Value, ApiError> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(RecordedCall {
                    verb,
                    action: action.to_string(),
                    params: params
                        .into_iter()
                        .map(|(key, value)| (key.to_string(), value))
                        .collect(),
                });
            }
            self.responses
                .lock()
                .ok()
                .and_then(|responses| responses.get(action).cloned())
                .unwrap_or_else(|| Err(ApiError::Transport(format!("no mock response for {action}"))))
        }
    }

    #[async_trait]
    impl Gateway for MockGateway {
        async fn get(&self, action: &str, params: Params) -> Result<Value, ApiError> {
            self.answer(Verb::Get, action, params)
        }

        async fn post(&self, action: &str, params: Params) -> Result<Value, ApiError> {
            self.answer(Verb::Post, action, params)
        }
    }
}
