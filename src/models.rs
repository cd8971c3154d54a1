use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Employee {
    #[serde(rename = "Name", default, deserialize_with = "de::text")]
    pub name: String,
    #[serde(rename = "Email", default, deserialize_with = "de::text")]
    pub email: String,
    #[serde(rename = "Department", default, deserialize_with = "de::text")]
    pub department: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TaskDefinition {
    #[serde(rename = "Task ID", default, deserialize_with = "de::text")]
    pub task_id: String,
    #[serde(rename = "Task Name", default, deserialize_with = "de::text")]
    pub name: String,
    #[serde(rename = "Description", default, deserialize_with = "de::text")]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "On Time")]
    OnTime,
    Late,
    Pending,
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::OnTime => "On Time",
            TaskStatus::Late => "Late",
            TaskStatus::Pending => "Pending",
            TaskStatus::Unknown => "Unknown",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            TaskStatus::OnTime => "status-on-time",
            TaskStatus::Late => "status-late",
            TaskStatus::Pending | TaskStatus::Unknown => "status-pending",
        }
    }
}

/// A dated occurrence of a task as the backend reports it for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInstance {
    #[serde(rename = "Task ID", default, deserialize_with = "de::text")]
    pub task_id: String,
    #[serde(rename = "Task", default, deserialize_with = "de::text")]
    pub task_name: String,
    #[serde(rename = "Planned Date", default, deserialize_with = "de::text")]
    pub planned_date: String,
    #[serde(rename = "Status", default = "unknown_status")]
    pub status: TaskStatus,
}

fn unknown_status() -> TaskStatus {
    TaskStatus::Unknown
}

/// Task counters shared by every summary granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StatCounts {
    #[serde(default, deserialize_with = "de::count")]
    pub total: u64,
    #[serde(rename = "onTime", default, deserialize_with = "de::count")]
    pub on_time: u64,
    #[serde(default, deserialize_with = "de::count")]
    pub late: u64,
    #[serde(default, deserialize_with = "de::count")]
    pub pending: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PerformanceSummary {
    #[serde(flatten)]
    pub counts: StatCounts,
    #[serde(rename = "target", default, deserialize_with = "de::percent")]
    pub target_percent: f64,
    #[serde(rename = "achieved", default, deserialize_with = "de::percent")]
    pub achieved_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FilteredStatsRow {
    #[serde(default, deserialize_with = "de::text")]
    pub name: String,
    #[serde(default, deserialize_with = "de::text")]
    pub email: String,
    #[serde(default, deserialize_with = "de::text")]
    pub department: String,
    #[serde(flatten)]
    pub counts: StatCounts,
    #[serde(default, deserialize_with = "de::percent")]
    pub percent: f64,
    #[serde(default, deserialize_with = "de::text")]
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    User,
    Other(String),
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Admin" => Role::Admin,
            "User" => Role::User,
            _ => Role::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => f.write_str("Admin"),
            Role::User => f.write_str("User"),
            Role::Other(other) => f.write_str(other),
        }
    }
}

impl Role {
    /// Page a signed-in user of this role lands on, if any.
    pub fn landing_path(&self) -> Option<&'static str> {
        match self {
            Role::Admin => Some("/admin"),
            Role::User => Some("/performance"),
            Role::Other(_) => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewEmployee {
    pub name: String,
    pub email: String,
    pub department: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTask {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAssignment {
    #[serde(rename = "task")]
    pub task_id: String,
    #[serde(rename = "assignedTo")]
    pub assigned_to: String,
    pub recurrence: String,
    #[serde(rename = "startDate")]
    pub start_date: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkDoneRequest {
    #[serde(rename = "taskId")]
    pub task_id: String,
    #[serde(rename = "plannedDate")]
    pub planned_date: String,
}

/// Lenient decoders for spreadsheet-backed values, which arrive as numbers,
/// numeric strings, empty cells or `null` depending on the row.
mod de {
    use serde::Deserializer;
    use serde::de::Deserialize;
    use serde_json::Value;

    pub fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|v| *v > 0.0).map(|v| v as u64))
                .unwrap_or(0),
            Value::String(s) => s.trim().parse::<f64>().map(|v| v.max(0.0) as u64).unwrap_or(0),
            _ => 0,
        })
    }

    pub fn percent<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            Value::String(s) => s.trim().trim_end_matches('%').parse().unwrap_or(0.0),
            _ => 0.0,
        })
    }

    pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }
}
