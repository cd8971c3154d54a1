use crate::models::{Employee, PerformanceSummary, StatCounts};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::iter::Sum;

/// Performance levels the filter form offers. The backend compares them
/// case-insensitively against the level it computes per employee.
pub const PERFORMANCE_LEVELS: [&str; 2] = ["pass", "fail"];

impl StatCounts {
    pub fn merge(self, other: StatCounts) -> StatCounts {
        StatCounts {
            total: self.total.saturating_add(other.total),
            on_time: self.on_time.saturating_add(other.on_time),
            late: self.late.saturating_add(other.late),
            pending: self.pending.saturating_add(other.pending),
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.on_time
            .checked_add(self.late)
            .and_then(|sum| sum.checked_add(self.pending))
            == Some(self.total)
    }
}

impl Sum for StatCounts {
    fn sum<I: Iterator<Item = StatCounts>>(iter: I) -> Self {
        iter.fold(StatCounts::default(), StatCounts::merge)
    }
}

impl<'a> Sum<&'a StatCounts> for StatCounts {
    fn sum<I: Iterator<Item = &'a StatCounts>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl FromIterator<StatCounts> for StatCounts {
    fn from_iter<I: IntoIterator<Item = StatCounts>>(iter: I) -> Self {
        iter.into_iter().sum()
    }
}

/// Folds per-employee summaries into the organisation-wide totals.
pub fn global_totals(summaries: &[StatCounts]) -> StatCounts {
    summaries.iter().sum()
}

/// Optional restrictions for the filtered statistics view. An unset field
/// means "no restriction on that dimension".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

impl FilterCriteria {
    /// Drops blank values so an empty form field never reaches the backend.
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            department: clean(self.department),
            level: clean(self.level),
            from: clean(self.from),
            to: clean(self.to),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.department.is_none() && self.level.is_none() && self.from.is_none() && self.to.is_none()
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        [
            ("department", &self.department),
            ("level", &self.level),
            ("from", &self.from),
            ("to", &self.to),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(|v| (key, v.to_string()))
        })
        .collect()
    }

    /// `?key=value&...` for the active criteria, or nothing when none are set.
    pub fn query_string(&self) -> String {
        let pairs: Vec<String> = self
            .to_params()
            .into_iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(&value)))
            .collect();
        if pairs.is_empty() {
            String::new()
        } else {
            format!("?{}", pairs.join("&"))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetVerdict {
    Achieved,
    BelowTarget,
}

impl TargetVerdict {
    pub fn of(summary: &PerformanceSummary) -> Self {
        if summary.achieved_percent >= summary.target_percent {
            TargetVerdict::Achieved
        } else {
            TargetVerdict::BelowTarget
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            TargetVerdict::Achieved => "\u{2705} Target Achieved!",
            TargetVerdict::BelowTarget => "\u{26a0}\u{fe0f} Below Target",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            TargetVerdict::Achieved => "status-on-time",
            TargetVerdict::BelowTarget => "status-late",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentOption {
    pub value: String,
    pub label: String,
}

/// Unique departments across the employee list, sorted by name. The option
/// value is lowercased to match how the backend compares departments.
pub fn department_options(employees: &[Employee]) -> Vec<DepartmentOption> {
    employees
        .iter()
        .map(|employee| employee.department.trim())
        .filter(|department| !department.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|department| DepartmentOption {
            value: department.to_lowercase(),
            label: department.to_string(),
        })
        .collect()
}
