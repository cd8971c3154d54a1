use super::escape;
use crate::models::{Employee, FilteredStatsRow, StatCounts, TaskDefinition, TaskInstance, TaskStatus};
use crate::stats::{DepartmentOption, PERFORMANCE_LEVELS};
use chrono::{DateTime, NaiveDate};

pub fn employee_rows(employees: &[Employee]) -> String {
    employees
        .iter()
        .map(|employee| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&employee.name),
                escape(&employee.email),
                escape(&employee.department)
            )
        })
        .collect()
}

pub fn task_rows(tasks: &[TaskDefinition]) -> String {
    tasks
        .iter()
        .map(|task| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&task.task_id),
                escape(&task.name),
                escape(&task.description)
            )
        })
        .collect()
}

pub fn filtered_rows(rows: &[FilteredStatsRow]) -> String {
    rows.iter()
        .map(|row| {
            format!(
                concat!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td>",
                    r#"<td class="status-on-time">{}</td><td class="status-late">{}</td>"#,
                    r#"<td class="status-pending">{}</td><td>{}%</td><td>{}</td></tr>"#
                ),
                escape(&row.name),
                escape(&row.email),
                escape(&row.department),
                row.counts.total,
                row.counts.on_time,
                row.counts.late,
                row.counts.pending,
                format_percent(row.percent),
                escape(&row.level)
            )
        })
        .collect()
}

pub fn format_percent(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}")
    }
}

fn option(value: &str, label: &str, selected: bool) -> String {
    format!(
        r#"<option value="{}"{}>{}</option>"#,
        escape(value),
        if selected { " selected" } else { "" },
        escape(label)
    )
}

pub fn task_options(tasks: &[TaskDefinition], selected: Option<&str>) -> String {
    std::iter::once(option("", "Select Task", false))
        .chain(tasks.iter().map(|task| {
            option(
                &task.task_id,
                &format!("{} - {}", task.task_id, task.name),
                selected == Some(task.task_id.as_str()),
            )
        }))
        .collect()
}

pub fn employee_options(employees: &[Employee], selected: Option<&str>) -> String {
    std::iter::once(option("", "Select Employee", false))
        .chain(employees.iter().map(|employee| {
            option(
                &employee.email,
                &format!("{} ({})", employee.name, employee.email),
                selected == Some(employee.email.as_str()),
            )
        }))
        .collect()
}

pub const RECURRENCES: [&str; 4] = ["Daily", "Weekly", "Monthly", "Once"];

pub fn recurrence_options(selected: Option<&str>) -> String {
    RECURRENCES
        .iter()
        .map(|recurrence| option(recurrence, recurrence, selected == Some(*recurrence)))
        .collect()
}

pub fn department_filter_options(options: &[DepartmentOption], selected: Option<&str>) -> String {
    std::iter::once(option("", "All Departments", selected.is_none()))
        .chain(options.iter().map(|department| {
            option(
                &department.value,
                &department.label,
                selected == Some(department.value.as_str()),
            )
        }))
        .collect()
}

pub fn level_filter_options(selected: Option<&str>) -> String {
    std::iter::once(option("", "All Levels", selected.is_none()))
        .chain(PERFORMANCE_LEVELS.iter().map(|level| {
            let mut label = level.to_string();
            if let Some(first) = label.get_mut(0..1) {
                first.make_ascii_uppercase();
            }
            option(level, &label, selected == Some(*level))
        }))
        .collect()
}

/// What the global counters show: the folded totals, zeros after the backend
/// declined, or an error marker after a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalTotals {
    Loaded(StatCounts),
    Unavailable,
    Failed,
}

pub fn global_totals_panel(totals: GlobalTotals) -> String {
    let cell = |value: u64| match totals {
        GlobalTotals::Loaded(_) => value.to_string(),
        GlobalTotals::Unavailable => "0".to_string(),
        GlobalTotals::Failed => "Error".to_string(),
    };
    let counts = match totals {
        GlobalTotals::Loaded(counts) => counts,
        _ => StatCounts::default(),
    };

    format!(
        r#"<div class="stat"><span class="label">Total</span><span id="globalTotal" class="value">{}</span></div>
        <div class="stat"><span class="label">On Time</span><span id="globalOnTime" class="value status-on-time">{}</span></div>
        <div class="stat"><span class="label">Late</span><span id="globalLate" class="value status-late">{}</span></div>
        <div class="stat"><span class="label">Pending</span><span id="globalPending" class="value status-pending">{}</span></div>"#,
        cell(counts.total),
        cell(counts.on_time),
        cell(counts.late),
        cell(counts.pending)
    )
}

/// `dd-Mon-yyyy` for ISO dates and timestamps; anything else is shown as is.
/// Timestamps use their UTC date here.
pub fn format_planned_date(raw: &str) -> String {
    let raw = raw.trim();
    let date = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok());
    match date {
        Some(date) => date.format("%d-%b-%Y").to_string(),
        None => raw.to_string(),
    }
}

/// Planned date markup. A full timestamp is wrapped in a `<time>` element so
/// the page script can re-render it in the browser's own time zone; the UTC
/// date stays as the fallback text.
pub fn planned_date_markup(raw: &str) -> String {
    let trimmed = raw.trim();
    let formatted = escape(&format_planned_date(trimmed));
    if DateTime::parse_from_rfc3339(trimmed).is_ok() {
        format!(
            r#"<time datetime="{}" data-local-date>{formatted}</time>"#,
            escape(trimmed)
        )
    } else {
        formatted
    }
}

/// Task cards for one employee. `action` yields the link a pending task's
/// "Mark Done" button follows; returning `None` leaves the card read-only.
pub fn task_list<F>(tasks: &[TaskInstance], action: F) -> String
where
    F: Fn(&TaskInstance) -> Option<String>,
{
    if tasks.is_empty() {
        return r#"<p class="hint">No tasks assigned yet.</p>"#.to_string();
    }

    tasks
        .iter()
        .map(|task| {
            let button = match (task.status, action(task)) {
                (TaskStatus::Pending, Some(href)) => format!(
                    r#"<a class="btn btn-mark-done" href="{}"><i class="fas fa-check fa-icon"></i> Mark Done</a>"#,
                    escape(&href)
                ),
                _ => String::new(),
            };
            format!(
                r#"<div class="task-card">
          <h3>{name}</h3>
          <p><strong>Planned:</strong> {planned}</p>
          <p><strong>Status:</strong> <span class="{class}">{status}</span></p>
          {button}
        </div>"#,
                name = escape(&task.task_name),
                planned = planned_date_markup(&task.planned_date),
                class = task.status.css_class(),
                status = task.status.label(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, status: TaskStatus) -> TaskInstance {
        TaskInstance {
            task_id: id.into(),
            task_name: format!("Task {id}"),
            planned_date: "2025-07-01".into(),
            status,
        }
    }

    #[test]
    fn empty_filtered_result_renders_no_rows() {
        assert_eq!(filtered_rows(&[]), "");
    }

    #[test]
    fn filtered_rows_show_counts_and_percent() {
        let row = FilteredStatsRow {
            name: "Asha".into(),
            email: "asha@example.com".into(),
            department: "HR".into(),
            counts: StatCounts {
                total: 4,
                on_time: 3,
                late: 1,
                pending: 0,
            },
            percent: 75.0,
            level: "pass".into(),
        };
        let html = filtered_rows(&[row]);
        assert_eq!(html.matches("<tr>").count(), 1);
        assert!(html.contains("<td>75%</td>"));
        assert!(html.contains(r#"<td class="status-on-time">3</td>"#));
    }

    #[test]
    fn percentages_drop_needless_decimals() {
        assert_eq!(format_percent(80.0), "80");
        assert_eq!(format_percent(66.666), "66.67");
    }

    #[test]
    fn planned_dates_are_humanised() {
        assert_eq!(format_planned_date("2025-07-01"), "01-Jul-2025");
        assert_eq!(format_planned_date("2025-06-30T18:30:00.000Z"), "30-Jun-2025");
        assert_eq!(format_planned_date("next week"), "next week");
    }

    #[test]
    fn timestamps_are_handed_to_the_browser_zone() {
        assert_eq!(
            planned_date_markup("2025-06-30T18:30:00.000Z"),
            r#"<time datetime="2025-06-30T18:30:00.000Z" data-local-date>30-Jun-2025</time>"#
        );
        assert_eq!(planned_date_markup("2025-07-01"), "01-Jul-2025");
        assert_eq!(planned_date_markup("<soon>"), "&lt;soon&gt;");
    }

    #[test]
    fn submitted_choices_stay_selected() {
        let tasks = [TaskDefinition {
            task_id: "T1".into(),
            name: "Daily report".into(),
            ..Default::default()
        }];
        assert!(task_options(&tasks, Some("T1")).contains(r#"<option value="T1" selected>"#));
        assert!(!task_options(&tasks, None).contains("selected"));

        let employees = [Employee {
            name: "Ravi".into(),
            email: "ravi@example.com".into(),
            ..Default::default()
        }];
        assert!(
            employee_options(&employees, Some("ravi@example.com"))
                .contains(r#"<option value="ravi@example.com" selected>"#)
        );
        let html = recurrence_options(Some("Weekly"));
        assert_eq!(html.matches("<option").count(), 4);
        assert!(html.contains(r#"<option value="Weekly" selected>Weekly</option>"#));
    }

    #[test]
    fn only_pending_tasks_get_an_action() {
        let tasks = [
            task("T1", TaskStatus::Pending),
            task("T2", TaskStatus::OnTime),
            task("T3", TaskStatus::Late),
        ];
        let html = task_list(&tasks, |task| Some(format!("/done/{}", task.task_id)));
        assert_eq!(html.matches("btn-mark-done").count(), 1);
        assert!(html.contains(r#"href="/done/T1""#));
    }

    #[test]
    fn task_list_without_action_is_read_only() {
        let html = task_list(&[task("T1", TaskStatus::Pending)], |_| None);
        assert!(!html.contains("btn-mark-done"));
    }

    #[test]
    fn failed_totals_show_error_marker() {
        assert!(global_totals_panel(GlobalTotals::Failed).contains(">Error<"));
        let loaded = global_totals_panel(GlobalTotals::Loaded(StatCounts {
            total: 15,
            on_time: 12,
            late: 2,
            pending: 1,
        }));
        assert!(loaded.contains(r#"id="globalTotal" class="value">15<"#));
    }

    #[test]
    fn filter_options_keep_selection() {
        let html = level_filter_options(Some("pass"));
        assert!(html.contains(r#"<option value="pass" selected>Pass</option>"#));
        let departments = [DepartmentOption {
            value: "hr".into(),
            label: "HR".into(),
        }];
        let html = department_filter_options(&departments, None);
        assert!(html.contains(r#"<option value="" selected>All Departments</option>"#));
    }
}
