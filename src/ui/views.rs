use super::components::{
    GlobalTotals, department_filter_options, employee_options, employee_rows, filtered_rows,
    format_percent, global_totals_panel, level_filter_options, recurrence_options, task_list,
    task_options, task_rows,
};
use super::escape;
use super::feedback::Loader;
use crate::errors::ApiError;
use crate::models::{
    Employee, FilteredStatsRow, NewAssignment, NewEmployee, NewTask, PerformanceSummary,
    StatCounts, TaskDefinition, TaskInstance,
};
use crate::stats::{FilterCriteria, TargetVerdict, department_options, global_totals};

pub struct PortalView<'a> {
    pub google_client_id: &'a str,
}

pub fn portal_body(view: &PortalView<'_>) -> String {
    format!(
        r#"<section class="card portal">
      <h2>Sign in</h2>
      <p class="subtitle">Use your work Google account to continue.</p>
      <script src="https://accounts.google.com/gsi/client" async defer></script>
      <div id="g_id_onload"
           data-client_id="{client_id}"
           data-ux_mode="redirect"
           data-login_uri="/portal/credential"
           data-auto_prompt="false"></div>
      <div class="g_id_signin" data-type="standard" data-size="large" data-theme="outline"
           data-text="sign_in_with" data-shape="pill" data-logo_alignment="left"></div>
    </section>"#,
        client_id = escape(view.google_client_id),
    )
}

pub struct AdminView<'a> {
    pub employees: &'a Result<Vec<Employee>, ApiError>,
    pub tasks: &'a Result<Vec<TaskDefinition>, ApiError>,
    pub summary: &'a Result<Vec<StatCounts>, ApiError>,
    pub filtered: &'a Result<Vec<FilteredStatsRow>, ApiError>,
    pub criteria: &'a FilterCriteria,
    pub drafts: &'a AdminDrafts,
}

/// Values of a write form the backend turned down, put back into the form.
#[derive(Debug, Clone, Default)]
pub struct AdminDrafts {
    pub employee: Option<NewEmployee>,
    pub task: Option<NewTask>,
    pub assignment: Option<NewAssignment>,
}

fn loaded<T>(result: &Result<Vec<T>, ApiError>) -> &[T] {
    result.as_deref().unwrap_or(&[])
}

pub fn admin_body(view: &AdminView<'_>) -> String {
    let employees = loaded(view.employees);
    let tasks = loaded(view.tasks);

    let totals = match view.summary {
        Ok(summary) => GlobalTotals::Loaded(global_totals(summary)),
        Err(err) if err.is_transport() => GlobalTotals::Failed,
        Err(_) => GlobalTotals::Unavailable,
    };

    let criteria = view.criteria;
    let date_value = |value: &Option<String>| escape(value.as_deref().unwrap_or_default());
    let query = escape(&criteria.query_string());

    let employee = view.drafts.employee.as_ref();
    let employee_value =
        |field: fn(&NewEmployee) -> &str| escape(employee.map(field).unwrap_or_default());
    let task = view.drafts.task.as_ref();
    let task_value = |field: fn(&NewTask) -> &str| escape(task.map(field).unwrap_or_default());
    let assignment = view.drafts.assignment.as_ref();

    format!(
        r#"<section class="card">
      <h2>Global Performance</h2>
      <div class="panel">{totals}</div>
    </section>

    <section class="grid-2">
      <div class="card">
        <h2>Add Employee</h2>
        <form id="employeeForm" method="post" action="/admin/employees{query}" {employee_loader}>
          <input name="name" placeholder="Name" value="{employee_name}" required />
          <input name="email" type="email" placeholder="Email" value="{employee_email}" required />
          <input name="department" placeholder="Department" value="{employee_department}" required />
          <button class="btn btn-primary" type="submit">Add Employee</button>
        </form>
      </div>
      <div class="card">
        <h2>Add Task</h2>
        <form id="taskForm" method="post" action="/admin/tasks{query}" {task_loader}>
          <input name="name" placeholder="Task name" value="{task_name}" required />
          <textarea name="description" placeholder="Description">{task_description}</textarea>
          <button class="btn btn-primary" type="submit">Add Task</button>
        </form>
      </div>
    </section>

    <section class="card">
      <h2>Assign Task</h2>
      <form id="assignForm" method="post" action="/admin/assignments{query}" class="inline-form" {assign_loader}>
        <select id="taskDropdown" name="task" required>{task_options}</select>
        <select id="employeeDropdown" name="assignedTo" required>{employee_options}</select>
        <select name="recurrence" required>{recurrence_options}</select>
        <input name="startDate" type="date" value="{start_date}" required />
        <button class="btn btn-primary" type="submit">Assign</button>
      </form>
    </section>

    <section class="card">
      <h2>Performance Statistics</h2>
      <form id="filterForm" method="get" action="/admin" class="inline-form" {filter_loader}>
        <select id="filterDepartment" name="department">{department_options}</select>
        <select id="filterLevel" name="level">{level_options}</select>
        <input id="filterFromDate" name="from" type="date" value="{from}" />
        <input id="filterToDate" name="to" type="date" value="{to}" />
        <button id="applyFilterBtn" class="btn btn-primary" type="submit">Apply Filters</button>
        <a id="clearFilterBtn" class="btn" href="/admin">Clear Filters</a>
      </form>
      <table>
        <thead><tr><th>Name</th><th>Email</th><th>Department</th><th>Total</th><th>On Time</th><th>Late</th><th>Pending</th><th>Achieved</th><th>Level</th></tr></thead>
        <tbody id="filteredStatsTableBody">{filtered_rows}</tbody>
      </table>
    </section>

    <section class="grid-2">
      <div class="card">
        <h2>Employees</h2>
        <table>
          <thead><tr><th>Name</th><th>Email</th><th>Department</th></tr></thead>
          <tbody id="employeeTableBody">{employee_rows}</tbody>
        </table>
      </div>
      <div class="card">
        <h2>Tasks</h2>
        <table>
          <thead><tr><th>Task ID</th><th>Task Name</th><th>Description</th></tr></thead>
          <tbody id="taskTableBody">{task_rows}</tbody>
        </table>
      </div>
    </section>"#,
        totals = global_totals_panel(totals),
        employee_loader = Loader::new("Adding employee...").with_target(75).form_attributes(),
        task_loader = Loader::new("Adding task...").with_target(75).form_attributes(),
        assign_loader = Loader::new("Assigning task...").with_target(75).form_attributes(),
        filter_loader = Loader::new("Loading filtered statistics...").with_target(50).form_attributes(),
        employee_name = employee_value(|e| e.name.as_str()),
        employee_email = employee_value(|e| e.email.as_str()),
        employee_department = employee_value(|e| e.department.as_str()),
        task_name = task_value(|t| t.name.as_str()),
        task_description = task_value(|t| t.description.as_str()),
        task_options = task_options(tasks, assignment.map(|a| a.task_id.as_str())),
        employee_options = employee_options(employees, assignment.map(|a| a.assigned_to.as_str())),
        recurrence_options = recurrence_options(assignment.map(|a| a.recurrence.as_str())),
        start_date = escape(assignment.map(|a| a.start_date.as_str()).unwrap_or_default()),
        department_options = department_filter_options(
            &department_options(employees),
            criteria.department.as_deref()
        ),
        level_options = level_filter_options(criteria.level.as_deref()),
        from = date_value(&criteria.from),
        to = date_value(&criteria.to),
        filtered_rows = filtered_rows(loaded(view.filtered)),
        employee_rows = employee_rows(employees),
        task_rows = task_rows(tasks),
    )
}

pub struct PerformanceView<'a> {
    pub tasks: &'a Result<Vec<TaskInstance>, ApiError>,
    pub summary: &'a Result<PerformanceSummary, ApiError>,
}

/// Confirmation link for a pending task on the performance page.
pub fn confirm_href(task: &TaskInstance) -> String {
    format!(
        "/performance?confirm={}&date={}",
        urlencoding::encode(&task.task_id),
        urlencoding::encode(&task.planned_date)
    )
}

pub fn performance_body(view: &PerformanceView<'_>) -> String {
    let tasks = match view.tasks {
        Ok(tasks) => task_list(tasks, |task| Some(confirm_href(task))),
        Err(_) => r#"<p class="hint">Tasks are unavailable right now.</p>"#.to_string(),
    };

    let (cells, verdict) = match view.summary {
        Ok(summary) => {
            let verdict = TargetVerdict::of(summary);
            (
                [
                    summary.counts.total.to_string(),
                    summary.counts.on_time.to_string(),
                    summary.counts.late.to_string(),
                    summary.counts.pending.to_string(),
                    format_percent(summary.target_percent),
                    format_percent(summary.achieved_percent),
                ],
                format!(
                    r#"<p id="statusMessage" class="{}">{}</p>"#,
                    verdict.css_class(),
                    verdict.message()
                ),
            )
        }
        Err(_) => (
            std::array::from_fn(|_| "-".to_string()),
            r#"<p id="statusMessage"></p>"#.to_string(),
        ),
    };
    let [total, on_time, late, pending, target, achieved] = cells;

    format!(
        r#"<section class="card">
      <h2>My Performance</h2>
      <div class="panel">
        <div class="stat"><span class="label">Total</span><span id="total" class="value">{total}</span></div>
        <div class="stat"><span class="label">On Time</span><span id="onTime" class="value status-on-time">{on_time}</span></div>
        <div class="stat"><span class="label">Late</span><span id="late" class="value status-late">{late}</span></div>
        <div class="stat"><span class="label">Pending</span><span id="pending" class="value status-pending">{pending}</span></div>
        <div class="stat"><span class="label">Target %</span><span id="targetPercent" class="value">{target}</span></div>
        <div class="stat"><span class="label">Achieved %</span><span id="achieved" class="value">{achieved}</span></div>
      </div>
      {verdict}
    </section>

    <section class="card">
      <h2>My Tasks</h2>
      <div id="taskList" class="task-list">{tasks}</div>
    </section>"#
    )
}
