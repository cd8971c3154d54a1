use axum::{
    Form, Json, Router,
    extract::Query,
    routing::get,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use once_cell::sync::Lazy;
use reqwest::{Client, Response, header, redirect::Policy};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

/// Stand-in for the spreadsheet backend. Runs on its own thread so it
/// outlives any single test runtime.
static BACKEND: Lazy<String> = Lazy::new(|| {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind backend port");
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, fake_backend()).await.unwrap();
        });
    });
    format!("http://{addr}/exec")
});

fn fake_backend() -> Router {
    Router::new().route("/exec", get(backend_read).post(backend_write))
}

async fn backend_read(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let action = params.get("action").map(String::as_str).unwrap_or_default();
    Json(match action {
        "getUserRole" => match params.get("email").map(String::as_str) {
            Some("admin@example.com") => json!({ "status": "success", "role": "Admin" }),
            Some("ravi@example.com") => json!({ "status": "success", "role": "User" }),
            _ => json!({ "status": "error", "message": "User not found" }),
        },
        "getAllEmployees" => json!({
            "status": "success",
            "employees": [{ "Name": "Ravi", "Email": "ravi@example.com", "Department": "Sales" }]
        }),
        "getAllTasks" => json!({
            "status": "success",
            "tasks": [{ "Task ID": "T1", "Task Name": "Daily report", "Description": "Send it" }]
        }),
        "getStatsAll" => json!({
            "status": "success",
            "summary": [
                { "total": 10, "onTime": 7, "late": 2, "pending": 1 },
                { "total": 5, "onTime": 5, "late": 0, "pending": 0 }
            ]
        }),
        "getFilteredStats" => json!({ "status": "success", "data": [] }),
        "getUserTasks" => json!({
            "status": "success",
            "tasks": [{ "Task ID": "T1", "Task": "Daily report", "Planned Date": "2025-07-01", "Status": "Pending" }]
        }),
        "getMyPerformance" => json!({
            "status": "success",
            "total": 4, "onTime": 4, "late": 0, "pending": 0, "target": 80, "achieved": 100
        }),
        other => json!({ "status": "error", "message": format!("unknown action {other}") }),
    })
}

async fn backend_write(Form(params): Form<HashMap<String, String>>) -> Json<Value> {
    let action = params.get("action").map(String::as_str).unwrap_or_default();
    Json(match action {
        "addTask" => json!({ "status": "success", "message": "Task added successfully" }),
        "markTaskDone" => json!({ "status": "success", "message": "Task updated" }),
        other => json!({ "status": "error", "message": format!("unknown action {other}") }),
    })
}

#[cfg(unix)]
mod cleanup {
    use std::sync::Once;
    use std::sync::atomic::{AtomicI32, Ordering};

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_path(stem: &str, extension: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("taskpulse_http_{stem}_{}_{nanos}.{extension}", std::process::id()));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/healthz")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let branding_path = unique_path("customize", "txt");
    std::fs::write(
        &branding_path,
        "Org: \"Acme Field Ops\"\nTagline: Every task, on time\nMobile: +1 555 0100\nAddress: 1 Main St: Suite 2\n",
    )
    .expect("write branding file");

    let child = Command::new(env!("CARGO_BIN_EXE_taskpulse"))
        .env("PORT", port.to_string())
        .env("API_BASE_URL", BACKEND.as_str())
        .env("GOOGLE_CLIENT_ID", "test-client.apps.example")
        .env("APP_PREFS_PATH", unique_path("prefs", "json"))
        .env("APP_BRANDING_PATH", branding_path)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

fn client() -> Client {
    Client::builder().redirect(Policy::none()).build().unwrap()
}

fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn cookies_from(response: &Response) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .collect::<Vec<_>>()
        .join("; ")
}

async fn sign_in(server: &TestServer, email: &str) -> (Response, String) {
    let token = encode(
        &Header::default(),
        &json!({ "email": email, "name": "Test Person" }),
        &EncodingKey::from_secret(b"identity-provider"),
    )
    .unwrap();
    let response = client()
        .post(format!("{}/portal/credential", server.base_url))
        .form(&[("credential", token.as_str()), ("g_csrf_token", "csrf")])
        .send()
        .await
        .unwrap();
    let cookies = cookies_from(&response);
    (response, cookies)
}

async fn page(server: &TestServer, path: &str, cookies: &str) -> String {
    client()
        .get(format!("{}{path}", server.base_url))
        .header(header::COOKIE, cookies)
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_portal_shows_branding() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let html = page(&server, "/portal", "").await;
    assert!(html.contains("<h1>Acme Field Ops</h1>"));
    assert!(html.contains("Every task, on time"));
    assert!(html.contains("Address: 1 Main St: Suite 2"));
    assert!(html.contains(r#"data-client_id="test-client.apps.example""#));
}

#[tokio::test]
async fn http_admin_signs_in_and_adds_task() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let (response, cookies) = sign_in(&server, "admin@example.com").await;
    assert_eq!(response.status(), reqwest::StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin");

    let html = page(&server, "/admin", &cookies).await;
    assert!(html.contains(r#"id="globalTotal" class="value">15<"#));
    assert!(html.contains("ravi@example.com"));

    let response = client()
        .post(format!("{}/admin/tasks", server.base_url))
        .header(header::COOKIE, &cookies)
        .form(&[("name", "Weekly sync"), ("description", "Team call")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/admin");

    let html = page(&server, "/admin", &cookies).await;
    assert!(html.contains("Task added successfully"));
}

#[tokio::test]
async fn http_user_marks_task_done() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let (response, cookies) = sign_in(&server, "ravi@example.com").await;
    assert_eq!(location(&response), "/performance");

    let html = page(&server, "/performance", &cookies).await;
    assert!(html.contains("Target Achieved!"));
    assert!(html.contains(r#"class="btn btn-mark-done""#));

    let response = client()
        .post(format!("{}/performance/tasks/done", server.base_url))
        .header(header::COOKIE, &cookies)
        .form(&[("taskId", "T1"), ("plannedDate", "2025-07-01")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/performance");

    let html = page(&server, "/performance", &cookies).await;
    assert!(html.contains("Task marked as done!"));
}

#[tokio::test]
async fn http_unknown_user_cannot_sign_in() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let (response, _) = sign_in(&server, "stranger@example.com").await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("Authentication Failed"));
    assert!(html.contains("Could not determine user role. Please try again."));
}
