use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct PainReading {
    id: String,
    user_id: String,
    score: u8,
    location: Option<String>,
    quality: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ActivityEvent {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    duration_minutes: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChartPoint {
    date: String,
    avg: f64,
    min: u8,
    max: u8,
    has_event: bool,
    events_summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    user_id: String,
}

const TEST_USER: &str = "http-test-user";

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

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

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

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("pain_tracker_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/user")).send().await {
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
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_pain_tracker"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("APP_USER_ID", TEST_USER)
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

async fn post_pain(client: &Client, base_url: &str, body: serde_json::Value) -> PainReading {
    let response = client
        .post(format!("{base_url}/api/pain"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

async fn post_event(client: &Client, base_url: &str, body: serde_json::Value) -> ActivityEvent {
    let response = client
        .post(format!("{base_url}/api/events"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

async fn chart_for_day(client: &Client, base_url: &str, day: &str) -> Vec<ChartPoint> {
    client
        .get(format!("{base_url}/api/chart?from={day}&to={day}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_reports_configured_user() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let user: UserResponse = client
        .get(format!("{}/api/user", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(user.user_id, TEST_USER);
}

#[tokio::test]
async fn http_pain_log_is_listed_and_owned() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let created = post_pain(
        &client,
        &server.base_url,
        serde_json::json!({
            "timestamp": "2020-02-01T09:15",
            "score": 6,
            "location": "lower back",
            "quality": "dull",
        }),
    )
    .await;
    assert_eq!(created.user_id, TEST_USER);
    assert_eq!(created.score, 6);
    assert_eq!(created.location.as_deref(), Some("lower back"));
    assert_eq!(created.quality.as_deref(), Some("dull"));

    let listed: Vec<PainReading> = client
        .get(format!(
            "{}/api/pain?from=2020-02-01&to=2020-02-01",
            server.base_url
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);
}

#[tokio::test]
async fn http_rejects_out_of_range_score() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/pain", server.base_url))
        .json(&serde_json::json!({ "score": 11 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .post(format!("{}/api/events", server.base_url))
        .json(&serde_json::json!({ "type": "swim" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_chart_joins_activity_days() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    for (timestamp, score) in [("2020-03-01T08:00", 2), ("2020-03-01T20:00", 6)] {
        post_pain(
            &client,
            &server.base_url,
            serde_json::json!({ "timestamp": timestamp, "score": score }),
        )
        .await;
    }
    post_event(
        &client,
        &server.base_url,
        serde_json::json!({ "timestamp": "2020-03-01T12:00", "type": "pt", "duration_minutes": 45 }),
    )
    .await;
    // Activity with no pain readings that day.
    post_event(
        &client,
        &server.base_url,
        serde_json::json!({ "timestamp": "2020-03-02T12:00", "type": "run" }),
    )
    .await;

    let points: Vec<ChartPoint> = client
        .get(format!(
            "{}/api/chart?from=2020-03-01&to=2020-03-02",
            server.base_url
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(points.len(), 1);
    let point = &points[0];
    assert_eq!(point.date, "2020-03-01");
    assert_eq!(point.avg, 4.0);
    assert_eq!((point.min, point.max), (2, 6));
    assert!(point.has_event);
    assert_eq!(point.events_summary.as_deref(), Some("pt"));
}

#[tokio::test]
async fn http_events_filter_by_type() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let drive = post_event(
        &client,
        &server.base_url,
        serde_json::json!({ "timestamp": "2020-04-01T08:00", "type": "long_drive", "duration_minutes": 120 }),
    )
    .await;
    post_event(
        &client,
        &server.base_url,
        serde_json::json!({ "timestamp": "2020-04-01T18:00", "type": "elliptical" }),
    )
    .await;

    let drives: Vec<ActivityEvent> = client
        .get(format!(
            "{}/api/events?type=long_drive&from=2020-04-01&to=2020-04-01",
            server.base_url
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(drives.len(), 1);
    assert_eq!(drives[0].id, drive.id);
    assert_eq!(drives[0].kind, "long_drive");
    assert_eq!(drives[0].duration_minutes, Some(120));
}

#[tokio::test]
async fn http_update_and_delete_pain_log() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let created = post_pain(
        &client,
        &server.base_url,
        serde_json::json!({ "timestamp": "2020-05-01T10:00", "score": 3, "location": "knee" }),
    )
    .await;

    let updated: PainReading = client
        .patch(format!("{}/api/pain/{}", server.base_url, created.id))
        .json(&serde_json::json!({ "score": 8, "location": "" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated.score, 8);
    assert_eq!(updated.location, None);

    let points = chart_for_day(&client, &server.base_url, "2020-05-01").await;
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].avg, 8.0);

    let url = format!("{}/api/pain/{}", server.base_url, created.id);
    let response = client.delete(&url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = client.delete(&url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert!(chart_for_day(&client, &server.base_url, "2020-05-01")
        .await
        .is_empty());
}

#[tokio::test]
async fn http_form_submission_shows_on_pages() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/pain", server.base_url))
        .form(&[
            ("score", "7"),
            ("date", "2020-06-01"),
            ("time", "07:45"),
            ("location", "left <shoulder>"),
            ("quality", ""),
            ("notes", ""),
        ])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let dashboard = response.text().await.unwrap();
    assert!(dashboard.contains("Pain dashboard"));

    let page = client
        .get(format!(
            "{}/logs/pain?from=2020-06-01&to=2020-06-01",
            server.base_url
        ))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("left &lt;shoulder&gt;"));

    let response = client
        .post(format!("{}/events", server.base_url))
        .form(&[
            ("type", "pt"),
            ("date", "2020-06-01"),
            ("time", ""),
            ("duration_minutes", "30"),
            ("intensity", "moderate"),
            ("notes", "clamshells"),
        ])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let events_page = response.text().await.unwrap();
    assert!(events_page.contains("clamshells"));

    let points = chart_for_day(&client, &server.base_url, "2020-06-01").await;
    assert_eq!(points.len(), 1);
    assert!(points[0].has_event);
}

#[tokio::test]
async fn http_rejects_unknown_range_preset() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/api/chart?preset=14d", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
