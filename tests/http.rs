use chrono::{Duration as Days, Local};
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct Summary {
    current_streak: u32,
    best_streak: u32,
}

#[derive(Debug, Deserialize)]
struct HabitResponse {
    id: String,
    name: String,
    track_type: String,
    summary: Summary,
}

#[derive(Debug, Deserialize)]
struct SeriesPoint {
    date: String,
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SeriesResponse {
    range: String,
    points: Vec<SeriesPoint>,
    current_streak: u32,
}

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

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("habit_tracker_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/habits")).send().await {
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
    let child = Command::new(env!("CARGO_BIN_EXE_habit_tracker"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
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

async fn create(client: &Client, server: &TestServer, body: Value) -> HabitResponse {
    let response = client
        .post(format!("{}/api/habits", server.base_url))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

async fn cell(client: &Client, server: &TestServer, id: &str, date: &str, body: Value) -> reqwest::Response {
    client
        .post(format!("{}/api/habits/{id}/cells/{date}", server.base_url))
        .json(&body)
        .send()
        .await
        .unwrap()
}

async fn week_series(client: &Client, server: &TestServer, id: &str) -> SeriesResponse {
    client
        .get(format!("{}/api/habits/{id}/series?range=week", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

fn today() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

#[tokio::test]
async fn http_numeric_value_round_trip() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let habit = create(
        &client,
        &server,
        json!({ "name": "Reading", "track_type": "numeric", "unit": "pages" }),
    )
    .await;
    assert_eq!(habit.track_type, "numeric");
    let today = today();

    let response = cell(&client, &server, &habit.id, &today, json!({ "action": "commit", "value": "7" })).await;
    assert!(response.status().is_success());

    let series = week_series(&client, &server, &habit.id).await;
    assert_eq!(series.range, "week");
    assert_eq!(series.points.len(), 7);
    let last = series.points.last().unwrap();
    assert_eq!(last.date, today);
    assert_eq!(last.value, Some(7.0));
    assert_eq!(series.current_streak, 1);

    let blank = cell(&client, &server, &habit.id, &today, json!({ "action": "commit", "value": "" })).await;
    assert!(blank.status().is_success());
    let series = week_series(&client, &server, &habit.id).await;
    assert_eq!(series.points.last().unwrap().value, Some(7.0));

    let cleared = cell(&client, &server, &habit.id, &today, json!({ "action": "clear" })).await;
    assert!(cleared.status().is_success());
    let series = week_series(&client, &server, &habit.id).await;
    assert!(series.points.iter().all(|point| point.value.is_none()));
    assert_eq!(series.current_streak, 0);
}

#[tokio::test]
async fn http_boolean_toggle_twice_restores() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let habit = create(&client, &server, json!({ "name": "Water", "track_type": "boolean" })).await;
    let today = today();
    let yesterday = (Local::now().date_naive() - Days::days(1)).format("%Y-%m-%d").to_string();

    let first: HabitResponse = cell(&client, &server, &habit.id, &today, json!({ "action": "toggle" }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(first.summary.current_streak, 1);

    let listed: Vec<HabitResponse> = client
        .get(format!("{}/api/habits?range=week", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let listed = listed.iter().find(|other| other.id == habit.id).unwrap();
    assert_eq!(listed.summary.current_streak, 1);
    assert_eq!(listed.summary.best_streak, 1);

    let second: HabitResponse = cell(&client, &server, &habit.id, &yesterday, json!({ "action": "toggle" }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(second.summary.current_streak, 2);
    assert_eq!(second.summary.best_streak, 2);

    let third: HabitResponse = cell(&client, &server, &habit.id, &today, json!({ "action": "toggle" }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(third.summary.current_streak, 0);

    let series = week_series(&client, &server, &habit.id).await;
    let values: Vec<Option<f64>> = series.points.iter().map(|point| point.value).collect();
    assert!(values.iter().all(|value| value.is_some()));
    assert_eq!(values[6], Some(0.0));
    assert_eq!(values[5], Some(1.0));

    let wrong = cell(&client, &server, &habit.id, &today, json!({ "action": "clear" })).await;
    assert_eq!(wrong.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_chart_states() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let habit = create(
        &client,
        &server,
        json!({ "name": "Running", "track_type": "numeric", "unit": "km" }),
    )
    .await;
    let chart_url = format!("{}/api/habits/{}/chart", server.base_url, habit.id);

    let empty = client.get(&chart_url).send().await.unwrap();
    assert!(empty.status().is_success());
    assert_eq!(
        empty.headers().get("content-type").unwrap().to_str().unwrap(),
        "image/svg+xml"
    );
    assert!(empty.text().await.unwrap().contains("No data yet"));

    cell(&client, &server, &habit.id, &today(), json!({ "action": "commit", "value": "5" })).await;
    let svg = client
        .get(format!("{chart_url}?range=month"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(svg.contains("<circle"));
    assert!(svg.contains(": 5 km</title>"));

    let inverted = client
        .get(format!("{chart_url}?y_min=10&y_max=2"))
        .send()
        .await
        .unwrap();
    assert_eq!(inverted.status(), StatusCode::BAD_REQUEST);

    let unbounded = client
        .get(format!("{chart_url}?y_min=-inf"))
        .send()
        .await
        .unwrap();
    assert_eq!(unbounded.status(), StatusCode::BAD_REQUEST);

    let bad_range = client
        .get(format!("{chart_url}?range=decade"))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_range.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_edit_delete_and_grid() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let habit = create(
        &client,
        &server,
        json!({ "name": "Coding", "track_type": "numeric", "unit": "hours" }),
    )
    .await;
    let url = format!("{}/api/habits/{}", server.base_url, habit.id);

    let edited: HabitResponse = client
        .patch(&url)
        .json(&json!({ "name": "Side project" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(edited.name, "Side project");

    let grid = client
        .get(format!("{}/api/grid", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(grid.contains(&format!(r#"data-habit="{}""#, habit.id)));
    assert!(grid.contains("Side project (hours)"));

    let deleted = client.delete(&url).send().await.unwrap();
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let habits: Vec<HabitResponse> = client
        .get(format!("{}/api/habits", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(habits.iter().all(|other| other.id != habit.id));

    let missing = client
        .get(format!("{url}/series"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let bad_month = client
        .get(format!("{}/api/grid?year=2024&month=13", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_month.status(), StatusCode::BAD_REQUEST);
}
