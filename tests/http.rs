use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct DashboardView {
    total_responses: u64,
    global_avg: Option<f64>,
    distribution: [u64; 4],
    critical_pct: Option<f64>,
    positive_pct: Option<f64>,
    satisfaction_index: Option<f64>,
    insights: Option<Insights>,
}

#[derive(Debug, Deserialize)]
struct Insights {
    best: AreaScore,
    worst: AreaScore,
    most_active: AreaScore,
}

#[derive(Debug, Deserialize)]
struct AreaScore {
    key: String,
    value: f64,
}

#[derive(Debug, Deserialize)]
struct CommentsView {
    total: usize,
    shown: usize,
    areas: Vec<AreaCount>,
    comments: Vec<CommentCard>,
}

#[derive(Debug, Deserialize)]
struct AreaCount {
    key: String,
    count: usize,
}

#[derive(Debug, Deserialize)]
struct CommentCard {
    area_key: String,
    text: String,
    registered: String,
}

// ===== Stub survey backend =====
//
// Stands in for the external API on its own runtime thread so it outlives
// the per-test runtimes.

#[derive(Clone, Default)]
struct StubState {
    submissions: Arc<Mutex<Vec<Value>>>,
}

async fn stub_stats() -> Json<Value> {
    Json(json!({
        "total_responses": 10,
        "global": { "avg": 3.0, "per_value": { "1": 2, "3": 5, "4": 3 } },
        "timeline": [
            { "date": "2026-08-01", "count": 4 },
            { "date": "2026-08-02", "count": 6 }
        ],
        "stats": {
            "comercial_1": { "sum": 6, "count": 2 },
            "rrhh_1": { "sum": 5, "count": 5 },
            "foo_1": { "sum": 40, "count": 10 }
        }
    }))
}

async fn stub_comments() -> Json<Value> {
    Json(json!({
        "comments": [
            {
                "area_key": "comercial",
                "field": "comercial_mejoras",
                "text": "Falta seguimiento postventa",
                "created_at": "2026-07-31T18:04:11.284301"
            },
            {
                "area_key": "rrhh",
                "field": "rrhh_mejoras",
                "text": "Más formación interna",
                "created_at": "2026-08-01T09:12:00"
            },
            {
                "field": "otros_mejoras",
                "text": "Sugerencia general"
            }
        ]
    }))
}

async fn stub_submit(State(state): State<StubState>, Json(payload): Json<Value>) -> Response {
    // Magic marker value lets tests drive the backend into a 500.
    if payload["otros_mejoras"] == "provocar-error" {
        return (StatusCode::INTERNAL_SERVER_ERROR, "error guardando").into_response();
    }
    state.submissions.lock().await.push(payload);
    Json(json!({ "ok": true, "message": "Encuesta guardada correctamente" })).into_response()
}

fn stub_router(state: StubState) -> Router {
    Router::new()
        .route("/api/stats", get(stub_stats))
        .route("/api/comments", get(stub_comments))
        .route("/api/encuesta", post(stub_submit))
        .with_state(state)
}

struct StubHandle {
    base_url: String,
    state: StubState,
}

static STUB: Lazy<StubHandle> = Lazy::new(|| {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().expect("stub runtime");
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind stub");
            let addr = listener.local_addr().unwrap();
            let state = StubState::default();
            tx.send((format!("http://{addr}"), state.clone())).unwrap();
            axum::serve(listener, stub_router(state)).await.unwrap();
        });
    });
    let (base_url, state) = rx.recv().expect("stub startup");
    StubHandle { base_url, state }
});

// ===== Spawned application under test =====

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

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/")).send().await {
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

async fn spawn_server(backend_url: &str) -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_survey_web"))
        .env("PORT", port.to_string())
        .env("BACKEND_URL", backend_url)
        .env("REFRESH_SECS", "3600")
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
    let server = Arc::new(spawn_server(&STUB.base_url).await);
    *guard = Some(Arc::clone(&server));
    server
}

#[tokio::test]
async fn http_dashboard_json_reports_aggregates() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let view: DashboardView = client
        .get(format!("{}/api/dashboard", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(view.total_responses, 10);
    assert_eq!(view.global_avg, Some(3.0));
    assert_eq!(view.distribution, [2, 0, 5, 3]);
    assert_eq!(view.critical_pct, Some(20.0));
    assert_eq!(view.positive_pct, Some(80.0));
    assert_eq!(view.satisfaction_index, Some(75.0));

    let insights = view.insights.expect("insights present");
    assert_eq!(insights.best.key, "comercial");
    assert_eq!(insights.best.value, 3.0);
    assert_eq!(insights.worst.key, "rrhh");
    assert_eq!(insights.worst.value, 1.0);
    assert_eq!(insights.most_active.key, "rrhh");
    assert_eq!(insights.most_active.value, 5.0);
}

#[tokio::test]
async fn http_dashboard_page_renders_kpis() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let page = client
        .get(format!("{}/dashboard", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(page.contains("Resultados de la encuesta"));
    assert!(page.contains(">10<"));
    assert!(page.contains("3.00"));
    assert!(page.contains("2026-08-02 · 6 respuestas"));
    assert!(page.contains("Falta seguimiento postventa"));
}

#[tokio::test]
async fn http_comments_filter_by_area_and_search() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let all: CommentsView = client
        .get(format!("{}/api/comments", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all.total, 3);
    assert_eq!(all.shown, 3);

    let by_area: CommentsView = client
        .get(format!("{}/api/comments", server.base_url))
        .query(&[("area", "comercial")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(by_area.total, 1);
    assert_eq!(by_area.comments[0].area_key, "comercial");
    assert_eq!(by_area.comments[0].registered, "Registrado el 31/07/2026");

    let by_search: CommentsView = client
        .get(format!("{}/api/comments", server.base_url))
        .query(&[("q", "FORMACIÓN")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(by_search.total, 1);
    assert_eq!(by_search.comments[0].area_key, "rrhh");

    // The comment without an area_key files under the fallback bucket.
    let fallback: CommentsView = client
        .get(format!("{}/api/comments", server.base_url))
        .query(&[("area", "otros")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fallback.total, 1);
    assert_eq!(fallback.comments[0].text, "Sugerencia general");
    assert_eq!(fallback.comments[0].registered, "fecha no disponible");
    assert_eq!(fallback.areas.len(), 1);
    assert_eq!(fallback.areas[0].key, "otros");
    assert_eq!(fallback.areas[0].count, 1);
}

#[tokio::test]
async fn http_form_submission_forwards_flat_json() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let page = client
        .post(format!("{}/encuesta", server.base_url))
        .form(&[
            ("comercial_1", "3"),
            ("comercial_mejoras", "marcador-envio-ok"),
        ])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(page.contains("¡Gracias por completar la evaluación!"));
    assert!(page.contains("class=\"is-submitted\""));

    let submissions = STUB.state.submissions.lock().await;
    let forwarded = submissions
        .iter()
        .find(|payload| payload["comercial_mejoras"] == "marcador-envio-ok")
        .expect("submission forwarded to backend");
    assert_eq!(forwarded["comercial_1"], "3");
}

#[tokio::test]
async fn http_rejected_submission_shows_error_banner() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let page = client
        .post(format!("{}/encuesta", server.base_url))
        .form(&[("comercial_1", "3"), ("otros_mejoras", "provocar-error")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(page.contains("Hubo un error guardando tus respuestas"));
    assert!(!page.contains("class=\"is-submitted\""));

    let submissions = STUB.state.submissions.lock().await;
    assert!(submissions
        .iter()
        .all(|payload| payload["otros_mejoras"] != "provocar-error"));
}

#[tokio::test]
async fn http_unreachable_backend_degrades_per_flow() {
    let _guard = TEST_LOCK.lock().await;
    // Point a fresh instance at a port nobody listens on.
    let dead_backend = format!("http://127.0.0.1:{}", pick_free_port());
    let server = spawn_server(&dead_backend).await;
    let client = Client::new();

    let page = client
        .post(format!("{}/encuesta", server.base_url))
        .form(&[("comercial_1", "2")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Hubo un error guardando tus respuestas"));
    assert!(!page.contains("class=\"is-submitted\""));

    let dashboard = client
        .get(format!("{}/dashboard", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(dashboard.contains("Error cargando datos"));
    assert!(dashboard.contains("Error cargando comentarios"));

    let api = client
        .get(format!("{}/api/dashboard", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(api.status(), reqwest::StatusCode::BAD_GATEWAY);
}
