use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use tower::ServiceExt;

use crescent::config::AppConfig;
use crescent::errors::AppError;
use crescent::handlers;
use crescent::models::{
    Booking, BookingPage, BookingStatus, ChatStatus, HistoryEntry, StatusFilter,
};
use crescent::services::backend::{BookingService, ChatService};
use crescent::services::console::Notifier;
use crescent::state::AppState;

// ── Mock Booking Service ──

#[derive(Default)]
struct MockBackend {
    bookings: Mutex<Vec<Booking>>,
    list_calls: AtomicUsize,
    mutation_calls: AtomicUsize,
    fail_mutations: AtomicBool,
    fail_chat: AtomicBool,
}

fn booking(id: i64, status: BookingStatus) -> Booking {
    Booking {
        id,
        customer_name: format!("Guest {id}"),
        customer_phone: "+923001112223".to_string(),
        customer_email: Some("guest@example.com".to_string()),
        event_type: "Walima".to_string(),
        event_date: NaiveDate::from_ymd_opt(2026, 2, 14).unwrap(),
        guest_count: Some(250),
        package_type: Some("Platinum".to_string()),
        special_requests: None,
        status,
        created_at: NaiveDate::from_ymd_opt(2025, 9, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap(),
        updated_at: None,
    }
}

impl MockBackend {
    fn with(bookings: Vec<Booking>) -> Self {
        Self {
            bookings: Mutex::new(bookings),
            ..Default::default()
        }
    }
}

#[async_trait]
impl BookingService for MockBackend {
    async fn list_bookings(&self, filter: StatusFilter) -> Result<BookingPage, AppError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let bookings: Vec<Booking> = self
            .bookings
            .lock()
            .unwrap()
            .iter()
            .filter(|b| filter.map_or(true, |s| b.status == s))
            .cloned()
            .collect();
        Ok(BookingPage {
            total: bookings.len() as u64,
            bookings,
        })
    }

    async fn fetch_booking(&self, id: i64) -> Result<Booking, AppError> {
        self.bookings
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or(AppError::Upstream { status: 404 })
    }

    async fn update_status(&self, id: i64, status: BookingStatus) -> Result<(), AppError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(AppError::Upstream { status: 500 });
        }
        if let Some(b) = self.bookings.lock().unwrap().iter_mut().find(|b| b.id == id) {
            b.status = status;
        }
        Ok(())
    }

    async fn delete_booking(&self, id: i64) -> Result<(), AppError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(AppError::Upstream { status: 500 });
        }
        self.bookings.lock().unwrap().retain(|b| b.id != id);
        Ok(())
    }
}

#[async_trait]
impl ChatService for MockBackend {
    async fn chat(&self, message: &str, _history: &[HistoryEntry]) -> Result<String, AppError> {
        if self.fail_chat.load(Ordering::SeqCst) {
            return Err(AppError::Transport("connection refused".to_string()));
        }
        Ok(format!("Thanks for asking about {message}"))
    }

    async fn chat_status(&self) -> Result<ChatStatus, AppError> {
        Ok(ChatStatus { configured: true })
    }
}

#[derive(Default)]
struct MockNotifier {
    alerts: Mutex<Vec<String>>,
}

impl Notifier for MockNotifier {
    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}

// ── Helpers ──

fn test_config(admin_token: Option<&str>) -> AppConfig {
    AppConfig {
        port: 3000,
        backend_url: "http://localhost:8000".to_string(),
        admin_token: admin_token.map(str::to_string),
        contact_phone: "+92 300 1609087".to_string(),
        venue_name: "Star Crescent Marriage Lawn".to_string(),
        contact_delay: Duration::ZERO,
        chat_session_ttl: Duration::from_secs(60),
        chat_max_sessions: 10,
    }
}

struct Harness {
    state: Arc<AppState>,
    backend: Arc<MockBackend>,
    notifier: Arc<MockNotifier>,
}

impl Harness {
    fn new(bookings: Vec<Booking>, admin_token: Option<&str>) -> Self {
        let backend = Arc::new(MockBackend::with(bookings));
        let notifier = Arc::new(MockNotifier::default());
        let state = Arc::new(AppState::new(
            test_config(admin_token),
            backend.clone(),
            backend.clone(),
            notifier.clone(),
        ));
        Self {
            state,
            backend,
            notifier,
        }
    }

    fn app(&self) -> Router {
        handlers::router(self.state.clone())
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json(res: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

// ── Health ──

#[tokio::test]
async fn test_health() {
    let h = Harness::new(vec![], None);
    let res = h.app().oneshot(get("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = read_json(res).await;
    assert_eq!(json["status"], "ok");
}

// ── Console API Tests ──

#[tokio::test]
async fn test_console_requires_token_when_configured() {
    let h = Harness::new(vec![booking(1, BookingStatus::Pending)], Some("test-token"));

    let res = h.app().oneshot(get("/api/console/bookings")).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = h
        .app()
        .oneshot(
            Request::builder()
                .uri("/api/console/bookings")
                .header("Authorization", "Bearer test-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(h.backend.list_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_console_lists_rows_with_actions() {
    let h = Harness::new(
        vec![
            booking(1, BookingStatus::Pending),
            booking(2, BookingStatus::Confirmed),
            booking(3, BookingStatus::Rejected),
        ],
        None,
    );

    let res = h.app().oneshot(get("/api/console/bookings")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = read_json(res).await;

    assert_eq!(json["total"], 3);
    assert_eq!(json["stats"]["pending"], 1);
    assert!(json["error"].is_null());
    let rows = json["bookings"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["actions"], serde_json::json!(["confirm", "reject", "delete"]));
    assert_eq!(rows[1]["actions"], serde_json::json!(["cancel", "delete"]));
    assert_eq!(rows[2]["actions"], serde_json::json!(["delete"]));
}

#[tokio::test]
async fn test_console_filter_confirmed() {
    let h = Harness::new(
        vec![
            booking(1, BookingStatus::Pending),
            booking(2, BookingStatus::Confirmed),
            booking(3, BookingStatus::Rejected),
        ],
        None,
    );

    let res = h
        .app()
        .oneshot(get("/api/console/bookings?status=confirmed"))
        .await
        .unwrap();
    let json = read_json(res).await;

    assert_eq!(json["filter"], "confirmed");
    let rows = json["bookings"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["booking"]["id"], 2);
}

#[tokio::test]
async fn test_console_unknown_filter_rejected() {
    let h = Harness::new(vec![], None);
    let res = h
        .app()
        .oneshot(get("/api/console/bookings?status=archived"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(h.backend.list_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_reject_pending_booking_removes_controls() {
    let h = Harness::new(vec![booking(7, BookingStatus::Pending)], None);
    h.app().oneshot(get("/api/console/bookings")).await.unwrap();

    let res = h
        .app()
        .oneshot(json_request(
            "PUT",
            "/api/console/bookings/7/status",
            serde_json::json!({"status": "rejected"}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = read_json(res).await;

    let row = &json["bookings"][0];
    assert_eq!(row["booking"]["id"], 7);
    assert_eq!(row["booking"]["status"], "rejected");
    assert_eq!(row["actions"], serde_json::json!(["delete"]));
    assert_eq!(h.backend.list_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_invalid_transition_conflict() {
    let h = Harness::new(vec![booking(4, BookingStatus::Cancelled)], None);
    h.app().oneshot(get("/api/console/bookings")).await.unwrap();

    let res = h
        .app()
        .oneshot(json_request(
            "PUT",
            "/api/console/bookings/4/status",
            serde_json::json!({"status": "confirmed"}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(h.backend.mutation_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_failed_update_surfaces_alert() {
    let h = Harness::new(vec![booking(5, BookingStatus::Pending)], None);
    h.app().oneshot(get("/api/console/bookings")).await.unwrap();
    h.backend.fail_mutations.store(true, Ordering::SeqCst);

    let res = h
        .app()
        .oneshot(json_request(
            "PUT",
            "/api/console/bookings/5/status",
            serde_json::json!({"status": "confirmed"}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let json = read_json(res).await;
    assert_eq!(json["error"], "Failed to update booking");
    assert_eq!(
        *h.notifier.alerts.lock().unwrap(),
        vec!["Failed to update booking".to_string()]
    );
    assert_eq!(h.state.console.rows()[0].booking.status, BookingStatus::Pending);
}

#[tokio::test]
async fn test_delete_requires_confirmation() {
    let h = Harness::new(vec![booking(9, BookingStatus::Confirmed)], None);
    h.app().oneshot(get("/api/console/bookings")).await.unwrap();

    let res = h
        .app()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/console/bookings/9")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PRECONDITION_REQUIRED);
    let json = read_json(res).await;
    assert!(json["prompt"].as_str().unwrap().contains("cannot be undone"));
    assert_eq!(h.backend.mutation_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.backend.list_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_confirmed_delete_refetches() {
    let h = Harness::new(
        vec![booking(9, BookingStatus::Confirmed), booking(10, BookingStatus::Pending)],
        None,
    );
    h.app().oneshot(get("/api/console/bookings")).await.unwrap();

    let res = h
        .app()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/console/bookings/9?confirm=true")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = read_json(res).await;
    let rows = json["bookings"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["booking"]["id"], 10);
    assert_eq!(h.backend.list_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_booking_detail() {
    let h = Harness::new(vec![booking(3, BookingStatus::Pending)], None);

    let res = h.app().oneshot(get("/api/console/bookings/3")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = read_json(res).await;
    assert_eq!(json["package_type"], "Platinum");

    let res = h.app().oneshot(get("/api/console/bookings/42")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

// ── Chat API Tests ──

async fn open_session(h: &Harness) -> String {
    let res = h
        .app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chat/sessions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = read_json(res).await;
    assert_eq!(json["turns"].as_array().unwrap().len(), 1);
    assert_eq!(json["turns"][0]["role"], "assistant");
    json["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_chat_round_trip() {
    let h = Harness::new(vec![], None);
    let id = open_session(&h).await;

    let res = h
        .app()
        .oneshot(json_request(
            "POST",
            &format!("/api/chat/sessions/{id}/messages"),
            serde_json::json!({"message": "catering"}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = read_json(res).await;
    assert_eq!(json["reply"]["content"], "Thanks for asking about catering");
    assert_eq!(json["turns"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_chat_failure_returns_fallback() {
    let h = Harness::new(vec![], None);
    h.backend.fail_chat.store(true, Ordering::SeqCst);
    let id = open_session(&h).await;

    let res = h
        .app()
        .oneshot(json_request(
            "POST",
            &format!("/api/chat/sessions/{id}/messages"),
            serde_json::json!({"message": "hello"}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = read_json(res).await;
    assert!(json["reply"]["content"]
        .as_str()
        .unwrap()
        .contains("+92 300 1609087"));
}

#[tokio::test]
async fn test_chat_blank_message_and_unknown_session() {
    let h = Harness::new(vec![], None);
    let id = open_session(&h).await;

    let res = h
        .app()
        .oneshot(json_request(
            "POST",
            &format!("/api/chat/sessions/{id}/messages"),
            serde_json::json!({"message": "   "}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = h
        .app()
        .oneshot(get(&format!("/api/chat/sessions/{}", uuid::Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_chat_sessions_stay_bounded() {
    let h = Harness::new(vec![], None);
    let first = open_session(&h).await;
    for _ in 0..15 {
        open_session(&h).await;
    }

    assert_eq!(h.state.chat.len(), 10);
    let res = h
        .app()
        .oneshot(get(&format!("/api/chat/sessions/{first}")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_chat_status() {
    let h = Harness::new(vec![], None);
    let res = h.app().oneshot(get("/api/chat/status")).await.unwrap();
    let json = read_json(res).await;
    assert_eq!(json["configured"], true);
}

// ── Contact Form ──

#[tokio::test]
async fn test_contact_submission() {
    let h = Harness::new(vec![], None);

    let res = h
        .app()
        .oneshot(json_request(
            "POST",
            "/api/contact",
            serde_json::json!({
                "name": "Hina",
                "phone": "+923005556667",
                "event_date": "2026-03-01",
                "guests": 120
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = read_json(res).await;
    assert!(json["received_at"].is_string());

    let res = h
        .app()
        .oneshot(json_request(
            "POST",
            "/api/contact",
            serde_json::json!({"name": "", "phone": "+923005556667"}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_contact_accepts_browser_form_values() {
    let h = Harness::new(vec![], None);

    let res = h
        .app()
        .oneshot(json_request(
            "POST",
            "/api/contact",
            serde_json::json!({
                "name": "Sana",
                "email": "",
                "phone": "+923001234567",
                "event_date": "",
                "event_type": "",
                "guests": "",
                "message": ""
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = h
        .app()
        .oneshot(json_request(
            "POST",
            "/api/contact",
            serde_json::json!({
                "name": "Sana",
                "phone": "+923001234567",
                "event_date": "2026-04-12",
                "guests": "250"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
