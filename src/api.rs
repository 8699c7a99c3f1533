//! REST API server for the finance assistant
//!
//! Thin adapter over [`FinanceAssistant`]: loads the user's profile, grants
//! and session from the [`ProfileStore`], runs one operation and stores the
//! updated session.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use uuid::Uuid;

use crate::assistant::FinanceAssistant;
use crate::error::AssistantError;
use crate::locale::Locale;
use crate::models::AccessGrant;
use crate::state::{ProfileStore, Theme};

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    /// One-off override; the session preference applies otherwise
    pub locale: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SessionRequest {
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub locale: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PrivacyRequest {
    pub user_id: Option<String>,
    pub grants: AccessGrant,
}

#[derive(Debug, Default, Deserialize)]
pub struct PreferencesRequest {
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub locale: Option<String>,
    pub theme: Option<String>,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

type ApiResult = (StatusCode, Json<ApiResponse>);

fn ok<T: Serialize>(data: T) -> ApiResult {
    (StatusCode::OK, Json(ApiResponse::success(data)))
}

fn failure(e: AssistantError) -> ApiResult {
    match e {
        AssistantError::InvalidInput(msg) => {
            (StatusCode::BAD_REQUEST, Json(ApiResponse::error(msg)))
        }
        other => {
            error!("Request failed: {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Request failed. Please try again.".into())),
            )
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub assistant: Arc<FinanceAssistant>,
    pub store: Arc<dyn ProfileStore>,
    pub sessions: SessionLocks,
}

impl ApiState {
    pub fn new(assistant: Arc<FinanceAssistant>, store: Arc<dyn ProfileStore>) -> Self {
        Self {
            assistant,
            store,
            sessions: SessionLocks::default(),
        }
    }
}

/// One lock per session id. Handlers that load, change and save a session
/// hold it for the whole sequence so concurrent turns are not lost.
#[derive(Clone, Default)]
pub struct SessionLocks(Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>);

impl SessionLocks {
    pub async fn acquire(&self, session_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.0.lock().await;
            locks.entry(session_id).or_default().clone()
        };
        lock.lock_owned().await
    }
}

/// =============================
/// Helpers - Stable Ids
/// =============================

fn stable_uuid_from_string(input: &str) -> Uuid {
    use sha2::{Digest, Sha256};

    let hash = Sha256::digest(input.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&hash[..16]);

    // Set UUID version (4) and variant (RFC4122) bits.
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    Uuid::from_bytes(bytes)
}

fn parse_or_stable_uuid(value: Option<&str>, fallback_seed: &str) -> Uuid {
    match value {
        Some(v) if !v.trim().is_empty() => {
            Uuid::parse_str(v).unwrap_or_else(|_| stable_uuid_from_string(v))
        }
        _ => stable_uuid_from_string(fallback_seed),
    }
}

/// User id, and a session id that defaults to one session per user
fn ids(user_id: Option<&str>, session_id: Option<&str>) -> (Uuid, Uuid) {
    let user = parse_or_stable_uuid(user_id, "anonymous-user");
    let session = parse_or_stable_uuid(session_id, &format!("session-{}", user));
    (user, session)
}

fn requested_locale(raw: Option<&str>) -> Option<Locale> {
    raw.map(Locale::new).filter(|l| !l.as_str().is_empty())
}

/// =============================
/// Handlers
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn chat_handler(State(state): State<ApiState>, Json(req): Json<ChatRequest>) -> ApiResult {
    let (user_id, session_id) = ids(req.user_id.as_deref(), req.session_id.as_deref());

    let run = async {
        let _guard = state.sessions.acquire(session_id).await;
        let record = state.store.load_user(user_id).await?;
        let mut session = state.store.load_session(session_id).await?;

        // A one-off override does not change the stored preference
        let preference = session.locale.clone();
        if let Some(locale) = requested_locale(req.locale.as_deref()) {
            session.locale = Some(locale);
        }

        let reply = state
            .assistant
            .chat(&mut session, &req.message, &record.profile, &record.grants)
            .await;
        session.locale = preference;
        let reply = reply?;

        state.store.save_session(session_id, session).await?;
        Ok::<_, AssistantError>(reply)
    };

    match run.await {
        Ok(reply) => {
            info!(
                session = %session_id,
                source = ?reply.source,
                locale = %reply.locale,
                "Chat answered"
            );
            ok(serde_json::json!({
                "response": reply.text,
                "locale": reply.locale,
                "source": reply.source,
                "intent": reply.intent,
                "user_id": user_id.to_string(),
                "session_id": session_id.to_string(),
            }))
        }
        Err(e) => failure(e),
    }
}

async fn insights_handler(
    State(state): State<ApiState>,
    Query(req): Query<SessionRequest>,
) -> ApiResult {
    let (user_id, session_id) = ids(req.user_id.as_deref(), req.session_id.as_deref());

    let run = async {
        let record = state.store.load_user(user_id).await?;
        let session = state.store.load_session(session_id).await?;
        let locale = requested_locale(req.locale.as_deref()).or(session.locale);
        Ok::<_, AssistantError>(state.assistant.insights(
            &record.profile,
            &record.grants,
            locale.as_ref(),
        ))
    };

    match run.await {
        Ok(insights) => ok(serde_json::json!({ "insights": insights })),
        Err(e) => failure(e),
    }
}

async fn budget_handler(
    State(state): State<ApiState>,
    Json(req): Json<SessionRequest>,
) -> ApiResult {
    let (user_id, _) = ids(req.user_id.as_deref(), None);

    match state.store.load_user(user_id).await {
        Ok(record) => ok(serde_json::json!({
            "budget": state.assistant.build_budget(&record.profile, &record.grants),
        })),
        Err(e) => failure(e),
    }
}

async fn summarize_handler(
    State(state): State<ApiState>,
    Json(req): Json<SessionRequest>,
) -> ApiResult {
    let (_, session_id) = ids(req.user_id.as_deref(), req.session_id.as_deref());

    match state.store.load_session(session_id).await {
        Ok(session) => {
            let locale = requested_locale(req.locale.as_deref()).or(session.locale.clone());
            let (summary, source) = state
                .assistant
                .summarize(&session.log, locale.as_ref())
                .await;
            ok(serde_json::json!({ "summary": summary, "source": source }))
        }
        Err(e) => failure(e),
    }
}

async fn clear_handler(
    State(state): State<ApiState>,
    Json(req): Json<SessionRequest>,
) -> ApiResult {
    let (_, session_id) = ids(req.user_id.as_deref(), req.session_id.as_deref());

    let run = async {
        let _guard = state.sessions.acquire(session_id).await;
        let mut session = state.store.load_session(session_id).await?;
        session.log.clear();
        state.store.save_session(session_id, session).await
    };

    match run.await {
        Ok(()) => ok(serde_json::json!({ "status": "cleared" })),
        Err(e) => failure(e),
    }
}

async fn privacy_handler(
    State(state): State<ApiState>,
    Json(req): Json<PrivacyRequest>,
) -> ApiResult {
    let (user_id, _) = ids(req.user_id.as_deref(), None);

    match state.store.save_grants(user_id, req.grants).await {
        Ok(()) => {
            info!(user = %user_id, granted = req.grants.granted().count(), "Privacy settings updated");
            ok(serde_json::json!({ "grants": req.grants }))
        }
        Err(e) => failure(e),
    }
}

async fn preferences_handler(
    State(state): State<ApiState>,
    Json(req): Json<PreferencesRequest>,
) -> ApiResult {
    let (_, session_id) = ids(req.user_id.as_deref(), req.session_id.as_deref());
    let registry = state.assistant.engine().registry().clone();

    let run = async {
        let _guard = state.sessions.acquire(session_id).await;
        let mut session = state.store.load_session(session_id).await?;

        if let Some(locale) = requested_locale(req.locale.as_deref()) {
            // Unsupported choices fall back to the default language
            session.locale = Some(if registry.is_supported(&locale) {
                locale
            } else {
                registry.default_locale().clone()
            });
        }
        if let Some(theme) = req.theme.as_deref() {
            session.theme = Theme::parse(theme);
        }

        let saved = (session.locale.clone(), session.theme);
        state.store.save_session(session_id, session).await?;
        Ok::<_, AssistantError>(saved)
    };

    match run.await {
        Ok((locale, theme)) => ok(serde_json::json!({ "locale": locale, "theme": theme })),
        Err(e) => failure(e),
    }
}

async fn status_handler(State(state): State<ApiState>) -> ApiResult {
    let registry = state.assistant.engine().registry();
    ok(serde_json::json!({
        "backend_configured": state.assistant.backend_configured(),
        "backend": state.assistant.backend_name(),
        "default_locale": registry.default_locale(),
        "locales": registry.locales().collect::<Vec<_>>(),
    }))
}

/// =============================
/// Router
/// =============================

pub fn create_router(assistant: Arc<FinanceAssistant>, store: Arc<dyn ProfileStore>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat_handler))
        .route("/api/insights", get(insights_handler))
        .route("/api/budget", post(budget_handler))
        .route("/api/summarize", post(summarize_handler))
        .route("/api/clear", post(clear_handler))
        .route("/api/privacy", post(privacy_handler))
        .route("/api/locale", post(preferences_handler))
        .route("/api/status", get(status_handler))
        .with_state(ApiState::new(assistant, store))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    assistant: Arc<FinanceAssistant>,
    store: Arc<dyn ProfileStore>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(assistant, store);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::QueryEngine;
    use crate::error::BackendError;
    use crate::gemini::GenerativeBackend;
    use crate::memory::ContextMessage;
    use crate::models::Category;
    use std::time::Duration;
    use crate::state::InMemoryProfileStore;

    fn state() -> ApiState {
        ApiState::new(
            Arc::new(FinanceAssistant::new(QueryEngine::builtin().unwrap())),
            Arc::new(InMemoryProfileStore::default()),
        )
    }

    /// Answers after a short delay so two requests overlap
    struct Slow;

    #[async_trait::async_trait]
    impl GenerativeBackend for Slow {
        fn name(&self) -> &str {
            "slow"
        }

        async fn generate(
            &self,
            _prompt: &str,
            _context: &[ContextMessage],
            _timeout: Duration,
        ) -> std::result::Result<String, BackendError> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok("Noted.".to_string())
        }
    }

    fn chat(message: &str) -> ChatRequest {
        ChatRequest {
            message: message.to_string(),
            user_id: Some("alice".to_string()),
            session_id: None,
            locale: None,
        }
    }

    fn session(user: &str) -> SessionRequest {
        SessionRequest {
            user_id: Some(user.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_stable_ids() {
        let a = stable_uuid_from_string("alice");
        assert_eq!(a, stable_uuid_from_string("alice"));
        assert_ne!(a, stable_uuid_from_string("bob"));
        assert_eq!(a.get_version_num(), 4);

        let explicit = Uuid::new_v4();
        assert_eq!(
            parse_or_stable_uuid(Some(&explicit.to_string()), "x"),
            explicit
        );
        assert_eq!(parse_or_stable_uuid(Some("  "), "x"), stable_uuid_from_string("x"));
    }

    #[tokio::test]
    async fn test_chat_round_trip() {
        let state = state();
        let (status, Json(body)) =
            chat_handler(State(state.clone()), Json(chat("What are my total assets?"))).await;

        assert_eq!(status, StatusCode::OK);
        let data = body.data.unwrap();
        assert!(data["response"].as_str().unwrap().contains("330,000"));
        assert_eq!(data["source"], "deterministic");
        assert_eq!(data["locale"], "en");

        let (user, session_id) = ids(Some("alice"), None);
        assert_eq!(data["user_id"], user.to_string());
        let stored = state.store.load_session(session_id).await.unwrap();
        assert_eq!(stored.log.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_chats_keep_every_turn() {
        let assistant = FinanceAssistant::new(QueryEngine::builtin().unwrap())
            .with_backend(Arc::new(Slow), Duration::from_secs(1));
        let state = ApiState::new(Arc::new(assistant), Arc::new(InMemoryProfileStore::default()));

        let (first, second) = tokio::join!(
            chat_handler(State(state.clone()), Json(chat("What are my total assets?"))),
            chat_handler(State(state.clone()), Json(chat("What is my credit score?"))),
        );
        assert_eq!(first.0, StatusCode::OK);
        assert_eq!(second.0, StatusCode::OK);

        let (_, session_id) = ids(Some("alice"), None);
        let stored = state.store.load_session(session_id).await.unwrap();
        assert_eq!(stored.log.len(), 2);
    }

    #[tokio::test]
    async fn test_blank_chat_is_bad_request() {
        let (status, Json(body)) = chat_handler(State(state()), Json(chat("  "))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.success);
    }

    #[tokio::test]
    async fn test_privacy_update_hides_category() {
        let state = state();
        let req = PrivacyRequest {
            user_id: Some("alice".to_string()),
            grants: AccessGrant::all().with(Category::Assets, false),
        };
        let (status, _) = privacy_handler(State(state.clone()), Json(req)).await;
        assert_eq!(status, StatusCode::OK);

        let (_, Json(body)) =
            chat_handler(State(state), Json(chat("What are my total assets?"))).await;
        let text = body.data.unwrap()["response"].as_str().unwrap().to_string();
        assert!(!text.contains("330,000"));
    }

    #[tokio::test]
    async fn test_preferences_fallback_and_theme() {
        let state = state();
        let req = PreferencesRequest {
            user_id: Some("alice".to_string()),
            locale: Some("fr".to_string()),
            theme: Some("neon".to_string()),
            ..Default::default()
        };
        let (_, Json(body)) = preferences_handler(State(state.clone()), Json(req)).await;
        let data = body.data.unwrap();
        assert_eq!(data["locale"], "en");
        assert_eq!(data["theme"], "system");

        let req = PreferencesRequest {
            user_id: Some("alice".to_string()),
            locale: Some("hi".to_string()),
            ..Default::default()
        };
        preferences_handler(State(state.clone()), Json(req)).await;

        let (_, Json(body)) =
            chat_handler(State(state), Json(chat("What are my total assets?"))).await;
        assert_eq!(body.data.unwrap()["locale"], "hi");
    }

    #[tokio::test]
    async fn test_clear_and_summarize() {
        let state = state();
        chat_handler(State(state.clone()), Json(chat("What is my EPF balance?"))).await;

        let (_, Json(body)) = summarize_handler(State(state.clone()), Json(session("alice"))).await;
        let data = body.data.unwrap();
        assert_eq!(data["source"], "fallback");
        assert!(data["summary"].as_str().unwrap().contains("EPF"));

        clear_handler(State(state.clone()), Json(session("alice"))).await;
        let (_, Json(body)) = summarize_handler(State(state), Json(session("alice"))).await;
        assert_eq!(body.data.unwrap()["source"], "empty");
    }

    #[tokio::test]
    async fn test_budget_insights_and_status() {
        let state = state();

        let (_, Json(body)) = budget_handler(State(state.clone()), Json(session("alice"))).await;
        assert_eq!(body.data.unwrap()["budget"]["monthly_income"], 5_000.0);

        let (_, Json(body)) =
            insights_handler(State(state.clone()), Query(session("alice"))).await;
        assert_eq!(body.data.unwrap()["insights"].as_array().unwrap().len(), 3);

        let (_, Json(body)) = status_handler(State(state)).await;
        let data = body.data.unwrap();
        assert_eq!(data["backend_configured"], false);
        assert_eq!(data["locales"].as_array().unwrap().len(), 3);
    }
}
