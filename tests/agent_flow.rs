use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::State;
use axum::routing::{get, post};
use chrono::Utc;
use escrow_job_coordinator::app::{AppState, build_router};
use escrow_job_coordinator::config::environment::AppConfig;
use escrow_job_coordinator::module::job::crud;
use escrow_job_coordinator::module::job::schema::{
    AgentJobStatus, CreateJobResponse, GetJobResponse, HashScheme, JobStatus, ProvideInputResponse,
    SyncAgentStatusResponse,
};
use escrow_job_coordinator::module::registry::crud as registry_crud;
use escrow_job_coordinator::service::hash_service;
use escrow_job_coordinator::service::payment_node_service::{
    PurchaseNextAction, PurchaseSnapshot, RegistryEntry,
};
use http::Request;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tower::util::ServiceExt;

fn test_config() -> AppConfig {
    AppConfig {
        rust_env: "test".to_string(),
        api_host: "127.0.0.1".to_string(),
        api_port: 0,
        payment_node_base_url: "http://127.0.0.1:9".to_string(),
        payment_node_api_key: None,
        payment_node_timeout_ms: 2_000,
        agent_api_timeout_ms: 2_000,
        instance_id: "instance-test".to_string(),
        lock_timeout_ms: 10_000,
        lock_timeout_buffer_ms: 2_000,
        sync_page_size: 2,
        sync_auth_enabled: false,
        sync_auth_secret: None,
        webhook_agent_hired_url: None,
        webhook_max_retries: 1,
        webhook_attempt_timeout_ms: 500,
    }
}

async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock server");
    let addr = listener.local_addr().expect("mock addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}")
}

async fn send<R: serde::de::DeserializeOwned>(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<&Value>,
) -> (http::StatusCode, R) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

async fn register_agent(state: &AppState, agent_id: &str, api_base_url: &str) {
    registry_crud::upsert_agent_entry(
        state,
        &RegistryEntry {
            id: agent_id.to_string(),
            name: format!("Agent {agent_id}"),
            api_base_url: api_base_url.to_string(),
            seller_vkey: Some("vkey-1".to_string()),
            tags: vec!["nlp".to_string()],
        },
    )
    .await
    .expect("registry upsert");
}

async fn create_job(state: &AppState, blockchain_identifier: &str, agent_id: &str) -> String {
    let app = build_router(state.clone());
    let (status, body): (_, CreateJobResponse) = send(
        app,
        "POST",
        "/v1/jobs",
        Some(&json!({
            "blockchain_identifier": blockchain_identifier,
            "user_id": "user-1",
            "seller_vkey": "vkey-1",
            "identifier_from_purchaser": "purchaser-salt",
            "agent_id": agent_id,
            "agent_job_id": "remote-1",
            "input": "the input",
            "amount": 25
        })),
    )
    .await;
    assert_eq!(status, http::StatusCode::OK);
    body.job_id
}

#[tokio::test]
async fn agent_poll_applies_completed_status_and_verifies_result() {
    let agent = Router::new().route(
        "/status",
        get(|| async { axum::Json(json!({"status": "completed", "result": "42"})) }),
    );
    let agent_url = spawn_server(agent).await;

    let state = AppState::new(test_config());
    register_agent(&state, "agent-poll", &agent_url).await;
    let job_id = create_job(&state, "bci-agent-1", "agent-poll").await;

    crud::apply_purchase(
        &state,
        &PurchaseSnapshot {
            id: "bci-agent-1".to_string(),
            on_chain_state: Some("ResultSubmitted".to_string()),
            input_hash: None,
            result_hash: Some(hash_service::content_digest(
                HashScheme::Salted,
                "purchaser-salt",
                "42",
            )),
            next_action: PurchaseNextAction {
                requested_action: "None".to_string(),
                error_type: None,
                error_note: None,
            },
            current_transaction: None,
            unlock_time: Some(Utc::now().timestamp() + 3_600),
            external_dispute_unlock_time: None,
            submit_result_time: None,
        },
    )
    .await
    .expect("purchase applied");

    let app = build_router(state);
    let (status, body): (_, SyncAgentStatusResponse) = send(
        app.clone(),
        "POST",
        &format!("/v1/jobs/{job_id}/sync-agent"),
        None,
    )
    .await;
    assert_eq!(status, http::StatusCode::OK);
    assert!(body.updated);
    assert_eq!(body.agent_job_status, Some(AgentJobStatus::Completed));
    assert_eq!(body.status, Some(JobStatus::Completed));

    let (_, view): (_, GetJobResponse) =
        send(app, "GET", &format!("/v1/jobs/{job_id}"), None).await;
    let job = view.job.expect("job view");
    assert_eq!(job.output.as_deref(), Some("42"));
    assert!(job.result_hash_verified);
    assert!(job.result_submitted_at.is_some());
    assert!(job.completed_at.is_some());
}

#[tokio::test]
async fn unknown_agent_status_is_rejected_without_update() {
    let agent = Router::new().route(
        "/status",
        get(|| async { axum::Json(json!({"status": "paused"})) }),
    );
    let agent_url = spawn_server(agent).await;

    let state = AppState::new(test_config());
    register_agent(&state, "agent-odd", &agent_url).await;
    let job_id = create_job(&state, "bci-agent-2", "agent-odd").await;

    let app = build_router(state);
    let (status, body): (_, SyncAgentStatusResponse) = send(
        app.clone(),
        "POST",
        &format!("/v1/jobs/{job_id}/sync-agent"),
        None,
    )
    .await;
    assert_eq!(status, http::StatusCode::BAD_GATEWAY);
    assert_eq!(body.error_code.as_deref(), Some("UNKNOWN_EXTERNAL_VALUE"));

    let (_, view): (_, GetJobResponse) =
        send(app, "GET", &format!("/v1/jobs/{job_id}"), None).await;
    assert!(view.job.expect("job view").agent_job_status.is_none());
}

#[tokio::test]
async fn input_is_forwarded_only_while_agent_awaits_it() {
    let hits = Arc::new(AtomicUsize::new(0));
    let agent = Router::new()
        .route(
            "/status",
            get(|| async { axum::Json(json!({"status": "awaiting_input"})) }),
        )
        .route(
            "/provide_input",
            post(|State(hits): State<Arc<AtomicUsize>>| async move {
                hits.fetch_add(1, Ordering::SeqCst);
                axum::Json(json!({"accepted": true}))
            }),
        )
        .with_state(Arc::clone(&hits));
    let agent_url = spawn_server(agent).await;

    let state = AppState::new(test_config());
    register_agent(&state, "agent-input", &agent_url).await;
    let job_id = create_job(&state, "bci-agent-3", "agent-input").await;

    let app = build_router(state);
    let input_body = json!({"input_data": {"answer": "blue"}});

    let (status, body): (_, ProvideInputResponse) = send(
        app.clone(),
        "POST",
        &format!("/v1/jobs/{job_id}/input"),
        Some(&input_body),
    )
    .await;
    assert_eq!(status, http::StatusCode::CONFLICT);
    assert_eq!(body.error_code.as_deref(), Some("INPUT_NOT_EXPECTED"));
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    let (_, polled): (_, SyncAgentStatusResponse) = send(
        app.clone(),
        "POST",
        &format!("/v1/jobs/{job_id}/sync-agent"),
        None,
    )
    .await;
    assert_eq!(polled.status, Some(JobStatus::InputRequired));

    let (status, body): (_, ProvideInputResponse) = send(
        app,
        "POST",
        &format!("/v1/jobs/{job_id}/input"),
        Some(&input_body),
    )
    .await;
    assert_eq!(status, http::StatusCode::OK);
    assert!(body.accepted);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unregistered_agent_is_reported_not_found() {
    let state = AppState::new(test_config());
    let job_id = create_job(&state, "bci-agent-4", "agent-ghost").await;

    let app = build_router(state);
    let (status, body): (_, SyncAgentStatusResponse) = send(
        app,
        "POST",
        &format!("/v1/jobs/{job_id}/sync-agent"),
        None,
    )
    .await;
    assert_eq!(status, http::StatusCode::NOT_FOUND);
    assert_eq!(body.error_code.as_deref(), Some("AGENT_NOT_REGISTERED"));
}
