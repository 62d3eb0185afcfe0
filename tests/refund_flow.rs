use axum::Router;
use axum::body::{Body, to_bytes};
use axum::routing::post;
use chrono::Utc;
use escrow_job_coordinator::app::{AppState, build_router};
use escrow_job_coordinator::config::environment::AppConfig;
use escrow_job_coordinator::module::job::crud;
use escrow_job_coordinator::module::job::schema::{
    CreateJobResponse, GetJobResponse, HashScheme, JobStatus, NextAction, RequestRefundResponse,
};
use escrow_job_coordinator::service::hash_service;
use escrow_job_coordinator::service::payment_node_service::{
    PurchaseNextAction, PurchaseSnapshot, PurchaseTransaction,
};
use http::Request;
use serde_json::{Value, json};
use tower::util::ServiceExt;

fn test_config(payment_node_base_url: &str) -> AppConfig {
    AppConfig {
        rust_env: "test".to_string(),
        api_host: "127.0.0.1".to_string(),
        api_port: 0,
        payment_node_base_url: payment_node_base_url.to_string(),
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

async fn accepting_payment_node() -> String {
    let router = Router::new().route(
        "/purchases/:id/request-refund",
        post(|| async { axum::Json(json!({"accepted": true})) }),
    );
    spawn_server(router).await
}

async fn post_json<R: serde::de::DeserializeOwned>(
    app: Router,
    uri: &str,
    body: Option<&Value>,
) -> (http::StatusCode, R) {
    let request = match body {
        Some(body) => Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .expect("request"),
    };
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

async fn get_json<R: serde::de::DeserializeOwned>(app: Router, uri: &str) -> (http::StatusCode, R) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

async fn create_job(state: &AppState, blockchain_identifier: &str) -> String {
    let app = build_router(state.clone());
    let (status, body): (_, CreateJobResponse) = post_json(
        app,
        "/v1/jobs",
        Some(&json!({
            "blockchain_identifier": blockchain_identifier,
            "user_id": "user-1",
            "seller_vkey": "vkey-1",
            "identifier_from_purchaser": "purchaser-salt",
            "agent_id": "agent-1",
            "input": "the input",
            "amount": 25,
            "included_fee": 1
        })),
    )
    .await;
    assert_eq!(status, http::StatusCode::OK);
    body.job_id
}

fn purchase(blockchain_identifier: &str, unlock_time: i64) -> PurchaseSnapshot {
    PurchaseSnapshot {
        id: blockchain_identifier.to_string(),
        on_chain_state: Some("FundsLocked".to_string()),
        input_hash: Some(hash_service::content_digest(
            HashScheme::Salted,
            "purchaser-salt",
            "the input",
        )),
        result_hash: None,
        next_action: PurchaseNextAction {
            requested_action: "None".to_string(),
            error_type: None,
            error_note: None,
        },
        current_transaction: Some(PurchaseTransaction {
            tx_hash: "tx-1".to_string(),
            status: "Confirmed".to_string(),
        }),
        unlock_time: Some(unlock_time),
        external_dispute_unlock_time: Some(unlock_time + 3_600),
        submit_result_time: None,
    }
}

#[tokio::test]
async fn refund_flow_records_exactly_one_credit() {
    let payment_node = accepting_payment_node().await;
    let state = AppState::new(test_config(&payment_node));
    let job_id = create_job(&state, "bci-refund-1").await;

    crud::apply_purchase(&state, &purchase("bci-refund-1", Utc::now().timestamp() - 60))
        .await
        .expect("purchase applied");

    let app = build_router(state.clone());
    let (status, body): (_, RequestRefundResponse) = post_json(
        app.clone(),
        &format!("/v1/jobs/{job_id}/refund-request"),
        None,
    )
    .await;
    assert_eq!(status, http::StatusCode::OK);
    assert!(body.accepted);
    assert_eq!(body.next_action, Some(NextAction::SetRefundRequestedRequested));
    let refund = body.refunded_credit_transaction.expect("refund credit");
    assert_eq!(refund.amount, 25);
    assert_eq!(refund.included_fee, -1);

    let (second_status, second): (_, RequestRefundResponse) = post_json(
        app.clone(),
        &format!("/v1/jobs/{job_id}/refund-request"),
        None,
    )
    .await;
    assert_eq!(second_status, http::StatusCode::CONFLICT);
    assert_eq!(second.error_code.as_deref(), Some("REFUND_NOT_ALLOWED"));

    let (_, view): (_, GetJobResponse) = get_json(app, &format!("/v1/jobs/{job_id}")).await;
    let job = view.job.expect("job view");
    assert!(!job.can_request_refund);
    assert!(job.input_hash_verified);
    assert_eq!(
        job.refunded_credit_transaction.expect("persisted refund").amount,
        25
    );
}

#[tokio::test]
async fn refund_rejected_before_unlock_time() {
    let payment_node = accepting_payment_node().await;
    let state = AppState::new(test_config(&payment_node));
    let job_id = create_job(&state, "bci-refund-2").await;

    crud::apply_purchase(&state, &purchase("bci-refund-2", Utc::now().timestamp() + 3_600))
        .await
        .expect("purchase applied");

    let app = build_router(state);
    let (status, body): (_, RequestRefundResponse) =
        post_json(app, &format!("/v1/jobs/{job_id}/refund-request"), None).await;
    assert_eq!(status, http::StatusCode::CONFLICT);
    assert_eq!(body.error_code.as_deref(), Some("REFUND_NOT_ALLOWED"));
}

#[tokio::test]
async fn refund_rejected_when_escrow_already_refunding() {
    let payment_node = accepting_payment_node().await;
    let state = AppState::new(test_config(&payment_node));
    let job_id = create_job(&state, "bci-refund-3").await;

    let mut snapshot = purchase("bci-refund-3", Utc::now().timestamp() - 60);
    snapshot.on_chain_state = Some("RefundRequested".to_string());
    crud::apply_purchase(&state, &snapshot).await.expect("purchase applied");

    let app = build_router(state.clone());
    let (status, _): (_, RequestRefundResponse) = post_json(
        app.clone(),
        &format!("/v1/jobs/{job_id}/refund-request"),
        None,
    )
    .await;
    assert_eq!(status, http::StatusCode::CONFLICT);

    let (_, view): (_, GetJobResponse) = get_json(app, &format!("/v1/jobs/{job_id}")).await;
    assert_eq!(view.job.expect("job view").status, JobStatus::RefundRequested);
}

#[tokio::test]
async fn concurrent_refund_requests_persist_one_credit() {
    let payment_node = accepting_payment_node().await;
    let state = AppState::new(test_config(&payment_node));
    let job_id = create_job(&state, "bci-refund-4").await;

    crud::apply_purchase(&state, &purchase("bci-refund-4", Utc::now().timestamp() - 60))
        .await
        .expect("purchase applied");

    let app = build_router(state.clone());
    let uri = format!("/v1/jobs/{job_id}/refund-request");
    let (first, second): (
        (http::StatusCode, RequestRefundResponse),
        (http::StatusCode, RequestRefundResponse),
    ) = tokio::join!(
        post_json(app.clone(), &uri, None),
        post_json(app.clone(), &uri, None)
    );

    let accepted = [&first.1, &second.1].iter().filter(|r| r.accepted).count();
    assert_eq!(accepted, 1);

    let (_, view): (_, GetJobResponse) = get_json(app, &format!("/v1/jobs/{job_id}")).await;
    let job = view.job.expect("job view");
    assert_eq!(job.refunded_credit_transaction.expect("one refund").amount, 25);
}
