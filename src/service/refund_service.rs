use crate::app::AppState;
use crate::module::job::crud;
use crate::module::job::error::AppError;
use crate::module::job::model::JobRecord;
use crate::module::job::schema::{NextAction, OnChainStatus, RequestRefundResponse};
use crate::service::metrics_service;
use crate::service::payment_node_service;
use chrono::Utc;
use tracing::{error, info};

pub fn can_request_refund(job: &JobRecord, now: i64) -> bool {
    let Some(unlock_time) = job.unlock_time else {
        return false;
    };
    if now < unlock_time {
        return false;
    }
    if matches!(
        job.next_action,
        NextAction::SetRefundRequestedRequested | NextAction::SetRefundRequestedInitiated
    ) {
        return false;
    }
    if matches!(
        job.on_chain_status,
        Some(OnChainStatus::RefundRequested | OnChainStatus::RefundWithdrawn)
    ) {
        return false;
    }
    if job.refunded_credit_transaction.is_some() {
        return false;
    }
    true
}

/// The remote call must succeed before anything is marked locally; success
/// is never assumed.
pub async fn request_refund(
    state: &AppState,
    job_id: &str,
) -> Result<RequestRefundResponse, AppError> {
    let job = crud::get_job_record(state, job_id)?;
    let now = Utc::now().timestamp();
    if !can_request_refund(&job, now) {
        return Err(AppError::conflict(
            "REFUND_NOT_ALLOWED",
            "refund cannot be requested for this job",
        ));
    }

    payment_node_service::request_purchase_refund(state, &job.blockchain_identifier)
        .await
        .map_err(|e| {
            error!(job_id = %job_id, error = %e, "refund request against payment node failed");
            AppError::bad_gateway("REFUND_REQUEST_FAILED", "refund request failed")
        })?;

    let refund = crud::record_refund_request(state, job_id)?;
    metrics_service::inc_refunds_requested();
    info!(job_id = %job_id, refund_transaction_id = %refund.id, "refund requested");

    Ok(RequestRefundResponse {
        accepted: true,
        job_id: job_id.to_string(),
        next_action: Some(NextAction::SetRefundRequestedRequested),
        refunded_credit_transaction: Some(crate::module::job::schema::CreditTransactionView {
            id: refund.id,
            amount: refund.amount,
            included_fee: refund.included_fee,
            created_at: refund.created_at,
        }),
        error_code: None,
        reason: "refund requested".to_string(),
    })
}
