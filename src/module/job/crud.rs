use super::error::AppError;
use super::model::{CreditTransactionRecord, JobRecord};
use super::schema::{
    AgentJobStatus, CreateJobRequest, CreateJobResponse, CreditTransactionView, GetJobResponse,
    HashDirection, HashScheme, JobView, NextAction,
};
use crate::app::AppState;
use crate::service::hash_service;
use crate::service::mapper_service::{self, MapError};
use crate::service::metrics_service;
use crate::service::payment_node_service::PurchaseSnapshot;
use crate::service::refund_service;
use crate::service::status_service;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct JobStore {
    inner: Mutex<JobStoreInner>,
}

#[derive(Debug, Default)]
struct JobStoreInner {
    jobs_by_id: HashMap<String, JobRecord>,
    job_id_by_blockchain_identifier: HashMap<String, String>,
}

fn lock_store(store: &JobStore) -> Result<MutexGuard<'_, JobStoreInner>, AppError> {
    store
        .inner
        .lock()
        .map_err(|_| AppError::internal("STORE_LOCK_POISONED", "job store lock poisoned"))
}

pub async fn create_job(
    state: &AppState,
    req: CreateJobRequest,
) -> Result<CreateJobResponse, AppError> {
    validate_create_request(&req)?;

    let job = {
        let mut inner = lock_store(&state.jobs)?;
        if inner
            .job_id_by_blockchain_identifier
            .contains_key(&req.blockchain_identifier)
        {
            return Err(AppError::conflict(
                "DUPLICATE_BLOCKCHAIN_IDENTIFIER",
                "a job already exists for this blockchain identifier",
            ));
        }

        let now = Utc::now().timestamp();
        let debit = CreditTransactionRecord {
            id: format!("ct-{}", Uuid::new_v4()),
            user_id: req.user_id.clone(),
            organization_id: req.organization_id.clone(),
            amount: -req.amount.abs(),
            included_fee: req.included_fee,
            created_at: now,
        };
        let job = JobRecord {
            id: format!("job-{}", Uuid::new_v4()),
            blockchain_identifier: req.blockchain_identifier.clone(),
            agent_job_id: req.agent_job_id.clone(),
            payment_id: req.payment_id.clone(),
            user_id: req.user_id.clone(),
            organization_id: req.organization_id.clone(),
            seller_vkey: req.seller_vkey.clone(),
            identifier_from_purchaser: req.identifier_from_purchaser.clone(),
            agent_id: req.agent_id.clone(),
            on_chain_status: None,
            on_chain_transaction_hash: None,
            on_chain_transaction_status: None,
            on_chain_transaction_failure: None,
            input_hash: None,
            result_hash: None,
            agent_job_status: None,
            input: req.input.clone(),
            input_schema: req.input_schema.clone(),
            output: None,
            next_action: NextAction::None,
            next_action_error_type: None,
            next_action_error_note: None,
            hash_scheme: HashScheme::Salted,
            started_at: now,
            submit_result_time: None,
            result_submitted_at: None,
            completed_at: None,
            unlock_time: None,
            external_dispute_unlock_time: None,
            created_at: now,
            updated_at: now,
            credit_transaction: debit,
            refunded_credit_transaction: None,
        };

        inner
            .job_id_by_blockchain_identifier
            .insert(job.blockchain_identifier.clone(), job.id.clone());
        inner.jobs_by_id.insert(job.id.clone(), job.clone());
        job
    };

    metrics_service::inc_jobs_created();
    Ok(CreateJobResponse {
        accepted: true,
        job_id: job.id.clone(),
        blockchain_identifier: job.blockchain_identifier.clone(),
        status: Some(status_service::compute_status(&job)),
        error_code: None,
        reason: "job accepted".to_string(),
    })
}

pub async fn get_job(state: &AppState, job_id: &str) -> Result<GetJobResponse, AppError> {
    let inner = lock_store(&state.jobs)?;
    match inner.jobs_by_id.get(job_id) {
        Some(job) => Ok(GetJobResponse {
            found: true,
            job: Some(to_view(job)),
            error_code: None,
            reason: "job found".to_string(),
        }),
        None => Ok(GetJobResponse {
            found: false,
            job: None,
            error_code: Some("JOB_NOT_FOUND".to_string()),
            reason: "job not found".to_string(),
        }),
    }
}

pub fn get_job_record(state: &AppState, job_id: &str) -> Result<JobRecord, AppError> {
    let inner = lock_store(&state.jobs)?;
    inner
        .jobs_by_id
        .get(job_id)
        .cloned()
        .ok_or_else(|| AppError::not_found("JOB_NOT_FOUND", "job not found"))
}

pub async fn apply_purchase(state: &AppState, purchase: &PurchaseSnapshot) -> Result<(), AppError> {
    let on_chain_status =
        mapper_service::map_on_chain_state(purchase.on_chain_state.as_deref()).map_err(map_error)?;
    let next_action =
        mapper_service::map_next_action(&purchase.next_action.requested_action).map_err(map_error)?;
    let error_type = mapper_service::map_error_type(purchase.next_action.error_type.as_deref())
        .map_err(map_error)?;
    let transaction = purchase
        .current_transaction
        .as_ref()
        .map(|tx| mapper_service::map_transaction_status(&tx.status))
        .transpose()
        .map_err(map_error)?;

    let mut inner = lock_store(&state.jobs)?;
    let job_id = inner
        .job_id_by_blockchain_identifier
        .get(&purchase.id)
        .cloned()
        .ok_or_else(|| {
            AppError::not_found("JOB_NOT_FOUND", "no job for this blockchain identifier")
        })?;
    let job = inner
        .jobs_by_id
        .get_mut(&job_id)
        .ok_or_else(|| AppError::internal("STORE_INDEX_STALE", "job index points nowhere"))?;

    job.on_chain_status = on_chain_status;
    job.next_action = next_action;
    job.next_action_error_type = error_type;
    job.next_action_error_note = purchase.next_action.error_note.clone();
    job.input_hash = purchase.input_hash.clone();
    job.result_hash = purchase.result_hash.clone();
    if let Some((status, failure)) = transaction {
        job.on_chain_transaction_status = Some(status);
        job.on_chain_transaction_failure = failure;
        job.on_chain_transaction_hash = purchase
            .current_transaction
            .as_ref()
            .map(|tx| tx.tx_hash.clone());
    }
    if purchase.unlock_time.is_some() {
        job.unlock_time = purchase.unlock_time;
    }
    if purchase.external_dispute_unlock_time.is_some() {
        job.external_dispute_unlock_time = purchase.external_dispute_unlock_time;
    }
    if purchase.submit_result_time.is_some() {
        job.submit_result_time = purchase.submit_result_time;
    }
    job.updated_at = Utc::now().timestamp();
    Ok(())
}

pub async fn apply_agent_status(
    state: &AppState,
    job_id: &str,
    status: AgentJobStatus,
    result: Option<String>,
) -> Result<JobRecord, AppError> {
    let mut inner = lock_store(&state.jobs)?;
    let job = inner
        .jobs_by_id
        .get_mut(job_id)
        .ok_or_else(|| AppError::not_found("JOB_NOT_FOUND", "job not found"))?;

    let now = Utc::now().timestamp();
    job.agent_job_status = Some(status);
    if let Some(result) = result {
        if job.output.as_deref() != Some(result.as_str()) {
            job.output = Some(result);
            job.result_submitted_at = Some(now);
        }
    }
    if matches!(status, AgentJobStatus::Completed | AgentJobStatus::Failed)
        && job.completed_at.is_none()
    {
        job.completed_at = Some(now);
    }
    job.updated_at = now;
    Ok(job.clone())
}

/// The existence check and the insert share one critical section so two
/// concurrent refund requests cannot both record a credit.
pub fn record_refund_request(
    state: &AppState,
    job_id: &str,
) -> Result<CreditTransactionRecord, AppError> {
    let mut inner = lock_store(&state.jobs)?;
    let job = inner
        .jobs_by_id
        .get_mut(job_id)
        .ok_or_else(|| AppError::not_found("JOB_NOT_FOUND", "job not found"))?;

    if job.refunded_credit_transaction.is_some() {
        return Err(AppError::conflict(
            "REFUND_ALREADY_RECORDED",
            "a refund was already recorded for this job",
        ));
    }
    if matches!(
        job.next_action,
        NextAction::SetRefundRequestedRequested | NextAction::SetRefundRequestedInitiated
    ) {
        return Err(AppError::conflict(
            "REFUND_ALREADY_PENDING",
            "a refund request is already pending for this job",
        ));
    }

    let now = Utc::now().timestamp();
    let refund = CreditTransactionRecord {
        id: format!("ct-{}", Uuid::new_v4()),
        user_id: job.user_id.clone(),
        organization_id: job.organization_id.clone(),
        amount: -job.credit_transaction.amount,
        included_fee: -job.credit_transaction.included_fee,
        created_at: now,
    };
    job.refunded_credit_transaction = Some(refund.clone());
    job.next_action = NextAction::SetRefundRequestedRequested;
    job.next_action_error_type = None;
    job.next_action_error_note = None;
    job.updated_at = now;
    Ok(refund)
}

pub fn to_view(job: &JobRecord) -> JobView {
    let now = Utc::now().timestamp();
    JobView {
        job_id: job.id.clone(),
        blockchain_identifier: job.blockchain_identifier.clone(),
        agent_id: job.agent_id.clone(),
        agent_job_id: job.agent_job_id.clone(),
        user_id: job.user_id.clone(),
        organization_id: job.organization_id.clone(),
        status: status_service::compute_status(job),
        on_chain_status: job.on_chain_status,
        on_chain_transaction_hash: job.on_chain_transaction_hash.clone(),
        on_chain_transaction_status: job.on_chain_transaction_status,
        on_chain_transaction_failure: job.on_chain_transaction_failure,
        agent_job_status: job.agent_job_status,
        next_action: job.next_action,
        next_action_error_type: job.next_action_error_type,
        next_action_error_note: job.next_action_error_note.clone(),
        input_hash_verified: hash_service::verify(HashDirection::Input, job),
        result_hash_verified: hash_service::verify(HashDirection::Output, job),
        can_request_refund: refund_service::can_request_refund(job, now),
        output: job.output.clone(),
        started_at: job.started_at,
        result_submitted_at: job.result_submitted_at,
        completed_at: job.completed_at,
        unlock_time: job.unlock_time,
        external_dispute_unlock_time: job.external_dispute_unlock_time,
        credit_transaction: to_credit_view(&job.credit_transaction),
        refunded_credit_transaction: job
            .refunded_credit_transaction
            .as_ref()
            .map(to_credit_view),
    }
}

fn to_credit_view(record: &CreditTransactionRecord) -> CreditTransactionView {
    CreditTransactionView {
        id: record.id.clone(),
        amount: record.amount,
        included_fee: record.included_fee,
        created_at: record.created_at,
    }
}

fn map_error(err: MapError) -> AppError {
    AppError::bad_gateway("UNKNOWN_EXTERNAL_VALUE", err.to_string())
}

fn validate_create_request(req: &CreateJobRequest) -> Result<(), AppError> {
    if req.blockchain_identifier.trim().is_empty() {
        return Err(AppError::bad_request(
            "INVALID_BLOCKCHAIN_IDENTIFIER",
            "blockchain_identifier is required",
        ));
    }
    if req.user_id.trim().is_empty() {
        return Err(AppError::bad_request("INVALID_USER_ID", "user_id is required"));
    }
    if req.seller_vkey.trim().is_empty() {
        return Err(AppError::bad_request(
            "INVALID_SELLER_VKEY",
            "seller_vkey is required",
        ));
    }
    if req.identifier_from_purchaser.trim().is_empty() {
        return Err(AppError::bad_request(
            "INVALID_PURCHASER_IDENTIFIER",
            "identifier_from_purchaser is required",
        ));
    }
    if req.agent_id.trim().is_empty() {
        return Err(AppError::bad_request(
            "INVALID_AGENT_ID",
            "agent_id is required",
        ));
    }
    if req.amount <= 0 {
        return Err(AppError::bad_request(
            "INVALID_AMOUNT",
            "amount must be positive",
        ));
    }
    Ok(())
}
