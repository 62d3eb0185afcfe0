use crate::module::job::model::JobRecord;
use crate::module::job::schema::{
    ActionSubsystem, AgentJobStatus, JobStatus, OnChainStatus, TransactionStatus,
};

/// Failure and dispute/refund outcomes outrank progress states; a job the
/// escrow has flagged must never render as "processing".
pub fn compute_status(job: &JobRecord) -> JobStatus {
    if job.agent_job_status == Some(AgentJobStatus::Failed) {
        return JobStatus::Failed;
    }

    if job.on_chain_status == Some(OnChainStatus::FundsOrDatumInvalid) {
        return JobStatus::PaymentFailed;
    }

    if job.next_action_error_type.is_some() {
        match job.next_action.subsystem() {
            Some(ActionSubsystem::Agent) => return JobStatus::AgentConnectionFailed,
            Some(ActionSubsystem::PaymentNode) => return JobStatus::PaymentNodeConnectionFailed,
            None => {}
        }
    }

    match job.on_chain_status {
        Some(OnChainStatus::Disputed) => return JobStatus::DisputeRequested,
        Some(OnChainStatus::DisputedWithdrawn) => return JobStatus::DisputeResolved,
        Some(OnChainStatus::RefundRequested) => return JobStatus::RefundRequested,
        Some(OnChainStatus::RefundWithdrawn) => return JobStatus::RefundResolved,
        _ => {}
    }

    if job.agent_job_status == Some(AgentJobStatus::AwaitingInput) {
        return JobStatus::InputRequired;
    }

    if job.agent_job_status == Some(AgentJobStatus::Completed)
        && matches!(
            job.on_chain_status,
            Some(
                OnChainStatus::ResultSubmitted
                    | OnChainStatus::FundsWithdrawn
                    | OnChainStatus::RefundWithdrawn
                    | OnChainStatus::DisputedWithdrawn
            )
        )
    {
        return JobStatus::Completed;
    }

    match job.on_chain_status {
        None => return JobStatus::PaymentPending,
        Some(OnChainStatus::FundsLocked)
            if job.on_chain_transaction_status != Some(TransactionStatus::Completed) =>
        {
            return JobStatus::PaymentProcessing;
        }
        _ => {}
    }

    if job.agent_job_status == Some(AgentJobStatus::Running) {
        return JobStatus::Processing;
    }

    JobStatus::Unknown
}
