use crate::module::job::schema::{
    AgentJobStatus, NextAction, NextActionErrorType, OnChainStatus, TransactionFailureReason,
    TransactionStatus,
};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("unknown external value for {field}: `{value}`")]
    UnknownExternalValue { field: &'static str, value: String },
}

impl MapError {
    fn unknown(field: &'static str, value: &str) -> Self {
        Self::UnknownExternalValue {
            field,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnChainStateExternal {
    FundsLocked,
    FundsOrDatumInvalid,
    ResultSubmitted,
    RefundRequested,
    Disputed,
    RefundWithdrawn,
    DisputedWithdrawn,
    Withdrawn,
}

impl OnChainStateExternal {
    pub fn parse(value: &str) -> Result<Self, MapError> {
        match value {
            "FundsLocked" => Ok(Self::FundsLocked),
            "FundsOrDatumInvalid" => Ok(Self::FundsOrDatumInvalid),
            "ResultSubmitted" => Ok(Self::ResultSubmitted),
            "RefundRequested" => Ok(Self::RefundRequested),
            "Disputed" => Ok(Self::Disputed),
            "RefundWithdrawn" => Ok(Self::RefundWithdrawn),
            "DisputedWithdrawn" => Ok(Self::DisputedWithdrawn),
            "Withdrawn" => Ok(Self::Withdrawn),
            other => Err(MapError::unknown("onChainState", other)),
        }
    }
}

impl From<OnChainStateExternal> for OnChainStatus {
    fn from(value: OnChainStateExternal) -> Self {
        match value {
            OnChainStateExternal::FundsLocked => Self::FundsLocked,
            OnChainStateExternal::FundsOrDatumInvalid => Self::FundsOrDatumInvalid,
            OnChainStateExternal::ResultSubmitted => Self::ResultSubmitted,
            OnChainStateExternal::RefundRequested => Self::RefundRequested,
            OnChainStateExternal::Disputed => Self::Disputed,
            OnChainStateExternal::RefundWithdrawn => Self::RefundWithdrawn,
            OnChainStateExternal::DisputedWithdrawn => Self::DisputedWithdrawn,
            OnChainStateExternal::Withdrawn => Self::FundsWithdrawn,
        }
    }
}

pub fn map_on_chain_state(value: Option<&str>) -> Result<Option<OnChainStatus>, MapError> {
    match value {
        None => Ok(None),
        Some(raw) => Ok(Some(OnChainStateExternal::parse(raw)?.into())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatusExternal {
    Pending,
    Confirmed,
    FailedViaTimeout,
    RolledBack,
}

impl TransactionStatusExternal {
    pub fn parse(value: &str) -> Result<Self, MapError> {
        match value {
            "Pending" => Ok(Self::Pending),
            "Confirmed" => Ok(Self::Confirmed),
            "FailedViaTimeout" => Ok(Self::FailedViaTimeout),
            "RolledBack" => Ok(Self::RolledBack),
            other => Err(MapError::unknown("transactionStatus", other)),
        }
    }
}

pub fn map_transaction_status(
    value: &str,
) -> Result<(TransactionStatus, Option<TransactionFailureReason>), MapError> {
    let external = TransactionStatusExternal::parse(value)?;
    Ok(match external {
        TransactionStatusExternal::Pending => (TransactionStatus::Pending, None),
        TransactionStatusExternal::Confirmed => (TransactionStatus::Completed, None),
        TransactionStatusExternal::FailedViaTimeout => (
            TransactionStatus::Failed,
            Some(TransactionFailureReason::Timeout),
        ),
        TransactionStatusExternal::RolledBack => (
            TransactionStatus::Failed,
            Some(TransactionFailureReason::RolledBack),
        ),
    })
}

pub fn map_next_action(value: &str) -> Result<NextAction, MapError> {
    match value {
        "None" => Ok(NextAction::None),
        "WaitingForExternalAction" => Ok(NextAction::WaitingForExternalAction),
        "WaitingForManualAction" => Ok(NextAction::WaitingForManualAction),
        "FundsLockingRequested" => Ok(NextAction::FundsLockingRequested),
        "FundsLockingInitiated" => Ok(NextAction::FundsLockingInitiated),
        "StartJobRequested" => Ok(NextAction::StartJobRequested),
        "StartJobInitiated" => Ok(NextAction::StartJobInitiated),
        "SetRefundRequestedRequested" => Ok(NextAction::SetRefundRequestedRequested),
        "SetRefundRequestedInitiated" => Ok(NextAction::SetRefundRequestedInitiated),
        "UnSetRefundRequestedRequested" => Ok(NextAction::UnsetRefundRequestedRequested),
        "UnSetRefundRequestedInitiated" => Ok(NextAction::UnsetRefundRequestedInitiated),
        other => Err(MapError::unknown("requestedAction", other)),
    }
}

pub fn map_error_type(value: Option<&str>) -> Result<Option<NextActionErrorType>, MapError> {
    match value {
        None => Ok(None),
        Some("NetworkError") => Ok(Some(NextActionErrorType::NetworkError)),
        Some("InsufficientFunds") => Ok(Some(NextActionErrorType::InsufficientFunds)),
        Some("Unknown") => Ok(Some(NextActionErrorType::Unknown)),
        Some(other) => Err(MapError::unknown("errorType", other)),
    }
}

pub fn map_agent_status(value: &str) -> Result<AgentJobStatus, MapError> {
    match value {
        "awaiting_payment" => Ok(AgentJobStatus::AwaitingPayment),
        "awaiting_input" => Ok(AgentJobStatus::AwaitingInput),
        "running" => Ok(AgentJobStatus::Running),
        "completed" => Ok(AgentJobStatus::Completed),
        "failed" => Ok(AgentJobStatus::Failed),
        other => Err(MapError::unknown("agentStatus", other)),
    }
}
