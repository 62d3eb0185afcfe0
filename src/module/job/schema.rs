use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OnChainStatus {
    FundsLocked,
    FundsOrDatumInvalid,
    ResultSubmitted,
    RefundRequested,
    Disputed,
    RefundWithdrawn,
    DisputedWithdrawn,
    FundsWithdrawn,
}

impl OnChainStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FundsLocked => "FUNDS_LOCKED",
            Self::FundsOrDatumInvalid => "FUNDS_OR_DATUM_INVALID",
            Self::ResultSubmitted => "RESULT_SUBMITTED",
            Self::RefundRequested => "REFUND_REQUESTED",
            Self::Disputed => "DISPUTED",
            Self::RefundWithdrawn => "REFUND_WITHDRAWN",
            Self::DisputedWithdrawn => "DISPUTED_WITHDRAWN",
            Self::FundsWithdrawn => "FUNDS_WITHDRAWN",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionFailureReason {
    Timeout,
    RolledBack,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NextAction {
    None,
    WaitingForExternalAction,
    WaitingForManualAction,
    FundsLockingRequested,
    FundsLockingInitiated,
    StartJobRequested,
    StartJobInitiated,
    SetRefundRequestedRequested,
    SetRefundRequestedInitiated,
    UnsetRefundRequestedRequested,
    UnsetRefundRequestedInitiated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionSubsystem {
    Agent,
    PaymentNode,
}

impl NextAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::WaitingForExternalAction => "WAITING_FOR_EXTERNAL_ACTION",
            Self::WaitingForManualAction => "WAITING_FOR_MANUAL_ACTION",
            Self::FundsLockingRequested => "FUNDS_LOCKING_REQUESTED",
            Self::FundsLockingInitiated => "FUNDS_LOCKING_INITIATED",
            Self::StartJobRequested => "START_JOB_REQUESTED",
            Self::StartJobInitiated => "START_JOB_INITIATED",
            Self::SetRefundRequestedRequested => "SET_REFUND_REQUESTED_REQUESTED",
            Self::SetRefundRequestedInitiated => "SET_REFUND_REQUESTED_INITIATED",
            Self::UnsetRefundRequestedRequested => "UNSET_REFUND_REQUESTED_REQUESTED",
            Self::UnsetRefundRequestedInitiated => "UNSET_REFUND_REQUESTED_INITIATED",
        }
    }

    pub fn subsystem(&self) -> Option<ActionSubsystem> {
        match self {
            Self::None | Self::WaitingForExternalAction | Self::WaitingForManualAction => None,
            Self::StartJobRequested | Self::StartJobInitiated => Some(ActionSubsystem::Agent),
            Self::FundsLockingRequested
            | Self::FundsLockingInitiated
            | Self::SetRefundRequestedRequested
            | Self::SetRefundRequestedInitiated
            | Self::UnsetRefundRequestedRequested
            | Self::UnsetRefundRequestedInitiated => Some(ActionSubsystem::PaymentNode),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NextActionErrorType {
    NetworkError,
    InsufficientFunds,
    Unknown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentJobStatus {
    AwaitingPayment,
    AwaitingInput,
    Running,
    Completed,
    Failed,
}

impl AgentJobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingPayment => "AWAITING_PAYMENT",
            Self::AwaitingInput => "AWAITING_INPUT",
            Self::Running => "RUNNING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Failed,
    PaymentFailed,
    AgentConnectionFailed,
    PaymentNodeConnectionFailed,
    DisputeRequested,
    DisputeResolved,
    RefundRequested,
    RefundResolved,
    InputRequired,
    Completed,
    PaymentPending,
    PaymentProcessing,
    Processing,
    Unknown,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Failed => "FAILED",
            Self::PaymentFailed => "PAYMENT_FAILED",
            Self::AgentConnectionFailed => "AGENT_CONNECTION_FAILED",
            Self::PaymentNodeConnectionFailed => "PAYMENT_NODE_CONNECTION_FAILED",
            Self::DisputeRequested => "DISPUTE_REQUESTED",
            Self::DisputeResolved => "DISPUTE_RESOLVED",
            Self::RefundRequested => "REFUND_REQUESTED",
            Self::RefundResolved => "REFUND_RESOLVED",
            Self::InputRequired => "INPUT_REQUIRED",
            Self::Completed => "COMPLETED",
            Self::PaymentPending => "PAYMENT_PENDING",
            Self::PaymentProcessing => "PAYMENT_PROCESSING",
            Self::Processing => "PROCESSING",
            Self::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HashScheme {
    Salted,
    Legacy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashDirection {
    Input,
    Output,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJobRequest {
    #[serde(alias = "blockchainIdentifier")]
    pub blockchain_identifier: String,
    #[serde(alias = "paymentId")]
    pub payment_id: Option<String>,
    #[serde(alias = "userId")]
    pub user_id: String,
    #[serde(alias = "organizationId")]
    pub organization_id: Option<String>,
    #[serde(alias = "sellerVkey")]
    pub seller_vkey: String,
    #[serde(alias = "identifierFromPurchaser")]
    pub identifier_from_purchaser: String,
    #[serde(alias = "agentId")]
    pub agent_id: String,
    #[serde(alias = "agentJobId")]
    pub agent_job_id: Option<String>,
    pub input: Option<String>,
    #[serde(alias = "inputSchema")]
    pub input_schema: Option<String>,
    pub amount: i64,
    #[serde(alias = "includedFee", default)]
    pub included_fee: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJobResponse {
    pub accepted: bool,
    pub job_id: String,
    pub blockchain_identifier: String,
    pub status: Option<JobStatus>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditTransactionView {
    pub id: String,
    pub amount: i64,
    pub included_fee: i64,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobView {
    pub job_id: String,
    pub blockchain_identifier: String,
    pub agent_id: String,
    pub agent_job_id: Option<String>,
    pub user_id: String,
    pub organization_id: Option<String>,
    pub status: JobStatus,
    pub on_chain_status: Option<OnChainStatus>,
    pub on_chain_transaction_hash: Option<String>,
    pub on_chain_transaction_status: Option<TransactionStatus>,
    pub on_chain_transaction_failure: Option<TransactionFailureReason>,
    pub agent_job_status: Option<AgentJobStatus>,
    pub next_action: NextAction,
    pub next_action_error_type: Option<NextActionErrorType>,
    pub next_action_error_note: Option<String>,
    pub input_hash_verified: bool,
    pub result_hash_verified: bool,
    pub can_request_refund: bool,
    pub output: Option<String>,
    pub started_at: i64,
    pub result_submitted_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub unlock_time: Option<i64>,
    pub external_dispute_unlock_time: Option<i64>,
    pub credit_transaction: CreditTransactionView,
    pub refunded_credit_transaction: Option<CreditTransactionView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetJobResponse {
    pub found: bool,
    pub job: Option<JobView>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestRefundResponse {
    pub accepted: bool,
    pub job_id: String,
    pub next_action: Option<NextAction>,
    pub refunded_credit_transaction: Option<CreditTransactionView>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvideInputRequest {
    #[serde(alias = "inputData")]
    pub input_data: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvideInputResponse {
    pub accepted: bool,
    pub job_id: String,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncAgentStatusResponse {
    pub updated: bool,
    pub job_id: String,
    pub agent_job_status: Option<AgentJobStatus>,
    pub status: Option<JobStatus>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthMetricsView {
    pub jobs_created: u64,
    pub refunds_requested: u64,
    pub sync_runs_started: u64,
    pub sync_runs_completed: u64,
    pub sync_runs_failed: u64,
    pub sync_items_skipped: u64,
    pub webhook_deliveries: u64,
    pub webhook_failures: u64,
    pub last_error_ts: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub instance_id: String,
    pub sync_auth_enabled: bool,
    pub metrics: HealthMetricsView,
    pub error_code: Option<String>,
    pub reason: String,
}
