use super::schema::{
    AgentJobStatus, HashScheme, NextAction, NextActionErrorType, OnChainStatus, TransactionStatus,
    TransactionFailureReason,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditTransactionRecord {
    pub id: String,
    pub user_id: String,
    pub organization_id: Option<String>,
    pub amount: i64,
    pub included_fee: i64,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    pub blockchain_identifier: String,
    pub agent_job_id: Option<String>,
    pub payment_id: Option<String>,
    pub user_id: String,
    pub organization_id: Option<String>,
    pub seller_vkey: String,
    pub identifier_from_purchaser: String,
    pub agent_id: String,
    pub on_chain_status: Option<OnChainStatus>,
    pub on_chain_transaction_hash: Option<String>,
    pub on_chain_transaction_status: Option<TransactionStatus>,
    pub on_chain_transaction_failure: Option<TransactionFailureReason>,
    pub input_hash: Option<String>,
    pub result_hash: Option<String>,
    pub agent_job_status: Option<AgentJobStatus>,
    pub input: Option<String>,
    pub input_schema: Option<String>,
    pub output: Option<String>,
    pub next_action: NextAction,
    pub next_action_error_type: Option<NextActionErrorType>,
    pub next_action_error_note: Option<String>,
    pub hash_scheme: HashScheme,
    pub started_at: i64,
    pub submit_result_time: Option<i64>,
    pub result_submitted_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub unlock_time: Option<i64>,
    pub external_dispute_unlock_time: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    pub credit_transaction: CreditTransactionRecord,
    pub refunded_credit_transaction: Option<CreditTransactionRecord>,
}
