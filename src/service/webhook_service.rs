use crate::app::AppState;
use crate::service::metrics_service;
use chrono::Utc;
use serde_json::{Value, json};
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, error};

pub const BACKOFF_SCHEDULE_MS: [u64; 4] = [500, 2_000, 5_000, 10_000];
const MAX_LOGGED_BODY: usize = 400;

pub fn backoff_delay_ms(failed_attempts: usize) -> u64 {
    let index = failed_attempts
        .saturating_sub(1)
        .min(BACKOFF_SCHEDULE_MS.len() - 1);
    BACKOFF_SCHEDULE_MS[index]
}

pub async fn notify_agent_hired(state: AppState, job_id: String, agent_id: String, user_id: String) {
    let Some(url) = state.config.webhook_agent_hired_url.clone() else {
        return;
    };
    let payload = json!({
        "event": "agent_hired",
        "job_id": job_id,
        "agent_id": agent_id,
        "user_id": user_id,
        "occurred_at": Utc::now().timestamp(),
    });
    dispatch(
        &url,
        &payload,
        state.config.webhook_max_retries,
        state.config.webhook_attempt_timeout_ms,
    )
    .await;
}

/// Delivery is fire-and-forget: exhaustion is logged and counted, never
/// surfaced to the triggering business action.
pub async fn dispatch(url: &str, payload: &Value, max_retries: u32, attempt_timeout_ms: u64) {
    let client = reqwest::Client::new();
    let total_attempts = max_retries as usize + 1;
    let mut last_failure = String::new();

    for attempt in 1..=total_attempts {
        if attempt > 1 {
            sleep(Duration::from_millis(backoff_delay_ms(attempt - 1))).await;
        }
        let send = client.post(url).json(payload).send();
        match timeout(Duration::from_millis(attempt_timeout_ms), send).await {
            Err(_) => {
                last_failure = format!("attempt timed out after {attempt_timeout_ms}ms");
            }
            Ok(Err(e)) => {
                last_failure = format!("request error: {e}");
            }
            Ok(Ok(response)) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                if status.is_success() {
                    metrics_service::inc_webhook_deliveries();
                    debug!(url = %url, attempt, "webhook delivered");
                    return;
                }
                last_failure = format!("status {}: {}", status.as_u16(), trim_body(&body));
            }
        }
    }

    metrics_service::inc_webhook_failures();
    metrics_service::set_last_error_ts(Utc::now().timestamp());
    error!(
        url = %url,
        attempts = total_attempts,
        last_failure = %last_failure,
        "webhook delivery exhausted"
    );
}

fn trim_body(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.len() > MAX_LOGGED_BODY {
        format!("{}...", &trimmed[..MAX_LOGGED_BODY])
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_follows_schedule_then_repeats_final_delay() {
        assert_eq!(backoff_delay_ms(1), 500);
        assert_eq!(backoff_delay_ms(2), 2_000);
        assert_eq!(backoff_delay_ms(3), 5_000);
        assert_eq!(backoff_delay_ms(4), 10_000);
        assert_eq!(backoff_delay_ms(5), 10_000);
        assert_eq!(backoff_delay_ms(50), 10_000);
    }

    #[test]
    fn long_bodies_are_truncated_for_logs() {
        let body = "x".repeat(1_000);
        let trimmed = trim_body(&body);
        assert!(trimmed.len() <= MAX_LOGGED_BODY + 3);
        assert!(trimmed.ends_with("..."));
    }
}
