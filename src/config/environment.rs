use std::env;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub rust_env: String,
    pub api_host: String,
    pub api_port: u16,
    pub payment_node_base_url: String,
    pub payment_node_api_key: Option<String>,
    pub payment_node_timeout_ms: u64,
    pub agent_api_timeout_ms: u64,
    pub instance_id: String,
    pub lock_timeout_ms: u64,
    pub lock_timeout_buffer_ms: u64,
    pub sync_page_size: usize,
    pub sync_auth_enabled: bool,
    pub sync_auth_secret: Option<String>,
    pub webhook_agent_hired_url: Option<String>,
    pub webhook_max_retries: u32,
    pub webhook_attempt_timeout_ms: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        load_dotenv_layers();
        Ok(Self {
            rust_env: read_var("RUST_ENV")?,
            api_host: read_var("API_HOST")?,
            api_port: read_var("API_PORT")?
                .parse::<u16>()
                .map_err(|e| format!("invalid API_PORT: {e}"))?,
            payment_node_base_url: read_optional_string(
                "PAYMENT_NODE_BASE_URL",
                "http://127.0.0.1:3001",
            ),
            payment_node_api_key: env::var("PAYMENT_NODE_API_KEY").ok(),
            payment_node_timeout_ms: read_optional_u64("PAYMENT_NODE_TIMEOUT_MS", 8_000)?,
            agent_api_timeout_ms: read_optional_u64("AGENT_API_TIMEOUT_MS", 8_000)?,
            instance_id: read_optional_string(
                "INSTANCE_ID",
                &format!("instance-{}", Uuid::new_v4()),
            ),
            lock_timeout_ms: read_optional_u64("LOCK_TIMEOUT", 300_000)?,
            lock_timeout_buffer_ms: read_optional_u64("LOCK_TIMEOUT_BUFFER", 30_000)?,
            sync_page_size: read_optional_usize("SYNC_PAGE_SIZE", 50)?,
            sync_auth_enabled: read_optional_bool("SYNC_AUTH_ENABLED", true),
            sync_auth_secret: env::var("SYNC_AUTH_SECRET").ok(),
            webhook_agent_hired_url: env::var("WEBHOOK_AGENT_HIRED_URL").ok(),
            webhook_max_retries: read_optional_u32("WEBHOOK_MAX_RETRIES", 3)?,
            webhook_attempt_timeout_ms: read_optional_u64("WEBHOOK_ATTEMPT_TIMEOUT_MS", 5_000)?,
        })
    }
}

fn read_var(key: &str) -> Result<String, String> {
    env::var(key).map_err(|_| format!("missing required env var: {key}"))
}

fn read_optional_u64(key: &str, default: u64) -> Result<u64, String> {
    match env::var(key) {
        Ok(v) => v.parse::<u64>().map_err(|e| format!("invalid {key}: {e}")),
        Err(_) => Ok(default),
    }
}

fn read_optional_u32(key: &str, default: u32) -> Result<u32, String> {
    match env::var(key) {
        Ok(v) => v.parse::<u32>().map_err(|e| format!("invalid {key}: {e}")),
        Err(_) => Ok(default),
    }
}

fn read_optional_usize(key: &str, default: usize) -> Result<usize, String> {
    match env::var(key) {
        Ok(v) => v.parse::<usize>().map_err(|e| format!("invalid {key}: {e}")),
        Err(_) => Ok(default),
    }
}

fn read_optional_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => matches!(v.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"),
        Err(_) => default,
    }
}

fn read_optional_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn load_dotenv_layers() {
    for path in [".env", "../.env", "../../.env"] {
        let _ = dotenvy::from_path_override(path);
    }
}
