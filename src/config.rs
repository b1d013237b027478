use std::env;

/// Server configuration resolved once from the environment at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Both paths must be set for model mode; otherwise the engine serves
    /// heuristic predictions.
    pub model_path: Option<String>,
    pub meta_path: Option<String>,
    /// Optional soft cap on retained history entries.
    pub history_limit: Option<usize>,
}

const DEFAULT_PORT: u16 = 8080;

impl ServerConfig {
    pub fn from_env() -> Self {
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| {
            let port = env::var("PORT")
                .ok()
                .and_then(|s| s.parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT);
            format!("0.0.0.0:{}", port)
        });

        let history_limit = match env::var("HISTORY_LIMIT") {
            Ok(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => Some(n),
                _ => {
                    tracing::warn!("ignoring invalid HISTORY_LIMIT={:?}", raw);
                    None
                }
            },
            Err(_) => None,
        };

        Self {
            bind_addr,
            model_path: env::var("MODEL_PATH").ok(),
            meta_path: env::var("META_PATH").ok(),
            history_limit,
        }
    }
}
