use anyhow::{Result, bail};
use backend::config::config_loader::{get_stage, optional_parse, required, required_parse};

use super::config_model::{Database, DotEnvyConfig, Sweep, WorkerServer};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let worker_server = WorkerServer {
        port: required_parse("SERVER_PORT_WORKER")?,
        body_limit: required_parse("SERVER_BODY_LIMIT")?,
        timeout: required_parse("SERVER_TIMEOUT")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
    };

    let interval_secs: u64 = optional_parse("WORKER_SWEEP_INTERVAL_SECS", 300)?;
    if interval_secs == 0 {
        bail!("WORKER_SWEEP_INTERVAL_SECS is invalid");
    }

    let sweep = Sweep {
        interval_secs,
        internal_token: std::env::var("INTERNAL_SWEEP_TOKEN").ok().and_then(|v| {
            let trimmed = v.trim().to_string();
            (!trimmed.is_empty()).then_some(trimmed)
        }),
    };

    Ok(DotEnvyConfig {
        stage: get_stage(),
        worker_server,
        database,
        sweep,
    })
}
