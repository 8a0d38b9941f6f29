use backend::config::stage::Stage;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub stage: Stage,
    pub worker_server: WorkerServer,
    pub database: Database,
    pub sweep: Sweep,
}

#[derive(Debug, Clone)]
pub struct WorkerServer {
    pub port: u16,
    pub timeout: u64,
    pub body_limit: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Sweep {
    pub interval_secs: u64,
    /// Bearer token for the manual sweep endpoint; the endpoint is disabled when unset.
    pub internal_token: Option<String>,
}
