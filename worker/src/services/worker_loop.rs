use std::{sync::Arc, time::Duration};

use anyhow::Result;
use chrono::Utc;
use tracing::{error, info};

use crate::usecases::lifecycle_sweep::LifecycleSweepUseCase;

pub async fn run_worker_loop(
    usecase: Arc<LifecycleSweepUseCase>,
    interval_secs: u64,
) -> Result<()> {
    info!(interval_secs, "Lifecycle sweep loop started");

    loop {
        if let Err(e) = usecase.run(Utc::now()).await {
            error!("Error while running lifecycle sweep: {}", e);
        }

        tokio::time::sleep(Duration::from_secs(interval_secs)).await;
    }
}
