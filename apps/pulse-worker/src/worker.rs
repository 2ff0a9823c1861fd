use std::time::Duration as StdDuration;

use color_eyre::Result;
use time::{Duration, OffsetDateTime};
use tokio::time as tokio_time;

use pulse_service::PulseService;

pub async fn run_worker(service: PulseService) -> Result<()> {
	let poll_interval = StdDuration::from_millis(service.cfg.worker.poll_interval_ms);
	let sweep_interval = Duration::seconds(i64::from(service.cfg.worker.sweep_interval_seconds));
	let mut last_sweep = OffsetDateTime::now_utc();

	tracing::info!("Pulse worker started.");

	loop {
		if let Err(err) = process_once(&service).await {
			tracing::error!(error = %err, "Job processing failed.");
		}

		let now = OffsetDateTime::now_utc();

		if now - last_sweep >= sweep_interval {
			if let Err(err) = service.run_health_sweep(now).await {
				tracing::error!(error = %err, "Health sweep failed.");
			} else {
				last_sweep = now;
			}
		}

		tokio_time::sleep(poll_interval).await;
	}
}

async fn process_once(service: &PulseService) -> Result<()> {
	let now = OffsetDateTime::now_utc();
	let Some(delivery) = service.stores.queue.pull(now).await? else {
		return Ok(());
	};

	service.process_delivery(delivery).await?;

	Ok(())
}
