use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub mod worker;

#[derive(Debug, Parser)]
#[command(
	version = pulse_cli::VERSION,
	rename_all = "kebab",
	styles = pulse_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: std::path::PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = pulse_config::load(&args.config)?;
	let filter = EnvFilter::new(config.service.log_level.clone());
	tracing_subscriber::fmt().with_env_filter(filter).init();

	let db = pulse_storage::db::Db::connect(&config.storage.postgres).await?;
	db.ensure_schema().await?;

	let pg_stores = Arc::new(pulse_storage::stores::PgStores::new(db.pool.clone()));
	let queue = Arc::new(pulse_storage::queue::PgJobQueue::new(
		db.pool.clone(),
		config.worker.lease_seconds,
	));
	let stores = pulse_service::Stores::new(
		pg_stores.clone(),
		pg_stores.clone(),
		pg_stores,
		queue,
	);
	let service = pulse_service::PulseService::new(config, stores);

	worker::run_worker(service).await
}
