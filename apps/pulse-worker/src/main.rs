use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	pulse_worker::run(pulse_worker::Args::parse()).await
}
