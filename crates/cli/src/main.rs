use clap::Parser;
use pageboot_cli::{cli::Cli, commands, logging};
use tracing::error;

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	if let Err(err) = commands::dispatch(cli).await {
		error!(target = "pageboot", error = %format_args!("{err:#}"), "command failed");
		std::process::exit(1);
	}
}
