use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Default filter for a `-v` count.
pub fn default_directive(verbose: u8) -> &'static str {
	match verbose {
		0 => "warn",
		1 => "info",
		2 => "debug",
		_ => "trace",
	}
}

/// Installs the global subscriber; `RUST_LOG` overrides the verbosity flag.
pub fn init_logging(verbose: u8) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

	tracing_subscriber::registry()
		.with(fmt::layer().with_writer(std::io::stderr).with_target(true))
		.with(filter)
		.init();
}
