use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pageboot")]
#[command(about = "Boot a site's units and manage its stored session")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug, -vvv trace)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Read settings from a JSON config file
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Cookie jar file (defaults to one per site host)
	#[arg(long, global = true, value_name = "FILE")]
	pub jar: Option<PathBuf>,

	/// Site origin, e.g. https://example.com
	#[arg(long, global = true, value_name = "URL")]
	pub origin: Option<String>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Load every unit in order, then validate the stored session
	Boot {
		/// Unit to load; repeat to replace the configured list
		#[arg(long = "module", value_name = "NAME")]
		modules: Vec<String>,

		/// Give up when one unit takes longer than this to load (ms)
		#[arg(long, value_name = "MS")]
		stall_timeout_ms: Option<u64>,
	},

	/// Inspect or change the stored session
	Session {
		#[command(subcommand)]
		action: SessionAction,
	},

	/// Show the user owning the stored session
	Whoami,
}

#[derive(Subcommand, Debug)]
pub enum SessionAction {
	/// Show the stored session
	Status,

	/// Store a session
	Login {
		#[arg(long)]
		id: String,

		#[arg(long)]
		user_id: String,

		#[arg(long)]
		token: String,

		/// Expiry as RFC 3339 (defaults to 30 days from now)
		#[arg(long, value_name = "RFC3339")]
		expires: Option<DateTime<Utc>>,
	},

	/// Store the session from a login response body
	Import {
		/// JSON file holding `{id, user_id, auth, expires}`
		file: PathBuf,
	},

	/// End the session on the server and clear it locally
	Logout,

	/// Clear the stored session without contacting the server
	Clear,
}
