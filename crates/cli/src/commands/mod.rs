pub mod boot;
pub mod session;
pub mod whoami;

use anyhow::Result;

use crate::cli::{Cli, Commands};
use crate::context::CommandContext;
use crate::output::print_json;

pub async fn dispatch(cli: Cli) -> Result<()> {
	let mut ctx = CommandContext::resolve(cli.config.as_deref(), cli.origin, cli.jar)?;

	match cli.command {
		Commands::Boot { modules, stall_timeout_ms } => {
			boot::apply_overrides(&mut ctx.config, modules, stall_timeout_ms);
			print_json(&boot::run(&ctx).await?)
		}
		Commands::Session { action } => print_json(&session::run(&ctx, action).await?),
		Commands::Whoami => print_json(&whoami::run(&ctx).await?),
	}
}
