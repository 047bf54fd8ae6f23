use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use pageboot::{BootConfig, BootReport, Bootstrap, ReloadSignal};
use pageboot_runtime::ModuleLoader;
use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

use crate::context::CommandContext;
use crate::fetch::FetchResolver;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BootOutcome {
	/// One report per boot; every entry after the first follows a reload.
	pub cycles: Vec<BootReport>,
	/// The last boot asked for a reload that was not followed.
	pub reload_pending: bool,
}

/// Flag values replace the configured ones.
pub fn apply_overrides(config: &mut BootConfig, modules: Vec<String>, stall_timeout_ms: Option<u64>) {
	if !modules.is_empty() {
		config.modules = modules;
	}
	if stall_timeout_ms.is_some() {
		config.stall_timeout_ms = stall_timeout_ms;
	}
}

/// Boots the site, booting again after each reload up to `maxReloads` times.
pub async fn run(ctx: &CommandContext) -> Result<BootOutcome> {
	let config = &ctx.config;
	let client = Client::new();
	let api = ctx.api()?;
	let mut cycles = Vec::new();

	for cycle in 0..=config.max_reloads {
		let reloads = ReloadSignal::new();
		let boot = Bootstrap::new(
			config.clone(),
			FetchResolver::new(client.clone(), &config.origin),
			ctx.jar(),
			Arc::clone(&api),
			Arc::new(reloads.clone()),
		);

		let drained = boot.drained();
		boot.start()?;
		wait_drained(boot.loader(), drained, config.stall_timeout()).await?;
		cycles.push(boot.settle().await?);

		if !reloads.take() {
			return Ok(BootOutcome { cycles, reload_pending: false });
		}
		if cycle == config.max_reloads {
			warn!(target = "pageboot", max_reloads = config.max_reloads, "reload limit reached");
			break;
		}
		info!(target = "pageboot", cycle = cycle + 1, "view reloaded; booting again");
	}

	Ok(BootOutcome { cycles, reload_pending: true })
}

fn poll_interval(limit: Duration) -> Duration {
	(limit / 4).clamp(Duration::from_millis(10), Duration::from_millis(250))
}

/// Waits for `drained`, failing once a single unit has loaded for `limit`.
pub async fn wait_drained<F>(loader: &ModuleLoader, drained: F, limit: Option<Duration>) -> Result<()>
where
	F: Future<Output = pageboot_runtime::Result<()>>,
{
	let Some(limit) = limit else {
		drained.await?;
		return Ok(());
	};

	tokio::pin!(drained);
	let mut ticker = tokio::time::interval(poll_interval(limit));
	loop {
		tokio::select! {
			result = &mut drained => {
				result?;
				return Ok(());
			}
			_ = ticker.tick() => {
				if let Some(stall) = loader.stalled_for(limit) {
					warn!(
						target = "pageboot.loader",
						unit = %stall.name,
						position = stall.position,
						elapsed_ms = stall.elapsed.as_millis() as u64,
						"unit stalled"
					);
					bail!("boot stalled: {stall}");
				}
			}
		}
	}
}
