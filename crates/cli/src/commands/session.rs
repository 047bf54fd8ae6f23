use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use pageboot::{Bootstrap, ReloadSignal, SessionDescriptor, SessionGrant};
use pageboot_runtime::UnitRegistry;
use serde::Serialize;
use serde_json::{Value, json};

use crate::cli::SessionAction;
use crate::context::CommandContext;

/// Lifetime of a session stored without an explicit expiry.
pub const DEFAULT_SESSION_DAYS: i64 = 30;

#[derive(Debug, Serialize)]
pub struct SessionStatus {
	pub active: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub descriptor: Option<SessionDescriptor>,
	/// Stored value, present even when it does not decode.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub raw: Option<String>,
}

pub async fn run(ctx: &CommandContext, action: SessionAction) -> Result<Value> {
	let store = ctx.store();
	match action {
		SessionAction::Status => {
			let raw = store.raw()?;
			let descriptor = store.read()?;
			Ok(serde_json::to_value(SessionStatus {
				active: descriptor.is_some(),
				descriptor,
				raw,
			})?)
		}
		SessionAction::Login { id, user_id, token, expires } => {
			let descriptor = SessionDescriptor::new(id, user_id, token)?;
			let expires = expires.unwrap_or_else(default_expiry);
			store.write(&descriptor, expires)?;
			Ok(json!({ "stored": true, "descriptor": descriptor, "expires": expires }))
		}
		SessionAction::Import { file } => {
			let content = fs::read_to_string(&file).with_context(|| format!("failed to read {}", file.display()))?;
			let grant: SessionGrant = serde_json::from_str(&content).with_context(|| format!("{} is not a session grant", file.display()))?;
			let descriptor = store.write_grant(&grant)?;
			Ok(json!({ "stored": true, "descriptor": descriptor, "expires": grant.expires.to_datetime() }))
		}
		SessionAction::Logout => {
			let boot = Bootstrap::new(ctx.config.clone(), UnitRegistry::new(), ctx.jar(), ctx.api()?, Arc::new(ReloadSignal::new()));
			let ended = boot.logout().await?;
			Ok(json!({ "ended": ended }))
		}
		SessionAction::Clear => {
			let present = store.raw()?.is_some();
			store.clear()?;
			Ok(json!({ "cleared": present }))
		}
	}
}

fn default_expiry() -> DateTime<Utc> {
	Utc::now() + TimeDelta::days(DEFAULT_SESSION_DAYS)
}
