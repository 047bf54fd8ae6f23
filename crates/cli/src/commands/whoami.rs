use anyhow::{Result, anyhow};
use pageboot::{Error, UserInfoFetcher};
use serde_json::{Value, json};

use crate::context::CommandContext;

pub async fn run(ctx: &CommandContext) -> Result<Value> {
	let fetcher = UserInfoFetcher::new(ctx.store(), ctx.api()?);
	let user = match fetcher.fetch_info().await {
		Ok(user) => user,
		Err(Error::Api(err)) => {
			let page = err.error_page();
			return Err(match page {
				Some(page) => anyhow!("user lookup failed, see {}{page}: {err}", ctx.config.origin.trim_end_matches('/')),
				None => anyhow!(err).context("user lookup failed"),
			});
		}
		Err(err) => return Err(err.into()),
	};

	Ok(match user {
		Some(user) => json!({
			"loggedIn": true,
			"name": user.name_text(),
			"user": user,
		}),
		None => json!({ "loggedIn": false }),
	})
}
