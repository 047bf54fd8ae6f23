//! Units fetched over HTTP from the site's resource root.

use pageboot_runtime::{Unit, UnitContext, UnitResolver, unit_path};
use reqwest::Client;
use tokio::runtime::Handle;
use tracing::{debug, error, warn};

/// Resolves every unit name to a GET of `{origin}/resources/js/{name}.js`.
///
/// A unit advances once its body has been downloaded. A failed download
/// leaves the loader stalled on that unit.
pub struct FetchResolver {
	client: Client,
	origin: String,
	runtime: Handle,
}

impl FetchResolver {
	/// Must be called from inside a Tokio runtime.
	pub fn new(client: Client, origin: &str) -> Self {
		Self {
			client,
			origin: origin.trim_end_matches('/').to_string(),
			runtime: Handle::current(),
		}
	}

	pub fn url_for(&self, name: &str) -> String {
		format!("{}{}", self.origin, unit_path(name))
	}
}

impl UnitResolver for FetchResolver {
	fn resolve(&self, name: &str) -> Option<Box<dyn Unit>> {
		Some(Box::new(FetchUnit {
			client: self.client.clone(),
			url: self.url_for(name),
			runtime: self.runtime.clone(),
		}))
	}
}

struct FetchUnit {
	client: Client,
	url: String,
	runtime: Handle,
}

async fn download(client: &Client, url: &str) -> reqwest::Result<usize> {
	let body = client.get(url).send().await?.error_for_status()?.bytes().await?;
	Ok(body.len())
}

impl Unit for FetchUnit {
	fn run(self: Box<Self>, cx: UnitContext) {
		let FetchUnit { client, url, runtime } = *self;
		runtime.spawn(async move {
			match download(&client, &url).await {
				Ok(bytes) => {
					debug!(target = "pageboot.loader", unit = %cx.name(), %url, bytes, "unit fetched");
					if let Err(err) = cx.advance() {
						warn!(target = "pageboot.loader", error = %err, "unit could not advance");
					}
				}
				Err(err) => {
					error!(
						target = "pageboot.loader",
						unit = %cx.name(),
						position = cx.position(),
						%url,
						error = %err,
						"unit failed to load; boot stalled"
					);
				}
			}
		});
	}
}
