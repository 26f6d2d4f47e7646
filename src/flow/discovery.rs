//! Discovery stage: retrieve the provider metadata document.

// self
use crate::{
	_prelude::*,
	error::{ConfigError, DiscoveryError, TransportError},
	flow::BearerFlow,
	obs::{self, FlowStage},
	provider::{DiscoveryDocument, WELL_KNOWN_DISCOVERY_PATH},
};

impl BearerFlow {
	/// Fetches the provider discovery document from the well-known path.
	///
	/// Guarantees a present, non-blank token endpoint on success; the raw payload
	/// is emitted at debug level for observability and the provider's extra
	/// metadata is returned with the document.
	pub async fn fetch_discovery(&self) -> Result<DiscoveryDocument> {
		self.run_stage(FlowStage::Discovery, async {
			let url = self.discovery_url()?;
			let response =
				self.http_client.get(url).send().await.map_err(TransportError::from)?;
			let status = response.status();
			let body = response.bytes().await.map_err(TransportError::from)?;

			if !status.is_success() {
				return Err(DiscoveryError::Status {
					status: status.as_u16(),
					body: String::from_utf8_lossy(&body).into_owned(),
				}
				.into());
			}

			obs::record_discovery_payload(&String::from_utf8_lossy(&body));

			DiscoveryDocument::from_json(&body)
		})
		.await
	}

	/// Resolves the well-known discovery path against the provider base URL.
	pub fn discovery_url(&self) -> Result<Url, ConfigError> {
		let mut base = self.provider_base.clone();

		if !base.path().ends_with('/') {
			base.set_path(&format!("{}/", base.path()));
		}

		base.join(WELL_KNOWN_DISCOVERY_PATH)
			.map_err(|source| ConfigError::InvalidEndpointPath { source })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{auth::Credentials, rpc::RpcTarget};

	fn flow(provider_base: &str) -> BearerFlow {
		BearerFlow::new(
			Url::parse(provider_base).expect("Provider base URL should parse."),
			RpcTarget::parse("https://localhost:5101").expect("Target should parse."),
			Credentials::new("client", "secret"),
		)
		.expect("Flow construction should succeed.")
	}

	#[test]
	fn discovery_url_handles_trailing_slashes() {
		for base in ["http://localhost:5100", "http://localhost:5100/"] {
			assert_eq!(
				flow(base).discovery_url().expect("Discovery URL should resolve.").as_str(),
				"http://localhost:5100/.well-known/openid-configuration",
			);
		}
	}

	#[test]
	fn discovery_url_preserves_provider_path_segments() {
		assert_eq!(
			flow("http://localhost:5100/tenants/acme")
				.discovery_url()
				.expect("Discovery URL should resolve.")
				.as_str(),
			"http://localhost:5100/tenants/acme/.well-known/openid-configuration",
		);
	}
}
