//! Token stage: exchange client credentials at the discovered endpoint.

// self
use crate::{
	_prelude::*,
	auth::TokenGrant,
	flow::BearerFlow,
	oauth,
	obs::FlowStage,
	provider::DiscoveryDocument,
};

impl BearerFlow {
	/// Exchanges the flow's credentials for an access token at the endpoint named
	/// in `document`.
	///
	/// A provider rejection surfaces as a token error carrying the provider's
	/// error code and description verbatim; the flow never proceeds to the RPC
	/// stage without a grant.
	pub async fn acquire_token(&self, document: &DiscoveryDocument) -> Result<TokenGrant> {
		self.run_stage(
			FlowStage::Token,
			oauth::exchange_client_credentials(
				&document.token_endpoint,
				&self.credentials,
				&self.http_client,
			),
		)
		.await
	}
}
