//! Provider-facing data: the discovery document consumed by the flow and the
//! static resource/client registry an identity provider loads at startup.

/// Static provider configuration (identity resources, API resources, clients).
pub mod registry;

pub use registry::*;

// self
use crate::{_prelude::*, error::{DiscoveryError, ProtocolError}};

/// Conventional well-known discovery path appended to the provider base URL.
pub const WELL_KNOWN_DISCOVERY_PATH: &str = ".well-known/openid-configuration";

/// Immutable provider discovery metadata.
///
/// Produced once per flow execution and never cached beyond it. Only the token
/// endpoint is consumed downstream; everything else the provider published is kept
/// in [`extra`](Self::extra) for the caller.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DiscoveryDocument {
	/// Token endpoint used for the client-credentials exchange.
	pub token_endpoint: Url,
	/// Remaining provider metadata, order-insensitive.
	pub extra: BTreeMap<String, serde_json::Value>,
}
impl DiscoveryDocument {
	/// Parses a discovery response body, requiring a present, non-blank, valid
	/// token endpoint.
	pub fn from_json(body: &[u8]) -> Result<Self> {
		let deserializer = &mut serde_json::Deserializer::from_slice(body);
		let raw: RawDiscovery = serde_path_to_error::deserialize(deserializer)
			.map_err(|source| ProtocolError::Json { stage: "discovery", source })?;
		let endpoint = raw
			.token_endpoint
			.as_deref()
			.map(str::trim)
			.filter(|value| !value.is_empty())
			.ok_or(DiscoveryError::MissingTokenEndpoint)?;
		let token_endpoint = Url::parse(endpoint)
			.map_err(|source| DiscoveryError::InvalidTokenEndpoint { source })?;

		Ok(Self { token_endpoint, extra: raw.extra })
	}
}

#[derive(Deserialize)]
struct RawDiscovery {
	#[serde(default)]
	token_endpoint: Option<String>,
	#[serde(flatten)]
	extra: BTreeMap<String, serde_json::Value>,
}
