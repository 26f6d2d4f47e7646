//! RPC channel target validation and per-call authorization metadata.

// std
use std::borrow::Cow;
// self
use crate::{_prelude::*, auth::Secret, error::ConfigError};

/// Validated RPC channel target; always an HTTPS URL.
///
/// The transport trust configuration (certificates, roots) belongs to the HTTP
/// client; the target only guarantees the channel is addressed over an encrypted
/// scheme.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RpcTarget(Url);
impl RpcTarget {
	/// Parses a `host:port` pair or a full URL into a target.
	///
	/// Bare `host:port` values are assumed to be HTTPS; explicit non-HTTPS schemes
	/// are rejected.
	pub fn parse(value: &str) -> Result<Self, ConfigError> {
		let normalized = if value.contains("://") {
			Cow::Borrowed(value)
		} else {
			Cow::Owned(format!("https://{value}"))
		};
		let url =
			Url::parse(&normalized).map_err(|source| ConfigError::InvalidTarget { source })?;

		Self::from_url(url)
	}

	/// Validates an already-parsed URL as a target.
	pub fn from_url(url: Url) -> Result<Self, ConfigError> {
		if url.scheme() != "https" {
			return Err(ConfigError::InsecureTarget { url: url.to_string() });
		}

		Ok(Self(url))
	}

	/// Returns the validated target URL.
	pub fn url(&self) -> &Url {
		&self.0
	}

	/// Resolves an operation path against the target.
	pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		let mut base = self.0.clone();

		if !base.path().ends_with('/') {
			base.set_path(&format!("{}/", base.path()));
		}

		base.join(path.trim_start_matches('/'))
			.map_err(|source| ConfigError::InvalidEndpointPath { source })
	}
}

/// Authorization metadata for exactly one outbound call.
///
/// Constructed fresh per invocation and dropped with it; contexts are never shared
/// across calls, so a process issuing calls under different tokens cannot leak one
/// token onto another call.
#[derive(Clone)]
pub struct CallContext {
	authorization: String,
}
impl CallContext {
	/// Builds the `Bearer` authorization entry for a token.
	///
	/// The token is used verbatim; empty or whitespace-only tokens are rejected
	/// before any call context exists.
	pub fn bearer(token: &Secret) -> Result<Self, ConfigError> {
		if token.is_blank() {
			return Err(ConfigError::EmptyAccessToken);
		}

		Ok(Self { authorization: format!("Bearer {}", token.expose()) })
	}

	/// Returns the value carried under the `authorization` metadata key.
	pub fn authorization(&self) -> &str {
		&self.authorization
	}
}
impl Debug for CallContext {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CallContext").field("authorization", &"Bearer <redacted>").finish()
	}
}
