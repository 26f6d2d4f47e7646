//! Credential and token models shared by the flow stages.

// self
use crate::_prelude::*;

/// Redacted credential wrapper keeping sensitive material out of logs.
///
/// Used for client secrets and access tokens alike; the wrapped value is carried
/// verbatim and never re-encoded.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Secret(String);
impl Secret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns `true` when the value is empty or whitespace-only.
	pub fn is_blank(&self) -> bool {
		self.0.trim().is_empty()
	}
}
impl AsRef<str> for Secret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Secret").field(&"<redacted>").finish()
	}
}
impl Display for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Client credentials supplied by configuration; immutable for the process lifetime.
#[derive(Clone, Debug, Deserialize)]
pub struct Credentials {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Client secret presented during the grant.
	pub client_secret: Secret,
	/// Scope requested during the grant, when the client targets one.
	pub scope: Option<String>,
}
impl Credentials {
	/// Creates credentials without a scope.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: Secret::new(client_secret),
			scope: None,
		}
	}

	/// Sets the scope requested during the grant.
	pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}
}

/// Successful outcome of the client-credentials exchange.
///
/// Acquired once per flow execution, used for exactly one call, then dropped;
/// there is no cache to return it to.
#[derive(Clone)]
pub struct TokenGrant {
	/// Opaque bearer token; non-empty, used verbatim downstream.
	pub access_token: Secret,
	/// Token lifetime reported by the provider, when present.
	pub expires_in: Option<Duration>,
	/// Scope granted by the provider, when reported.
	pub scope: Option<String>,
}
impl Debug for TokenGrant {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenGrant")
			.field("access_token", &"<redacted>")
			.field("expires_in", &self.expires_in)
			.field("scope", &self.scope)
			.finish()
	}
}
