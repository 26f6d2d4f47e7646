// crates.io
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, auth::Credentials};

/// Base64-encoded SHA-256 digest of a plaintext secret.
///
/// Registries never hold plaintext secrets; clients present plaintext and the
/// registry compares digests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretDigest(String);
impl SecretDigest {
	/// Digests a plaintext secret.
	pub fn digest(plaintext: &str) -> Self {
		Self(BASE64.encode(Sha256::digest(plaintext.as_bytes())))
	}

	/// Checks a plaintext secret against this digest.
	pub fn matches(&self, plaintext: &str) -> bool {
		self.0 == Self::digest(plaintext).0
	}
}

/// Grant types a registered client may use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowedGrant {
	/// App-only client-credentials grant.
	ClientCredentials,
	/// Authorization Code grant.
	AuthorizationCode,
	/// Refresh Token grant.
	RefreshToken,
}

/// Standard grouping of identity claims a provider can expose.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityResource {
	/// Resource name (`openid`, `profile`, ...).
	pub name: String,
	/// Human-readable display name.
	pub display_name: String,
	/// Claim types bundled by the resource.
	pub claim_types: Vec<String>,
}
impl IdentityResource {
	/// Standard `openid` subject resource.
	pub fn openid() -> Self {
		Self {
			name: "openid".into(),
			display_name: "Your user identifier".into(),
			claim_types: vec!["sub".into()],
		}
	}

	/// Standard `profile` resource.
	pub fn profile() -> Self {
		Self {
			name: "profile".into(),
			display_name: "User profile".into(),
			claim_types: vec![
				"name".into(),
				"family_name".into(),
				"given_name".into(),
				"picture".into(),
			],
		}
	}

	/// Standard `email` resource.
	pub fn email() -> Self {
		Self {
			name: "email".into(),
			display_name: "Your email address".into(),
			claim_types: vec!["email".into(), "email_verified".into()],
		}
	}
}

/// Protected API declared to the provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResource {
	/// Resource name, also usable as a scope.
	pub name: String,
	/// Human-readable display name.
	pub display_name: String,
	/// Digests of the secrets the API may use for introspection.
	pub secrets: Vec<SecretDigest>,
	/// Scopes the resource exposes; defaults to the resource name.
	pub scopes: Vec<String>,
}
impl ApiResource {
	/// Declares an API resource whose single scope is its own name.
	pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
		let name = name.into();

		Self { scopes: vec![name.clone()], name, display_name: display_name.into(), secrets: Vec::new() }
	}

	/// Attaches a secret digest.
	pub fn with_secret(mut self, plaintext: &str) -> Self {
		self.secrets.push(SecretDigest::digest(plaintext));

		self
	}
}

/// Client registration the provider consults when validating a token request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRegistration {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Digests of the client's registered secrets.
	pub secrets: Vec<SecretDigest>,
	/// Grant type the client may use.
	pub allowed_grant: AllowedGrant,
	/// Scopes the client may request.
	pub allowed_scopes: Vec<String>,
}
impl ClientRegistration {
	/// Registers a client-credentials client.
	pub fn client_credentials(client_id: impl Into<String>, secret: &str) -> Self {
		Self {
			client_id: client_id.into(),
			secrets: vec![SecretDigest::digest(secret)],
			allowed_grant: AllowedGrant::ClientCredentials,
			allowed_scopes: Vec::new(),
		}
	}

	/// Grants the client an allowed scope.
	pub fn allow_scope(mut self, scope: impl Into<String>) -> Self {
		self.allowed_scopes.push(scope.into());

		self
	}

	/// Checks a plaintext secret against the registered digests.
	pub fn authenticates(&self, plaintext: &str) -> bool {
		self.secrets.iter().any(|digest| digest.matches(plaintext))
	}

	/// Checks whether the client may request a scope.
	pub fn allows_scope(&self, scope: &str) -> bool {
		self.allowed_scopes.iter().any(|allowed| allowed == scope)
	}
}

/// Static provider configuration loaded once at provider startup.
///
/// Plain immutable data with lookups; no behavior hierarchy. The pipeline itself
/// never consults it, only the provider does.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRegistry {
	/// Identity claim groupings the provider exposes.
	pub identity_resources: Vec<IdentityResource>,
	/// Protected APIs declared to the provider.
	pub api_resources: Vec<ApiResource>,
	/// Registered clients.
	pub clients: Vec<ClientRegistration>,
}
impl ProviderRegistry {
	/// Looks up a registered client.
	pub fn client(&self, client_id: &str) -> Option<&ClientRegistration> {
		self.clients.iter().find(|client| client.client_id == client_id)
	}

	/// Looks up a declared API resource.
	pub fn api_resource(&self, name: &str) -> Option<&ApiResource> {
		self.api_resources.iter().find(|resource| resource.name == name)
	}

	/// Decides whether the provider would issue a client-credentials token for the
	/// given credentials: the client must exist, a secret digest must match, the
	/// grant must be allowed, and the requested scope (if any) must be granted.
	pub fn authorizes(&self, credentials: &Credentials) -> bool {
		let Some(client) = self.client(&credentials.client_id) else {
			return false;
		};

		if client.allowed_grant != AllowedGrant::ClientCredentials {
			return false;
		}
		if !client.authenticates(credentials.client_secret.expose()) {
			return false;
		}

		credentials.scope.as_deref().is_none_or(|scope| client.allows_scope(scope))
	}
}
