//! Flow-level error types shared across the discovery, token, and invocation stages.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical pipeline error exposed by public APIs.
///
/// Every stage failure maps to exactly one variant; a failed flow returns one typed
/// error and nothing else ever runs afterwards.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Discovery document could not be obtained or is unusable.
	#[error(transparent)]
	Discovery(#[from] DiscoveryError),
	/// Token endpoint rejected the grant or returned an unusable token.
	#[error(transparent)]
	Token(#[from] TokenError),
	/// RPC endpoint rejected the bearer token.
	#[error(transparent)]
	Authorization(#[from] AuthorizationError),
	/// A response body did not match the expected schema.
	#[error(transparent)]
	Protocol(#[from] ProtocolError),
}

/// Configuration and validation failures raised before any network traffic.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Token endpoint URL taken from the discovery document was rejected by the
	/// OAuth client.
	#[error("Token endpoint URL is invalid.")]
	InvalidTokenUrl {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// RPC channel target cannot be parsed.
	#[error("RPC target is invalid.")]
	InvalidTarget {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// RPC channel target does not use an encrypted transport.
	#[error("RPC target `{url}` must use HTTPS.")]
	InsecureTarget {
		/// Target URL that failed validation.
		url: String,
	},
	/// Endpoint path could not be joined onto a base URL.
	#[error("Endpoint path is invalid.")]
	InvalidEndpointPath {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Access token was empty or whitespace-only when building call metadata.
	#[error("Access token must not be empty.")]
	EmptyAccessToken,
	/// Token endpoint returned an `expires_in` outside the supported range.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO); never retried by the flow.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred during the flow.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// A network step exceeded its timeout.
	#[error("Request timed out.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred during the flow.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Classifies an already-boxed transport error, splitting timeouts from
	/// generic network failures when the source is a reqwest error.
	pub(crate) fn from_boxed(source: BoxError) -> Self {
		if source.downcast_ref::<ReqwestError>().is_some_and(ReqwestError::is_timeout) {
			Self::Timeout { source }
		} else {
			Self::Network { source }
		}
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::from_boxed(Box::new(e))
	}
}

/// Failures obtaining or validating the provider discovery document; fatal to the
/// flow since no token endpoint is known without it.
#[derive(Debug, ThisError)]
pub enum DiscoveryError {
	/// Discovery endpoint returned a non-success status.
	#[error("Discovery endpoint returned HTTP {status}.")]
	Status {
		/// HTTP status code returned by the provider.
		status: u16,
		/// Provider error payload, when present.
		body: String,
	},
	/// Discovery document omitted the token endpoint or left it blank.
	#[error("Discovery document is missing a token endpoint.")]
	MissingTokenEndpoint,
	/// Discovery document named a token endpoint that is not a valid URL.
	#[error("Discovery document contains an invalid token endpoint URL.")]
	InvalidTokenEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}

/// Failures at the token endpoint; fatal to the flow, the RPC is never attempted.
#[derive(Debug, ThisError)]
pub enum TokenError {
	/// Provider rejected the credentials or scope.
	#[error("Token endpoint rejected the request: {code}.")]
	Rejected {
		/// OAuth error code carried verbatim from the provider.
		code: String,
		/// OAuth error description carried verbatim, when present.
		description: Option<String>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Provider returned a success body with an empty access token.
	#[error("Token endpoint returned an empty access token.")]
	MissingAccessToken,
	/// Provider returned a response the OAuth client could not classify.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	Unexpected {
		/// Summary of the unexpected response.
		message: String,
	},
}

/// RPC-layer rejection of the bearer token; distinct from transport failures.
#[derive(Debug, ThisError)]
pub enum AuthorizationError {
	/// Endpoint answered 401/403 for the presented token.
	#[error("RPC endpoint rejected the bearer token with HTTP {status}.")]
	Rejected {
		/// HTTP status code returned by the endpoint.
		status: u16,
		/// `www-authenticate` challenge or response body, whichever is present.
		reason: String,
	},
}

/// Malformed response bodies at any step.
#[derive(Debug, ThisError)]
pub enum ProtocolError {
	/// A response body was not valid for the expected schema.
	#[error("The {stage} response contained malformed JSON.")]
	Json {
		/// Stage label (`discovery`, `token`, or `rpc`).
		stage: &'static str,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// An endpoint returned a status the stage contract does not cover.
	#[error("The {stage} endpoint returned an unexpected HTTP {status} response.")]
	UnexpectedStatus {
		/// Stage label (`discovery`, `token`, or `rpc`).
		stage: &'static str,
		/// HTTP status code returned by the endpoint.
		status: u16,
		/// Response body, for diagnostics.
		body: String,
	},
}
