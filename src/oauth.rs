//! Client-credentials exchange built on the `oauth2` crate.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, ClientId, ClientSecret, EndpointNotSet, EndpointSet, HttpClientError,
	RequestTokenError, Scope, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicRequestTokenError, BasicTokenResponse},
};
// self
use crate::{
	_prelude::*,
	auth::{Credentials, Secret, TokenGrant},
	error::{ConfigError, ProtocolError, TokenError, TransportError},
	http::{ExchangeHttpClient, StatusSlot},
};

type ConfiguredBasicClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Performs a single client-credentials grant against `token_endpoint`.
///
/// One attempt, no retry; the caller decides whether to rerun the whole flow.
/// Client authentication uses form-body parameters (`client_id`/`client_secret`
/// alongside `grant_type=client_credentials` and the optional `scope`).
pub async fn exchange_client_credentials<C>(
	token_endpoint: &Url,
	credentials: &Credentials,
	http_client: &C,
) -> Result<TokenGrant>
where
	C: ?Sized + ExchangeHttpClient,
{
	let token_url = TokenUrl::new(token_endpoint.to_string())
		.map_err(|source| ConfigError::InvalidTokenUrl { source })?;
	let oauth_client: ConfiguredBasicClient =
		BasicClient::new(ClientId::new(credentials.client_id.clone()))
			.set_client_secret(ClientSecret::new(credentials.client_secret.expose().to_owned()))
			.set_auth_type(AuthType::RequestBody)
			.set_token_uri(token_url);
	let slot = StatusSlot::default();
	let handle = http_client.with_status(slot.clone());
	let mut request = oauth_client.exchange_client_credentials();

	if let Some(scope) = credentials.scope.as_deref() {
		request = request.add_scope(Scope::new(scope.to_owned()));
	}

	let response = request
		.request_async(&handle)
		.await
		.map_err(|err| map_exchange_error(slot.take(), err))?;

	map_token_response(response)
}

fn map_token_response(response: BasicTokenResponse) -> Result<TokenGrant> {
	let access_token = response.access_token().secret();

	if access_token.trim().is_empty() {
		return Err(TokenError::MissingAccessToken.into());
	}

	let expires_in = match response.expires_in() {
		Some(lifetime) => Some(Duration::seconds(
			i64::try_from(lifetime.as_secs()).map_err(|_| ConfigError::ExpiresInOutOfRange)?,
		)),
		None => None,
	};
	let scope = response.scopes().map(|scopes| {
		scopes.iter().map(|scope| scope.as_str()).collect::<Vec<_>>().join(" ")
	});

	Ok(TokenGrant { access_token: Secret::new(access_token.as_str()), expires_in, scope })
}

fn map_exchange_error<E>(
	status: Option<u16>,
	err: BasicRequestTokenError<HttpClientError<E>>,
) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		RequestTokenError::ServerResponse(response) => TokenError::Rejected {
			code: response.error().to_string(),
			description: response.error_description().cloned(),
			status,
		}
		.into(),
		RequestTokenError::Request(error) => map_transport_error(error),
		RequestTokenError::Parse(source, _body) =>
			ProtocolError::Json { stage: "token", source }.into(),
		RequestTokenError::Other(message) => TokenError::Unexpected { message }.into(),
	}
}

fn map_transport_error<E>(err: HttpClientError<E>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Reqwest(inner) => {
			let source: Box<dyn StdError + Send + Sync> = inner;

			TransportError::from_boxed(source).into()
		},
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => TokenError::Unexpected { message }.into(),
		other => TokenError::Unexpected {
			message: format!("Unhandled HTTP client error variant: {other:?}."),
		}
		.into(),
	}
}
