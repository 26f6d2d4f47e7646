// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	future::Future,
	pin::Pin,
};
// crates.io
use url::Url;
// self
use bearer_bridge::{
	auth::Credentials,
	error::{Error, TransportError},
	http::{ExchangeHttpClient, StatusSlot},
	oauth::{
		self,
		oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse},
	},
};

#[derive(Debug)]
struct FakeTransportError;
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("Transport unreachable.")
	}
}
impl StdError for FakeTransportError {}

#[derive(Clone, Copy)]
struct FakeHttpClient;
impl ExchangeHttpClient for FakeHttpClient {
	type Handle = FakeHttpHandle;
	type TransportError = FakeTransportError;

	fn with_status(&self, slot: StatusSlot) -> Self::Handle {
		FakeHttpHandle { slot }
	}
}

struct FakeHttpHandle {
	slot: StatusSlot,
}
impl<'a> AsyncHttpClient<'a> for FakeHttpHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send + Sync>>;

	fn call(&'a self, _request: HttpRequest) -> Self::Future {
		let slot = self.slot.clone();

		Box::pin(async move {
			assert!(
				slot.take().is_none(),
				"StatusSlot must be clear before dispatching a request."
			);
			slot.store(503);

			Err(HttpClientError::Reqwest(Box::new(FakeTransportError)))
		})
	}
}

#[tokio::test]
async fn transport_failure_during_the_exchange_is_a_transport_error() {
	let endpoint =
		Url::parse("https://idp.example.com/connect/token").expect("Endpoint should parse.");
	let credentials = Credentials::new("client", "secret").with_scope("api");
	let err = oauth::exchange_client_credentials(&endpoint, &credentials, &FakeHttpClient)
		.await
		.expect_err("Unreachable transport must fail the exchange.");

	assert!(matches!(err, Error::Transport(TransportError::Network { .. })));
}
