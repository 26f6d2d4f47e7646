//! Transport seam for the token exchange.
//!
//! The module exposes [`ExchangeHttpClient`] alongside [`StatusSlot`] so callers can
//! plug custom HTTP clients into the token stage without losing the status code the
//! error mapping relies on. Implementations call [`StatusSlot::take`] before
//! dispatching a request and [`StatusSlot::store`] once a status is known.

// std
use std::ops::Deref;
// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
// self
use crate::_prelude::*;

/// Abstraction over HTTP transports capable of executing the client-credentials
/// exchange.
///
/// The trait is the flow's only seam for swapping the token-stage transport.
/// Each handle carries a clone of a [`StatusSlot`] so the error layer can attach
/// the HTTP status of the failed response; handles must own whatever state they
/// need so their request futures stay `Send` while in flight.
pub trait ExchangeHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle tied to a [`StatusSlot`].
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds an [`AsyncHttpClient`] handle that records the response status in `slot`.
	///
	/// Implementations must clear the slot with [`StatusSlot::take`] before submitting
	/// the request so stale statuses never leak across exchanges.
	fn with_status(&self, slot: StatusSlot) -> Self::Handle;
}

/// Thread-safe slot sharing the most recent HTTP status between transport and
/// error layers.
///
/// The flow creates a fresh slot for each exchange and reads it immediately after
/// the OAuth client resolves.
#[derive(Clone, Debug, Default)]
pub struct StatusSlot(Arc<Mutex<Option<u16>>>);
impl StatusSlot {
	/// Stores the status of the current response.
	pub fn store(&self, status: u16) {
		*self.0.lock() = Some(status);
	}

	/// Returns the captured status, if any, consuming it from the slot.
	pub fn take(&self) -> Option<u16> {
		self.0.lock().take()
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Token requests must not follow redirects, matching OAuth 2.0 guidance that token
/// endpoints return results directly. Configure any custom [`ReqwestClient`] with
/// redirect following disabled before wrapping it.
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl ExchangeHttpClient for ReqwestHttpClient {
	type Handle = StatusHandle;
	type TransportError = ReqwestError;

	fn with_status(&self, slot: StatusSlot) -> Self::Handle {
		StatusHandle::new(self.0.clone(), slot)
	}
}

struct StatusHttpClient {
	client: ReqwestClient,
	slot: StatusSlot,
}

/// Handle returned by [`ReqwestHttpClient`] that records response statuses.
#[derive(Clone)]
pub struct StatusHandle(Arc<StatusHttpClient>);
impl StatusHandle {
	fn new(client: ReqwestClient, slot: StatusSlot) -> Self {
		Self(Arc::new(StatusHttpClient { client, slot }))
	}
}
impl<'c> AsyncHttpClient<'c> for StatusHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = Arc::clone(&self.0);

		Box::pin(async move {
			client.slot.take();

			let response = client
				.client
				.execute(request.try_into().map_err(Box::new)?)
				.await
				.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();

			client.slot.store(status.as_u16());

			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
