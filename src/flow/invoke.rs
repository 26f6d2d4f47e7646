//! Invocation stage: perform the RPC with per-call bearer metadata.

// crates.io
use reqwest::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::Secret,
	error::{AuthorizationError, ProtocolError, TransportError},
	flow::BearerFlow,
	obs::FlowStage,
	rpc::CallContext,
};

impl BearerFlow {
	/// Invokes a single unary operation on the RPC target with the access token
	/// attached as per-call `authorization` metadata.
	///
	/// A fresh [`CallContext`] is constructed for this call alone; blank tokens
	/// are rejected before any request is built. A 401/403 from the endpoint
	/// surfaces as an authorization error, distinct from transport failures.
	pub async fn invoke<Req, Res>(
		&self,
		method_path: &str,
		access_token: &Secret,
		request: &Req,
	) -> Result<Res>
	where
		Req: Serialize + ?Sized + Sync,
		Res: DeserializeOwned,
	{
		self.run_stage(FlowStage::Invoke, async {
			let context = CallContext::bearer(access_token)?;
			let url = self.target.endpoint(method_path)?;
			let response = self
				.http_client
				.post(url)
				.header(AUTHORIZATION, context.authorization())
				.json(request)
				.send()
				.await
				.map_err(TransportError::from)?;
			let status = response.status();
			let challenge = response
				.headers()
				.get(WWW_AUTHENTICATE)
				.and_then(|value| value.to_str().ok())
				.map(ToOwned::to_owned);
			let body = response.bytes().await.map_err(TransportError::from)?;

			if status == reqwest::StatusCode::UNAUTHORIZED
				|| status == reqwest::StatusCode::FORBIDDEN
			{
				return Err(AuthorizationError::Rejected {
					status: status.as_u16(),
					reason: challenge
						.unwrap_or_else(|| String::from_utf8_lossy(&body).into_owned()),
				}
				.into());
			}
			if !status.is_success() {
				return Err(ProtocolError::UnexpectedStatus {
					stage: "rpc",
					status: status.as_u16(),
					body: String::from_utf8_lossy(&body).into_owned(),
				}
				.into());
			}

			let deserializer = &mut serde_json::Deserializer::from_slice(&body);

			serde_path_to_error::deserialize(deserializer)
				.map_err(|source| ProtocolError::Json { stage: "rpc", source }.into())
		})
		.await
	}
}
