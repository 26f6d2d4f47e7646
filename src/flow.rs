//! The discovery, token, and invocation stages composed into one pipeline.

mod discovery;
mod invoke;
mod token;

// crates.io
use reqwest::redirect::Policy;
// self
use crate::{
	_prelude::*,
	auth::Credentials,
	error::ConfigError,
	http::ReqwestHttpClient,
	obs::{self, FlowOutcome, FlowStage, StageSpan},
	rpc::RpcTarget,
};

/// Default per-step timeout applied to the underlying HTTP client.
///
/// Unbounded waits on an identity provider or RPC endpoint are an operational
/// risk; expiry surfaces as a transport error.
pub const DEFAULT_STEP_TIMEOUT: StdDuration = StdDuration::from_secs(10);

/// One-shot client-credentials pipeline against a single provider and RPC target.
///
/// The three stages are strict sequential dependencies: token acquisition needs
/// the discovery result, invocation needs the token. Each stage's failure aborts
/// the remaining stages; a flow either completes all three or reports exactly one
/// typed failure. Tokens and call metadata are scoped to one execution and never
/// pooled across flows.
#[derive(Clone)]
pub struct BearerFlow {
	/// HTTP client used for every outbound request.
	pub http_client: ReqwestHttpClient,
	/// Identity provider base URL the discovery path is resolved against.
	pub provider_base: Url,
	/// Validated RPC channel target.
	pub target: RpcTarget,
	/// Client credentials presented during the grant.
	pub credentials: Credentials,
}
impl BearerFlow {
	/// Creates a flow with a default transport: rustls TLS, redirects disabled,
	/// [`DEFAULT_STEP_TIMEOUT`] per request.
	pub fn new(
		provider_base: Url,
		target: RpcTarget,
		credentials: Credentials,
	) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.timeout(DEFAULT_STEP_TIMEOUT)
			.redirect(Policy::none())
			.build()?;

		Ok(Self::with_http_client(provider_base, target, credentials, ReqwestHttpClient(client)))
	}

	/// Creates a flow that reuses a caller-provided transport.
	pub fn with_http_client(
		provider_base: Url,
		target: RpcTarget,
		credentials: Credentials,
		http_client: ReqwestHttpClient,
	) -> Self {
		Self { http_client, provider_base, target, credentials }
	}

	/// Runs the whole pipeline for one unary operation: fetch the discovery
	/// document, exchange credentials for a token, invoke `method_path` with the
	/// token attached as per-call metadata.
	///
	/// Halts on the first failure; the RPC is never attempted without a token.
	pub async fn execute<Req, Res>(&self, method_path: &str, request: &Req) -> Result<Res>
	where
		Req: Serialize + ?Sized + Sync,
		Res: serde::de::DeserializeOwned,
	{
		let document = self.fetch_discovery().await?;
		let grant = self.acquire_token(&document).await?;

		self.invoke(method_path, &grant.access_token, request).await
	}

	async fn run_stage<T, Fut>(&self, stage: FlowStage, fut: Fut) -> Result<T>
	where
		Fut: Future<Output = Result<T>>,
	{
		let span = StageSpan::new(stage);

		obs::record_stage_outcome(stage, FlowOutcome::Attempt);

		let result = span.instrument(fut).await;

		match &result {
			Ok(_) => obs::record_stage_outcome(stage, FlowOutcome::Success),
			Err(_) => obs::record_stage_outcome(stage, FlowOutcome::Failure),
		}

		result
	}
}
impl Debug for BearerFlow {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BearerFlow")
			.field("provider_base", &self.provider_base.as_str())
			.field("target", &self.target)
			.field("client_id", &self.credentials.client_id)
			.finish()
	}
}
