//! Runs the whole pipeline against a mock provider and echo service: discover the
//! token endpoint, exchange client credentials, invoke the greeter with the bearer
//! token attached.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde::{Deserialize, Serialize};
use url::Url;
// self
use bearer_bridge::{
	auth::Credentials,
	flow::BearerFlow,
	http::ReqwestHttpClient,
	reqwest::{Client, redirect::Policy},
	rpc::RpcTarget,
};

#[derive(Serialize)]
struct HelloRequest {
	name: String,
}

#[derive(Debug, Deserialize)]
struct HelloReply {
	message: String,
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_endpoint = server.url("/connect/token");

	server
		.mock_async(move |when, then| {
			when.method(GET).path("/.well-known/openid-configuration");
			then.status(200).header("content-type", "application/json").json_body(
				serde_json::json!({ "token_endpoint": token_endpoint }),
			);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/connect/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"bearer\",\"expires_in\":900}",
			);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/greeter/say-hello")
				.header("authorization", "Bearer demo-access");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(serde_json::json!({ "message": "Hello World" }));
		})
		.await;

	let http_client = ReqwestHttpClient::with_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(Policy::none())
			.build()?,
	);
	let flow = BearerFlow::with_http_client(
		Url::parse(&server.base_url())?,
		RpcTarget::parse(&server.base_url())?,
		Credentials::new("client", "secret").with_scope("api"),
		http_client,
	);
	let document = flow.fetch_discovery().await?;

	println!("Token endpoint: {}.", document.token_endpoint);

	let grant = flow.acquire_token(&document).await?;
	let reply: HelloReply =
		flow.invoke("/greeter/say-hello", &grant.access_token, &HelloRequest {
			name: "World".into(),
		})
		.await?;

	println!("Greeter replied: {}.", reply.message);

	Ok(())
}
