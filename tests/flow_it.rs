// crates.io
use httpmock::prelude::*;
use serde::{Deserialize, Serialize};
use url::Url;
// self
use bearer_bridge::{
	auth::Credentials,
	error::{AuthorizationError, Error, ProtocolError, TokenError},
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

fn insecure_http_client() -> ReqwestHttpClient {
	let client = Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.redirect(Policy::none())
		.build()
		.expect("Failed to build insecure reqwest client for tests.");

	ReqwestHttpClient::with_client(client)
}

fn build_flow(server: &MockServer, secret: &str) -> BearerFlow {
	BearerFlow::with_http_client(
		Url::parse(&server.base_url()).expect("Mock provider base URL should parse."),
		RpcTarget::parse(&server.base_url()).expect("Mock RPC target should parse."),
		Credentials::new("client", secret).with_scope("api"),
		insecure_http_client(),
	)
}

async fn mock_discovery(server: &MockServer) -> httpmock::Mock<'_> {
	let token_endpoint = server.url("/connect/token");

	server
		.mock_async(move |when, then| {
			when.method(GET).path("/.well-known/openid-configuration");
			then.status(200).header("content-type", "application/json").json_body(
				serde_json::json!({ "token_endpoint": token_endpoint }),
			);
		})
		.await
}

async fn mock_token<'a>(server: &'a MockServer, token: &str) -> httpmock::Mock<'a> {
	let body = format!(
		"{{\"access_token\":\"{token}\",\"token_type\":\"bearer\",\"expires_in\":3600,\"scope\":\"api\"}}",
	);

	server
		.mock_async(move |when, then| {
			when.method(POST)
				.path("/connect/token")
				.body_includes("grant_type=client_credentials")
				.body_includes("client_id=client");
			then.status(200).header("content-type", "application/json").body(body);
		})
		.await
}

#[tokio::test]
async fn flow_completes_end_to_end_with_the_token_attached_verbatim() {
	let server = MockServer::start_async().await;
	let discovery = mock_discovery(&server).await;
	let token = mock_token(&server, "e2e-token").await;
	let rpc = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/greeter/say-hello")
				.header("authorization", "Bearer e2e-token")
				.json_body(serde_json::json!({ "name": "World" }));
			then.status(200)
				.header("content-type", "application/json")
				.json_body(serde_json::json!({ "message": "Hello World" }));
		})
		.await;
	let flow = build_flow(&server, "secret");
	let reply: HelloReply = flow
		.execute("/greeter/say-hello", &HelloRequest { name: "World".into() })
		.await
		.expect("End-to-end flow should succeed.");

	assert_eq!(reply.message, "Hello World");

	discovery.assert_async().await;
	token.assert_async().await;
	rpc.assert_async().await;
}

#[tokio::test]
async fn flow_is_repeatable_with_unchanged_provider_state() {
	let server = MockServer::start_async().await;
	let _discovery = mock_discovery(&server).await;
	let _token = mock_token(&server, "repeat-token").await;
	let rpc = server
		.mock_async(|when, then| {
			when.method(POST).path("/greeter/say-hello");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(serde_json::json!({ "message": "Hello World" }));
		})
		.await;
	let flow = build_flow(&server, "secret");

	for _ in 0..2 {
		let reply: HelloReply = flow
			.execute("/greeter/say-hello", &HelloRequest { name: "World".into() })
			.await
			.expect("Repeated flow should succeed.");

		assert_eq!(reply.message, "Hello World");
	}

	rpc.assert_calls_async(2).await;
}

#[tokio::test]
async fn rejected_credentials_halt_the_flow_before_the_rpc() {
	let server = MockServer::start_async().await;
	let _discovery = mock_discovery(&server).await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/connect/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_client\"}");
		})
		.await;
	let rpc = server
		.mock_async(|when, then| {
			when.method(POST).path("/greeter/say-hello");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(serde_json::json!({ "message": "Hello World" }));
		})
		.await;
	let flow = build_flow(&server, "wrong-secret");

	// Deliberately wrong secret: always a token error, never a transport error.
	for _ in 0..2 {
		let err = flow
			.execute::<_, HelloReply>("/greeter/say-hello", &HelloRequest {
				name: "World".into(),
			})
			.await
			.expect_err("Flow with a wrong secret must fail at the token stage.");

		assert!(matches!(err, Error::Token(TokenError::Rejected { .. })));
	}

	token.assert_calls_async(2).await;
	rpc.assert_calls_async(0).await;
}

#[tokio::test]
async fn unexpected_rpc_status_is_a_protocol_error() {
	let server = MockServer::start_async().await;
	let _discovery = mock_discovery(&server).await;
	let _token = mock_token(&server, "unlucky-token").await;
	let _rpc = server
		.mock_async(|when, then| {
			when.method(POST).path("/greeter/say-hello");
			then.status(500).body("greeter backend unavailable");
		})
		.await;
	let err = build_flow(&server, "secret")
		.execute::<_, HelloReply>("/greeter/say-hello", &HelloRequest { name: "World".into() })
		.await
		.expect_err("Non-auth non-success RPC status must fail the invoke stage.");

	match err {
		Error::Protocol(ProtocolError::UnexpectedStatus { stage, status, body }) => {
			assert_eq!(stage, "rpc");
			assert_eq!(status, 500);
			assert_eq!(body, "greeter backend unavailable");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[tokio::test]
async fn rpc_rejection_surfaces_as_an_authorization_error() {
	let server = MockServer::start_async().await;
	let _discovery = mock_discovery(&server).await;
	let _token = mock_token(&server, "expired-token").await;
	let _rpc = server
		.mock_async(|when, then| {
			when.method(POST).path("/greeter/say-hello");
			then.status(401).header("www-authenticate", "Bearer error=\"invalid_token\"");
		})
		.await;
	let err = build_flow(&server, "secret")
		.execute::<_, HelloReply>("/greeter/say-hello", &HelloRequest { name: "World".into() })
		.await
		.expect_err("Rejected bearer token must fail the invoke stage.");

	match err {
		Error::Authorization(AuthorizationError::Rejected { status, reason }) => {
			assert_eq!(status, 401);
			assert_eq!(reason, "Bearer error=\"invalid_token\"");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}
