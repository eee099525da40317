use super::HandlerError;
use futures_util::future::LocalBoxFuture;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
	pub method: String,
	pub url: String,
	/// Sent as a JSON document when present.
	pub body: Option<Value>,
}

impl HttpRequest {
	pub fn post(url: impl Into<String>, body: Value) -> Self {
		Self {
			method: "POST".into(),
			url: url.into(),
			body: Some(body),
		}
	}
}

/// Sends requests on behalf of action handlers, resolving to the response status code.
pub trait Transport {
	fn send(&self, request: HttpRequest) -> LocalBoxFuture<'_, Result<u16, HandlerError>>;
}

/// [`Transport`] over `reqwest`, which uses `fetch` in the browser.
#[derive(Clone, Default)]
pub struct HttpTransport(reqwest::Client);

impl HttpTransport {
	pub fn new() -> Self {
		Self::default()
	}
}

impl Transport for HttpTransport {
	fn send(&self, request: HttpRequest) -> LocalBoxFuture<'_, Result<u16, HandlerError>> {
		Box::pin(async move {
			let method = reqwest::Method::from_bytes(request.method.to_uppercase().as_bytes())
				.map_err(|_| HandlerError::Payload(format!("{:?} is not an http method", request.method)))?;
			let mut builder = self
				.0
				.request(method, &request.url)
				.header(reqwest::header::CONTENT_TYPE, "application/json");
			if let Some(body) = &request.body {
				builder = builder.json(body);
			}
			let response = builder.send().await.map_err(|err| HandlerError::Transport(err.to_string()))?;
			Ok(response.status().as_u16())
		})
	}
}
