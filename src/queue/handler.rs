use super::{HandlerError, HttpRequest, Transport};
use crate::storage::{ActionType, QueuedAction};
use futures_util::future::LocalBoxFuture;
use serde_json::Value;
use std::{collections::HashMap, rc::Rc};

/// Performs the side effect a queued action stands for.
pub trait ActionHandler {
	fn handle<'a>(&'a self, action: &'a QueuedAction) -> LocalBoxFuture<'a, Result<(), HandlerError>>;
}

/// The handler for each action type the queue can process.
#[derive(Clone, Default)]
pub struct Handlers(HashMap<ActionType, Rc<dyn ActionHandler>>);

impl Handlers {
	/// Handlers for theme changes, setting updates and custom requests.
	pub fn standard(transport: Rc<dyn Transport>, sync_endpoint: Option<String>) -> Self {
		Self::default()
			.with(
				ActionType::ThemeChange,
				RemoteSync::new("theme", sync_endpoint.clone(), transport.clone()),
			)
			.with(
				ActionType::SettingUpdate,
				RemoteSync::new("settings", sync_endpoint, transport.clone()),
			)
			.with(ActionType::Custom, CustomRequest::new(transport))
	}

	pub fn with(mut self, kind: ActionType, handler: impl ActionHandler + 'static) -> Self {
		self.insert(kind, Rc::new(handler));
		self
	}

	pub fn insert(&mut self, kind: ActionType, handler: Rc<dyn ActionHandler>) {
		self.0.insert(kind, handler);
	}

	pub fn get(&self, kind: &ActionType) -> Option<Rc<dyn ActionHandler>> {
		self.0.get(kind).cloned()
	}
}

/// Pushes theme and setting changes to `{endpoint}/{path}`.
/// Without an endpoint the change is only logged, and counts as synced.
pub struct RemoteSync {
	path: &'static str,
	endpoint: Option<String>,
	transport: Rc<dyn Transport>,
}

impl RemoteSync {
	pub fn new(path: &'static str, endpoint: Option<String>, transport: Rc<dyn Transport>) -> Self {
		Self {
			path,
			endpoint,
			transport,
		}
	}
}

impl ActionHandler for RemoteSync {
	fn handle<'a>(&'a self, action: &'a QueuedAction) -> LocalBoxFuture<'a, Result<(), HandlerError>> {
		Box::pin(async move {
			let Some(endpoint) = &self.endpoint else {
				log::info!(target: "queue", "Syncing {}: {}", action.kind, Value::Object(action.payload.clone()));
				return Ok(());
			};
			let url = format!("{}/{}", endpoint.trim_end_matches('/'), self.path);
			let request = HttpRequest::post(url, Value::Object(action.payload.clone()));
			send_expecting_success(&*self.transport, request).await
		})
	}
}

/// Replays a request described by the payload: `endpoint`, `method` and optional `data`.
/// A payload that does not name both an endpoint and a method has nothing to send.
pub struct CustomRequest {
	transport: Rc<dyn Transport>,
}

impl CustomRequest {
	pub fn new(transport: Rc<dyn Transport>) -> Self {
		Self { transport }
	}
}

impl ActionHandler for CustomRequest {
	fn handle<'a>(&'a self, action: &'a QueuedAction) -> LocalBoxFuture<'a, Result<(), HandlerError>> {
		Box::pin(async move {
			let field = |name: &str| match action.payload.get(name) {
				Some(Value::String(value)) if !value.is_empty() => Some(value.clone()),
				_ => None,
			};
			let (Some(url), Some(method)) = (field("endpoint"), field("method")) else {
				log::debug!(target: "queue", "Custom action {} has no request to send", action.id);
				return Ok(());
			};
			let request = HttpRequest {
				method,
				url,
				body: action.payload.get("data").cloned(),
			};
			send_expecting_success(&*self.transport, request).await
		})
	}
}

async fn send_expecting_success(transport: &dyn Transport, request: HttpRequest) -> Result<(), HandlerError> {
	let method = request.method.clone();
	let url = request.url.clone();
	let status = transport.send(request).await?;
	if !(200..300).contains(&status) {
		return Err(HandlerError::Unsuccessful { method, url, status });
	}
	Ok(())
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::storage::ActionStatus;
	use futures::executor::block_on;
	use serde_json::{json, Map};
	use std::cell::RefCell;

	#[derive(Default)]
	struct Recorder {
		status: u16,
		sent: RefCell<Vec<HttpRequest>>,
	}

	impl Transport for Recorder {
		fn send(&self, request: HttpRequest) -> LocalBoxFuture<'_, Result<u16, HandlerError>> {
			self.sent.borrow_mut().push(request);
			let status = self.status;
			Box::pin(async move { Ok(status) })
		}
	}

	fn action(kind: ActionType, payload: Value) -> QueuedAction {
		QueuedAction {
			id: "a".into(),
			kind,
			payload: match payload {
				Value::Object(map) => map,
				_ => Map::new(),
			},
			timestamp: 0,
			retries: 0,
			status: ActionStatus::Processing,
			next_attempt_at: None,
		}
	}

	#[test]
	fn custom_request_uses_payload() {
		let transport = Rc::new(Recorder {
			status: 201,
			..Default::default()
		});
		let handler = CustomRequest::new(transport.clone());
		let action = action(
			ActionType::Custom,
			json!({ "endpoint": "https://api.test/items", "method": "put", "data": { "n": 1 } }),
		);
		assert_eq!(block_on(handler.handle(&action)), Ok(()));
		assert_eq!(
			*transport.sent.borrow(),
			vec![HttpRequest {
				method: "put".into(),
				url: "https://api.test/items".into(),
				body: Some(json!({ "n": 1 })),
			}]
		);
	}

	#[test]
	fn custom_request_without_target_is_trivial() {
		let transport = Rc::new(Recorder::default());
		let handler = CustomRequest::new(transport.clone());
		let action = action(ActionType::Custom, json!({ "endpoint": "https://api.test/items" }));
		assert_eq!(block_on(handler.handle(&action)), Ok(()));
		assert!(transport.sent.borrow().is_empty());
	}

	#[test]
	fn non_2xx_is_a_failure() {
		let transport = Rc::new(Recorder {
			status: 503,
			..Default::default()
		});
		let handler = CustomRequest::new(transport);
		let action = action(ActionType::Custom, json!({ "endpoint": "/x", "method": "POST" }));
		assert_eq!(
			block_on(handler.handle(&action)),
			Err(HandlerError::Unsuccessful {
				method: "POST".into(),
				url: "/x".into(),
				status: 503,
			})
		);
	}

	#[test]
	fn remote_sync_posts_to_path() {
		let transport = Rc::new(Recorder {
			status: 200,
			..Default::default()
		});
		let handlers = Handlers::standard(transport.clone(), Some("https://sync.test/".into()));
		let action = action(ActionType::ThemeChange, json!({ "theme": "art-deco" }));
		let Some(handler) = handlers.get(&ActionType::ThemeChange) else {
			panic!("missing theme handler");
		};
		assert_eq!(block_on(handler.handle(&action)), Ok(()));
		assert_eq!(
			*transport.sent.borrow(),
			vec![HttpRequest::post("https://sync.test/theme", json!({ "theme": "art-deco" }))]
		);
		assert!(handlers.get(&ActionType::Other("nope".into())).is_none());
	}

	#[test]
	fn remote_sync_without_endpoint_only_logs() {
		let transport = Rc::new(Recorder::default());
		let handler = RemoteSync::new("settings", None, transport.clone());
		let action = action(ActionType::SettingUpdate, json!({ "key": "volume", "value": 3 }));
		assert_eq!(block_on(handler.handle(&action)), Ok(()));
		assert!(transport.sent.borrow().is_empty());
	}
}
