use crate::storage::{self, ActionType};

/// Why a handler could not complete an action. Always retryable.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum HandlerError {
	#[error("{method} {url} responded with status {status}")]
	Unsuccessful { method: String, url: String, status: u16 },
	#[error("Request failed: {0}")]
	Transport(String),
	#[error("Invalid payload: {0}")]
	Payload(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ActionError {
	#[error(transparent)]
	Handler(#[from] HandlerError),
	#[error("No handler is registered for action type {0:?}.")]
	UnknownActionType(ActionType),
	#[error("Action {id} failed {retries} times and will not be retried automatically.")]
	MaxRetriesExceeded { id: String, retries: u32 },
	#[error(transparent)]
	Storage(#[from] storage::Error),
}
