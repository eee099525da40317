use database::{IndexType, Record};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A deferred unit of work waiting in the offline queue.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct QueuedAction {
	pub id: String,
	#[serde(rename = "type")]
	pub kind: ActionType,
	#[serde(default)]
	pub payload: Map<String, Value>,
	pub timestamp: i64,
	#[serde(default)]
	pub retries: u32,
	pub status: ActionStatus,
	/// Earliest time (epoch ms) a rescheduled action may be attempted again.
	#[serde(rename = "nextAttemptAt", default, skip_serializing_if = "Option::is_none")]
	pub next_attempt_at: Option<i64>,
}

impl Record for QueuedAction {
	fn store_id() -> &'static str {
		super::QUEUE_STORE
	}

	fn key(&self) -> Option<String> {
		Some(self.id.clone())
	}
}

impl QueuedAction {
	pub fn new(kind: ActionType, payload: Map<String, Value>, timestamp: i64, rng: &mut impl Rng) -> Self {
		Self {
			id: generate_id(&kind, timestamp, rng),
			kind,
			payload,
			timestamp,
			retries: 0,
			status: ActionStatus::Pending,
			next_attempt_at: None,
		}
	}

	pub fn is_due(&self, now: i64) -> bool {
		self.next_attempt_at.map(|at| at <= now).unwrap_or(true)
	}
}

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `{type}-{timestamp}-{9 base-36 chars}`
pub fn generate_id(kind: &ActionType, timestamp: i64, rng: &mut impl Rng) -> String {
	let suffix = (0..9)
		.map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
		.collect::<String>();
	format!("{}-{timestamp}-{suffix}", kind.as_str())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionType {
	ThemeChange,
	SettingUpdate,
	Custom,
	/// A type this client has no handler for, kept verbatim.
	Other(String),
}

impl ActionType {
	pub fn as_str(&self) -> &str {
		match self {
			Self::ThemeChange => "theme-change",
			Self::SettingUpdate => "setting-update",
			Self::Custom => "custom",
			Self::Other(kind) => kind.as_str(),
		}
	}
}

impl From<String> for ActionType {
	fn from(value: String) -> Self {
		match value.as_str() {
			"theme-change" => Self::ThemeChange,
			"setting-update" => Self::SettingUpdate,
			"custom" => Self::Custom,
			_ => Self::Other(value),
		}
	}
}

impl From<&str> for ActionType {
	fn from(value: &str) -> Self {
		Self::from(value.to_owned())
	}
}

impl From<ActionType> for String {
	fn from(value: ActionType) -> Self {
		match value {
			ActionType::Other(kind) => kind,
			kind => kind.as_str().to_owned(),
		}
	}
}

impl std::fmt::Display for ActionType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
	Pending,
	Processing,
	Failed,
}

impl ActionStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Pending => "pending",
			Self::Processing => "processing",
			Self::Failed => "failed",
		}
	}
}

/// Lookup of queued actions by [`ActionStatus`].
pub struct StatusIndex(pub ActionStatus);

impl IndexType for StatusIndex {
	fn name() -> &'static str {
		"status"
	}

	fn keys() -> &'static [&'static str] {
		&["status"]
	}

	fn values(&self) -> Vec<String> {
		vec![self.0.as_str().to_owned()]
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use rand::{rngs::StdRng, SeedableRng};
	use serde_json::json;

	#[test]
	fn id_shape() {
		let mut rng = StdRng::seed_from_u64(7);
		let id = generate_id(&ActionType::SettingUpdate, 1700000000000, &mut rng);
		let suffix = id.strip_prefix("setting-update-1700000000000-").unwrap();
		assert_eq!(suffix.len(), 9);
		assert!(suffix.bytes().all(|c| BASE36.contains(&c)));
	}

	#[test]
	fn wire_shape() -> anyhow::Result<()> {
		let mut rng = StdRng::seed_from_u64(1);
		let mut action = QueuedAction::new(
			ActionType::ThemeChange,
			json!({ "theme": "art-deco" }).as_object().cloned().unwrap(),
			5,
			&mut rng,
		);
		action.id = "theme-change-5-abc".into();
		assert_eq!(
			serde_json::to_value(&action)?,
			json!({
				"id": "theme-change-5-abc",
				"type": "theme-change",
				"payload": { "theme": "art-deco" },
				"timestamp": 5,
				"retries": 0,
				"status": "pending",
			})
		);
		action.next_attempt_at = Some(2005);
		assert_eq!(serde_json::to_value(&action)?["nextAttemptAt"], json!(2005));
		Ok(())
	}

	#[test]
	fn unknown_types_survive() -> anyhow::Result<()> {
		let action: QueuedAction = serde_json::from_value(json!({
			"id": "sync-contacts-1-x",
			"type": "sync-contacts",
			"payload": {},
			"timestamp": 1,
			"retries": 2,
			"status": "failed",
		}))?;
		assert_eq!(action.kind, ActionType::Other("sync-contacts".into()));
		assert_eq!(action.status, ActionStatus::Failed);
		assert_eq!(serde_json::to_value(&action)?["type"], json!("sync-contacts"));
		Ok(())
	}

	#[test]
	fn due_only_after_next_attempt() {
		let mut rng = StdRng::seed_from_u64(3);
		let mut action = QueuedAction::new(ActionType::Custom, Map::new(), 0, &mut rng);
		assert!(action.is_due(0));
		action.next_attempt_at = Some(1000);
		assert!(!action.is_due(999));
		assert!(action.is_due(1000));
	}
}
