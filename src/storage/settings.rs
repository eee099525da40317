use database::{IndexType, Record};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SettingRecord {
	/// Always equal to `key`.
	pub id: String,
	pub key: String,
	pub value: Value,
	pub timestamp: i64,
}

impl Record for SettingRecord {
	fn store_id() -> &'static str {
		super::SETTINGS_STORE
	}

	fn key(&self) -> Option<String> {
		Some(self.id.clone())
	}
}

impl SettingRecord {
	pub fn new(key: impl Into<String>, value: Value, timestamp: i64) -> Self {
		let key = key.into();
		Self {
			id: key.clone(),
			key,
			value,
			timestamp,
		}
	}
}

/// Unique lookup of a setting by its key.
pub struct SettingKey(pub String);

impl IndexType for SettingKey {
	fn name() -> &'static str {
		"key"
	}

	fn keys() -> &'static [&'static str] {
		&["key"]
	}

	fn values(&self) -> Vec<String> {
		vec![self.0.clone()]
	}
}
