use crate::theme::{Mode, Style, ThemeId};
use database::Record;
use serde::{Deserialize, Serialize};

/// The persisted copy of the active theme. There is only ever one, keyed [`ThemeRecord::ID`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ThemeRecord {
	pub id: String,
	pub theme: ThemeId,
	pub mode: Mode,
	pub style: Style,
	pub timestamp: i64,
}

impl Record for ThemeRecord {
	fn store_id() -> &'static str {
		super::THEME_STORE
	}

	fn key(&self) -> Option<String> {
		Some(self.id.clone())
	}
}

impl ThemeRecord {
	pub const ID: &'static str = "current";

	pub fn new(theme: ThemeId, timestamp: i64) -> Self {
		Self {
			id: Self::ID.to_owned(),
			theme,
			mode: theme.mode(),
			style: theme.style(),
			timestamp,
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use serde_json::json;

	#[test]
	fn serializes_flat() -> anyhow::Result<()> {
		let record = ThemeRecord::new(ThemeId::RetroNight, 42);
		assert_eq!(
			serde_json::to_value(&record)?,
			json!({
				"id": "current",
				"theme": "retro-night",
				"mode": "dark",
				"style": "vaporwave",
				"timestamp": 42,
			})
		);
		Ok(())
	}
}
