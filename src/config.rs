use crate::theme::ThemeId;
use std::time::Duration;

pub static DATABASE_NAME: &str = "PunkStackDB";

/// Every tunable of the client core, with the values the application ships with.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
	pub database_name: String,
	pub queue: QueueConfig,
	pub network: NetworkConfig,
	pub theme: ThemeConfig,
	/// Base url that theme and setting changes are posted to. Without one they are only logged.
	pub sync_endpoint: Option<String>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			database_name: DATABASE_NAME.to_owned(),
			queue: QueueConfig::default(),
			network: NetworkConfig::default(),
			theme: ThemeConfig::default(),
			sync_endpoint: None,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueueConfig {
	/// Failed attempts after which an action is parked as failed.
	pub max_retries: u32,
	/// Backoff unit; the n-th retry waits `base_delay * 2^n`.
	pub base_delay: Duration,
}

impl Default for QueueConfig {
	fn default() -> Self {
		Self {
			max_retries: 3,
			base_delay: Duration::from_millis(1000),
		}
	}
}

impl QueueConfig {
	pub fn backoff(&self, retries: u32) -> Duration {
		self.base_delay.saturating_mul(2u32.saturating_pow(retries))
	}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkConfig {
	/// How long `just_reconnected` stays set after coming back online.
	pub reconnect_window: Duration,
}

impl Default for NetworkConfig {
	fn default() -> Self {
		Self {
			reconnect_window: Duration::from_millis(3000),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThemeConfig {
	pub default_theme: ThemeId,
	/// Key of the shared value that carries the theme to other tabs.
	pub storage_key: String,
	/// Attribute on the document root that stylesheets select on.
	pub attribute: String,
}

impl Default for ThemeConfig {
	fn default() -> Self {
		Self {
			default_theme: ThemeId::default(),
			storage_key: crate::theme::STORAGE_KEY.to_owned(),
			attribute: crate::theme::ROOT_ATTRIBUTE.to_owned(),
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn backoff_doubles() {
		let config = QueueConfig::default();
		assert_eq!(config.backoff(0), Duration::from_millis(1000));
		assert_eq!(config.backoff(1), Duration::from_millis(2000));
		assert_eq!(config.backoff(2), Duration::from_millis(4000));
	}

	#[test]
	fn defaults() {
		let config = Config::default();
		assert_eq!(config.database_name, "PunkStackDB");
		assert_eq!(config.queue.max_retries, 3);
		assert_eq!(config.network.reconnect_window, Duration::from_secs(3));
		assert_eq!(config.theme.default_theme, ThemeId::NeonNoir);
		assert_eq!(config.theme.storage_key, "punk-stack-theme");
		assert_eq!(config.theme.attribute, "data-theme");
	}
}
