//! Logger installation. Everything in the crate logs through the `log` facade with an
//! explicit target (`storage`, `queue`, `theme`, `network`, `channel`).
//!
//! In the browser, records go to the devtools console. Elsewhere (tests, the native demo)
//! they go to the terminal and a `{name}.log` file via `simplelog`.
pub use log::{Level, LevelFilter};

#[cfg(not(target_family = "wasm"))]
pub mod console;
#[cfg(target_family = "wasm")]
pub mod wasm;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
	pub level: LevelFilter,
	/// Prefix records with their target rather than the emitting module path.
	pub prefer_target: bool,
	/// Targets (by prefix) whose records are dropped.
	pub ignore: Vec<&'static str>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			level: if cfg!(debug_assertions) {
				LevelFilter::Debug
			} else {
				LevelFilter::Info
			},
			prefer_target: false,
			ignore: Vec::new(),
		}
	}
}

impl Config {
	pub fn prefer_target(mut self) -> Self {
		self.prefer_target = true;
		self
	}

	pub fn ignore(mut self, target: &'static str) -> Self {
		self.ignore.push(target);
		self
	}

	pub fn is_ignored(&self, target: &str) -> bool {
		self.ignore.iter().any(|prefix| target.starts_with(prefix))
	}

	/// The name a record is attributed to when written out.
	pub fn source<'a>(&self, target: &'a str, module_path: Option<&'a str>) -> &'a str {
		match (self.prefer_target, module_path) {
			(false, Some(module_path)) => module_path,
			_ => target,
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn source_follows_preference() {
		let config = Config::default();
		assert_eq!(config.source("queue", Some("punk_stack::queue")), "punk_stack::queue");
		assert_eq!(config.source("queue", None), "queue");
		let config = config.prefer_target();
		assert_eq!(config.source("queue", Some("punk_stack::queue")), "queue");
	}

	#[test]
	fn ignore_matches_prefixes() {
		let config = Config::default().ignore("reqwest").ignore("yew");
		assert!(config.is_ignored("reqwest::async_impl"));
		assert!(config.is_ignored("yew"));
		assert!(!config.is_ignored("queue"));
	}
}
