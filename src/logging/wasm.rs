pub use super::Config;
use log::{Level, Log, Metadata, Record};
use wasm_bindgen::JsValue;
use web_sys::console;

struct ConsoleLogger(Config);

impl Log for ConsoleLogger {
	fn enabled(&self, metadata: &Metadata) -> bool {
		metadata.level() <= self.0.level && !self.0.is_ignored(metadata.target())
	}

	fn log(&self, record: &Record) {
		if !self.enabled(record.metadata()) {
			return;
		}
		let source = self.0.source(record.target(), record.module_path());
		let line = JsValue::from_str(&format!("[{}] {source}: {}", record.level(), record.args()));
		match record.level() {
			Level::Error => console::error_1(&line),
			Level::Warn => console::warn_1(&line),
			Level::Info => console::info_1(&line),
			Level::Debug => console::debug_1(&line),
			Level::Trace => console::log_1(&line),
		}
	}

	fn flush(&self) {}
}

/// Installs the devtools console logger. Only the first call has an effect.
pub fn init(config: Config) {
	let level = config.level;
	if log::set_boxed_logger(Box::new(ConsoleLogger(config))).is_ok() {
		log::set_max_level(level);
	}
}
