use super::Config;
use anyhow::Result;

/// Logs to the terminal and to `{name}.log` in the working directory (truncated on start).
pub fn init(name: &str, config: &Config) -> Result<()> {
	use simplelog::*;
	let log_path = std::env::current_dir()?.join(format!("{name}.log"));
	let file = std::fs::OpenOptions::new()
		.create(true)
		.write(true)
		.truncate(true)
		.open(&log_path)?;

	let mut builder = ConfigBuilder::new();
	builder
		.set_time_format_custom(format_description!("[hour]:[minute]:[second].[subsecond digits:3]"))
		.set_level_padding(LevelPadding::Left)
		.set_thread_level(LevelFilter::Off)
		// The target names the subsystem (queue, theme, ...), so every line carries it.
		.set_target_level(if config.prefer_target {
			LevelFilter::Error
		} else {
			LevelFilter::Off
		})
		.set_location_level(LevelFilter::Off);
	for target in config.ignore.iter() {
		builder.add_filter_ignore_str(target);
	}
	let cfg = builder.build();

	CombinedLogger::init(vec![
		TermLogger::new(config.level, cfg.clone(), TerminalMode::Mixed, ColorChoice::Auto),
		WriteLogger::new(LevelFilter::Trace, cfg, file),
	])?;
	log::info!("Writing log to {}", log_path.display());
	Ok(())
}
