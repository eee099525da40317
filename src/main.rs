#[cfg(target_family = "wasm")]
fn main() {
	use punk_stack::{
		app::{App, AppProps, Services},
		config::Config,
		logging,
	};
	use std::rc::Rc;

	logging::wasm::init(logging::Config::default().prefer_target());
	wasm_bindgen_futures::spawn_local(async {
		let services = Services::start_in_browser(Config::default()).await;
		yew::Renderer::<App>::with_props(AppProps {
			services: Rc::new(services),
		})
		.render();
	});
}

/// Runs the client core against in-memory backings and a virtual clock, narrating a
/// session that goes offline, changes theme and settings, and comes back online.
#[cfg(not(target_family = "wasm"))]
fn main() -> anyhow::Result<()> {
	use futures::executor::block_on;
	use futures_util::future::LocalBoxFuture;
	use punk_stack::{
		app::Services,
		channel::{Channel, LocalBus},
		config::Config,
		logging,
		queue::{HandlerError, HttpRequest, Transport},
		scheduler::{Clock, ManualScheduler, SystemClock},
		storage::{ActionType, Database},
		theme::MemoryRoot,
	};
	use serde_json::json;
	use std::{rc::Rc, time::Duration};

	/// Accepts every request except those to `/unreachable`.
	struct Loopback;

	impl Transport for Loopback {
		fn send(&self, request: HttpRequest) -> LocalBoxFuture<'_, Result<u16, HandlerError>> {
			log::info!(target: "demo", "{} {}", request.method, request.url);
			let status = if request.url.ends_with("/unreachable") { 503 } else { 200 };
			Box::pin(async move { Ok(status) })
		}
	}

	logging::console::init("punk-stack", &logging::Config::default().prefer_target())?;

	let scheduler = Rc::new(ManualScheduler::new(SystemClock.now()));
	let bus = LocalBus::default();
	let config = Config {
		sync_endpoint: Some("https://sync.punk-stack.test".into()),
		..Default::default()
	};
	let services = block_on(Services::assemble(
		config,
		scheduler.clone(),
		Database::in_memory(scheduler.clone()),
		Rc::new(bus.endpoint()),
		Rc::new(MemoryRoot::default()),
		Rc::new(Loopback),
	));
	services.theme.mount();

	let other_tab = bus.endpoint();
	services.network.set_online(false);
	block_on(services.theme.set_theme("solar-bloom"))?;
	block_on(services.save_setting("reduced-motion", json!(true)))?;
	let mut request = serde_json::Map::new();
	request.insert("endpoint".into(), json!("https://api.punk-stack.test/unreachable"));
	request.insert("method".into(), json!("POST"));
	block_on(services.queue.enqueue(ActionType::Custom, request))?;
	log::info!(
		target: "demo",
		"Other tab sees theme {:?}",
		other_tab.read(&services.config.theme.storage_key)
	);

	services.network.set_online(true);
	scheduler.run_until_idle();
	scheduler.advance(Duration::from_secs(30));

	for action in block_on(services.queue.failed_actions())? {
		log::warn!(target: "demo", "{} gave up after {} attempts", action.id, action.retries);
	}
	let cleared = block_on(services.queue.clear_failed())?;
	log::info!(target: "demo", "Discarded {cleared} failed actions");
	Ok(())
}
