//! Service wiring and the root component.
use crate::{
	channel::Channel,
	components::{FailedActions, OfflineIndicator},
	config::Config,
	network::NetworkMonitor,
	queue::{Handlers, OfflineQueue, Transport},
	scheduler::Scheduler,
	storage::{self, ActionType, Database},
	theme::{self, RenderRoot, ThemeManager},
};
use serde_json::{json, Value};
use std::rc::Rc;
use yew::prelude::*;

/// Every long-lived part of the client, constructed once at startup.
pub struct Services {
	pub config: Config,
	pub scheduler: Rc<dyn Scheduler>,
	pub database: Database,
	pub queue: OfflineQueue,
	pub network: NetworkMonitor,
	pub theme: ThemeManager,
}

impl Services {
	/// Connects the parts: theme changes feed the queue and reconnects drain it.
	pub async fn assemble<S>(
		config: Config,
		scheduler: Rc<S>,
		database: Database,
		channel: Rc<dyn Channel>,
		root: Rc<dyn RenderRoot>,
		transport: Rc<dyn Transport>,
	) -> Self
	where
		S: Scheduler + 'static,
	{
		let handlers = Handlers::standard(transport, config.sync_endpoint.clone());
		let queue = OfflineQueue::new(config.queue, database.clone(), scheduler.clone(), handlers);
		if let Err(err) = queue.recover_interrupted().await {
			log::warn!(target: "queue", "Failed to recover interrupted actions: {err}");
		}
		let network = NetworkMonitor::new(config.network, scheduler.clone());
		queue.watch_connectivity(&network);
		let theme = ThemeManager::new(config.theme.clone(), database.clone(), channel, root);
		theme.attach_queue(queue.clone());
		log::info!(
			target: "storage",
			"Using {} storage{}",
			database.backend_name(),
			if database.is_persistent() { "" } else { " (not persistent)" }
		);
		Self {
			config,
			scheduler,
			database,
			queue,
			network,
			theme,
		}
	}

	#[cfg(target_family = "wasm")]
	pub async fn start_in_browser(config: Config) -> Self {
		use crate::{
			channel::StorageChannel, queue::HttpTransport, scheduler::BrowserScheduler, theme::DocumentRoot,
		};
		let scheduler = Rc::new(BrowserScheduler);
		let database = Database::open(&config.database_name, scheduler.clone()).await;
		let services = Self::assemble(
			config,
			scheduler,
			database,
			Rc::new(StorageChannel),
			Rc::new(DocumentRoot),
			Rc::new(HttpTransport::new()),
		)
		.await;
		services.network.bind_to_window();
		services
	}

	/// Stores a setting and queues it for syncing.
	pub async fn save_setting(&self, key: &str, value: Value) -> Result<(), storage::Error> {
		self.database.save_setting(key, value.clone()).await?;
		let mut payload = serde_json::Map::new();
		payload.insert("key".into(), json!(key));
		payload.insert("value".into(), value);
		self.queue.enqueue(ActionType::SettingUpdate, payload).await?;
		Ok(())
	}
}

#[derive(Properties)]
pub struct AppProps {
	pub services: Rc<Services>,
}

impl PartialEq for AppProps {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.services, &other.services)
	}
}

pub static REDUCED_MOTION_SETTING: &str = "reduced-motion";

#[function_component]
pub fn App(props: &AppProps) -> Html {
	let services = &props.services;
	let reduced_motion = use_state_eq(|| false);
	use_effect_with((), {
		let services = services.clone();
		let reduced_motion = reduced_motion.clone();
		move |_| {
			wasm_bindgen_futures::spawn_local(async move {
				match services.database.get_setting(REDUCED_MOTION_SETTING).await {
					Ok(value) => reduced_motion.set(value.and_then(|value| value.as_bool()).unwrap_or(false)),
					Err(err) => log::warn!(target: "storage", "Failed to read settings: {err}"),
				}
			});
		}
	});
	let toggle_motion = Callback::from({
		let services = services.clone();
		let reduced_motion = reduced_motion.clone();
		move |_: MouseEvent| {
			let enabled = !*reduced_motion;
			reduced_motion.set(enabled);
			let services = services.clone();
			wasm_bindgen_futures::spawn_local(async move {
				if let Err(err) = services.save_setting(REDUCED_MOTION_SETTING, json!(enabled)).await {
					log::warn!(target: "storage", "Failed to save setting: {err}");
				}
			});
		}
	});

	html! {
		<ContextProvider<NetworkMonitor> context={services.network.clone()}>
		<ContextProvider<OfflineQueue> context={services.queue.clone()}>
		<theme::Provider manager={services.theme.clone()}>
			<header>
				<nav class="navbar navbar-expand-lg sticky-top bg-body-tertiary">
					<div class="container-fluid">
						<a class="navbar-brand" href="/">{"Punk Stack"}</a>
						<ul class="navbar-nav flex-row flex-wrap ms-md-auto">
							<li class="nav-item">
								<a class="nav-link" role="button" onclick={toggle_motion}>
									<i class={classes!("bi", if *reduced_motion { "bi-pause-circle" } else { "bi-play-circle" })} />
								</a>
							</li>
							<theme::Dropdown />
						</ul>
					</div>
				</nav>
			</header>
			<main class={classes!("container", "py-4", (*reduced_motion).then_some("reduced-motion"))}>
				<section class="text-center mb-4">
					<h1>{"Punk Stack Design System"}</h1>
					<p class="lead">{"12 distinct themes across 6 punk aesthetics."}</p>
				</section>
				<FailedActions />
			</main>
			<OfflineIndicator />
		</theme::Provider>
		</ContextProvider<OfflineQueue>>
		</ContextProvider<NetworkMonitor>>
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::{
		channel::LocalBus,
		queue::{HandlerError, HttpRequest},
		scheduler::ManualScheduler,
		storage::ActionStatus,
		theme::{MemoryRoot, ThemeId},
	};
	use futures::executor::block_on;
	use futures_util::future::LocalBoxFuture;
	use std::{cell::Cell, time::Duration};

	struct Counting(Rc<Cell<usize>>);

	impl Transport for Counting {
		fn send(&self, _: HttpRequest) -> LocalBoxFuture<'_, Result<u16, HandlerError>> {
			self.0.set(self.0.get() + 1);
			Box::pin(async { Ok(200) })
		}
	}

	fn services(sent: Rc<Cell<usize>>) -> (Rc<ManualScheduler>, Services) {
		let scheduler = Rc::new(ManualScheduler::new(1));
		let config = Config {
			sync_endpoint: Some("https://sync.test".into()),
			..Default::default()
		};
		let database = Database::in_memory(scheduler.clone());
		let services = block_on(Services::assemble(
			config,
			scheduler.clone(),
			database,
			Rc::new(LocalBus::default().endpoint()),
			Rc::new(MemoryRoot::default()),
			Rc::new(Counting(sent)),
		));
		(scheduler, services)
	}

	#[test]
	fn offline_changes_sync_on_reconnect() -> anyhow::Result<()> {
		let sent = Rc::new(Cell::new(0));
		let (scheduler, services) = services(sent.clone());
		services.network.set_online(false);

		block_on(services.theme.set_theme("art-deco"))?;
		block_on(services.save_setting("volume", json!(4)))?;
		assert_eq!(block_on(services.queue.pending_actions())?.len(), 2);
		assert_eq!(sent.get(), 0);

		services.network.set_online(true);
		scheduler.run_until_idle();
		assert_eq!(sent.get(), 2);
		assert!(block_on(services.queue.pending_actions())?.is_empty());
		assert_eq!(block_on(services.database.get_setting("volume"))?, Some(json!(4)));
		assert_eq!(services.theme.current(), ThemeId::ArtDeco);

		scheduler.advance(Duration::from_secs(3));
		assert!(!services.network.status().just_reconnected);
		Ok(())
	}

	#[test]
	fn interrupted_actions_resume_on_start() -> anyhow::Result<()> {
		let scheduler = Rc::new(ManualScheduler::new(1));
		let database = Database::in_memory(scheduler.clone());
		let mut action = crate::storage::QueuedAction::new(
			ActionType::Custom,
			Default::default(),
			0,
			&mut rand::thread_rng(),
		);
		action.status = ActionStatus::Processing;
		block_on(database.add_action(&action))?;

		let services = block_on(Services::assemble(
			Config::default(),
			scheduler,
			database,
			Rc::new(LocalBus::default().endpoint()),
			Rc::new(MemoryRoot::default()),
			Rc::new(Counting(Default::default())),
		));
		let pending = block_on(services.queue.pending_actions())?;
		assert_eq!(pending.len(), 1);
		assert_eq!(pending[0].id, action.id);
		Ok(())
	}
}
