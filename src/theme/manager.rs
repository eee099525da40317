use super::{InvalidThemeIdentifier, RenderRoot, ThemeId};
use crate::{
	channel::Channel,
	config::ThemeConfig,
	queue::OfflineQueue,
	storage::{ActionType, Database},
	utility::{Listeners, Subscription},
};
use serde_json::{json, Value};
use std::{
	cell::{Cell, RefCell},
	rc::{Rc, Weak},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeState {
	/// Nothing has been read from storage or applied to the document yet.
	Uninitialized,
	Mounted(ThemeId),
}

/// Owns the active theme: reads it back on mount, applies it to the render root, persists it,
/// and keeps other tabs in step through the shared channel.
#[derive(Clone)]
pub struct ThemeManager(Rc<ManagerState>);

struct ManagerState {
	config: ThemeConfig,
	database: Database,
	channel: Rc<dyn Channel>,
	root: Rc<dyn RenderRoot>,
	queue: RefCell<Option<OfflineQueue>>,
	state: Cell<ThemeState>,
	previewing: Cell<bool>,
	watchers: Listeners<ThemeId>,
	remote: RefCell<Option<Subscription>>,
}

impl PartialEq for ThemeManager {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl ThemeManager {
	pub fn new(config: ThemeConfig, database: Database, channel: Rc<dyn Channel>, root: Rc<dyn RenderRoot>) -> Self {
		Self(Rc::new(ManagerState {
			config,
			database,
			channel,
			root,
			queue: RefCell::new(None),
			state: Cell::new(ThemeState::Uninitialized),
			previewing: Cell::new(false),
			watchers: Listeners::default(),
			remote: RefCell::new(None),
		}))
	}

	/// Theme changes made from now on are also queued for syncing.
	pub fn attach_queue(&self, queue: OfflineQueue) {
		*self.0.queue.borrow_mut() = Some(queue);
	}

	pub fn state(&self) -> ThemeState {
		self.0.state.get()
	}

	/// The active theme, or the configured default before mounting.
	pub fn current(&self) -> ThemeId {
		match self.state() {
			ThemeState::Uninitialized => self.0.config.default_theme,
			ThemeState::Mounted(theme) => theme,
		}
	}

	/// Notified with the new theme whenever it changes, locally or from another tab.
	pub fn watch(&self, callback: impl Fn(&ThemeId) + 'static) -> Subscription {
		self.0.watchers.add(callback)
	}

	/// Adopts the stored theme (or the default), applies it, and starts following other tabs.
	/// Mounting again is a no-op.
	pub fn mount(&self) -> ThemeId {
		if let ThemeState::Mounted(theme) = self.state() {
			return theme;
		}
		let key = &self.0.config.storage_key;
		let theme = match self.0.channel.read(key) {
			None => self.0.config.default_theme,
			Some(stored) => match ThemeId::from_stored(&stored) {
				Ok(theme) => theme,
				Err(err) => {
					log::warn!(target: "theme", "Ignoring stored theme: {err}");
					self.0.config.default_theme
				}
			},
		};
		self.0.state.set(ThemeState::Mounted(theme));
		self.apply_to_root(theme);

		let weak = Rc::downgrade(&self.0);
		let subscription = self.0.channel.subscribe(key, Box::new(move |value| Self::on_remote_change(&weak, value)));
		*self.0.remote.borrow_mut() = Some(subscription);
		log::debug!(target: "theme", "Mounted with theme {theme}");
		theme
	}

	fn on_remote_change(weak: &Weak<ManagerState>, value: &str) {
		let Some(state) = weak.upgrade() else {
			return;
		};
		let manager = ThemeManager(state);
		let theme = match ThemeId::from_stored(value) {
			Ok(theme) => theme,
			Err(err) => {
				log::warn!(target: "theme", "Ignoring theme from another tab: {err}");
				return;
			}
		};
		if manager.state() == ThemeState::Mounted(theme) {
			return;
		}
		log::debug!(target: "theme", "Another tab switched to {theme}");
		manager.0.state.set(ThemeState::Mounted(theme));
		manager.apply_to_root(theme);
		manager.0.watchers.emit(&theme);
	}

	/// Switches to the theme named `name`. An unknown name leaves everything untouched.
	pub async fn set_theme(&self, name: &str) -> Result<ThemeId, InvalidThemeIdentifier> {
		let theme = match name.parse::<ThemeId>() {
			Ok(theme) => theme,
			Err(err) => {
				log::warn!(target: "theme", "{err}");
				return Err(err);
			}
		};
		self.select(theme).await;
		Ok(theme)
	}

	/// Makes `theme` active: in memory, on the render root, in other tabs, in the store,
	/// and (with a queue attached) as a pending sync.
	pub async fn select(&self, theme: ThemeId) {
		self.mount();
		let started = self.0.database.now();
		self.0.previewing.set(false);
		self.0.state.set(ThemeState::Mounted(theme));
		self.apply_to_root(theme);
		self.0.channel.publish(&self.0.config.storage_key, theme.as_str());
		self.0.watchers.emit(&theme);
		log::debug!(target: "theme", "Switched to {theme} in {}ms", self.0.database.now() - started);

		if let Err(err) = self.0.database.save_theme(theme).await {
			log::warn!(target: "theme", "Failed to persist theme {theme}: {err}");
		}

		let queue = self.0.queue.borrow().clone();
		if let Some(queue) = queue {
			if let Err(err) = queue.enqueue(ActionType::ThemeChange, theme_payload(theme)).await {
				log::warn!(target: "theme", "Failed to queue sync of theme {theme}: {err}");
			}
		}
	}

	/// Shows `theme` on the render root without selecting it, until [`ThemeManager::end_preview`].
	pub fn preview(&self, theme: ThemeId) {
		self.0.previewing.set(true);
		self.apply_to_root(theme);
	}

	/// Restores the selected theme on the render root after a preview.
	pub fn end_preview(&self) {
		if self.0.previewing.replace(false) {
			self.apply_to_root(self.current());
		}
	}

	fn apply_to_root(&self, theme: ThemeId) {
		self.0.root.set_attribute(&self.0.config.attribute, theme.as_str());
	}
}

fn theme_payload(theme: ThemeId) -> serde_json::Map<String, Value> {
	let mut payload = serde_json::Map::new();
	payload.insert("theme".into(), json!(theme.as_str()));
	payload.insert("mode".into(), json!(theme.mode().as_str()));
	payload.insert("style".into(), json!(theme.style().as_str()));
	payload
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::{
		channel::{LocalBus, LocalChannel},
		config::QueueConfig,
		queue::Handlers,
		scheduler::ManualScheduler,
		storage::ActionStatus,
		theme::MemoryRoot,
	};
	use futures::executor::block_on;

	/// One simulated tab: its own manager and document, sharing the bus and database.
	struct Tab {
		root: MemoryRoot,
		manager: ThemeManager,
	}

	fn tab(bus: &LocalBus, database: &Database) -> Tab {
		let root = MemoryRoot::default();
		let channel: Rc<LocalChannel> = Rc::new(bus.endpoint());
		let manager = ThemeManager::new(ThemeConfig::default(), database.clone(), channel, Rc::new(root.clone()));
		Tab { root, manager }
	}

	fn database() -> Database {
		Database::in_memory(Rc::new(ManualScheduler::new(5)))
	}

	#[test]
	fn mounts_default_when_nothing_stored() {
		let bus = LocalBus::default();
		let tab = tab(&bus, &database());
		assert_eq!(tab.manager.state(), ThemeState::Uninitialized);
		assert_eq!(tab.manager.mount(), ThemeId::NeonNoir);
		assert_eq!(tab.manager.state(), ThemeState::Mounted(ThemeId::NeonNoir));
		assert_eq!(tab.root.attribute("data-theme").as_deref(), Some("neon-noir"));
	}

	#[test]
	fn every_theme_survives_a_reload() -> anyhow::Result<()> {
		let bus = LocalBus::default();
		let database = database();
		for theme in ThemeId::all() {
			let first = tab(&bus, &database);
			first.manager.mount();
			block_on(first.manager.set_theme(theme.as_str()))?;
			drop(first);

			let reloaded = tab(&bus, &database);
			assert_eq!(reloaded.manager.mount(), theme);
			assert_eq!(block_on(database.get_theme())?.map(|record| record.theme), Some(theme));
		}
		Ok(())
	}

	#[test]
	fn invalid_names_change_nothing() -> anyhow::Result<()> {
		let bus = LocalBus::default();
		let database = database();
		let tab = tab(&bus, &database);
		block_on(tab.manager.set_theme("art-deco"))?;
		let published = bus.published();

		let result = block_on(tab.manager.set_theme("ultraviolet"));

		assert_eq!(result, Err(InvalidThemeIdentifier("ultraviolet".into())));
		assert_eq!(tab.manager.current(), ThemeId::ArtDeco);
		assert_eq!(tab.root.attribute("data-theme").as_deref(), Some("art-deco"));
		assert_eq!(block_on(database.get_theme())?.map(|record| record.theme), Some(ThemeId::ArtDeco));
		assert_eq!(bus.published(), published);
		Ok(())
	}

	#[test]
	fn selection_reaches_root_storage_and_other_tabs() -> anyhow::Result<()> {
		let bus = LocalBus::default();
		let database = database();
		let this = tab(&bus, &database);
		let other = tab(&bus, &database);
		let observer = bus.endpoint();
		this.manager.mount();
		other.manager.mount();

		block_on(this.manager.set_theme("solar-bloom"))?;

		assert_eq!(this.root.attribute("data-theme").as_deref(), Some("solar-bloom"));
		assert_eq!(observer.read("punk-stack-theme").as_deref(), Some("solar-bloom"));
		assert_eq!(other.manager.current(), ThemeId::SolarBloom);
		assert_eq!(other.root.attribute("data-theme").as_deref(), Some("solar-bloom"));
		let record = block_on(database.get_theme())?.unwrap();
		assert_eq!(record.theme, ThemeId::SolarBloom);
		assert_eq!(record.style, crate::theme::Style::Solarpunk);
		assert_eq!(record.mode, crate::theme::Mode::Light);
		Ok(())
	}

	#[test]
	fn remote_changes_are_not_echoed() -> anyhow::Result<()> {
		let bus = LocalBus::default();
		let database = database();
		let this = tab(&bus, &database);
		let other = tab(&bus, &database);
		this.manager.mount();
		other.manager.mount();
		let seen = Rc::new(RefCell::new(Vec::new()));
		let _watch = other.manager.watch({
			let seen = seen.clone();
			move |theme| seen.borrow_mut().push(*theme)
		});

		block_on(this.manager.set_theme("toxic-glow"))?;

		// Only the selecting tab published and persisted.
		assert_eq!(bus.published(), 1);
		assert_eq!(*seen.borrow(), vec![ThemeId::ToxicGlow]);
		Ok(())
	}

	#[test]
	fn invalid_remote_values_are_ignored() {
		let bus = LocalBus::default();
		let this = tab(&bus, &database());
		this.manager.mount();
		bus.endpoint().publish("punk-stack-theme", "not-a-theme");
		assert_eq!(this.manager.current(), ThemeId::NeonNoir);
		bus.endpoint().publish("punk-stack-theme", "\"retro-night\"");
		assert_eq!(this.manager.current(), ThemeId::RetroNight);
	}

	#[test]
	fn legacy_quoted_value_mounts() {
		let bus = LocalBus::default();
		bus.endpoint().publish("punk-stack-theme", "\"neon-day\"");
		let tab = tab(&bus, &database());
		assert_eq!(tab.manager.mount(), ThemeId::NeonDay);
	}

	#[test]
	fn reselecting_is_idempotent() -> anyhow::Result<()> {
		let bus = LocalBus::default();
		let database = database();
		let this = tab(&bus, &database);
		let other = tab(&bus, &database);
		other.manager.mount();
		let seen = Rc::new(Cell::new(0));
		let _watch = other.manager.watch({
			let seen = seen.clone();
			move |_| seen.set(seen.get() + 1)
		});

		block_on(this.manager.set_theme("brass-copper"))?;
		block_on(this.manager.set_theme("brass-copper"))?;

		assert_eq!(seen.get(), 1);
		assert_eq!(this.manager.current(), ThemeId::BrassCopper);
		assert_eq!(other.manager.current(), ThemeId::BrassCopper);
		assert_eq!(block_on(database.get_theme())?.map(|record| record.theme), Some(ThemeId::BrassCopper));
		Ok(())
	}

	#[test]
	fn set_theme_mounts_first() -> anyhow::Result<()> {
		let bus = LocalBus::default();
		let this = tab(&bus, &database());
		block_on(this.manager.set_theme("lab-bright"))?;
		assert_eq!(this.manager.state(), ThemeState::Mounted(ThemeId::LabBright));
		Ok(())
	}

	#[test]
	fn preview_is_temporary() -> anyhow::Result<()> {
		let bus = LocalBus::default();
		let database = database();
		let this = tab(&bus, &database);
		block_on(this.manager.set_theme("art-deco"))?;

		this.manager.preview(ThemeId::RetroNight);
		assert_eq!(this.root.attribute("data-theme").as_deref(), Some("retro-night"));
		assert_eq!(this.manager.current(), ThemeId::ArtDeco);
		this.manager.end_preview();
		assert_eq!(this.root.attribute("data-theme").as_deref(), Some("art-deco"));
		assert_eq!(bus.published(), 1);
		Ok(())
	}

	#[test]
	fn selecting_ends_the_preview() -> anyhow::Result<()> {
		let bus = LocalBus::default();
		let this = tab(&bus, &database());
		block_on(this.manager.set_theme("art-deco"))?;

		this.manager.preview(ThemeId::RetroNight);
		block_on(this.manager.set_theme("toxic-glow"))?;
		assert_eq!(this.root.attribute("data-theme").as_deref(), Some("toxic-glow"));

		// With the preview over, leaving the dropdown does not touch the root again.
		this.root.set_attribute("data-theme", "unchanged");
		this.manager.end_preview();
		assert_eq!(this.root.attribute("data-theme").as_deref(), Some("unchanged"));
		Ok(())
	}

	#[test]
	fn attached_queue_records_theme_changes() -> anyhow::Result<()> {
		let scheduler = Rc::new(ManualScheduler::new(5));
		let database = Database::in_memory(scheduler.clone());
		let queue = OfflineQueue::new(QueueConfig::default(), database.clone(), scheduler, Handlers::default());
		let bus = LocalBus::default();
		let this = tab(&bus, &database);
		this.manager.attach_queue(queue.clone());

		block_on(this.manager.set_theme("forest-canopy"))?;

		let pending = block_on(queue.pending_actions())?;
		assert_eq!(pending.len(), 1);
		assert_eq!(pending[0].kind, ActionType::ThemeChange);
		assert_eq!(pending[0].status, ActionStatus::Pending);
		assert_eq!(pending[0].payload.get("theme"), Some(&json!("forest-canopy")));
		assert_eq!(pending[0].payload.get("style"), Some(&json!("solarpunk")));
		Ok(())
	}
}
