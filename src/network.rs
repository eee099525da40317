//! Connectivity tracking.
//!
//! [`NetworkMonitor`] holds the current [`NetworkStatus`]. Coming back online raises
//! `just_reconnected` for a short window and notifies reconnect listeners once, which is
//! what drives the offline banner and the queue's automatic drain.
use crate::{
	config::NetworkConfig,
	scheduler::{Scheduler, TaskHandle},
	utility::{Listeners, Subscription},
};
use futures_util::FutureExt;
use std::{
	cell::{Cell, RefCell},
	rc::{Rc, Weak},
};

#[cfg(target_family = "wasm")]
mod browser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkStatus {
	pub online: bool,
	/// Set for the reconnect window after an offline to online transition.
	pub just_reconnected: bool,
}

impl Default for NetworkStatus {
	fn default() -> Self {
		Self {
			online: true,
			just_reconnected: false,
		}
	}
}

impl NetworkStatus {
	pub fn is_offline(&self) -> bool {
		!self.online
	}
}

#[derive(Clone)]
pub struct NetworkMonitor(Rc<MonitorState>);

struct MonitorState {
	config: NetworkConfig,
	scheduler: Rc<dyn Scheduler>,
	status: Cell<NetworkStatus>,
	reset: RefCell<Option<TaskHandle>>,
	watchers: Listeners<NetworkStatus>,
	reconnected: Listeners<()>,
	#[cfg(target_family = "wasm")]
	bindings: RefCell<Vec<Subscription>>,
}

impl PartialEq for NetworkMonitor {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl NetworkMonitor {
	/// A monitor that assumes it starts online.
	pub fn new(config: NetworkConfig, scheduler: Rc<dyn Scheduler>) -> Self {
		Self(Rc::new(MonitorState {
			config,
			scheduler,
			status: Cell::new(NetworkStatus::default()),
			reset: RefCell::new(None),
			watchers: Listeners::default(),
			reconnected: Listeners::default(),
			#[cfg(target_family = "wasm")]
			bindings: RefCell::new(Vec::new()),
		}))
	}

	pub fn status(&self) -> NetworkStatus {
		self.0.status.get()
	}

	pub fn is_online(&self) -> bool {
		self.status().online
	}

	pub fn watch(&self, callback: impl Fn(&NetworkStatus) + 'static) -> Subscription {
		self.0.watchers.add(callback)
	}

	/// `callback` runs once per offline to online transition.
	pub fn on_reconnect(&self, callback: impl Fn() + 'static) -> Subscription {
		self.0.reconnected.add(move |_| callback())
	}

	/// Reports the connectivity signal. Repeating the current state does nothing.
	pub fn set_online(&self, online: bool) {
		if self.status().online == online {
			return;
		}
		if let Some(reset) = self.0.reset.borrow_mut().take() {
			reset.cancel();
		}
		if online {
			log::info!(target: "network", "Back online");
			self.update(NetworkStatus {
				online: true,
				just_reconnected: true,
			});
			let handle = self.0.scheduler.schedule(
				self.0.config.reconnect_window,
				Self::end_reconnect_window(Rc::downgrade(&self.0)).boxed_local(),
			);
			*self.0.reset.borrow_mut() = Some(handle);
			self.0.reconnected.emit(&());
		} else {
			log::info!(target: "network", "Connection lost");
			self.update(NetworkStatus {
				online: false,
				just_reconnected: false,
			});
		}
	}

	async fn end_reconnect_window(weak: Weak<MonitorState>) {
		let Some(state) = weak.upgrade() else {
			return;
		};
		let monitor = NetworkMonitor(state);
		let status = monitor.status();
		if status.online && status.just_reconnected {
			monitor.update(NetworkStatus {
				online: true,
				just_reconnected: false,
			});
		}
	}

	fn update(&self, status: NetworkStatus) {
		self.0.status.set(status);
		self.0.watchers.emit(&status);
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::scheduler::ManualScheduler;
	use std::time::Duration;

	fn monitor() -> (Rc<ManualScheduler>, NetworkMonitor) {
		let scheduler = Rc::new(ManualScheduler::default());
		let monitor = NetworkMonitor::new(NetworkConfig::default(), scheduler.clone());
		(scheduler, monitor)
	}

	#[test]
	fn starts_online() {
		let (_, monitor) = monitor();
		assert_eq!(monitor.status(), NetworkStatus::default());
		assert!(monitor.is_online());
	}

	#[test]
	fn reconnect_flag_clears_after_window() {
		let (scheduler, monitor) = monitor();
		monitor.set_online(false);
		assert!(monitor.status().is_offline());

		monitor.set_online(true);
		assert!(monitor.status().just_reconnected);
		scheduler.advance(Duration::from_millis(2999));
		assert!(monitor.status().just_reconnected);
		scheduler.advance(Duration::from_millis(1));
		assert_eq!(monitor.status(), NetworkStatus::default());
	}

	#[test]
	fn going_offline_cancels_the_window() {
		let (scheduler, monitor) = monitor();
		monitor.set_online(false);
		monitor.set_online(true);
		scheduler.advance(Duration::from_millis(1000));
		monitor.set_online(false);
		assert_eq!(scheduler.pending(), 0);
		assert_eq!(
			monitor.status(),
			NetworkStatus {
				online: false,
				just_reconnected: false
			}
		);
	}

	#[test]
	fn reconnect_listeners_fire_once_per_transition() {
		let (_, monitor) = monitor();
		let reconnects = Rc::new(Cell::new(0));
		let statuses = Rc::new(RefCell::new(Vec::new()));
		let _on_reconnect = monitor.on_reconnect({
			let reconnects = reconnects.clone();
			move || reconnects.set(reconnects.get() + 1)
		});
		let _watch = monitor.watch({
			let statuses = statuses.clone();
			move |status| statuses.borrow_mut().push(status.online)
		});

		monitor.set_online(true);
		assert_eq!(reconnects.get(), 0);
		monitor.set_online(false);
		monitor.set_online(false);
		monitor.set_online(true);
		monitor.set_online(true);
		assert_eq!(reconnects.get(), 1);
		assert_eq!(*statuses.borrow(), vec![false, true]);
	}
}
