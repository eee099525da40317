//! The offline action queue.
//!
//! Work that needs the network is recorded as a [`QueuedAction`] in the durable store and
//! executed by [`OfflineQueue::process_queue`] once connectivity allows. A successful action
//! is deleted. A failed one is retried with exponential backoff until it has failed
//! `max_retries` times, after which it is parked as failed until the user retries or
//! discards it.
use crate::{
	config::QueueConfig,
	network::NetworkMonitor,
	scheduler::Scheduler,
	storage::{self, ActionStatus, ActionType, Database, QueuedAction},
	utility::{Listeners, Subscription},
};
use futures_util::FutureExt;
use serde_json::{Map, Value};
use std::{
	cell::{Cell, RefCell},
	rc::{Rc, Weak},
	time::Duration,
};

mod error;
pub use error::*;
mod handler;
pub use handler::*;
mod http;
pub use http::*;

/// Attempts to find an unused id before giving up on an enqueue.
const MAX_ID_ATTEMPTS: usize = 5;

#[derive(Clone)]
pub struct OfflineQueue(Rc<Inner>);

struct Inner {
	config: QueueConfig,
	database: Database,
	scheduler: Rc<dyn Scheduler>,
	handlers: Handlers,
	processing: Cell<bool>,
	changed: Listeners<()>,
	reconnect: RefCell<Option<Subscription>>,
}

impl PartialEq for OfflineQueue {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

/// What one drain did with each pending action it saw.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainReport {
	/// Handled successfully and deleted.
	pub completed: usize,
	/// Deleted without running because no handler exists for their type.
	pub discarded: usize,
	/// Failed and put back as pending with a later attempt time.
	pub rescheduled: usize,
	/// Failed for the last time and parked as failed.
	pub failed: usize,
	/// Skipped because their backoff has not elapsed.
	pub deferred: usize,
}

impl DrainReport {
	pub fn attempted(&self) -> usize {
		self.completed + self.discarded + self.rescheduled + self.failed
	}
}

enum Outcome {
	Completed,
	Discarded,
	Rescheduled,
	Failed,
	/// Removed from the store after the drain read it.
	Gone,
}

/// Clears the processing flag however a drain ends.
struct ProcessingGuard<'a>(&'a Cell<bool>);

impl Drop for ProcessingGuard<'_> {
	fn drop(&mut self) {
		self.0.set(false);
	}
}

impl OfflineQueue {
	pub fn new(config: QueueConfig, database: Database, scheduler: Rc<dyn Scheduler>, handlers: Handlers) -> Self {
		Self(Rc::new(Inner {
			config,
			database,
			scheduler,
			handlers,
			processing: Cell::new(false),
			changed: Listeners::default(),
			reconnect: RefCell::new(None),
		}))
	}

	pub fn database(&self) -> &Database {
		&self.0.database
	}

	pub fn is_processing(&self) -> bool {
		self.0.processing.get()
	}

	/// Notified whenever actions are added, removed or change status.
	pub fn on_change(&self, callback: impl Fn() + 'static) -> Subscription {
		self.0.changed.add(move |_| callback())
	}

	fn notify(&self) {
		self.0.changed.emit(&());
	}

	/// Records a new pending action. Nothing is sent until the queue is processed.
	pub async fn enqueue(&self, kind: ActionType, payload: Map<String, Value>) -> Result<QueuedAction, storage::Error> {
		let timestamp = self.0.scheduler.now();
		let mut attempt = 0;
		let action = loop {
			attempt += 1;
			let action = QueuedAction::new(kind.clone(), payload.clone(), timestamp, &mut rand::thread_rng());
			match self.0.database.add_action(&action).await {
				Ok(()) => break action,
				Err(storage::Error::KeyExists(id)) if attempt < MAX_ID_ATTEMPTS => {
					log::debug!(target: "queue", "Generated id {id} is taken, trying another");
				}
				Err(err) => return Err(err),
			}
		};
		log::debug!(target: "queue", "Queued {} action {}", action.kind, action.id);
		self.notify();
		Ok(action)
	}

	/// Runs one drain over the pending actions, unless one is already running,
	/// in which case this returns None immediately.
	pub async fn process_queue(&self) -> Option<DrainReport> {
		if self.0.processing.replace(true) {
			log::debug!(target: "queue", "A drain is already in progress");
			return None;
		}
		let _guard = ProcessingGuard(&self.0.processing);
		let (report, next_due) = self.drain().await;
		if report.attempted() > 0 {
			log::info!(target: "queue", "Processed offline queue: {report:?}");
			self.notify();
		}
		// Backoff timers can fire a little early by the clock, or be lost with a reload.
		if let Some(due) = next_due {
			let wait = (due - self.0.scheduler.now()).max(1);
			self.schedule_drain(Duration::from_millis(wait as u64));
		}
		Some(report)
	}

	/// Processes every due pending action. Also returns the earliest attempt time among
	/// the actions that were not yet due.
	async fn drain(&self) -> (DrainReport, Option<i64>) {
		let mut report = DrainReport::default();
		let mut next_due = None;
		let mut pending = match self.0.database.queued_actions(ActionStatus::Pending).await {
			Ok(pending) => pending,
			Err(err) => {
				log::warn!(target: "queue", "Failed to read pending actions: {err}");
				return (report, next_due);
			}
		};
		sort_fifo(&mut pending);

		let now = self.0.scheduler.now();
		for action in pending {
			if let Some(at) = action.next_attempt_at.filter(|_| !action.is_due(now)) {
				report.deferred += 1;
				next_due = Some(next_due.map_or(at, |due: i64| due.min(at)));
				continue;
			}
			match self.process_action(action).await {
				Ok(Outcome::Completed) => report.completed += 1,
				Ok(Outcome::Discarded) => report.discarded += 1,
				Ok(Outcome::Rescheduled) => report.rescheduled += 1,
				Ok(Outcome::Failed) => report.failed += 1,
				Ok(Outcome::Gone) => {}
				Err(err) => log::warn!(target: "queue", "{err}"),
			}
		}
		(report, next_due)
	}

	async fn process_action(&self, action: QueuedAction) -> Result<Outcome, ActionError> {
		let database = &self.0.database;
		let id = action.id.clone();
		let Some(action) = database
			.update_action(&id, |action| action.status = ActionStatus::Processing)
			.await?
		else {
			log::debug!(target: "queue", "Action {id} was removed before it could run");
			return Ok(Outcome::Gone);
		};

		let result = match self.0.handlers.get(&action.kind) {
			Some(handler) => handler.handle(&action).await.map_err(ActionError::from),
			None => Err(ActionError::UnknownActionType(action.kind.clone())),
		};

		match result {
			Ok(()) => {
				database.remove_action(&id).await?;
				log::debug!(target: "queue", "Completed {} action {id}", action.kind);
				Ok(Outcome::Completed)
			}
			Err(err @ ActionError::UnknownActionType(_)) => {
				log::warn!(target: "queue", "Discarding action {id}: {err}");
				database.remove_action(&id).await?;
				Ok(Outcome::Discarded)
			}
			Err(err) => Ok(self.record_failure(action, err).await?),
		}
	}

	async fn record_failure(&self, action: QueuedAction, err: ActionError) -> Result<Outcome, ActionError> {
		let retries = action.retries + 1;
		let database = &self.0.database;
		if retries >= self.0.config.max_retries {
			database
				.update_action(&action.id, |action| {
					action.status = ActionStatus::Failed;
					action.retries = retries;
					action.next_attempt_at = None;
				})
				.await?;
			let exceeded = ActionError::MaxRetriesExceeded {
				id: action.id.clone(),
				retries,
			};
			log::error!(target: "queue", "{exceeded} Last error: {err}");
			return Ok(Outcome::Failed);
		}

		let delay = self.0.config.backoff(retries);
		let next_attempt_at = self.0.scheduler.now() + delay.as_millis() as i64;
		database
			.update_action(&action.id, |action| {
				action.status = ActionStatus::Pending;
				action.retries = retries;
				action.next_attempt_at = Some(next_attempt_at);
			})
			.await?;
		log::warn!(
			target: "queue",
			"Action {} failed (attempt {retries} of {}), retrying in {}ms: {err}",
			action.id,
			self.0.config.max_retries,
			delay.as_millis()
		);
		self.schedule_drain(delay);
		Ok(Outcome::Rescheduled)
	}

	/// Processes the queue after `delay`. If a drain is running at that point, tries again
	/// one base delay later.
	fn schedule_drain(&self, delay: Duration) {
		let weak = Rc::downgrade(&self.0);
		let _ = self.0.scheduler.schedule(delay, Self::deferred_drain(weak).boxed_local());
	}

	async fn deferred_drain(weak: Weak<Inner>) {
		let Some(inner) = weak.upgrade() else {
			return;
		};
		let queue = OfflineQueue(inner);
		if queue.process_queue().await.is_none() {
			queue.schedule_drain(queue.0.config.base_delay);
		}
	}

	/// Moves every failed action back to pending with a clean retry count, then runs
	/// exactly one drain.
	pub async fn retry_failed(&self) -> Option<DrainReport> {
		match self.0.database.queued_actions(ActionStatus::Failed).await {
			Ok(failed) => {
				for action in failed {
					let reset = self
						.0
						.database
						.update_action(&action.id, |action| {
							action.status = ActionStatus::Pending;
							action.retries = 0;
							action.next_attempt_at = None;
						})
						.await;
					if let Err(err) = reset {
						log::warn!(target: "queue", "Failed to reset action {}: {err}", action.id);
					}
				}
				self.notify();
			}
			Err(err) => log::warn!(target: "queue", "Failed to read failed actions: {err}"),
		}
		self.process_queue().await
	}

	/// Deletes every failed action, returning how many were removed.
	pub async fn clear_failed(&self) -> Result<usize, storage::Error> {
		let failed = self.0.database.queued_actions(ActionStatus::Failed).await?;
		for action in &failed {
			self.0.database.remove_action(&action.id).await?;
		}
		if !failed.is_empty() {
			log::info!(target: "queue", "Discarded {} failed actions", failed.len());
			self.notify();
		}
		Ok(failed.len())
	}

	/// Actions waiting for manual retry or discard, oldest first.
	pub async fn failed_actions(&self) -> Result<Vec<QueuedAction>, storage::Error> {
		let mut actions = self.0.database.queued_actions(ActionStatus::Failed).await?;
		sort_fifo(&mut actions);
		Ok(actions)
	}

	/// Actions waiting for the next drain, oldest first.
	pub async fn pending_actions(&self) -> Result<Vec<QueuedAction>, storage::Error> {
		let mut actions = self.0.database.queued_actions(ActionStatus::Pending).await?;
		sort_fifo(&mut actions);
		Ok(actions)
	}

	/// Actions left as processing by a session that ended mid drain are made pending again.
	/// Call once at startup, before the first drain.
	pub async fn recover_interrupted(&self) -> Result<usize, storage::Error> {
		let stale = self.0.database.queued_actions(ActionStatus::Processing).await?;
		for action in &stale {
			self.0
				.database
				.update_action(&action.id, |action| action.status = ActionStatus::Pending)
				.await?;
		}
		if !stale.is_empty() {
			log::info!(target: "queue", "Recovered {} interrupted actions", stale.len());
		}
		Ok(stale.len())
	}

	/// Processes the queue once each time `monitor` reports a reconnect.
	pub fn watch_connectivity(&self, monitor: &NetworkMonitor) {
		let weak = Rc::downgrade(&self.0);
		let subscription = monitor.on_reconnect(move || {
			let Some(inner) = weak.upgrade() else {
				return;
			};
			log::info!(target: "queue", "Back online, processing offline queue");
			let queue = OfflineQueue(inner);
			let scheduler = queue.0.scheduler.clone();
			scheduler.spawn(
				async move {
					let _ = queue.process_queue().await;
				}
				.boxed_local(),
			);
		});
		*self.0.reconnect.borrow_mut() = Some(subscription);
	}
}

fn sort_fifo(actions: &mut [QueuedAction]) {
	actions.sort_by(|a, b| (a.timestamp, &a.id).cmp(&(b.timestamp, &b.id)));
}
