//! Delayed work and wall-clock time.
//!
//! Every timer in the client goes through [`Scheduler`] so that the queue's backoff and the
//! network monitor's reconnect window can be driven by a virtual clock ([`ManualScheduler`])
//! outside of a browser.
use futures_util::future::LocalBoxFuture;
use std::{
	cell::{Cell, RefCell},
	rc::Rc,
	time::Duration,
};

#[cfg(target_family = "wasm")]
mod browser;
#[cfg(target_family = "wasm")]
pub use browser::*;

pub trait Clock {
	/// Milliseconds since the unix epoch.
	fn now(&self) -> i64;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	#[cfg(target_family = "wasm")]
	fn now(&self) -> i64 {
		js_sys::Date::now() as i64
	}

	#[cfg(not(target_family = "wasm"))]
	fn now(&self) -> i64 {
		(time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
	}
}

pub trait Scheduler: Clock {
	/// Runs `task` once `delay` has elapsed, unless the returned handle is cancelled first.
	fn schedule(&self, delay: Duration, task: LocalBoxFuture<'static, ()>) -> TaskHandle;

	fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
		let _ = self.schedule(Duration::ZERO, task);
	}
}

/// Handle to scheduled work. Dropping the handle leaves the task scheduled.
#[derive(Clone, Debug, Default)]
pub struct TaskHandle(Rc<Cell<bool>>);

impl TaskHandle {
	pub fn cancel(&self) {
		self.0.set(true);
	}

	pub fn is_cancelled(&self) -> bool {
		self.0.get()
	}
}

/// A scheduler over a virtual clock. Time only moves when [`ManualScheduler::advance`] is called.
///
/// Due tasks are driven to completion with a blocking executor, so `advance` must not be
/// called from inside a task or another executor.
pub struct ManualScheduler {
	now: Cell<i64>,
	next_seq: Cell<u64>,
	tasks: RefCell<Vec<ManualTask>>,
}

struct ManualTask {
	due: i64,
	seq: u64,
	handle: TaskHandle,
	task: LocalBoxFuture<'static, ()>,
}

impl ManualScheduler {
	pub fn new(start: i64) -> Self {
		Self {
			now: Cell::new(start),
			next_seq: Cell::new(0),
			tasks: RefCell::new(Vec::new()),
		}
	}

	/// Moves the clock forward by `by`, running every task that falls due on the way in
	/// `(due, insertion)` order. Returns how many tasks ran.
	pub fn advance(&self, by: Duration) -> usize {
		let target = self.now.get() + by.as_millis() as i64;
		let mut ran = 0;
		while let Some(next) = self.take_next_due(target) {
			self.now.set(self.now.get().max(next.due));
			if next.handle.is_cancelled() {
				continue;
			}
			futures::executor::block_on(next.task);
			ran += 1;
		}
		self.now.set(target);
		ran
	}

	/// Runs the tasks that are due without moving the clock.
	pub fn run_until_idle(&self) -> usize {
		self.advance(Duration::ZERO)
	}

	/// Number of scheduled tasks which have not run and were not cancelled.
	pub fn pending(&self) -> usize {
		self.tasks.borrow().iter().filter(|task| !task.handle.is_cancelled()).count()
	}

	/// Delay until the earliest live task, if any.
	pub fn next_due(&self) -> Option<Duration> {
		let now = self.now.get();
		let tasks = self.tasks.borrow();
		let due = tasks.iter().filter(|task| !task.handle.is_cancelled()).map(|task| task.due).min()?;
		Some(Duration::from_millis((due - now).max(0) as u64))
	}

	fn take_next_due(&self, target: i64) -> Option<ManualTask> {
		let mut tasks = self.tasks.borrow_mut();
		let idx = tasks
			.iter()
			.enumerate()
			.filter(|(_, task)| task.due <= target)
			.min_by_key(|(_, task)| (task.due, task.seq))
			.map(|(idx, _)| idx)?;
		Some(tasks.remove(idx))
	}
}

impl Default for ManualScheduler {
	fn default() -> Self {
		Self::new(0)
	}
}

impl Clock for ManualScheduler {
	fn now(&self) -> i64 {
		self.now.get()
	}
}

impl Scheduler for ManualScheduler {
	fn schedule(&self, delay: Duration, task: LocalBoxFuture<'static, ()>) -> TaskHandle {
		let seq = self.next_seq.get();
		self.next_seq.set(seq + 1);
		let handle = TaskHandle::default();
		self.tasks.borrow_mut().push(ManualTask {
			due: self.now.get() + delay.as_millis() as i64,
			seq,
			handle: handle.clone(),
			task,
		});
		handle
	}
}
