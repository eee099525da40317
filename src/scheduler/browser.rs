use super::{Clock, Scheduler, SystemClock, TaskHandle};
use futures_util::future::LocalBoxFuture;
use gloo_timers::future::TimeoutFuture;
use std::time::Duration;
use wasm_bindgen_futures::spawn_local;

/// Schedules work on the browser event loop with `setTimeout`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserScheduler;

impl Clock for BrowserScheduler {
	fn now(&self) -> i64 {
		SystemClock.now()
	}
}

impl Scheduler for BrowserScheduler {
	fn schedule(&self, delay: Duration, task: LocalBoxFuture<'static, ()>) -> TaskHandle {
		let handle = TaskHandle::default();
		let millis = delay.as_millis().min(u32::MAX as u128) as u32;
		spawn_local({
			let handle = handle.clone();
			async move {
				if millis > 0 {
					TimeoutFuture::new(millis).await;
				}
				if !handle.is_cancelled() {
					task.await;
				}
			}
		});
		handle
	}
}
