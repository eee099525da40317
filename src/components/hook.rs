use crate::{
	network::{NetworkMonitor, NetworkStatus},
	queue::OfflineQueue,
	storage::{self, QueuedAction},
};
use yew::prelude::*;
use yew_hooks::{use_async_with_options, UseAsyncHandle, UseAsyncOptions};

/// The current connectivity, re-rendering on every change.
/// Outside of a [`NetworkMonitor`] context this always reports online.
#[hook]
pub fn use_network_status() -> NetworkStatus {
	let monitor = use_context::<NetworkMonitor>();
	let status = use_state_eq({
		let monitor = monitor.clone();
		move || monitor.map(|monitor| monitor.status()).unwrap_or_default()
	});
	use_effect_with(monitor, {
		let status = status.clone();
		move |monitor: &Option<NetworkMonitor>| {
			let subscription = monitor.as_ref().map(|monitor| {
				status.set(monitor.status());
				monitor.watch(move |value| status.set(*value))
			});
			move || drop(subscription)
		}
	});
	*status
}

/// Failed queue actions, reloaded whenever the queue changes.
#[hook]
pub fn use_failed_actions() -> UseAsyncHandle<Vec<QueuedAction>, storage::Error> {
	let queue = use_context::<OfflineQueue>();
	let handle = use_async_with_options(
		{
			let queue = queue.clone();
			async move {
				match queue {
					Some(queue) => queue.failed_actions().await,
					None => Ok(Vec::new()),
				}
			}
		},
		UseAsyncOptions { auto: true },
	);
	use_effect_with(queue, {
		let handle = handle.clone();
		move |queue: &Option<OfflineQueue>| {
			let subscription = queue.as_ref().map(|queue| queue.on_change(move || handle.run()));
			move || drop(subscription)
		}
	});
	handle
}
