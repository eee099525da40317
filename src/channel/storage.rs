use super::Channel;
use crate::utility::Subscription;
use gloo_events::EventListener;
use gloo_storage::{LocalStorage, Storage};
use wasm_bindgen::JsCast;

/// A [`Channel`] backed by `localStorage`. Browsers deliver a `storage` event to every other
/// same-origin document when a value changes, which is what carries the broadcast.
#[derive(Clone, Copy, Debug, Default)]
pub struct StorageChannel;

impl StorageChannel {
	/// `localStorage` can be missing or throw when storage is disabled by policy.
	pub fn is_available() -> bool {
		matches!(gloo_utils::window().local_storage(), Ok(Some(_)))
	}
}

impl Channel for StorageChannel {
	fn read(&self, key: &str) -> Option<String> {
		if !Self::is_available() {
			return None;
		}
		LocalStorage::raw().get_item(key).ok().flatten()
	}

	fn publish(&self, key: &str, value: &str) {
		if !Self::is_available() {
			log::warn!(target: "channel", "localStorage is unavailable, {key:?} will not reach other tabs");
			return;
		}
		if let Err(err) = LocalStorage::raw().set_item(key, value) {
			log::warn!(target: "channel", "Failed to store {key:?}: {err:?}");
		}
	}

	fn subscribe(&self, key: &str, handler: Box<dyn Fn(&str)>) -> Subscription {
		let key = key.to_owned();
		let listener = EventListener::new(&gloo_utils::window(), "storage", move |event| {
			let Some(event) = event.dyn_ref::<web_sys::StorageEvent>() else {
				return;
			};
			if event.key().as_deref() != Some(key.as_str()) {
				return;
			}
			// A null value means the key was removed or storage was cleared.
			let Some(value) = event.new_value() else {
				return;
			};
			handler(&value);
		});
		Subscription::new(move || drop(listener))
	}
}
