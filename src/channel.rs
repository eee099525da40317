//! Same-origin broadcast of small string values.
//!
//! A channel is both a tiny key-value store (the last published value of each key can be
//! read back, surviving reloads when the backing does) and a pub/sub bus. Publishing never
//! notifies the endpoint that published; other endpoints (other tabs) are notified.
use crate::utility::{Listeners, Subscription};
use std::{
	cell::{Cell, RefCell},
	collections::HashMap,
	rc::Rc,
};

#[cfg(target_family = "wasm")]
mod storage;
#[cfg(target_family = "wasm")]
pub use storage::*;

pub trait Channel {
	/// The currently stored value for `key`.
	fn read(&self, key: &str) -> Option<String>;

	/// Stores `value` under `key` and notifies every other endpoint subscribed to `key`.
	fn publish(&self, key: &str, value: &str);

	fn subscribe(&self, key: &str, handler: Box<dyn Fn(&str)>) -> Subscription;
}

/// An in-process channel hub. Each [`LocalBus::endpoint`] behaves like one browser tab.
#[derive(Clone, Default)]
pub struct LocalBus(Rc<BusState>);

#[derive(Default)]
struct BusState {
	values: RefCell<HashMap<String, String>>,
	listeners: RefCell<HashMap<String, Listeners<Message>>>,
	next_origin: Cell<u64>,
	published: Cell<usize>,
}

struct Message {
	origin: u64,
	value: String,
}

impl LocalBus {
	pub fn endpoint(&self) -> LocalChannel {
		let origin = self.0.next_origin.get();
		self.0.next_origin.set(origin + 1);
		LocalChannel {
			bus: self.clone(),
			origin,
		}
	}

	/// Total number of publish calls across all endpoints.
	pub fn published(&self) -> usize {
		self.0.published.get()
	}
}

pub struct LocalChannel {
	bus: LocalBus,
	origin: u64,
}

impl Channel for LocalChannel {
	fn read(&self, key: &str) -> Option<String> {
		self.bus.0.values.borrow().get(key).cloned()
	}

	fn publish(&self, key: &str, value: &str) {
		let state = &self.bus.0;
		state.published.set(state.published.get() + 1);
		let previous = state.values.borrow_mut().insert(key.to_owned(), value.to_owned());
		// Like browser storage events, an unchanged value is not an event.
		if previous.as_deref() == Some(value) {
			return;
		}
		let listeners = state.listeners.borrow().get(key).cloned();
		if let Some(listeners) = listeners {
			listeners.emit(&Message {
				origin: self.origin,
				value: value.to_owned(),
			});
		}
	}

	fn subscribe(&self, key: &str, handler: Box<dyn Fn(&str)>) -> Subscription {
		let origin = self.origin;
		let listeners = self.bus.0.listeners.borrow_mut().entry(key.to_owned()).or_default().clone();
		listeners.add(move |message: &Message| {
			if message.origin != origin {
				handler(&message.value);
			}
		})
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn collect(channel: &LocalChannel, key: &str) -> (Rc<RefCell<Vec<String>>>, Subscription) {
		let seen = Rc::new(RefCell::new(Vec::new()));
		let subscription = channel.subscribe(key, {
			let seen = seen.clone();
			Box::new(move |value| seen.borrow_mut().push(value.to_owned()))
		});
		(seen, subscription)
	}

	#[test]
	fn other_endpoints_observe_publish() {
		let bus = LocalBus::default();
		let tab_a = bus.endpoint();
		let tab_b = bus.endpoint();
		let (seen_a, _sub_a) = collect(&tab_a, "theme");
		let (seen_b, _sub_b) = collect(&tab_b, "theme");

		tab_a.publish("theme", "art-deco");

		assert!(seen_a.borrow().is_empty());
		assert_eq!(*seen_b.borrow(), vec!["art-deco".to_owned()]);
		assert_eq!(tab_b.read("theme").as_deref(), Some("art-deco"));
	}

	#[test]
	fn unchanged_value_is_not_an_event() {
		let bus = LocalBus::default();
		let tab_a = bus.endpoint();
		let tab_b = bus.endpoint();
		let (seen_b, _sub) = collect(&tab_b, "theme");

		tab_a.publish("theme", "art-deco");
		tab_a.publish("theme", "art-deco");

		assert_eq!(seen_b.borrow().len(), 1);
		assert_eq!(bus.published(), 2);
	}

	#[test]
	fn keys_are_independent() {
		let bus = LocalBus::default();
		let tab_a = bus.endpoint();
		let tab_b = bus.endpoint();
		let (seen_b, _sub) = collect(&tab_b, "theme");

		tab_a.publish("locale", "en");

		assert!(seen_b.borrow().is_empty());
		assert_eq!(tab_b.read("theme"), None);
	}

	#[test]
	fn dropped_subscription_stops_delivery() {
		let bus = LocalBus::default();
		let tab_a = bus.endpoint();
		let tab_b = bus.endpoint();
		let (seen_b, subscription) = collect(&tab_b, "theme");
		drop(subscription);

		tab_a.publish("theme", "lab-bright");

		assert!(seen_b.borrow().is_empty());
	}
}
