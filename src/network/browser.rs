use super::NetworkMonitor;
use crate::utility::Subscription;
use gloo_events::EventListener;
use std::rc::Rc;

impl NetworkMonitor {
	/// Seeds the status from `navigator.onLine` and follows the window's `online` and
	/// `offline` events for as long as the monitor lives. Binding twice is a no-op.
	pub fn bind_to_window(&self) {
		if !self.0.bindings.borrow().is_empty() {
			return;
		}
		let window = gloo_utils::window();
		self.set_online(window.navigator().on_line());

		let mut bindings = Vec::with_capacity(2);
		for (event_type, online) in [("online", true), ("offline", false)] {
			let weak = Rc::downgrade(&self.0);
			let listener = EventListener::new(&window, event_type, move |_| {
				if let Some(state) = weak.upgrade() {
					NetworkMonitor(state).set_online(online);
				}
			});
			bindings.push(Subscription::new(move || drop(listener)));
		}
		*self.0.bindings.borrow_mut() = bindings;
	}
}
