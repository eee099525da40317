use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

/// Keeps a registration alive; dropping it runs the registered teardown exactly once.
#[must_use = "dropping a subscription immediately unregisters it"]
pub struct Subscription(Option<Box<dyn FnOnce()>>);

impl Subscription {
	pub fn new(on_drop: impl FnOnce() + 'static) -> Self {
		Self(Some(Box::new(on_drop)))
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		if let Some(teardown) = self.0.take() {
			teardown();
		}
	}
}

impl std::fmt::Debug for Subscription {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("Subscription").field(&self.0.is_some()).finish()
	}
}

/// A list of callbacks which can be notified of a value.
///
/// Callbacks are invoked on a snapshot of the list, so a callback may add or remove
/// listeners (including itself) without poisoning the borrow.
pub struct Listeners<T>(Rc<RefCell<ListenerSet<T>>>);

struct ListenerSet<T> {
	next_id: u64,
	entries: BTreeMap<u64, Rc<dyn Fn(&T)>>,
}

impl<T> Default for Listeners<T> {
	fn default() -> Self {
		Self(Rc::new(RefCell::new(ListenerSet {
			next_id: 0,
			entries: BTreeMap::new(),
		})))
	}
}

impl<T> Clone for Listeners<T> {
	fn clone(&self) -> Self {
		Self(self.0.clone())
	}
}

impl<T: 'static> Listeners<T> {
	pub fn add(&self, callback: impl Fn(&T) + 'static) -> Subscription {
		let id = {
			let mut set = self.0.borrow_mut();
			let id = set.next_id;
			set.next_id += 1;
			set.entries.insert(id, Rc::new(callback));
			id
		};
		let weak = Rc::downgrade(&self.0);
		Subscription::new(move || {
			if let Some(set) = weak.upgrade() {
				set.borrow_mut().entries.remove(&id);
			}
		})
	}

	pub fn emit(&self, value: &T) {
		let callbacks = self.0.borrow().entries.values().cloned().collect::<Vec<_>>();
		for callback in callbacks {
			callback(value);
		}
	}

	pub fn len(&self) -> usize {
		self.0.borrow().entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
