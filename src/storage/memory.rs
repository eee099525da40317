use super::{Backend, Error};
use database::IndexQuery;
use futures_util::future::LocalBoxFuture;
use serde_json::Value;
use std::{
	cell::RefCell,
	collections::{BTreeMap, HashMap},
};

/// Process-local storage. Used when IndexedDB is unavailable and for running the client
/// core outside of a browser.
#[derive(Default)]
pub struct MemoryBackend {
	stores: RefCell<HashMap<&'static str, BTreeMap<String, Value>>>,
}

impl MemoryBackend {
	pub fn new() -> Self {
		Self::default()
	}
}

impl Backend for MemoryBackend {
	fn name(&self) -> &'static str {
		"memory"
	}

	fn is_volatile(&self) -> bool {
		true
	}

	fn get<'a>(&'a self, store: &'static str, key: &'a str) -> LocalBoxFuture<'a, Result<Option<Value>, Error>> {
		Box::pin(async move {
			let stores = self.stores.borrow();
			Ok(stores.get(store).and_then(|records| records.get(key)).cloned())
		})
	}

	fn put<'a>(&'a self, store: &'static str, key: &'a str, value: Value) -> LocalBoxFuture<'a, Result<(), Error>> {
		Box::pin(async move {
			let mut stores = self.stores.borrow_mut();
			stores.entry(store).or_default().insert(key.to_owned(), value);
			Ok(())
		})
	}

	fn add<'a>(&'a self, store: &'static str, key: &'a str, value: Value) -> LocalBoxFuture<'a, Result<(), Error>> {
		Box::pin(async move {
			let mut stores = self.stores.borrow_mut();
			let records = stores.entry(store).or_default();
			if records.contains_key(key) {
				return Err(Error::KeyExists(key.to_owned()));
			}
			records.insert(key.to_owned(), value);
			Ok(())
		})
	}

	fn delete<'a>(&'a self, store: &'static str, key: &'a str) -> LocalBoxFuture<'a, Result<(), Error>> {
		Box::pin(async move {
			if let Some(records) = self.stores.borrow_mut().get_mut(store) {
				records.remove(key);
			}
			Ok(())
		})
	}

	fn get_all<'a>(&'a self, store: &'static str) -> LocalBoxFuture<'a, Result<Vec<Value>, Error>> {
		Box::pin(async move {
			let stores = self.stores.borrow();
			Ok(stores
				.get(store)
				.map(|records| records.values().cloned().collect())
				.unwrap_or_default())
		})
	}

	fn get_all_by_index<'a>(
		&'a self,
		store: &'static str,
		query: IndexQuery,
	) -> LocalBoxFuture<'a, Result<Vec<Value>, Error>> {
		Box::pin(async move {
			let stores = self.stores.borrow();
			let Some(records) = stores.get(store) else {
				return Ok(Vec::new());
			};
			Ok(records
				.values()
				.filter(|record| query.matches(|field| record.get(field).and_then(Value::as_str)))
				.cloned()
				.collect())
		})
	}

	fn clear<'a>(&'a self, stores: &'a [&'static str]) -> LocalBoxFuture<'a, Result<(), Error>> {
		Box::pin(async move {
			// A single borrow makes the multi-store clear all-or-nothing.
			let mut all = self.stores.borrow_mut();
			for store in stores {
				all.remove(store);
			}
			Ok(())
		})
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use database::IndexType;
	use futures::executor::block_on;
	use serde_json::json;

	struct Colour(&'static str);
	impl IndexType for Colour {
		fn name() -> &'static str {
			"colour"
		}

		fn keys() -> &'static [&'static str] {
			&["colour"]
		}

		fn values(&self) -> Vec<String> {
			vec![self.0.to_owned()]
		}
	}

	#[test]
	fn put_overwrites_and_add_rejects() -> anyhow::Result<()> {
		let backend = MemoryBackend::new();
		block_on(backend.put("paint", "a", json!({ "id": "a", "colour": "red" })))?;
		block_on(backend.put("paint", "a", json!({ "id": "a", "colour": "blue" })))?;
		assert_eq!(
			block_on(backend.get("paint", "a"))?,
			Some(json!({ "id": "a", "colour": "blue" }))
		);
		let err = block_on(backend.add("paint", "a", json!({ "id": "a" }))).unwrap_err();
		assert_eq!(err, Error::KeyExists("a".into()));
		Ok(())
	}

	#[test]
	fn missing_store_reads_empty() -> anyhow::Result<()> {
		let backend = MemoryBackend::new();
		assert_eq!(block_on(backend.get("nothing", "a"))?, None);
		assert!(block_on(backend.get_all("nothing"))?.is_empty());
		block_on(backend.delete("nothing", "a"))?;
		Ok(())
	}

	#[test]
	fn index_lookup_filters_by_field() -> anyhow::Result<()> {
		let backend = MemoryBackend::new();
		block_on(backend.put("paint", "a", json!({ "id": "a", "colour": "red" })))?;
		block_on(backend.put("paint", "b", json!({ "id": "b", "colour": "blue" })))?;
		block_on(backend.put("paint", "c", json!({ "id": "c", "colour": "red" })))?;
		block_on(backend.put("paint", "d", json!({ "id": "d" })))?;
		let red = block_on(backend.get_all_by_index("paint", IndexQuery::of(&Colour("red"))))?;
		let ids = red.iter().filter_map(|value| value["id"].as_str()).collect::<Vec<_>>();
		assert_eq!(ids, vec!["a", "c"]);
		Ok(())
	}

	#[test]
	fn clear_only_touches_listed_stores() -> anyhow::Result<()> {
		let backend = MemoryBackend::new();
		block_on(backend.put("one", "a", json!(1)))?;
		block_on(backend.put("two", "a", json!(2)))?;
		block_on(backend.put("three", "a", json!(3)))?;
		block_on(backend.clear(&["one", "two"]))?;
		assert!(block_on(backend.get_all("one"))?.is_empty());
		assert!(block_on(backend.get_all("two"))?.is_empty());
		assert_eq!(block_on(backend.get_all("three"))?, vec![json!(3)]);
		Ok(())
	}
}
