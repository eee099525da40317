pub trait IndexType {
	fn name() -> &'static str;
	fn keys() -> &'static [&'static str];
	/// The values to look up, in the same order as [`IndexType::keys`].
	fn values(&self) -> Vec<String>;

	#[cfg(target_family = "wasm")]
	fn key_path() -> idb::KeyPath {
		let keys = Self::keys();
		if keys.len() == 1 {
			idb::KeyPath::new_single(keys[0])
		} else {
			idb::KeyPath::new_array(keys.to_vec())
		}
	}
}

/// An index lookup with the concrete index type erased, so it can cross object-safe boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexQuery {
	pub name: &'static str,
	pub keys: &'static [&'static str],
	pub values: Vec<String>,
}

impl IndexQuery {
	pub fn of<T: IndexType>(index: &T) -> Self {
		Self {
			name: T::name(),
			keys: T::keys(),
			values: index.values(),
		}
	}

	/// Returns true if every indexed field, as reported by `field`, equals the queried value.
	pub fn matches<'a>(&self, field: impl Fn(&str) -> Option<&'a str>) -> bool {
		if self.keys.len() != self.values.len() {
			return false;
		}
		self.keys
			.iter()
			.zip(self.values.iter())
			.all(|(key, value)| field(key) == Some(value.as_str()))
	}

	#[cfg(target_family = "wasm")]
	pub fn as_query(&self) -> Result<idb::Query, idb::Error> {
		use wasm_bindgen::JsValue;
		if self.values.len() == 1 {
			return Ok(idb::Query::Key(JsValue::from_str(&self.values[0])));
		}
		let values = js_sys::Array::new_with_length(self.values.len() as u32);
		for (idx, value) in self.values.iter().enumerate() {
			values.set(idx as u32, JsValue::from_str(value));
		}
		Ok(idb::Query::KeyRange(idb::KeyRange::only(&values)?))
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use std::collections::HashMap;

	struct ByOwnerKind {
		owner: String,
		kind: String,
	}

	impl IndexType for ByOwnerKind {
		fn name() -> &'static str {
			"owner_kind"
		}

		fn keys() -> &'static [&'static str] {
			&["owner", "kind"]
		}

		fn values(&self) -> Vec<String> {
			vec![self.owner.clone(), self.kind.clone()]
		}
	}

	#[test]
	fn query_carries_index_description() {
		let query = IndexQuery::of(&ByOwnerKind {
			owner: "alice".into(),
			kind: "note".into(),
		});
		assert_eq!(query.name, "owner_kind");
		assert_eq!(query.keys, &["owner", "kind"]);
		assert_eq!(query.values, vec!["alice".to_owned(), "note".to_owned()]);
	}

	#[test]
	fn matches_requires_every_field() {
		let query = IndexQuery::of(&ByOwnerKind {
			owner: "alice".into(),
			kind: "note".into(),
		});
		let full = HashMap::from([("owner", "alice"), ("kind", "note")]);
		let partial = HashMap::from([("owner", "alice")]);
		let other = HashMap::from([("owner", "alice"), ("kind", "todo")]);
		assert!(query.matches(|key| full.get(key).copied()));
		assert!(!query.matches(|key| partial.get(key).copied()));
		assert!(!query.matches(|key| other.get(key).copied()));
	}
}
