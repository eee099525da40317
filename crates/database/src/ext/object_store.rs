use super::super::{Error, IndexQuery, IndexType};
use super::QueryExt;
use futures_util::future::LocalBoxFuture;
use wasm_bindgen::JsValue;

fn to_js<V: serde::Serialize>(value: &V) -> Result<JsValue, Error> {
	Ok(value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}

pub trait ObjectStoreExt {
	fn get_record<'store, V>(&'store self, key: &'store str) -> LocalBoxFuture<'store, Result<Option<V>, Error>>
	where
		V: serde::de::DeserializeOwned;

	fn get_all_records<'store, V>(&'store self) -> LocalBoxFuture<'store, Result<Vec<V>, Error>>
	where
		V: serde::de::DeserializeOwned;

	/// Every record matched by `query` through the index it names.
	fn get_all_matching<'store, V>(&'store self, query: &'store IndexQuery) -> LocalBoxFuture<'store, Result<Vec<V>, Error>>
	where
		V: serde::de::DeserializeOwned;

	fn delete_record<'store>(&'store self, key: &'store str) -> LocalBoxFuture<'store, Result<(), Error>>;

	fn clear_records<'store>(&'store self) -> LocalBoxFuture<'store, Result<(), Error>>;

	/// Inserts a record whose key is inline (the store's key path). Fails if the key is taken.
	fn add_record<'store, V>(&'store self, record: &'store V) -> LocalBoxFuture<'store, Result<(), Error>>
	where
		V: serde::Serialize;

	/// Upserts a record whose key is inline (the store's key path).
	fn put_record<'store, V>(&'store self, record: &'store V) -> LocalBoxFuture<'store, Result<(), Error>>
	where
		V: serde::Serialize;

	fn create_index_of<T: IndexType>(&self, params: Option<idb::IndexParams>) -> Result<idb::Index, idb::Error>;
}

impl ObjectStoreExt for idb::ObjectStore {
	fn get_record<'store, V>(&'store self, key: &'store str) -> LocalBoxFuture<'store, Result<Option<V>, Error>>
	where
		V: serde::de::DeserializeOwned,
	{
		Box::pin(async move {
			let Some(record_js) = self.get(idb::Query::from_str_key(key)).await? else {
				return Ok(None);
			};
			Ok(Some(serde_wasm_bindgen::from_value::<V>(record_js)?))
		})
	}

	fn get_all_records<'store, V>(&'store self) -> LocalBoxFuture<'store, Result<Vec<V>, Error>>
	where
		V: serde::de::DeserializeOwned,
	{
		Box::pin(async move {
			let js_values = self.get_all(None, None).await?;
			let mut values = Vec::with_capacity(js_values.len());
			for js_value in js_values {
				values.push(serde_wasm_bindgen::from_value::<V>(js_value)?);
			}
			Ok(values)
		})
	}

	fn get_all_matching<'store, V>(&'store self, query: &'store IndexQuery) -> LocalBoxFuture<'store, Result<Vec<V>, Error>>
	where
		V: serde::de::DeserializeOwned,
	{
		Box::pin(async move {
			let index = self.index(query.name)?;
			let js_values = index.get_all(Some(query.as_query()?), None).await?;
			let mut values = Vec::with_capacity(js_values.len());
			for js_value in js_values {
				values.push(serde_wasm_bindgen::from_value::<V>(js_value)?);
			}
			Ok(values)
		})
	}

	fn delete_record<'store>(&'store self, key: &'store str) -> LocalBoxFuture<'store, Result<(), Error>> {
		Box::pin(async move {
			self.delete(idb::Query::from_str_key(key)).await?;
			Ok(())
		})
	}

	fn clear_records<'store>(&'store self) -> LocalBoxFuture<'store, Result<(), Error>> {
		Box::pin(async move {
			self.clear().await?;
			Ok(())
		})
	}

	fn add_record<'store, V>(&'store self, record: &'store V) -> LocalBoxFuture<'store, Result<(), Error>>
	where
		V: serde::Serialize,
	{
		Box::pin(async move {
			let value = to_js(record)?;
			let _ = self.add(&value, None).await?;
			Ok(())
		})
	}

	fn put_record<'store, V>(&'store self, record: &'store V) -> LocalBoxFuture<'store, Result<(), Error>>
	where
		V: serde::Serialize,
	{
		Box::pin(async move {
			let value = to_js(record)?;
			let _ = self.put(&value, None).await?;
			Ok(())
		})
	}

	fn create_index_of<T: IndexType>(&self, params: Option<idb::IndexParams>) -> Result<idb::Index, idb::Error> {
		self.create_index(T::name(), T::key_path(), params)
	}
}
