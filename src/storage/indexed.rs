use super::{
	queue::{QueuedAction, StatusIndex},
	settings::{SettingKey, SettingRecord},
	theme::ThemeRecord,
	Backend, Error,
};
use database::{Client, IndexQuery, MissingVersion, ObjectStoreExt, Record, Schema};
use futures_util::future::LocalBoxFuture;
use serde_json::Value;

/// The IndexedDB-backed store. Each call runs in its own transaction.
#[derive(Clone, PartialEq)]
pub struct IndexedBackend(Client);

impl IndexedBackend {
	pub async fn open(name: &str) -> Result<Self, Error> {
		let client = Client::open::<SchemaVersion>(name).await?;
		Ok(Self(client))
	}
}

impl Backend for IndexedBackend {
	fn name(&self) -> &'static str {
		"indexeddb"
	}

	fn get<'a>(&'a self, store: &'static str, key: &'a str) -> LocalBoxFuture<'a, Result<Option<Value>, Error>> {
		Box::pin(async move {
			let transaction = self.0.read(&[store])?;
			let object_store = transaction.store(store)?;
			Ok(object_store.get_record::<Value>(key).await?)
		})
	}

	fn put<'a>(&'a self, store: &'static str, _key: &'a str, value: Value) -> LocalBoxFuture<'a, Result<(), Error>> {
		Box::pin(async move {
			let transaction = self.0.write(&[store])?;
			let object_store = transaction.store(store)?;
			object_store.put_record(&value).await?;
			transaction.commit().await?;
			Ok(())
		})
	}

	fn add<'a>(&'a self, store: &'static str, key: &'a str, value: Value) -> LocalBoxFuture<'a, Result<(), Error>> {
		Box::pin(async move {
			let transaction = self.0.write(&[store])?;
			let object_store = transaction.store(store)?;
			if object_store.get_record::<Value>(key).await?.is_some() {
				return Err(Error::KeyExists(key.to_owned()));
			}
			object_store.add_record(&value).await?;
			transaction.commit().await?;
			Ok(())
		})
	}

	fn delete<'a>(&'a self, store: &'static str, key: &'a str) -> LocalBoxFuture<'a, Result<(), Error>> {
		Box::pin(async move {
			let transaction = self.0.write(&[store])?;
			let object_store = transaction.store(store)?;
			object_store.delete_record(key).await?;
			transaction.commit().await?;
			Ok(())
		})
	}

	fn get_all<'a>(&'a self, store: &'static str) -> LocalBoxFuture<'a, Result<Vec<Value>, Error>> {
		Box::pin(async move {
			let transaction = self.0.read(&[store])?;
			let object_store = transaction.store(store)?;
			Ok(object_store.get_all_records::<Value>().await?)
		})
	}

	fn get_all_by_index<'a>(
		&'a self,
		store: &'static str,
		query: IndexQuery,
	) -> LocalBoxFuture<'a, Result<Vec<Value>, Error>> {
		Box::pin(async move {
			let transaction = self.0.read(&[store])?;
			let object_store = transaction.store(store)?;
			Ok(object_store.get_all_matching::<Value>(&query).await?)
		})
	}

	fn clear<'a>(&'a self, stores: &'a [&'static str]) -> LocalBoxFuture<'a, Result<(), Error>> {
		Box::pin(async move {
			// All stores or none.
			let transaction = self.0.write(stores)?;
			for store in stores {
				transaction.store(store)?.clear_records().await?;
			}
			transaction.commit().await?;
			Ok(())
		})
	}
}

/// The schema for the `PunkStackDB` client database.
/// Use with `Client::open`.
pub enum SchemaVersion {
	Version1 = 1,
}

impl TryFrom<u32> for SchemaVersion {
	type Error = MissingVersion;

	fn try_from(value: u32) -> Result<Self, Self::Error> {
		match value {
			1 => Ok(Self::Version1),
			_ => Err(MissingVersion(value)),
		}
	}
}

impl Schema for SchemaVersion {
	fn latest() -> u32 {
		Self::Version1 as u32
	}

	fn apply(&self, database: &idb::Database, _transaction: Option<&idb::Transaction>) -> Result<(), idb::Error> {
		match self {
			Self::Version1 => {
				{
					let mut params = idb::ObjectStoreParams::new();
					params.key_path(Some(idb::KeyPath::new_single("id")));
					database.create_object_store(ThemeRecord::store_id(), params)?;
				}
				{
					let mut params = idb::ObjectStoreParams::new();
					params.key_path(Some(idb::KeyPath::new_single("id")));
					let store = database.create_object_store(QueuedAction::store_id(), params)?;
					store.create_index_of::<StatusIndex>(None)?;
					store.create_index("timestamp", idb::KeyPath::new_single("timestamp"), None)?;
				}
				{
					let mut params = idb::ObjectStoreParams::new();
					params.key_path(Some(idb::KeyPath::new_single("id")));
					let store = database.create_object_store(SettingRecord::store_id(), params)?;
					store.create_index_of::<SettingKey>(Some({
						let mut params = idb::IndexParams::new();
						params.unique(true);
						params
					}))?;
				}
			}
		}
		Ok(())
	}
}
