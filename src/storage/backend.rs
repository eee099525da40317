use super::Error;
use database::IndexQuery;
use futures_util::future::LocalBoxFuture;
use serde_json::Value;

/// Object-safe access to the durable partitions. Records cross this boundary as JSON values;
/// the typed view lives in [`Database`](super::Database).
pub trait Backend {
	fn name(&self) -> &'static str;

	/// True if the data lives only as long as this process (nothing survives a reload).
	fn is_volatile(&self) -> bool {
		false
	}

	fn get<'a>(&'a self, store: &'static str, key: &'a str) -> LocalBoxFuture<'a, Result<Option<Value>, Error>>;

	/// Inserts or overwrites the record at `key`.
	fn put<'a>(&'a self, store: &'static str, key: &'a str, value: Value) -> LocalBoxFuture<'a, Result<(), Error>>;

	/// Inserts the record at `key`, failing with [`Error::KeyExists`] if the key is taken.
	fn add<'a>(&'a self, store: &'static str, key: &'a str, value: Value) -> LocalBoxFuture<'a, Result<(), Error>>;

	fn delete<'a>(&'a self, store: &'static str, key: &'a str) -> LocalBoxFuture<'a, Result<(), Error>>;

	fn get_all<'a>(&'a self, store: &'static str) -> LocalBoxFuture<'a, Result<Vec<Value>, Error>>;

	/// Records whose indexed fields equal the query's values. Order is unspecified.
	fn get_all_by_index<'a>(
		&'a self,
		store: &'static str,
		query: IndexQuery,
	) -> LocalBoxFuture<'a, Result<Vec<Value>, Error>>;

	/// Empties every listed store, or none of them.
	fn clear<'a>(&'a self, stores: &'a [&'static str]) -> LocalBoxFuture<'a, Result<(), Error>>;
}
