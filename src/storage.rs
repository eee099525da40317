//! The durable store: three partitions (theme, queue, settings) behind a [`Backend`].
//!
//! [`Database`] is the typed facade the rest of the client uses. When the backend reports
//! [`Error::StorageUnavailable`], the facade logs it, swaps in a [`MemoryBackend`] and retries
//! the operation there, so callers keep working (without persistence across reloads).
use crate::{scheduler::Clock, theme::ThemeId};
use database::{IndexQuery, Record};
use futures_util::{future::LocalBoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

mod backend;
pub use backend::*;
mod memory;
pub use memory::*;
#[cfg(target_family = "wasm")]
mod indexed;
#[cfg(target_family = "wasm")]
pub use indexed::*;
pub mod queue;
pub use queue::{ActionStatus, ActionType, QueuedAction};
pub mod settings;
pub use settings::SettingRecord;
pub mod theme;
pub use theme::ThemeRecord;

pub const THEME_STORE: &str = "theme";
pub const QUEUE_STORE: &str = "queue";
pub const SETTINGS_STORE: &str = "settings";
pub const ALL_STORES: [&str; 3] = [THEME_STORE, QUEUE_STORE, SETTINGS_STORE];

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
	#[error("Storage is unavailable: {0}")]
	StorageUnavailable(String),
	#[error("A record with key {0:?} already exists.")]
	KeyExists(String),
	#[error("{0}")]
	Internal(String),
	#[error("{0}")]
	Serialization(String),
}

impl From<database::Error> for Error {
	fn from(value: database::Error) -> Self {
		match value {
			// Any IndexedDB failure at runtime leaves the store unusable for this session.
			database::Error::Unavailable(msg) | database::Error::Internal(msg) => Self::StorageUnavailable(msg),
			database::Error::Serialization(msg) => Self::Serialization(msg),
		}
	}
}

impl From<serde_json::Error> for Error {
	fn from(value: serde_json::Error) -> Self {
		Self::Serialization(value.to_string())
	}
}

#[derive(Clone)]
pub struct Database {
	backend: Rc<RefCell<Rc<dyn Backend>>>,
	clock: Rc<dyn Clock>,
}

impl PartialEq for Database {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.backend, &other.backend)
	}
}

impl std::fmt::Debug for Database {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Database").field("backend", &self.backend_name()).finish()
	}
}

impl Database {
	/// Opens the IndexedDB database `name`, starting in memory if it cannot be opened.
	#[cfg(target_family = "wasm")]
	pub async fn open(name: &str, clock: Rc<dyn Clock>) -> Self {
		match IndexedBackend::open(name).await {
			Ok(backend) => Self::with_backend(Rc::new(backend), clock),
			Err(err) => {
				log::warn!(target: "storage", "Failed to open {name:?}, data will not persist: {err}");
				Self::in_memory(clock)
			}
		}
	}

	#[cfg(not(target_family = "wasm"))]
	pub async fn open(name: &str, clock: Rc<dyn Clock>) -> Self {
		log::info!(target: "storage", "IndexedDB does not exist on this target, {name:?} will be held in memory");
		Self::in_memory(clock)
	}

	pub fn in_memory(clock: Rc<dyn Clock>) -> Self {
		Self::with_backend(Rc::new(MemoryBackend::new()), clock)
	}

	pub fn with_backend(backend: Rc<dyn Backend>, clock: Rc<dyn Clock>) -> Self {
		Self {
			backend: Rc::new(RefCell::new(backend)),
			clock,
		}
	}

	pub fn backend_name(&self) -> &'static str {
		self.backend.borrow().name()
	}

	/// False once the store has degraded to memory (or never had a durable backend).
	pub fn is_persistent(&self) -> bool {
		!self.backend.borrow().is_volatile()
	}

	pub fn now(&self) -> i64 {
		self.clock.now()
	}

	fn current(&self) -> Rc<dyn Backend> {
		self.backend.borrow().clone()
	}

	/// Replaces `failed` with a memory backend, unless another operation already did.
	fn degrade(&self, failed: &Rc<dyn Backend>) -> Rc<dyn Backend> {
		let mut slot = self.backend.borrow_mut();
		if std::ptr::eq(Rc::as_ptr(&*slot) as *const (), Rc::as_ptr(failed) as *const ()) {
			*slot = Rc::new(MemoryBackend::new());
		}
		slot.clone()
	}

	async fn run<'a, T>(
		&self,
		operation: &'static str,
		op: impl Fn(Rc<dyn Backend>) -> LocalBoxFuture<'a, Result<T, Error>>,
	) -> Result<T, Error> {
		let backend = self.current();
		match op(backend.clone()).await {
			Err(Error::StorageUnavailable(reason)) if !backend.is_volatile() => {
				log::warn!(
					target: "storage",
					"{} failed during {operation} ({reason}), continuing without persistence",
					backend.name()
				);
				let fallback = self.degrade(&backend);
				op(fallback).await
			}
			result => result,
		}
	}

	async fn get_record<R: Record + DeserializeOwned>(&self, key: &str) -> Result<Option<R>, Error> {
		let store = R::store_id();
		let value = self
			.run("get", |backend| async move { backend.get(store, key).await }.boxed_local())
			.await?;
		match value {
			Some(value) => Ok(Some(serde_json::from_value(value)?)),
			None => Ok(None),
		}
	}

	async fn put_record<R: Record>(&self, record: &R) -> Result<(), Error> {
		let store = R::store_id();
		let key = record_key(record)?;
		let value = serde_json::to_value(record)?;
		self.run("put", |backend| {
			let key = key.clone();
			let value = value.clone();
			async move { backend.put(store, &key, value).await }.boxed_local()
		})
		.await
	}

	async fn delete_record(&self, store: &'static str, key: &str) -> Result<(), Error> {
		self.run("delete", |backend| async move { backend.delete(store, key).await }.boxed_local())
			.await
	}

	pub async fn save_theme(&self, theme: ThemeId) -> Result<ThemeRecord, Error> {
		let record = ThemeRecord::new(theme, self.now());
		self.put_record(&record).await?;
		Ok(record)
	}

	pub async fn get_theme(&self) -> Result<Option<ThemeRecord>, Error> {
		self.get_record::<ThemeRecord>(ThemeRecord::ID).await
	}

	/// Inserts a new action, failing with [`Error::KeyExists`] if its id is taken.
	pub async fn add_action(&self, action: &QueuedAction) -> Result<(), Error> {
		let value = serde_json::to_value(action)?;
		self.run("add", |backend| {
			let value = value.clone();
			async move { backend.add(QUEUE_STORE, &action.id, value).await }.boxed_local()
		})
		.await
	}

	pub async fn get_action(&self, id: &str) -> Result<Option<QueuedAction>, Error> {
		self.get_record::<QueuedAction>(id).await
	}

	pub async fn put_action(&self, action: &QueuedAction) -> Result<(), Error> {
		self.put_record(action).await
	}

	/// Applies `mutate` to the stored action and writes it back.
	/// Returns the updated action, or None if no action has the id.
	pub async fn update_action(
		&self,
		id: &str,
		mutate: impl FnOnce(&mut QueuedAction),
	) -> Result<Option<QueuedAction>, Error> {
		let Some(mut action) = self.get_action(id).await? else {
			return Ok(None);
		};
		mutate(&mut action);
		self.put_action(&action).await?;
		Ok(Some(action))
	}

	pub async fn remove_action(&self, id: &str) -> Result<(), Error> {
		self.delete_record(QUEUE_STORE, id).await
	}

	/// Every queued action with `status`, in no particular order.
	pub async fn queued_actions(&self, status: ActionStatus) -> Result<Vec<QueuedAction>, Error> {
		let query = IndexQuery::of(&queue::StatusIndex(status));
		let values = self
			.run("list", |backend| {
				let query = query.clone();
				async move { backend.get_all_by_index(QUEUE_STORE, query).await }.boxed_local()
			})
			.await?;
		Ok(decode_all(QUEUE_STORE, values))
	}

	pub async fn clear_queue(&self) -> Result<(), Error> {
		self.run("clear", |backend| async move { backend.clear(&[QUEUE_STORE]).await }.boxed_local())
			.await
	}

	pub async fn save_setting(&self, key: &str, value: Value) -> Result<SettingRecord, Error> {
		let record = SettingRecord::new(key, value, self.now());
		self.put_record(&record).await?;
		Ok(record)
	}

	pub async fn get_setting(&self, key: &str) -> Result<Option<Value>, Error> {
		let record = self.get_record::<SettingRecord>(key).await?;
		Ok(record.map(|record| record.value))
	}

	pub async fn get_all_settings(&self) -> Result<BTreeMap<String, Value>, Error> {
		let values = self
			.run("list", |backend| async move { backend.get_all(SETTINGS_STORE).await }.boxed_local())
			.await?;
		let records = decode_all::<SettingRecord>(SETTINGS_STORE, values);
		Ok(records.into_iter().map(|record| (record.key, record.value)).collect())
	}

	/// Empties the theme, queue and settings partitions together.
	pub async fn clear_all_data(&self) -> Result<(), Error> {
		self.run("clear", |backend| async move { backend.clear(&ALL_STORES).await }.boxed_local())
			.await?;
		log::info!(target: "storage", "Cleared all stored data");
		Ok(())
	}
}

fn record_key<R: Record>(record: &R) -> Result<String, Error> {
	record
		.key()
		.ok_or_else(|| Error::Internal(format!("record in {:?} has no key", R::store_id())))
}

/// Records which no longer match their type are skipped rather than failing the whole read.
fn decode_all<T: DeserializeOwned>(store: &str, values: Vec<Value>) -> Vec<T> {
	let mut records = Vec::with_capacity(values.len());
	for value in values {
		match serde_json::from_value::<T>(value) {
			Ok(record) => records.push(record),
			Err(err) => log::warn!(target: "storage", "Skipping malformed record in {store:?}: {err}"),
		}
	}
	records
}
