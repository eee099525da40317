use super::{Error, MissingVersion, Schema, UpgradeError};
use idb::{TransactionMode, VersionChangeEvent};
use std::rc::Rc;

/// An open IndexedDB database. Clones share one connection, which is closed when the last
/// clone is dropped.
#[derive(Clone)]
pub struct Client(Rc<idb::Database>);

impl PartialEq for Client {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl Client {
	/// Opens `name` at the latest version of `V`, running any upgrades on the way.
	/// Fails with [`Error::Unavailable`] when the browser does not expose IndexedDB
	/// (private browsing modes, disabled storage policies, no window).
	pub async fn open<V>(name: &str) -> Result<Self, Error>
	where
		V: 'static + Schema + TryFrom<u32, Error = MissingVersion>,
	{
		let unavailable = |err: idb::Error| Error::Unavailable(err.to_string());
		let factory = idb::Factory::new().map_err(unavailable)?;
		let mut request = factory.open(name, Some(V::latest())).map_err(unavailable)?;
		let database_name = name.to_owned();
		request.on_upgrade_needed(move |event| {
			if let Err(err) = Self::upgrade::<V>(&event) {
				log::error!(target: "database::client", "Failed to upgrade {database_name:?}: {err:?}");
			}
		});
		let database = request.await.map_err(unavailable)?;
		log::debug!(target: "database::client", "Opened {name:?} at v{}", V::latest());
		Ok(Self(Rc::new(database)))
	}

	fn upgrade<V>(event: &VersionChangeEvent) -> Result<(), UpgradeError>
	where
		V: 'static + Schema + TryFrom<u32, Error = MissingVersion>,
	{
		let database = event.database()?;
		let transaction = event.transaction()?;
		// 0 when the database is being created.
		let from = event.old_version()?;
		let Some(to) = event.new_version()? else {
			return Ok(());
		};
		for version in (from + 1)..=to {
			V::try_from(version)?.apply(&database, transaction.as_ref())?;
		}
		Ok(())
	}

	pub fn read(&self, stores: &[&str]) -> Result<Transaction, Error> {
		Ok(Transaction(self.0.transaction(stores, TransactionMode::ReadOnly)?))
	}

	pub fn write(&self, stores: &[&str]) -> Result<Transaction, Error> {
		Ok(Transaction(self.0.transaction(stores, TransactionMode::ReadWrite)?))
	}
}

impl Drop for Client {
	fn drop(&mut self) {
		if Rc::strong_count(&self.0) <= 1 {
			self.0.close();
		}
	}
}

/// A transaction over a fixed set of object stores.
pub struct Transaction(idb::Transaction);

impl Transaction {
	pub fn store(&self, name: &str) -> Result<idb::ObjectStore, Error> {
		Ok(self.0.object_store(name)?)
	}

	pub async fn commit(self) -> Result<(), Error> {
		Ok(self.0.commit().await?)
	}
}
