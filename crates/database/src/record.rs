// The data type for all entries in a given ObjectStore.
pub trait Record: serde::Serialize {
	fn store_id() -> &'static str;

	fn key(&self) -> Option<String> {
		None
	}
}
