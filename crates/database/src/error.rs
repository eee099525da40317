#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
	#[error("{0}")]
	Internal(String),
	#[error("{0}")]
	Serialization(String),
	#[error("IndexedDB is not available: {0}")]
	Unavailable(String),
}

#[cfg(target_family = "wasm")]
impl From<idb::Error> for Error {
	fn from(value: idb::Error) -> Self {
		Self::Internal(value.to_string())
	}
}

#[cfg(target_family = "wasm")]
impl From<serde_wasm_bindgen::Error> for Error {
	fn from(value: serde_wasm_bindgen::Error) -> Self {
		Self::Serialization(value.to_string())
	}
}

#[derive(thiserror::Error, Debug, Clone)]
pub enum UpgradeError {
	#[error("{0}")]
	Internal(String),
	#[error(transparent)]
	MissingVersion(#[from] MissingVersion),
}

#[cfg(target_family = "wasm")]
impl From<idb::Error> for UpgradeError {
	fn from(value: idb::Error) -> Self {
		Self::Internal(format!("{value:?}"))
	}
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("Schema is missing version {0}.")]
pub struct MissingVersion(pub u32);

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn missing_version_message() {
		assert_eq!(MissingVersion(4).to_string(), "Schema is missing version 4.");
		let upgrade = UpgradeError::from(MissingVersion(2));
		assert_eq!(upgrade.to_string(), "Schema is missing version 2.");
	}
}
