//! Thin typed layer over IndexedDB.
//!
//! Record, schema and index descriptions are target independent so that callers can
//! describe their tables once and reuse the descriptions for non-browser backends.
//! Everything that talks to `idb` only exists on wasm targets.

mod record;
pub use record::*;
mod error;
pub use error::*;
mod index;
pub use index::*;

#[cfg(target_family = "wasm")]
mod schema;
#[cfg(target_family = "wasm")]
pub use schema::*;
#[cfg(target_family = "wasm")]
mod client;
#[cfg(target_family = "wasm")]
pub use client::*;
#[cfg(target_family = "wasm")]
mod ext;
#[cfg(target_family = "wasm")]
pub use ext::*;
