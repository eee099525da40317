mod object_store;
pub use object_store::*;
mod query;
pub use query::*;
