mod catalog;
pub use catalog::*;
mod component;
pub use component::*;
mod manager;
pub use manager::*;
mod root;
pub use root::*;

/// Shared key carrying the active theme between tabs.
pub static STORAGE_KEY: &str = "punk-stack-theme";
/// Attribute on the document root holding the active theme.
pub static ROOT_ATTRIBUTE: &str = "data-theme";

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{0:?} is not a known theme.")]
pub struct InvalidThemeIdentifier(pub String);
