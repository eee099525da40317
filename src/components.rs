mod failed_actions;
pub use failed_actions::*;
mod hook;
pub use hook::*;
mod offline_indicator;
pub use offline_indicator::*;
mod spinner;
pub use spinner::*;
