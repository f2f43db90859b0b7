//! Reusable widget components.

pub mod detail;
pub mod status;

pub use detail::DetailPanel;
pub use status::ListStatus;
