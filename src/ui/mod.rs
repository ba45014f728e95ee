// This module is only used when the `ui` feature is enabled.
pub mod session;
pub mod view;

pub use session::run_session;
