//! Process-wide logging setup.

pub mod subscriber;

pub use subscriber::{DEFAULT_FILTER, init, init_with_default};
