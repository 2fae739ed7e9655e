//! Domain events emitted from business operations.

pub mod event;

pub use event::Event;
