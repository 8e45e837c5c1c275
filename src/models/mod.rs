//! Shared types: the event entity and ID aliases. Use date types (chrono) for timestamps.

pub mod event;
pub mod ids;

pub use event::{Event, EventPatch, NewEvent};
pub use ids::EventId;
