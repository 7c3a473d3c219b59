//! In-memory implementations of the domain seams.

pub mod registry;

pub use registry::{BroadcastReport, Registry};
