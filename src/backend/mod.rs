//! Development room backend
//!
//! In-memory rooms served over REST by [`crate::http`] and over the channel by
//! [`crate::nats::responder`], so a client can be exercised end to end without
//! the production backend.

mod registry;

pub use registry::{RegistryError, RoomLimits, RoomRegistry};
