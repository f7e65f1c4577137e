//! Catalog logic layered over the repositories.

pub mod engagement;
pub mod tags;

pub use engagement::{EngagementService, LikeChange};
pub use tags::reconcile;
