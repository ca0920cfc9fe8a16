//! Item resource.
//!
//! # Data Flow
//! ```text
//! POST /api/v1/items
//!     → model.rs (CreateItemRequest::validate → NewItem)
//!     → store.rs (assign id + timestamp, append)
//!
//! GET /api/v1/items
//!     → store.rs (consistent snapshot, insertion order)
//! ```
//!
//! # Design Decisions
//! - Items live in memory only; a restart starts from the sample set
//! - Creates and lists share one store so the resource is consistent

pub mod model;
pub mod store;

pub use model::{CreateItemRequest, InvalidItem, Item, NewItem};
pub use store::ItemStore;
