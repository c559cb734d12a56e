//! In-process adapters that live inside the domain crate for convenience.
//!
//! Used by the api-server and by unit tests. Nothing here touches disk.

pub mod memory_history;
