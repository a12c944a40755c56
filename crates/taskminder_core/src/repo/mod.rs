//! Persistence adapter: durable named blobs and the typed records built on them.
//!
//! # Responsibility
//! - Define the key-value contract the store persists through.
//! - Keep SQL and serialization details out of the store.
//!
//! # Invariants
//! - Read paths reject malformed or invariant-violating records instead of
//!   masking them; the store decides how to fall back.

pub mod kv_repo;
pub mod state_repo;
