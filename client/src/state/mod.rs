//! Client state containers.
//!
//! DESIGN
//! ======
//! State types are plain structs mutated through methods that return what
//! the caller must do next (requests to send, effects to apply). Pages wrap
//! them in `RwSignal`s; tests drive them directly.

pub mod query_cache;
pub mod signin;
