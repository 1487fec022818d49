//! Session-establishing services used by the auth routes and the route gate.
//!
//! ARCHITECTURE
//! ============
//! Service modules own outbound calls and session bookkeeping so route
//! handlers can stay focused on protocol translation and cookie plumbing.

pub mod credentials;
pub mod github;
pub mod session;
