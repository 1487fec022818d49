//! Networking modules for gateway HTTP calls.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` performs the REST calls and `types` defines their wire schema.
//! Backend calls go through the gateway's `/api` proxy; auth calls hit the
//! gateway's own `/api/auth` routes.

pub mod api;
pub mod types;
