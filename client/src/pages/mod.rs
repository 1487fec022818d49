//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration (network calls, navigation) and
//! delegates decisions to the `state` machines.

pub mod home;
pub mod signin;
