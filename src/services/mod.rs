//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the sign-in flow, per-browser sessions, and profile
//! loading so route handlers stay focused on cookies, redirects, and
//! rendering.

pub mod auth;
pub mod profiles;
pub mod session;
