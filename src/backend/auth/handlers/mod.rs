//! Authentication Handlers
//!
//! - **`me`** - `GET /api/auth/me`, the caller's identity

pub mod me;

pub use me::get_me;
