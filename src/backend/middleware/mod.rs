//! Middleware Module
//!
//! Request processing that runs before the handlers:
//!
//! - **`auth`** - [`identify`] attaches the caller from a bearer token;
//!   [`AuthUser`] extracts it in handlers
//! - **`access`** - [`domain_gate`] redirects signed-in users whose email is
//!   outside the allowed domain to `/unauthorized`
//!
//! `identify` must run before `domain_gate`.

pub mod auth;
pub mod access;

pub use access::{domain_gate, email_allowed, is_static_asset, requires_access_check, UNAUTHORIZED_PATH};
pub use auth::{bearer_token, identify, AuthUser, AuthenticatedUser};
