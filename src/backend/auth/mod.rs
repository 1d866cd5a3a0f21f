//! Authentication Module
//!
//! Identity on the server side.
//!
//! - **`sessions`** - JWT creation and verification
//! - **`directory`** - [`UserDirectory`], the server-side user profiles
//! - **`handlers`** - `GET /api/auth/me`
//!
//! # Flow
//!
//! 1. The client sends `Authorization: Bearer <jwt>`
//! 2. `middleware::auth::identify` verifies it and attaches the caller
//! 3. `middleware::access::domain_gate` checks the caller's directory email
//! 4. Handlers read the caller through the `AuthUser` extractor

/// JWT token generation and validation
pub mod sessions;

/// User profiles
pub mod directory;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use directory::{DirectoryUser, UserDirectory};
pub use handlers::get_me;
pub use sessions::{create_token, verify_token, Claims};
