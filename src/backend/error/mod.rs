//! Backend Error Module
//!
//! Error types of the chat server. Handlers return [`BackendError`] directly
//! and it renders as a JSON error response.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Error type definitions
//! └── conversion.rs - IntoResponse and foreign error conversions
//! ```
//!
//! # Response Format
//!
//! ```json
//! { "error": "Only the author can edit this message", "status": 403 }
//! ```

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use types::BackendError;
