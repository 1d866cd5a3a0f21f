//! Route Configuration Module
//!
//! - **`router`** - [`create_router`], every route plus the middleware stack
//! - **`pages`** - plain pages served outside the API (`/unauthorized`)
//!
//! # Routes
//!
//! - `GET /api/messages`, `POST /api/messages`
//! - `PATCH /api/messages/{id}`, `DELETE /api/messages/{id}`
//! - `GET /api/messages/changes` - change feed (SSE)
//! - `GET /api/auth/me`
//! - `GET /unauthorized`
//! - `/static/*` - files from the configured static directory

/// Main router creation
pub mod router;

/// Plain pages
pub mod pages;

pub use router::create_router;
