//! REST API tests, driven through the router with `tower::ServiceExt::oneshot`

pub mod access_test;
