//! Data transfer objects serialized over the HTTP endpoints.

pub mod api;
