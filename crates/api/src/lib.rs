//! HTTP API: router, handlers, and request/response mapping for the shop.

pub mod app;
pub mod middleware;
