//! API Module
//!
//! HTTP handlers and routing for the cache's demo REST API.
//!
//! # Endpoints
//! - `GET /` - Demo round trip of a fixed key
//! - `PUT /set` - Store a key-value pair
//! - `GET /get/:key` - Retrieve a value by key
//! - `POST /refresh/:key` - Renew a key's sliding expiration
//! - `DELETE /del/:key` - Delete a key
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
