//! An HTTP server exposing database tables as resources that can be filtered, ordered,
//! paginated and projected through the query string.

pub mod error;
pub mod health;
pub mod query;
pub mod routes;
pub mod state;
