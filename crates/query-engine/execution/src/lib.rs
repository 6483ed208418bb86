//! Run rendered statements against the database and decode the rows they return.

pub mod error;
pub mod metrics;
pub mod query;
