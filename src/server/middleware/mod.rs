//! Request guards for the HTTP API.

pub mod api_key;
