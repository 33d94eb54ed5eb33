//! HTTP request handlers.
//!
//! Controllers parse request payloads into engine parameters, call the member engine,
//! and convert the results into DTOs. Access is checked by the API key middleware
//! before any handler runs.

pub mod server_member;

#[cfg(test)]
mod test;
