//! HTTP transport for the transaction API
//!
//! Thin axum handlers: extract the path id and raw body, call the
//! [`TransactionHandler`](crate::domain::handler::TransactionHandler), wrap the result in the
//! response envelope.

pub mod handlers;
