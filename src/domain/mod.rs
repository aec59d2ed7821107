//! Transaction domain: the entity, field validation and the request handler
//!
//! The handler owns the storage dependency and is the only place that decides
//! which store calls a request is allowed to make.

pub mod envelope;
pub mod handler;
pub mod transaction;
pub mod validation;
