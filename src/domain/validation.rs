//! Field validators shared by every operation that accepts transaction input
//!
//! Bodies are split into raw JSON fields first and each field is decoded by its
//! own validator, so a bad value (e.g. an out-of-range number) is reported
//! against the field it belongs to.

use std::collections::HashMap;

use serde_json::value::RawValue;

use crate::{
    domain::transaction::{NewTransaction, TransactionId},
    errors::AppError,
};

pub const INVALID_ID: &str = "Invalid transaction ID";
pub const NAME_REQUIRED: &str = "Transaction name is required";
pub const AMOUNT_NOT_POSITIVE: &str = "Amount must be a positive number";
pub const CATEGORY_NOT_STRING: &str = "Category must be a string";
pub const BODY_NOT_OBJECT: &str = "Request body must be a JSON object";

pub type RawFields = HashMap<String, Box<RawValue>>;

/// Accepts only plain decimal digits that fit an `i64` and are above zero.
pub fn parse_id(raw: &str) -> Result<TransactionId, AppError> {
    if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(AppError::validation(INVALID_ID));
    }

    match raw.parse::<TransactionId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::validation(INVALID_ID)),
    }
}

pub fn validate_name(value: Option<&RawValue>) -> Result<String, AppError> {
    value
        .and_then(|raw| serde_json::from_str::<String>(raw.get()).ok())
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| AppError::validation(NAME_REQUIRED))
}

pub fn validate_amount(value: Option<&RawValue>) -> Result<f64, AppError> {
    let amount = value
        .and_then(|raw| serde_json::from_str::<f64>(raw.get()).ok())
        .ok_or_else(|| AppError::validation(AMOUNT_NOT_POSITIVE))?;

    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::validation(AMOUNT_NOT_POSITIVE));
    }

    Ok(amount)
}

/// Absent, `null` and `""` all collapse to `None`.
pub fn normalize_category(value: Option<&RawValue>) -> Result<Option<String>, AppError> {
    let Some(raw) = value else {
        return Ok(None);
    };

    let category = serde_json::from_str::<Option<String>>(raw.get())
        .map_err(|_| AppError::validation(CATEGORY_NOT_STRING))?;

    Ok(category.filter(|category| !category.is_empty()))
}

pub fn parse_body(body: &[u8]) -> Result<RawFields, AppError> {
    serde_json::from_slice(body).map_err(|_| AppError::validation(BODY_NOT_OBJECT))
}

/// Validates a raw request body in the order name, amount, category.
pub fn validate_transaction(body: &[u8]) -> Result<NewTransaction, AppError> {
    let fields = parse_body(body)?;

    let name = validate_name(fields.get("name").map(|raw| &**raw))?;
    let amount = validate_amount(fields.get("amount").map(|raw| &**raw))?;
    let category = normalize_category(fields.get("category").map(|raw| &**raw))?;

    Ok(NewTransaction {
        name,
        amount,
        category,
    })
}
