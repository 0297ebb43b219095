//! Document codec
//!
//! Converts between the typed transaction record and the loosely-typed
//! document representation the store returns and accepts. Decoding is
//! tolerant: any subset of keys may be absent. A document whose shape cannot
//! be interpreted at all fails with a decode error.

use crate::error::{TransactionError, TransactionResult};
use crate::model::{Merchant, Transaction};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
// Stores echo minute-precision timestamps without a seconds component
const DATETIME_FORMAT_SHORT: &str = "%Y-%m-%dT%H:%M";

/// Decode a raw store document into a transaction.
///
/// `None` and JSON null decode to `None`. An object decodes field by field;
/// a missing key maps to `None` in the record. Any other JSON value is a
/// decode error, as is a field value of the wrong shape.
pub fn decode(source: Option<&Value>) -> TransactionResult<Option<Transaction>> {
    let value = match source {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };

    let map = value.as_object().ok_or_else(|| {
        decode_error(format!(
            "cannot convert {} to a transaction document",
            type_name(value)
        ))
    })?;

    Ok(Some(Transaction {
        id: string_field(map.get("id"), "id")?,
        date: date_field(map.get("date"))?,
        amount: amount_field(map.get("amount"))?,
        description: string_field(map.get("description"), "description")?,
        merchant: merchant_field(map.get("merchant"))?,
    }))
}

/// Encode a transaction into the document the store persists.
///
/// Absent fields are written as explicit nulls; the amount travels as its
/// decimal string form and the date as offset-free ISO-8601 text, so the
/// round trip is faithful.
pub fn encode(transaction: &Transaction) -> Value {
    json!({
        "id": transaction.id,
        "date": transaction.date.as_ref().map(format_datetime),
        "amount": transaction.amount.as_ref().map(|amount| amount.to_string()),
        "description": transaction.description,
        "merchant": transaction.merchant.as_ref().map(|merchant| json!({
            "name": merchant.name,
            "category": merchant.category,
        })),
    })
}

/// Parse the ISO-8601-like datetime text carried in documents
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, DATETIME_FORMAT_SHORT))
        .ok()
}

/// Format a datetime into the text form documents carry
pub fn format_datetime(datetime: &NaiveDateTime) -> String {
    datetime.format(DATETIME_FORMAT).to_string()
}

fn string_field(value: Option<&Value>, field: &str) -> TransactionResult<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(other) => Err(decode_error(format!(
            "field {} is not a string: {}",
            field,
            type_name(other)
        ))),
    }
}

fn date_field(value: Option<&Value>) -> TransactionResult<Option<NaiveDateTime>> {
    let text = match string_field(value, "date")? {
        None => return Ok(None),
        Some(text) => text,
    };

    match parse_datetime(&text) {
        Some(datetime) => Ok(Some(datetime)),
        None => Err(decode_error(format!("cannot parse date: {}", text))),
    }
}

fn amount_field(value: Option<&Value>) -> TransactionResult<Option<Decimal>> {
    let text = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(text)) => text.clone(),
        // Numbers are taken via their literal text, never through f64
        Some(Value::Number(number)) => number.to_string(),
        Some(other) => {
            return Err(decode_error(format!(
                "field amount is not a decimal: {}",
                type_name(other)
            )))
        }
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map(Some)
        .map_err(|_| decode_error(format!("cannot parse amount: {}", text)))
}

fn merchant_field(value: Option<&Value>) -> TransactionResult<Option<Merchant>> {
    let map = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(decode_error(format!(
                "field merchant is not an object: {}",
                type_name(other)
            )))
        }
    };

    Ok(Some(Merchant {
        name: string_field(map.get("name"), "merchant.name")?,
        category: string_field(map.get("category"), "merchant.category")?,
    }))
}

fn decode_error(reason: String) -> TransactionError {
    TransactionError::Decode { reason }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ==================== Tests ====================
