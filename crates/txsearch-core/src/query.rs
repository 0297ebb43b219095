//! Store query construction
//!
//! Builds the native filter query for date-bounded searches, normalizes
//! caller-supplied DSL fragments, and assembles the paginated, sorted
//! search body.

use crate::codec::format_datetime;
use crate::error::{TransactionError, TransactionResult};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{json, Value};

/// Build the filter query for optional inclusive calendar-date bounds.
///
/// Both bounds present gives a closed range, a single bound an open-ended
/// one, and no bounds a match-everything query. The end bound covers the
/// whole final day.
pub fn date_range_query(start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> Value {
    match (start_date, end_date) {
        (Some(start), Some(end)) => json!({
            "range": {
                "date": {
                    "gte": format_datetime(&start_of_day(start)),
                    "lte": format_datetime(&end_of_day(end)),
                }
            }
        }),
        (Some(start), None) => json!({
            "range": {
                "date": {
                    "gte": format_datetime(&start_of_day(start)),
                }
            }
        }),
        (None, Some(end)) => json!({
            "range": {
                "date": {
                    "lte": format_datetime(&end_of_day(end)),
                }
            }
        }),
        (None, None) => json!({"match_all": {}}),
    }
}

/// Normalize a caller-supplied DSL fragment into a query body.
///
/// The fragment must be valid JSON. A top-level `query` key unwraps to its
/// value, so callers may submit either a bare clause or a full
/// search-request envelope and get the same behavior; any other JSON value
/// is taken whole. A fragment that is not JSON fails before any store call.
pub fn dsl_query(fragment: &str) -> TransactionResult<Value> {
    let parsed: Value =
        serde_json::from_str(fragment).map_err(|e| TransactionError::MalformedQuery {
            message: e.to_string(),
        })?;

    match parsed {
        Value::Object(mut map) if map.contains_key("query") => {
            Ok(map.remove("query").unwrap_or(Value::Null))
        }
        other => Ok(other),
    }
}

/// Assemble the executable search body: query, pagination, and the fixed
/// newest-first sort on the date field.
pub fn search_body(query: &Value, limit: usize, offset: usize) -> Value {
    json!({
        "query": query,
        "from": offset,
        "size": limit,
        "sort": [{"date": {"order": "desc"}}],
    })
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    let last_instant =
        NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN);
    date.and_time(last_instant)
}

// ==================== Tests ====================
