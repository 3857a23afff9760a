use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use time::format_description::well_known::Rfc3339;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::error::TwitterError;
use crate::text::unescape;

pub type JsonObject = Map<String, Value>;

pub fn parse_object(json: &str) -> Result<JsonObject, TwitterError> {
    match serde_json::from_str(json)? {
        Value::Object(obj) => Ok(obj),
        other => Err(TwitterError::Json(format!("expected an object, got {}", kind(&other)))),
    }
}

pub fn parse_array(json: &str) -> Result<Vec<Value>, TwitterError> {
    match serde_json::from_str(json)? {
        Value::Array(arr) => Ok(arr),
        other => Err(TwitterError::Json(format!("expected an array, got {}", kind(&other)))),
    }
}

/// Records with a fixed shape go through serde; a mismatch is a shape error.
pub fn deserialize<T: DeserializeOwned>(value: &Value) -> Result<T, TwitterError> {
    Ok(T::deserialize(value)?)
}

/// Absent keys and JSON nulls are treated alike.
pub fn is_null(obj: &JsonObject, key: &str) -> bool {
    matches!(obj.get(key), None | Some(Value::Null))
}

pub fn get_object<'a>(obj: &'a JsonObject, key: &str) -> Result<&'a JsonObject, TwitterError> {
    match obj.get(key) {
        Some(Value::Object(o)) => Ok(o),
        Some(other) => Err(TwitterError::Json(format!("\"{}\" is {}, not an object", key, kind(other)))),
        None => Err(not_found(key)),
    }
}

pub fn get_array<'a>(obj: &'a JsonObject, key: &str) -> Result<&'a Vec<Value>, TwitterError> {
    match obj.get(key) {
        Some(Value::Array(a)) => Ok(a),
        Some(other) => Err(TwitterError::Json(format!("\"{}\" is {}, not an array", key, kind(other)))),
        None => Err(not_found(key)),
    }
}

pub fn as_object<'a>(value: &'a Value, context: &str) -> Result<&'a JsonObject, TwitterError> {
    match value {
        Value::Object(o) => Ok(o),
        other => Err(TwitterError::Json(format!("element of \"{}\" is {}, not an object", context, kind(other)))),
    }
}

/// Required string value.
pub fn get_str<'a>(obj: &'a JsonObject, key: &str) -> Result<&'a str, TwitterError> {
    match obj.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(TwitterError::Json(format!("\"{}\" is {}, not a string", key, kind(other)))),
        None => Err(not_found(key)),
    }
}

/// Optional value rendered as a string; numbers and booleans are stringified.
pub fn get_raw_string(obj: &JsonObject, key: &str) -> Option<String> {
    match obj.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

pub fn get_unescaped_string(obj: &JsonObject, key: &str) -> Option<String> {
    get_raw_string(obj, key).map(|s| unescape(&s))
}

/// Missing, null and empty values are `None`. Numeric strings are accepted.
pub fn get_u64(obj: &JsonObject, key: &str) -> Result<Option<u64>, TwitterError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => match n.as_u64() {
            Some(v) => Ok(Some(v)),
            // Negative numbers are how the api spells "unset"
            None if n.as_i64().is_some() => Ok(None),
            None => Err(malformed(key, &n.to_string())),
        },
        Some(Value::String(s)) if s.is_empty() || s == "null" => Ok(None),
        Some(Value::String(s)) => s.parse().map(Some).map_err(|_| malformed(key, s)),
        Some(other) => Err(TwitterError::Json(format!("\"{}\" is {}, not a number", key, kind(other)))),
    }
}

/// Required id. A negative number is malformed here rather than unset.
pub fn get_id(obj: &JsonObject, key: &str) -> Result<u64, TwitterError> {
    if let Some(Value::Number(n)) = obj.get(key) {
        if n.as_i64().map_or(false, |v| v < 0) {
            return Err(malformed(key, &n.to_string()));
        }
    }
    get_u64(obj, key)?.ok_or_else(|| not_found(key))
}

pub fn get_i64(obj: &JsonObject, key: &str) -> Result<Option<i64>, TwitterError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_i64().map(Some).ok_or_else(|| malformed(key, &n.to_string())),
        Some(Value::String(s)) if s.is_empty() || s == "null" => Ok(None),
        Some(Value::String(s)) => s.parse().map(Some).map_err(|_| malformed(key, s)),
        Some(other) => Err(TwitterError::Json(format!("\"{}\" is {}, not a number", key, kind(other)))),
    }
}

/// Counts are zero when absent.
pub fn get_count(obj: &JsonObject, key: &str) -> Result<u64, TwitterError> {
    Ok(get_u64(obj, key)?.unwrap_or(0))
}

/// Missing and null are `false`; the string `"true"` is accepted.
pub fn get_bool(obj: &JsonObject, key: &str) -> bool {
    match obj.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Two-element integer arrays such as `indices` and `display_text_range`.
pub fn get_index_pair(obj: &JsonObject, key: &str) -> Result<(usize, usize), TwitterError> {
    let arr = get_array(obj, key)?;
    let at = |i: usize| -> Result<usize, TwitterError> {
        let v = arr
            .get(i)
            .ok_or_else(|| TwitterError::Json(format!("\"{}\" has no element {}", key, i)))?;
        let n = v
            .as_i64()
            .ok_or_else(|| TwitterError::Json(format!("\"{}\"[{}] is {}, not an integer", key, i, kind(v))))?;
        usize::try_from(n).map_err(|_| malformed(key, &n.to_string()))
    };
    Ok((at(0)?, at(1)?))
}

pub fn get_string_array(obj: &JsonObject, key: &str) -> Result<Option<Vec<String>>, TwitterError> {
    if is_null(obj, key) {
        return Ok(None);
    }
    get_array(obj, key)?
        .iter()
        .map(|v| match v {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(TwitterError::Json(format!("element of \"{}\" is {}, not a string", key, kind(other)))),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// Twitter timestamps look like `Wed Aug 27 13:08:45 +0000 2008`. Returns the
/// RFC 3339 rendering and the unix timestamp.
pub fn get_date(obj: &JsonObject, key: &str) -> Result<Option<(String, i64)>, TwitterError> {
    static CREATED_AT_FORMAT: &[FormatItem<'_>] = format_description!(
        "[weekday repr:short] [month repr:short] [day] [hour]:[minute]:[second] [offset_hour sign:mandatory][offset_minute] [year]"
    );

    let time_str = match get_raw_string(obj, key) {
        Some(s) => s,
        None => return Ok(None),
    };
    let time = OffsetDateTime::parse(&time_str, CREATED_AT_FORMAT)
        .map_err(|e| TwitterError::MalformedResponse(format!("\"{}\": {}: {}", key, time_str, e)))?;
    let formatted = time
        .format(&Rfc3339)
        .map_err(|e| TwitterError::MalformedResponse(format!("\"{}\": {}: {}", key, time_str, e)))?;
    Ok(Some((formatted, time.unix_timestamp())))
}

fn not_found(key: &str) -> TwitterError {
    TwitterError::Json(format!("\"{}\" not found", key))
}

fn malformed(key: &str, value: &str) -> TwitterError {
    TwitterError::MalformedResponse(format!("\"{}\" has unexpected value {}", key, value))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
