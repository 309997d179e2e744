//! Default field validation.

use crate::catalog::{PropertyDescriptor, ScalarType};
use chrono::{NaiveDate, NaiveDateTime};
use tablekit_proto::Value;

/// Accepted date layouts.
pub const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y-%m-%d %H:%M:%S"];

/// Check a new value against the property's declared constraints.
///
/// Returns the reason for rejection. Empty values only fail for required
/// properties; the pattern is matched against the start of the value.
pub fn validate_property(prop: &PropertyDescriptor, value: &Value) -> Result<(), String> {
    let Some(text) = value.to_text() else {
        return if prop.is_required() {
            Err("a value is required".to_string())
        } else {
            Ok(())
        };
    };

    if let Some(max) = prop.max_length {
        if text.chars().count() > max as usize {
            return Err(format!("must be at most {max} characters"));
        }
    }

    match prop.scalar {
        scalar if scalar.is_integral() && !is_whole_number(value) => {
            return Err("must be a whole number".to_string());
        }
        ScalarType::Double if !value.is_numeric() => {
            return Err("must be a number".to_string());
        }
        ScalarType::Date if !is_date(&text) => {
            return Err("must be a date (YYYY-MM-DD)".to_string());
        }
        _ => {}
    }

    match prop.compiled_pattern() {
        Some(pattern) if !pattern.is_match(&text) => {
            Err("does not match the expected format".to_string())
        }
        _ => Ok(()),
    }
}

fn is_whole_number(value: &Value) -> bool {
    match value {
        Value::Float64(f) => f.is_finite() && f.fract() == 0.0,
        Value::Bool(_) => false,
        other => other.as_i64().is_some(),
    }
}

fn is_date(text: &str) -> bool {
    NaiveDate::parse_from_str(text, DATE_FORMATS[0]).is_ok()
        || NaiveDateTime::parse_from_str(text, DATE_FORMATS[1]).is_ok()
}
