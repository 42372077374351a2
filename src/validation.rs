//! Sanitization and bounds checks for everything that enters the pipeline.

use serde_json::Value;

use crate::error::ValidationError;

pub const QUERY_MIN_CHARS: usize = 2;
pub const QUERY_MAX_CHARS: usize = 500;
pub const LOCATION_MAX_CHARS: usize = 200;
pub const ENDPOINT_MAX_CHARS: usize = 200;
pub const PLACE_ID_MAX_CHARS: usize = 100;
pub const RADIUS_MIN_METERS: i64 = 1;
pub const RADIUS_MAX_METERS: i64 = 50_000;

fn strip_markup(raw: &str) -> String {
    raw.chars().filter(|c| *c != '<' && *c != '>').collect()
}

fn char_len(raw: &str) -> usize {
    raw.chars().count()
}

pub fn validate_query(raw: Option<&str>) -> Result<String, ValidationError> {
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => {
            return Err(ValidationError::new(
                "query",
                "Query is required and must be a string",
            ));
        }
    };

    if char_len(raw.trim()) < QUERY_MIN_CHARS {
        return Err(ValidationError::new(
            "query",
            "Query must be at least 2 characters long",
        ));
    }

    if char_len(raw) > QUERY_MAX_CHARS {
        return Err(ValidationError::new(
            "query",
            "Query is too long (max 500 characters)",
        ));
    }

    // markup-only input can shrink below the minimum once stripped
    let sanitized = strip_markup(raw).trim().to_string();
    if char_len(&sanitized) < QUERY_MIN_CHARS {
        return Err(ValidationError::new(
            "query",
            "Query must be at least 2 characters long",
        ));
    }

    Ok(sanitized)
}

/// Absent or empty locations are not an error.
pub fn validate_location(raw: Option<&str>) -> Result<Option<String>, ValidationError> {
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(None),
    };

    if char_len(raw) > LOCATION_MAX_CHARS {
        return Err(ValidationError::new(
            "location",
            "Location is too long (max 200 characters)",
        ));
    }

    let sanitized = strip_markup(raw).trim().to_string();
    if sanitized.is_empty() {
        return Ok(None);
    }
    Ok(Some(sanitized))
}

pub fn validate_radius(raw: Option<i64>) -> Result<Option<u32>, ValidationError> {
    match raw {
        None => Ok(None),
        Some(radius) if (RADIUS_MIN_METERS..=RADIUS_MAX_METERS).contains(&radius) => {
            Ok(Some(radius as u32))
        }
        Some(_) => Err(ValidationError::new(
            "radius",
            "Radius must be a number between 1 and 50000 meters",
        )),
    }
}

pub fn validate_origin_destination(
    origin: Option<&str>,
    destination: Option<&str>,
) -> Result<(String, String), ValidationError> {
    let origin = origin.filter(|o| !o.trim().is_empty()).ok_or_else(|| {
        ValidationError::new("origin", "Origin is required and must be a string")
    })?;
    let destination = destination
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| {
            ValidationError::new("destination", "Destination is required and must be a string")
        })?;

    if char_len(origin) > ENDPOINT_MAX_CHARS || char_len(destination) > ENDPOINT_MAX_CHARS {
        return Err(ValidationError::new(
            "origin_destination",
            "Origin and destination must be less than 200 characters",
        ));
    }

    Ok((
        strip_markup(origin).trim().to_string(),
        strip_markup(destination).trim().to_string(),
    ))
}

pub fn validate_place_id(raw: Option<&str>) -> Result<String, ValidationError> {
    let raw = raw
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ValidationError::new("placeId", "Place ID is required"))?;

    if char_len(raw) > PLACE_ID_MAX_CHARS {
        return Err(ValidationError::new(
            "placeId",
            "Place ID is too long (max 100 characters)",
        ));
    }

    Ok(raw.trim().to_string())
}

/// Borrow a JSON body field as text. `null` counts as absent.
pub fn text_field<'a>(
    field: &'static str,
    value: Option<&'a Value>,
) -> Result<Option<&'a str>, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(ValidationError::new(
            field,
            format!("{} must be a string", capitalize(field)),
        )),
    }
}

/// Accepts integer numbers and integer strings.
pub fn radius_field(value: Option<&Value>) -> Result<Option<i64>, ValidationError> {
    let invalid = || {
        ValidationError::new(
            "radius",
            "Radius must be a number between 1 and 50000 meters",
        )
    };
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_i64().map(Some).ok_or_else(invalid),
        Some(Value::String(s)) => s.trim().parse::<i64>().map(Some).map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
