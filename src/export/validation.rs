//! Export request validation.
//!
//! Every parameter is checked before the store is queried, so a malformed
//! request never produces a partial body.

use std::collections::HashMap;

use super::types::{ExportFormat, ExportRequest};
use crate::error_handling::ValidationError;

const TRUE_VALUES: &[&str] = &["true", "t", "yes", "y", "on", "1"];
const FALSE_VALUES: &[&str] = &["false", "f", "no", "n", "off", "0"];

/// Present and non-blank parameter value, trimmed.
fn present<'a>(params: &'a HashMap<String, String>, field: &str) -> Option<&'a str> {
    params
        .get(field)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

fn parse_non_negative(field: &'static str, value: &str) -> Result<u64, ValidationError> {
    match value.parse::<i128>() {
        Ok(n) if n < 0 => Err(ValidationError::new(field, "Must be a non-negative integer")),
        Ok(n) => u64::try_from(n).map_err(|_| ValidationError::new(field, "Integer out of range")),
        Err(_) => Err(ValidationError::new(field, "Invalid integer")),
    }
}

/// Parses `offset`: a non-negative integer, 0 when absent.
pub fn parse_offset(value: Option<&str>) -> Result<u64, ValidationError> {
    value.map_or(Ok(0), |v| parse_non_negative("offset", v))
}

/// Parses `limit`: a non-negative integer, unbounded when absent.
pub fn parse_limit(value: Option<&str>) -> Result<Option<u64>, ValidationError> {
    value.map(|v| parse_non_negative("limit", v)).transpose()
}

/// Parses `bom`: a case-insensitive boolean, false when absent.
pub fn parse_bom(value: Option<&str>) -> Result<bool, ValidationError> {
    let Some(value) = value else {
        return Ok(false);
    };
    let lower = value.to_ascii_lowercase();
    if TRUE_VALUES.contains(&lower.as_str()) {
        Ok(true)
    } else if FALSE_VALUES.contains(&lower.as_str()) {
        Ok(false)
    } else {
        Err(ValidationError::new("bom", "Invalid boolean"))
    }
}

/// Parses `format`: one of the supported formats, csv when absent.
pub fn parse_format(value: Option<&str>) -> Result<ExportFormat, ValidationError> {
    let Some(value) = value else {
        return Ok(ExportFormat::Csv);
    };
    ExportFormat::from_param(value).ok_or_else(|| {
        ValidationError::new(
            "format",
            format!("must be one of {}", ExportFormat::supported()),
        )
    })
}

impl ExportRequest {
    /// Validates the query parameters of an export request.
    ///
    /// Fields are checked in the order offset, limit, bom, format; the first
    /// failure is reported.
    ///
    /// # Errors
    ///
    /// Returns a field-qualified [`ValidationError`].
    pub fn from_params(
        resource_id: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ValidationError> {
        let offset = parse_offset(present(params, "offset"))?;
        let limit = parse_limit(present(params, "limit"))?;
        let bom = parse_bom(present(params, "bom"))?;
        let format = parse_format(present(params, "format"))?;
        Ok(Self {
            resource_id: resource_id.into(),
            offset,
            limit,
            format,
            bom,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let request = ExportRequest::from_params("r", &HashMap::new()).expect("valid");
        assert_eq!(request.offset, 0);
        assert_eq!(request.limit, None);
        assert!(!request.bom);
        assert_eq!(request.format, ExportFormat::Csv);
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let request =
            ExportRequest::from_params("r", &params(&[("offset", " "), ("limit", "")]))
                .expect("valid");
        assert_eq!(request.offset, 0);
        assert_eq!(request.limit, None);
    }

    #[test]
    fn test_all_fields() {
        let request = ExportRequest::from_params(
            "r",
            &params(&[
                ("offset", "10"),
                ("limit", "0"),
                ("bom", "True"),
                ("format", "xml"),
            ]),
        )
        .expect("valid");
        assert_eq!(request.offset, 10);
        assert_eq!(request.limit, Some(0));
        assert!(request.bom);
        assert_eq!(request.format, ExportFormat::Xml);
    }

    #[test]
    fn test_offset_errors_are_field_qualified() {
        let err = parse_offset(Some("abc")).expect_err("invalid");
        assert_eq!(err.to_string(), "offset: Invalid integer");
        let err = parse_offset(Some("-1")).expect_err("negative");
        assert_eq!(err.to_string(), "offset: Must be a non-negative integer");
    }

    #[test]
    fn test_limit_errors_are_field_qualified() {
        let err = parse_limit(Some("1.5")).expect_err("invalid");
        assert_eq!(err.to_string(), "limit: Invalid integer");
        let err = parse_limit(Some("99999999999999999999999")).expect_err("too large");
        assert_eq!(err.field, "limit");
    }

    #[test]
    fn test_bom_values() {
        for value in ["1", "true", "YES", "on", "t", "y"] {
            assert!(parse_bom(Some(value)).expect("truthy"), "{value}");
        }
        for value in ["0", "false", "No", "off", "f", "n"] {
            assert!(!parse_bom(Some(value)).expect("falsy"), "{value}");
        }
        let err = parse_bom(Some("maybe")).expect_err("invalid");
        assert_eq!(err.to_string(), "bom: Invalid boolean");
    }

    #[test]
    fn test_unsupported_format_lists_supported_set() {
        let err = parse_format(Some("xlsx")).expect_err("unsupported");
        assert_eq!(err.to_string(), "format: must be one of csv, tsv, json, xml");
    }

    #[test]
    fn test_first_invalid_field_wins() {
        let err = ExportRequest::from_params(
            "r",
            &params(&[("limit", "x"), ("format", "nope"), ("offset", "y")]),
        )
        .expect_err("invalid");
        assert_eq!(err.field, "offset");
    }
}
