use crate::utils::error::{AdminError, Result};
use chrono::{DateTime, NaiveDateTime};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: &str, reason: impl Into<String>) -> AdminError {
    AdminError::InvalidValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(invalid(
            field_name,
            url_str,
            format!("Invalid URL format: {}", e),
        )),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u32, min_value: u32) -> Result<()> {
    if value < min_value {
        return Err(invalid(
            field_name,
            &value.to_string(),
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| AdminError::MissingFieldError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_min_length(field_name: &str, value: &str, min_chars: usize) -> Result<()> {
    if value.chars().count() < min_chars {
        return Err(invalid(
            field_name,
            value,
            format!("Minimum {} characters are required", min_chars),
        ));
    }
    Ok(())
}

pub fn validate_exact_length(field_name: &str, value: &str, chars: usize) -> Result<()> {
    if value.chars().count() != chars {
        return Err(invalid(
            field_name,
            value,
            format!("Must be exactly {} characters", chars),
        ));
    }
    Ok(())
}

pub fn validate_email(field_name: &str, value: &str) -> Result<()> {
    let Some((local, domain)) = value.split_once('@') else {
        return Err(invalid(field_name, value, "Please enter a valid email"));
    };

    let domain_ok = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@');

    if local.is_empty() || !domain_ok || value.chars().any(char::is_whitespace) {
        return Err(invalid(field_name, value, "Please enter a valid email"));
    }
    Ok(())
}

/// 接受 `<input type="datetime-local">` 的格式以及 RFC 3339
pub fn validate_datetime(field_name: &str, value: &str) -> Result<()> {
    validate_non_empty_string(field_name, value)?;

    let parsed = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok()
        || DateTime::parse_from_rfc3339(value).is_ok();

    if !parsed {
        return Err(invalid(
            field_name,
            value,
            "Expected YYYY-MM-DDTHH:MM or an RFC 3339 timestamp",
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field_name,
            &value.to_string(),
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("image", "https://example.com/a.png").is_ok());
        assert!(validate_url("image", "http://example.com").is_ok());
        assert!(validate_url("image", "").is_err());
        assert!(validate_url("image", "invalid-url").is_err());
        assert!(validate_url("image", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("qr.size", 200, 1).is_ok());
        assert!(validate_positive_number("qr.size", 0, 1).is_err());
    }

    #[test]
    fn test_validate_lengths() {
        assert!(validate_min_length("name", "Honey", 5).is_ok());
        assert!(validate_min_length("name", "Tea", 5).is_err());
        assert!(validate_exact_length("contactNumber", "9876543210", 10).is_ok());
        assert!(validate_exact_length("contactNumber", "98765", 10).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("contactEmail", "owner@shop.example").is_ok());
        assert!(validate_email("contactEmail", "owner.shop.example").is_err());
        assert!(validate_email("contactEmail", "@shop.example").is_err());
        assert!(validate_email("contactEmail", "owner@localhost").is_err());
        assert!(validate_email("contactEmail", "own er@shop.example").is_err());
    }

    #[test]
    fn test_validate_datetime() {
        assert!(validate_datetime("expiryDate", "2026-12-31T23:59").is_ok());
        assert!(validate_datetime("expiryDate", "2026-12-31T23:59:00Z").is_ok());
        assert!(validate_datetime("expiryDate", "").is_err());
        assert!(validate_datetime("expiryDate", "next tuesday").is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let missing: Option<String> = None;
        assert!(matches!(
            validate_required_field("verificationId", &missing),
            Err(AdminError::MissingFieldError { .. })
        ));
        let present = Some("abc".to_string());
        assert_eq!(validate_required_field("verificationId", &present).unwrap(), "abc");
    }
}
