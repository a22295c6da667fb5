use crate::utils::error::{RateError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(RateError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(RateError::InvalidConfigValue {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(RateError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(RateError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Shipment measurements must be finite and strictly positive.
pub fn validate_positive_measure(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(RateError::validation(format!(
            "{} must be greater than zero (got {})",
            field_name, value
        )));
    }
    Ok(())
}

pub fn validate_zip(field_name: &str, zip: &str) -> Result<()> {
    let trimmed = zip.trim();
    if trimmed.is_empty() {
        return Err(RateError::validation(format!("{} cannot be empty", field_name)));
    }
    if !trimmed.chars().all(|c| c.is_ascii_digit() || c == '-') {
        return Err(RateError::validation(format!(
            "{} '{}' is not a US postal code",
            field_name, trimmed
        )));
    }
    Ok(())
}
