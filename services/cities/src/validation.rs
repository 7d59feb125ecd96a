//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::models::NewCity;

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    if username.len() > 32 {
        return Err("Username must be at most 32 characters long".to_string());
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_.-]+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        return Err(
            "Username can only contain letters, numbers, dots, dashes and underscores".to_string(),
        );
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate the raw city form fields and turn them into a new city
pub fn validate_city(name: &str, latitude: &str, longitude: &str) -> Result<NewCity, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("City name is required".to_string());
    }

    if name.chars().count() > 100 {
        return Err("City name must be at most 100 characters long".to_string());
    }

    let latitude = parse_coordinate(latitude, "Latitude", 90.0)?;
    let longitude = parse_coordinate(longitude, "Longitude", 180.0)?;

    Ok(NewCity {
        name: name.to_string(),
        latitude,
        longitude,
    })
}

fn parse_coordinate(raw: &str, label: &str, limit: f64) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("{} must be a number", label))?;

    if !value.is_finite() || value.abs() > limit {
        return Err(format!("{} must be between -{} and {}", label, limit, limit));
    }

    Ok(value)
}
