use crate::error::{ApiError, FieldErrors};
use crate::models::BookingRequest;
use crate::reservation::{ReservationError, ReservationRequest};

pub const MAX_NAME_LEN: usize = 100;

/// Trims and lowercases an email; it must be non-empty and contain an `@`.
pub fn normalize_email(value: &str) -> Result<String, ReservationError> {
    let email = value.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ReservationError::InvalidEmail);
    }
    Ok(email.to_lowercase())
}

pub fn validate_client_name(value: &str) -> Result<String, ReservationError> {
    let name = value.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(ReservationError::InvalidName);
    }
    Ok(name.to_string())
}

/// Checks that every required field of a booking body is present.
pub fn require_booking_fields(body: BookingRequest) -> Result<ReservationRequest, ApiError> {
    const REQUIRED: &str = "This field is required.";
    let mut errors = FieldErrors::new();
    if body.class_id.is_none() {
        errors.insert("class_id".into(), vec![REQUIRED.into()]);
    }
    if body.client_name.is_none() {
        errors.insert("client_name".into(), vec![REQUIRED.into()]);
    }
    if body.client_email.is_none() {
        errors.insert("client_email".into(), vec![REQUIRED.into()]);
    }

    match (body.class_id, body.client_name, body.client_email) {
        (Some(class_id), Some(client_name), Some(client_email)) if errors.is_empty() => {
            Ok(ReservationRequest {
                class_id,
                client_name,
                client_email,
            })
        }
        _ => Err(ApiError::Validation(errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_booking_fields() {
        let ok = require_booking_fields(BookingRequest {
            class_id: Some(3),
            client_name: Some("Test User".into()),
            client_email: Some("test@example.com".into()),
        })
        .unwrap();
        assert_eq!(ok.class_id, 3);

        let Err(ApiError::Validation(errors)) = require_booking_fields(BookingRequest {
            class_id: Some(3),
            ..Default::default()
        }) else {
            panic!("expected field errors");
        };
        let fields: Vec<&str> = errors.keys().map(String::as_str).collect();
        assert_eq!(fields, vec!["client_email", "client_name"]);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("  Test@Example.COM ").unwrap(),
            "test@example.com"
        );
        assert!(matches!(
            normalize_email(""),
            Err(ReservationError::InvalidEmail)
        ));
        assert!(matches!(
            normalize_email("not-an-email"),
            Err(ReservationError::InvalidEmail)
        ));
    }

    #[test]
    fn test_validate_client_name() {
        assert_eq!(validate_client_name(" Test User ").unwrap(), "Test User");
        assert!(validate_client_name("   ").is_err());
        assert!(validate_client_name(&"x".repeat(MAX_NAME_LEN)).is_ok());
        assert!(validate_client_name(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }
}
