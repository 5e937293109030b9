use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ClassType {
    Yoga,
    Zumba,
    Hiit,
    Pilates,
    Cardio,
}

impl ClassType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Yoga => "yoga",
            Self::Zumba => "zumba",
            Self::Hiit => "hiit",
            Self::Pilates => "pilates",
            Self::Cardio => "cardio",
        }
    }
}

/// A scheduled class and its capacity state. `scheduled_datetime` is kept in UTC.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct FitnessClass {
    pub id: i64,
    pub name: String,
    pub class_type: ClassType,
    pub instructor_name: String,
    pub scheduled_datetime: DateTime<Utc>,
    pub duration_minutes: i64,
    pub total_slots: i64,
    pub available_slots: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FitnessClass {
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_datetime > now
    }

    pub fn is_fully_booked(&self) -> bool {
        self.available_slots <= 0
    }
}

/// Fields an administrator supplies when scheduling a class.
#[derive(Debug, Clone)]
pub struct NewFitnessClass {
    pub name: String,
    pub class_type: ClassType,
    pub instructor_name: String,
    pub scheduled_datetime: DateTime<Utc>,
    pub duration_minutes: i64,
    pub total_slots: i64,
    pub available_slots: i64,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Booking {
    pub id: i64,
    pub fitness_class_id: i64,
    pub client_name: String,
    pub client_email: String,
    pub booking_reference: String,
    pub booking_datetime: DateTime<Utc>,
    pub is_cancelled: bool,
}

/// Booking joined with the class it belongs to, as shown to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookingDetails {
    #[schema(example = "K3ZQ8A1B")]
    pub booking_reference: String,
    pub class_name: String,
    #[schema(value_type = String, format = "date-time")]
    pub class_datetime: DateTime<Utc>,
    pub instructor: String,
    pub client_name: String,
    #[schema(value_type = String, format = "date-time")]
    pub booking_datetime: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FitnessClassView {
    pub id: i64,
    pub name: String,
    pub class_type: ClassType,
    pub instructor_name: String,
    #[schema(value_type = String, format = "date-time", example = "2025-11-24T06:00:00+00:00")]
    pub scheduled_datetime: String,
    #[schema(value_type = String, format = "date-time", example = "2025-11-24T11:30:00+05:30")]
    pub scheduled_datetime_local: String,
    pub duration_minutes: i64,
    pub total_slots: i64,
    pub available_slots: i64,
}

/// Body of `POST /book/`. Fields are optional so missing ones can be reported by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct BookingRequest {
    #[serde(default)]
    #[schema(example = 1)]
    pub class_id: Option<i64>,
    #[serde(default)]
    #[schema(example = "Test User")]
    pub client_name: Option<String>,
    #[serde(default)]
    #[schema(example = "test@example.com")]
    pub client_email: Option<String>,
}

impl FitnessClassView {
    pub fn new(class: &FitnessClass, scheduled_datetime_local: DateTime<FixedOffset>) -> Self {
        Self {
            id: class.id,
            name: class.name.clone(),
            class_type: class.class_type,
            instructor_name: class.instructor_name.clone(),
            scheduled_datetime: class.scheduled_datetime.to_rfc3339(),
            scheduled_datetime_local: scheduled_datetime_local.to_rfc3339(),
            duration_minutes: class.duration_minutes,
            total_slots: class.total_slots,
            available_slots: class.available_slots,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClassListResponse {
    pub success: bool,
    pub data: Vec<FitnessClassView>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookingCreatedResponse {
    pub success: bool,
    pub message: String,
    pub data: BookingDetails,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookingListResponse {
    pub success: bool,
    pub data: Vec<BookingDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookingLookupResponse {
    pub success: bool,
    pub data: BookingDetails,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn class_at(when: DateTime<Utc>, available: i64) -> FitnessClass {
        FitnessClass {
            id: 1,
            name: "Morning Yoga Flow".to_string(),
            class_type: ClassType::Yoga,
            instructor_name: "Sarah Johnson".to_string(),
            scheduled_datetime: when,
            duration_minutes: 60,
            total_slots: 10,
            available_slots: available,
            is_active: true,
            created_at: when,
            updated_at: when,
        }
    }

    #[test]
    fn test_is_upcoming() {
        let now = Utc::now();
        assert!(class_at(now + Duration::hours(1), 5).is_upcoming(now));
        assert!(!class_at(now, 5).is_upcoming(now));
        assert!(!class_at(now - Duration::days(1), 5).is_upcoming(now));
    }

    #[test]
    fn test_is_fully_booked() {
        let now = Utc::now();
        assert!(class_at(now, 0).is_fully_booked());
        assert!(!class_at(now, 1).is_fully_booked());
    }

    #[test]
    fn test_class_type_serializes_lowercase() {
        let json = serde_json::to_string(&ClassType::Hiit).unwrap();
        assert_eq!(json, r#""hiit""#);
        assert_eq!(ClassType::Pilates.as_str(), "pilates");
    }
}
