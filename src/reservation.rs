use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::catalog::ClassCatalog;
use crate::db::{StoreError, is_unique_violation, timestamp};
use crate::ledger::BookingLedger;
use crate::models::{Booking, BookingDetails, FitnessClass};
use crate::reference;
use crate::validation::{normalize_email, validate_client_name};

#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("Invalid class ID or class not available")]
    ClassNotFound,
    #[error("Cannot book past classes")]
    ClassNotUpcoming,
    #[error("Sorry, this class is fully booked")]
    ClassFull,
    #[error("Please provide a valid email address")]
    InvalidEmail,
    #[error("Please provide your name (up to 100 characters)")]
    InvalidName,
    #[error("You've already booked this class. Multiple bookings not allowed.")]
    DuplicateBooking,
    #[error("Could not allocate a booking reference after {0} attempts")]
    ReferenceExhausted(u32),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<sqlx::Error> for ReservationError {
    fn from(value: sqlx::Error) -> Self {
        ReservationError::Store(StoreError::Database(value))
    }
}

#[derive(Debug, Clone)]
pub struct ReservationRequest {
    pub class_id: i64,
    pub client_name: String,
    pub client_email: String,
}

/// A committed booking and the class view it was made against.
#[derive(Debug, Clone)]
pub struct Reservation {
    pub booking: Booking,
    pub details: BookingDetails,
}

/// Outcome of one commit attempt.
enum CommitError {
    ReferenceTaken,
    Rejected(ReservationError),
}

impl From<sqlx::Error> for CommitError {
    fn from(value: sqlx::Error) -> Self {
        CommitError::Rejected(value.into())
    }
}

pub type ReferenceGenerator = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Clone)]
pub struct ReservationEngine {
    pool: SqlitePool,
    catalog: ClassCatalog,
    ledger: BookingLedger,
    reference_attempts: u32,
    generate_reference: ReferenceGenerator,
}

impl ReservationEngine {
    pub fn new(pool: SqlitePool, reference_attempts: u32) -> Self {
        Self {
            catalog: ClassCatalog::new(pool.clone()),
            ledger: BookingLedger::new(pool.clone()),
            pool,
            reference_attempts: reference_attempts.max(1),
            generate_reference: Arc::new(reference::generate),
        }
    }

    pub fn with_reference_generator(mut self, generator: ReferenceGenerator) -> Self {
        self.generate_reference = generator;
        self
    }

    /// Validates the request against the class as of `now` and, if every check
    /// passes, claims one slot and records the booking in a single transaction.
    pub async fn reserve(
        &self,
        request: &ReservationRequest,
        now: DateTime<Utc>,
    ) -> Result<Reservation, ReservationError> {
        let class = self
            .catalog
            .get_by_id(request.class_id)
            .await?
            .filter(|class| class.is_active)
            .ok_or(ReservationError::ClassNotFound)?;

        if !class.is_upcoming(now) {
            return Err(ReservationError::ClassNotUpcoming);
        }
        if class.is_fully_booked() {
            return Err(ReservationError::ClassFull);
        }

        let email = normalize_email(&request.client_email)?;
        let name = validate_client_name(&request.client_name)?;

        if self.ledger.exists_non_cancelled(class.id, &email).await? {
            return Err(ReservationError::DuplicateBooking);
        }

        for attempt in 1..=self.reference_attempts {
            let code = (self.generate_reference)();
            match self.commit(&class, &name, &email, &code).await {
                Ok(booking) => {
                    info!(
                        booking_reference = %booking.booking_reference,
                        class_id = class.id,
                        "booking created"
                    );
                    let details = BookingDetails {
                        booking_reference: booking.booking_reference.clone(),
                        class_name: class.name.clone(),
                        class_datetime: class.scheduled_datetime,
                        instructor: class.instructor_name.clone(),
                        client_name: booking.client_name.clone(),
                        booking_datetime: booking.booking_datetime,
                    };
                    return Ok(Reservation { booking, details });
                }
                Err(CommitError::ReferenceTaken) => {
                    warn!(attempt, class_id = class.id, "booking reference collision");
                }
                Err(CommitError::Rejected(err)) => return Err(err),
            }
        }

        error!(
            class_id = class.id,
            attempts = self.reference_attempts,
            "gave up allocating a booking reference"
        );
        Err(ReservationError::ReferenceExhausted(self.reference_attempts))
    }

    async fn commit(
        &self,
        class: &FitnessClass,
        name: &str,
        email: &str,
        code: &str,
    ) -> Result<Booking, CommitError> {
        let mut tx = self.pool.begin().await?;

        // Writing first takes the database write lock, so every commit sees
        // the latest counter and the latest bookings.
        let claimed = sqlx::query(
            "UPDATE fitness_classes
             SET available_slots = available_slots - 1, updated_at = ?1
             WHERE id = ?2 AND is_active = 1 AND available_slots > 0",
        )
        .bind(timestamp(Utc::now()))
        .bind(class.id)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            let still_active: Option<bool> =
                sqlx::query_scalar("SELECT is_active FROM fitness_classes WHERE id = ?1")
                    .bind(class.id)
                    .fetch_optional(&mut *tx)
                    .await?;
            tx.rollback().await?;
            let reason = match still_active {
                Some(true) => ReservationError::ClassFull,
                _ => ReservationError::ClassNotFound,
            };
            return Err(CommitError::Rejected(reason));
        }

        let duplicate: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM bookings
                WHERE fitness_class_id = ?1 AND client_email = ?2 AND is_cancelled = 0
            )",
        )
        .bind(class.id)
        .bind(email)
        .fetch_one(&mut *tx)
        .await?;

        if duplicate {
            tx.rollback().await?;
            return Err(CommitError::Rejected(ReservationError::DuplicateBooking));
        }

        let booked_at = Utc::now();
        let inserted = sqlx::query(
            "INSERT INTO bookings (
                fitness_class_id, client_name, client_email, booking_reference,
                booking_datetime, is_cancelled
            ) VALUES (?1, ?2, ?3, ?4, ?5, 0)",
        )
        .bind(class.id)
        .bind(name)
        .bind(email)
        .bind(code)
        .bind(timestamp(booked_at))
        .execute(&mut *tx)
        .await;

        let id = match inserted {
            Ok(result) => result.last_insert_rowid(),
            Err(err) if is_unique_violation(&err, "booking_reference") => {
                tx.rollback().await?;
                return Err(CommitError::ReferenceTaken);
            }
            Err(err) if is_unique_violation(&err, "client_email") => {
                tx.rollback().await?;
                return Err(CommitError::Rejected(ReservationError::DuplicateBooking));
            }
            Err(err) => return Err(err.into()),
        };

        tx.commit().await?;

        Ok(Booking {
            id,
            fitness_class_id: class.id,
            client_name: name.to_string(),
            client_email: email.to_string(),
            booking_reference: code.to_string(),
            booking_datetime: booked_at,
            is_cancelled: false,
        })
    }
}
