use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::info;

use crate::db::{StoreError, timestamp};
use crate::models::{FitnessClass, NewFitnessClass};

const CLASS_COLUMNS: &str = "id, name, class_type, instructor_name, scheduled_datetime, \
    duration_minutes, total_slots, available_slots, is_active, created_at, updated_at";

/// Read access to scheduled classes plus the administrative writes used for seeding.
#[derive(Clone)]
pub struct ClassCatalog {
    pool: SqlitePool,
}

impl ClassCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Active classes starting strictly after `now`, earliest first.
    pub async fn list_upcoming_active(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<FitnessClass>, StoreError> {
        let sql = format!(
            "SELECT {CLASS_COLUMNS} FROM fitness_classes \
             WHERE scheduled_datetime > ?1 AND is_active = 1 \
             ORDER BY scheduled_datetime ASC, id ASC"
        );
        let classes = sqlx::query_as::<_, FitnessClass>(&sql)
            .bind(timestamp(now))
            .fetch_all(&self.pool)
            .await?;
        Ok(classes)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<FitnessClass>, StoreError> {
        let sql = format!("SELECT {CLASS_COLUMNS} FROM fitness_classes WHERE id = ?1");
        let class = sqlx::query_as::<_, FitnessClass>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(class)
    }

    pub async fn create(&self, new_class: &NewFitnessClass) -> Result<FitnessClass, StoreError> {
        if new_class.total_slots < 1 {
            return Err(StoreError::InvalidClass(
                "total_slots must be at least 1".into(),
            ));
        }
        if new_class.duration_minutes <= 0 {
            return Err(StoreError::InvalidClass(
                "duration_minutes must be positive".into(),
            ));
        }

        let available = clamp_slots(new_class.available_slots, new_class.total_slots);
        let now = timestamp(Utc::now());
        let id = sqlx::query(
            "INSERT INTO fitness_classes (
                name, class_type, instructor_name, scheduled_datetime, duration_minutes,
                total_slots, available_slots, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?8)",
        )
        .bind(&new_class.name)
        .bind(new_class.class_type.as_str())
        .bind(&new_class.instructor_name)
        .bind(timestamp(new_class.scheduled_datetime))
        .bind(new_class.duration_minutes)
        .bind(new_class.total_slots)
        .bind(available)
        .bind(&now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        info!(class_id = id, name = %new_class.name, "class scheduled");
        self.get_by_id(id).await?.ok_or(StoreError::Database(sqlx::Error::RowNotFound))
    }

    /// Administrative capacity edit. `available` is clamped into `0..=total`.
    pub async fn update_slots(
        &self,
        id: i64,
        total: i64,
        available: i64,
    ) -> Result<Option<FitnessClass>, StoreError> {
        if total < 1 {
            return Err(StoreError::InvalidClass(
                "total_slots must be at least 1".into(),
            ));
        }
        let result = sqlx::query(
            "UPDATE fitness_classes
             SET total_slots = ?1, available_slots = ?2, updated_at = ?3
             WHERE id = ?4",
        )
        .bind(total)
        .bind(clamp_slots(available, total))
        .bind(timestamp(Utc::now()))
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    pub async fn set_active(&self, id: i64, active: bool) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE fitness_classes SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
        )
        .bind(active)
        .bind(timestamp(Utc::now()))
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Removes a class; its bookings go with it.
    pub async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM fitness_classes WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

pub fn clamp_slots(available: i64, total: i64) -> i64 {
    available.clamp(0, total.max(0))
}
