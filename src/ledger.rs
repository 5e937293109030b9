use sqlx::SqlitePool;

use crate::db::StoreError;
use crate::models::BookingDetails;

const DETAILS_QUERY: &str = "SELECT b.booking_reference, c.name AS class_name, \
    c.scheduled_datetime AS class_datetime, c.instructor_name AS instructor, \
    b.client_name, b.booking_datetime \
    FROM bookings b JOIN fitness_classes c ON c.id = b.fitness_class_id";

#[derive(Clone)]
pub struct BookingLedger {
    pool: SqlitePool,
}

impl BookingLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Non-cancelled bookings for `email`, newest first.
    pub async fn list_by_email(&self, email: &str) -> Result<Vec<BookingDetails>, StoreError> {
        let sql = format!(
            "{DETAILS_QUERY} WHERE b.client_email = ?1 AND b.is_cancelled = 0 \
             ORDER BY b.booking_datetime DESC, b.id DESC"
        );
        let bookings = sqlx::query_as::<_, BookingDetails>(&sql)
            .bind(email.trim().to_lowercase())
            .fetch_all(&self.pool)
            .await?;
        Ok(bookings)
    }

    pub async fn exists_non_cancelled(&self, class_id: i64, email: &str) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM bookings
                WHERE fitness_class_id = ?1 AND client_email = ?2 AND is_cancelled = 0
            )",
        )
        .bind(class_id)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<BookingDetails>, StoreError> {
        let sql = format!("{DETAILS_QUERY} WHERE b.booking_reference = ?1");
        let booking = sqlx::query_as::<_, BookingDetails>(&sql)
            .bind(reference.trim().to_uppercase())
            .fetch_optional(&self.pool)
            .await?;
        Ok(booking)
    }

    #[cfg(test)]
    pub(crate) async fn count_for_class(&self, class_id: i64) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM bookings WHERE fitness_class_id = ?1 AND is_cancelled = 0",
        )
        .bind(class_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::catalog::ClassCatalog;
    use crate::db::test_support::temp_pool;
    use crate::db::timestamp;
    use crate::models::{ClassType, NewFitnessClass};

    async fn insert_booking(
        pool: &SqlitePool,
        class_id: i64,
        email: &str,
        reference: &str,
        minutes_ago: i64,
        cancelled: bool,
    ) {
        sqlx::query(
            "INSERT INTO bookings (
                fitness_class_id, client_name, client_email, booking_reference,
                booking_datetime, is_cancelled
            ) VALUES (?1, 'Test User', ?2, ?3, ?4, ?5)",
        )
        .bind(class_id)
        .bind(email)
        .bind(reference)
        .bind(timestamp(Utc::now() - Duration::minutes(minutes_ago)))
        .bind(cancelled)
        .execute(pool)
        .await
        .unwrap();
    }

    async fn schedule(catalog: &ClassCatalog, name: &str) -> i64 {
        catalog
            .create(&NewFitnessClass {
                name: name.to_string(),
                class_type: ClassType::Zumba,
                instructor_name: "Lisa Kumar".to_string(),
                scheduled_datetime: Utc::now() + Duration::days(2),
                duration_minutes: 60,
                total_slots: 10,
                available_slots: 10,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_list_by_email_newest_first_without_cancelled() {
        let (pool, _dir) = temp_pool().await;
        let catalog = ClassCatalog::new(pool.clone());
        let ledger = BookingLedger::new(pool.clone());
        let first = schedule(&catalog, "Latin Zumba Party").await;
        let second = schedule(&catalog, "Zumba Fitness").await;
        let third = schedule(&catalog, "High Energy Zumba").await;

        insert_booking(&pool, first, "fan@example.com", "AAAA1111", 30, false).await;
        insert_booking(&pool, second, "fan@example.com", "BBBB2222", 5, false).await;
        insert_booking(&pool, third, "fan@example.com", "CCCC3333", 1, true).await;
        insert_booking(&pool, first, "other@example.com", "DDDD4444", 1, false).await;

        let bookings = ledger.list_by_email("Fan@Example.com").await.unwrap();
        let refs: Vec<&str> = bookings.iter().map(|b| b.booking_reference.as_str()).collect();
        assert_eq!(refs, vec!["BBBB2222", "AAAA1111"]);
        assert_eq!(bookings[0].class_name, "Zumba Fitness");
        assert_eq!(bookings[0].instructor, "Lisa Kumar");
    }

    #[tokio::test]
    async fn test_exists_non_cancelled_ignores_cancelled() {
        let (pool, _dir) = temp_pool().await;
        let catalog = ClassCatalog::new(pool.clone());
        let ledger = BookingLedger::new(pool.clone());
        let class_id = schedule(&catalog, "Zumba Fitness").await;

        insert_booking(&pool, class_id, "gone@example.com", "EEEE5555", 10, true).await;
        assert!(!ledger.exists_non_cancelled(class_id, "gone@example.com").await.unwrap());

        // A cancelled booking does not block a fresh one for the same pair.
        insert_booking(&pool, class_id, "gone@example.com", "FFFF6666", 1, false).await;
        assert!(ledger.exists_non_cancelled(class_id, "gone@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_reference_and_cascade() {
        let (pool, _dir) = temp_pool().await;
        let catalog = ClassCatalog::new(pool.clone());
        let ledger = BookingLedger::new(pool.clone());
        let class_id = schedule(&catalog, "Zumba Fitness").await;
        insert_booking(&pool, class_id, "fan@example.com", "GGGG7777", 1, false).await;

        let found = ledger.find_by_reference("gggg7777").await.unwrap().unwrap();
        assert_eq!(found.class_name, "Zumba Fitness");

        assert!(catalog.delete(class_id).await.unwrap());
        assert!(ledger.find_by_reference("GGGG7777").await.unwrap().is_none());
        assert_eq!(ledger.count_for_class(class_id).await.unwrap(), 0);
    }
}
