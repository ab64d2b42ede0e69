use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::{Booking, Office, OfficeProfile, SlotTime};

use super::{CommitOutcome, Store, StoreError};

/// Postgres-backed store. Atomicity for the invariant-critical operations
/// comes from single conditional statements and transactions; the
/// `UNIQUE (office_id, slot)` constraint on the ledger is the last-resort
/// backstop against double booking.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
                StoreError::Timeout(anyhow::Error::from(e))
            }
            other => StoreError::Backend(anyhow::Error::from(other)),
        }
    }
}

#[derive(FromRow)]
struct OfficeRow {
    id: Uuid,
    name: String,
    address: String,
    phone: Option<String>,
    email: Option<String>,
    website: Option<String>,
    zip_code: String,
    state: Option<String>,
    latitude: f64,
    longitude: f64,
    available_slots: Vec<SlotTime>,
}

impl From<OfficeRow> for Office {
    fn from(row: OfficeRow) -> Self {
        Office {
            id: row.id,
            name: row.name,
            address: row.address,
            phone: row.phone,
            email: row.email,
            website: row.website,
            zip_code: row.zip_code,
            state: row.state,
            latitude: row.latitude,
            longitude: row.longitude,
            available_slots: row.available_slots.into_iter().collect(),
        }
    }
}

#[derive(FromRow)]
struct BookingRow {
    id: Uuid,
    office_id: Uuid,
    slot: SlotTime,
    patient_name: String,
    patient_email: Option<String>,
    patient_phone: Option<String>,
    reason: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: row.id,
            office_id: row.office_id,
            slot: row.slot,
            patient_name: row.patient_name,
            patient_email: row.patient_email,
            patient_phone: row.patient_phone,
            reason: row.reason,
            created_at: row.created_at,
        }
    }
}

const OFFICE_COLUMNS: &str = "id, name, address, phone, email, website, zip_code, state, \
     latitude, longitude, available_slots";

fn slots_to_vec(slots: &BTreeSet<SlotTime>) -> Vec<SlotTime> {
    slots.iter().copied().collect()
}

#[async_trait]
impl Store for PgStore {
    #[tracing::instrument(name = "Inserting office record", skip(self, office), fields(office_id = %office.id))]
    async fn insert_office(&self, office: &Office) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO offices \
             (id, name, address, phone, email, website, zip_code, state, latitude, longitude, available_slots) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(office.id)
        .bind(&office.name)
        .bind(&office.address)
        .bind(&office.phone)
        .bind(&office.email)
        .bind(&office.website)
        .bind(&office.zip_code)
        .bind(&office.state)
        .bind(office.latitude)
        .bind(office.longitude)
        .bind(slots_to_vec(&office.available_slots))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[tracing::instrument(name = "Fetching office record", skip(self))]
    async fn get_office(&self, office_id: Uuid) -> Result<Option<Office>, StoreError> {
        let row: Option<OfficeRow> =
            sqlx::query_as(&format!("SELECT {OFFICE_COLUMNS} FROM offices WHERE id = $1"))
                .bind(office_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Office::from))
    }

    #[tracing::instrument(name = "Listing office records", skip(self))]
    async fn list_offices(&self) -> Result<Vec<Office>, StoreError> {
        let rows: Vec<OfficeRow> =
            sqlx::query_as(&format!("SELECT {OFFICE_COLUMNS} FROM offices ORDER BY name"))
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(Office::from).collect())
    }

    #[tracing::instrument(name = "Updating office profile", skip(self, profile))]
    async fn update_profile(
        &self,
        office_id: Uuid,
        profile: OfficeProfile,
    ) -> Result<Option<Office>, StoreError> {
        let row: Option<OfficeRow> = sqlx::query_as(&format!(
            "UPDATE offices SET name = $2, address = $3, phone = $4, email = $5, \
             website = $6, zip_code = $7, state = $8, latitude = $9, longitude = $10 \
             WHERE id = $1 RETURNING {OFFICE_COLUMNS}"
        ))
        .bind(office_id)
        .bind(&profile.name)
        .bind(&profile.address)
        .bind(&profile.phone)
        .bind(&profile.email)
        .bind(&profile.website)
        .bind(&profile.zip_code)
        .bind(&profile.state)
        .bind(profile.latitude)
        .bind(profile.longitude)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Office::from))
    }

    #[tracing::instrument(name = "Replacing office slot set", skip(self, requested))]
    async fn replace_slots(
        &self,
        office_id: Uuid,
        requested: &BTreeSet<SlotTime>,
    ) -> Result<Option<BTreeSet<SlotTime>>, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Take the office row lock before subtracting booked slots. If a
        // `commit_booking` holds the lock, waiting here means the UPDATE below
        // runs on a fresh snapshot that sees the committed booking — a single
        // blocked UPDATE would re-evaluate its NOT EXISTS subquery against the
        // original snapshot and reopen the just-booked slot.
        let locked: Option<i32> = sqlx::query_scalar("SELECT 1 FROM offices WHERE id = $1 FOR UPDATE")
            .bind(office_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let updated: Vec<SlotTime> = sqlx::query_scalar(
            "UPDATE offices SET available_slots = ARRAY( \
                 SELECT t.s FROM unnest($2::bigint[]) AS t(s) \
                 WHERE NOT EXISTS ( \
                     SELECT 1 FROM bookings WHERE office_id = $1 AND slot = t.s \
                 ) \
                 ORDER BY t.s \
             ) \
             WHERE id = $1 RETURNING available_slots",
        )
        .bind(office_id)
        .bind(slots_to_vec(requested))
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(Some(updated.into_iter().collect()))
    }

    #[tracing::instrument(name = "Fetching booked slots", skip(self))]
    async fn booked_slots(&self, office_id: Uuid) -> Result<BTreeSet<SlotTime>, StoreError> {
        let slots: Vec<SlotTime> =
            sqlx::query_scalar("SELECT slot FROM bookings WHERE office_id = $1")
                .bind(office_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(slots.into_iter().collect())
    }

    #[tracing::instrument(
        name = "Committing booking",
        skip(self, booking),
        fields(office_id = %booking.office_id, slot = %booking.slot)
    )]
    async fn commit_booking(&self, booking: &Booking) -> Result<CommitOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Conditional removal: succeeds only when the slot is currently open.
        let remaining: Option<Vec<SlotTime>> = sqlx::query_scalar(
            "UPDATE offices SET available_slots = array_remove(available_slots, $2) \
             WHERE id = $1 AND $2 = ANY(available_slots) \
             RETURNING available_slots",
        )
        .bind(booking.office_id)
        .bind(booking.slot)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(remaining) = remaining else {
            let exists: Option<i32> = sqlx::query_scalar("SELECT 1 FROM offices WHERE id = $1")
                .bind(booking.office_id)
                .fetch_optional(&mut *tx)
                .await?;
            tx.rollback().await?;
            return Ok(if exists.is_some() {
                CommitOutcome::SlotUnavailable
            } else {
                CommitOutcome::OfficeMissing
            });
        };

        let inserted = sqlx::query(
            "INSERT INTO bookings \
             (id, office_id, slot, patient_name, patient_email, patient_phone, reason, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(booking.id)
        .bind(booking.office_id)
        .bind(booking.slot)
        .bind(&booking.patient_name)
        .bind(&booking.patient_email)
        .bind(&booking.patient_phone)
        .bind(&booking.reason)
        .bind(booking.created_at)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {
                tx.commit().await?;
                Ok(CommitOutcome::Committed {
                    remaining_slots: remaining.into_iter().collect(),
                })
            }
            // Unique (office_id, slot) violation: a booking slipped in through
            // a path that bypassed the slot-set removal.
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                tx.rollback().await?;
                Ok(CommitOutcome::SlotUnavailable)
            }
            Err(e) => {
                tracing::error!("Failed to append booking: {e}");
                Err(e.into())
            }
        }
    }

    #[tracing::instrument(name = "Listing office bookings", skip(self))]
    async fn bookings_for_office(&self, office_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        let rows: Vec<BookingRow> = sqlx::query_as(
            "SELECT id, office_id, slot, patient_name, patient_email, patient_phone, \
             reason, created_at \
             FROM bookings WHERE office_id = $1 ORDER BY created_at",
        )
        .bind(office_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Booking::from).collect())
    }
}
