//! Voyage repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::codec::{encode_defaulted, encode_optional};
use super::models::VoyageRow;
use super::CallContext;
use crate::{errors::ShipmanError, models::Voyage};

macro_rules! columns {
    () => {
        "id, charter_detail_id, voyage_number, vessel_name, departure_port, arrival_port, \
         planned_departure_at, planned_arrival_at, actual_departure_at, actual_arrival_at, \
         distance_nm, time_at_sea_hours, fuel_consumed_mt, fuel_type, weather_summary, \
         status, notes, created_at, updated_at"
    };
}

/// CRUD over `shipman.voyages`
///
/// Deleting a voyage removes its port calls, positions and cargo loads, and
/// detaches any laytime entries that referenced it.
#[derive(Debug, Clone)]
pub struct VoyageRepository {
    pool: PgPool,
}

impl VoyageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a voyage, `status` defaulting to `planned`
    pub async fn create(&self, ctx: &CallContext, voyage: &mut Voyage) -> Result<(), ShipmanError> {
        let row = ctx
            .run(async {
                sqlx::query_as::<_, VoyageRow>(concat!(
                    "INSERT INTO shipman.voyages (
                        charter_detail_id, voyage_number, vessel_name, departure_port,
                        arrival_port, planned_departure_at, planned_arrival_at,
                        actual_departure_at, actual_arrival_at, distance_nm,
                        time_at_sea_hours, fuel_consumed_mt, fuel_type, weather_summary,
                        status, notes
                    ) VALUES (
                        $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                        COALESCE($15, 'planned'),
                        $16
                    )
                    RETURNING ",
                    columns!()
                ))
                .bind(voyage.charter_detail_id)
                .bind(encode_optional(&voyage.voyage_number))
                .bind(encode_optional(&voyage.vessel_name))
                .bind(encode_optional(&voyage.departure_port))
                .bind(encode_optional(&voyage.arrival_port))
                .bind(encode_optional(&voyage.planned_departure_at))
                .bind(encode_optional(&voyage.planned_arrival_at))
                .bind(encode_optional(&voyage.actual_departure_at))
                .bind(encode_optional(&voyage.actual_arrival_at))
                .bind(encode_optional(&voyage.distance_nm))
                .bind(encode_optional(&voyage.time_at_sea_hours))
                .bind(encode_optional(&voyage.fuel_consumed_mt))
                .bind(encode_optional(&voyage.fuel_type))
                .bind(encode_optional(&voyage.weather_summary))
                .bind(encode_defaulted(&voyage.status))
                .bind(encode_optional(&voyage.notes))
                .fetch_one(&self.pool)
                .await
                .map_err(ShipmanError::from)
            })
            .await?;

        *voyage = row.into();
        debug!("Created voyage {}", voyage.id);
        Ok(())
    }

    pub async fn retrieve(&self, ctx: &CallContext, id: Uuid) -> Result<Voyage, ShipmanError> {
        ctx.run(async {
            let row = sqlx::query_as::<_, VoyageRow>(concat!(
                "SELECT ",
                columns!(),
                " FROM shipman.voyages WHERE id = $1"
            ))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

            row.map(Voyage::from)
                .ok_or_else(|| ShipmanError::not_found("voyage", id))
        })
        .await
    }

    /// All voyages of a charter by planned departure, unscheduled ones last
    pub async fn list_by_charter(
        &self,
        ctx: &CallContext,
        charter_id: Uuid,
    ) -> Result<Vec<Voyage>, ShipmanError> {
        ctx.run(async {
            let rows = sqlx::query_as::<_, VoyageRow>(concat!(
                "SELECT ",
                columns!(),
                " FROM shipman.voyages
                WHERE charter_detail_id = $1
                ORDER BY planned_departure_at ASC NULLS LAST, created_at DESC"
            ))
            .bind(charter_id)
            .fetch_all(&self.pool)
            .await?;

            Ok::<_, ShipmanError>(rows.into_iter().map(Voyage::from).collect())
        })
        .await
    }

    pub async fn update(&self, ctx: &CallContext, voyage: &mut Voyage) -> Result<(), ShipmanError> {
        let id = voyage.id;
        let updated_at = ctx
            .run(async {
                sqlx::query_scalar::<_, DateTime<Utc>>(
                    "UPDATE shipman.voyages
                    SET
                        voyage_number = $2,
                        vessel_name = $3,
                        departure_port = $4,
                        arrival_port = $5,
                        planned_departure_at = $6,
                        planned_arrival_at = $7,
                        actual_departure_at = $8,
                        actual_arrival_at = $9,
                        distance_nm = $10,
                        time_at_sea_hours = $11,
                        fuel_consumed_mt = $12,
                        fuel_type = $13,
                        weather_summary = $14,
                        status = $15,
                        notes = $16,
                        updated_at = NOW()
                    WHERE id = $1
                    RETURNING updated_at",
                )
                .bind(id)
                .bind(encode_optional(&voyage.voyage_number))
                .bind(encode_optional(&voyage.vessel_name))
                .bind(encode_optional(&voyage.departure_port))
                .bind(encode_optional(&voyage.arrival_port))
                .bind(encode_optional(&voyage.planned_departure_at))
                .bind(encode_optional(&voyage.planned_arrival_at))
                .bind(encode_optional(&voyage.actual_departure_at))
                .bind(encode_optional(&voyage.actual_arrival_at))
                .bind(encode_optional(&voyage.distance_nm))
                .bind(encode_optional(&voyage.time_at_sea_hours))
                .bind(encode_optional(&voyage.fuel_consumed_mt))
                .bind(encode_optional(&voyage.fuel_type))
                .bind(encode_optional(&voyage.weather_summary))
                .bind(&voyage.status)
                .bind(encode_optional(&voyage.notes))
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| ShipmanError::not_found("voyage", id))
            })
            .await?;

        voyage.updated_at = updated_at;
        Ok(())
    }

    pub async fn delete(&self, ctx: &CallContext, id: Uuid) -> Result<u64, ShipmanError> {
        ctx.run(async {
            let result = sqlx::query("DELETE FROM shipman.voyages WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
            debug!("Deleted voyage {} ({} rows)", id, result.rows_affected());
            Ok::<_, ShipmanError>(result.rows_affected())
        })
        .await
    }
}
