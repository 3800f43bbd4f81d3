//! Ship position repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::codec::{encode_defaulted, encode_optional};
use super::models::ShipPositionRow;
use super::CallContext;
use crate::{errors::ShipmanError, models::ShipPosition};

macro_rules! columns {
    () => {
        "id, voyage_id, recorded_at, latitude, longitude, speed_knots, heading, \
         distance_logged_nm, fuel_remaining_mt, source, remarks, created_at, updated_at"
    };
}

#[derive(Debug, Clone)]
pub struct ShipPositionRepository {
    pool: PgPool,
}

impl ShipPositionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a position, `source` defaulting to `manual`
    pub async fn create(
        &self,
        ctx: &CallContext,
        position: &mut ShipPosition,
    ) -> Result<(), ShipmanError> {
        let row = ctx
            .run(async {
                sqlx::query_as::<_, ShipPositionRow>(concat!(
                    "INSERT INTO shipman.ship_positions (
                        voyage_id, recorded_at, latitude, longitude, speed_knots, heading,
                        distance_logged_nm, fuel_remaining_mt, source, remarks
                    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, 'manual'), $10)
                    RETURNING ",
                    columns!()
                ))
                .bind(position.voyage_id)
                .bind(position.recorded_at)
                .bind(position.latitude)
                .bind(position.longitude)
                .bind(encode_optional(&position.speed_knots))
                .bind(encode_optional(&position.heading))
                .bind(encode_optional(&position.distance_logged_nm))
                .bind(encode_optional(&position.fuel_remaining_mt))
                .bind(encode_defaulted(&position.source))
                .bind(encode_optional(&position.remarks))
                .fetch_one(&self.pool)
                .await
                .map_err(ShipmanError::from)
            })
            .await?;

        *position = row.into();
        Ok(())
    }

    pub async fn retrieve(
        &self,
        ctx: &CallContext,
        id: Uuid,
    ) -> Result<ShipPosition, ShipmanError> {
        ctx.run(async {
            let row = sqlx::query_as::<_, ShipPositionRow>(concat!(
                "SELECT ",
                columns!(),
                " FROM shipman.ship_positions WHERE id = $1"
            ))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

            row.map(ShipPosition::from)
                .ok_or_else(|| ShipmanError::not_found("ship position", id))
        })
        .await
    }

    /// Latest positions first. `limit` of `None` returns the whole track.
    pub async fn list_by_voyage(
        &self,
        ctx: &CallContext,
        voyage_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<ShipPosition>, ShipmanError> {
        ctx.run(async {
            // LIMIT NULL is no limit
            let rows = sqlx::query_as::<_, ShipPositionRow>(concat!(
                "SELECT ",
                columns!(),
                " FROM shipman.ship_positions
                WHERE voyage_id = $1
                ORDER BY recorded_at DESC
                LIMIT $2"
            ))
            .bind(voyage_id)
            .bind(limit.filter(|l| *l > 0))
            .fetch_all(&self.pool)
            .await?;

            Ok::<_, ShipmanError>(rows.into_iter().map(ShipPosition::from).collect())
        })
        .await
    }

    pub async fn update(
        &self,
        ctx: &CallContext,
        position: &mut ShipPosition,
    ) -> Result<(), ShipmanError> {
        let id = position.id;
        let updated_at = ctx
            .run(async {
                sqlx::query_scalar::<_, DateTime<Utc>>(
                    "UPDATE shipman.ship_positions
                    SET
                        recorded_at = $2,
                        latitude = $3,
                        longitude = $4,
                        speed_knots = $5,
                        heading = $6,
                        distance_logged_nm = $7,
                        fuel_remaining_mt = $8,
                        source = $9,
                        remarks = $10,
                        updated_at = NOW()
                    WHERE id = $1
                    RETURNING updated_at",
                )
                .bind(id)
                .bind(position.recorded_at)
                .bind(position.latitude)
                .bind(position.longitude)
                .bind(encode_optional(&position.speed_knots))
                .bind(encode_optional(&position.heading))
                .bind(encode_optional(&position.distance_logged_nm))
                .bind(encode_optional(&position.fuel_remaining_mt))
                .bind(&position.source)
                .bind(encode_optional(&position.remarks))
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| ShipmanError::not_found("ship position", id))
            })
            .await?;

        position.updated_at = updated_at;
        Ok(())
    }

    pub async fn delete(&self, ctx: &CallContext, id: Uuid) -> Result<u64, ShipmanError> {
        ctx.run(async {
            let result = sqlx::query("DELETE FROM shipman.ship_positions WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
            Ok::<_, ShipmanError>(result.rows_affected())
        })
        .await
    }
}
