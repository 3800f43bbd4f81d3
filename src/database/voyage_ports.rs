//! Voyage port call repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::codec::encode_optional;
use super::models::VoyagePortRow;
use super::CallContext;
use crate::{errors::ShipmanError, models::VoyagePort};

macro_rules! columns {
    () => {
        "id, voyage_id, port_name, port_country, port_unlocode, latitude, longitude, \
         arrived_at, departed_at, laytime_hours, cargo_operations, notes, created_at, updated_at"
    };
}

#[derive(Debug, Clone)]
pub struct VoyagePortRepository {
    pool: PgPool,
}

impl VoyagePortRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, ctx: &CallContext, port: &mut VoyagePort) -> Result<(), ShipmanError> {
        let row = ctx
            .run(async {
                sqlx::query_as::<_, VoyagePortRow>(concat!(
                    "INSERT INTO shipman.voyage_ports (
                        voyage_id, port_name, port_country, port_unlocode, latitude,
                        longitude, arrived_at, departed_at, laytime_hours,
                        cargo_operations, notes
                    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                    RETURNING ",
                    columns!()
                ))
                .bind(port.voyage_id)
                .bind(&port.port_name)
                .bind(encode_optional(&port.port_country))
                .bind(encode_optional(&port.port_unlocode))
                .bind(encode_optional(&port.latitude))
                .bind(encode_optional(&port.longitude))
                .bind(encode_optional(&port.arrived_at))
                .bind(encode_optional(&port.departed_at))
                .bind(encode_optional(&port.laytime_hours))
                .bind(encode_optional(&port.cargo_operations))
                .bind(encode_optional(&port.notes))
                .fetch_one(&self.pool)
                .await
                .map_err(ShipmanError::from)
            })
            .await?;

        *port = row.into();
        Ok(())
    }

    pub async fn retrieve(&self, ctx: &CallContext, id: Uuid) -> Result<VoyagePort, ShipmanError> {
        ctx.run(async {
            let row = sqlx::query_as::<_, VoyagePortRow>(concat!(
                "SELECT ",
                columns!(),
                " FROM shipman.voyage_ports WHERE id = $1"
            ))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

            row.map(VoyagePort::from)
                .ok_or_else(|| ShipmanError::not_found("voyage port", id))
        })
        .await
    }

    /// Port calls in the order visited; calls without an arrival time go last
    pub async fn list_by_voyage(
        &self,
        ctx: &CallContext,
        voyage_id: Uuid,
    ) -> Result<Vec<VoyagePort>, ShipmanError> {
        ctx.run(async {
            let rows = sqlx::query_as::<_, VoyagePortRow>(concat!(
                "SELECT ",
                columns!(),
                " FROM shipman.voyage_ports
                WHERE voyage_id = $1
                ORDER BY arrived_at ASC NULLS LAST, created_at ASC"
            ))
            .bind(voyage_id)
            .fetch_all(&self.pool)
            .await?;

            Ok::<_, ShipmanError>(rows.into_iter().map(VoyagePort::from).collect())
        })
        .await
    }

    pub async fn update(&self, ctx: &CallContext, port: &mut VoyagePort) -> Result<(), ShipmanError> {
        let id = port.id;
        let updated_at = ctx
            .run(async {
                sqlx::query_scalar::<_, DateTime<Utc>>(
                    "UPDATE shipman.voyage_ports
                    SET
                        port_name = $2,
                        port_country = $3,
                        port_unlocode = $4,
                        latitude = $5,
                        longitude = $6,
                        arrived_at = $7,
                        departed_at = $8,
                        laytime_hours = $9,
                        cargo_operations = $10,
                        notes = $11,
                        updated_at = NOW()
                    WHERE id = $1
                    RETURNING updated_at",
                )
                .bind(id)
                .bind(&port.port_name)
                .bind(encode_optional(&port.port_country))
                .bind(encode_optional(&port.port_unlocode))
                .bind(encode_optional(&port.latitude))
                .bind(encode_optional(&port.longitude))
                .bind(encode_optional(&port.arrived_at))
                .bind(encode_optional(&port.departed_at))
                .bind(encode_optional(&port.laytime_hours))
                .bind(encode_optional(&port.cargo_operations))
                .bind(encode_optional(&port.notes))
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| ShipmanError::not_found("voyage port", id))
            })
            .await?;

        port.updated_at = updated_at;
        Ok(())
    }

    pub async fn delete(&self, ctx: &CallContext, id: Uuid) -> Result<u64, ShipmanError> {
        ctx.run(async {
            let result = sqlx::query("DELETE FROM shipman.voyage_ports WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
            Ok::<_, ShipmanError>(result.rows_affected())
        })
        .await
    }
}
