//! Cargo load repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::codec::{encode_document, encode_optional};
use super::models::CargoLoadRow;
use super::CallContext;
use crate::{errors::ShipmanError, models::CargoLoad};

macro_rules! columns {
    () => {
        "id, voyage_id, load_port, discharge_port, commodity, quantity, unit, stowage_plan, \
         hazardous, notes, created_at, updated_at"
    };
}

#[derive(Debug, Clone)]
pub struct CargoLoadRepository {
    pool: PgPool,
}

impl CargoLoadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, ctx: &CallContext, cargo: &mut CargoLoad) -> Result<(), ShipmanError> {
        let row = ctx
            .run(async {
                sqlx::query_as::<_, CargoLoadRow>(concat!(
                    "INSERT INTO shipman.cargo_loads (
                        voyage_id, load_port, discharge_port, commodity, quantity, unit,
                        stowage_plan, hazardous, notes
                    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                    RETURNING ",
                    columns!()
                ))
                .bind(cargo.voyage_id)
                .bind(encode_optional(&cargo.load_port))
                .bind(encode_optional(&cargo.discharge_port))
                .bind(encode_optional(&cargo.commodity))
                .bind(encode_optional(&cargo.quantity))
                .bind(encode_optional(&cargo.unit))
                .bind(encode_document(&cargo.stowage_plan))
                .bind(encode_optional(&cargo.hazardous))
                .bind(encode_optional(&cargo.notes))
                .fetch_one(&self.pool)
                .await
                .map_err(ShipmanError::from)
            })
            .await?;

        *cargo = row.into();
        Ok(())
    }

    pub async fn retrieve(&self, ctx: &CallContext, id: Uuid) -> Result<CargoLoad, ShipmanError> {
        ctx.run(async {
            let row = sqlx::query_as::<_, CargoLoadRow>(concat!(
                "SELECT ",
                columns!(),
                " FROM shipman.cargo_loads WHERE id = $1"
            ))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

            row.map(CargoLoad::from)
                .ok_or_else(|| ShipmanError::not_found("cargo load", id))
        })
        .await
    }

    /// Newest first
    pub async fn list_by_voyage(
        &self,
        ctx: &CallContext,
        voyage_id: Uuid,
    ) -> Result<Vec<CargoLoad>, ShipmanError> {
        ctx.run(async {
            let rows = sqlx::query_as::<_, CargoLoadRow>(concat!(
                "SELECT ",
                columns!(),
                " FROM shipman.cargo_loads WHERE voyage_id = $1 ORDER BY created_at DESC"
            ))
            .bind(voyage_id)
            .fetch_all(&self.pool)
            .await?;

            Ok::<_, ShipmanError>(rows.into_iter().map(CargoLoad::from).collect())
        })
        .await
    }

    /// Partial update: every absent field keeps its stored value, so a column
    /// cannot be cleared through here.
    pub async fn update(&self, ctx: &CallContext, cargo: &mut CargoLoad) -> Result<(), ShipmanError> {
        let id = cargo.id;
        let updated_at = ctx
            .run(async {
                sqlx::query_scalar::<_, DateTime<Utc>>(
                    "UPDATE shipman.cargo_loads
                    SET
                        load_port = COALESCE($2, load_port),
                        discharge_port = COALESCE($3, discharge_port),
                        commodity = COALESCE($4, commodity),
                        quantity = COALESCE($5, quantity),
                        unit = COALESCE($6, unit),
                        stowage_plan = COALESCE($7, stowage_plan),
                        hazardous = COALESCE($8, hazardous),
                        notes = COALESCE($9, notes),
                        updated_at = NOW()
                    WHERE id = $1
                    RETURNING updated_at",
                )
                .bind(id)
                .bind(encode_optional(&cargo.load_port))
                .bind(encode_optional(&cargo.discharge_port))
                .bind(encode_optional(&cargo.commodity))
                .bind(encode_optional(&cargo.quantity))
                .bind(encode_optional(&cargo.unit))
                .bind(encode_document(&cargo.stowage_plan))
                .bind(encode_optional(&cargo.hazardous))
                .bind(encode_optional(&cargo.notes))
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| ShipmanError::not_found("cargo load", id))
            })
            .await?;

        cargo.updated_at = updated_at;
        Ok(())
    }

    pub async fn delete(&self, ctx: &CallContext, id: Uuid) -> Result<u64, ShipmanError> {
        ctx.run(async {
            let result = sqlx::query("DELETE FROM shipman.cargo_loads WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
            Ok::<_, ShipmanError>(result.rows_affected())
        })
        .await
    }
}
