//! Vessel repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::codec::{encode_document, encode_optional};
use super::models::VesselRow;
use super::CallContext;
use crate::{errors::ShipmanError, models::Vessel};

macro_rules! columns {
    () => {
        "id, name, imo_number, flag_state, vessel_type, call_sign, \
         deadweight_tonnage, gross_tonnage, net_tonnage, capacity, build_year, \
         class_society, owner, manager, documentation_uri, notes, created_at, updated_at"
    };
}

/// CRUD over `shipman.vessels`
#[derive(Debug, Clone)]
pub struct VesselRepository {
    pool: PgPool,
}

impl VesselRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a vessel. Identifier and timestamps are written back into `vessel`.
    ///
    /// A duplicate IMO number fails with `ConstraintViolation`.
    pub async fn create(&self, ctx: &CallContext, vessel: &mut Vessel) -> Result<(), ShipmanError> {
        let row = ctx
            .run(async {
                sqlx::query_as::<_, VesselRow>(concat!(
                    "INSERT INTO shipman.vessels (
                        name, imo_number, flag_state, vessel_type, call_sign,
                        deadweight_tonnage, gross_tonnage, net_tonnage, capacity, build_year,
                        class_society, owner, manager, documentation_uri, notes
                    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
                    RETURNING ",
                    columns!()
                ))
                .bind(&vessel.name)
                .bind(encode_optional(&vessel.imo_number))
                .bind(encode_optional(&vessel.flag_state))
                .bind(encode_optional(&vessel.vessel_type))
                .bind(encode_optional(&vessel.call_sign))
                .bind(encode_optional(&vessel.deadweight_tonnage))
                .bind(encode_optional(&vessel.gross_tonnage))
                .bind(encode_optional(&vessel.net_tonnage))
                .bind(encode_document(&vessel.capacity))
                .bind(encode_optional(&vessel.build_year))
                .bind(encode_optional(&vessel.class_society))
                .bind(encode_optional(&vessel.owner))
                .bind(encode_optional(&vessel.manager))
                .bind(encode_optional(&vessel.documentation_uri))
                .bind(encode_optional(&vessel.notes))
                .fetch_one(&self.pool)
                .await
                .map_err(ShipmanError::from)
            })
            .await?;

        *vessel = row.into();
        debug!("Created vessel {}", vessel.id);
        Ok(())
    }

    pub async fn retrieve(&self, ctx: &CallContext, id: Uuid) -> Result<Vessel, ShipmanError> {
        ctx.run(async {
            let row = sqlx::query_as::<_, VesselRow>(concat!(
                "SELECT ",
                columns!(),
                " FROM shipman.vessels WHERE id = $1"
            ))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

            row.map(Vessel::from)
                .ok_or_else(|| ShipmanError::not_found("vessel", id))
        })
        .await
    }

    /// Newest first
    pub async fn list(
        &self,
        ctx: &CallContext,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Vessel>, ShipmanError> {
        ctx.run(async {
            let rows = sqlx::query_as::<_, VesselRow>(concat!(
                "SELECT ",
                columns!(),
                " FROM shipman.vessels ORDER BY created_at DESC LIMIT $1 OFFSET $2"
            ))
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

            Ok::<_, ShipmanError>(rows.into_iter().map(Vessel::from).collect())
        })
        .await
    }

    /// Overwrite every editable column. The refreshed `updated_at` is written back.
    pub async fn update(&self, ctx: &CallContext, vessel: &mut Vessel) -> Result<(), ShipmanError> {
        let id = vessel.id;
        let updated_at = ctx
            .run(async {
                sqlx::query_scalar::<_, DateTime<Utc>>(
                    "UPDATE shipman.vessels
                    SET
                        name = $2,
                        imo_number = $3,
                        flag_state = $4,
                        vessel_type = $5,
                        call_sign = $6,
                        deadweight_tonnage = $7,
                        gross_tonnage = $8,
                        net_tonnage = $9,
                        capacity = $10,
                        build_year = $11,
                        class_society = $12,
                        owner = $13,
                        manager = $14,
                        documentation_uri = $15,
                        notes = $16,
                        updated_at = NOW()
                    WHERE id = $1
                    RETURNING updated_at",
                )
                .bind(id)
                .bind(&vessel.name)
                .bind(encode_optional(&vessel.imo_number))
                .bind(encode_optional(&vessel.flag_state))
                .bind(encode_optional(&vessel.vessel_type))
                .bind(encode_optional(&vessel.call_sign))
                .bind(encode_optional(&vessel.deadweight_tonnage))
                .bind(encode_optional(&vessel.gross_tonnage))
                .bind(encode_optional(&vessel.net_tonnage))
                .bind(encode_document(&vessel.capacity))
                .bind(encode_optional(&vessel.build_year))
                .bind(encode_optional(&vessel.class_society))
                .bind(encode_optional(&vessel.owner))
                .bind(encode_optional(&vessel.manager))
                .bind(encode_optional(&vessel.documentation_uri))
                .bind(encode_optional(&vessel.notes))
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| ShipmanError::not_found("vessel", id))
            })
            .await?;

        vessel.updated_at = updated_at;
        Ok(())
    }

    /// Hard delete. Returns the number of rows removed, zero for an unknown id.
    pub async fn delete(&self, ctx: &CallContext, id: Uuid) -> Result<u64, ShipmanError> {
        ctx.run(async {
            let result = sqlx::query("DELETE FROM shipman.vessels WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
            debug!("Deleted vessel {} ({} rows)", id, result.rows_affected());
            Ok::<_, ShipmanError>(result.rows_affected())
        })
        .await
    }
}
