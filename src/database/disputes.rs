//! Dispute repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::codec::{encode_defaulted, encode_optional};
use super::models::DisputeRow;
use super::CallContext;
use crate::{
    errors::ShipmanError,
    models::{Dispute, DisputeStatusUpdate},
};

macro_rules! columns {
    () => {
        "id, charter_detail_id, voyage_id, payment_id, laytime_entry_id, raised_by_org_id, \
         assigned_to_org_id, subject, description, claimed_amount, currency, status, \
         resolution_notes, created_at, updated_at"
    };
}

#[derive(Debug, Clone)]
pub struct DisputeRepository {
    pool: PgPool,
}

impl DisputeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a dispute, `status` defaulting to `open`
    pub async fn create(&self, ctx: &CallContext, dispute: &mut Dispute) -> Result<(), ShipmanError> {
        let row = ctx
            .run(async {
                sqlx::query_as::<_, DisputeRow>(concat!(
                    "INSERT INTO shipman.disputes (
                        charter_detail_id, voyage_id, payment_id, laytime_entry_id,
                        raised_by_org_id, assigned_to_org_id, subject, description,
                        claimed_amount, currency, status, resolution_notes
                    ) VALUES (
                        $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                        COALESCE($11, 'open'),
                        $12
                    )
                    RETURNING ",
                    columns!()
                ))
                .bind(dispute.charter_detail_id)
                .bind(encode_optional(&dispute.voyage_id))
                .bind(encode_optional(&dispute.payment_id))
                .bind(encode_optional(&dispute.laytime_entry_id))
                .bind(dispute.raised_by_org_id)
                .bind(encode_optional(&dispute.assigned_to_org_id))
                .bind(&dispute.subject)
                .bind(encode_optional(&dispute.description))
                .bind(encode_optional(&dispute.claimed_amount))
                .bind(encode_optional(&dispute.currency))
                .bind(encode_defaulted(&dispute.status))
                .bind(encode_optional(&dispute.resolution_notes))
                .fetch_one(&self.pool)
                .await
                .map_err(ShipmanError::from)
            })
            .await?;

        *dispute = row.into();
        debug!("Opened dispute {} on charter {}", dispute.id, dispute.charter_detail_id);
        Ok(())
    }

    pub async fn retrieve(&self, ctx: &CallContext, id: Uuid) -> Result<Dispute, ShipmanError> {
        ctx.run(async {
            let row = sqlx::query_as::<_, DisputeRow>(concat!(
                "SELECT ",
                columns!(),
                " FROM shipman.disputes WHERE id = $1"
            ))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

            row.map(Dispute::from)
                .ok_or_else(|| ShipmanError::not_found("dispute", id))
        })
        .await
    }

    /// Newest first
    pub async fn list_by_charter(
        &self,
        ctx: &CallContext,
        charter_id: Uuid,
    ) -> Result<Vec<Dispute>, ShipmanError> {
        ctx.run(async {
            let rows = sqlx::query_as::<_, DisputeRow>(concat!(
                "SELECT ",
                columns!(),
                " FROM shipman.disputes WHERE charter_detail_id = $1 ORDER BY created_at DESC"
            ))
            .bind(charter_id)
            .fetch_all(&self.pool)
            .await?;

            Ok::<_, ShipmanError>(rows.into_iter().map(Dispute::from).collect())
        })
        .await
    }

    pub async fn update(&self, ctx: &CallContext, dispute: &mut Dispute) -> Result<(), ShipmanError> {
        let id = dispute.id;
        let updated_at = ctx
            .run(async {
                sqlx::query_scalar::<_, DateTime<Utc>>(
                    "UPDATE shipman.disputes
                    SET
                        voyage_id = $2,
                        payment_id = $3,
                        laytime_entry_id = $4,
                        raised_by_org_id = $5,
                        assigned_to_org_id = $6,
                        subject = $7,
                        description = $8,
                        claimed_amount = $9,
                        currency = $10,
                        status = $11,
                        resolution_notes = $12,
                        updated_at = NOW()
                    WHERE id = $1
                    RETURNING updated_at",
                )
                .bind(id)
                .bind(encode_optional(&dispute.voyage_id))
                .bind(encode_optional(&dispute.payment_id))
                .bind(encode_optional(&dispute.laytime_entry_id))
                .bind(dispute.raised_by_org_id)
                .bind(encode_optional(&dispute.assigned_to_org_id))
                .bind(&dispute.subject)
                .bind(encode_optional(&dispute.description))
                .bind(encode_optional(&dispute.claimed_amount))
                .bind(encode_optional(&dispute.currency))
                .bind(&dispute.status)
                .bind(encode_optional(&dispute.resolution_notes))
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| ShipmanError::not_found("dispute", id))
            })
            .await?;

        dispute.updated_at = updated_at;
        Ok(())
    }

    /// Move the dispute along. Absent assignee or resolution notes are kept.
    pub async fn update_status(
        &self,
        ctx: &CallContext,
        id: Uuid,
        change: &DisputeStatusUpdate,
    ) -> Result<DateTime<Utc>, ShipmanError> {
        ctx.run(async {
            sqlx::query_scalar::<_, DateTime<Utc>>(
                "UPDATE shipman.disputes
                SET
                    status = $2,
                    assigned_to_org_id = COALESCE($3, assigned_to_org_id),
                    resolution_notes = COALESCE($4, resolution_notes),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING updated_at",
            )
            .bind(id)
            .bind(&change.status)
            .bind(encode_optional(&change.assigned_to_org_id))
            .bind(encode_optional(&change.resolution_notes))
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ShipmanError::not_found("dispute", id))
        })
        .await
    }

    pub async fn delete(&self, ctx: &CallContext, id: Uuid) -> Result<u64, ShipmanError> {
        ctx.run(async {
            let result = sqlx::query("DELETE FROM shipman.disputes WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
            Ok::<_, ShipmanError>(result.rows_affected())
        })
        .await
    }
}
