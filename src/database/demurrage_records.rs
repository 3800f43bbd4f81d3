//! Demurrage record repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::codec::{encode_defaulted, encode_optional};
use super::models::DemurrageRecordRow;
use super::CallContext;
use crate::{
    errors::ShipmanError,
    models::{DemurrageRecord, DemurrageStatusUpdate},
};

macro_rules! columns {
    () => {
        "id, charter_detail_id, voyage_id, laytime_entry_id, claimed_hours, claimed_amount, \
         currency, status, reference, supporting_doc_uri, notes, created_at, updated_at"
    };
}

/// CRUD over `shipman.demurrage_records`
#[derive(Debug, Clone)]
pub struct DemurrageRecordRepository {
    pool: PgPool,
}

impl DemurrageRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a claim. Empty `currency` and `status` become `USD` and `draft`.
    pub async fn create(
        &self,
        ctx: &CallContext,
        record: &mut DemurrageRecord,
    ) -> Result<(), ShipmanError> {
        let row = ctx
            .run(async {
                sqlx::query_as::<_, DemurrageRecordRow>(concat!(
                    "INSERT INTO shipman.demurrage_records (
                        charter_detail_id, voyage_id, laytime_entry_id, claimed_hours,
                        claimed_amount, currency, status, reference, supporting_doc_uri, notes
                    ) VALUES (
                        $1, $2, $3, $4, $5,
                        COALESCE($6, 'USD'),
                        COALESCE($7, 'draft'),
                        $8, $9, $10
                    )
                    RETURNING ",
                    columns!()
                ))
                .bind(record.charter_detail_id)
                .bind(encode_optional(&record.voyage_id))
                .bind(encode_optional(&record.laytime_entry_id))
                .bind(encode_optional(&record.claimed_hours))
                .bind(encode_optional(&record.claimed_amount))
                .bind(encode_defaulted(&record.currency))
                .bind(encode_defaulted(&record.status))
                .bind(encode_optional(&record.reference))
                .bind(encode_optional(&record.supporting_doc_uri))
                .bind(encode_optional(&record.notes))
                .fetch_one(&self.pool)
                .await
                .map_err(ShipmanError::from)
            })
            .await?;

        *record = row.into();
        debug!("Created demurrage record {}", record.id);
        Ok(())
    }

    pub async fn retrieve(
        &self,
        ctx: &CallContext,
        id: Uuid,
    ) -> Result<DemurrageRecord, ShipmanError> {
        ctx.run(async {
            let row = sqlx::query_as::<_, DemurrageRecordRow>(concat!(
                "SELECT ",
                columns!(),
                " FROM shipman.demurrage_records WHERE id = $1"
            ))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

            row.map(DemurrageRecord::from)
                .ok_or_else(|| ShipmanError::not_found("demurrage record", id))
        })
        .await
    }

    /// Newest first
    pub async fn list_by_charter(
        &self,
        ctx: &CallContext,
        charter_id: Uuid,
    ) -> Result<Vec<DemurrageRecord>, ShipmanError> {
        ctx.run(async {
            let rows = sqlx::query_as::<_, DemurrageRecordRow>(concat!(
                "SELECT ",
                columns!(),
                " FROM shipman.demurrage_records
                WHERE charter_detail_id = $1
                ORDER BY created_at DESC"
            ))
            .bind(charter_id)
            .fetch_all(&self.pool)
            .await?;

            Ok::<_, ShipmanError>(rows.into_iter().map(DemurrageRecord::from).collect())
        })
        .await
    }

    pub async fn update(
        &self,
        ctx: &CallContext,
        record: &mut DemurrageRecord,
    ) -> Result<(), ShipmanError> {
        let id = record.id;
        let updated_at = ctx
            .run(async {
                sqlx::query_scalar::<_, DateTime<Utc>>(
                    "UPDATE shipman.demurrage_records
                    SET
                        voyage_id = $2,
                        laytime_entry_id = $3,
                        claimed_hours = $4,
                        claimed_amount = $5,
                        currency = $6,
                        status = $7,
                        reference = $8,
                        supporting_doc_uri = $9,
                        notes = $10,
                        updated_at = NOW()
                    WHERE id = $1
                    RETURNING updated_at",
                )
                .bind(id)
                .bind(encode_optional(&record.voyage_id))
                .bind(encode_optional(&record.laytime_entry_id))
                .bind(encode_optional(&record.claimed_hours))
                .bind(encode_optional(&record.claimed_amount))
                .bind(&record.currency)
                .bind(&record.status)
                .bind(encode_optional(&record.reference))
                .bind(encode_optional(&record.supporting_doc_uri))
                .bind(encode_optional(&record.notes))
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| ShipmanError::not_found("demurrage record", id))
            })
            .await?;

        record.updated_at = updated_at;
        Ok(())
    }

    /// Set the claim status. Absent reference, document link or notes are kept.
    pub async fn update_status(
        &self,
        ctx: &CallContext,
        id: Uuid,
        change: &DemurrageStatusUpdate,
    ) -> Result<DateTime<Utc>, ShipmanError> {
        ctx.run(async {
            sqlx::query_scalar::<_, DateTime<Utc>>(
                "UPDATE shipman.demurrage_records
                SET
                    status = $2,
                    reference = COALESCE($3, reference),
                    supporting_doc_uri = COALESCE($4, supporting_doc_uri),
                    notes = COALESCE($5, notes),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING updated_at",
            )
            .bind(id)
            .bind(&change.status)
            .bind(encode_optional(&change.reference))
            .bind(encode_optional(&change.supporting_doc_uri))
            .bind(encode_optional(&change.notes))
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ShipmanError::not_found("demurrage record", id))
        })
        .await
    }

    pub async fn delete(&self, ctx: &CallContext, id: Uuid) -> Result<u64, ShipmanError> {
        ctx.run(async {
            let result = sqlx::query("DELETE FROM shipman.demurrage_records WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
            Ok::<_, ShipmanError>(result.rows_affected())
        })
        .await
    }
}
