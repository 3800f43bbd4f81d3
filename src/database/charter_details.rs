//! Charter detail repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::codec::{encode_defaulted, encode_document, encode_optional};
use super::models::CharterDetailRow;
use super::CallContext;
use crate::{
    errors::ShipmanError,
    models::{CharterDetail, CharterStatusUpdate},
};

macro_rules! columns {
    () => {
        "id, created_by_user_id, title, charter_reference_code, vessel_name, counterparty_name, \
         status, start_date, end_date, laytime_allowance_hours, demurrage_rate, demurrage_currency, \
         fuel_clause, payment_terms, ai_status, ai_document_path, ai_extracted_terms, \
         last_reviewed_at, notes, created_at, updated_at"
    };
}

/// CRUD over `shipman.charter_details`
///
/// Deleting a charter removes its voyages, laytime entries, payments,
/// disputes, bills of lading and demurrage records with it.
#[derive(Debug, Clone)]
pub struct CharterDetailRepository {
    pool: PgPool,
}

impl CharterDetailRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a charter. `status` defaults to `draft` and `ai_status` to
    /// `pending`; both are written back together with id and timestamps.
    pub async fn create(
        &self,
        ctx: &CallContext,
        detail: &mut CharterDetail,
    ) -> Result<(), ShipmanError> {
        let row = ctx
            .run(async {
                sqlx::query_as::<_, CharterDetailRow>(concat!(
                    "INSERT INTO shipman.charter_details (
                        created_by_user_id, title, charter_reference_code, vessel_name,
                        counterparty_name, status, start_date, end_date,
                        laytime_allowance_hours, demurrage_rate, demurrage_currency,
                        fuel_clause, payment_terms, ai_status, ai_document_path,
                        ai_extracted_terms, last_reviewed_at, notes
                    ) VALUES (
                        $1, $2, $3, $4, $5,
                        COALESCE($6, 'draft'),
                        $7, $8, $9, $10, $11, $12, $13,
                        COALESCE($14, 'pending'),
                        $15, $16, $17, $18
                    )
                    RETURNING ",
                    columns!()
                ))
                .bind(encode_optional(&detail.created_by_user_id))
                .bind(&detail.title)
                .bind(encode_optional(&detail.charter_reference_code))
                .bind(encode_optional(&detail.vessel_name))
                .bind(encode_optional(&detail.counterparty_name))
                .bind(encode_defaulted(&detail.status))
                .bind(encode_optional(&detail.start_date))
                .bind(encode_optional(&detail.end_date))
                .bind(encode_optional(&detail.laytime_allowance_hours))
                .bind(encode_optional(&detail.demurrage_rate))
                .bind(encode_optional(&detail.demurrage_currency))
                .bind(encode_optional(&detail.fuel_clause))
                .bind(encode_optional(&detail.payment_terms))
                .bind(encode_defaulted(&detail.ai_status))
                .bind(encode_optional(&detail.ai_document_path))
                .bind(encode_document(&detail.ai_extracted_terms))
                .bind(encode_optional(&detail.last_reviewed_at))
                .bind(encode_optional(&detail.notes))
                .fetch_one(&self.pool)
                .await
                .map_err(ShipmanError::from)
            })
            .await?;

        *detail = row.into();
        debug!("Created charter detail {}", detail.id);
        Ok(())
    }

    pub async fn retrieve(
        &self,
        ctx: &CallContext,
        id: Uuid,
    ) -> Result<CharterDetail, ShipmanError> {
        ctx.run(async {
            let row = sqlx::query_as::<_, CharterDetailRow>(concat!(
                "SELECT ",
                columns!(),
                " FROM shipman.charter_details WHERE id = $1"
            ))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

            row.map(CharterDetail::from)
                .ok_or_else(|| ShipmanError::not_found("charter detail", id))
        })
        .await
    }

    /// Newest first
    pub async fn list(
        &self,
        ctx: &CallContext,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CharterDetail>, ShipmanError> {
        ctx.run(async {
            let rows = sqlx::query_as::<_, CharterDetailRow>(concat!(
                "SELECT ",
                columns!(),
                " FROM shipman.charter_details ORDER BY created_at DESC LIMIT $1 OFFSET $2"
            ))
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

            Ok::<_, ShipmanError>(rows.into_iter().map(CharterDetail::from).collect())
        })
        .await
    }

    /// Overwrite every editable column, including both status fields
    pub async fn update(
        &self,
        ctx: &CallContext,
        detail: &mut CharterDetail,
    ) -> Result<(), ShipmanError> {
        let id = detail.id;
        let updated_at = ctx
            .run(async {
                sqlx::query_scalar::<_, DateTime<Utc>>(
                    "UPDATE shipman.charter_details
                    SET
                        title = $2,
                        charter_reference_code = $3,
                        vessel_name = $4,
                        counterparty_name = $5,
                        status = $6,
                        start_date = $7,
                        end_date = $8,
                        laytime_allowance_hours = $9,
                        demurrage_rate = $10,
                        demurrage_currency = $11,
                        fuel_clause = $12,
                        payment_terms = $13,
                        ai_status = $14,
                        ai_document_path = $15,
                        ai_extracted_terms = $16,
                        last_reviewed_at = $17,
                        notes = $18,
                        updated_at = NOW()
                    WHERE id = $1
                    RETURNING updated_at",
                )
                .bind(id)
                .bind(&detail.title)
                .bind(encode_optional(&detail.charter_reference_code))
                .bind(encode_optional(&detail.vessel_name))
                .bind(encode_optional(&detail.counterparty_name))
                .bind(&detail.status)
                .bind(encode_optional(&detail.start_date))
                .bind(encode_optional(&detail.end_date))
                .bind(encode_optional(&detail.laytime_allowance_hours))
                .bind(encode_optional(&detail.demurrage_rate))
                .bind(encode_optional(&detail.demurrage_currency))
                .bind(encode_optional(&detail.fuel_clause))
                .bind(encode_optional(&detail.payment_terms))
                .bind(&detail.ai_status)
                .bind(encode_optional(&detail.ai_document_path))
                .bind(encode_document(&detail.ai_extracted_terms))
                .bind(encode_optional(&detail.last_reviewed_at))
                .bind(encode_optional(&detail.notes))
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| ShipmanError::not_found("charter detail", id))
            })
            .await?;

        detail.updated_at = updated_at;
        Ok(())
    }

    /// Touch only the lifecycle columns. Each absent field keeps its stored value.
    /// Returns the refreshed `updated_at`.
    pub async fn update_status(
        &self,
        ctx: &CallContext,
        id: Uuid,
        change: &CharterStatusUpdate,
    ) -> Result<DateTime<Utc>, ShipmanError> {
        ctx.run(async {
            sqlx::query_scalar::<_, DateTime<Utc>>(
                "UPDATE shipman.charter_details
                SET
                    status = COALESCE($2, status),
                    ai_status = COALESCE($3, ai_status),
                    last_reviewed_at = COALESCE($4, last_reviewed_at),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING updated_at",
            )
            .bind(id)
            .bind(encode_optional(&change.status))
            .bind(encode_optional(&change.ai_status))
            .bind(encode_optional(&change.last_reviewed_at))
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ShipmanError::not_found("charter detail", id))
        })
        .await
    }

    pub async fn delete(&self, ctx: &CallContext, id: Uuid) -> Result<u64, ShipmanError> {
        ctx.run(async {
            let result = sqlx::query("DELETE FROM shipman.charter_details WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
            debug!("Deleted charter detail {} ({} rows)", id, result.rows_affected());
            Ok::<_, ShipmanError>(result.rows_affected())
        })
        .await
    }
}
