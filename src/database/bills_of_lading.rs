//! Bill of lading repository
//!
//! `encrypted_key` is stored as-is and never logged.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::codec::{encode_bytes, encode_optional};
use super::models::BillOfLadingRow;
use super::CallContext;
use crate::{errors::ShipmanError, models::BillOfLading};

macro_rules! columns {
    () => {
        "id, charter_detail_id, voyage_id, document_number, issue_date, issuer, consignee, \
         notify_party, cargo_description, quantity, quantity_unit, storage_uri, checksum, \
         encrypted_key, notes, created_at, updated_at"
    };
}

#[derive(Debug, Clone)]
pub struct BillOfLadingRepository {
    pool: PgPool,
}

impl BillOfLadingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, ctx: &CallContext, bill: &mut BillOfLading) -> Result<(), ShipmanError> {
        let row = ctx
            .run(async {
                sqlx::query_as::<_, BillOfLadingRow>(concat!(
                    "INSERT INTO shipman.bills_of_lading (
                        charter_detail_id, voyage_id, document_number, issue_date, issuer,
                        consignee, notify_party, cargo_description, quantity, quantity_unit,
                        storage_uri, checksum, encrypted_key, notes
                    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                    RETURNING ",
                    columns!()
                ))
                .bind(bill.charter_detail_id)
                .bind(encode_optional(&bill.voyage_id))
                .bind(&bill.document_number)
                .bind(encode_optional(&bill.issue_date))
                .bind(encode_optional(&bill.issuer))
                .bind(encode_optional(&bill.consignee))
                .bind(encode_optional(&bill.notify_party))
                .bind(encode_optional(&bill.cargo_description))
                .bind(encode_optional(&bill.quantity))
                .bind(encode_optional(&bill.quantity_unit))
                .bind(encode_optional(&bill.storage_uri))
                .bind(encode_optional(&bill.checksum))
                .bind(encode_bytes(&bill.encrypted_key))
                .bind(encode_optional(&bill.notes))
                .fetch_one(&self.pool)
                .await
                .map_err(ShipmanError::from)
            })
            .await?;

        *bill = row.into();
        debug!("Created bill of lading {} ({})", bill.id, bill.document_number);
        Ok(())
    }

    pub async fn retrieve(&self, ctx: &CallContext, id: Uuid) -> Result<BillOfLading, ShipmanError> {
        ctx.run(async {
            let row = sqlx::query_as::<_, BillOfLadingRow>(concat!(
                "SELECT ",
                columns!(),
                " FROM shipman.bills_of_lading WHERE id = $1"
            ))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

            row.map(BillOfLading::from)
                .ok_or_else(|| ShipmanError::not_found("bill of lading", id))
        })
        .await
    }

    /// Bills of a charter by issue date, undated ones last
    pub async fn list_by_charter(
        &self,
        ctx: &CallContext,
        charter_id: Uuid,
    ) -> Result<Vec<BillOfLading>, ShipmanError> {
        ctx.run(async {
            let rows = sqlx::query_as::<_, BillOfLadingRow>(concat!(
                "SELECT ",
                columns!(),
                " FROM shipman.bills_of_lading
                WHERE charter_detail_id = $1
                ORDER BY issue_date ASC NULLS LAST, created_at DESC"
            ))
            .bind(charter_id)
            .fetch_all(&self.pool)
            .await?;

            Ok::<_, ShipmanError>(rows.into_iter().map(BillOfLading::from).collect())
        })
        .await
    }

    pub async fn update(&self, ctx: &CallContext, bill: &mut BillOfLading) -> Result<(), ShipmanError> {
        let id = bill.id;
        let updated_at = ctx
            .run(async {
                sqlx::query_scalar::<_, DateTime<Utc>>(
                    "UPDATE shipman.bills_of_lading
                    SET
                        voyage_id = $2,
                        document_number = $3,
                        issue_date = $4,
                        issuer = $5,
                        consignee = $6,
                        notify_party = $7,
                        cargo_description = $8,
                        quantity = $9,
                        quantity_unit = $10,
                        storage_uri = $11,
                        checksum = $12,
                        encrypted_key = $13,
                        notes = $14,
                        updated_at = NOW()
                    WHERE id = $1
                    RETURNING updated_at",
                )
                .bind(id)
                .bind(encode_optional(&bill.voyage_id))
                .bind(&bill.document_number)
                .bind(encode_optional(&bill.issue_date))
                .bind(encode_optional(&bill.issuer))
                .bind(encode_optional(&bill.consignee))
                .bind(encode_optional(&bill.notify_party))
                .bind(encode_optional(&bill.cargo_description))
                .bind(encode_optional(&bill.quantity))
                .bind(encode_optional(&bill.quantity_unit))
                .bind(encode_optional(&bill.storage_uri))
                .bind(encode_optional(&bill.checksum))
                .bind(encode_bytes(&bill.encrypted_key))
                .bind(encode_optional(&bill.notes))
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| ShipmanError::not_found("bill of lading", id))
            })
            .await?;

        bill.updated_at = updated_at;
        Ok(())
    }

    pub async fn delete(&self, ctx: &CallContext, id: Uuid) -> Result<u64, ShipmanError> {
        ctx.run(async {
            let result = sqlx::query("DELETE FROM shipman.bills_of_lading WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
            Ok::<_, ShipmanError>(result.rows_affected())
        })
        .await
    }
}
