//! Payment repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::codec::{encode_defaulted, encode_optional};
use super::models::PaymentRow;
use super::CallContext;
use crate::{
    errors::ShipmanError,
    models::{Payment, PaymentStatusUpdate},
};

macro_rules! columns {
    () => {
        "id, charter_detail_id, voyage_id, category, due_date, paid_at, amount, currency, \
         status, payment_method, reference, notes, created_at, updated_at"
    };
}

/// CRUD over `shipman.payments`
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a payment. Empty `category`, `currency` and `status` fall back
    /// to `general`, `USD` and `pending`.
    pub async fn create(&self, ctx: &CallContext, payment: &mut Payment) -> Result<(), ShipmanError> {
        let row = ctx
            .run(async {
                sqlx::query_as::<_, PaymentRow>(concat!(
                    "INSERT INTO shipman.payments (
                        charter_detail_id, voyage_id, category, due_date, paid_at, amount,
                        currency, status, payment_method, reference, notes
                    ) VALUES (
                        $1, $2,
                        COALESCE($3, 'general'),
                        $4, $5, $6,
                        COALESCE($7, 'USD'),
                        COALESCE($8, 'pending'),
                        $9, $10, $11
                    )
                    RETURNING ",
                    columns!()
                ))
                .bind(payment.charter_detail_id)
                .bind(encode_optional(&payment.voyage_id))
                .bind(encode_defaulted(&payment.category))
                .bind(encode_optional(&payment.due_date))
                .bind(encode_optional(&payment.paid_at))
                .bind(payment.amount)
                .bind(encode_defaulted(&payment.currency))
                .bind(encode_defaulted(&payment.status))
                .bind(encode_optional(&payment.payment_method))
                .bind(encode_optional(&payment.reference))
                .bind(encode_optional(&payment.notes))
                .fetch_one(&self.pool)
                .await
                .map_err(ShipmanError::from)
            })
            .await?;

        *payment = row.into();
        debug!("Created payment {} for charter {}", payment.id, payment.charter_detail_id);
        Ok(())
    }

    pub async fn retrieve(&self, ctx: &CallContext, id: Uuid) -> Result<Payment, ShipmanError> {
        ctx.run(async {
            let row = sqlx::query_as::<_, PaymentRow>(concat!(
                "SELECT ",
                columns!(),
                " FROM shipman.payments WHERE id = $1"
            ))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

            row.map(Payment::from)
                .ok_or_else(|| ShipmanError::not_found("payment", id))
        })
        .await
    }

    /// Payments of a charter by due date, undated ones last
    pub async fn list_by_charter(
        &self,
        ctx: &CallContext,
        charter_id: Uuid,
    ) -> Result<Vec<Payment>, ShipmanError> {
        ctx.run(async {
            let rows = sqlx::query_as::<_, PaymentRow>(concat!(
                "SELECT ",
                columns!(),
                " FROM shipman.payments
                WHERE charter_detail_id = $1
                ORDER BY due_date ASC NULLS LAST, created_at DESC"
            ))
            .bind(charter_id)
            .fetch_all(&self.pool)
            .await?;

            Ok::<_, ShipmanError>(rows.into_iter().map(Payment::from).collect())
        })
        .await
    }

    pub async fn update(&self, ctx: &CallContext, payment: &mut Payment) -> Result<(), ShipmanError> {
        let id = payment.id;
        let updated_at = ctx
            .run(async {
                sqlx::query_scalar::<_, DateTime<Utc>>(
                    "UPDATE shipman.payments
                    SET
                        voyage_id = $2,
                        category = $3,
                        due_date = $4,
                        paid_at = $5,
                        amount = $6,
                        currency = $7,
                        status = $8,
                        payment_method = $9,
                        reference = $10,
                        notes = $11,
                        updated_at = NOW()
                    WHERE id = $1
                    RETURNING updated_at",
                )
                .bind(id)
                .bind(encode_optional(&payment.voyage_id))
                .bind(&payment.category)
                .bind(encode_optional(&payment.due_date))
                .bind(encode_optional(&payment.paid_at))
                .bind(payment.amount)
                .bind(&payment.currency)
                .bind(&payment.status)
                .bind(encode_optional(&payment.payment_method))
                .bind(encode_optional(&payment.reference))
                .bind(encode_optional(&payment.notes))
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| ShipmanError::not_found("payment", id))
            })
            .await?;

        payment.updated_at = updated_at;
        Ok(())
    }

    /// Set the status. Absent `paid_at` or `reference` keep their stored values.
    pub async fn update_status(
        &self,
        ctx: &CallContext,
        id: Uuid,
        change: &PaymentStatusUpdate,
    ) -> Result<DateTime<Utc>, ShipmanError> {
        ctx.run(async {
            sqlx::query_scalar::<_, DateTime<Utc>>(
                "UPDATE shipman.payments
                SET
                    status = $2,
                    paid_at = COALESCE($3, paid_at),
                    reference = COALESCE($4, reference),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING updated_at",
            )
            .bind(id)
            .bind(&change.status)
            .bind(encode_optional(&change.paid_at))
            .bind(encode_optional(&change.reference))
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ShipmanError::not_found("payment", id))
        })
        .await
    }

    pub async fn delete(&self, ctx: &CallContext, id: Uuid) -> Result<u64, ShipmanError> {
        ctx.run(async {
            let result = sqlx::query("DELETE FROM shipman.payments WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
            Ok::<_, ShipmanError>(result.rows_affected())
        })
        .await
    }
}
