//! Laytime entry repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::codec::encode_optional;
use super::models::LaytimeEntryRow;
use super::CallContext;
use crate::{errors::ShipmanError, models::LaytimeEntry};

macro_rules! columns {
    () => {
        "id, charter_detail_id, voyage_id, port_name, activity, started_at, ended_at, \
         hours_counted, remarks, created_at, updated_at"
    };
}

/// CRUD over `shipman.laytime_entries`
///
/// Entries belong to a charter; the voyage link is optional and is cleared
/// when the voyage goes away.
#[derive(Debug, Clone)]
pub struct LaytimeEntryRepository {
    pool: PgPool,
}

impl LaytimeEntryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        ctx: &CallContext,
        entry: &mut LaytimeEntry,
    ) -> Result<(), ShipmanError> {
        let row = ctx
            .run(async {
                sqlx::query_as::<_, LaytimeEntryRow>(concat!(
                    "INSERT INTO shipman.laytime_entries (
                        charter_detail_id, voyage_id, port_name, activity, started_at,
                        ended_at, hours_counted, remarks
                    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                    RETURNING ",
                    columns!()
                ))
                .bind(entry.charter_detail_id)
                .bind(encode_optional(&entry.voyage_id))
                .bind(&entry.port_name)
                .bind(&entry.activity)
                .bind(entry.started_at)
                .bind(encode_optional(&entry.ended_at))
                .bind(encode_optional(&entry.hours_counted))
                .bind(encode_optional(&entry.remarks))
                .fetch_one(&self.pool)
                .await
                .map_err(ShipmanError::from)
            })
            .await?;

        *entry = row.into();
        Ok(())
    }

    pub async fn retrieve(
        &self,
        ctx: &CallContext,
        id: Uuid,
    ) -> Result<LaytimeEntry, ShipmanError> {
        ctx.run(async {
            let row = sqlx::query_as::<_, LaytimeEntryRow>(concat!(
                "SELECT ",
                columns!(),
                " FROM shipman.laytime_entries WHERE id = $1"
            ))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

            row.map(LaytimeEntry::from)
                .ok_or_else(|| ShipmanError::not_found("laytime entry", id))
        })
        .await
    }

    /// Entries of a voyage in chronological order
    pub async fn list_by_voyage(
        &self,
        ctx: &CallContext,
        voyage_id: Uuid,
    ) -> Result<Vec<LaytimeEntry>, ShipmanError> {
        ctx.run(async {
            let rows = sqlx::query_as::<_, LaytimeEntryRow>(concat!(
                "SELECT ",
                columns!(),
                " FROM shipman.laytime_entries WHERE voyage_id = $1 ORDER BY started_at ASC"
            ))
            .bind(voyage_id)
            .fetch_all(&self.pool)
            .await?;

            Ok::<_, ShipmanError>(rows.into_iter().map(LaytimeEntry::from).collect())
        })
        .await
    }

    /// Entries of a charter in chronological order, with or without a voyage
    pub async fn list_by_charter(
        &self,
        ctx: &CallContext,
        charter_id: Uuid,
    ) -> Result<Vec<LaytimeEntry>, ShipmanError> {
        ctx.run(async {
            let rows = sqlx::query_as::<_, LaytimeEntryRow>(concat!(
                "SELECT ",
                columns!(),
                " FROM shipman.laytime_entries WHERE charter_detail_id = $1 ORDER BY started_at ASC"
            ))
            .bind(charter_id)
            .fetch_all(&self.pool)
            .await?;

            Ok::<_, ShipmanError>(rows.into_iter().map(LaytimeEntry::from).collect())
        })
        .await
    }

    pub async fn update(
        &self,
        ctx: &CallContext,
        entry: &mut LaytimeEntry,
    ) -> Result<(), ShipmanError> {
        let id = entry.id;
        let updated_at = ctx
            .run(async {
                sqlx::query_scalar::<_, DateTime<Utc>>(
                    "UPDATE shipman.laytime_entries
                    SET
                        voyage_id = $2,
                        port_name = $3,
                        activity = $4,
                        started_at = $5,
                        ended_at = $6,
                        hours_counted = $7,
                        remarks = $8,
                        updated_at = NOW()
                    WHERE id = $1
                    RETURNING updated_at",
                )
                .bind(id)
                .bind(encode_optional(&entry.voyage_id))
                .bind(&entry.port_name)
                .bind(&entry.activity)
                .bind(entry.started_at)
                .bind(encode_optional(&entry.ended_at))
                .bind(encode_optional(&entry.hours_counted))
                .bind(encode_optional(&entry.remarks))
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| ShipmanError::not_found("laytime entry", id))
            })
            .await?;

        entry.updated_at = updated_at;
        Ok(())
    }

    pub async fn delete(&self, ctx: &CallContext, id: Uuid) -> Result<u64, ShipmanError> {
        ctx.run(async {
            let result = sqlx::query("DELETE FROM shipman.laytime_entries WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
            Ok::<_, ShipmanError>(result.rows_affected())
        })
        .await
    }
}
