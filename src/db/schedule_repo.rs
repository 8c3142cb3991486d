// src/db/schedule_repo.rs
//
// Coleção schedules (um documento JSONB por dia) e o manifesto
// settings/'schedule_manifest' que indexa quais dias têm agenda explícita.

use sqlx::{Executor, PgPool, Postgres, types::Json};

use crate::{
    common::error::AppError,
    models::schedule::{ScheduleDay, ScheduleManifest},
};

#[derive(sqlx::FromRow)]
struct ScheduleRow {
    date_key: String,
    doc: Json<ScheduleDay>,
}

#[derive(Clone)]
pub struct ScheduleRepository {
    pool: PgPool,
}

impl ScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get<'e, E>(&self, executor: E, date_key: &str) -> Result<Option<ScheduleDay>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, ScheduleRow>(
            "SELECT date_key, doc FROM schedules WHERE date_key = $1",
        )
        .bind(date_key)
        .fetch_optional(executor)
        .await?;

        Ok(row.map(|r| r.doc.0))
    }

    // Trava o documento do dia para o toggle de registro; o chamador está
    // em transação e regrava o documento inteiro.
    pub async fn get_for_update<'e, E>(
        &self,
        executor: E,
        date_key: &str,
    ) -> Result<Option<ScheduleDay>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, ScheduleRow>(
            "SELECT date_key, doc FROM schedules WHERE date_key = $1 FOR UPDATE",
        )
        .bind(date_key)
        .fetch_optional(executor)
        .await?;

        Ok(row.map(|r| r.doc.0))
    }

    // Substituição integral: registros e materialização de modelo podem se
    // intercalar, então nunca gravamos campo a campo.
    pub async fn put<'e, E>(
        &self,
        executor: E,
        date_key: &str,
        doc: &ScheduleDay,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO schedules (date_key, doc, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (date_key) DO UPDATE SET
                doc = EXCLUDED.doc,
                updated_at = NOW()
            "#,
        )
        .bind(date_key)
        .bind(Json(doc))
        .execute(executor)
        .await?;

        Ok(())
    }

    // Todos os dias com agenda explícita dentro de [from, to].
    pub async fn list_range(
        &self,
        from_key: &str,
        to_key: &str,
    ) -> Result<Vec<(String, ScheduleDay)>, AppError> {
        let rows = sqlx::query_as::<_, ScheduleRow>(
            "SELECT date_key, doc FROM schedules
             WHERE date_key >= $1 AND date_key <= $2
             ORDER BY date_key",
        )
        .bind(from_key)
        .bind(to_key)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| (r.date_key, r.doc.0)).collect())
    }

    // ---- Manifesto ----

    pub async fn get_manifest<'e, E>(&self, executor: E) -> Result<ScheduleManifest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let doc: Option<Json<ScheduleManifest>> =
            sqlx::query_scalar("SELECT doc FROM settings WHERE key = 'schedule_manifest'")
                .fetch_optional(executor)
                .await?;

        Ok(doc.map(|d| d.0).unwrap_or_default())
    }

    // Versão com trava de linha, para o read-modify-write do manifesto.
    pub async fn get_manifest_for_update<'e, E>(
        &self,
        executor: E,
    ) -> Result<ScheduleManifest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let doc: Option<Json<ScheduleManifest>> = sqlx::query_scalar(
            "SELECT doc FROM settings WHERE key = 'schedule_manifest' FOR UPDATE",
        )
        .fetch_optional(executor)
        .await?;

        Ok(doc.map(|d| d.0).unwrap_or_default())
    }

    pub async fn put_manifest<'e, E>(
        &self,
        executor: E,
        manifest: &ScheduleManifest,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO settings (key, doc, updated_at)
            VALUES ('schedule_manifest', $1, NOW())
            ON CONFLICT (key) DO UPDATE SET
                doc = EXCLUDED.doc,
                updated_at = NOW()
            "#,
        )
        .bind(Json(manifest))
        .execute(executor)
        .await?;

        Ok(())
    }
}
