// src/db/settings_repo.rs

use serde_json::Value;
use sqlx::{PgPool, types::Json};

use crate::{common::error::AppError, models::settings::SystemSettings};

#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Documento ausente vale como configuração vazia (sem restrições).
    pub async fn get_system(&self) -> Result<SystemSettings, AppError> {
        let doc: Option<Json<SystemSettings>> =
            sqlx::query_scalar("SELECT doc FROM settings WHERE key = 'system'")
                .fetch_optional(&self.pool)
                .await?;

        Ok(doc.map(|d| d.0).unwrap_or_default())
    }

    // Merge raso sobre o documento existente (o `set(..., {merge: true})`
    // do sistema antigo): chaves não enviadas permanecem como estão.
    pub async fn merge_system(&self, patch: Value) -> Result<SystemSettings, AppError> {
        let doc: Json<SystemSettings> = sqlx::query_scalar(
            r#"
            INSERT INTO settings (key, doc, updated_at)
            VALUES ('system', $1, NOW())
            ON CONFLICT (key) DO UPDATE SET
                doc = settings.doc || EXCLUDED.doc,
                updated_at = NOW()
            RETURNING doc
            "#,
        )
        .bind(Json(patch))
        .fetch_one(&self.pool)
        .await?;

        Ok(doc.0)
    }
}
