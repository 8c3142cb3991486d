// src/db/attendance_repo.rs
//
// Coleção attendance_logs: um documento por (dia, funcionário), id
// "{date}_{userId}". A conversão linha→documento aplica o upgrade do
// formato legado UMA única vez; nenhum outro ponto do código volta a olhar
// para o formato antigo.

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres, types::Json};

use crate::{
    common::error::AppError,
    models::attendance::{AttendanceDoc, StoredSessions, WorkSession},
};

#[derive(sqlx::FromRow)]
struct AttendanceRow {
    id: String,
    user_id: String,
    name: String,
    date: String,
    sessions: Option<Json<Vec<WorkSession>>>,
    check_in: Option<DateTime<Utc>>,
    check_out: Option<DateTime<Utc>>,
}

impl AttendanceRow {
    fn into_doc(self) -> AttendanceDoc {
        let stored = match self.sessions {
            Some(Json(sessions)) => StoredSessions::Current(sessions),
            // sessions NULL ⇒ registro legado de campo único.
            None => StoredSessions::Legacy {
                check_in: self.check_in,
                check_out: self.check_out,
            },
        };

        // Poly-fill de documentos muito antigos sem o campo de data: a
        // chave do documento começa com YYYY-MM-DD.
        let date = if self.date.is_empty() {
            self.id.split('_').next().unwrap_or_default().to_string()
        } else {
            self.date
        };

        AttendanceDoc {
            user_id: self.user_id,
            name: self.name,
            date,
            sessions: stored.upgrade(),
            check_in: self.check_in,
            check_out: self.check_out,
        }
    }
}

const ATT_COLUMNS: &str = "id, user_id, name, date, sessions, check_in, check_out";

#[derive(Clone)]
pub struct AttendanceRepository {
    pool: PgPool,
}

impl AttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, doc_id: &str) -> Result<Option<AttendanceDoc>, AppError> {
        let row = sqlx::query_as::<_, AttendanceRow>(&format!(
            "SELECT {ATT_COLUMNS} FROM attendance_logs WHERE id = $1"
        ))
        .bind(doc_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AttendanceRow::into_doc))
    }

    // Leitura com trava de linha: quem chamou está dentro de uma transação
    // e vai regravar o documento inteiro antes do commit. É a garantia de
    // read-modify-write atômico por documento.
    pub async fn get_for_update<'e, E>(
        &self,
        executor: E,
        doc_id: &str,
    ) -> Result<Option<AttendanceDoc>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, AttendanceRow>(&format!(
            "SELECT {ATT_COLUMNS} FROM attendance_logs WHERE id = $1 FOR UPDATE"
        ))
        .bind(doc_id)
        .fetch_optional(executor)
        .await?;

        Ok(row.map(AttendanceRow::into_doc))
    }

    // Substituição integral do documento. Depois de qualquer escrita o
    // array de sessões passa a existir (formato atual), mesmo que vazio.
    pub async fn put<'e, E>(
        &self,
        executor: E,
        doc_id: &str,
        doc: &AttendanceDoc,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO attendance_logs (id, user_id, name, date, sessions, check_in, check_out, last_updated)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            ON CONFLICT (id) DO UPDATE SET
                user_id = EXCLUDED.user_id,
                name = EXCLUDED.name,
                date = EXCLUDED.date,
                sessions = EXCLUDED.sessions,
                check_in = EXCLUDED.check_in,
                check_out = EXCLUDED.check_out,
                last_updated = NOW()
            "#,
        )
        .bind(doc_id)
        .bind(&doc.user_id)
        .bind(&doc.name)
        .bind(&doc.date)
        .bind(Json(&doc.sessions))
        .bind(doc.check_in)
        .bind(doc.check_out)
        .execute(executor)
        .await?;

        Ok(())
    }

    // Todos os registros de um funcionário dentro de [from, to], em ordem
    // de data. Chaves YYYY-MM-DD comparam lexicograficamente.
    pub async fn list_range(
        &self,
        user_id: &str,
        from_key: &str,
        to_key: &str,
    ) -> Result<Vec<AttendanceDoc>, AppError> {
        let rows = sqlx::query_as::<_, AttendanceRow>(&format!(
            "SELECT {ATT_COLUMNS} FROM attendance_logs
             WHERE user_id = $1 AND date >= $2 AND date <= $3
             ORDER BY date"
        ))
        .bind(user_id)
        .bind(from_key)
        .bind(to_key)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AttendanceRow::into_doc).collect())
    }

    pub async fn list_by_date(&self, date_key: &str) -> Result<Vec<AttendanceDoc>, AppError> {
        let rows = sqlx::query_as::<_, AttendanceRow>(&format!(
            "SELECT {ATT_COLUMNS} FROM attendance_logs WHERE date = $1"
        ))
        .bind(date_key)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AttendanceRow::into_doc).collect())
    }

    // ---- Manutenção / retenção ----

    pub async fn list_before(&self, cutoff_key: &str) -> Result<Vec<AttendanceDoc>, AppError> {
        let rows = sqlx::query_as::<_, AttendanceRow>(&format!(
            "SELECT {ATT_COLUMNS} FROM attendance_logs WHERE date < $1 ORDER BY date"
        ))
        .bind(cutoff_key)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AttendanceRow::into_doc).collect())
    }

    pub async fn count_before<'e, E>(&self, executor: E, cutoff_key: &str) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM attendance_logs WHERE date < $1")
            .bind(cutoff_key)
            .fetch_one(executor)
            .await?;
        Ok(count)
    }

    pub async fn delete_before<'e, E>(&self, executor: E, cutoff_key: &str) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM attendance_logs WHERE date < $1")
            .bind(cutoff_key)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
