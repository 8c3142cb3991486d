// src/db/salary_repo.rs

use sqlx::{PgPool, types::Json};

use crate::{
    common::error::AppError,
    models::salary::{EvaluationEntry, SalarySheet},
};

#[derive(sqlx::FromRow)]
struct SheetRow {
    staff_id: String,
    month: String,
    advance: f64,
    evaluation: Json<Vec<EvaluationEntry>>,
}

// Folha mensal de avaliação; id = "{month}_{staffId}".
#[derive(Clone)]
pub struct SalaryRepository {
    pool: PgPool,
}

impl SalaryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn sheet_id(month: &str, staff_id: &str) -> String {
        format!("{month}_{staff_id}")
    }

    pub async fn get(&self, month: &str, staff_id: &str) -> Result<Option<SalarySheet>, AppError> {
        let row = sqlx::query_as::<_, SheetRow>(
            "SELECT staff_id, month, advance, evaluation FROM salary_sheets WHERE id = $1",
        )
        .bind(Self::sheet_id(month, staff_id))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| SalarySheet {
            staff_id: r.staff_id,
            month: r.month,
            advance: r.advance,
            evaluation: r.evaluation.0,
        }))
    }

    pub async fn upsert(&self, sheet: &SalarySheet) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO salary_sheets (id, staff_id, month, advance, evaluation, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (id) DO UPDATE SET
                advance = EXCLUDED.advance,
                evaluation = EXCLUDED.evaluation,
                updated_at = NOW()
            "#,
        )
        .bind(Self::sheet_id(&sheet.month, &sheet.staff_id))
        .bind(&sheet.staff_id)
        .bind(&sheet.month)
        .bind(sheet.advance)
        .bind(Json(&sheet.evaluation))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
