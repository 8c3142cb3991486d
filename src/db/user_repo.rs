// src/db/user_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres, types::Json};

use crate::{
    common::error::AppError,
    models::{
        auth::{User, UserRole},
        salary::SalaryConfig,
    },
};

// Linha crua da tabela; a conversão para o modelo acontece aqui e só aqui.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    username: String,
    password: String,
    name: String,
    role: String,
    salary_config: Json<SalaryConfig>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            password: self.password,
            name: self.name,
            // Valores desconhecidos (dados importados à mão) degradam para
            // staff em vez de derrubar a listagem inteira.
            role: self.role.parse().unwrap_or(UserRole::Staff),
            salary_config: self.salary_config.0,
            created_at: self.created_at,
        }
    }
}

const USER_COLUMNS: &str = "id, username, password, name, role, salary_config, created_at";

// O repositório de usuários, responsável por todas as interações com a
// tabela 'users'.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(UserRow::into_user).collect())
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // Cria um novo usuário, com tratamento específico para username
    // duplicado.
    pub async fn insert<'e, E>(&self, executor: E, user: &User) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, password, name, role, salary_config, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.name)
        .bind(user.role.to_string())
        .bind(Json(&user.salary_config))
        .bind(user.created_at)
        .execute(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UsernameTaken;
                }
            }
            e.into()
        })?;

        Ok(())
    }

    pub async fn update_profile<'e, E>(
        &self,
        executor: E,
        id: &str,
        username: &str,
        name: &str,
        password: &str,
        role: UserRole,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE users SET username = $2, name = $3, password = $4, role = $5 WHERE id = $1",
        )
        .bind(id)
        .bind(username)
        .bind(name)
        .bind(password)
        .bind(role.to_string())
        .execute(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UsernameTaken;
                }
            }
            e.into()
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::UserNotFound);
        }
        Ok(())
    }

    // Troca silenciosa do hash no primeiro login de uma linha legada em
    // texto puro.
    pub async fn update_password(&self, id: &str, password_hash: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET password = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn update_salary_config<'e, E>(
        &self,
        executor: E,
        id: &str,
        config: &SalaryConfig,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE users SET salary_config = $2 WHERE id = $1")
            .bind(id)
            .bind(Json(config))
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::UserNotFound);
        }
        Ok(())
    }

    // A conta some; o histórico de ponto/agenda fica.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::UserNotFound);
        }
        Ok(())
    }
}
