// src/services/personnel.rs
//
// Administração de pessoal: contas, papéis de acesso e a configuração de
// papéis de pagamento. A exclusão apaga só a conta; o histórico de ponto e
// de agenda permanece.

use bcrypt::hash;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::{
        auth::{User, UserRole},
        salary::{SalaryConfig, SalaryRole},
    },
};

#[derive(Clone)]
pub struct PersonnelService {
    user_repo: UserRepository,
    pool: sqlx::PgPool,
}

impl PersonnelService {
    pub fn new(user_repo: UserRepository, pool: sqlx::PgPool) -> Self {
        Self { user_repo, pool }
    }

    // A conta super-admin não aparece na listagem de pessoal.
    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        let users = self.user_repo.list().await?;
        Ok(users
            .into_iter()
            .filter(|u| !(u.role == UserRole::Admin && u.username == "admin"))
            .collect())
    }

    pub async fn get(&self, id: &str) -> Result<User, AppError> {
        self.user_repo.find_by_id(id).await?.ok_or(AppError::UserNotFound)
    }

    pub async fn create(
        &self,
        name: &str,
        username: &str,
        password: &str,
        role: Option<UserRole>,
    ) -> Result<User, AppError> {
        let password_hash = hash_blocking(password.to_owned()).await?;

        let user = User {
            id: format!("nv_{}", Uuid::new_v4().simple()),
            username: username.trim().to_string(),
            password: password_hash,
            name: name.trim().to_string(),
            role: role.unwrap_or(UserRole::Staff),
            salary_config: SalaryConfig::default(),
            created_at: Utc::now(),
        };

        self.user_repo.insert(&self.pool, &user).await?;
        Ok(user)
    }

    pub async fn update(
        &self,
        id: &str,
        name: &str,
        username: &str,
        new_password: Option<&str>,
        role: Option<UserRole>,
    ) -> Result<User, AppError> {
        let existing = self.get(id).await?;

        let password = match new_password {
            Some(p) if !p.is_empty() => hash_blocking(p.to_owned()).await?,
            _ => existing.password.clone(),
        };

        self.user_repo
            .update_profile(
                &self.pool,
                id,
                username.trim(),
                name.trim(),
                &password,
                role.unwrap_or(existing.role),
            )
            .await?;

        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.user_repo.delete(id).await
    }

    // Substitui a lista de papéis de pagamento; o primeiro papel de uma
    // lista nova é o padrão, como no cadastro antigo.
    pub async fn set_salary_roles(
        &self,
        id: &str,
        mut roles: Vec<SalaryRole>,
    ) -> Result<User, AppError> {
        let mut user = self.get(id).await?;

        if !roles.is_empty() && !roles.iter().any(|r| r.is_default) {
            roles[0].is_default = true;
        }

        user.salary_config.roles = roles;
        self.user_repo
            .update_salary_config(&self.pool, id, &user.salary_config)
            .await?;

        Ok(user)
    }
}

async fn hash_blocking(password: String) -> Result<String, AppError> {
    // Hashing em thread separada para não travar o runtime.
    tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {e}"))?
        .map_err(Into::into)
}
