// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::salary::SalaryConfig;

// Papel de ACESSO (admin/staff/assistant) — não confundir com o papel de
// PAGAMENTO (SalaryRole), que é por sessão.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Staff,
    Assistant,
}

impl UserRole {
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    // Assistente monta a agenda como o admin, mas não mexe em pessoal nem
    // em pagamento.
    pub fn can_manage_schedule(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Assistant)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UserRole::Admin => "admin",
            UserRole::Staff => "staff",
            UserRole::Assistant => "assistant",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "staff" => Ok(UserRole::Staff),
            "assistant" => Ok(UserRole::Assistant),
            other => Err(format!("papel desconhecido: {other}")),
        }
    }
}

// Representa um usuário vindo do banco de dados.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,

    // Hash bcrypt (ou texto puro legado, atualizado no primeiro login).
    #[serde(skip_serializing)]
    pub password: String,

    pub name: String,
    pub role: UserRole,
    pub salary_config: SalaryConfig,
    pub created_at: DateTime<Utc>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "Vui lòng nhập tên đăng nhập."))]
    pub username: String,
    #[validate(length(min = 1, message = "Vui lòng nhập mật khẩu."))]
    pub password: String,
}

// Resposta de autenticação: o token e o perfil que o front guarda na sessão.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (ID do usuário)
    pub role: UserRole,
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued At
}
