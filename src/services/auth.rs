// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, User},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String) -> Self {
        Self { user_repo, jwt_secret }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<(String, User), AppError> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let stored = user.password.clone();

        let is_valid = if stored.starts_with("$2") {
            // Hash bcrypt: verificação em thread separada para não travar o
            // runtime.
            let password_clone = password.to_owned();
            tokio::task::spawn_blocking(move || verify(&password_clone, &stored))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {e}"))??
        } else {
            // Linha legada em texto puro: aceita a comparação direta UMA vez
            // e grava o hash no lugar — a consolidação do antigo par de
            // repositórios de credenciais.
            let matches = stored == password;
            if matches {
                let password_clone = password.to_owned();
                let new_hash =
                    tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                        .await
                        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {e}"))??;
                self.user_repo.update_password(&user.id, &new_hash).await?;
                tracing::info!("Senha legada de '{}' atualizada para hash.", user.username);
            }
            matches
        };

        if !is_valid {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(&user)?;
        Ok((token, user))
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.user_repo
            .find_by_id(&token_data.claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user.id.clone(),
            role: user.role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
