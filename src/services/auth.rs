// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, CreateTechnicianPayload, Role, UpdateTechnicianPayload, User},
};

/// Sessão recém-criada: o token vai no cookie.
pub struct IssuedSession {
    pub token: String,
    pub user: User,
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    session_ttl: Duration,
    pool: PgPool,
}

async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, session_ttl: Duration, pool: PgPool) -> Self {
        Self {
            user_repo,
            jwt_secret,
            session_ttl,
            pool,
        }
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedSession, AppError> {
        let user = self
            .user_repo
            .find_by_username(username.trim())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            tracing::warn!("Tentativa de login inválida para '{}'", username);
            return Err(AppError::InvalidCredentials);
        }

        let expires_at = Utc::now() + self.session_ttl;
        let session_id = self.user_repo.create_session(user.id, expires_at).await?;
        let token = self.create_token(user.id, session_id)?;

        tracing::info!("🔑 Login de '{}' ({})", user.username, user.role.as_str());
        Ok(IssuedSession { token, user })
    }

    /// Token válido, sessão viva e usuário existente.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = self.decode_token(token)?;

        if !self.user_repo.session_is_active(claims.sid, claims.sub).await? {
            return Err(AppError::Unauthenticated);
        }

        self.user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::Unauthenticated)
    }

    /// Token inválido no logout não é erro: o cookie é limpo de qualquer jeito.
    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        if let Ok(claims) = self.decode_token(token) {
            self.user_repo.delete_session(claims.sid).await?;
            tracing::info!("🔒 Sessão {} encerrada", claims.sid);
        }
        Ok(())
    }

    fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthenticated)
    }

    fn create_token(&self, user_id: Uuid, session_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.session_ttl;

        let claims = Claims {
            sub: user_id,
            sid: session_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }

    // ---
    // Administração de usuários
    // ---

    pub async fn list_users(&self, role: Option<Role>) -> Result<Vec<User>, AppError> {
        self.user_repo.list(role).await
    }

    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        name: &str,
        role: Role,
        department: Option<&str>,
    ) -> Result<User, AppError> {
        let hashed = hash_password(password).await?;
        let user = self
            .user_repo
            .create_user(&self.pool, username.trim(), &hashed, name, role, department)
            .await?;
        tracing::info!("👤 Usuário '{}' criado ({})", user.username, role.as_str());
        Ok(user)
    }

    pub async fn create_technician(&self, p: &CreateTechnicianPayload) -> Result<User, AppError> {
        self.create_user(&p.username, &p.password, &p.name, Role::Technician, p.department.as_deref())
            .await
    }

    pub async fn update_technician(&self, id: Uuid, p: &UpdateTechnicianPayload) -> Result<User, AppError> {
        let hashed = match &p.password {
            Some(password) => Some(hash_password(password).await?),
            None => None,
        };
        self.user_repo
            .update_with_role(
                &self.pool,
                id,
                Role::Technician,
                p.name.as_deref(),
                p.department.as_deref(),
                hashed.as_deref(),
            )
            .await?
            .ok_or_else(|| AppError::NotFound("Technician".into()))
    }

    pub async fn delete_technician(&self, id: Uuid) -> Result<(), AppError> {
        if !self.user_repo.delete_with_role(&self.pool, id, Role::Technician).await? {
            return Err(AppError::NotFound("Technician".into()));
        }
        Ok(())
    }

    /// Primeiro admin, criado na subida quando a tabela está vazia.
    pub async fn bootstrap_admin(&self, username: &str, password: &str) -> Result<(), AppError> {
        if self.user_repo.count().await? > 0 {
            return Ok(());
        }
        self.create_user(username, password, "Administrator", Role::Admin, None)
            .await?;
        tracing::info!("✅ Admin inicial '{}' criado", username);
        Ok(())
    }

    pub async fn purge_expired_sessions(&self) -> Result<u64, AppError> {
        self.user_repo.purge_expired_sessions().await
    }
}
