use std::future::Future;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use argon2::password_hash::{SaltString, rand_core::OsRng};
use chrono::{Duration, Utc};
use cookie::{Cookie, SameSite};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    domain::{CreateDonorRequest, Donor, SessionContext},
    error::{AppError, Result},
    repository::DonorRepository,
    service::with_store_timeout,
};

pub mod session;

use session::{Session, SessionStore};

pub const SESSION_COOKIE: &str = "session";

/// In-process identity provider: donor accounts, password checks and
/// cookie sessions.
pub struct AuthService {
    session_store: SessionStore,
    donor_repo: Arc<dyn DonorRepository>,
    session_duration_hours: i64,
    store_timeout: StdDuration,
}

impl AuthService {
    pub fn new(
        pool: SqlitePool,
        donor_repo: Arc<dyn DonorRepository>,
        session_duration_hours: i64,
        store_timeout: StdDuration,
    ) -> Self {
        Self {
            session_store: SessionStore::new(pool),
            donor_repo,
            session_duration_hours,
            store_timeout,
        }
    }

    pub fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        Ok(password_hash.to_string())
    }

    pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

        Ok(Argon2::default().verify_password(password.as_bytes(), &parsed_hash).is_ok())
    }

    pub async fn signup(&self, request: CreateDonorRequest) -> Result<Donor> {
        request.validate()?;
        if request.full_name.trim().is_empty() {
            return Err(AppError::Validation("full_name: is required".to_string()));
        }
        if request.phone_number.trim().is_empty() {
            return Err(AppError::Validation(
                "phone_number: is required for verification".to_string(),
            ));
        }

        if self.store(self.donor_repo.find_by_email(&request.email)).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = Self::hash_password(&request.password)?;
        let donor = self.store(self.donor_repo.create(request, password_hash)).await.map_err(|e| {
            if e.is_unique_violation() {
                AppError::Conflict("Email already registered".to_string())
            } else {
                e
            }
        })?;

        tracing::info!(donor_id = %donor.id, "Donor registered");
        Ok(donor)
    }

    /// Returns the donor and a fresh opaque session token.
    pub async fn login(&self, email: &str, password: &str) -> Result<(Donor, String)> {
        let password_hash = self
            .store(self.donor_repo.find_password_hash(email))
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !Self::verify_password(password, &password_hash)? {
            return Err(AppError::Unauthorized);
        }

        let donor = self
            .store(self.donor_repo.find_by_email(email))
            .await?
            .ok_or(AppError::Unauthorized)?;

        let (_session, token) = self.create_session(&donor).await?;
        Ok((donor, token))
    }

    pub async fn create_session(&self, donor: &Donor) -> Result<(Session, String)> {
        let token = generate_token();
        let expires_at = Utc::now() + Duration::hours(self.session_duration_hours);

        let session = self
            .store(self.session_store.create(donor.id, &token, expires_at))
            .await?;

        Ok((session, token))
    }

    /// Resolves a session token into the caller's identity.
    pub async fn resolve(&self, token: &str) -> Result<Option<(Donor, SessionContext)>> {
        let Some(session) = self.store(self.session_store.find_by_token(token)).await? else {
            return Ok(None);
        };

        let donor = self.store(self.donor_repo.find_by_id(session.donor_id)).await?;
        Ok(donor.map(|d| {
            let ctx = SessionContext::from(&d);
            (d, ctx)
        }))
    }

    pub async fn invalidate_session(&self, token: &str) -> Result<()> {
        self.store(self.session_store.delete_by_token(token)).await
    }

    pub async fn cleanup_expired_sessions(&self) -> Result<u64> {
        self.store(self.session_store.cleanup_expired()).await
    }

    pub fn create_session_cookie(&self, token: &str, secure: bool) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token.to_string()))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .secure(secure)
            .max_age(cookie::time::Duration::hours(self.session_duration_hours))
            .build()
    }

    async fn store<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        with_store_timeout(self.store_timeout, fut).await
    }

    pub fn create_logout_cookie() -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, ""))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .max_age(cookie::time::Duration::seconds(0))
            .build()
    }
}

fn generate_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
