use super::{
    db_ops,
    errors::AppError,
    models::{Role, User},
    pw, session,
};
use sqlx::SqlitePool;

pub const DEMO_EMAIL: &str = "owner@example.com";
const DEMO_PASSWORD: &str = "demo123";

pub struct Registration<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    /// Blank means the default role
    pub role: &'a str,
}

fn is_unique_violation(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(e)) => e.is_unique_violation(),
        _ => false,
    }
}

pub async fn register(
    db: &SqlitePool,
    form: Registration<'_>,
) -> Result<User, AppError> {
    let name = form.name.trim();
    let email = form.email.trim().to_lowercase();
    if name.is_empty() || email.is_empty() || form.password.is_empty() {
        return Err(AppError::Validation("All fields are required.".into()));
    }
    let role = match form.role.trim() {
        "" => Role::default(),
        other => other
            .parse::<Role>()
            .map_err(|e| AppError::Validation(e.to_string()))?,
    };
    if db_ops::get_user_by_email(db, &email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered.".into()));
    }

    // The existence check above can race with another registration; the
    // unique index has the final word.
    match db_ops::insert_user(db, name, &email, &pw::hash(form.password), role)
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = user.id, role = role.as_str(), "registered");
            Ok(user)
        }
        Err(e) if is_unique_violation(&e) => {
            Err(AppError::Conflict("Email already registered.".into()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn authenticate(
    db: &SqlitePool,
    email: &str,
    password: &str,
) -> Result<session::Session, AppError> {
    let email = email.trim().to_lowercase();
    let Some(user) = db_ops::get_user_by_email(db, &email).await? else {
        return Err(AppError::InvalidCredentials);
    };
    let truth = db_ops::get_password_hash(db, user.id).await?;

    if pw::check(password, &truth).is_ok() {
        Ok(session::Session::new(user.id))
    } else {
        Err(AppError::InvalidCredentials)
    }
}

/// The user behind a session token, if the token is present, correctly
/// signed, not expired, and names a user that still exists.
pub async fn resolve_caller(
    db: &SqlitePool,
    secret: &[u8],
    ttl_secs: i64,
    token: Option<&str>,
) -> Result<Option<User>, AppError> {
    let Some(token) = token else {
        return Ok(None);
    };
    let session = match session::deserialize_session(secret, token) {
        Ok(s) => s,
        Err(reason) => {
            tracing::debug!(reason, "ignoring session cookie");
            return Ok(None);
        }
    };
    if session.is_expired(ttl_secs, chrono::Utc::now().timestamp()) {
        return Ok(None);
    }

    Ok(db_ops::get_user(db, session.user_id).await?)
}

pub async fn require_caller(
    db: &SqlitePool,
    secret: &[u8],
    ttl_secs: i64,
    token: Option<&str>,
) -> Result<User, AppError> {
    resolve_caller(db, secret, ttl_secs, token)
        .await?
        .ok_or(AppError::Unauthenticated)
}

/// Gives a fresh database a user to log in with.
pub async fn seed_demo_user(db: &SqlitePool) -> anyhow::Result<()> {
    if db_ops::count_users(db).await? == 0 {
        db_ops::insert_user(
            db,
            "Demo Owner",
            DEMO_EMAIL,
            &pw::hash(DEMO_PASSWORD),
            Role::Owner,
        )
        .await?;
        tracing::info!(email = DEMO_EMAIL, "seeded demo owner");
    }
    Ok(())
}
