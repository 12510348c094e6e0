use crate::auth::password;
use crate::db::{users, Store};
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;

fn already_registered(username: &str) -> AppError {
    AppError::Validation(format!("User {} is already registered.", username))
}

/// Create an account. Input is validated before the store is touched.
pub async fn register(
    store: &Store,
    bcrypt_cost: u32,
    username: &str,
    password: &str,
) -> AppResult<i64> {
    if username.is_empty() {
        return Err(AppError::Validation("Username is required.".into()));
    }
    if password.is_empty() {
        return Err(AppError::Validation("Password is required.".into()));
    }

    {
        let conn = store.connect()?;
        if users::find_by_username(&conn, username)?.is_some() {
            return Err(already_registered(username));
        }
    }

    let password_hash = password::hash(password, bcrypt_cost).await?;

    let mut conn = store.connect()?;
    match users::insert(&mut conn, username, &password_hash) {
        Ok(id) => {
            tracing::info!("Registered user {} ({})", username, id);
            Ok(id)
        }
        // lost a race with a concurrent registration
        Err(e) if users::is_unique_violation(&e) => Err(already_registered(username)),
        Err(e) => Err(e.into()),
    }
}

/// Check credentials. The caller starts the session only on `Ok`.
pub async fn login(store: &Store, username: &str, password: &str) -> AppResult<CurrentUser> {
    let user = {
        let conn = store.connect()?;
        users::find_by_username(&conn, username)?
    }
    .ok_or_else(|| AppError::Auth("Incorrect username.".into()))?;

    if !password::verify(password, &user.password_hash).await? {
        tracing::debug!("Password mismatch for {}", username);
        return Err(AppError::Auth("Incorrect password.".into()));
    }

    tracing::info!("User {} logged in", user.username);
    Ok(user.into())
}
