use crate::error::{AppError, AppResult};

/// Hash a password with bcrypt on the blocking pool.
pub async fn hash(password: &str, cost: u32) -> AppResult<String> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("hashing task failed: {}", e)))??;
    Ok(hashed)
}

/// Verify a password against a stored bcrypt hash (constant-time via bcrypt).
pub async fn verify(password: &str, password_hash: &str) -> AppResult<bool> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash))
        .await
        .map_err(|e| AppError::Internal(format!("verify task failed: {}", e)))??;
    Ok(matches)
}
