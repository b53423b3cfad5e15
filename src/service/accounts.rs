use tokio::task;
use tracing::info;

use crate::db::{Storage, User};
use crate::error::ConsoleError;
use crate::service::password::{self, PasswordError};

/// Hash off the async workers; Argon2 is deliberately slow.
pub async fn hash(plain: String) -> Result<String, ConsoleError> {
    let hashed = task::spawn_blocking(move || password::hash_password(&plain))
        .await
        .map_err(|e| PasswordError::Hash(e.to_string()))??;
    Ok(hashed)
}

/// Resolve a login form submission to the matching user, if any.
pub async fn authenticate(
    storage: &Storage,
    login: &str,
    plain: &str,
) -> Result<Option<User>, ConsoleError> {
    let Some(user) = storage.find_user_by_login(login).await? else {
        info!(login, "login rejected: unknown user");
        return Ok(None);
    };

    let stored = user.password.clone();
    let plain = plain.to_string();
    let matches = task::spawn_blocking(move || password::verify_password(&plain, &stored))
        .await
        .map_err(|e| PasswordError::Verify(e.to_string()))??;

    if matches {
        Ok(Some(user))
    } else {
        info!(login, "login rejected: wrong password");
        Ok(None)
    }
}
