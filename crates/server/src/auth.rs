//! Password hashing and the Basic auth middleware.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use engine::EngineError;

use crate::{ServerError, server::ServerState};

/// Hashes a password into a PHC string (argon2id, random salt).
pub fn hash_password(password: &str) -> Result<String, ServerError> {
    if password.is_empty() {
        return Err(ServerError::Engine(EngineError::InvalidInput(
            "password must not be empty".to_string(),
        )));
    }
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| ServerError::Generic(format!("failed to hash password: {err}")))
}

/// `true` when `candidate` matches the stored PHC string.
pub fn verify_password(candidate: &str, password_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(password_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .is_ok()
}

pub(crate) async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(auth_header)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user = match state.engine.user_by_username(auth_header.username()).await {
        Ok(user) => user,
        Err(EngineError::KeyNotFound(_)) => return Err(StatusCode::UNAUTHORIZED),
        Err(err) => {
            tracing::error!("failed to load user for auth: {err}");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };
    if !verify_password(auth_header.password(), &user.password_hash) {
        return Err(StatusCode::UNAUTHORIZED);
    }

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_only_the_hashed_password() {
        let hash = hash_password("s3cret").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("S3cret", &hash));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "plain-text"));
    }

    #[test]
    fn empty_password_is_rejected() {
        assert!(hash_password("").is_err());
    }
}
