use actix_web::HttpRequest;
use leptos::logging::warn;

use crate::db::Database;
use crate::error::AppError;
use crate::forms::FormData;
use crate::models::user::User;

pub const USER_HEADER: &str = "X-User-Id";
pub const CSRF_FIELD: &str = "csrf_token";

/// Resolves the session user from the request; missing or unknown ids are anonymous.
pub async fn current_user(req: &HttpRequest, db: &Database) -> Result<Option<User>, AppError> {
    let Some(raw) = req.headers().get(USER_HEADER) else {
        return Ok(None);
    };
    let Some(user_id) = raw.to_str().ok().and_then(|v| v.trim().parse::<i64>().ok()) else {
        warn!("[SESSION] Ignoring malformed {} header", USER_HEADER);
        return Ok(None);
    };
    let user = db.get_user(user_id).await?;
    if user.is_none() {
        warn!("[SESSION] Unknown user {}", user_id);
    }
    Ok(user)
}

/// Checks the CSRF token of a submitted form against the session user's token.
pub fn check_csrf(user: Option<&User>, data: &FormData) -> Result<(), AppError> {
    match (user, data.value(CSRF_FIELD)) {
        (Some(user), Some(token)) if token == user.csrf_token => Ok(()),
        _ => Err(AppError::Csrf),
    }
}

/// Token to embed in rendered forms.
pub fn csrf_token(user: Option<&User>) -> String {
    user.map(|u| u.csrf_token.clone()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: 1,
            full_name: "Ada".into(),
            email: "ada@example.com".into(),
            csrf_token: "secret".into(),
        }
    }

    #[test]
    fn test_csrf_check() {
        let good: FormData = [(CSRF_FIELD, "secret")].into_iter().collect();
        let bad: FormData = [(CSRF_FIELD, "guess")].into_iter().collect();
        assert!(check_csrf(Some(&user()), &good).is_ok());
        assert!(matches!(check_csrf(Some(&user()), &bad), Err(AppError::Csrf)));
        assert!(matches!(check_csrf(None, &good), Err(AppError::Csrf)));
        assert!(matches!(check_csrf(Some(&user()), &FormData::default()), Err(AppError::Csrf)));
    }
}
