use std::{future::Future, time::Duration};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::{
        dto::SignupRequest,
        error::AuthError,
        repo_types::{NewUser, User},
    },
    state::AppState,
};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Signup fields after validation and normalisation.
#[derive(Debug)]
pub struct ValidSignup {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles");
    }
    EMAIL_RE.is_match(email)
}

/// Checks run in order: password length, presence, email shape. A missing
/// password counts as length 0, so any short password is reported as weak.
pub fn validate_signup(req: SignupRequest) -> Result<ValidSignup, AuthError> {
    let full_name = req.full_name.unwrap_or_default().trim().to_string();
    let email = req.email.unwrap_or_default().trim().to_lowercase();
    let password = req.password.unwrap_or_default();

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword {
            min: MIN_PASSWORD_LEN,
        });
    }
    if full_name.is_empty() || email.is_empty() {
        return Err(AuthError::MissingFields);
    }
    if !is_valid_email(&email) {
        return Err(AuthError::InvalidEmail);
    }

    Ok(ValidSignup {
        full_name,
        email,
        password,
    })
}

/// Await `fut`, failing with [`AuthError::Timeout`] once `limit` elapses.
pub(crate) async fn bounded<T, E, F>(
    limit: Duration,
    what: &'static str,
    fut: F,
) -> Result<T, AuthError>
where
    F: Future<Output = Result<T, E>>,
    AuthError: From<E>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(res) => res.map_err(AuthError::from),
        Err(_) => {
            warn!(operation = what, ?limit, "operation timed out");
            Err(AuthError::Timeout(what))
        }
    }
}

/// Register a new user: duplicate pre-check, hash, insert.
///
/// The pre-check only saves hashing work; the store's unique constraint
/// decides when two signups race.
pub async fn register(state: &AppState, signup: ValidSignup) -> Result<User, AuthError> {
    let cfg = &state.config;

    let existing = bounded(
        cfg.store_timeout,
        "user lookup",
        state.users.find_by_email(&signup.email),
    )
    .await?;
    if existing.is_some() {
        warn!(email = %signup.email, "email already registered");
        return Err(AuthError::EmailTaken);
    }

    let hasher = state.hasher.clone();
    let password = signup.password;
    let hashing = async move {
        tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(anyhow::Error::from)
            .and_then(|hashed| hashed)
    };
    let password_hash = bounded(cfg.hash_timeout, "password hashing", hashing).await?;

    let user = bounded(
        cfg.store_timeout,
        "user insert",
        state.users.create(NewUser {
            full_name: signup.full_name,
            email: signup.email,
            password_hash,
        }),
    )
    .await
    .inspect_err(|e| {
        if matches!(e, AuthError::EmailTaken) {
            warn!("lost signup race on unique email");
        }
    })?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(full_name: &str, email: &str, password: &str) -> SignupRequest {
        SignupRequest {
            full_name: Some(full_name.into()),
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("a@x.com"));
        assert!(!is_valid_email("a@x"));
        assert!(!is_valid_email("a x@y.com"));
        assert!(!is_valid_email("@y.com"));
    }

    #[test]
    fn normalises_email_and_name() {
        let valid = validate_signup(req("  Ann ", "  A@X.Com ", "abcdef")).unwrap();
        assert_eq!(valid.full_name, "Ann");
        assert_eq!(valid.email, "a@x.com");
        assert_eq!(valid.password, "abcdef");
    }

    #[test]
    fn short_passwords_are_weak() {
        for pw in ["a", "12345", "ééééé"] {
            let err = validate_signup(req("Ann", "a@x.com", pw)).unwrap_err();
            assert!(matches!(err, AuthError::WeakPassword { min: 6 }), "{pw}");
        }
        assert!(validate_signup(req("Ann", "a@x.com", "123456")).is_ok());
    }

    #[test]
    fn short_password_wins_over_missing_or_blank_fields() {
        let names = [None, Some(""), Some("   "), Some("Ann")];
        let emails = [None, Some(""), Some("  "), Some("a@x.com")];
        for len in 0..MIN_PASSWORD_LEN {
            let passwords = if len == 0 {
                vec![None, Some(String::new())]
            } else {
                vec![Some("x".repeat(len))]
            };
            for password in &passwords {
                for name in names {
                    for email in emails {
                        let err = validate_signup(SignupRequest {
                            full_name: name.map(String::from),
                            email: email.map(String::from),
                            password: password.clone(),
                        })
                        .unwrap_err();
                        assert!(
                            matches!(err, AuthError::WeakPassword { min: 6 }),
                            "name={name:?} email={email:?} password={password:?} -> {err}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn missing_fields_need_an_acceptable_password_first() {
        let err = validate_signup(SignupRequest {
            full_name: None,
            email: Some("a@x.com".into()),
            password: Some("abcdef".into()),
        })
        .unwrap_err();
        assert!(matches!(err, AuthError::MissingFields));

        let err = validate_signup(req("   ", "a@x.com", "abcdef")).unwrap_err();
        assert!(matches!(err, AuthError::MissingFields));

        let err = validate_signup(req("Ann", " ", "abcdef")).unwrap_err();
        assert!(matches!(err, AuthError::MissingFields));
    }

    #[test]
    fn password_length_is_checked_before_email_shape() {
        let err = validate_signup(req("Ann", "not-an-email", "123")).unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword { .. }));
        let err = validate_signup(req("Ann", "not-an-email", "123456")).unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmail));
    }

    #[tokio::test]
    async fn bounded_times_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, AuthError>(())
        };
        let err = bounded(Duration::from_millis(10), "slow op", slow)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Timeout("slow op")));
    }
}
