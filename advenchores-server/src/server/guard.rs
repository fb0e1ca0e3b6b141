use axum::http::HeaderValue;

use super::AppError;
use super::auth::AuthCtx;
use crate::storage::models::{AssignmentView, Child, Chore, Reward};

/// A record that belongs to exactly one user account.
pub trait Owned {
    fn owner_id(&self) -> i32;
}

impl Owned for Child {
    fn owner_id(&self) -> i32 {
        self.user_id
    }
}

impl Owned for Chore {
    fn owner_id(&self) -> i32 {
        self.user_id
    }
}

impl Owned for Reward {
    fn owner_id(&self) -> i32 {
        self.user_id
    }
}

// An assignment belongs to whoever owns its chore.
impl Owned for AssignmentView {
    fn owner_id(&self) -> i32 {
        self.chore.user_id
    }
}

pub fn ensure_owner<T: Owned>(auth: &AuthCtx, resource: &T) -> Result<(), AppError> {
    let owner = resource.owner_id();
    if owner != auth.user_id {
        tracing::warn!(
            user_id = auth.user_id,
            owner_id = owner,
            resource = std::any::type_name::<T>(),
            "guard: ownership mismatch; denying"
        );
        return Err(AppError::forbidden());
    }
    Ok(())
}

/// Checks the PIN presented in the parent-panel header against the account's PIN.
pub fn verify_parent_pin(header: Option<&HeaderValue>, expected: i32) -> Result<(), AppError> {
    let provided = header
        .and_then(|v| v.to_str().ok())
        .and_then(|s| parse_pin(s).ok());
    match provided {
        Some(pin) if pin == expected => Ok(()),
        Some(_) => {
            tracing::warn!("guard: wrong parent pin");
            Err(AppError::unauthorized())
        }
        None => {
            tracing::warn!("guard: missing or malformed parent pin");
            Err(AppError::unauthorized())
        }
    }
}

/// A PIN is exactly four ASCII digits.
pub fn parse_pin(text: &str) -> Result<i32, AppError> {
    let text = text.trim();
    if text.len() != 4 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::bad_request("pin must be exactly 4 digits"));
    }
    text.parse::<i32>()
        .map_err(|_| AppError::bad_request("pin must be exactly 4 digits"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth(user_id: i32) -> AuthCtx {
        AuthCtx {
            user_id,
            username: "parent".into(),
            jti: "jti".into(),
        }
    }

    #[test]
    fn owner_passes_and_stranger_is_forbidden() {
        let child = Child::new(7, "Alex", "");
        assert!(ensure_owner(&auth(7), &child).is_ok());
        assert!(matches!(
            ensure_owner(&auth(8), &child),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn assignment_owner_is_chore_owner() {
        let view = AssignmentView {
            id: 1,
            child_id: 2,
            child_name: "Alex".into(),
            is_completed: false,
            chore: Chore::new(5, "Dishes", 10),
        };
        assert!(ensure_owner(&auth(5), &view).is_ok());
        assert!(ensure_owner(&auth(6), &view).is_err());
    }

    #[test]
    fn pin_header_must_match() {
        let good = HeaderValue::from_static("1234");
        let bad = HeaderValue::from_static("9999");
        let junk = HeaderValue::from_static("12a4");
        assert!(verify_parent_pin(Some(&good), 1234).is_ok());
        assert!(matches!(
            verify_parent_pin(Some(&bad), 1234),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            verify_parent_pin(Some(&junk), 1234),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            verify_parent_pin(None, 1234),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn pins_are_four_digits() {
        assert_eq!(parse_pin("0042").unwrap(), 42);
        assert_eq!(parse_pin(" 4321 ").unwrap(), 4321);
        assert!(parse_pin("123").is_err());
        assert!(parse_pin("12345").is_err());
        assert!(parse_pin("-123").is_err());
        assert!(parse_pin("").is_err());
    }
}
