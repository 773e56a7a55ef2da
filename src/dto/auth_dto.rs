use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::User;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignupPayload {
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    pub confirm_password: String,
    #[validate(length(min = 1, max = 255))]
    pub company_name: String,
}

impl SignupPayload {
    pub fn passwords_match(&self) -> bool {
        self.password == self.confirm_password
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: uuid::Uuid,
    pub email: String,
    pub company_name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub account: AccountResponse,
}

impl From<User> for AccountResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            email: value.email,
            company_name: value.company_name,
            created_at: value.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> SignupPayload {
        SignupPayload {
            email: "hr@example.com".into(),
            password: "hunter22".into(),
            confirm_password: "hunter22".into(),
            company_name: "Acme".into(),
        }
    }

    #[test]
    fn well_formed_signup_validates() {
        let p = payload();
        assert!(p.validate().is_ok());
        assert!(p.passwords_match());
    }

    #[test]
    fn bad_email_and_blank_company_are_rejected() {
        let p = SignupPayload {
            email: "not-an-email".into(),
            company_name: String::new(),
            ..payload()
        };
        let errors = p.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("company_name"));
    }

    #[test]
    fn overlong_fields_are_rejected_before_storage() {
        let p = SignupPayload {
            email: format!("{}@example.com", "a".repeat(250)),
            company_name: "c".repeat(300),
            ..payload()
        };
        let errors = p.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("company_name"));

        let at_limit = SignupPayload {
            company_name: "c".repeat(255),
            ..payload()
        };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn mismatched_confirmation_is_detected() {
        let p = SignupPayload {
            confirm_password: "different".into(),
            ..payload()
        };
        assert!(!p.passwords_match());
    }
}
