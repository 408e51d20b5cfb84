//! Sign-in and sign-up form schemas.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Deserialize)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpForm {
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    /// `YYYY-MM-DD`
    pub date_of_birth: String,
    pub ssn: String,
    pub email: String,
    pub password: String,
}

fn bad(msg: &str) -> AppError {
    AppError::BadRequest(msg.to_string())
}

fn validate_credentials(email: &str, password: &str) -> AppResult<()> {
    let valid_email = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };
    if !valid_email {
        return Err(bad("Invalid email address"));
    }
    if password.len() < 8 {
        return Err(bad("Password must be at least 8 characters"));
    }
    Ok(())
}

impl SignInForm {
    pub fn validate(&self) -> AppResult<()> {
        validate_credentials(&self.email, &self.password)
    }
}

impl SignUpForm {
    pub fn validate(&self) -> AppResult<()> {
        if self.first_name.trim().len() < 3 {
            return Err(bad("First name must be at least 3 characters"));
        }
        if self.last_name.trim().len() < 3 {
            return Err(bad("Last name must be at least 3 characters"));
        }
        if self.address1.trim().is_empty() || self.address1.len() > 50 {
            return Err(bad("Address is required (max 50 characters)"));
        }
        if self.city.trim().is_empty() || self.city.len() > 50 {
            return Err(bad("City is required (max 50 characters)"));
        }
        if self.state.len() != 2 || !self.state.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(bad("State must be a two-letter code"));
        }
        if !(3..=6).contains(&self.postal_code.len()) {
            return Err(bad("Postal code must be 3 to 6 characters"));
        }
        if NaiveDate::parse_from_str(&self.date_of_birth, "%Y-%m-%d").is_err() {
            return Err(bad("Date of birth must be YYYY-MM-DD"));
        }
        if self.ssn.len() < 4 {
            return Err(bad("SSN must be at least 4 characters"));
        }
        validate_credentials(&self.email, &self.password)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> SignUpForm {
        SignUpForm {
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            address1: "123 Main St".into(),
            city: "New York".into(),
            state: "NY".into(),
            postal_code: "10001".into(),
            date_of_birth: "1990-01-01".into(),
            ssn: "1234".into(),
            email: "grace@example.com".into(),
            password: "correct-horse".into(),
        }
    }

    #[test]
    fn valid_sign_up_passes() {
        form().validate().unwrap();
    }

    #[test]
    fn sign_up_rejects_bad_fields() {
        let cases: [fn(&mut SignUpForm); 8] = [
            |f| f.state = "New York".into(),
            |f| f.postal_code = "1234567".into(),
            |f| f.date_of_birth = "01/01/1990".into(),
            |f| f.ssn = "12".into(),
            |f| f.email = "nope".into(),
            |f| f.password = "short".into(),
            |f| f.address1 = "x".repeat(51),
            |f| f.first_name = "Al".into(),
        ];
        for mutate in cases {
            let mut f = form();
            mutate(&mut f);
            assert!(matches!(f.validate(), Err(AppError::BadRequest(_))), "{f:?}");
        }
    }

    #[test]
    fn sign_in_only_checks_credentials() {
        let ok = SignInForm {
            email: "a@b.co".into(),
            password: "12345678".into(),
        };
        ok.validate().unwrap();
        let bad_email = SignInForm {
            email: "a@b".into(),
            password: "12345678".into(),
        };
        assert!(bad_email.validate().is_err());
    }
}
