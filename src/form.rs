//! Contact form validation and simulated submission.
//!
//! Thin page glue, deliberately separate from the gallery core. Validation
//! reports every violation at once so the view can mark all offending
//! fields; submission is simulated with a fixed delay and never touches the
//! network.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Country prefix the phone field must start with.
const PHONE_PREFIX: &str = "+7";
/// Digits expected after the prefix.
const PHONE_DIGITS: usize = 10;
/// How long the simulated send takes.
const SUBMIT_DELAY: Duration = Duration::from_secs(2);

/// Message length bounds, configurable per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FormRules {
    pub message_min: usize,
    pub message_max: usize,
}

impl Default for FormRules {
    fn default() -> Self {
        Self {
            message_min: 10,
            message_max: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("required field is empty: {0}")]
    MissingField(&'static str),
    #[error("phone must be +7 followed by exactly ten digits")]
    InvalidPhone,
    #[error("message must be between {min} and {max} characters, got {len}")]
    MessageLength {
        len: usize,
        min: usize,
        max: usize,
    },
}

#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub name: String,
    pub phone: String,
    pub message: String,
}

impl ContactForm {
    /// Checks every rule and returns all violations, not just the first.
    pub fn validate(&self, rules: &FormRules) -> Result<(), Vec<FormError>> {
        let mut errors = Vec::new();

        for (field, value) in [
            ("name", &self.name),
            ("phone", &self.phone),
            ("message", &self.message),
        ] {
            if value.trim().is_empty() {
                errors.push(FormError::MissingField(field));
            }
        }

        if !self.phone.trim().is_empty() && !phone_is_valid(&self.phone) {
            errors.push(FormError::InvalidPhone);
        }

        let len = self.message.chars().count();
        if len > 0 && !(rules.message_min..=rules.message_max).contains(&len) {
            errors.push(FormError::MessageLength {
                len,
                min: rules.message_min,
                max: rules.message_max,
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Live counter text shown under the message field.
    pub fn counter_text(&self, rules: &FormRules) -> String {
        format!("{}/{}", self.message.chars().count(), rules.message_max)
    }

    /// Validates, then performs the simulated send. The page has no backend
    /// for this form; the delay stands in for the round trip.
    pub async fn submit(&self, rules: &FormRules) -> Result<(), Vec<FormError>> {
        self.validate(rules)?;
        tokio::time::sleep(SUBMIT_DELAY).await;
        info!(name = %self.name, "contact form submitted");
        Ok(())
    }
}

fn phone_is_valid(phone: &str) -> bool {
    phone
        .strip_prefix(PHONE_PREFIX)
        .is_some_and(|rest| rest.len() == PHONE_DIGITS && rest.chars().all(|c| c.is_ascii_digit()))
}
