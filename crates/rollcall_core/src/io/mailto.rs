//! Bulk `mailto:` composition for selected students.

use crate::model::student::StudentRecord;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailtoError {
    /// Subject or body is blank.
    MissingContent,
    /// No selected record has an address containing `@`.
    NoRecipients,
}

impl Display for MailtoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingContent => write!(f, "please fill in both subject and message"),
            Self::NoRecipients => {
                write!(f, "no valid email addresses found for selected students")
            }
        }
    }
}

impl Error for MailtoError {}

/// Builds `mailto:<a,b>?subject=..&body=..` addressed to `recipients`.
///
/// Delivery is up to the host's mail handler.
pub fn compose_mailto(
    recipients: &[&StudentRecord],
    subject: &str,
    body: &str,
) -> Result<String, MailtoError> {
    if subject.trim().is_empty() || body.trim().is_empty() {
        return Err(MailtoError::MissingContent);
    }

    let emails: Vec<&str> = recipients
        .iter()
        .map(|record| record.email.as_str())
        .filter(|email| email.contains('@'))
        .collect();
    if emails.is_empty() {
        return Err(MailtoError::NoRecipients);
    }

    Ok(format!(
        "mailto:{}?subject={}&body={}",
        emails.join(","),
        urlencoding::encode(subject),
        urlencoding::encode(body)
    ))
}
