//! Rows of the relational model shared by storage and the GraphQL layer.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Error returned when a stored enum value is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value `{value}`")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Generates `as_str`, `Display` and `FromStr` from the stored string form.
macro_rules! stored_enum {
    ($name:ident, $label:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(ParseEnumError {
                        kind: $label,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollectiveType {
    User,
    Organization,
    Collective,
    Event,
    Bot,
}

stored_enum!(CollectiveType, "collective type", {
    User => "USER",
    Organization => "ORGANIZATION",
    Collective => "COLLECTIVE",
    Event => "EVENT",
    Bot => "BOT",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Credit,
    Debit,
}

stored_enum!(TransactionType, "transaction type", {
    Credit => "CREDIT",
    Debit => "DEBIT",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    New,
    RequireClientConfirmation,
    Paid,
    Error,
    Active,
    Cancelled,
    Expired,
    Pledged,
    Pending,
}

stored_enum!(OrderStatus, "order status", {
    New => "NEW",
    RequireClientConfirmation => "REQUIRE_CLIENT_CONFIRMATION",
    Paid => "PAID",
    Error => "ERROR",
    Active => "ACTIVE",
    Cancelled => "CANCELLED",
    Expired => "EXPIRED",
    Pledged => "PLEDGED",
    Pending => "PENDING",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    Host,
    Admin,
    Member,
    Backer,
    Contributor,
    Follower,
    Attendee,
    Fundraiser,
}

stored_enum!(MemberRole, "member role", {
    Host => "HOST",
    Admin => "ADMIN",
    Member => "MEMBER",
    Backer => "BACKER",
    Contributor => "CONTRIBUTOR",
    Follower => "FOLLOWER",
    Attendee => "ATTENDEE",
    Fundraiser => "FUNDRAISER",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegalDocumentType {
    UsTaxForm,
}

stored_enum!(LegalDocumentType, "legal document type", {
    UsTaxForm => "US_TAX_FORM",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegalDocumentRequestStatus {
    #[default]
    NotRequested,
    Requested,
    Received,
    Error,
}

stored_enum!(LegalDocumentRequestStatus, "legal document request status", {
    NotRequested => "NOT_REQUESTED",
    Requested => "REQUESTED",
    Received => "RECEIVED",
    Error => "ERROR",
});

static SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap());

/// Slugs are lowercase words joined by single dashes
pub fn validate_slug(slug: &str) -> Result<()> {
    if SLUG_RE.is_match(slug) {
        Ok(())
    } else {
        Err(AppError::Validation(format!("Invalid slug `{slug}`")))
    }
}

/// An account row: users, organizations, collectives, events and bots share one table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collective {
    #[serde(default)]
    pub id: i64,
    pub slug: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: CollectiveType,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub twitter_handle: Option<String>,
    #[serde(default)]
    pub github_handle: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Collective {
    pub fn new(slug: &str, name: &str, kind: CollectiveType) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            slug: slug.to_string(),
            name: Some(name.to_string()),
            kind,
            description: None,
            website: None,
            twitter_handle: None,
            github_handle: None,
            image: None,
            currency: default_currency(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tier {
    #[serde(default)]
    pub id: i64,
    pub collective_id: i64,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

/// A ledger entry; `collective_id` owns the entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub id: i64,
    #[serde(default = "Uuid::new_v4")]
    pub uuid: Uuid,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub net_amount_in_collective_currency: i64,
    pub collective_id: i64,
    pub from_collective_id: i64,
    #[serde(default)]
    pub order_id: Option<i64>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// A pledge from `from_collective_id` to `collective_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub description: Option<String>,
    pub total_amount: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub status: OrderStatus,
    /// `month`, `year`, or none for one-time contributions
    #[serde(default)]
    pub interval: Option<String>,
    pub collective_id: i64,
    pub from_collective_id: i64,
    #[serde(default)]
    pub tier_id: Option<i64>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub id: i64,
    pub collective_id: i64,
    pub member_collective_id: i64,
    pub role: MemberRole,
    #[serde(default)]
    pub tier_id: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "Utc::now")]
    pub since: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegalDocument {
    pub id: i64,
    pub year: i32,
    pub document_type: LegalDocumentType,
    pub request_status: LegalDocumentRequestStatus,
    pub document_link: Option<String>,
    pub host_collective_id: i64,
    pub collective_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Earliest tax year a legal document can be requested for
pub const LEGAL_DOCUMENT_MIN_YEAR: i32 = 2015;

/// Attributes for a new legal document. Both references are optional here so
/// that a missing one is reported as a validation failure, not a type error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLegalDocument {
    pub host_collective_id: Option<i64>,
    pub collective_id: Option<i64>,
    pub year: i32,
    #[serde(default = "default_document_type")]
    pub document_type: LegalDocumentType,
    #[serde(default)]
    pub request_status: LegalDocumentRequestStatus,
    #[serde(default)]
    pub document_link: Option<String>,
}

impl NewLegalDocument {
    pub fn new(host_collective_id: i64, collective_id: i64, year: i32) -> Self {
        Self {
            host_collective_id: Some(host_collective_id),
            collective_id: Some(collective_id),
            year,
            document_type: LegalDocumentType::UsTaxForm,
            request_status: LegalDocumentRequestStatus::NotRequested,
            document_link: None,
        }
    }

    /// Checks that do not need the store; returns `(host, collective)`.
    pub fn validate(&self) -> Result<(i64, i64)> {
        let host = self.host_collective_id.ok_or_else(|| {
            AppError::Validation("LegalDocument.HostCollectiveId cannot be null".to_string())
        })?;
        let collective = self.collective_id.ok_or_else(|| {
            AppError::Validation("LegalDocument.CollectiveId cannot be null".to_string())
        })?;
        if self.year < LEGAL_DOCUMENT_MIN_YEAR {
            return Err(AppError::Validation(format!(
                "LegalDocument.year must be {LEGAL_DOCUMENT_MIN_YEAR} or later, got {}",
                self.year
            )));
        }
        Ok((host, collective))
    }

    pub fn into_document(self, id: i64, host: i64, collective: i64) -> LegalDocument {
        let now = Utc::now();
        LegalDocument {
            id,
            year: self.year,
            document_type: self.document_type,
            request_status: self.request_status,
            document_link: self.document_link,
            host_collective_id: host,
            collective_id: collective,
            created_at: now,
            updated_at: now,
        }
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_document_type() -> LegalDocumentType {
    LegalDocumentType::UsTaxForm
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_enums_parse_their_own_output() {
        for status in [
            OrderStatus::New,
            OrderStatus::RequireClientConfirmation,
            OrderStatus::Pledged,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert_eq!("USER".parse::<CollectiveType>().unwrap(), CollectiveType::User);
        let err = "INDIVIDUAL".parse::<CollectiveType>().unwrap_err();
        assert_eq!(err.kind, "collective type");
    }

    #[test]
    fn slug_validation() {
        assert!(validate_slug("open-source-fund").is_ok());
        assert!(validate_slug("babel").is_ok());
        assert!(validate_slug("Babel").is_err());
        assert!(validate_slug("double--dash").is_err());
        assert!(validate_slug("").is_err());
    }

    #[test]
    fn legal_document_requires_both_references() {
        let mut doc = NewLegalDocument::new(1, 2, 2023);
        assert_eq!(doc.validate().unwrap(), (1, 2));

        doc.host_collective_id = None;
        let err = doc.validate().unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("HostCollectiveId"));

        let mut doc = NewLegalDocument::new(1, 2, 2023);
        doc.collective_id = None;
        assert!(doc.validate().unwrap_err().to_string().contains("CollectiveId"));
    }

    #[test]
    fn legal_document_year_has_a_floor() {
        let doc = NewLegalDocument::new(1, 2, 2014);
        assert!(doc.validate().unwrap_err().is_validation());
    }

    #[test]
    fn fixture_rows_fill_defaults() {
        let collective: Collective = serde_json::from_value(serde_json::json!({
            "slug": "webpack",
            "name": "webpack",
            "type": "COLLECTIVE"
        }))
        .unwrap();
        assert_eq!(collective.currency, "USD");
        assert_eq!(collective.kind, CollectiveType::Collective);
        assert_eq!(collective.id, 0);
    }
}
