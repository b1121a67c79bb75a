//! Internal activity records and their public webhook projection.

pub mod sanitize;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

pub use sanitize::{sanitize_activity, SanitizedActivity};

/// An event row as stored by the activity log.
///
/// `kind` keeps the raw string so that kinds this service does not know about
/// still round-trip; see [`ActivityType`] for the ones it does.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(rename = "CollectiveId", default)]
    pub collective_id: Option<i64>,
    #[serde(rename = "UserId", default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub data: Value,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Activity {
    pub fn activity_type(&self) -> Option<ActivityType> {
        self.kind.as_deref().and_then(|kind| kind.parse().ok())
    }
}

/// Activity kinds that are forwarded to webhooks with a non-empty payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityType {
    TransactionCreated,
    UpdatePublished,
    ExpenseCreated,
    ExpenseApproved,
    ExpensePaid,
    ExpenseRejected,
    MemberCreated,
    SubscriptionCanceled,
}

impl ActivityType {
    pub const ALL: [ActivityType; 8] = [
        ActivityType::TransactionCreated,
        ActivityType::UpdatePublished,
        ActivityType::ExpenseCreated,
        ActivityType::ExpenseApproved,
        ActivityType::ExpensePaid,
        ActivityType::ExpenseRejected,
        ActivityType::MemberCreated,
        ActivityType::SubscriptionCanceled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::TransactionCreated => "collective.transaction.created",
            ActivityType::UpdatePublished => "collective.update.published",
            ActivityType::ExpenseCreated => "collective.expense.created",
            ActivityType::ExpenseApproved => "collective.expense.approved",
            ActivityType::ExpensePaid => "collective.expense.paid",
            ActivityType::ExpenseRejected => "collective.expense.rejected",
            ActivityType::MemberCreated => "collective.member.created",
            ActivityType::SubscriptionCanceled => "subscription.canceled",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivityType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown activity type `{s}`"))
    }
}
