use super::{Activity, ActivityType};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

const COLLECTIVE_FIELDS: &[&str] = &["collective.id", "collective.slug", "collective.name"];

const FROM_COLLECTIVE_FIELDS: &[&str] = &[
    "fromCollective.id",
    "fromCollective.slug",
    "fromCollective.name",
    "fromCollective.image",
];

const TRANSACTION_FIELDS: &[&str] = &[
    "transaction.id",
    "transaction.uuid",
    "transaction.type",
    "transaction.amount",
    "transaction.currency",
    "transaction.description",
    "transaction.netAmountInCollectiveCurrency",
    "transaction.hostCurrency",
    "transaction.createdAt",
];

const UPDATE_FIELDS: &[&str] = &[
    "update.id",
    "update.slug",
    "update.title",
    "update.html",
    "update.publishedAt",
];

// Payout details and the submitter's email never leave the platform
const EXPENSE_FIELDS: &[&str] = &[
    "expense.id",
    "expense.amount",
    "expense.currency",
    "expense.description",
    "expense.category",
    "expense.status",
    "expense.incurredAt",
    "expense.createdAt",
];

const MEMBER_FIELDS: &[&str] = &[
    "member.role",
    "member.description",
    "member.since",
    "member.memberCollective.id",
    "member.memberCollective.slug",
    "member.memberCollective.name",
    "member.memberCollective.type",
    "member.memberCollective.image",
];

const ORDER_FIELDS: &[&str] = &[
    "order.id",
    "order.totalAmount",
    "order.currency",
    "order.interval",
];

const SUBSCRIPTION_FIELDS: &[&str] = &[
    "subscription.amount",
    "subscription.currency",
    "subscription.interval",
];

/// Dotted paths of `data` that may be published for an activity type
pub fn allowlist(kind: ActivityType) -> Vec<&'static str> {
    let groups: &[&[&'static str]] = match kind {
        ActivityType::TransactionCreated => {
            &[TRANSACTION_FIELDS, FROM_COLLECTIVE_FIELDS, COLLECTIVE_FIELDS]
        }
        ActivityType::UpdatePublished => &[UPDATE_FIELDS, COLLECTIVE_FIELDS],
        ActivityType::ExpenseCreated
        | ActivityType::ExpenseApproved
        | ActivityType::ExpensePaid
        | ActivityType::ExpenseRejected => {
            &[EXPENSE_FIELDS, FROM_COLLECTIVE_FIELDS, COLLECTIVE_FIELDS]
        }
        ActivityType::MemberCreated => &[MEMBER_FIELDS, ORDER_FIELDS, COLLECTIVE_FIELDS],
        ActivityType::SubscriptionCanceled => {
            &[SUBSCRIPTION_FIELDS, ORDER_FIELDS, COLLECTIVE_FIELDS]
        }
    };
    groups.iter().flat_map(|group| group.iter().copied()).collect()
}

/// Public projection of an [`Activity`], as sent to webhooks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SanitizedActivity {
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(rename = "CollectiveId", skip_serializing_if = "Option::is_none")]
    pub collective_id: Option<i64>,
    pub data: Map<String, Value>,
}

/// Keep the identity fields and the allowlisted part of `data`.
///
/// Unknown activity types get an empty `data`. Fields missing from the input
/// are simply absent from the output.
pub fn sanitize_activity(activity: &Activity) -> SanitizedActivity {
    let mut data = Map::new();
    if let (Some(kind), Value::Object(source)) = (activity.activity_type(), &activity.data) {
        for path in allowlist(kind) {
            let segments: Vec<&str> = path.split('.').collect();
            copy_path(source, &mut data, &segments);
        }
    }

    SanitizedActivity {
        created_at: activity.created_at,
        id: activity.id,
        kind: activity.kind.clone(),
        collective_id: activity.collective_id,
        data,
    }
}

fn copy_path(source: &Map<String, Value>, target: &mut Map<String, Value>, path: &[&str]) {
    let Some((head, rest)) = path.split_first() else {
        return;
    };
    let Some(value) = source.get(*head) else {
        return;
    };
    if rest.is_empty() {
        target.insert(head.to_string(), value.clone());
        return;
    }
    let Value::Object(inner) = value else {
        return;
    };

    let mut nested = match target.remove(*head) {
        Some(Value::Object(existing)) => existing,
        _ => Map::new(),
    };
    copy_path(inner, &mut nested, rest);
    if !nested.is_empty() {
        target.insert(head.to_string(), Value::Object(nested));
    }
}
