use crate::domain;
use crate::storage::{Sort, SortDirection, SortField};
use async_graphql::{Enum, InputObject};

/// The kind of an account
#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum AccountType {
    Individual,
    Organization,
    Collective,
    Event,
    Bot,
}

impl From<domain::CollectiveType> for AccountType {
    fn from(kind: domain::CollectiveType) -> Self {
        match kind {
            domain::CollectiveType::User => AccountType::Individual,
            domain::CollectiveType::Organization => AccountType::Organization,
            domain::CollectiveType::Collective => AccountType::Collective,
            domain::CollectiveType::Event => AccountType::Event,
            domain::CollectiveType::Bot => AccountType::Bot,
        }
    }
}

impl From<AccountType> for domain::CollectiveType {
    fn from(kind: AccountType) -> Self {
        match kind {
            AccountType::Individual => domain::CollectiveType::User,
            AccountType::Organization => domain::CollectiveType::Organization,
            AccountType::Collective => domain::CollectiveType::Collective,
            AccountType::Event => domain::CollectiveType::Event,
            AccountType::Bot => domain::CollectiveType::Bot,
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(remote = "domain::TransactionType")]
pub enum TransactionType {
    Credit,
    Debit,
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(remote = "domain::OrderStatus")]
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

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(remote = "domain::MemberRole")]
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

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(remote = "domain::LegalDocumentType")]
pub enum LegalDocumentType {
    UsTaxForm,
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(remote = "domain::LegalDocumentRequestStatus")]
pub enum LegalDocumentRequestStatus {
    NotRequested,
    Requested,
    Received,
    Error,
}

/// How often an order is charged
#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum ContributionFrequency {
    Monthly,
    Yearly,
    Onetime,
}

impl ContributionFrequency {
    pub fn from_interval(interval: Option<&str>) -> Self {
        match interval {
            Some("month") => ContributionFrequency::Monthly,
            Some("year") => ContributionFrequency::Yearly,
            _ => ContributionFrequency::Onetime,
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum ImageFormat {
    Png,
    Jpg,
    Gif,
    Webp,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpg => "jpg",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum OrderByField {
    #[default]
    CreatedAt,
    Amount,
}

#[derive(Enum, Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum OrderDirection {
    Asc,
    #[default]
    Desc,
}

/// Sort order for collections; newest first unless told otherwise
#[derive(InputObject, Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ChronologicalOrder {
    #[graphql(default)]
    pub field: OrderByField,
    #[graphql(default)]
    pub direction: OrderDirection,
}

impl From<ChronologicalOrder> for Sort {
    fn from(order: ChronologicalOrder) -> Self {
        Sort {
            field: match order.field {
                OrderByField::CreatedAt => SortField::CreatedAt,
                OrderByField::Amount => SortField::Amount,
            },
            direction: match order.direction {
                OrderDirection::Asc => SortDirection::Asc,
                OrderDirection::Desc => SortDirection::Desc,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn individual_maps_to_user_rows() {
        assert_eq!(
            domain::CollectiveType::from(AccountType::Individual),
            domain::CollectiveType::User
        );
        assert_eq!(
            AccountType::from(domain::CollectiveType::User),
            AccountType::Individual
        );
    }

    #[test]
    fn frequency_from_interval() {
        assert_eq!(
            ContributionFrequency::from_interval(Some("month")),
            ContributionFrequency::Monthly
        );
        assert_eq!(
            ContributionFrequency::from_interval(Some("year")),
            ContributionFrequency::Yearly
        );
        assert_eq!(
            ContributionFrequency::from_interval(None),
            ContributionFrequency::Onetime
        );
    }

    #[test]
    fn default_order_is_newest_first() {
        assert_eq!(Sort::from(ChronologicalOrder::default()), Sort::default());
    }
}
