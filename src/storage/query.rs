use crate::domain::{CollectiveType, MemberRole, OrderStatus, TransactionType};
use crate::error::{AppError, Result};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    CreatedAt,
    Amount,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    /// Apply the direction to an ascending comparison
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Field + direction pair; ties are broken by row id in the same direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

/// One page of a filtered collection
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub limit: usize,
    pub offset: usize,
    pub total_count: usize,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Slice an already filtered and sorted set
    pub fn from_sorted(all: Vec<T>, limit: usize, offset: usize) -> Self {
        let total_count = all.len();
        let items = all.into_iter().skip(offset).take(limit).collect();
        Self {
            limit,
            offset,
            total_count,
            items,
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            limit: self.limit,
            offset: self.offset,
            total_count: self.total_count,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

/// Ledger entries owned by a collective
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionQuery {
    pub collective_id: i64,
    pub kind: Option<TransactionType>,
    pub sort: Sort,
    pub limit: usize,
    pub offset: usize,
}

/// Which side of an order the account has to be on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderParticipation {
    /// The account is the originating collective (`FromCollectiveId`)
    Sent,
    /// The account is the owning collective (`CollectiveId`)
    Received,
    Either,
}

impl OrderParticipation {
    pub fn from_flags(sent: bool, received: bool) -> Result<Self> {
        match (sent, received) {
            (true, true) => Ok(OrderParticipation::Either),
            (true, false) => Ok(OrderParticipation::Sent),
            (false, true) => Ok(OrderParticipation::Received),
            (false, false) => Err(AppError::NotFound(
                "Please provide sent or received (or both) to list orders".to_string(),
            )),
        }
    }

    pub fn matches(&self, account_id: i64, collective_id: i64, from_collective_id: i64) -> bool {
        match self {
            OrderParticipation::Sent => from_collective_id == account_id,
            OrderParticipation::Received => collective_id == account_id,
            OrderParticipation::Either => {
                from_collective_id == account_id || collective_id == account_id
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderQuery {
    pub account_id: i64,
    pub participation: OrderParticipation,
    pub status: Option<OrderStatus>,
    pub tier_id: Option<i64>,
    pub sort: Sort,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberDirection {
    /// Rows where the account is the collective being joined
    Members,
    /// Rows where the account is the member
    MemberOf,
}

/// Membership rows around an account. Empty filter lists match everything;
/// `account_types` applies to the account on the other side of the row.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberQuery {
    pub account_id: i64,
    pub direction: MemberDirection,
    pub roles: Vec<MemberRole>,
    pub account_types: Vec<CollectiveType>,
    pub limit: usize,
    pub offset: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participation_from_flags() {
        assert_eq!(
            OrderParticipation::from_flags(true, true).unwrap(),
            OrderParticipation::Either
        );
        assert_eq!(
            OrderParticipation::from_flags(true, false).unwrap(),
            OrderParticipation::Sent
        );
        assert_eq!(
            OrderParticipation::from_flags(false, true).unwrap(),
            OrderParticipation::Received
        );
        assert!(OrderParticipation::from_flags(false, false)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn participation_matching() {
        // order 7 -> 9
        assert!(OrderParticipation::Sent.matches(7, 9, 7));
        assert!(!OrderParticipation::Sent.matches(9, 9, 7));
        assert!(OrderParticipation::Received.matches(9, 9, 7));
        assert!(OrderParticipation::Either.matches(7, 9, 7));
        assert!(OrderParticipation::Either.matches(9, 9, 7));
        assert!(!OrderParticipation::Either.matches(3, 9, 7));
    }

    #[test]
    fn page_slices_and_counts() {
        let page = Page::from_sorted((1..=10).collect::<Vec<_>>(), 3, 8);
        assert_eq!(page.total_count, 10);
        assert_eq!(page.items, vec![9, 10]);

        let page = Page::from_sorted(vec![1, 2], 0, 0);
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 2);
    }

    #[test]
    fn descending_reverses_ordering() {
        assert_eq!(SortDirection::Desc.apply(1.cmp(&2)), Ordering::Greater);
        assert_eq!(SortDirection::Asc.apply(1.cmp(&2)), Ordering::Less);
    }
}
