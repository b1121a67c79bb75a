use super::{Member, MemberOf, Order, Transaction};
use crate::storage::Page;
use async_graphql::{OutputType, SimpleObject};

/// A page of results together with the size of the whole filtered set
#[derive(SimpleObject)]
#[graphql(concrete(name = "TransactionCollection", params(Transaction)))]
#[graphql(concrete(name = "OrderCollection", params(Order)))]
#[graphql(concrete(name = "MemberCollection", params(Member)))]
#[graphql(concrete(name = "MemberOfCollection", params(MemberOf)))]
pub struct Collection<T: OutputType> {
    pub limit: i32,
    pub offset: i32,
    pub total_count: i32,
    pub items: Vec<T>,
}

impl<T: OutputType> Collection<T> {
    pub fn from_page<D>(page: Page<D>, f: impl FnMut(D) -> T) -> Self {
        Self {
            limit: page.limit as i32,
            offset: page.offset as i32,
            total_count: page.total_count as i32,
            items: page.items.into_iter().map(f).collect(),
        }
    }
}
