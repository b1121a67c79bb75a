//! The `Account` interface and the five account kinds implementing it.
//!
//! All kinds are backed by the same `Collective` row; the concrete GraphQL
//! type is picked from the row's `type`. Field resolvers live in free
//! functions shared by every kind.

use super::enums::{
    AccountType, ChronologicalOrder, ImageFormat, MemberRole, OrderStatus, TransactionType,
};
use super::{Collection, Member, MemberOf, Order, Transaction};
use crate::domain::{Collective, CollectiveType};
use crate::error::AppError;
use crate::graphql::ids::{self, Entity};
use crate::graphql::schema::GraphQLContext;
use crate::storage::{
    MemberDirection, MemberQuery, OrderParticipation, OrderQuery, TransactionQuery,
};
use async_graphql::{Context, ErrorExtensions, FieldResult, Interface, Object, ID};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Any account: individuals, organizations, collectives, events and bots
#[derive(Interface)]
#[graphql(
    field(name = "id", ty = "ID", desc = "Opaque identifier"),
    field(name = "legacy_id", ty = "i64", desc = "Row id, for older clients"),
    field(name = "slug", ty = "String"),
    field(name = "type", ty = "AccountType"),
    field(name = "name", ty = "Option<String>"),
    field(name = "description", ty = "Option<String>"),
    field(name = "website", ty = "Option<String>"),
    field(name = "twitter_handle", ty = "Option<String>"),
    field(name = "github_handle", ty = "Option<String>"),
    field(name = "currency", ty = "String"),
    field(
        name = "image_url",
        ty = "String",
        arg(name = "height", ty = "Option<i32>"),
        arg(name = "format", ty = "Option<ImageFormat>")
    ),
    field(name = "created_at", ty = "DateTime<Utc>"),
    field(name = "updated_at", ty = "DateTime<Utc>"),
    field(
        name = "members",
        ty = "Collection<Member>",
        arg(name = "limit", ty = "i32", default = 100),
        arg(name = "offset", ty = "i32", default = 0),
        arg(name = "role", ty = "Option<Vec<MemberRole>>"),
        arg(name = "account_type", ty = "Option<Vec<AccountType>>")
    ),
    field(
        name = "member_of",
        ty = "Collection<MemberOf>",
        arg(name = "limit", ty = "i32", default = 100),
        arg(name = "offset", ty = "i32", default = 0),
        arg(name = "role", ty = "Option<Vec<MemberRole>>"),
        arg(name = "account_type", ty = "Option<Vec<AccountType>>")
    ),
    field(
        name = "transactions",
        ty = "Collection<Transaction>",
        arg(name = "type", ty = "Option<TransactionType>"),
        arg(name = "limit", ty = "i32", default = 100),
        arg(name = "offset", ty = "i32", default = 0),
        arg(name = "order_by", ty = "ChronologicalOrder", default)
    ),
    field(
        name = "orders",
        ty = "Collection<Order>",
        arg(name = "sent", ty = "bool", default = false),
        arg(name = "received", ty = "bool", default = true),
        arg(name = "limit", ty = "i32", default = 100),
        arg(name = "offset", ty = "i32", default = 0),
        arg(name = "status", ty = "Option<OrderStatus>"),
        arg(name = "tier_slug", ty = "Option<String>"),
        arg(name = "order_by", ty = "ChronologicalOrder", default)
    )
)]
pub enum Account {
    Bot(BotAccount),
    Collective(CollectiveAccount),
    Event(EventAccount),
    Organization(OrganizationAccount),
    Individual(IndividualAccount),
}

impl From<Collective> for Account {
    fn from(collective: Collective) -> Self {
        match collective.kind {
            CollectiveType::Bot => Account::Bot(BotAccount { inner: collective }),
            CollectiveType::Collective => {
                Account::Collective(CollectiveAccount { inner: collective })
            }
            CollectiveType::Event => Account::Event(EventAccount { inner: collective }),
            CollectiveType::Organization => {
                Account::Organization(OrganizationAccount { inner: collective })
            }
            CollectiveType::User => Account::Individual(IndividualAccount { inner: collective }),
        }
    }
}

/// Resolve an account row through the batching loader
pub(crate) async fn load_account(ctx: &Context<'_>, id: i64) -> FieldResult<Option<Account>> {
    let context = ctx.data::<GraphQLContext>()?;
    let collective = context
        .accounts
        .load_one(id)
        .await
        .map_err(|message| AppError::Database { message }.extend())?;
    Ok(collective.map(Account::from))
}

/// `<base>/<slug>/<hash>/avatar[/<height>][.<format>]`; the hash segment
/// changes whenever the stored image does.
pub fn image_url(
    base: &str,
    collective: &Collective,
    height: Option<i32>,
    format: Option<ImageFormat>,
) -> String {
    let mut url = format!("{}/{}", base, collective.slug);
    if let Some(image) = &collective.image {
        let digest = hex::encode(Sha256::digest(image.as_bytes()));
        url.push('/');
        url.push_str(&digest[..7]);
    }
    url.push_str("/avatar");
    if let Some(height) = height {
        url.push_str(&format!("/{height}"));
    }
    if let Some(format) = format {
        url.push('.');
        url.push_str(format.extension());
    }
    url
}

fn resolve_image_url(
    ctx: &Context<'_>,
    collective: &Collective,
    height: Option<i32>,
    format: Option<ImageFormat>,
) -> FieldResult<String> {
    let context = ctx.data::<GraphQLContext>()?;
    if let Some(height) = height {
        if height <= 0 {
            return Err(AppError::InvalidArgument(format!(
                "height must be positive, got {height}"
            ))
            .extend());
        }
    }
    Ok(image_url(
        &context.settings.images_url,
        collective,
        height,
        format,
    ))
}

async fn resolve_members(
    ctx: &Context<'_>,
    collective: &Collective,
    direction: MemberDirection,
    limit: i32,
    offset: i32,
    role: Option<Vec<MemberRole>>,
    account_type: Option<Vec<AccountType>>,
) -> FieldResult<MemberQuery> {
    let context = ctx.data::<GraphQLContext>()?;
    let (limit, offset) = context
        .settings
        .page_bounds(limit, offset)
        .map_err(|e| e.extend())?;

    Ok(MemberQuery {
        account_id: collective.id,
        direction,
        roles: role
            .unwrap_or_default()
            .into_iter()
            .map(Into::into)
            .collect(),
        account_types: account_type
            .unwrap_or_default()
            .into_iter()
            .map(Into::into)
            .collect(),
        limit,
        offset,
    })
}

async fn resolve_transactions(
    ctx: &Context<'_>,
    collective: &Collective,
    kind: Option<TransactionType>,
    limit: i32,
    offset: i32,
    order_by: ChronologicalOrder,
) -> FieldResult<Collection<Transaction>> {
    let context = ctx.data::<GraphQLContext>()?;
    let (limit, offset) = context
        .settings
        .page_bounds(limit, offset)
        .map_err(|e| e.extend())?;

    let query = TransactionQuery {
        collective_id: collective.id,
        kind: kind.map(Into::into),
        sort: order_by.into(),
        limit,
        offset,
    };
    let page = context
        .storage
        .find_transactions(&query)
        .await
        .map_err(|e| e.extend())?;

    Ok(Collection::from_page(page, Transaction::from))
}

#[allow(clippy::too_many_arguments)]
async fn resolve_orders(
    ctx: &Context<'_>,
    collective: &Collective,
    sent: bool,
    received: bool,
    limit: i32,
    offset: i32,
    status: Option<OrderStatus>,
    tier_slug: Option<String>,
    order_by: ChronologicalOrder,
) -> FieldResult<Collection<Order>> {
    let context = ctx.data::<GraphQLContext>()?;
    let (limit, offset) = context
        .settings
        .page_bounds(limit, offset)
        .map_err(|e| e.extend())?;
    let participation = OrderParticipation::from_flags(sent, received).map_err(|e| e.extend())?;

    let tier_id = match tier_slug {
        Some(slug) => {
            let tier = context
                .storage
                .get_tier_by_slug(collective.id, &slug)
                .await
                .map_err(|e| e.extend())?
                .ok_or_else(|| {
                    AppError::NotFound(format!(
                        "Tier `{}` not found for account `{}`",
                        slug, collective.slug
                    ))
                    .extend()
                })?;
            Some(tier.id)
        }
        None => None,
    };

    debug!(
        "Listing orders of {} ({:?}, tier {:?})",
        collective.slug, participation, tier_id
    );
    let query = OrderQuery {
        account_id: collective.id,
        participation,
        status: status.map(Into::into),
        tier_id,
        sort: order_by.into(),
        limit,
        offset,
    };
    let page = context
        .storage
        .find_orders(&query)
        .await
        .map_err(|e| e.extend())?;

    Ok(Collection::from_page(page, Order::from))
}

/// Defines one concrete account type. Every kind exposes the same fields.
macro_rules! account_object {
    ($(#[$meta:meta])* $ty:ident, $gql_name:tt) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $ty {
            pub inner: Collective,
        }

        #[Object(name = $gql_name)]
        impl $ty {
            async fn id(&self) -> ID {
                ids::encode(Entity::Account, self.inner.id)
            }

            async fn legacy_id(&self) -> i64 {
                self.inner.id
            }

            async fn slug(&self) -> String {
                self.inner.slug.clone()
            }

            async fn r#type(&self) -> AccountType {
                self.inner.kind.into()
            }

            async fn name(&self) -> Option<String> {
                self.inner.name.clone()
            }

            async fn description(&self) -> Option<String> {
                self.inner.description.clone()
            }

            async fn website(&self) -> Option<String> {
                self.inner.website.clone()
            }

            async fn twitter_handle(&self) -> Option<String> {
                self.inner.twitter_handle.clone()
            }

            async fn github_handle(&self) -> Option<String> {
                self.inner.github_handle.clone()
            }

            async fn currency(&self) -> String {
                self.inner.currency.clone()
            }

            async fn image_url(
                &self,
                ctx: &Context<'_>,
                height: Option<i32>,
                format: Option<ImageFormat>,
            ) -> FieldResult<String> {
                resolve_image_url(ctx, &self.inner, height, format)
            }

            async fn created_at(&self) -> DateTime<Utc> {
                self.inner.created_at
            }

            async fn updated_at(&self) -> DateTime<Utc> {
                self.inner.updated_at
            }

            /// Accounts that are members of this account
            async fn members(
                &self,
                ctx: &Context<'_>,
                #[graphql(default = 100)] limit: i32,
                #[graphql(default = 0)] offset: i32,
                role: Option<Vec<MemberRole>>,
                account_type: Option<Vec<AccountType>>,
            ) -> FieldResult<Collection<Member>> {
                let query = resolve_members(
                    ctx,
                    &self.inner,
                    MemberDirection::Members,
                    limit,
                    offset,
                    role,
                    account_type,
                )
                .await?;
                let context = ctx.data::<GraphQLContext>()?;
                let page = context.storage.find_members(&query).await.map_err(|e| e.extend())?;
                Ok(Collection::from_page(page, Member::from))
            }

            /// Accounts this account is a member of
            async fn member_of(
                &self,
                ctx: &Context<'_>,
                #[graphql(default = 100)] limit: i32,
                #[graphql(default = 0)] offset: i32,
                role: Option<Vec<MemberRole>>,
                account_type: Option<Vec<AccountType>>,
            ) -> FieldResult<Collection<MemberOf>> {
                let query = resolve_members(
                    ctx,
                    &self.inner,
                    MemberDirection::MemberOf,
                    limit,
                    offset,
                    role,
                    account_type,
                )
                .await?;
                let context = ctx.data::<GraphQLContext>()?;
                let page = context.storage.find_members(&query).await.map_err(|e| e.extend())?;
                Ok(Collection::from_page(page, MemberOf::from))
            }

            /// Ledger entries owned by this account
            async fn transactions(
                &self,
                ctx: &Context<'_>,
                #[graphql(name = "type")] kind: Option<TransactionType>,
                #[graphql(default = 100)] limit: i32,
                #[graphql(default = 0)] offset: i32,
                #[graphql(default)] order_by: ChronologicalOrder,
            ) -> FieldResult<Collection<Transaction>> {
                resolve_transactions(ctx, &self.inner, kind, limit, offset, order_by).await
            }

            /// Orders sent and/or received by this account
            #[allow(clippy::too_many_arguments)]
            async fn orders(
                &self,
                ctx: &Context<'_>,
                #[graphql(default = false)] sent: bool,
                #[graphql(default = true)] received: bool,
                #[graphql(default = 100)] limit: i32,
                #[graphql(default = 0)] offset: i32,
                status: Option<OrderStatus>,
                tier_slug: Option<String>,
                #[graphql(default)] order_by: ChronologicalOrder,
            ) -> FieldResult<Collection<Order>> {
                resolve_orders(
                    ctx,
                    &self.inner,
                    sent,
                    received,
                    limit,
                    offset,
                    status,
                    tier_slug,
                    order_by,
                )
                .await
            }
        }
    };
}

account_object!(
    /// An automated account
    BotAccount,
    "Bot"
);
account_object!(
    /// A group collecting and spending money transparently
    CollectiveAccount,
    "Collective"
);
account_object!(
    /// An event organized by a collective
    EventAccount,
    "Event"
);
account_object!(
    /// A company or other legal entity
    OrganizationAccount,
    "Organization"
);
account_object!(
    /// A person
    IndividualAccount,
    "Individual"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_url_includes_hash_only_with_image() {
        let mut babel = Collective::new("babel", "Babel", CollectiveType::Collective);
        assert_eq!(
            image_url("https://images.example.org", &babel, None, None),
            "https://images.example.org/babel/avatar"
        );

        babel.image = Some("https://cdn.example.org/babel.png".to_string());
        let url = image_url(
            "https://images.example.org",
            &babel,
            Some(64),
            Some(ImageFormat::Png),
        );
        let hash = &hex::encode(Sha256::digest(b"https://cdn.example.org/babel.png"))[..7];
        assert_eq!(
            url,
            format!("https://images.example.org/babel/{hash}/avatar/64.png")
        );
    }

    #[test]
    fn row_type_picks_the_concrete_kind() {
        let user = Collective::new("alice", "Alice", CollectiveType::User);
        assert!(matches!(Account::from(user), Account::Individual(_)));
        let event = Collective::new("meetup", "Meetup", CollectiveType::Event);
        assert!(matches!(Account::from(event), Account::Event(_)));
    }
}
