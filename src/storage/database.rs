use super::query::*;
use super::traits::Storage;
use crate::domain::*;
use crate::error::{AppError, Result};
use crate::observability::metrics;
use async_trait::async_trait;
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

const MIGRATIONS: &str = include_str!("../../migrations/001_initial.sql");

const COLLECTIVE_COLUMNS: &str = "id, slug, name, type, description, website, twitter_handle, \
     github_handle, image, currency, created_at, updated_at";
const TIER_COLUMNS: &str = "id, collective_id, slug, name, amount, currency";
const TRANSACTION_COLUMNS: &str = "id, uuid, type, description, amount, currency, \
     net_amount_in_collective_currency, collective_id, from_collective_id, order_id, \
     created_at, updated_at";
const ORDER_COLUMNS: &str = "id, description, total_amount, currency, status, interval, \
     collective_id, from_collective_id, tier_id, created_at, updated_at";
const MEMBER_COLUMNS: &str =
    "m.id, m.collective_id, m.member_collective_id, m.role, m.tier_id, m.description, m.since, m.created_at";
const LEGAL_DOCUMENT_COLUMNS: &str = "id, year, document_type, request_status, document_link, \
     host_collective_id, collective_id, created_at, updated_at";

/// SQLite-backed storage. A single connection is shared behind a mutex.
pub struct DatabaseStorage {
    conn: Mutex<Connection>,
}

impl DatabaseStorage {
    /// Open (or create) the database file and bring the schema up to date
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        info!("Opening SQLite database at {}", path.display());
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.run_migrations()?;
        Ok(storage)
    }

    /// Run database migrations
    pub fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations...");
        self.conn()?.execute_batch(MIGRATIONS)?;
        info!("Database migrations completed successfully");
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| AppError::Database {
            message: "database connection lock poisoned".to_string(),
        })
    }
}

/// Constraint failures are caller mistakes, everything else is internal
fn write_error(err: rusqlite::Error) -> AppError {
    match &err {
        rusqlite::Error::SqliteFailure(e, message) if e.code == ErrorCode::ConstraintViolation => {
            AppError::Validation(message.clone().unwrap_or_else(|| e.to_string()))
        }
        _ => err.into(),
    }
}

fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn collective_from_row(row: &Row<'_>) -> rusqlite::Result<Collective> {
    Ok(Collective {
        id: row.get(0)?,
        slug: row.get(1)?,
        name: row.get(2)?,
        kind: parse_column(row, 3)?,
        description: row.get(4)?,
        website: row.get(5)?,
        twitter_handle: row.get(6)?,
        github_handle: row.get(7)?,
        image: row.get(8)?,
        currency: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn tier_from_row(row: &Row<'_>) -> rusqlite::Result<Tier> {
    Ok(Tier {
        id: row.get(0)?,
        collective_id: row.get(1)?,
        slug: row.get(2)?,
        name: row.get(3)?,
        amount: row.get(4)?,
        currency: row.get(5)?,
    })
}

fn transaction_from_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        uuid: parse_column(row, 1)?,
        kind: parse_column(row, 2)?,
        description: row.get(3)?,
        amount: row.get(4)?,
        currency: row.get(5)?,
        net_amount_in_collective_currency: row.get(6)?,
        collective_id: row.get(7)?,
        from_collective_id: row.get(8)?,
        order_id: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn order_from_row(row: &Row<'_>) -> rusqlite::Result<Order> {
    Ok(Order {
        id: row.get(0)?,
        description: row.get(1)?,
        total_amount: row.get(2)?,
        currency: row.get(3)?,
        status: parse_column(row, 4)?,
        interval: row.get(5)?,
        collective_id: row.get(6)?,
        from_collective_id: row.get(7)?,
        tier_id: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn member_from_row(row: &Row<'_>) -> rusqlite::Result<Member> {
    Ok(Member {
        id: row.get(0)?,
        collective_id: row.get(1)?,
        member_collective_id: row.get(2)?,
        role: parse_column(row, 3)?,
        tier_id: row.get(4)?,
        description: row.get(5)?,
        since: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn legal_document_from_row(row: &Row<'_>) -> rusqlite::Result<LegalDocument> {
    Ok(LegalDocument {
        id: row.get(0)?,
        year: row.get(1)?,
        document_type: parse_column(row, 2)?,
        request_status: parse_column(row, 3)?,
        document_link: row.get(4)?,
        host_collective_id: row.get(5)?,
        collective_id: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn sort_column(field: SortField, amount_column: &'static str) -> &'static str {
    match field {
        SortField::CreatedAt => "created_at",
        SortField::Amount => amount_column,
    }
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Runs `SELECT COUNT(*)` and the paged select over the same filter
fn select_page<T>(
    conn: &Connection,
    select: &str,
    count: &str,
    mut values: Vec<Value>,
    limit: usize,
    offset: usize,
    map_row: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Page<T>> {
    let total: i64 = conn.query_row(count, params_from_iter(values.iter()), |row| row.get(0))?;

    values.push(Value::Integer(limit as i64));
    values.push(Value::Integer(offset as i64));
    let mut stmt = conn.prepare(select)?;
    let items = stmt
        .query_map(params_from_iter(values.iter()), map_row)?
        .collect::<rusqlite::Result<Vec<T>>>()?;

    Ok(Page {
        limit,
        offset,
        total_count: total as usize,
        items,
    })
}

#[async_trait]
impl Storage for DatabaseStorage {
    async fn create_collective(&self, collective: &mut Collective) -> Result<()> {
        validate_slug(&collective.slug)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO collectives (slug, name, type, description, website, twitter_handle, \
             github_handle, image, currency, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                collective.slug,
                collective.name,
                collective.kind.as_str(),
                collective.description,
                collective.website,
                collective.twitter_handle,
                collective.github_handle,
                collective.image,
                collective.currency,
                collective.created_at,
                collective.updated_at,
            ],
        )
        .map_err(write_error)?;
        collective.id = conn.last_insert_rowid();

        debug!("Created collective: {} with id {}", collective.slug, collective.id);
        Ok(())
    }

    async fn get_collective_by_id(&self, id: i64) -> Result<Option<Collective>> {
        let conn = self.conn()?;
        let collective = conn
            .query_row(
                &format!("SELECT {COLLECTIVE_COLUMNS} FROM collectives WHERE id = ?1"),
                params![id],
                collective_from_row,
            )
            .optional()?;
        Ok(collective)
    }

    async fn get_collective_by_slug(&self, slug: &str) -> Result<Option<Collective>> {
        let conn = self.conn()?;
        let collective = conn
            .query_row(
                &format!("SELECT {COLLECTIVE_COLUMNS} FROM collectives WHERE slug = ?1"),
                params![slug.to_lowercase()],
                collective_from_row,
            )
            .optional()?;
        Ok(collective)
    }

    async fn get_collectives_by_ids(&self, ids: &[i64]) -> Result<Vec<Collective>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        metrics::storage::query("Collectives");
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLLECTIVE_COLUMNS} FROM collectives WHERE id IN ({})",
            placeholders(ids.len())
        ))?;
        let collectives = stmt
            .query_map(params_from_iter(ids.iter()), collective_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(collectives)
    }

    async fn create_tier(&self, tier: &mut Tier) -> Result<()> {
        validate_slug(&tier.slug)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO tiers (collective_id, slug, name, amount, currency) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![tier.collective_id, tier.slug, tier.name, tier.amount, tier.currency],
        )
        .map_err(write_error)?;
        tier.id = conn.last_insert_rowid();

        debug!("Created tier: {} with id {}", tier.slug, tier.id);
        Ok(())
    }

    async fn get_tier_by_id(&self, id: i64) -> Result<Option<Tier>> {
        let conn = self.conn()?;
        let tier = conn
            .query_row(
                &format!("SELECT {TIER_COLUMNS} FROM tiers WHERE id = ?1"),
                params![id],
                tier_from_row,
            )
            .optional()?;
        Ok(tier)
    }

    async fn get_tier_by_slug(&self, collective_id: i64, slug: &str) -> Result<Option<Tier>> {
        let conn = self.conn()?;
        let tier = conn
            .query_row(
                &format!("SELECT {TIER_COLUMNS} FROM tiers WHERE collective_id = ?1 AND slug = ?2"),
                params![collective_id, slug.to_lowercase()],
                tier_from_row,
            )
            .optional()?;
        Ok(tier)
    }

    async fn create_transaction(&self, transaction: &mut Transaction) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO transactions (uuid, type, description, amount, currency, \
             net_amount_in_collective_currency, collective_id, from_collective_id, order_id, \
             created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                transaction.uuid.to_string(),
                transaction.kind.as_str(),
                transaction.description,
                transaction.amount,
                transaction.currency,
                transaction.net_amount_in_collective_currency,
                transaction.collective_id,
                transaction.from_collective_id,
                transaction.order_id,
                transaction.created_at,
                transaction.updated_at,
            ],
        )
        .map_err(write_error)?;
        transaction.id = conn.last_insert_rowid();

        debug!("Created transaction {} ({})", transaction.id, transaction.kind);
        Ok(())
    }

    async fn find_transactions(&self, query: &TransactionQuery) -> Result<Page<Transaction>> {
        metrics::storage::query("Transactions");
        let mut clauses = vec!["collective_id = ?"];
        let mut values = vec![Value::Integer(query.collective_id)];
        if let Some(kind) = query.kind {
            clauses.push("type = ?");
            values.push(Value::Text(kind.as_str().to_string()));
        }

        let filter = clauses.join(" AND ");
        let direction = query.sort.direction.as_sql();
        let select = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE {filter} \
             ORDER BY {} {direction}, id {direction} LIMIT ? OFFSET ?",
            sort_column(query.sort.field, "amount"),
        );
        let count = format!("SELECT COUNT(*) FROM transactions WHERE {filter}");

        let conn = self.conn()?;
        select_page(
            &conn,
            &select,
            &count,
            values,
            query.limit,
            query.offset,
            transaction_from_row,
        )
    }

    async fn create_order(&self, order: &mut Order) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO orders (description, total_amount, currency, status, interval, \
             collective_id, from_collective_id, tier_id, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                order.description,
                order.total_amount,
                order.currency,
                order.status.as_str(),
                order.interval,
                order.collective_id,
                order.from_collective_id,
                order.tier_id,
                order.created_at,
                order.updated_at,
            ],
        )
        .map_err(write_error)?;
        order.id = conn.last_insert_rowid();

        debug!("Created order {} with status {}", order.id, order.status);
        Ok(())
    }

    async fn find_orders(&self, query: &OrderQuery) -> Result<Page<Order>> {
        metrics::storage::query("Orders");
        let mut clauses = Vec::new();
        let mut values = Vec::new();
        match query.participation {
            OrderParticipation::Sent => {
                clauses.push("from_collective_id = ?");
                values.push(Value::Integer(query.account_id));
            }
            OrderParticipation::Received => {
                clauses.push("collective_id = ?");
                values.push(Value::Integer(query.account_id));
            }
            OrderParticipation::Either => {
                clauses.push("(from_collective_id = ? OR collective_id = ?)");
                values.push(Value::Integer(query.account_id));
                values.push(Value::Integer(query.account_id));
            }
        }
        if let Some(status) = query.status {
            clauses.push("status = ?");
            values.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(tier_id) = query.tier_id {
            clauses.push("tier_id = ?");
            values.push(Value::Integer(tier_id));
        }

        let filter = clauses.join(" AND ");
        let direction = query.sort.direction.as_sql();
        let select = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE {filter} \
             ORDER BY {} {direction}, id {direction} LIMIT ? OFFSET ?",
            sort_column(query.sort.field, "total_amount"),
        );
        let count = format!("SELECT COUNT(*) FROM orders WHERE {filter}");

        let conn = self.conn()?;
        select_page(
            &conn,
            &select,
            &count,
            values,
            query.limit,
            query.offset,
            order_from_row,
        )
    }

    async fn create_member(&self, member: &mut Member) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO members (collective_id, member_collective_id, role, tier_id, \
             description, since, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                member.collective_id,
                member.member_collective_id,
                member.role.as_str(),
                member.tier_id,
                member.description,
                member.since,
                member.created_at,
            ],
        )
        .map_err(write_error)?;
        member.id = conn.last_insert_rowid();

        debug!(
            "Created member {} -> {} as {}",
            member.member_collective_id, member.collective_id, member.role
        );
        Ok(())
    }

    async fn find_members(&self, query: &MemberQuery) -> Result<Page<Member>> {
        metrics::storage::query("Members");
        let (own_side, other_side) = match query.direction {
            MemberDirection::Members => ("m.collective_id", "m.member_collective_id"),
            MemberDirection::MemberOf => ("m.member_collective_id", "m.collective_id"),
        };

        let mut clauses = vec![format!("{own_side} = ?")];
        let mut values = vec![Value::Integer(query.account_id)];
        if !query.roles.is_empty() {
            clauses.push(format!("m.role IN ({})", placeholders(query.roles.len())));
            values.extend(query.roles.iter().map(|r| Value::Text(r.as_str().to_string())));
        }
        if !query.account_types.is_empty() {
            clauses.push(format!("c.type IN ({})", placeholders(query.account_types.len())));
            values.extend(
                query
                    .account_types
                    .iter()
                    .map(|t| Value::Text(t.as_str().to_string())),
            );
        }

        let from = format!(
            "members m JOIN collectives c ON c.id = {other_side} WHERE {}",
            clauses.join(" AND ")
        );
        let select = format!(
            "SELECT {MEMBER_COLUMNS} FROM {from} ORDER BY m.created_at ASC, m.id ASC LIMIT ? OFFSET ?"
        );
        let count = format!("SELECT COUNT(*) FROM {from}");

        let conn = self.conn()?;
        select_page(
            &conn,
            &select,
            &count,
            values,
            query.limit,
            query.offset,
            member_from_row,
        )
    }

    async fn create_legal_document(&self, document: NewLegalDocument) -> Result<LegalDocument> {
        let (host, collective) = document.validate()?;
        let conn = self.conn()?;

        for (id, field) in [
            (host, "LegalDocument.HostCollectiveId"),
            (collective, "LegalDocument.CollectiveId"),
        ] {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM collectives WHERE id = ?1)",
                params![id],
                |row| row.get(0),
            )?;
            if !exists {
                return Err(AppError::Validation(format!(
                    "{field} references unknown collective {id}"
                )));
            }
        }

        let created = document.into_document(0, host, collective);
        conn.execute(
            "INSERT INTO legal_documents (year, document_type, request_status, document_link, \
             host_collective_id, collective_id, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                created.year,
                created.document_type.as_str(),
                created.request_status.as_str(),
                created.document_link,
                created.host_collective_id,
                created.collective_id,
                created.created_at,
                created.updated_at,
            ],
        )
        .map_err(write_error)?;

        let created = LegalDocument {
            id: conn.last_insert_rowid(),
            ..created
        };
        metrics::storage::legal_document_created();
        debug!("Created legal document {} for collective {}", created.id, collective);
        Ok(created)
    }

    async fn get_legal_document(
        &self,
        host_collective_id: i64,
        collective_id: i64,
        year: i32,
        document_type: LegalDocumentType,
    ) -> Result<Option<LegalDocument>> {
        let conn = self.conn()?;
        let document = conn
            .query_row(
                &format!(
                    "SELECT {LEGAL_DOCUMENT_COLUMNS} FROM legal_documents \
                     WHERE host_collective_id = ?1 AND collective_id = ?2 AND year = ?3 \
                     AND document_type = ?4"
                ),
                params![host_collective_id, collective_id, year, document_type.as_str()],
                legal_document_from_row,
            )
            .optional()?;
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tempfile::tempdir;

    async fn collective(storage: &DatabaseStorage, slug: &str, kind: CollectiveType) -> Collective {
        let mut c = Collective::new(slug, slug, kind);
        storage.create_collective(&mut c).await.unwrap();
        c
    }

    #[tokio::test]
    async fn collectives_survive_reopening() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("collectives.db");

        let id = {
            let storage = DatabaseStorage::open(&path).unwrap();
            let mut babel = Collective::new("babel", "Babel", CollectiveType::Collective);
            babel.image = Some("https://example.org/babel.png".to_string());
            storage.create_collective(&mut babel).await.unwrap();
            babel.id
        };

        let storage = DatabaseStorage::open(&path).unwrap();
        let found = storage.get_collective_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.slug, "babel");
        assert_eq!(found.kind, CollectiveType::Collective);
        assert_eq!(found.image.as_deref(), Some("https://example.org/babel.png"));

        let by_slug = storage.get_collective_by_slug("Babel").await.unwrap();
        assert_eq!(by_slug.map(|c| c.id), Some(id));
    }

    #[tokio::test]
    async fn duplicate_slug_is_a_validation_error() {
        let storage = DatabaseStorage::open_in_memory().unwrap();
        collective(&storage, "babel", CollectiveType::Collective).await;

        let mut dup = Collective::new("babel", "Babel", CollectiveType::Collective);
        let err = storage.create_collective(&mut dup).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn dangling_references_are_rejected() {
        let storage = DatabaseStorage::open_in_memory().unwrap();
        let babel = collective(&storage, "babel", CollectiveType::Collective).await;

        let mut order = Order {
            id: 0,
            description: None,
            total_amount: 100,
            currency: "USD".to_string(),
            status: OrderStatus::Paid,
            interval: None,
            collective_id: babel.id,
            from_collective_id: 4242,
            tier_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(storage.create_order(&mut order).await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn orders_page_with_filters_and_sort() {
        let storage = DatabaseStorage::open_in_memory().unwrap();
        let alice = collective(&storage, "alice", CollectiveType::User).await;
        let babel = collective(&storage, "babel", CollectiveType::Collective).await;
        let mut tier = Tier {
            id: 0,
            collective_id: babel.id,
            slug: "sponsors".to_string(),
            name: "Sponsors".to_string(),
            amount: Some(10000),
            currency: "USD".to_string(),
        };
        storage.create_tier(&mut tier).await.unwrap();

        let start = Utc::now() - Duration::days(30);
        let mut ids = Vec::new();
        for (i, (amount, status, tier_id)) in [
            (500, OrderStatus::Active, None),
            (10000, OrderStatus::Active, Some(tier.id)),
            (2500, OrderStatus::Cancelled, None),
        ]
        .into_iter()
        .enumerate()
        {
            let mut order = Order {
                id: 0,
                description: None,
                total_amount: amount,
                currency: "USD".to_string(),
                status,
                interval: Some("month".to_string()),
                collective_id: babel.id,
                from_collective_id: alice.id,
                tier_id,
                created_at: start + Duration::days(i as i64),
                updated_at: start,
            };
            storage.create_order(&mut order).await.unwrap();
            ids.push(order.id);
        }

        let mut query = OrderQuery {
            account_id: babel.id,
            participation: OrderParticipation::Received,
            status: None,
            tier_id: None,
            sort: Sort::default(),
            limit: 2,
            offset: 0,
        };
        let page = storage.find_orders(&query).await.unwrap();
        assert_eq!(page.total_count, 3);
        assert_eq!(page.items.iter().map(|o| o.id).collect::<Vec<_>>(), vec![ids[2], ids[1]]);

        query.sort = Sort {
            field: SortField::Amount,
            direction: SortDirection::Asc,
        };
        query.limit = 10;
        let page = storage.find_orders(&query).await.unwrap();
        assert_eq!(
            page.items.iter().map(|o| o.total_amount).collect::<Vec<_>>(),
            vec![500, 2500, 10000]
        );

        query.status = Some(OrderStatus::Active);
        query.tier_id = Some(tier.id);
        let page = storage.find_orders(&query).await.unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].id, ids[1]);

        query.participation = OrderParticipation::Sent;
        let page = storage.find_orders(&query).await.unwrap();
        assert_eq!(page.total_count, 0);
    }

    #[tokio::test]
    async fn transactions_round_trip_uuid_and_kind() {
        let storage = DatabaseStorage::open_in_memory().unwrap();
        let alice = collective(&storage, "alice", CollectiveType::User).await;
        let babel = collective(&storage, "babel", CollectiveType::Collective).await;

        let mut credit = Transaction {
            id: 0,
            uuid: uuid::Uuid::new_v4(),
            kind: TransactionType::Credit,
            description: Some("Monthly donation".to_string()),
            amount: 500,
            currency: "USD".to_string(),
            net_amount_in_collective_currency: 450,
            collective_id: babel.id,
            from_collective_id: alice.id,
            order_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        storage.create_transaction(&mut credit).await.unwrap();

        let query = TransactionQuery {
            collective_id: babel.id,
            kind: Some(TransactionType::Credit),
            sort: Sort::default(),
            limit: 10,
            offset: 0,
        };
        let page = storage.find_transactions(&query).await.unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].uuid, credit.uuid);
        assert_eq!(page.items[0].net_amount_in_collective_currency, 450);
    }

    #[tokio::test]
    async fn members_join_on_the_other_side() {
        let storage = DatabaseStorage::open_in_memory().unwrap();
        let alice = collective(&storage, "alice", CollectiveType::User).await;
        let acme = collective(&storage, "acme", CollectiveType::Organization).await;
        let babel = collective(&storage, "babel", CollectiveType::Collective).await;

        for (member, role) in [(alice.id, MemberRole::Backer), (acme.id, MemberRole::Backer)] {
            let mut m = Member {
                id: 0,
                collective_id: babel.id,
                member_collective_id: member,
                role,
                tier_id: None,
                description: None,
                since: Utc::now(),
                created_at: Utc::now(),
            };
            storage.create_member(&mut m).await.unwrap();
        }

        let query = MemberQuery {
            account_id: babel.id,
            direction: MemberDirection::Members,
            roles: vec![MemberRole::Backer],
            account_types: vec![CollectiveType::User],
            limit: 10,
            offset: 0,
        };
        let page = storage.find_members(&query).await.unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].member_collective_id, alice.id);
    }

    #[tokio::test]
    async fn legal_documents_are_unique_per_year() {
        let storage = DatabaseStorage::open_in_memory().unwrap();
        let host = collective(&storage, "opensource", CollectiveType::Organization).await;
        let user = collective(&storage, "alice", CollectiveType::User).await;

        let created = storage
            .create_legal_document(NewLegalDocument::new(host.id, user.id, 2022))
            .await
            .unwrap();
        assert!(created.id > 0);

        let err = storage
            .create_legal_document(NewLegalDocument::new(host.id, user.id, 2022))
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let err = storage
            .create_legal_document(NewLegalDocument::new(777, user.id, 2022))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("HostCollectiveId"));

        let found = storage
            .get_legal_document(host.id, user.id, 2022, LegalDocumentType::UsTaxForm)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.request_status, LegalDocumentRequestStatus::NotRequested);
    }
}
