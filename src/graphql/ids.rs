//! Opaque identifiers exposed as `id` fields.
//!
//! An id is the URL-safe base64 form of `"<entity>:<row id>"`, so ids of
//! different entities never collide and raw row keys are not exposed.

use crate::error::{AppError, Result};
use async_graphql::ID;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Account,
    Transaction,
    Order,
    Tier,
    LegalDocument,
}

impl Entity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Account => "account",
            Entity::Transaction => "transaction",
            Entity::Order => "order",
            Entity::Tier => "tier",
            Entity::LegalDocument => "legal-document",
        }
    }
}

pub fn encode(entity: Entity, id: i64) -> ID {
    ID(URL_SAFE_NO_PAD.encode(format!("{}:{}", entity.as_str(), id)))
}

/// Decode an id that must belong to `entity`
pub fn decode(entity: Entity, id: &str) -> Result<i64> {
    let invalid = || AppError::InvalidArgument(format!("Invalid {} id `{}`", entity.as_str(), id));

    let bytes = URL_SAFE_NO_PAD.decode(id).map_err(|_| invalid())?;
    let text = String::from_utf8(bytes).map_err(|_| invalid())?;
    let (prefix, raw) = text.split_once(':').ok_or_else(invalid)?;
    if prefix != entity.as_str() {
        return Err(invalid());
    }
    raw.parse::<i64>().map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_hide_the_row_key() {
        let id = encode(Entity::Account, 42);
        assert_ne!(id.as_str(), "42");
        assert_eq!(decode(Entity::Account, &id).unwrap(), 42);
    }

    #[test]
    fn entity_kind_is_checked() {
        let id = encode(Entity::Order, 7);
        let err = decode(Entity::Transaction, &id).unwrap_err();
        assert_eq!(err.code(), "INVALID_ARGUMENT");
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(decode(Entity::Account, "not base64!").is_err());
        let no_number = URL_SAFE_NO_PAD.encode("account:abc");
        assert!(decode(Entity::Account, &no_number).is_err());
    }
}
