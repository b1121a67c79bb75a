pub mod account;
pub mod amount;
pub mod collections;
pub mod enums;
pub mod legal_document;
pub mod member;
pub mod order;
pub mod tier;
pub mod transaction;

pub use account::Account;
pub use amount::Amount;
pub use collections::Collection;
pub use legal_document::{AccountReferenceInput, LegalDocument, LegalDocumentCreateInput};
pub use member::{Member, MemberOf};
pub use order::Order;
pub use tier::Tier;
pub use transaction::Transaction;
