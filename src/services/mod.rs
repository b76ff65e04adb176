// Service exports
pub mod accounts;
pub mod memory;
pub mod postgres;
pub mod store;

pub use accounts::{generate_account, AccountError, AccountService, CreatedAccount, GeneratedAccount};
pub use memory::InMemoryStore;
pub use postgres::PostgresClient;
pub use store::{ProfileStore, RelationshipStore, StoreError};
