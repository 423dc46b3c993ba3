//! Keyed value stores for API keys and settings
//!
//! - `SecretStore` trait for implementing custom stores
//! - Built-in implementations: `EnvSecretStore`, `DotenvSecretStore`,
//!   `MemorySecretStore`, `ChainSecretStore`

mod traits;
mod env_store;
mod dotenv_store;
mod memory_store;
mod chain_store;

pub use traits::{SecretStore, SecretValue, SecretStoreError, SecretStoreResult};
pub use env_store::EnvSecretStore;
pub use dotenv_store::{DotenvSecretStore, parse_dotenv};
pub use memory_store::MemorySecretStore;
pub use chain_store::ChainSecretStore;
