pub mod cache;
pub mod provider;

pub use cache::{ADDRESS_CACHE_TTL, DerivedAddressCache};
pub use provider::WalletProvider;
