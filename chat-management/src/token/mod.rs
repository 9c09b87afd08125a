//! Access-token minting and validation over a rotatable multi-key store.

pub mod keystore;
pub mod minter;

pub use keystore::{KeyStore, SharedKeyStore, StaticKeyStore};
pub use minter::{Claims, MintedToken, Minter};
