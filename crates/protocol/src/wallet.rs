//! Collaborator boundaries the approval flow depends on.
//!
//! The wallet repository (key and identity lookups) and the platform SDK
//! (signing and broadcast) live outside this crate; both are modeled as
//! async traits so the approval flow can be exercised against fakes.

use async_trait::async_trait;
use dps_types::app::{Identifier, KeyId, PublicKeyInfo};
use dps_types::error::WalletError;

/// A stored wallet, as listed by the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletRecord {
    /// The repository's identifier for the wallet.
    pub wallet_id: String,
    /// An optional user-facing label.
    pub label: Option<String>,
}

/// Read access to wallets, the selected identity, and its keys.
#[async_trait]
pub trait WalletRepository: Send + Sync {
    /// Every wallet the repository knows about.
    async fn get_all(&self) -> Result<Vec<WalletRecord>, WalletError>;

    /// The currently selected identity, if any wallet has one.
    async fn current_identity(&self) -> Result<Option<Identifier>, WalletError>;

    /// The public keys of an identity, in the identity's key order.
    async fn identity_keys(&self, identity: &Identifier)
        -> Result<Vec<PublicKeyInfo>, WalletError>;
}

/// The external platform SDK: produces signatures and broadcasts signed
/// transitions. Failures come back as plain strings from the foreign
/// boundary and are wrapped by the caller.
#[async_trait]
pub trait PlatformSdk: Send + Sync {
    /// Signs raw transition bytes with the identity key named by `key_id`,
    /// returning the full signed transition bytes.
    async fn sign_state_transition(
        &self,
        bytes: &[u8],
        key_id: KeyId,
    ) -> Result<Vec<u8>, String>;

    /// Broadcasts signed transition bytes to the platform.
    async fn broadcast(&self, signed: &[u8]) -> Result<(), String>;
}

/// Fails with [`WalletError::WalletNotFound`] when the repository holds no
/// wallet at all. Entry points that need a wallet call this first so the
/// caller can route to the creation flow.
pub async fn require_wallet<R: WalletRepository>(
    repository: &R,
) -> Result<Vec<WalletRecord>, WalletError> {
    let wallets = repository.get_all().await?;
    if wallets.is_empty() {
        return Err(WalletError::WalletNotFound);
    }
    Ok(wallets)
}
