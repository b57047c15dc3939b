//! The raw state transition wire model.
//!
//! State transitions are SCALE-encoded with pinned variant indexes so the
//! on-wire discriminant byte is stable across refactors. Indexes 4 and 6 are
//! reserved by the platform and intentionally absent: bytes carrying them
//! must fail to decode rather than alias another variant.

use super::{Credits, Identifier, IdentityNonce, KeyId, Purpose, Revision, SecurityLevel};
use crate::codec;
use parity_scale_codec::{Decode, Encode};

/// Wire discriminant for a batch of document/token actions.
pub const TRANSITION_TYPE_BATCH: u8 = 1;
/// Wire discriminant for identity creation.
pub const TRANSITION_TYPE_IDENTITY_CREATE: u8 = 2;
/// Wire discriminant for an identity credit top-up.
pub const TRANSITION_TYPE_IDENTITY_TOP_UP: u8 = 3;
/// Wire discriminant for an identity key/revision update.
pub const TRANSITION_TYPE_IDENTITY_UPDATE: u8 = 5;
/// Wire discriminant for an identity-to-identity credit transfer.
pub const TRANSITION_TYPE_IDENTITY_CREDIT_TRANSFER: u8 = 7;
/// Wire discriminant for a masternode vote.
pub const TRANSITION_TYPE_MASTERNODE_VOTE: u8 = 8;

/// The platform transaction: an immutable, signed instruction to change
/// platform state.
#[derive(Clone, PartialEq, Eq, Debug, Encode, Decode)]
pub enum StateTransition {
    /// Multiple document or token actions under one signature.
    #[codec(index = 1)]
    Batch(BatchTransition),
    /// Registers a new identity funded by an asset lock.
    #[codec(index = 2)]
    IdentityCreate(IdentityCreateTransition),
    /// Adds credits to an existing identity from an asset lock.
    #[codec(index = 3)]
    IdentityTopUp(IdentityTopUpTransition),
    /// Adds or disables identity public keys.
    #[codec(index = 5)]
    IdentityUpdate(IdentityUpdateTransition),
    /// Moves credits from one identity to another.
    #[codec(index = 7)]
    IdentityCreditTransfer(IdentityCreditTransferTransition),
    /// A masternode's vote on a contested resource.
    #[codec(index = 8)]
    MasternodeVote(MasternodeVoteTransition),
}

impl StateTransition {
    /// The numeric wire discriminant of this transition.
    pub fn transition_type(&self) -> u8 {
        match self {
            StateTransition::Batch(_) => TRANSITION_TYPE_BATCH,
            StateTransition::IdentityCreate(_) => TRANSITION_TYPE_IDENTITY_CREATE,
            StateTransition::IdentityTopUp(_) => TRANSITION_TYPE_IDENTITY_TOP_UP,
            StateTransition::IdentityUpdate(_) => TRANSITION_TYPE_IDENTITY_UPDATE,
            StateTransition::IdentityCreditTransfer(_) => {
                TRANSITION_TYPE_IDENTITY_CREDIT_TRANSFER
            }
            StateTransition::MasternodeVote(_) => TRANSITION_TYPE_MASTERNODE_VOTE,
        }
    }

    /// The symbolic name of this transition's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            StateTransition::Batch(_) => "BATCH",
            StateTransition::IdentityCreate(_) => "IDENTITY_CREATE",
            StateTransition::IdentityTopUp(_) => "IDENTITY_TOP_UP",
            StateTransition::IdentityUpdate(_) => "IDENTITY_UPDATE",
            StateTransition::IdentityCreditTransfer(_) => "IDENTITY_CREDIT_TRANSFER",
            StateTransition::MasternodeVote(_) => "MASTERNODE_VOTE",
        }
    }

    /// The transition signature, if one has been attached.
    pub fn signature(&self) -> &[u8] {
        match self {
            StateTransition::Batch(t) => &t.signature,
            StateTransition::IdentityCreate(t) => &t.signature,
            StateTransition::IdentityTopUp(t) => &t.signature,
            StateTransition::IdentityUpdate(t) => &t.signature,
            StateTransition::IdentityCreditTransfer(t) => &t.signature,
            StateTransition::MasternodeVote(t) => &t.signature,
        }
    }

    /// The identity key that produced (or must produce) the signature.
    ///
    /// Asset-lock funded transitions (create, top-up) are signed by the
    /// asset lock's one-time key and carry no identity key id.
    pub fn signature_public_key_id(&self) -> Option<KeyId> {
        match self {
            StateTransition::Batch(t) => t.signature_public_key_id,
            StateTransition::IdentityCreate(_) | StateTransition::IdentityTopUp(_) => None,
            StateTransition::IdentityUpdate(t) => Some(t.signature_public_key_id),
            StateTransition::IdentityCreditTransfer(t) => t.signature_public_key_id,
            StateTransition::MasternodeVote(t) => t.signature_public_key_id,
        }
    }

    /// The identity this transition acts on behalf of.
    pub fn owner_id(&self) -> &Identifier {
        match self {
            StateTransition::Batch(t) => &t.owner_id,
            StateTransition::IdentityCreate(t) => &t.identity_id,
            StateTransition::IdentityTopUp(t) => &t.identity_id,
            StateTransition::IdentityUpdate(t) => &t.identity_id,
            StateTransition::IdentityCreditTransfer(t) => &t.identity_id,
            StateTransition::MasternodeVote(t) => &t.voter_identity_id,
        }
    }

    /// Canonical wire bytes of this transition.
    pub fn to_bytes(&self) -> Result<Vec<u8>, String> {
        codec::to_bytes_canonical(self)
    }

    /// Parses a transition from canonical wire bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        codec::from_bytes_canonical(bytes)
    }
}

// -----------------------------------------------------------------------------
// Batch
// -----------------------------------------------------------------------------

/// A state transition bundling multiple document or token actions.
#[derive(Clone, PartialEq, Eq, Debug, Encode, Decode)]
pub struct BatchTransition {
    /// The identity performing every action in the batch.
    pub owner_id: Identifier,
    /// The ordered actions. Order is preserved end-to-end.
    pub transitions: Vec<BatchedTransition>,
    /// The identity key expected to sign the batch.
    pub signature_public_key_id: Option<KeyId>,
    /// The batch signature (empty until signed).
    pub signature: Vec<u8>,
}

/// One action inside a batch.
///
/// Document and token actions use overlapping numeric action codes, so the
/// kind tag here is what disambiguates them, never the action number alone.
#[derive(Clone, PartialEq, Eq, Debug, Encode, Decode)]
pub enum BatchedTransition {
    /// A document action.
    #[codec(index = 0)]
    Document(DocumentTransition),
    /// A token action.
    #[codec(index = 1)]
    Token(TokenTransition),
}

/// Fields common to every document action.
#[derive(Clone, PartialEq, Eq, Debug, Encode, Decode)]
pub struct DocumentBase {
    /// The document's identifier.
    pub id: Identifier,
    /// The data contract the document belongs to.
    pub data_contract_id: Identifier,
    /// The document type within the contract.
    pub document_type_name: String,
    /// The identity's nonce for this contract.
    pub identity_contract_nonce: IdentityNonce,
}

/// A document action. Action codes 0–5.
#[derive(Clone, PartialEq, Eq, Debug, Encode, Decode)]
pub enum DocumentTransition {
    /// Creates a new document.
    #[codec(index = 0)]
    Create {
        /// Common document fields.
        base: DocumentBase,
        /// Entropy used to derive the document id.
        entropy: [u8; 32],
        /// The document's properties, platform-serialized.
        data: Vec<u8>,
    },
    /// Replaces an existing document's contents.
    #[codec(index = 1)]
    Replace {
        /// Common document fields.
        base: DocumentBase,
        /// The revision this replacement produces.
        revision: Revision,
        /// The document's new properties, platform-serialized.
        data: Vec<u8>,
    },
    /// Deletes a document.
    #[codec(index = 2)]
    Delete {
        /// Common document fields.
        base: DocumentBase,
    },
    /// Transfers document ownership to another identity.
    #[codec(index = 3)]
    Transfer {
        /// Common document fields.
        base: DocumentBase,
        /// The revision this transfer produces.
        revision: Revision,
        /// The receiving identity.
        recipient_id: Identifier,
    },
    /// Purchases a document listed for sale.
    #[codec(index = 4)]
    Purchase {
        /// Common document fields.
        base: DocumentBase,
        /// The revision this purchase produces.
        revision: Revision,
        /// The agreed price in credits.
        price: Credits,
    },
    /// Sets or updates a document's sale price.
    #[codec(index = 5)]
    UpdatePrice {
        /// Common document fields.
        base: DocumentBase,
        /// The revision this update produces.
        revision: Revision,
        /// The new price in credits.
        price: Credits,
    },
}

impl DocumentTransition {
    /// The numeric document action code.
    pub fn action(&self) -> u8 {
        match self {
            DocumentTransition::Create { .. } => 0,
            DocumentTransition::Replace { .. } => 1,
            DocumentTransition::Delete { .. } => 2,
            DocumentTransition::Transfer { .. } => 3,
            DocumentTransition::Purchase { .. } => 4,
            DocumentTransition::UpdatePrice { .. } => 5,
        }
    }

    /// The symbolic name of the document action.
    pub fn action_name(&self) -> &'static str {
        match self {
            DocumentTransition::Create { .. } => "CREATE",
            DocumentTransition::Replace { .. } => "REPLACE",
            DocumentTransition::Delete { .. } => "DELETE",
            DocumentTransition::Transfer { .. } => "TRANSFER",
            DocumentTransition::Purchase { .. } => "PURCHASE",
            DocumentTransition::UpdatePrice { .. } => "UPDATE_PRICE",
        }
    }

    /// The common document fields.
    pub fn base(&self) -> &DocumentBase {
        match self {
            DocumentTransition::Create { base, .. }
            | DocumentTransition::Replace { base, .. }
            | DocumentTransition::Delete { base }
            | DocumentTransition::Transfer { base, .. }
            | DocumentTransition::Purchase { base, .. }
            | DocumentTransition::UpdatePrice { base, .. } => base,
        }
    }
}

/// Fields common to every token action.
#[derive(Clone, PartialEq, Eq, Debug, Encode, Decode)]
pub struct TokenBase {
    /// The token's identifier.
    pub token_id: Identifier,
    /// The data contract that defines the token.
    pub data_contract_id: Identifier,
    /// The identity's nonce for this contract.
    pub identity_contract_nonce: IdentityNonce,
}

/// A token action. Action codes 0-10; these overlap the document action
/// space numerically and must never be compared across kinds.
#[derive(Clone, PartialEq, Eq, Debug, Encode, Decode)]
pub enum TokenTransition {
    /// Permanently destroys tokens from the owner's balance.
    #[codec(index = 0)]
    Burn {
        /// Common token fields.
        base: TokenBase,
        /// The amount to burn.
        amount: Credits,
        /// An optional public note recorded on-chain.
        public_note: Option<String>,
    },
    /// Issues new tokens.
    #[codec(index = 1)]
    Mint {
        /// Common token fields.
        base: TokenBase,
        /// The amount to mint.
        amount: Credits,
        /// The identity receiving the minted tokens, if not the issuer.
        issued_to_identity_id: Option<Identifier>,
        /// An optional public note recorded on-chain.
        public_note: Option<String>,
    },
    /// Moves tokens to another identity.
    #[codec(index = 2)]
    Transfer {
        /// Common token fields.
        base: TokenBase,
        /// The amount to transfer.
        amount: Credits,
        /// The receiving identity.
        recipient_id: Identifier,
        /// An optional public note recorded on-chain.
        public_note: Option<String>,
    },
    /// Freezes an identity's token balance.
    #[codec(index = 3)]
    Freeze {
        /// Common token fields.
        base: TokenBase,
        /// The identity whose balance is frozen.
        frozen_identity_id: Identifier,
        /// An optional public note recorded on-chain.
        public_note: Option<String>,
    },
    /// Unfreezes an identity's token balance.
    #[codec(index = 4)]
    Unfreeze {
        /// Common token fields.
        base: TokenBase,
        /// The identity whose balance is unfrozen.
        frozen_identity_id: Identifier,
        /// An optional public note recorded on-chain.
        public_note: Option<String>,
    },
    /// Destroys the frozen balance of an identity.
    #[codec(index = 5)]
    DestroyFrozenFunds {
        /// Common token fields.
        base: TokenBase,
        /// The identity whose frozen balance is destroyed.
        frozen_identity_id: Identifier,
        /// An optional public note recorded on-chain.
        public_note: Option<String>,
    },
    /// Claims tokens from a distribution.
    #[codec(index = 6)]
    Claim {
        /// Common token fields.
        base: TokenBase,
        /// An optional public note recorded on-chain.
        public_note: Option<String>,
    },
    /// Pauses or resumes all token operations.
    #[codec(index = 7)]
    EmergencyAction {
        /// Common token fields.
        base: TokenBase,
        /// `true` pauses the token, `false` resumes it.
        paused: bool,
        /// An optional public note recorded on-chain.
        public_note: Option<String>,
    },
    /// Updates an item of the token's configuration.
    #[codec(index = 8)]
    ConfigUpdate {
        /// Common token fields.
        base: TokenBase,
        /// The platform-serialized configuration item.
        config_item: Vec<u8>,
        /// An optional public note recorded on-chain.
        public_note: Option<String>,
    },
    /// Buys tokens directly from the issuer at the listed price.
    #[codec(index = 9)]
    DirectPurchase {
        /// Common token fields.
        base: TokenBase,
        /// The amount of tokens purchased.
        amount: Credits,
        /// The total price agreed for the purchase, in credits.
        total_agreed_price: Credits,
    },
    /// Lists or delists tokens for direct purchase.
    #[codec(index = 10)]
    SetPriceForDirectPurchase {
        /// Common token fields.
        base: TokenBase,
        /// The new per-token price; `None` delists.
        price: Option<Credits>,
        /// An optional public note recorded on-chain.
        public_note: Option<String>,
    },
}

impl TokenTransition {
    /// The numeric token action code.
    pub fn action(&self) -> u8 {
        match self {
            TokenTransition::Burn { .. } => 0,
            TokenTransition::Mint { .. } => 1,
            TokenTransition::Transfer { .. } => 2,
            TokenTransition::Freeze { .. } => 3,
            TokenTransition::Unfreeze { .. } => 4,
            TokenTransition::DestroyFrozenFunds { .. } => 5,
            TokenTransition::Claim { .. } => 6,
            TokenTransition::EmergencyAction { .. } => 7,
            TokenTransition::ConfigUpdate { .. } => 8,
            TokenTransition::DirectPurchase { .. } => 9,
            TokenTransition::SetPriceForDirectPurchase { .. } => 10,
        }
    }

    /// The symbolic name of the token action.
    pub fn action_name(&self) -> &'static str {
        match self {
            TokenTransition::Burn { .. } => "BURN",
            TokenTransition::Mint { .. } => "MINT",
            TokenTransition::Transfer { .. } => "TRANSFER",
            TokenTransition::Freeze { .. } => "FREEZE",
            TokenTransition::Unfreeze { .. } => "UNFREEZE",
            TokenTransition::DestroyFrozenFunds { .. } => "DESTROY_FROZEN_FUNDS",
            TokenTransition::Claim { .. } => "CLAIM",
            TokenTransition::EmergencyAction { .. } => "EMERGENCY_ACTION",
            TokenTransition::ConfigUpdate { .. } => "CONFIG_UPDATE",
            TokenTransition::DirectPurchase { .. } => "DIRECT_PURCHASE",
            TokenTransition::SetPriceForDirectPurchase { .. } => {
                "SET_PRICE_FOR_DIRECT_PURCHASE"
            }
        }
    }

    /// The common token fields.
    pub fn base(&self) -> &TokenBase {
        match self {
            TokenTransition::Burn { base, .. }
            | TokenTransition::Mint { base, .. }
            | TokenTransition::Transfer { base, .. }
            | TokenTransition::Freeze { base, .. }
            | TokenTransition::Unfreeze { base, .. }
            | TokenTransition::DestroyFrozenFunds { base, .. }
            | TokenTransition::Claim { base, .. }
            | TokenTransition::EmergencyAction { base, .. }
            | TokenTransition::ConfigUpdate { base, .. }
            | TokenTransition::DirectPurchase { base, .. }
            | TokenTransition::SetPriceForDirectPurchase { base, .. } => base,
        }
    }
}

// -----------------------------------------------------------------------------
// Identity transitions
// -----------------------------------------------------------------------------

/// A public key added to an identity at creation or update time.
#[derive(Clone, PartialEq, Eq, Debug, Encode, Decode)]
pub struct IdentityPublicKeyInCreation {
    /// The key's identifier within the identity.
    pub key_id: KeyId,
    /// What the key may authorize.
    pub purpose: Purpose,
    /// How strongly the key is protected.
    pub security_level: SecurityLevel,
    /// The public key material.
    pub data: Vec<u8>,
    /// Whether the key may ever be disabled.
    pub read_only: bool,
}

/// Registers a new identity.
#[derive(Clone, PartialEq, Eq, Debug, Encode, Decode)]
pub struct IdentityCreateTransition {
    /// The identifier of the identity being created.
    pub identity_id: Identifier,
    /// The identity's initial public keys.
    pub public_keys: Vec<IdentityPublicKeyInCreation>,
    /// The platform-serialized asset lock proof funding the identity.
    pub asset_lock_proof: Vec<u8>,
    /// Signature by the asset lock's one-time key.
    pub signature: Vec<u8>,
}

/// Adds credits to an existing identity.
#[derive(Clone, PartialEq, Eq, Debug, Encode, Decode)]
pub struct IdentityTopUpTransition {
    /// The identity being topped up.
    pub identity_id: Identifier,
    /// The platform-serialized asset lock proof funding the top-up.
    pub asset_lock_proof: Vec<u8>,
    /// Signature by the asset lock's one-time key.
    pub signature: Vec<u8>,
}

/// Adds or disables identity public keys.
#[derive(Clone, PartialEq, Eq, Debug, Encode, Decode)]
pub struct IdentityUpdateTransition {
    /// The identity being updated.
    pub identity_id: Identifier,
    /// The identity revision this update produces.
    pub revision: Revision,
    /// The identity's replay-protection nonce.
    pub nonce: IdentityNonce,
    /// Keys added by this update.
    pub add_public_keys: Vec<IdentityPublicKeyInCreation>,
    /// Ids of keys disabled by this update.
    pub disable_public_key_ids: Vec<KeyId>,
    /// The master key that signs the update.
    pub signature_public_key_id: KeyId,
    /// The update signature (empty until signed).
    pub signature: Vec<u8>,
}

/// Moves credits from one identity to another.
#[derive(Clone, PartialEq, Eq, Debug, Encode, Decode)]
pub struct IdentityCreditTransferTransition {
    /// The sending identity.
    pub identity_id: Identifier,
    /// The receiving identity.
    pub recipient_id: Identifier,
    /// The amount transferred, in credits.
    pub amount: Credits,
    /// The sender's replay-protection nonce.
    pub nonce: IdentityNonce,
    /// The transfer key expected to sign.
    pub signature_public_key_id: Option<KeyId>,
    /// The transfer signature (empty until signed).
    pub signature: Vec<u8>,
}

// -----------------------------------------------------------------------------
// Masternode vote
// -----------------------------------------------------------------------------

/// The resolution a masternode votes for.
#[derive(Clone, PartialEq, Eq, Debug, Encode, Decode)]
pub enum VoteChoice {
    /// Award the contested resource to a specific identity.
    #[codec(index = 0)]
    TowardsIdentity(Identifier),
    /// Abstain from the vote.
    #[codec(index = 1)]
    Abstain,
    /// Lock the contested resource so nobody receives it.
    #[codec(index = 2)]
    Lock,
}

impl VoteChoice {
    /// The symbolic name of the choice.
    pub fn name(&self) -> &'static str {
        match self {
            VoteChoice::TowardsIdentity(_) => "TOWARDS_IDENTITY",
            VoteChoice::Abstain => "ABSTAIN",
            VoteChoice::Lock => "LOCK",
        }
    }

    /// The identity the vote favors, when the choice names one.
    pub fn towards_identity(&self) -> Option<&Identifier> {
        match self {
            VoteChoice::TowardsIdentity(id) => Some(id),
            _ => None,
        }
    }
}

/// A masternode's vote on a contested resource (e.g. a premium name).
#[derive(Clone, PartialEq, Eq, Debug, Encode, Decode)]
pub struct MasternodeVoteTransition {
    /// The masternode's provider transaction hash.
    pub pro_tx_hash: [u8; 32],
    /// The voting identity derived from the masternode.
    pub voter_identity_id: Identifier,
    /// The contract defining the contested index.
    pub data_contract_id: Identifier,
    /// The document type the contested index belongs to.
    pub document_type_name: String,
    /// The contested index.
    pub index_name: String,
    /// The index values identifying the contested resource.
    pub index_values: Vec<Vec<u8>>,
    /// The vote itself.
    pub vote_choice: VoteChoice,
    /// The voter's replay-protection nonce.
    pub nonce: IdentityNonce,
    /// The voting key expected to sign.
    pub signature_public_key_id: Option<KeyId>,
    /// The vote signature (empty until signed).
    pub signature: Vec<u8>,
}
