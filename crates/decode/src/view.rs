//! The discriminated-union view model the approval surface renders.

use dps_types::app::{
    BatchedTransition, DocumentTransition, IdentityPublicKeyInCreation, Purpose, SecurityLevel,
    StateTransition, TokenTransition,
};
use serde::Serialize;

/// A state transition decoded for human review.
///
/// The envelope fields are present on every variant; the variant body is
/// flattened alongside them. All potentially out-of-float-range numbers are
/// decimal strings, binary fields are lowercase hex, identifiers are base58.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedTransition {
    /// The numeric wire discriminant.
    #[serde(rename = "type")]
    pub transition_type: u8,
    /// The symbolic name of the transition type.
    pub type_string: &'static str,
    /// The identity key id the signature belongs to, when the type has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_public_key_id: Option<u32>,
    /// The attached signature, hex-encoded; absent while unsigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// The full input bytes, hex-encoded. Parses back to byte-identical
    /// content.
    pub raw: String,
    /// The type-specific fields.
    #[serde(flatten)]
    pub body: DecodedBody,
}

/// The type-specific portion of a decoded transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DecodedBody {
    /// A batch of document/token actions.
    #[serde(rename_all = "camelCase")]
    Batch {
        /// The identity performing the batch, base58.
        owner_id: String,
        /// The decoded sub-transitions, in input order.
        transitions: Vec<DecodedBatchedTransition>,
    },
    /// An identity registration.
    #[serde(rename_all = "camelCase")]
    IdentityCreate {
        /// The identity being created, base58.
        identity_id: String,
        /// The initial keys.
        public_keys: Vec<DecodedPublicKey>,
        /// The asset lock proof, hex.
        asset_lock_proof: String,
    },
    /// An identity credit top-up.
    #[serde(rename_all = "camelCase")]
    IdentityTopUp {
        /// The identity being topped up, base58.
        identity_id: String,
        /// The asset lock proof, hex.
        asset_lock_proof: String,
    },
    /// An identity key/revision update.
    #[serde(rename_all = "camelCase")]
    IdentityUpdate {
        /// The identity being updated, base58.
        identity_id: String,
        /// The revision produced by the update, decimal string.
        revision: String,
        /// The identity nonce, decimal string.
        nonce: String,
        /// Keys added by the update.
        add_public_keys: Vec<DecodedPublicKey>,
        /// Ids of keys disabled by the update.
        disable_public_key_ids: Vec<u32>,
    },
    /// A credit transfer between identities.
    #[serde(rename_all = "camelCase")]
    IdentityCreditTransfer {
        /// The sending identity, base58.
        sender_id: String,
        /// The receiving identity, base58.
        recipient_id: String,
        /// The amount in credits, decimal string.
        amount: String,
        /// The sender's nonce, decimal string.
        nonce: String,
    },
    /// A masternode vote.
    #[serde(rename_all = "camelCase")]
    MasternodeVote {
        /// The masternode's provider transaction hash, hex.
        pro_tx_hash: String,
        /// The voting identity, base58.
        voter_identity_id: String,
        /// The contract defining the contested index, base58.
        data_contract_id: String,
        /// The contested document type.
        document_type_name: String,
        /// The contested index.
        index_name: String,
        /// The index values identifying the resource, hex.
        index_values: Vec<String>,
        /// The vote itself.
        vote_choice: DecodedVoteChoice,
        /// The voter's nonce, decimal string.
        nonce: String,
    },
}

/// One decoded action inside a batch. The `kind` tag is what separates the
/// two overlapping numeric action spaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum DecodedBatchedTransition {
    /// A document action.
    #[serde(rename = "document", rename_all = "camelCase")]
    Document {
        /// The numeric document action code (0–5).
        action: u8,
        /// The symbolic action name.
        action_string: &'static str,
        /// The document id, base58.
        id: String,
        /// The owning data contract, base58.
        data_contract_id: String,
        /// The document type within the contract.
        document_type_name: String,
        /// The revision the action produces, decimal string, where the
        /// action carries one.
        #[serde(skip_serializing_if = "Option::is_none")]
        revision: Option<String>,
        /// Creation entropy, hex (create only).
        #[serde(skip_serializing_if = "Option::is_none")]
        entropy: Option<String>,
        /// The receiving identity, base58 (transfer only).
        #[serde(skip_serializing_if = "Option::is_none")]
        recipient_id: Option<String>,
        /// The price in credits, decimal string (purchase/update-price).
        #[serde(skip_serializing_if = "Option::is_none")]
        price: Option<String>,
        /// The document properties, hex, where the action carries them.
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<String>,
    },
    /// A token action.
    #[serde(rename = "token", rename_all = "camelCase")]
    Token {
        /// The numeric token action code (0–10).
        action: u8,
        /// The symbolic action name.
        action_string: &'static str,
        /// The token id, base58.
        token_id: String,
        /// The owning data contract, base58.
        data_contract_id: String,
        /// The token amount, decimal string, where the action carries one.
        #[serde(skip_serializing_if = "Option::is_none")]
        amount: Option<String>,
        /// The receiving identity, base58, where the action names one.
        #[serde(skip_serializing_if = "Option::is_none")]
        recipient_id: Option<String>,
        /// The identity whose balance is (un)frozen or destroyed.
        #[serde(skip_serializing_if = "Option::is_none")]
        frozen_identity_id: Option<String>,
        /// The price in credits, decimal string, where the action sets one.
        #[serde(skip_serializing_if = "Option::is_none")]
        price: Option<String>,
        /// The on-chain public note, if any.
        #[serde(skip_serializing_if = "Option::is_none")]
        public_note: Option<String>,
    },
}

/// An identity key as rendered for review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedPublicKey {
    /// The key id within the identity.
    pub key_id: u32,
    /// What the key may authorize.
    pub purpose: Purpose,
    /// How strongly the key is protected.
    pub security_level: SecurityLevel,
    /// The public key material, hex.
    pub data: String,
    /// Whether the key may ever be disabled.
    pub read_only: bool,
}

/// A masternode vote choice as rendered for review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedVoteChoice {
    /// The symbolic choice name.
    pub choice: &'static str,
    /// The favored identity, base58, when the choice names one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub towards_identity: Option<String>,
}

/// Builds the view model for an already-parsed transition.
pub(crate) fn describe(transition: &StateTransition, raw: &[u8]) -> DecodedTransition {
    DecodedTransition {
        transition_type: transition.transition_type(),
        type_string: transition.type_name(),
        signature_public_key_id: transition.signature_public_key_id(),
        signature: non_empty_hex(transition.signature()),
        raw: hex::encode(raw),
        body: describe_body(transition),
    }
}

fn describe_body(transition: &StateTransition) -> DecodedBody {
    match transition {
        StateTransition::Batch(batch) => DecodedBody::Batch {
            owner_id: batch.owner_id.to_base58(),
            transitions: batch.transitions.iter().map(describe_batched).collect(),
        },
        StateTransition::IdentityCreate(create) => DecodedBody::IdentityCreate {
            identity_id: create.identity_id.to_base58(),
            public_keys: create.public_keys.iter().map(describe_key).collect(),
            asset_lock_proof: hex::encode(&create.asset_lock_proof),
        },
        StateTransition::IdentityTopUp(top_up) => DecodedBody::IdentityTopUp {
            identity_id: top_up.identity_id.to_base58(),
            asset_lock_proof: hex::encode(&top_up.asset_lock_proof),
        },
        StateTransition::IdentityUpdate(update) => DecodedBody::IdentityUpdate {
            identity_id: update.identity_id.to_base58(),
            revision: update.revision.to_string(),
            nonce: update.nonce.to_string(),
            add_public_keys: update.add_public_keys.iter().map(describe_key).collect(),
            disable_public_key_ids: update.disable_public_key_ids.clone(),
        },
        StateTransition::IdentityCreditTransfer(transfer) => {
            DecodedBody::IdentityCreditTransfer {
                sender_id: transfer.identity_id.to_base58(),
                recipient_id: transfer.recipient_id.to_base58(),
                amount: transfer.amount.to_string(),
                nonce: transfer.nonce.to_string(),
            }
        }
        StateTransition::MasternodeVote(vote) => DecodedBody::MasternodeVote {
            pro_tx_hash: hex::encode(vote.pro_tx_hash),
            voter_identity_id: vote.voter_identity_id.to_base58(),
            data_contract_id: vote.data_contract_id.to_base58(),
            document_type_name: vote.document_type_name.clone(),
            index_name: vote.index_name.clone(),
            index_values: vote.index_values.iter().map(hex::encode).collect(),
            vote_choice: DecodedVoteChoice {
                choice: vote.vote_choice.name(),
                towards_identity: vote
                    .vote_choice
                    .towards_identity()
                    .map(|id| id.to_base58()),
            },
            nonce: vote.nonce.to_string(),
        },
    }
}

fn describe_batched(batched: &BatchedTransition) -> DecodedBatchedTransition {
    match batched {
        BatchedTransition::Document(doc) => describe_document(doc),
        BatchedTransition::Token(token) => describe_token(token),
    }
}

fn describe_document(doc: &DocumentTransition) -> DecodedBatchedTransition {
    let base = doc.base();
    let (revision, entropy, recipient_id, price, data) = match doc {
        DocumentTransition::Create { entropy, data, .. } => (
            None,
            Some(hex::encode(entropy)),
            None,
            None,
            Some(hex::encode(data)),
        ),
        DocumentTransition::Replace { revision, data, .. } => (
            Some(revision.to_string()),
            None,
            None,
            None,
            Some(hex::encode(data)),
        ),
        DocumentTransition::Delete { .. } => (None, None, None, None, None),
        DocumentTransition::Transfer {
            revision,
            recipient_id,
            ..
        } => (
            Some(revision.to_string()),
            None,
            Some(recipient_id.to_base58()),
            None,
            None,
        ),
        DocumentTransition::Purchase {
            revision, price, ..
        }
        | DocumentTransition::UpdatePrice {
            revision, price, ..
        } => (
            Some(revision.to_string()),
            None,
            None,
            Some(price.to_string()),
            None,
        ),
    };

    DecodedBatchedTransition::Document {
        action: doc.action(),
        action_string: doc.action_name(),
        id: base.id.to_base58(),
        data_contract_id: base.data_contract_id.to_base58(),
        document_type_name: base.document_type_name.clone(),
        revision,
        entropy,
        recipient_id,
        price,
        data,
    }
}

fn describe_token(token: &TokenTransition) -> DecodedBatchedTransition {
    let base = token.base();
    let (amount, recipient_id, frozen_identity_id, price, public_note) = match token {
        TokenTransition::Burn {
            amount,
            public_note,
            ..
        } => (
            Some(amount.to_string()),
            None,
            None,
            None,
            public_note.clone(),
        ),
        TokenTransition::Mint {
            amount,
            issued_to_identity_id,
            public_note,
            ..
        } => (
            Some(amount.to_string()),
            issued_to_identity_id.as_ref().map(|id| id.to_base58()),
            None,
            None,
            public_note.clone(),
        ),
        TokenTransition::Transfer {
            amount,
            recipient_id,
            public_note,
            ..
        } => (
            Some(amount.to_string()),
            Some(recipient_id.to_base58()),
            None,
            None,
            public_note.clone(),
        ),
        TokenTransition::Freeze {
            frozen_identity_id,
            public_note,
            ..
        }
        | TokenTransition::Unfreeze {
            frozen_identity_id,
            public_note,
            ..
        }
        | TokenTransition::DestroyFrozenFunds {
            frozen_identity_id,
            public_note,
            ..
        } => (
            None,
            None,
            Some(frozen_identity_id.to_base58()),
            None,
            public_note.clone(),
        ),
        TokenTransition::Claim { public_note, .. } => {
            (None, None, None, None, public_note.clone())
        }
        TokenTransition::EmergencyAction { public_note, .. } => {
            (None, None, None, None, public_note.clone())
        }
        TokenTransition::ConfigUpdate { public_note, .. } => {
            (None, None, None, None, public_note.clone())
        }
        TokenTransition::DirectPurchase {
            amount,
            total_agreed_price,
            ..
        } => (
            Some(amount.to_string()),
            None,
            None,
            Some(total_agreed_price.to_string()),
            None,
        ),
        TokenTransition::SetPriceForDirectPurchase {
            price, public_note, ..
        } => (
            None,
            None,
            None,
            price.map(|p| p.to_string()),
            public_note.clone(),
        ),
    };

    DecodedBatchedTransition::Token {
        action: token.action(),
        action_string: token.action_name(),
        token_id: base.token_id.to_base58(),
        data_contract_id: base.data_contract_id.to_base58(),
        amount,
        recipient_id,
        frozen_identity_id,
        price,
        public_note,
    }
}

fn describe_key(key: &IdentityPublicKeyInCreation) -> DecodedPublicKey {
    DecodedPublicKey {
        key_id: key.key_id,
        purpose: key.purpose,
        security_level: key.security_level,
        data: hex::encode(&key.data),
        read_only: key.read_only,
    }
}

fn non_empty_hex(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        None
    } else {
        Some(hex::encode(bytes))
    }
}
