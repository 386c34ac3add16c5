//! Message hashes for authentication witnesses handed to other contracts.
//!
//! `inner = H(caller, selector, args_hash)`
//! `outer = H(consumer, chain_id, version, inner)`

use kernel_common::{
    hash_fields, reduce_be_bytes_to_fr, Address, Fr, DOMAIN_AUTHWIT_INNER, DOMAIN_AUTHWIT_OUTER,
};

use crate::entrypoint::FunctionCall;

/// What a witness authorizes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageIntent {
    /// A precomputed message hash.
    Hash(Fr),
    /// A message hash as 32 big-endian bytes.
    Bytes([u8; 32]),
    /// `caller` may perform `action` on its target. Chain id and version
    /// default to the account's own.
    Action {
        caller: Address,
        action: FunctionCall,
        chain_id: Option<u64>,
        version: Option<u64>,
    },
}

impl MessageIntent {
    pub fn action(caller: Address, action: FunctionCall) -> Self {
        MessageIntent::Action {
            caller,
            action,
            chain_id: None,
            version: None,
        }
    }

    pub fn message_hash(&self, chain_id: u64, version: u64) -> Fr {
        match self {
            MessageIntent::Hash(hash) => *hash,
            MessageIntent::Bytes(bytes) => reduce_be_bytes_to_fr(bytes),
            MessageIntent::Action {
                caller,
                action,
                chain_id: intent_chain,
                version: intent_version,
            } => {
                let inner = compute_inner_auth_wit_hash(caller, action);
                compute_outer_auth_wit_hash(
                    &action.target,
                    intent_chain.unwrap_or(chain_id),
                    intent_version.unwrap_or(version),
                    inner,
                )
            }
        }
    }
}

impl From<Fr> for MessageIntent {
    fn from(hash: Fr) -> Self {
        MessageIntent::Hash(hash)
    }
}

impl From<[u8; 32]> for MessageIntent {
    fn from(bytes: [u8; 32]) -> Self {
        MessageIntent::Bytes(bytes)
    }
}

pub fn compute_inner_auth_wit_hash(caller: &Address, action: &FunctionCall) -> Fr {
    hash_fields(
        DOMAIN_AUTHWIT_INNER,
        &[caller.to_field(), action.selector.to_field(), action.args_hash()],
    )
}

/// Binds an inner hash to the contract that consumes it and the chain.
pub fn compute_outer_auth_wit_hash(consumer: &Address, chain_id: u64, version: u64, inner: Fr) -> Fr {
    hash_fields(
        DOMAIN_AUTHWIT_OUTER,
        &[consumer.to_field(), Fr::from(chain_id), Fr::from(version), inner],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel_common::{fr_to_be_bytes, FunctionSelector};

    fn action() -> FunctionCall {
        FunctionCall::private(
            Address::from_u64(0x70),
            FunctionSelector::from_signature("transfer_from(Field,Field,Field)"),
            vec![Fr::from(1u64), Fr::from(2u64), Fr::from(3u64)],
        )
    }

    #[test]
    fn raw_hash_forms_agree() {
        let hash = Fr::from(0xdead_beefu64);
        assert_eq!(MessageIntent::from(hash).message_hash(1, 1), hash);
        assert_eq!(
            MessageIntent::from(fr_to_be_bytes(&hash)).message_hash(1, 1),
            hash
        );
    }

    #[test]
    fn intent_binds_caller_chain_and_version() {
        let caller = Address::from_u64(5);
        let base = MessageIntent::action(caller, action()).message_hash(1, 1);

        assert_ne!(MessageIntent::action(Address::from_u64(6), action()).message_hash(1, 1), base);
        assert_ne!(MessageIntent::action(caller, action()).message_hash(2, 1), base);
        assert_ne!(MessageIntent::action(caller, action()).message_hash(1, 2), base);

        let pinned = MessageIntent::Action {
            caller,
            action: action(),
            chain_id: Some(1),
            version: Some(1),
        };
        assert_eq!(pinned.message_hash(9, 9), base);
    }

    #[test]
    fn outer_hash_matches_manual_composition() {
        let caller = Address::from_u64(5);
        let inner = compute_inner_auth_wit_hash(&caller, &action());
        let outer = compute_outer_auth_wit_hash(&action().target, 7, 3, inner);
        assert_eq!(MessageIntent::action(caller, action()).message_hash(7, 3), outer);
    }
}
