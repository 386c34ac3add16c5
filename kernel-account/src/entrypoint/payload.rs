//! Application and fee payloads: bounded call batches bound to a nonce.
//!
//! Encoded call: `[args_hash, selector, target, is_public, is_static]`.
//! App payload: `calls (MAX_APP_CALLS) || nonce`.
//! Fee payload: `calls (MAX_FEE_CALLS) || nonce || is_fee_payer`.

use ff::Field;
use kernel_common::{
    hash_fields, serde_fr, Address, FunctionSelector, Fr, DOMAIN_APP_PAYLOAD, DOMAIN_FEE_PAYLOAD,
    DOMAIN_FUNCTION_ARGS,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{KernelError, Result},
    types::GasSettings,
};

pub const MAX_APP_CALLS: usize = 4;
pub const MAX_FEE_CALLS: usize = 2;
/// Field slots per encoded call.
pub const CALL_FIELDS: usize = 5;

/// Argument list together with its hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedValues {
    #[serde(with = "serde_fr::vec")]
    pub values: Vec<Fr>,
    #[serde(with = "serde_fr")]
    pub hash: Fr,
}

impl PackedValues {
    /// Empty argument lists hash to zero.
    pub fn from_values(values: Vec<Fr>) -> Self {
        let hash = if values.is_empty() {
            Fr::ZERO
        } else {
            hash_fields(DOMAIN_FUNCTION_ARGS, &values)
        };
        Self { values, hash }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub target: Address,
    pub selector: FunctionSelector,
    #[serde(with = "serde_fr::vec")]
    pub args: Vec<Fr>,
    pub is_public: bool,
    pub is_static: bool,
}

impl FunctionCall {
    pub fn private(target: Address, selector: FunctionSelector, args: Vec<Fr>) -> Self {
        Self {
            target,
            selector,
            args,
            is_public: false,
            is_static: false,
        }
    }

    pub fn public(target: Address, selector: FunctionSelector, args: Vec<Fr>) -> Self {
        Self {
            is_public: true,
            ..Self::private(target, selector, args)
        }
    }

    pub fn packed_args(&self) -> PackedValues {
        PackedValues::from_values(self.args.clone())
    }

    pub fn args_hash(&self) -> Fr {
        self.packed_args().hash
    }
}

/// A call as the entrypoint sees it: arguments replaced by their hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodedCall {
    pub args_hash: Fr,
    pub selector: FunctionSelector,
    pub target: Address,
    pub is_public: bool,
    pub is_static: bool,
}

impl EncodedCall {
    pub fn to_fields(&self) -> [Fr; CALL_FIELDS] {
        [
            self.args_hash,
            self.selector.to_field(),
            self.target.to_field(),
            Fr::from(self.is_public as u64),
            Fr::from(self.is_static as u64),
        ]
    }
}

impl From<&FunctionCall> for EncodedCall {
    fn from(call: &FunctionCall) -> Self {
        Self {
            args_hash: call.args_hash(),
            selector: call.selector,
            target: call.target,
            is_public: call.is_public,
            is_static: call.is_static,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadKind {
    App,
    Fee { is_fee_payer: bool },
}

impl PayloadKind {
    pub fn max_calls(&self) -> usize {
        match self {
            PayloadKind::App => MAX_APP_CALLS,
            PayloadKind::Fee { .. } => MAX_FEE_CALLS,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            PayloadKind::App => "app",
            PayloadKind::Fee { .. } => "fee",
        }
    }

    fn domain(&self) -> u64 {
        match self {
            PayloadKind::App => DOMAIN_APP_PAYLOAD,
            PayloadKind::Fee { .. } => DOMAIN_FEE_PAYLOAD,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntrypointPayload {
    kind: PayloadKind,
    calls: Vec<EncodedCall>,
    packed_arguments: Vec<PackedValues>,
    nonce: Fr,
}

impl EntrypointPayload {
    fn new(kind: PayloadKind, calls: &[FunctionCall], nonce: Fr) -> Result<Self> {
        if calls.len() > kind.max_calls() {
            return Err(KernelError::TooManyCalls {
                kind: kind.name(),
                len: calls.len(),
                max: kind.max_calls(),
            });
        }
        Ok(Self {
            kind,
            calls: calls.iter().map(EncodedCall::from).collect(),
            packed_arguments: calls.iter().map(FunctionCall::packed_args).collect(),
            nonce,
        })
    }

    pub fn app(calls: &[FunctionCall], nonce: Fr) -> Result<Self> {
        Self::new(PayloadKind::App, calls, nonce)
    }

    pub fn fee(calls: &[FunctionCall], nonce: Fr, is_fee_payer: bool) -> Result<Self> {
        Self::new(PayloadKind::Fee { is_fee_payer }, calls, nonce)
    }

    pub fn kind(&self) -> PayloadKind {
        self.kind
    }

    pub fn nonce(&self) -> Fr {
        self.nonce
    }

    pub fn calls(&self) -> &[EncodedCall] {
        &self.calls
    }

    /// Packed arguments of every call, in call order. Calls without
    /// arguments contribute an empty entry with a zero hash.
    pub fn packed_arguments(&self) -> &[PackedValues] {
        &self.packed_arguments
    }

    /// Fixed-width encoding; unused call slots are zero.
    pub fn to_fields(&self) -> Vec<Fr> {
        let max = self.kind.max_calls();
        let mut out = Vec::with_capacity(max * CALL_FIELDS + 2);
        for call in &self.calls {
            out.extend(call.to_fields());
        }
        out.resize(max * CALL_FIELDS, Fr::ZERO);
        out.push(self.nonce);
        if let PayloadKind::Fee { is_fee_payer } = self.kind {
            out.push(Fr::from(is_fee_payer as u64));
        }
        out
    }

    /// Content hash; this is the message the validator signs.
    pub fn hash(&self) -> Fr {
        hash_fields(self.kind.domain(), &self.to_fields())
    }
}

/// How the transaction fee is paid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FeePaymentMethod {
    /// Someone else pays; the account is not the fee payer.
    #[default]
    None,
    /// The account pays from its own balance.
    Native,
    /// A paymaster contract is called to pay.
    Paymaster {
        address: Address,
        selector: FunctionSelector,
        args: Vec<Fr>,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeeOptions {
    pub payment_method: FeePaymentMethod,
    pub gas_settings: GasSettings,
}

impl FeeOptions {
    /// Fee-payment calls and whether the account is the fee payer.
    pub fn fee_calls(&self) -> (Vec<FunctionCall>, bool) {
        match &self.payment_method {
            FeePaymentMethod::None => (Vec::new(), false),
            FeePaymentMethod::Native => (Vec::new(), true),
            FeePaymentMethod::Paymaster {
                address,
                selector,
                args,
            } => (
                vec![FunctionCall::private(*address, *selector, args.clone())],
                true,
            ),
        }
    }
}
