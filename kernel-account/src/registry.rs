//! Per-account set of installed validators with a fixed default and a
//! movable active pointer.

use std::collections::HashMap;

use kernel_common::{Address, Fr};
use tracing::{info, warn};

use crate::{
    error::{KernelError, Result},
    types::{AuthWitness, DeploymentArgs},
    validator::Validator,
};

#[derive(Clone, Debug)]
pub struct ValidatorRegistry {
    validators: HashMap<Address, Validator>,
    default_id: Address,
    active_id: Address,
}

impl ValidatorRegistry {
    /// The default validator is installed and active from the start.
    pub fn new(default: impl Into<Validator>) -> Self {
        let default = default.into();
        let id = default.identity();
        let mut validators = HashMap::new();
        validators.insert(id, default);
        Self {
            validators,
            default_id: id,
            active_id: id,
        }
    }

    /// Insert or overwrite by identity. Overwriting the default identity is a
    /// key rotation: it stays the default, and `deployment_args` and default
    /// mode witnesses use the new key material from then on.
    pub fn register(&mut self, validator: impl Into<Validator>) {
        let validator = validator.into();
        let id = validator.identity();
        let scheme = validator.scheme();
        if self.validators.insert(id, validator).is_some() {
            info!(validator = %id, scheme, "replaced installed validator");
        } else {
            info!(validator = %id, scheme, "registered validator");
        }
    }

    /// Remove a non-default validator. If it was active, the pointer falls
    /// back to the default.
    pub fn remove(&mut self, identity: &Address) -> Result<Validator> {
        if *identity == self.default_id {
            return Err(KernelError::DefaultValidatorRemoval(*identity));
        }
        let removed = self
            .validators
            .remove(identity)
            .ok_or(KernelError::ValidatorNotFound(*identity))?;
        if self.active_id == *identity {
            warn!(
                validator = %identity,
                default = %self.default_id,
                "removed active validator; falling back to default"
            );
            self.active_id = self.default_id;
        }
        info!(validator = %identity, "removed validator");
        Ok(removed)
    }

    pub fn switch_active(&mut self, identity: &Address) -> Result<()> {
        if !self.validators.contains_key(identity) {
            return Err(KernelError::ValidatorNotFound(*identity));
        }
        info!(from = %self.active_id, to = %identity, "switched active validator");
        self.active_id = *identity;
        Ok(())
    }

    pub fn get(&self, identity: &Address) -> Result<&Validator> {
        self.validators
            .get(identity)
            .ok_or(KernelError::ValidatorNotFound(*identity))
    }

    pub fn contains(&self, identity: &Address) -> bool {
        self.validators.contains_key(identity)
    }

    pub fn active_validator(&self) -> Result<&Validator> {
        self.get(&self.active_id)
    }

    pub fn default_validator(&self) -> Result<&Validator> {
        self.get(&self.default_id)
    }

    pub fn active_id(&self) -> Address {
        self.active_id
    }

    pub fn default_id(&self) -> Address {
        self.default_id
    }

    pub fn is_default_active(&self) -> bool {
        self.active_id == self.default_id
    }

    /// Installed identities, sorted by field encoding.
    pub fn installed(&self) -> Vec<Address> {
        let mut ids: Vec<Address> = self.validators.keys().copied().collect();
        ids.sort_by_key(|id| {
            let mut bytes = id.to_bytes();
            bytes.reverse();
            bytes
        });
        ids
    }

    /// Witness from the active validator, in default mode iff it is the default.
    pub fn build_witness(&self, message_hash: Fr) -> Result<AuthWitness> {
        self.active_validator()?
            .build_witness(message_hash, self.is_default_active())
    }

    /// Constructor arguments of the account: the default validator's keys.
    pub fn deployment_args(&self) -> Result<DeploymentArgs> {
        self.default_validator()?.build_deployment_args()
    }
}
