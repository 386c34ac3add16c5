//! Integration tests for kernel accounts.
//!
//! These drive a full account against an in-memory execution node: module
//! installation, auth-wit creation and transaction submission.

use std::sync::Arc;

use async_trait::async_trait;
use kernel_account::{
    Address, AuthWitness, EcdsaValidator, ExecutionNode, ExecutionRequest, ExecutionRequestInit,
    FeeOptions, FeePaymentMethod, Fr, FunctionCall, FunctionSelector, InMemoryNonceSource,
    KernelAccount, KernelConfig, KernelError, MessageIntent, MultisigSchnorrValidator,
    NonceSource, SchnorrSigningKey, SchnorrValidator, TxStatus, WitnessMode,
};
use kernel_common::{MAX_INSTALL_KEYS_LEN, MAX_WITNESS_LEN};
use pasta_curves::pallas;
use ff::Field;
use tokio::sync::{Mutex, Notify};

const ACCOUNT: u64 = 0xacc0;

/// Records every call the account makes.
#[derive(Default)]
struct MockNode {
    nonce: Mutex<Option<u64>>,
    witnesses: Mutex<Vec<AuthWitness>>,
    submitted: Mutex<Vec<ExecutionRequest>>,
}

impl MockNode {
    fn with_nonce(nonce: u64) -> Arc<Self> {
        Arc::new(Self {
            nonce: Mutex::new(Some(nonce)),
            ..Default::default()
        })
    }
}

#[async_trait]
impl ExecutionNode for MockNode {
    async fn get_nonce(&self, _address: &Address) -> kernel_account::Result<Fr> {
        self.nonce
            .lock()
            .await
            .map(Fr::from)
            .ok_or_else(|| KernelError::Node("account not deployed".into()))
    }

    async fn add_auth_witness(&self, witness: AuthWitness) -> kernel_account::Result<()> {
        self.witnesses.lock().await.push(witness);
        Ok(())
    }

    async fn send_or_simulate(&self, request: &ExecutionRequest) -> kernel_account::Result<TxStatus> {
        let registered = self.witnesses.lock().await;
        for witness in &request.auth_witnesses {
            if !registered.contains(witness) {
                return Ok(TxStatus::Reverted("unknown auth witness".into()));
            }
        }
        self.submitted.lock().await.push(request.clone());
        Ok(TxStatus::Success)
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn schnorr_key(seed: u64) -> SchnorrSigningKey {
    SchnorrSigningKey::from_scalar(pallas::Scalar::from(seed)).unwrap()
}

fn default_validator() -> SchnorrValidator {
    SchnorrValidator::new(Address::from_u64(0x5c), schnorr_key(1234))
}

fn account(node: Arc<MockNode>) -> KernelAccount {
    KernelAccount::with_node_nonces(
        Address::from_u64(ACCOUNT),
        default_validator(),
        node,
        KernelConfig::default(),
    )
}

fn increment(amount: u64) -> FunctionCall {
    FunctionCall::private(
        Address::from_u64(0xc0ffee),
        FunctionSelector::from_signature("increment(Field)"),
        vec![Fr::from(amount)],
    )
}

#[tokio::test]
async fn test_send_registers_witnesses_and_submits_once() {
    init_tracing();
    let node = MockNode::with_nonce(10);
    let account = account(node.clone());

    let status = account
        .send(ExecutionRequestInit::new(vec![increment(1), increment(2)]))
        .await
        .expect("should submit");
    assert_eq!(status, TxStatus::Success);

    let submitted = node.submitted.lock().await;
    assert_eq!(submitted.len(), 1);
    let request = &submitted[0];
    assert_eq!(request.origin, Address::from_u64(ACCOUNT));
    assert_eq!(request.auth_witnesses.len(), 2);
    assert_eq!(request.auth_witnesses[0].message_hash, request.app_payload_hash);
    assert_eq!(request.auth_witnesses[1].message_hash, request.fee_payload_hash);
    assert!(request
        .auth_witnesses
        .iter()
        .all(|w| w.witness().len() == MAX_WITNESS_LEN && w.mode() == WitnessMode::Default));
    // two app calls plus the entrypoint wrapper
    assert_eq!(request.args_of_calls.len(), 3);
    assert_eq!(node.witnesses.lock().await.len(), 2);
}

#[tokio::test]
async fn test_installed_validator_signs_in_custom_mode() {
    let node = MockNode::with_nonce(0);
    let account = account(node.clone());

    let ecdsa = EcdsaValidator::from_bytes(Address::from_u64(0xec), &[9u8; 32]).unwrap();
    let install = account.install_validator(ecdsa.clone()).await.unwrap();
    assert_eq!(install.target, Address::from_u64(ACCOUNT));
    assert_eq!(install.selector, FunctionSelector::INSTALL);
    assert_eq!(install.args.len(), 1 + MAX_INSTALL_KEYS_LEN);
    assert_eq!(install.args[0], Address::from_u64(0xec).to_field());

    account.switch_validator(&ecdsa.identity()).await.unwrap();
    account
        .send(ExecutionRequestInit::new(vec![increment(5)]))
        .await
        .unwrap();

    let submitted = node.submitted.lock().await;
    for witness in &submitted[0].auth_witnesses {
        assert_eq!(witness.mode(), WitnessMode::Custom(ecdsa.identity()));
    }
}

#[tokio::test]
async fn test_uninstall_active_falls_back_to_default() {
    let node = MockNode::with_nonce(0);
    let account = account(node);

    let second = SchnorrValidator::new(Address::from_u64(0x77), schnorr_key(77));
    account.install_validator(second).await.unwrap();
    account.switch_validator(&Address::from_u64(0x77)).await.unwrap();

    let call = account.uninstall_validator(&Address::from_u64(0x77)).await.unwrap();
    assert_eq!(call.selector, FunctionSelector::UNINSTALL);
    assert_eq!(call.args, vec![Address::from_u64(0x77).to_field()]);
    assert_eq!(account.active_validator().await, Address::from_u64(0x5c));
    assert_eq!(account.installed_validators().await, vec![Address::from_u64(0x5c)]);

    let err = account
        .uninstall_validator(&Address::from_u64(0x5c))
        .await
        .unwrap_err();
    assert!(matches!(err, KernelError::DefaultValidatorRemoval(_)));
}

#[tokio::test]
async fn test_switch_to_unknown_validator_fails() {
    let account = account(MockNode::with_nonce(0));
    let err = account
        .switch_validator(&Address::from_u64(0xdead))
        .await
        .unwrap_err();
    assert!(matches!(err, KernelError::ValidatorNotFound(_)));
}

#[tokio::test]
async fn test_unavailable_nonce_aborts_without_side_effects() {
    let node = Arc::new(MockNode::default());
    let account = account(node.clone());

    let err = account
        .send(ExecutionRequestInit::new(vec![increment(1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, KernelError::NonceUnavailable(_)));
    assert!(node.witnesses.lock().await.is_empty());
    assert!(node.submitted.lock().await.is_empty());
}

#[tokio::test]
async fn test_multisig_account_with_paymaster() {
    let node = MockNode::with_nonce(3);
    let owners: Vec<Address> = (1..=3).map(Address::from_u64).collect();
    let multisig = MultisigSchnorrValidator::new(
        Address::from_u64(0x3a),
        owners,
        vec![Some(schnorr_key(1)), None, Some(schnorr_key(3))],
        2,
    )
    .unwrap();
    let account = KernelAccount::with_node_nonces(
        Address::from_u64(ACCOUNT),
        multisig,
        node.clone(),
        KernelConfig::default(),
    );

    let fee = FeeOptions {
        payment_method: FeePaymentMethod::Paymaster {
            address: Address::from_u64(0xfee),
            selector: FunctionSelector::from_signature("pay_fee(Field)"),
            args: vec![Fr::from(50u64)],
        },
        ..Default::default()
    };
    account
        .send(ExecutionRequestInit::new(vec![increment(1)]).with_fee(fee))
        .await
        .unwrap();

    let submitted = node.submitted.lock().await;
    let request = &submitted[0];
    // app call, paymaster call, wrapper
    assert_eq!(request.args_of_calls.len(), 3);
    assert_eq!(request.args_of_calls[1].values, vec![Fr::from(50u64)]);
    let payload = request.auth_witnesses[0].scheme_payload();
    assert_eq!(payload[0], Fr::from(2u64));
    assert_eq!(payload[1], Fr::from(0u64));
    assert_eq!(payload[1 + 1 + 64], Fr::from(2u64));
}

#[tokio::test]
async fn test_auth_wit_intents() {
    let node = MockNode::with_nonce(0);
    let account = account(node.clone());

    let hash = Fr::from(42u64);
    let witness = account.create_auth_wit(hash).await.unwrap();
    assert_eq!(witness.message_hash, hash);

    let intent = MessageIntent::action(Address::from_u64(0xbeef), increment(7));
    let expected = account.message_hash(&intent);
    let witness = account.create_auth_wit(intent.clone()).await.unwrap();
    assert_eq!(witness.message_hash, expected);
    assert_ne!(expected, hash);
    assert_eq!(node.witnesses.lock().await.len(), 2);

    let approve = account.set_public_auth_wit(intent.clone(), true);
    assert!(approve.is_public);
    assert_eq!(approve.args, vec![expected]);

    let revoke = account.set_public_auth_wit(intent.clone(), false);
    assert_eq!(revoke, account.cancel_auth_wit(intent));
    assert!(!revoke.is_public);
}

#[tokio::test]
async fn test_deployment_args_follow_default_validator() {
    let account = account(MockNode::with_nonce(0));
    let ecdsa = EcdsaValidator::from_bytes(Address::from_u64(0xec), &[9u8; 32]).unwrap();
    account.install_validator(ecdsa.clone()).await.unwrap();
    account.switch_validator(&ecdsa.identity()).await.unwrap();

    assert_eq!(
        account.deployment_args().await.unwrap(),
        default_validator().build_deployment_args().unwrap()
    );
}

#[tokio::test]
async fn test_in_memory_nonce_source() {
    let node = Arc::new(MockNode::default());
    let nonces = Arc::new(InMemoryNonceSource::new());
    nonces.set(Address::from_u64(ACCOUNT), 1).await;
    let account = KernelAccount::new(
        Address::from_u64(ACCOUNT),
        default_validator(),
        node.clone(),
        nonces.clone(),
        KernelConfig::default(),
    );

    let first = account
        .create_execution_request(ExecutionRequestInit::new(vec![increment(1)]))
        .await
        .unwrap();
    nonces.bump(&Address::from_u64(ACCOUNT)).await.unwrap();
    let second = account
        .create_execution_request(ExecutionRequestInit::new(vec![increment(1)]))
        .await
        .unwrap();
    assert_ne!(first.app_payload_hash, second.app_payload_hash);
    assert_eq!(account.get_nonce().await.unwrap(), Fr::from(2u64));
}

/// Nonce source that parks every fetch until the test releases it.
#[derive(Default)]
struct GatedNonces {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl NonceSource for GatedNonces {
    async fn get_nonce(&self, _address: &Address) -> kernel_account::Result<Fr> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(Fr::ZERO)
    }
}

#[tokio::test]
async fn test_switch_during_send_waits_for_the_build() {
    init_tracing();
    let node = Arc::new(MockNode::default());
    let gate = Arc::new(GatedNonces::default());
    let account = Arc::new(KernelAccount::new(
        Address::from_u64(ACCOUNT),
        default_validator(),
        node.clone(),
        gate.clone(),
        KernelConfig::default(),
    ));
    let ecdsa = EcdsaValidator::from_bytes(Address::from_u64(0xec), &[9u8; 32]).unwrap();
    account.install_validator(ecdsa.clone()).await.unwrap();

    let send = tokio::spawn({
        let account = account.clone();
        async move {
            account
                .send(ExecutionRequestInit::new(vec![increment(1)]))
                .await
        }
    });
    gate.entered.notified().await;

    let switch = tokio::spawn({
        let account = account.clone();
        let id = ecdsa.identity();
        async move { account.switch_validator(&id).await }
    });
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert!(!switch.is_finished(), "switch must wait for the in-flight build");

    gate.release.notify_one();
    assert_eq!(send.await.unwrap().unwrap(), TxStatus::Success);
    switch.await.unwrap().unwrap();

    {
        let submitted = node.submitted.lock().await;
        assert_eq!(submitted.len(), 1);
        let witnesses = &submitted[0].auth_witnesses;
        assert_eq!(witnesses.len(), 2);
        assert!(witnesses.iter().all(|w| w.mode() == WitnessMode::Default));
    }
    assert_eq!(account.active_validator().await, ecdsa.identity());

    // the next build sees the switch
    gate.release.notify_one();
    account
        .send(ExecutionRequestInit::new(vec![increment(2)]))
        .await
        .unwrap();
    let submitted = node.submitted.lock().await;
    assert!(submitted[1]
        .auth_witnesses
        .iter()
        .all(|w| w.mode() == WitnessMode::Custom(ecdsa.identity())));
}
