// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Access-gated retrieval
//!
//! A request is authorized by three independent checks: the requester's
//! signature must recover to the claimed address, the ownership contract
//! must confirm the address holds the content, and the custodian network
//! re-runs the same contract check before releasing any key share.

use ethers::types::Address;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::error::GateError;
use super::params::{AuthParams, MessageParams};
use super::token;
use crate::account::{Account, AuthSig, DERIVED_VIA_PERSONAL_SIGN};
use crate::conditions::{EncryptedKeyParams, EvmContractCondition, USER_ADDRESS_PLACEHOLDER};
use crate::config::{ChainRegistry, GatewayConfig};
use crate::contracts::{
    ContractCaller, ContractOwnershipVerifier, ContractRegistry, OwnershipKind,
    OwnershipVerifier, BLOCK_NFT, NODE_STAKING, VERIFY_OWNER_METHOD, VERIFY_STAKE_METHOD,
};
use crate::crypto::{aes_cbc, authorization_statement, prng, recover_address, ThresholdCipher};
use crate::custodian::{CustodianClient, CustodianError};
use crate::storage::{bytes32_to_cid, cid_to_bytes32, ContentStore};

/// Size of the per-item content key
pub const CONTENT_KEY_LEN: usize = 32;

/// The network key recovered from the custodian network
///
/// Signs access tokens and keys the authorization statement.
#[derive(Clone, PartialEq, Eq)]
pub struct NetworkKey(Vec<u8>);

impl NetworkKey {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for NetworkKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NetworkKey(<{} bytes>)", self.0.len())
    }
}

/// Encrypted content ready for publication
#[derive(Debug, Clone, PartialEq)]
pub struct SealedContent {
    /// CID of the ciphertext in the content store
    pub cid: String,
    pub cid_bytes32: String,
    /// Hex threshold ciphertext of the content key
    pub encrypted_key: String,
    pub key_hash: String,
    pub conditions: Vec<EvmContractCondition>,
}

pub struct AccessGate {
    config: GatewayConfig,
    account: Account,
    registry: Arc<ContractRegistry>,
    verifier: Arc<dyn OwnershipVerifier>,
    store: Arc<dyn ContentStore>,
    cipher: Option<Arc<dyn ThresholdCipher>>,
    chains: ChainRegistry,
}

impl AccessGate {
    pub fn new(
        config: GatewayConfig,
        account: Account,
        registry: Arc<ContractRegistry>,
        verifier: Arc<dyn OwnershipVerifier>,
        store: Arc<dyn ContentStore>,
    ) -> Self {
        let account = account.with_domain(config.domain.clone());
        Self {
            config,
            account,
            registry,
            verifier,
            store,
            cipher: None,
            chains: ChainRegistry::new(),
        }
    }

    /// Gate backed by the deployed contracts named in `config`
    ///
    /// Requires the node private key, the RPC provider URL and the contracts
    /// directory to be configured.
    pub fn from_config(
        config: GatewayConfig,
        store: Arc<dyn ContentStore>,
    ) -> Result<Self, GateError> {
        config.validate().map_err(GateError::Validation)?;

        let private_key = config
            .private_key
            .as_deref()
            .ok_or_else(|| GateError::Validation("GATE_PRIVATE_KEY is required".to_string()))?;
        let account = Account::from_private_key(private_key)
            .map_err(|e| GateError::Validation(e.to_string()))?;
        let provider_url = config
            .provider_url
            .as_deref()
            .ok_or_else(|| GateError::Validation("PROVIDER_URL is required".to_string()))?;
        let contracts_dir = config
            .contracts_dir
            .as_ref()
            .ok_or_else(|| GateError::Validation("GATE_CONTRACTS_DIR is required".to_string()))?;

        let chain = config.chain_name().unwrap_or_default();
        let mut registry = ContractRegistry::new(chain, config.chain_id.clone());
        registry.load_dir(contracts_dir)?;
        let registry = Arc::new(registry);

        let caller = ContractCaller::from_url(provider_url, registry.clone())?;
        let verifier = Arc::new(ContractOwnershipVerifier::new(caller));

        Ok(Self::new(config, account, registry, verifier, store))
    }

    /// Use `cipher` instead of the default threshold cipher
    pub fn with_cipher(mut self, cipher: Arc<dyn ThresholdCipher>) -> Self {
        self.cipher = Some(cipher);
        self
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// A freshly connected custodian client
    pub async fn connect_client(&self) -> Result<CustodianClient, GateError> {
        let client_config = self.config.client.clone();
        let mut client = match &self.cipher {
            Some(cipher) => CustodianClient::with_cipher(client_config, cipher.clone()),
            None => CustodianClient::new(client_config),
        }
        .map_err(|e| GateError::Upstream(e.to_string()))?;

        client.connect().await.map_err(|e| {
            warn!("Custodian client failed to connect: {}", e);
            GateError::Upstream(e.to_string())
        })?;
        Ok(client)
    }

    fn node_chain(&self) -> Result<String, GateError> {
        self.config
            .chain_name()
            .ok_or_else(|| GateError::Validation(format!("Unknown chain id {}", self.config.chain_id)))
    }

    fn request_chain(&self, chain_id: &str) -> Result<String, GateError> {
        self.chains
            .name_for_id(chain_id)
            .map(str::to_string)
            .ok_or_else(|| GateError::Validation(format!("Unknown chain id {}", chain_id)))
    }

    /// `contract.method(params..) == true` on `chain`
    fn condition(
        &self,
        contract: &str,
        method: &str,
        chain: &str,
        params: Vec<String>,
    ) -> Result<EvmContractCondition, GateError> {
        let entry = self.registry.get(contract)?;
        let abi = self.registry.abi_member(contract, method)?;
        Ok(EvmContractCondition::returns_true(
            format!("{:?}", entry.address),
            chain,
            abi,
            params,
        ))
    }

    fn ownership_condition(
        &self,
        kind: OwnershipKind,
        cid_bytes32: &str,
        chain: &str,
    ) -> Result<EvmContractCondition, GateError> {
        self.condition(
            kind.contract_name(),
            VERIFY_OWNER_METHOD,
            chain,
            vec![cid_bytes32.to_string(), USER_ADDRESS_PLACEHOLDER.to_string()],
        )
    }

    /// Recover the network key with the node's own staking credentials
    ///
    /// The custodian network releases the key only to staked nodes.
    pub async fn authenticate_node(&self) -> Result<NetworkKey, GateError> {
        let client = self.connect_client().await?;
        self.recover_network_key(&client).await
    }

    async fn recover_network_key(
        &self,
        client: &CustodianClient,
    ) -> Result<NetworkKey, GateError> {
        let chain = self.node_chain()?;
        let staking = self.registry.get(NODE_STAKING)?;
        let encrypted_key = staking
            .encrypted_key
            .clone()
            .ok_or_else(|| GateError::NotFound(format!("{} has no encrypted key", NODE_STAKING)))?;

        let condition = self.condition(
            NODE_STAKING,
            VERIFY_STAKE_METHOD,
            &chain,
            vec![USER_ADDRESS_PLACEHOLDER.to_string()],
        )?;
        let auth_sig = self
            .account
            .siwe(&self.config.chain_id, "")
            .await
            .map_err(|e| GateError::Upstream(e.to_string()))?;

        let params = EncryptedKeyParams {
            auth_sig,
            chain,
            evm_contract_conditions: vec![condition],
            to_decrypt: encrypted_key,
        };

        let key = client.get_encryption_key(&params).await.map_err(|e| {
            warn!("Node authentication failed: {}", e);
            GateError::Unauthorized(e.to_string())
        })?;
        debug!("Node {:?} authenticated", self.account.address());

        Ok(NetworkKey::new(key))
    }

    /// Sign-in message for `params`, keyed by `key`
    pub fn message_for(&self, key: &NetworkKey, params: &MessageParams) -> Result<String, GateError> {
        let issued_at = params.issued_at()?;
        let statement = authorization_statement(key.as_bytes(), &params.cid, &params.origin)?;

        Ok(self.account.domain().message(
            &params.address,
            &statement,
            &params.chain,
            &issued_at.timestamp().to_string(),
            &params.issue_date,
        ))
    }

    /// The message a requester must sign to be authorized
    pub async fn sign_message(&self, params: &MessageParams) -> Result<String, GateError> {
        let key = self.authenticate_node().await?;
        self.message_for(&key, params)
    }

    /// Check the requester's signature, returning the signed message
    pub fn authenticate_signature(
        &self,
        params: &AuthParams,
        key: &NetworkKey,
    ) -> Result<String, GateError> {
        let message = self.message_for(key, &params.message_params())?;
        let recovered = recover_address(&params.signature, &message)
            .map_err(|e| GateError::Unauthorized(format!("Signature recovery failed: {}", e)))?;

        if recovered != params.address {
            return Err(GateError::Unauthorized(format!(
                "{:?} does not match {:?}",
                recovered, params.address
            )));
        }

        Ok(message)
    }

    /// Check on-chain that the requester holds the content
    pub async fn authenticate_block(&self, params: &AuthParams) -> Result<(), GateError> {
        let kind = params
            .kind
            .parse::<OwnershipKind>()
            .map_err(GateError::Unsupported)?;
        let cid = params.message_params().cid_bytes()?;

        if !self.verifier.verify_owner(kind, cid, params.address).await? {
            return Err(GateError::Unauthorized(format!(
                "{:?} does not own {} {}",
                params.address, kind, params.cid
            )));
        }
        Ok(())
    }

    pub fn create_token(&self, params: &AuthParams, key: &NetworkKey) -> Result<String, GateError> {
        token::create_token(params, key.as_bytes())
    }

    pub fn validate_token(&self, token: &str, key: &NetworkKey) -> Result<AuthParams, GateError> {
        token::validate_token(token, key.as_bytes())
    }

    /// Full authorization chain, returning an access token
    pub async fn authorize(&self, params: &AuthParams) -> Result<String, GateError> {
        params.validate()?;
        let key = self.authenticate_node().await?;
        self.authenticate_signature(params, &key)?;
        self.authenticate_block(params).await?;

        let token = self.create_token(params, &key)?;
        info!("Authorized {:?} for {} {}", params.address, params.kind, params.cid);
        Ok(token)
    }

    /// Whether the node account is staked
    pub async fn node_is_staked(&self) -> Result<bool, GateError> {
        Ok(self.verifier.verify_stake(self.account.address()).await?)
    }

    /// Encrypt `plaintext`, store it and register its ownership condition
    ///
    /// The content key is threshold-encrypted to the custodian network and
    /// released only to owners of the block token for the stored CID.
    pub async fn seal_content(&self, plaintext: &[u8]) -> Result<SealedContent, GateError> {
        let chain = self.node_chain()?;
        let content_key = prng(CONTENT_KEY_LEN);
        let ciphertext = aes_cbc::encrypt(&content_key, plaintext)?;

        let cid = self.store.add(ciphertext).await?;
        let cid_bytes32 = cid_to_bytes32(&cid)?;
        let conditions = vec![self.condition(
            BLOCK_NFT,
            VERIFY_OWNER_METHOD,
            &chain,
            vec![cid_bytes32.clone(), USER_ADDRESS_PLACEHOLDER.to_string()],
        )?];

        let auth_sig = self
            .account
            .siwe(&self.config.chain_id, "")
            .await
            .map_err(|e| GateError::Upstream(e.to_string()))?;
        let client = self.connect_client().await?;
        let saved = client
            .save_encryption_key(&content_key, &auth_sig, &conditions, &chain)
            .await
            .map_err(|e| GateError::Upstream(e.to_string()))?;

        info!(
            "Sealed {} bytes as {} (stored on {} nodes)",
            plaintext.len(),
            cid,
            saved.stored_on
        );

        Ok(SealedContent {
            cid,
            cid_bytes32,
            encrypted_key: saved.encrypted_key_hex(),
            key_hash: saved.key_hash,
            conditions,
        })
    }

    /// Decrypt stored content for an authorized requester
    ///
    /// The requester's signature doubles as the AuthSig the custodian nodes
    /// check before releasing shares.
    pub async fn unseal_content(
        &self,
        params: &AuthParams,
        encrypted_key: &str,
    ) -> Result<Vec<u8>, GateError> {
        params.validate()?;
        let kind = params
            .kind
            .parse::<OwnershipKind>()
            .map_err(GateError::Unsupported)?;
        let chain = self.request_chain(&params.chain)?;

        let client = self.connect_client().await?;
        let key = self.recover_network_key(&client).await?;
        let signed_message = self.authenticate_signature(params, &key)?;
        self.authenticate_block(params).await?;

        let auth_sig = AuthSig {
            sig: params.signature.clone(),
            derived_via: DERIVED_VIA_PERSONAL_SIGN.to_string(),
            signed_message,
            address: format!("{:?}", params.address),
        };
        let key_params = EncryptedKeyParams {
            auth_sig,
            chain: chain.clone(),
            evm_contract_conditions: vec![self.ownership_condition(kind, &params.cid, &chain)?],
            to_decrypt: encrypted_key.to_string(),
        };

        let content_key = client
            .get_encryption_key(&key_params)
            .await
            .map_err(|e| match e {
                CustodianError::Encoding { .. } => GateError::Validation(e.to_string()),
                _ => GateError::Unauthorized(e.to_string()),
            })?;

        let cid = bytes32_to_cid(&params.cid)?;
        let ciphertext = self.store.cat(&cid).await?;
        let plaintext = aes_cbc::decrypt(&content_key, &ciphertext)?;
        info!("Unsealed {} for {:?}", cid, params.address);

        Ok(plaintext)
    }

    /// Address the gate signs as
    pub fn node_address(&self) -> Address {
        self.account.address()
    }
}
