// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! In-process custodian network
//!
//! Each node is an axum server on 127.0.0.1 holding one dealt secret share.
//! Nodes re-check the condition hash and the AuthSig before releasing a
//! share, and optionally an allowlist standing in for the on-chain check.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use ethers::types::Address;
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use threshold_gate::account::AuthSig;
use threshold_gate::conditions::{condition_hash, EncryptedKeyParams};
use threshold_gate::crypto::threshold::{deal, DealtKeys, SecretKeyShare};
use threshold_gate::custodian::ClientConfig;
use threshold_gate::version::CLIENT_VERSION_HEADER;

/// Client timeouts used against mock nodes
pub const TEST_TIMEOUT: Duration = Duration::from_millis(400);

/// How long a slow node stalls, well past [`TEST_TIMEOUT`]
pub const SLOW_DELAY: Duration = Duration::from_secs(3);

type Grants = Arc<Mutex<Option<HashSet<(String, Address)>>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Honest,
    /// Stalls every request past the client timeout
    Slow,
    /// Answers share and store requests with an error code
    ErrorCode,
    /// Returns a share that is not hex
    Malformed,
    /// Reports a key bundle from a different key ceremony
    WrongKeys,
    /// Returns HTTP 500 for everything
    Down,
}

struct NodeState {
    share: SecretKeyShare,
    keys: Value,
    rogue_keys: Value,
    behavior: Mutex<Behavior>,
    conditions: Mutex<HashMap<String, String>>,
    grants: Grants,
    retrievals: Mutex<usize>,
    handshakes: Mutex<usize>,
}

impl NodeState {
    fn behavior(&self) -> Behavior {
        *self.behavior.lock().unwrap()
    }
}

pub struct MockNode {
    pub url: String,
    state: Arc<NodeState>,
}

impl MockNode {
    pub fn set_behavior(&self, behavior: Behavior) {
        *self.state.behavior.lock().unwrap() = behavior;
    }

    /// Conditions stored on this node, keyed by key hash
    pub fn stored_conditions(&self) -> HashMap<String, String> {
        self.state.conditions.lock().unwrap().clone()
    }

    /// Share requests this node has answered
    pub fn retrievals(&self) -> usize {
        *self.state.retrievals.lock().unwrap()
    }

    /// Handshakes this node has received
    pub fn handshakes(&self) -> usize {
        *self.state.handshakes.lock().unwrap()
    }
}

pub struct MockNetwork {
    pub nodes: Vec<MockNode>,
    pub keys: DealtKeys,
    grants: Grants,
}

impl MockNetwork {
    /// Start `total` honest nodes sharing a key with reconstruction threshold `threshold`
    pub async fn start(total: u8, threshold: u8) -> Self {
        let keys = deal(threshold, total).unwrap();
        let rogue = deal(threshold, total).unwrap();
        let grants: Grants = Arc::new(Mutex::new(None));

        let mut nodes = Vec::with_capacity(total as usize);
        for share in keys.shares.iter().cloned() {
            let state = Arc::new(NodeState {
                share,
                keys: key_bundle(&keys, "honest"),
                rogue_keys: key_bundle(&rogue, "rogue"),
                behavior: Mutex::new(Behavior::Honest),
                conditions: Mutex::new(HashMap::new()),
                grants: grants.clone(),
                retrievals: Mutex::new(0),
                handshakes: Mutex::new(0),
            });
            let url = serve(state.clone()).await;
            nodes.push(MockNode { url, state });
        }

        Self {
            nodes,
            keys,
            grants,
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.nodes.iter().map(|node| node.url.clone()).collect()
    }

    pub fn set_behavior(&self, index: usize, behavior: Behavior) {
        self.nodes[index].set_behavior(behavior);
    }

    /// Client config against this network with short timeouts
    pub fn client_config(&self, min_node_count: usize) -> ClientConfig {
        let mut config = ClientConfig::with_endpoints(self.urls(), min_node_count);
        config.handshake_timeout = TEST_TIMEOUT;
        config.request_timeout = TEST_TIMEOUT;
        config
    }

    /// Release shares only to `(functionName, address)` pairs granted from now on
    pub fn restrict(&self) {
        self.grants.lock().unwrap().get_or_insert_with(HashSet::new);
    }

    pub fn grant(&self, function_name: &str, address: Address) {
        self.grants
            .lock()
            .unwrap()
            .get_or_insert_with(HashSet::new)
            .insert((function_name.to_string(), address));
    }

    pub fn subnet_public_key(&self) -> String {
        self.keys.public_key_hex()
    }

    pub fn public_key_set(&self) -> String {
        self.keys.public_key_set_hex()
    }
}

fn key_bundle(keys: &DealtKeys, server: &str) -> Value {
    json!({
        "serverPublicKey": format!("{}-server-key", server),
        "subnetPublicKey": keys.public_key_hex(),
        "networkPublicKey": keys.public_key_hex(),
        "networkPublicKeySet": keys.public_key_set_hex(),
    })
}

async fn serve(state: Arc<NodeState>) -> String {
    let app = Router::new()
        .route("/web/handshake", post(handshake))
        .route("/web/encryption/store", post(store))
        .route("/web/encryption/retrieve", post(retrieve))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

/// Shared front matter for every route: version header and failure modes
async fn gate(state: &NodeState, headers: &HeaderMap) -> Option<Response> {
    if !headers.contains_key(CLIENT_VERSION_HEADER) {
        return Some((StatusCode::BAD_REQUEST, "missing client version").into_response());
    }
    match state.behavior() {
        Behavior::Slow => {
            tokio::time::sleep(SLOW_DELAY).await;
            None
        }
        Behavior::Down => {
            Some((StatusCode::INTERNAL_SERVER_ERROR, "node offline").into_response())
        }
        _ => None,
    }
}

async fn handshake(
    State(state): State<Arc<NodeState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    *state.handshakes.lock().unwrap() += 1;
    if let Some(response) = gate(&state, &headers).await {
        return response;
    }
    if body.get("clientPublicKey").is_none() {
        return (StatusCode::BAD_REQUEST, "missing clientPublicKey").into_response();
    }

    match state.behavior() {
        Behavior::WrongKeys => Json(state.rogue_keys.clone()).into_response(),
        _ => Json(state.keys.clone()).into_response(),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
struct StoreBody {
    key: String,
    val: String,
    auth_sig: AuthSig,
    chain: String,
    permanant: u8,
}

async fn store(
    State(state): State<Arc<NodeState>>,
    headers: HeaderMap,
    Json(body): Json<StoreBody>,
) -> Response {
    if let Some(response) = gate(&state, &headers).await {
        return response;
    }
    if state.behavior() == Behavior::ErrorCode {
        return Json(json!({ "error": "storage_unavailable" })).into_response();
    }
    if !body.auth_sig.verify().unwrap_or(false) {
        return Json(json!({ "error": "invalid_auth_sig" })).into_response();
    }

    state
        .conditions
        .lock()
        .unwrap()
        .insert(body.key, body.val);
    Json(json!({ "result": "success" })).into_response()
}

fn refuse(code: &str, message: impl Into<String>) -> Response {
    Json(json!({ "errorCode": code, "message": message.into() })).into_response()
}

async fn retrieve(
    State(state): State<Arc<NodeState>>,
    headers: HeaderMap,
    Json(params): Json<EncryptedKeyParams>,
) -> Response {
    if let Some(response) = gate(&state, &headers).await {
        return response;
    }
    *state.retrievals.lock().unwrap() += 1;

    match state.behavior() {
        Behavior::ErrorCode => return refuse("not_authorized", "node refused"),
        Behavior::Malformed => {
            return Json(json!({
                "decryptionShare": "not-hex",
                "shareIndex": state.share.index,
                "status": "fulfilled",
                "result": "success",
            }))
            .into_response()
        }
        _ => {}
    }

    let ciphertext = match hex::decode(&params.to_decrypt) {
        Ok(bytes) => bytes,
        Err(e) => return refuse("invalid_ciphertext", e.to_string()),
    };
    let key_hash = hex::encode(Sha256::digest(&ciphertext));
    let stored = state.conditions.lock().unwrap().get(&key_hash).cloned();
    let Some(stored) = stored else {
        return refuse("condition_not_found", key_hash);
    };
    match condition_hash(&params.evm_contract_conditions) {
        Ok(hash) if hash == stored => {}
        _ => return refuse("incorrect_access_control_conditions", "condition mismatch"),
    }

    if !params.auth_sig.verify().unwrap_or(false) {
        return refuse("invalid_auth_sig", "signature does not match address");
    }
    let requester = match Address::from_str(&params.auth_sig.address) {
        Ok(address) => address,
        Err(e) => return refuse("invalid_auth_sig", e.to_string()),
    };

    if let Some(grants) = state.grants.lock().unwrap().as_ref() {
        let allowed = params.evm_contract_conditions.iter().all(|condition| {
            grants.contains(&(condition.function_name.clone(), requester))
        });
        if !allowed {
            return refuse("not_authorized", format!("{:?} failed conditions", requester));
        }
    }

    match state.share.decryption_share(&ciphertext) {
        Ok(share) => Json(json!({
            "decryptionShare": hex::encode(share),
            "shareIndex": state.share.index,
            "status": "fulfilled",
            "result": "success",
        }))
        .into_response(),
        Err(e) => refuse("invalid_ciphertext", e.to_string()),
    }
}
