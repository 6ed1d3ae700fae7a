//! Test doubles for the application services.

use crate::application::error::AppResult;
use crate::application::notifications::{Notification, Notifier};
use crate::application::session::{BalanceRefresher, ChainBalanceRefresher, SessionStore};
use crate::domain::value_objects::{ChainId, NativeAmount, TxHash};
use crate::infrastructure::blockchain::{
    AddChainParams, BlockchainClient, BlockchainError, BlockchainResult, GasPrice,
    TransferRequest, TxReceipt,
};
use crate::infrastructure::faucet::{FaucetApi, FaucetError, FaucetGrant, FaucetResult};
use async_trait::async_trait;
use ethers::types::{Address, H256};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

pub const RECEIVER: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

/// Ordered record of calls across doubles.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.0.lock().iter().filter(|e| *e == event).count()
    }
}

pub fn units(amount: &str) -> u128 {
    amount
        .parse::<NativeAmount>()
        .and_then(|a| a.to_base_units(18))
        .unwrap_or_default()
}

#[derive(Debug)]
pub struct MockChain {
    account: Address,
    remote_chain: Mutex<ChainId>,
    has_wallet: bool,
    balance: Mutex<u128>,
    nonce: Mutex<u64>,
    gas_estimate: u64,
    gas_price: u64,
    receipt_delay: Duration,
    send_failures: Mutex<VecDeque<BlockchainError>>,
    sent: Mutex<Vec<TransferRequest>>,
    log: EventLog,
}

impl MockChain {
    pub fn with_balance(amount: &str) -> Self {
        Self {
            account: Address::repeat_byte(0xaa),
            remote_chain: Mutex::new(ChainId::ONEFINITY_TESTNET),
            has_wallet: true,
            balance: Mutex::new(units(amount)),
            nonce: Mutex::new(0),
            gas_estimate: 21_000,
            gas_price: 1_000_000_000,
            receipt_delay: Duration::ZERO,
            send_failures: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            log: EventLog::default(),
        }
    }

    pub fn with_log(mut self, log: EventLog) -> Self {
        self.log = log;
        self
    }

    pub fn with_receipt_delay(mut self, delay: Duration) -> Self {
        self.receipt_delay = delay;
        self
    }

    pub fn without_wallet(mut self) -> Self {
        self.has_wallet = false;
        self
    }

    pub fn serving_chain(self, chain: ChainId) -> Self {
        *self.remote_chain.lock() = chain;
        self
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn set_balance(&self, amount: &str) {
        *self.balance.lock() = units(amount);
    }

    pub fn fail_sends(&self, errors: impl IntoIterator<Item = BlockchainError>) {
        self.send_failures.lock().extend(errors);
    }

    pub fn sent(&self) -> Vec<TransferRequest> {
        self.sent.lock().clone()
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }
}

#[async_trait]
impl BlockchainClient for MockChain {
    fn chain_id(&self) -> ChainId {
        ChainId::ONEFINITY_TESTNET
    }

    async fn accounts(&self) -> BlockchainResult<Vec<Address>> {
        self.log.push("accounts");
        if self.has_wallet {
            Ok(vec![self.account])
        } else {
            Err(BlockchainError::no_wallet("no signing key configured"))
        }
    }

    async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        self.log.push("get_chain_id");
        Ok(*self.remote_chain.lock())
    }

    async fn get_balance(&self, _address: Address) -> BlockchainResult<u128> {
        self.log.push("get_balance");
        Ok(*self.balance.lock())
    }

    async fn get_nonce(&self, _address: Address) -> BlockchainResult<u64> {
        self.log.push("get_nonce");
        Ok(*self.nonce.lock())
    }

    async fn get_gas_price(&self) -> BlockchainResult<GasPrice> {
        self.log.push("get_gas_price");
        Ok(GasPrice::new(self.gas_price))
    }

    async fn estimate_gas(&self, _request: &TransferRequest) -> BlockchainResult<u64> {
        self.log.push("estimate_gas");
        Ok(self.gas_estimate)
    }

    async fn send_transaction(&self, request: &TransferRequest) -> BlockchainResult<TxHash> {
        self.log.push("send_transaction");
        if let Some(err) = self.send_failures.lock().pop_front() {
            return Err(err);
        }
        let mut sent = self.sent.lock();
        sent.push(request.clone());
        *self.nonce.lock() += 1;
        Ok(TxHash::new(H256::from_low_u64_be(sent.len() as u64)))
    }

    async fn wait_for_receipt(&self, tx_hash: &TxHash) -> BlockchainResult<TxReceipt> {
        self.log.push("wait_for_receipt");
        if !self.receipt_delay.is_zero() {
            tokio::time::sleep(self.receipt_delay).await;
            self.log.push("receipt_mined");
        }
        Ok(TxReceipt {
            tx_hash: *tx_hash,
            block_number: Some(42),
            gas_used: self.gas_estimate,
            effective_gas_price: None,
            success: true,
        })
    }

    async fn add_network(&self, params: &AddChainParams) -> BlockchainResult<()> {
        self.log.push("add_network");
        let expected = params.parsed_chain_id().unwrap_or_default();
        let actual = *self.remote_chain.lock();
        if expected == actual {
            Ok(())
        } else {
            Err(BlockchainError::UnsupportedChain { expected, actual })
        }
    }
}

#[derive(Debug, Default)]
pub struct MockFaucet {
    failures: Mutex<VecDeque<FaucetError>>,
    always_fail: bool,
    log: EventLog,
}

impl MockFaucet {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    pub fn failing_times(log: EventLog, times: usize) -> Self {
        let failures = (0..times)
            .map(|_| FaucetError::rejected(503, "busy"))
            .collect();
        Self {
            failures: Mutex::new(failures),
            always_fail: false,
            log,
        }
    }

    pub fn always_failing(log: EventLog) -> Self {
        Self {
            always_fail: true,
            log,
            ..Self::default()
        }
    }
}

#[async_trait]
impl FaucetApi for MockFaucet {
    fn endpoint(&self) -> &str {
        "mock://faucet"
    }

    async fn request_funds(&self, _address: Address) -> FaucetResult<FaucetGrant> {
        self.log.push("faucet");
        if self.always_fail {
            return Err(FaucetError::rejected(500, "faucet down"));
        }
        if let Some(err) = self.failures.lock().pop_front() {
            return Err(err);
        }
        Ok(FaucetGrant {
            status: 200,
            message: None,
        })
    }
}

/// Refresher that records each call before delegating to the chain.
#[derive(Debug)]
pub struct CountingRefresher {
    inner: ChainBalanceRefresher,
    log: EventLog,
}

impl CountingRefresher {
    pub fn new(chain: Arc<MockChain>, store: SessionStore) -> Self {
        let log = chain.log().clone();
        Self {
            inner: ChainBalanceRefresher::new(chain, store, 18),
            log,
        }
    }
}

#[async_trait]
impl BalanceRefresher for CountingRefresher {
    async fn refresh(&self, account: Address) -> AppResult<NativeAmount> {
        self.log.push("refresh");
        self.inner.refresh(account).await
    }
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.seen.lock().iter().map(|n| n.message.clone()).collect()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().push(notification);
    }
}
