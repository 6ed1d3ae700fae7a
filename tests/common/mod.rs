//! Shared fixtures for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use ethers::types::{Address, H256};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use testnet_autosender::application::{Notification, Notifier};
use testnet_autosender::config::Settings;
use testnet_autosender::domain::value_objects::{ChainId, NativeAmount, TxHash};
use testnet_autosender::infrastructure::blockchain::{
    AddChainParams, BlockchainClient, BlockchainResult, GasPrice, TransferRequest, TxReceipt,
};

pub const RECEIVER: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

/// In-memory chain holding one funded account.
#[derive(Debug)]
pub struct InMemoryChain {
    account: Address,
    balance: Mutex<u128>,
    sent: Mutex<Vec<TransferRequest>>,
}

impl InMemoryChain {
    pub fn new(balance: &str) -> Arc<Self> {
        Arc::new(Self {
            account: Address::repeat_byte(0x11),
            balance: Mutex::new(units(balance)),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn sent(&self) -> Vec<TransferRequest> {
        self.sent.lock().clone()
    }
}

pub fn units(amount: &str) -> u128 {
    amount
        .parse::<NativeAmount>()
        .and_then(|a| a.to_base_units(18))
        .unwrap_or_default()
}

#[async_trait]
impl BlockchainClient for InMemoryChain {
    fn chain_id(&self) -> ChainId {
        ChainId::ONEFINITY_TESTNET
    }

    async fn accounts(&self) -> BlockchainResult<Vec<Address>> {
        Ok(vec![self.account])
    }

    async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        Ok(ChainId::ONEFINITY_TESTNET)
    }

    async fn get_balance(&self, _address: Address) -> BlockchainResult<u128> {
        Ok(*self.balance.lock())
    }

    async fn get_nonce(&self, _address: Address) -> BlockchainResult<u64> {
        Ok(self.sent.lock().len() as u64)
    }

    async fn get_gas_price(&self) -> BlockchainResult<GasPrice> {
        Ok(GasPrice::new(1_000_000_000))
    }

    async fn estimate_gas(&self, _request: &TransferRequest) -> BlockchainResult<u64> {
        Ok(21_000)
    }

    async fn send_transaction(&self, request: &TransferRequest) -> BlockchainResult<TxHash> {
        let mut sent = self.sent.lock();
        let mut balance = self.balance.lock();
        *balance = balance.saturating_sub(request.value);
        sent.push(request.clone());
        Ok(TxHash::new(H256::from_low_u64_be(sent.len() as u64)))
    }

    async fn wait_for_receipt(&self, tx_hash: &TxHash) -> BlockchainResult<TxReceipt> {
        Ok(TxReceipt {
            tx_hash: *tx_hash,
            block_number: Some(1),
            gas_used: 21_000,
            effective_gas_price: Some(1_000_000_000),
            success: true,
        })
    }

    async fn add_network(&self, _params: &AddChainParams) -> BlockchainResult<()> {
        Ok(())
    }
}

/// Notifier keeping every message.
#[derive(Debug, Default)]
pub struct CollectingNotifier(Mutex<Vec<Notification>>);

impl CollectingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.0.lock().iter().map(|n| n.message.clone()).collect()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notification: Notification) {
        self.0.lock().push(notification);
    }
}

/// Default settings with millisecond pacing.
pub fn fast_settings(faucet_url: &str) -> Settings {
    let mut settings = Settings::default();
    settings.faucet.url = faucet_url.to_string();
    settings.faucet.timeout_ms = 2_000;
    settings.automation.retry_delay_ms = 10;
    settings.automation.tx_interval_ms = 20;
    settings.automation.faucet_interval_ms = 60_000;
    settings.automation.balance_poll_ms = 1_000;
    settings
}

/// Polls `condition` every few milliseconds for up to two seconds.
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
