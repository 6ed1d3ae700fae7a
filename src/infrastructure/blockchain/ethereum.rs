//! # Ethereum Client
//!
//! EVM client implementation using ethers-rs.
//!
//! Reads go through a plain HTTP provider; transfers are signed by a local
//! wallet wrapped around the same provider in a [`SignerMiddleware`].

use super::client::{
    BlockchainClient, BlockchainError, BlockchainResult, TransferRequest, TxReceipt,
};
use super::gas::GasPrice;
use super::network::AddChainParams;
use crate::domain::value_objects::{ChainId, TxHash};
use async_trait::async_trait;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, MiddlewareError, PendingTransaction, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, TransactionRequest, U256};
use std::time::Duration;
use tracing::{debug, info};

type WalletClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Default receipt polling interval.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// EVM client backed by ethers-rs with a local signing wallet.
#[derive(Debug)]
pub struct EthereumClient {
    /// The chain this client is configured for.
    chain_id: ChainId,
    /// RPC provider.
    provider: Provider<Http>,
    /// Provider wrapped with the signing wallet.
    wallet: WalletClient,
    /// Confirmations to wait for after inclusion.
    confirmations: usize,
}

impl EthereumClient {
    /// Creates a new client.
    ///
    /// # Arguments
    ///
    /// * `chain_id` - The chain to sign for
    /// * `rpc_url` - RPC endpoint URL
    /// * `private_key` - Hex-encoded signing key, if a wallet is configured
    ///
    /// # Errors
    ///
    /// Returns [`BlockchainError::NoWallet`] if no key is configured or the
    /// key is malformed, and [`BlockchainError::Connection`] if the provider
    /// cannot be created.
    pub fn new(
        chain_id: ChainId,
        rpc_url: &str,
        private_key: Option<&str>,
    ) -> BlockchainResult<Self> {
        let key = private_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| BlockchainError::no_wallet("no signing key configured"))?;

        let wallet: LocalWallet = key
            .strip_prefix("0x")
            .unwrap_or(key)
            .parse()
            .map_err(|e| BlockchainError::no_wallet(format!("invalid signing key: {}", e)))?;
        let wallet = wallet.with_chain_id(chain_id.as_u64());

        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| BlockchainError::connection(e.to_string()))?
            .interval(DEFAULT_POLL_INTERVAL);

        info!(
            chain_id = %chain_id,
            rpc_url,
            account = ?wallet.address(),
            "wallet ready"
        );

        Ok(Self {
            chain_id,
            wallet: SignerMiddleware::new(provider.clone(), wallet),
            provider,
            confirmations: 1,
        })
    }

    /// Sets the number of confirmations to wait for.
    #[must_use]
    pub fn with_confirmations(mut self, confirmations: usize) -> Self {
        self.confirmations = confirmations.max(1);
        self
    }

    fn build_request(request: &TransferRequest) -> TransactionRequest {
        let mut tx = TransactionRequest::new()
            .from(request.from)
            .to(request.to)
            .value(U256::from(request.value))
            .chain_id(request.chain_id.as_u64());

        if let Some(nonce) = request.nonce {
            tx = tx.nonce(nonce);
        }
        if let Some(gas_limit) = request.gas_limit {
            tx = tx.gas(gas_limit);
        }
        if let Some(gas_price) = request.gas_price {
            tx = tx.gas_price(gas_price.wei());
        }
        tx
    }
}

/// Maps any ethers middleware error onto a classified [`BlockchainError`].
fn map_error<E: MiddlewareError>(err: E) -> BlockchainError {
    if let Some(response) = err.as_error_response() {
        return BlockchainError::from_rpc(Some(response.code), response.message.clone());
    }
    if let Some(provider_err) = err.as_provider_error() {
        let message = provider_err.to_string();
        if message.to_lowercase().contains("timed out") {
            return BlockchainError::timeout(message);
        }
        if matches!(provider_err, ethers::providers::ProviderError::HTTPError(_)) {
            return BlockchainError::connection(message);
        }
    }
    BlockchainError::from_rpc(None, err.to_string())
}

fn to_u64(value: U256, what: &str) -> BlockchainResult<u64> {
    u64::try_from(value).map_err(|_| BlockchainError::internal(format!("{} exceeds u64", what)))
}

fn to_u128(value: U256, what: &str) -> BlockchainResult<u128> {
    u128::try_from(value).map_err(|_| BlockchainError::internal(format!("{} exceeds u128", what)))
}

#[async_trait]
impl BlockchainClient for EthereumClient {
    fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    async fn accounts(&self) -> BlockchainResult<Vec<Address>> {
        Ok(vec![self.wallet.address()])
    }

    async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        let id = self.provider.get_chainid().await.map_err(map_error)?;
        Ok(ChainId::new(to_u64(id, "chain id")?))
    }

    async fn get_balance(&self, address: Address) -> BlockchainResult<u128> {
        let balance = self
            .provider
            .get_balance(address, None)
            .await
            .map_err(map_error)?;
        to_u128(balance, "balance")
    }

    async fn get_nonce(&self, address: Address) -> BlockchainResult<u64> {
        let nonce = self
            .provider
            .get_transaction_count(address, None)
            .await
            .map_err(map_error)?;
        to_u64(nonce, "nonce")
    }

    async fn get_gas_price(&self) -> BlockchainResult<GasPrice> {
        let price = self.provider.get_gas_price().await.map_err(map_error)?;
        Ok(GasPrice::new(to_u64(price, "gas price")?))
    }

    async fn estimate_gas(&self, request: &TransferRequest) -> BlockchainResult<u64> {
        let tx: TypedTransaction = Self::build_request(request).into();
        let estimate = self
            .provider
            .estimate_gas(&tx, None)
            .await
            .map_err(map_error)?;
        to_u64(estimate, "gas estimate")
    }

    async fn send_transaction(&self, request: &TransferRequest) -> BlockchainResult<TxHash> {
        let tx = Self::build_request(request);
        debug!(?tx, "submitting transaction");

        let pending = self
            .wallet
            .send_transaction(tx, None)
            .await
            .map_err(map_error)?;

        Ok(TxHash::new(pending.tx_hash()))
    }

    async fn wait_for_receipt(&self, tx_hash: &TxHash) -> BlockchainResult<TxReceipt> {
        let receipt = PendingTransaction::new(tx_hash.as_h256(), &self.provider)
            .confirmations(self.confirmations)
            .await
            .map_err(map_error)?
            .ok_or_else(|| {
                BlockchainError::timeout(format!("transaction {} dropped from mempool", tx_hash))
            })?;

        let success = receipt.status.map(|s| s.as_u64() == 1).unwrap_or(false);
        if !success {
            return Err(BlockchainError::reverted(format!(
                "transaction {} failed on-chain",
                tx_hash
            )));
        }

        Ok(TxReceipt {
            tx_hash: *tx_hash,
            block_number: receipt.block_number.map(|n| n.as_u64()),
            gas_used: receipt
                .gas_used
                .map(|g| to_u64(g, "gas used"))
                .transpose()?
                .unwrap_or_default(),
            effective_gas_price: receipt
                .effective_gas_price
                .map(|p| to_u64(p, "effective gas price"))
                .transpose()?,
            success,
        })
    }

    async fn add_network(&self, params: &AddChainParams) -> BlockchainResult<()> {
        let expected = params
            .parsed_chain_id()
            .ok_or_else(|| BlockchainError::internal(format!("bad chain id {}", params.chain_id)))?;

        // A local wallet signs for exactly one chain; registering means the
        // endpoint must serve it.
        let actual = self.get_chain_id().await?;
        if actual != expected || expected != self.chain_id {
            return Err(BlockchainError::UnsupportedChain { expected, actual });
        }

        info!(chain = %params.chain_name, chain_id = %expected, "network registered");
        Ok(())
    }
}
