//! # Session Store
//!
//! Shared, in-memory holder of the connected [`Session`].
//!
//! The controller creates the session on connect; the faucet service, the
//! dispatcher, and the balance monitor update its balance through a
//! [`BalanceRefresher`].

use crate::application::error::AppResult;
use crate::domain::entities::Session;
use crate::domain::value_objects::NativeAmount;
use crate::infrastructure::blockchain::BlockchainClient;
use async_trait::async_trait;
use ethers::types::Address;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Cloneable handle to the current session.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current session.
    #[must_use]
    pub fn get(&self) -> Option<Session> {
        self.inner.read().clone()
    }

    /// Returns the connected account.
    #[must_use]
    pub fn account(&self) -> Option<Address> {
        self.inner.read().as_ref().map(Session::account)
    }

    /// Returns the cached balance.
    #[must_use]
    pub fn balance(&self) -> Option<NativeAmount> {
        self.inner.read().as_ref().map(Session::balance)
    }

    /// Starts a session for `account`, keeping the cached balance if the
    /// account is unchanged.
    pub fn connect(&self, account: Address) {
        let mut guard = self.inner.write();
        match guard.as_mut() {
            Some(session) => session.switch_account(account),
            None => *guard = Some(Session::new(account)),
        }
    }

    /// Stores a freshly read balance.
    ///
    /// Ignored when `account` is no longer the connected one.
    pub fn update_balance(&self, account: Address, balance: NativeAmount) -> bool {
        let mut guard = self.inner.write();
        match guard.as_mut() {
            Some(session) if session.account() == account => {
                session.update_balance(balance);
                true
            }
            _ => {
                debug!(?account, "dropping balance for stale account");
                false
            }
        }
    }

    /// Discards the session.
    pub fn clear(&self) {
        *self.inner.write() = None;
    }
}

/// Reads an account's balance into the session.
#[async_trait]
pub trait BalanceRefresher: Send + Sync + fmt::Debug {
    /// Reads the balance of `account` and stores it in the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the balance cannot be read or converted.
    async fn refresh(&self, account: Address) -> AppResult<NativeAmount>;
}

/// [`BalanceRefresher`] reading from a [`BlockchainClient`].
#[derive(Debug, Clone)]
pub struct ChainBalanceRefresher {
    client: Arc<dyn BlockchainClient>,
    store: SessionStore,
    decimals: u32,
}

impl ChainBalanceRefresher {
    /// Creates a refresher.
    #[must_use]
    pub fn new(client: Arc<dyn BlockchainClient>, store: SessionStore, decimals: u32) -> Self {
        Self {
            client,
            store,
            decimals,
        }
    }
}

#[async_trait]
impl BalanceRefresher for ChainBalanceRefresher {
    async fn refresh(&self, account: Address) -> AppResult<NativeAmount> {
        let units = self.client.get_balance(account).await?;
        let balance = NativeAmount::from_base_units(units, self.decimals)?;
        self.store.update_balance(account, balance);
        debug!(?account, balance = %balance, "balance refreshed");
        Ok(balance)
    }
}
