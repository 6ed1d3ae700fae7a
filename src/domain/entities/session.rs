//! # Session
//!
//! The connected account and its cached native-currency balance.
//!
//! A session is created when a wallet connects, its balance is replaced on
//! every refresh, and it is discarded on disconnect.

use crate::domain::value_objects::{format_address, NativeAmount};
use chrono::{DateTime, Utc};
use ethers::types::Address;
use serde::{Deserialize, Serialize};

/// Connected account plus cached balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Connected account.
    account: Address,
    /// Last known balance.
    balance: NativeAmount,
    /// When the balance was last refreshed.
    refreshed_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Creates a session for a freshly connected account with an unknown
    /// (zero) balance.
    #[must_use]
    pub fn new(account: Address) -> Self {
        Self {
            account,
            balance: NativeAmount::ZERO,
            refreshed_at: None,
        }
    }

    /// Returns the connected account.
    #[inline]
    #[must_use]
    pub fn account(&self) -> Address {
        self.account
    }

    /// Returns the connected account in checksummed form.
    #[must_use]
    pub fn account_display(&self) -> String {
        format_address(&self.account)
    }

    /// Returns the cached balance.
    #[inline]
    #[must_use]
    pub fn balance(&self) -> NativeAmount {
        self.balance
    }

    /// Returns when the balance was last refreshed.
    #[inline]
    #[must_use]
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    /// Replaces the cached balance.
    pub fn update_balance(&mut self, balance: NativeAmount) {
        self.balance = balance;
        self.refreshed_at = Some(Utc::now());
    }

    /// Switches to another account, dropping the cached balance.
    pub fn switch_account(&mut self, account: Address) {
        if self.account != account {
            *self = Self::new(account);
        }
    }
}
