//! # Transfers
//!
//! [`TransferIntent`] describes one native-currency transfer about to be
//! attempted; [`TransactionResult`] records the last one that completed.

use crate::domain::value_objects::{AmountResult, ChainId, NativeAmount, TxHash};
use chrono::{DateTime, Utc};
use ethers::types::Address;
use serde::{Deserialize, Serialize};

/// A single native-currency transfer, built fresh for every attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferIntent {
    from: Address,
    to: Address,
    amount: NativeAmount,
    value: u128,
    chain_id: ChainId,
}

impl TransferIntent {
    /// Creates a transfer intent, converting `amount` into base units.
    ///
    /// # Errors
    ///
    /// Returns an [`AmountError`](crate::domain::value_objects::AmountError)
    /// if `amount` cannot be expressed with `decimals` fractional digits.
    pub fn new(
        from: Address,
        to: Address,
        amount: NativeAmount,
        decimals: u32,
        chain_id: ChainId,
    ) -> AmountResult<Self> {
        let value = amount.to_base_units(decimals)?;
        Ok(Self {
            from,
            to,
            amount,
            value,
            chain_id,
        })
    }

    /// Sender.
    #[inline]
    #[must_use]
    pub fn sender(&self) -> Address {
        self.from
    }

    /// Receiver.
    #[inline]
    #[must_use]
    pub fn receiver(&self) -> Address {
        self.to
    }

    /// Amount in decimal units.
    #[inline]
    #[must_use]
    pub fn amount(&self) -> NativeAmount {
        self.amount
    }

    /// Amount in base units.
    #[inline]
    #[must_use]
    pub fn value(&self) -> u128 {
        self.value
    }

    /// Target chain.
    #[inline]
    #[must_use]
    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Returns true if `balance` (in base units) covers the transfer value.
    ///
    /// Gas is not reserved separately.
    #[must_use]
    pub fn is_covered_by(&self, balance: u128) -> bool {
        balance >= self.value
    }
}

/// Outcome of the most recently completed transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    /// Transaction hash.
    pub tx_hash: TxHash,
    /// Gas consumed.
    pub gas_used: u64,
    /// `gas_used * gas_price`, in decimal units.
    pub gas_cost: NativeAmount,
    /// Block that included the transaction, if reported.
    pub block_number: Option<u64>,
    /// When the receipt was read back.
    pub completed_at: DateTime<Utc>,
}

impl TransactionResult {
    /// Creates a result, computing the gas cost from `gas_used` and `gas_price`.
    ///
    /// # Errors
    ///
    /// Returns an [`AmountError`](crate::domain::value_objects::AmountError)
    /// if the cost does not fit a decimal amount.
    pub fn new(
        tx_hash: TxHash,
        gas_used: u64,
        gas_price: u64,
        decimals: u32,
        block_number: Option<u64>,
    ) -> AmountResult<Self> {
        let cost_units = u128::from(gas_used) * u128::from(gas_price);
        Ok(Self {
            tx_hash,
            gas_used,
            gas_cost: NativeAmount::from_base_units(cost_units, decimals)?,
            block_number,
            completed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ethers::types::H256;

    fn intent(amount: &str) -> TransferIntent {
        TransferIntent::new(
            Address::repeat_byte(1),
            Address::repeat_byte(2),
            amount.parse().unwrap(),
            18,
            ChainId::ONEFINITY_TESTNET,
        )
        .unwrap()
    }

    #[test]
    fn intent_converts_amount() {
        let intent = intent("0.15");
        assert_eq!(intent.value(), 150_000_000_000_000_000);
        assert_eq!(intent.chain_id(), ChainId::ONEFINITY_TESTNET);
    }

    #[test]
    fn half_unit_covers_transfer() {
        let intent = intent("0.15");
        assert!(intent.is_covered_by(500_000_000_000_000_000));
        assert!(intent.is_covered_by(150_000_000_000_000_000));
    }

    #[test]
    fn tenth_unit_does_not_cover_transfer() {
        let intent = intent("0.15");
        assert!(!intent.is_covered_by(100_000_000_000_000_000));
    }

    #[test]
    fn gas_cost_is_used_times_price() {
        let result =
            TransactionResult::new(TxHash::new(H256::zero()), 21_000, 1_000_000_000, 18, Some(7))
                .unwrap();
        assert_eq!(result.gas_cost.to_string(), "0.000021");
        assert_eq!(result.block_number, Some(7));
    }
}
