use alloy::consensus::TxEnvelope;
use alloy::consensus::transaction::SignerRecoverable;
use alloy_primitives::{Address, B256, U256};
use anyhow::Result;
use std::fmt;

/// A fetched block, reduced to what the scanner needs.
#[derive(Debug, Clone)]
pub struct Block<T> {
    pub height: u64,
    pub transactions: Vec<T>,
}

/// Read access to a signed transaction, including recovery of its sender
/// from the signature and chain id.
pub trait SignedTransaction {
    fn recover_sender(&self) -> Result<Address>;
    /// `None` for contract creation.
    fn recipient(&self) -> Option<Address>;
    fn amount(&self) -> U256;
    fn gas(&self) -> u64;
    fn transaction_hash(&self) -> B256;
}

impl SignedTransaction for TxEnvelope {
    fn recover_sender(&self) -> Result<Address> {
        SignerRecoverable::recover_signer(self)
            .map_err(|e| anyhow::anyhow!("Failed to recover sender: {}", e))
    }

    fn recipient(&self) -> Option<Address> {
        alloy::consensus::Transaction::to(self)
    }

    fn amount(&self) -> U256 {
        alloy::consensus::Transaction::value(self)
    }

    fn gas(&self) -> u64 {
        alloy::consensus::Transaction::gas_limit(self)
    }

    fn transaction_hash(&self) -> B256 {
        *self.tx_hash()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
    /// Both ends of the transfer are watched addresses.
    Internal,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Outgoing => write!(f, "OUTGOING 📤"),
            Direction::Incoming => write!(f, "INCOMING 📥"),
            Direction::Internal => write!(f, "INTERNAL 🔁"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    NotMine,
    Mine { sender: Address, direction: Direction },
}

impl MatchResult {
    pub fn is_mine(&self) -> bool {
        matches!(self, MatchResult::Mine { .. })
    }
}
