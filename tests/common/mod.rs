#![allow(dead_code)]

use alloy_primitives::{Address, B256, U256};
use eth_tx_monitor::config::Config;
use eth_tx_monitor::emitter::Emitter;
use eth_tx_monitor::models::{Block, SignedTransaction};
use eth_tx_monitor::rpc::{ChainClient, FetchError};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone)]
pub struct MockTx {
    pub sender: Option<Address>,
    pub to: Option<Address>,
    pub value: U256,
    pub gas: u64,
    pub hash: B256,
}

impl MockTx {
    pub fn transfer(sender: Address, to: Address, value: u128) -> Self {
        MockTx {
            sender: Some(sender),
            to: Some(to),
            value: U256::from(value),
            gas: 21_000,
            hash: B256::repeat_byte(0x11),
        }
    }
}

impl SignedTransaction for MockTx {
    fn recover_sender(&self) -> anyhow::Result<Address> {
        self.sender.ok_or_else(|| anyhow::anyhow!("invalid signature"))
    }

    fn recipient(&self) -> Option<Address> {
        self.to
    }

    fn amount(&self) -> U256 {
        self.value
    }

    fn gas(&self) -> u64 {
        self.gas
    }

    fn transaction_hash(&self) -> B256 {
        self.hash
    }
}

pub enum Scripted {
    Transactions(Vec<MockTx>),
    Unsupported,
    Broken(&'static str),
}

/// A chain whose tip heights and blocks are scripted up front. Heights not
/// in `blocks` come back as empty blocks.
#[derive(Default)]
pub struct MockChain {
    heights: RefCell<VecDeque<Result<u64, &'static str>>>,
    last_height: Cell<Option<u64>>,
    blocks: HashMap<u64, Scripted>,
    fetched: RefCell<Vec<u64>>,
}

impl MockChain {
    pub fn with_heights(heights: impl IntoIterator<Item = Result<u64, &'static str>>) -> Self {
        MockChain {
            heights: RefCell::new(heights.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn with_block(mut self, height: u64, scripted: Scripted) -> Self {
        self.blocks.insert(height, scripted);
        self
    }

    pub fn fetched(&self) -> Vec<u64> {
        self.fetched.borrow().clone()
    }
}

impl ChainClient for MockChain {
    type Transaction = MockTx;

    async fn latest_height(&self) -> anyhow::Result<u64> {
        match self.heights.borrow_mut().pop_front() {
            Some(Ok(height)) => {
                self.last_height.set(Some(height));
                Ok(height)
            }
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => self
                .last_height
                .get()
                .ok_or_else(|| anyhow::anyhow!("no height scripted")),
        }
    }

    async fn block(&self, height: u64) -> Result<Block<MockTx>, FetchError> {
        self.fetched.borrow_mut().push(height);
        match self.blocks.get(&height) {
            Some(Scripted::Transactions(transactions)) => Ok(Block {
                height,
                transactions: transactions.clone(),
            }),
            Some(Scripted::Unsupported) => Err(FetchError::UnsupportedTransactionType),
            Some(Scripted::Broken(message)) => Err(FetchError::Other(anyhow::anyhow!(*message))),
            None => Ok(Block {
                height,
                transactions: Vec::new(),
            }),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryEmitter {
    pub lines: Vec<String>,
}

impl Emitter for MemoryEmitter {
    fn emit(&mut self, message: &str) {
        self.lines.push(message.to_string());
    }
}

pub fn test_config(addresses: &[Address], track_incoming: bool) -> Config {
    let watch = addresses
        .iter()
        .map(|address| address.to_string())
        .collect::<Vec<_>>()
        .join(",");

    let vars: HashMap<&str, String> = HashMap::from([
        ("JSON_RPC_URL", "https://rpc.example.org/v2/secret".to_string()),
        ("WATCH_ADDRESSES", watch),
        ("TRACK_INCOMING", track_incoming.to_string()),
        ("LOG_TO_FILE", "false".to_string()),
    ]);

    Config::from_lookup(|key| vars.get(key).cloned()).expect("valid test config")
}
