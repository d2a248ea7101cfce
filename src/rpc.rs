use crate::models::{Block, SignedTransaction};
use alloy::consensus::TxEnvelope;
use alloy::providers::fillers::FillProvider;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::BlockNumberOrTag;
use anyhow::Result;
use regex::Regex;
use std::future::Future;
use std::sync::{Arc, LazyLock};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, warn};

type AlloyFullProvider = FillProvider<
    alloy::providers::fillers::JoinFill<
        alloy::providers::Identity,
        alloy::providers::fillers::JoinFill<
            alloy::providers::fillers::GasFiller,
            alloy::providers::fillers::JoinFill<
                alloy::providers::fillers::BlobGasFiller,
                alloy::providers::fillers::JoinFill<
                    alloy::providers::fillers::NonceFiller,
                    alloy::providers::fillers::ChainIdFiller,
                >,
            >,
        >,
    >,
    alloy::providers::RootProvider,
>;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120); // 2 minutes timeout per request
const CONNECT_ATTEMPTS: usize = 3;

static UNSUPPORTED_TX_TYPE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)transaction type not supported|unsupported transaction type",
        r"|unknown variant|did not match any variant",
    ))
    .ok()
});

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transaction type not supported")]
    UnsupportedTransactionType,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Read access to a chain: the current tip and full blocks by height.
pub trait ChainClient {
    type Transaction: SignedTransaction;

    fn latest_height(&self) -> impl Future<Output = Result<u64>>;

    fn block(
        &self,
        height: u64,
    ) -> impl Future<Output = Result<Block<Self::Transaction>, FetchError>>;
}

#[derive(Clone)]
pub struct RpcClient {
    providers: Vec<AlloyFullProvider>,
    urls: Vec<String>,
    current_provider: Arc<AtomicUsize>,
    chain_id: u64,
}

impl RpcClient {
    /// Builds one provider per URL and confirms the endpoint answers by
    /// reading its chain id.
    pub async fn connect(rpc_urls: &[String]) -> Result<Self> {
        if rpc_urls.is_empty() {
            return Err(anyhow::anyhow!("At least one RPC URL must be provided"));
        }

        let mut providers = Vec::new();
        for url in rpc_urls {
            let parsed_url = url
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid RPC URL: {}", redact_url(url)))?;
            let provider: AlloyFullProvider = ProviderBuilder::new().connect_http(parsed_url);
            providers.push(provider);
        }

        let mut client = RpcClient {
            providers,
            urls: rpc_urls.to_vec(),
            current_provider: Arc::new(AtomicUsize::new(0)),
            chain_id: 0,
        };
        client.chain_id = client.fetch_chain_id().await?;

        Ok(client)
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn get_provider(&self) -> &AlloyFullProvider {
        let index = self.current_provider.load(Ordering::Relaxed) % self.providers.len();
        &self.providers[index]
    }

    pub fn get_current_url(&self) -> &str {
        let index = self.current_provider.load(Ordering::Relaxed) % self.urls.len();
        &self.urls[index]
    }

    pub fn rotate_provider(&self) {
        let current = self.current_provider.load(Ordering::Relaxed);
        let next = (current + 1) % self.providers.len();
        self.current_provider.store(next, Ordering::Relaxed);

        if self.providers.len() > 1 {
            debug!("Rotating to RPC provider #{}", next);
        }
    }

    fn get_retry_strategy(&self) -> impl Iterator<Item = Duration> {
        ExponentialBackoff::from_millis(100)
            .factor(2)
            .max_delay(Duration::from_secs(10))
            .map(jitter)
            .take(CONNECT_ATTEMPTS)
    }

    fn handle_error(&self, error_str: &str) {
        warn!(
            "RPC error on {}: {}, rotating provider",
            redact_url(self.get_current_url()),
            error_str
        );
        self.rotate_provider();
    }

    fn handle_timeout(&self) -> anyhow::Error {
        warn!(
            "Request timeout after {} seconds on {}, rotating provider",
            REQUEST_TIMEOUT.as_secs(),
            redact_url(self.get_current_url())
        );
        self.rotate_provider();
        anyhow::anyhow!("Request timeout after {} seconds", REQUEST_TIMEOUT.as_secs())
    }

    async fn fetch_chain_id(&self) -> Result<u64> {
        let client = self.clone();
        Retry::spawn(self.get_retry_strategy(), move || {
            let client = client.clone();
            async move {
                let provider = client.get_provider();
                match timeout(REQUEST_TIMEOUT, provider.get_chain_id()).await {
                    Ok(Ok(chain_id)) => Ok(chain_id),
                    Ok(Err(e)) => {
                        client.handle_error(&e.to_string());
                        Err(anyhow::anyhow!("{}", e))
                    }
                    Err(_) => Err(client.handle_timeout()),
                }
            }
        })
        .await
    }
}

impl ChainClient for RpcClient {
    type Transaction = TxEnvelope;

    async fn latest_height(&self) -> Result<u64> {
        let provider = self.get_provider();
        match timeout(REQUEST_TIMEOUT, provider.get_block_number()).await {
            Ok(Ok(block_number)) => Ok(block_number),
            Ok(Err(e)) => {
                self.handle_error(&e.to_string());
                Err(anyhow::anyhow!("{}", e))
            }
            Err(_) => Err(self.handle_timeout()),
        }
    }

    async fn block(&self, height: u64) -> Result<Block<TxEnvelope>, FetchError> {
        let provider = self.get_provider();
        let future = provider
            .get_block_by_number(BlockNumberOrTag::Number(height))
            .full();

        let block = match timeout(REQUEST_TIMEOUT, future).await {
            Ok(Ok(Some(block))) => block,
            Ok(Ok(None)) => {
                return Err(FetchError::Other(anyhow::anyhow!("Block #{} not found", height)));
            }
            Ok(Err(e)) => {
                let error_str = e.to_string();
                if is_unsupported_transaction_type(&error_str) {
                    return Err(FetchError::UnsupportedTransactionType);
                }
                self.handle_error(&error_str);
                return Err(FetchError::Other(anyhow::anyhow!("{}", e)));
            }
            Err(_) => return Err(FetchError::Other(self.handle_timeout())),
        };

        let transactions = block
            .transactions
            .into_transactions()
            .map(|tx| tx.inner.into_inner())
            .collect();

        Ok(Block {
            height,
            transactions,
        })
    }
}

/// Recognises the errors produced when a block contains a transaction
/// envelope this client cannot decode.
pub fn is_unsupported_transaction_type(error_str: &str) -> bool {
    UNSUPPORTED_TX_TYPE
        .as_ref()
        .is_some_and(|re| re.is_match(error_str))
}

/// Strips path, query and credentials from an endpoint URL so API keys do not
/// end up in log records.
pub fn redact_url(url: &str) -> String {
    let (scheme, rest) = match url.split_once("://") {
        Some((scheme, rest)) => (Some(scheme), rest),
        None => (None, url),
    };

    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host = authority.rsplit('@').next().unwrap_or(authority);

    match scheme {
        Some(scheme) => format!("{}://{}", scheme, host),
        None => host.to_string(),
    }
}
