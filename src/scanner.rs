use crate::amount::format_amount;
use crate::classifier::{WatchList, classify};
use crate::emitter::Emitter;
use crate::models::{Direction, MatchResult, SignedTransaction};
use crate::rpc::{ChainClient, FetchError};
use alloy_primitives::Address;
use std::ops::RangeInclusive;
use tracing::debug;

/// Fetches every block in `heights` in ascending order and emits a record
/// for each watched transaction. Returns the number of matches.
///
/// Blocks that cannot be fetched are skipped for good; only failures other
/// than an unsupported transaction type are reported.
pub async fn scan_range<C: ChainClient, E: Emitter>(
    client: &C,
    heights: RangeInclusive<u64>,
    watch_list: &WatchList,
    currency_symbol: &str,
    emitter: &mut E,
) -> usize {
    let mut matches = 0;

    for height in heights {
        let block = match client.block(height).await {
            Ok(block) => block,
            Err(FetchError::UnsupportedTransactionType) => {
                debug!("Skipping block {}: transaction type not supported", height);
                continue;
            }
            Err(FetchError::Other(e)) => {
                emitter.emit(&format!("❌ Failed to fetch block #{}: {}", height, e));
                continue;
            }
        };

        debug!(
            "Fetched block {} with {} transactions",
            height,
            block.transactions.len()
        );

        for tx in &block.transactions {
            if let MatchResult::Mine { sender, direction } = classify(tx, watch_list) {
                matches += 1;
                for line in render_transaction(height, tx, sender, direction, currency_symbol) {
                    emitter.emit(&line);
                }
            }
        }
    }

    matches
}

/// The record lines describing one matched transaction.
pub fn render_transaction<T: SignedTransaction>(
    height: u64,
    tx: &T,
    sender: Address,
    direction: Direction,
    currency_symbol: &str,
) -> Vec<String> {
    let recipient = tx
        .recipient()
        .map(|to| to.to_string())
        .unwrap_or_else(|| "contract creation".to_string());

    vec![
        format!("🎯 MY TRANSACTION [{}]", direction),
        format!("   ├─ Block: #{}", height),
        format!("   ├─ From: {}", sender),
        format!("   ├─ To: {}", recipient),
        format!(
            "   ├─ Amount: {} {}",
            format_amount(tx.amount()),
            currency_symbol
        ),
        format!("   ├─ Gas: {}", tx.gas()),
        format!("   └─ Hash: {}", tx.transaction_hash()),
    ]
}

/// The per-cycle summary record for a scanned range.
pub fn summary_line(heights: &RangeInclusive<u64>, matches: usize) -> String {
    if matches > 0 {
        format!(
            "📊 Found {} of my transactions in blocks #{}-#{}",
            matches,
            heights.start(),
            heights.end()
        )
    } else {
        format!(
            "👀 New blocks #{}-#{} (no transactions of mine)",
            heights.start(),
            heights.end()
        )
    }
}
