use crate::models::{Direction, MatchResult, SignedTransaction};
use alloy_primitives::Address;

/// The addresses considered "mine", deduplicated in load order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchList {
    addresses: Vec<Address>,
    track_incoming: bool,
}

impl WatchList {
    pub fn new(addresses: impl IntoIterator<Item = Address>, track_incoming: bool) -> Self {
        let mut unique: Vec<Address> = Vec::new();
        for address in addresses {
            if !unique.contains(&address) {
                unique.push(address);
            }
        }

        WatchList {
            addresses: unique,
            track_incoming,
        }
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    pub fn tracks_incoming(&self) -> bool {
        self.track_incoming
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.addresses.contains(address)
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

/// Decides whether `tx` belongs to the watch list and in which direction.
///
/// A transaction whose sender cannot be recovered is never mine. The sender
/// match decides ownership; the recipient only refines the direction, or
/// makes the transaction incoming when the watch list tracks incoming
/// transfers.
pub fn classify<T: SignedTransaction>(tx: &T, watch_list: &WatchList) -> MatchResult {
    let Ok(sender) = tx.recover_sender() else {
        return MatchResult::NotMine;
    };

    let recipient_watched = tx
        .recipient()
        .is_some_and(|recipient| watch_list.contains(&recipient));

    let direction = match (watch_list.contains(&sender), recipient_watched) {
        (true, true) => Direction::Internal,
        (true, false) => Direction::Outgoing,
        (false, true) if watch_list.tracks_incoming() => Direction::Incoming,
        _ => return MatchResult::NotMine,
    };

    MatchResult::Mine { sender, direction }
}
