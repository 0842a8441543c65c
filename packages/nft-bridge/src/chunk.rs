//! Chunking helpers for batch transactions
//!
//! `chunk` splits any slice into bounded groups. `chunk_airdrop_units` groups
//! whole holders so the number of token ids per transaction stays within a
//! budget; a holder's token list is never split across two transactions.

use std::slice::Chunks;

use crate::types::AirdropUnit;

/// Contiguous slices of at most `n` items, in order. `n == 0` is treated as 1.
pub fn chunk<T>(items: &[T], n: usize) -> Chunks<'_, T> {
    items.chunks(n.max(1))
}

/// Group airdrop units so each group carries at most `max_tokens` token ids.
///
/// A unit that alone exceeds the budget is emitted as a single-unit group.
pub fn chunk_airdrop_units(units: &[AirdropUnit], max_tokens: usize) -> AirdropChunks<'_> {
    AirdropChunks {
        remaining: units,
        max_tokens,
    }
}

/// Lazy iterator returned by [`chunk_airdrop_units`]
#[derive(Debug, Clone)]
pub struct AirdropChunks<'a> {
    remaining: &'a [AirdropUnit],
    max_tokens: usize,
}

impl<'a> Iterator for AirdropChunks<'a> {
    type Item = &'a [AirdropUnit];

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.is_empty() {
            return None;
        }

        let mut total = 0usize;
        let mut take = 0usize;
        for unit in self.remaining {
            let count = unit.token_count();
            if total + count > self.max_tokens {
                break;
            }
            total += count;
            take += 1;
        }

        // Oversized head unit still has to go out on its own
        let take = take.max(1);

        let (group, rest) = self.remaining.split_at(take);
        self.remaining = rest;
        Some(group)
    }
}
