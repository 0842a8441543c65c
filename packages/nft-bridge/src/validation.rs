//! Bridging eligibility policy

use chrono::{DateTime, Duration, Utc};
use std::fmt;

use crate::index::CollectionStats;

/// Limits a collection must satisfy before it is bridged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationPolicy {
    pub max_total_nfts: u64,
    pub max_owners: u64,
    /// Reject collections without a sale inside `recent_sale_window`
    pub require_recent_sale: bool,
    pub recent_sale_window: Duration,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            max_total_nfts: 11_000,
            max_owners: 11_000,
            require_recent_sale: false,
            recent_sale_window: Duration::days(182),
        }
    }
}

/// The first check a collection failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    NotVerified,
    TooManyNfts { total: u64, max: u64 },
    TooManyOwners { owners: u64, max: u64 },
    NoRecentSale { last_sale: Option<u64> },
}

impl ValidationFailure {
    /// Short machine-friendly name of the failed metric
    pub fn metric(&self) -> &'static str {
        match self {
            ValidationFailure::NotVerified => "verified",
            ValidationFailure::TooManyNfts { .. } => "totalNFTs",
            ValidationFailure::TooManyOwners { .. } => "numOwners",
            ValidationFailure::NoRecentSale { .. } => "timestampLastSale",
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationFailure::NotVerified => write!(f, "collection not verified"),
            ValidationFailure::TooManyNfts { total, max } => {
                write!(f, "too many NFTs ({} > {})", total, max)
            }
            ValidationFailure::TooManyOwners { owners, max } => {
                write!(f, "too many owners ({} > {})", owners, max)
            }
            ValidationFailure::NoRecentSale { .. } => {
                write!(f, "no sale in the last 6 months")
            }
        }
    }
}

impl ValidationPolicy {
    /// Check `stats` against the policy, returning the first failure
    pub fn validate(&self, stats: &CollectionStats, now: DateTime<Utc>) -> Result<(), ValidationFailure> {
        if !stats.verified {
            return Err(ValidationFailure::NotVerified);
        }

        let counts = &stats.stats;
        if counts.total_nfts > self.max_total_nfts {
            return Err(ValidationFailure::TooManyNfts {
                total: counts.total_nfts,
                max: self.max_total_nfts,
            });
        }

        if counts.num_owners > self.max_owners {
            return Err(ValidationFailure::TooManyOwners {
                owners: counts.num_owners,
                max: self.max_owners,
            });
        }

        if self.require_recent_sale {
            let cutoff = (now - self.recent_sale_window).timestamp();
            let recent = counts
                .timestamp_last_sale
                .map(|ts| ts as i64 >= cutoff)
                .unwrap_or(false);
            if !recent {
                return Err(ValidationFailure::NoRecentSale {
                    last_sale: counts.timestamp_last_sale,
                });
            }
        }

        Ok(())
    }
}
