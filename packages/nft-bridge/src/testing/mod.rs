//! Testing Utilities Module
//!
//! In-memory stand-ins for the chain and index capabilities, so bridging
//! flows can be exercised without a node or the index API.
//!
//! ## Submodules
//!
//! - `chain` - `FakeSourceChain` / `FakeTargetChain` with recorded writes
//! - `index` - `FakeIndex` with paged holder records

pub mod chain;
pub mod index;

// Re-export commonly used items
pub use chain::*;
pub use index::*;
