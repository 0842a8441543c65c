//! EVM chain support
//!
//! ## Submodules
//!
//! - `contracts` - bindings using alloy sol! macro
//! - `source` - read-only client for original collections
//! - `target` - signing client for the bridge control and bridged tokens

pub mod contracts;
pub mod source;
pub mod target;

pub use source::EvmSourceChain;
pub use target::EvmTargetChain;
