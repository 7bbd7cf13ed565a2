//! # Types
//!
//! Plain value types shared by the decoders, the iterators, and the agent.

pub mod address;
pub mod frame;
pub mod model;

// Re-export all public types
pub use address::Address;
pub use frame::FrameInfo;
pub use model::{DataModel, SymbolInfo};
