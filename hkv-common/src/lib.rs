// hkv-common - Shared types and wire vocabulary for HybridKV

pub mod clock;
pub mod error;
pub mod types;
pub mod wire;

// Re-export for convenience
pub use clock::*;
pub use error::*;
pub use types::*;
pub use wire::*;
