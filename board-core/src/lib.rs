pub mod board;
pub mod claim;
pub mod compaction;
pub mod error;
pub mod memory;
pub mod ranking;
pub mod store;
pub mod validation;

// Re-export main components
pub use board::*;
pub use claim::*;
pub use compaction::*;
pub use error::*;
pub use memory::*;
pub use ranking::*;
pub use store::*;
