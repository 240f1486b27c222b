pub mod claim;
pub mod errors;
pub mod messages;
pub mod user;

// Re-export all types
pub use claim::*;
pub use errors::*;
pub use messages::*;
pub use user::*;

pub type UserId = uuid::Uuid;
