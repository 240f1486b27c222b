pub mod claim_archives;
pub mod claim_records;
pub mod users;

pub mod prelude {
    pub use super::claim_archives::Entity as ClaimArchives;
    pub use super::claim_records::Entity as ClaimRecords;
    pub use super::users::Entity as Users;
}
