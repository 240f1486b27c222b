use board_core::BoardError;
use sea_orm::DbErr;
use tracing::debug;

// SQLite reports write contention through these messages
const CONTENTION_MARKERS: [&str; 3] = ["database is locked", "database table is locked", "busy"];

/// Lock contention becomes a retryable `Conflict`; everything else is `Storage`.
pub fn map_db_error(error: DbErr) -> BoardError {
    let message = error.to_string();
    debug!("database operation failed: {}", message);

    let lowered = message.to_lowercase();
    if CONTENTION_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
    {
        BoardError::Conflict(message)
    } else {
        BoardError::Storage(message)
    }
}

pub(crate) trait DbResultExt<T> {
    fn or_board_error(self) -> Result<T, BoardError>;
}

impl<T> DbResultExt<T> for Result<T, DbErr> {
    fn or_board_error(self) -> Result<T, BoardError> {
        self.map_err(map_db_error)
    }
}
