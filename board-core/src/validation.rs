use crate::{BoardError, BoardResult};

pub const MAX_NAME_LENGTH: usize = 64;

/// Trim a requested display name and reject it if nothing is left or it is too long.
pub fn normalize_user_name(name: &str) -> BoardResult<String> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(BoardError::validation("User name must not be empty"));
    }

    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(BoardError::validation(format!(
            "User name must be at most {} characters",
            MAX_NAME_LENGTH
        )));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_blank_names_rejected() {
        assert!(matches!(
            normalize_user_name(""),
            Err(BoardError::Validation(_))
        ));
        assert!(matches!(
            normalize_user_name("   "),
            Err(BoardError::Validation(_))
        ));
        assert!(matches!(
            normalize_user_name("\t\n"),
            Err(BoardError::Validation(_))
        ));
    }

    #[test]
    fn test_name_is_trimmed() {
        assert_eq!(normalize_user_name("  Alice ").unwrap(), "Alice");
    }

    #[test]
    fn test_length_limit_counts_characters() {
        let at_limit = "é".repeat(MAX_NAME_LENGTH);
        assert_eq!(normalize_user_name(&at_limit).unwrap(), at_limit);

        let too_long = "a".repeat(MAX_NAME_LENGTH + 1);
        assert!(matches!(
            normalize_user_name(&too_long),
            Err(BoardError::Validation(_))
        ));
    }
}
