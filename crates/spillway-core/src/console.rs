//! Operator interaction seam.
//!
//! The validator and assembler never touch stdin/stdout directly; they talk
//! to this trait so tests drive them with scripted fakes and the CLI
//! provides the real terminal implementation.

use crate::error::Result;
use crate::types::TransactionReview;

pub trait Console {
    /// A line worth keeping on screen.
    fn info(&mut self, line: &str);

    /// Transient status while a blocking chain call is in flight.
    fn progress(&mut self, message: &str);

    /// Full dump of the signed transaction, shown before the final prompt.
    fn review_transaction(&mut self, review: &TransactionReview);

    /// Ask the operator; `Ok(true)` only for an affirmative answer.
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// Affirmative answers are a case-insensitive `y` or `yes`; everything else
/// declines.
pub fn is_affirmative(input: &str) -> bool {
    matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::is_affirmative;

    #[test]
    fn accepts_y_and_yes_in_any_case() {
        for input in ["y", "Y", "yes", "YES", "Yes", " y \n"] {
            assert!(is_affirmative(input), "expected '{input}' to be accepted");
        }
    }

    #[test]
    fn rejects_everything_else() {
        for input in ["", "n", "no", "N", "yep", "true", "1", "ye s"] {
            assert!(!is_affirmative(input), "expected '{input}' to be rejected");
        }
    }
}
