//! Per-session conversation state: the transcript plus at most one pending
//! disambiguation. State lives for the session only and is never persisted.

use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Turn {
    User(String),
    Bot(String),
    /// A rendered invoice the UI should offer for download.
    Artifact(PathBuf),
}

/// An unresolved customer ambiguity. While one is pending the controller
/// accepts nothing but a selection; the raw input that raised it is retained
/// for re-extraction once the user picks a candidate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingSelection {
    pub candidates: Vec<String>,
    pub retained_input: String,
}

impl PendingSelection {
    /// Interpret user input as a selection: a 1-based index into the
    /// candidate list, or an exact (case-insensitive) candidate name.
    pub fn match_selection(&self, input: &str) -> Option<&str> {
        let trimmed = input.trim();

        if let Ok(index) = trimmed.parse::<usize>() {
            if (1..=self.candidates.len()).contains(&index) {
                return Some(&self.candidates[index - 1]);
            }
        }

        self.candidates
            .iter()
            .find(|candidate| candidate.eq_ignore_ascii_case(trimmed))
            .map(String::as_str)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Conversation {
    pub turns: Vec<Turn>,
    pub pending: Option<PendingSelection>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::User(text.into()));
    }

    pub fn push_bot(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::Bot(text.into()));
    }

    pub fn push_artifact(&mut self, path: PathBuf) {
        self.turns.push(Turn::Artifact(path));
    }

    pub fn is_awaiting_selection(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::PendingSelection;

    fn pending() -> PendingSelection {
        PendingSelection {
            candidates: vec!["Hrishita Sharma".to_string(), "Hrishita Rao".to_string()],
            retained_input: "2 strips of Augmentin for Hrishita".to_string(),
        }
    }

    #[test]
    fn selects_by_one_based_index() {
        assert_eq!(pending().match_selection("2"), Some("Hrishita Rao"));
        assert_eq!(pending().match_selection(" 1 "), Some("Hrishita Sharma"));
    }

    #[test]
    fn selects_by_exact_name_ignoring_case() {
        assert_eq!(pending().match_selection("hrishita rao"), Some("Hrishita Rao"));
    }

    #[test]
    fn rejects_out_of_range_and_unknown_input() {
        assert_eq!(pending().match_selection("0"), None);
        assert_eq!(pending().match_selection("3"), None);
        assert_eq!(pending().match_selection("Hrishita"), None);
        assert_eq!(pending().match_selection("never mind"), None);
    }
}
