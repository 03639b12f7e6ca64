use std::collections::BTreeSet;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::util::non_blank;

/// Label scoping which videos and live sessions a student can see.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct Subject(String);

impl Subject {
    /// Trimmed label, or `None` when blank.
    pub fn parse(label: impl AsRef<str>) -> Option<Subject> {
        non_blank(label).map(Subject)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Subject {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub type Subjects = BTreeSet<Subject>;

/// Normalizes raw labels into a subject set, dropping blanks and duplicates.
pub fn subjects_from<I, S>(labels: I) -> Subjects
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    labels.into_iter().filter_map(Subject::parse).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_duplicate_labels_are_dropped() {
        let subjects = subjects_from(["math", " math ", "", "  ", "physics"]);

        let labels: Vec<&str> = subjects.iter().map(Subject::as_str).collect();
        assert_eq!(labels, vec!["math", "physics"]);
    }

    #[test]
    fn subjects_serialize_as_plain_strings() {
        let subjects = subjects_from(["bio"]);
        assert_eq!(serde_json::to_string(&subjects).unwrap(), "[\"bio\"]");
    }
}
