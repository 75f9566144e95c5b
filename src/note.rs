use chrono::{DateTime, Local};
use std::cmp::Ordering;
use std::time::SystemTime;
use uuid::Uuid;

/// Display format for modification times.
pub const TIME_FMT: &str = "%m/%d/%y %H:%M";
pub const PLACEHOLDER_PREFIX: &str = "unnamed_note_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRecord {
    pub key: String,
    pub name: Option<String>,
    pub modified: Option<String>,
}

impl NoteRecord {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into(), name: None, modified: None }
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub(crate) fn sort_key(&self) -> String {
        self.name().to_lowercase()
    }
}

/// Case-insensitive ordering used for the note list.
pub fn cmp_names(a: &NoteRecord, b: &NoteRecord) -> Ordering {
    a.sort_key().cmp(&b.sort_key())
}

pub fn modified_label(at: SystemTime) -> String {
    let local: DateTime<Local> = at.into();
    local.format(TIME_FMT).to_string()
}

/// `unnamed_note_` followed by 32 random hex digits.
pub fn placeholder_name() -> String {
    format!("{PLACEHOLDER_PREFIX}{}", Uuid::new_v4().simple())
}

pub fn is_placeholder(name: &str) -> bool {
    name.strip_prefix(PLACEHOLDER_PREFIX).is_some_and(|rest| {
        rest.len() == 32
            && rest.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn test_placeholder_shape() {
        let name = placeholder_name();
        assert!(is_placeholder(&name), "{name}");
        assert!(!is_placeholder("unnamed_note_xyz"));
        assert!(!is_placeholder("Groceries"));
        assert_ne!(placeholder_name(), placeholder_name());
    }

    #[test]
    fn test_modified_label_format() {
        let label = modified_label(SystemTime::now());
        assert!(NaiveDateTime::parse_from_str(&label, TIME_FMT).is_ok());
        assert_eq!(label.len(), "01/02/24 13:45".len());
    }

    #[test]
    fn test_cmp_names_ignores_case() {
        let mut a = NoteRecord::new("k1");
        a.name = Some("apple".into());
        let mut b = NoteRecord::new("k2");
        b.name = Some("Banana".into());
        assert_eq!(cmp_names(&a, &b), Ordering::Less);
        assert_eq!(NoteRecord::new("k3").name(), "");
    }
}
