use derive_more::{AsRef, Display};

#[derive(AsRef, Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(String);

impl Name {
    pub const MAX_LEN: usize = 64;

    pub fn new(name: &str) -> Result<Self, NameError> {
        let trimmed_name = name.trim();

        if trimmed_name.is_empty() {
            return Err(NameError::Empty);
        }

        let len = trimmed_name.len();

        if len > Self::MAX_LEN {
            return Err(NameError::TooLong(len));
        }

        Ok(Name(trimmed_name.to_string()))
    }

    /// Creates a name from arbitrary input by cutting it to the maximum length. Falls back to
    /// `fallback` if nothing remains.
    #[must_use]
    pub fn truncated(name: &str, fallback: &'static str) -> Self {
        let mut end = 0;
        for (idx, c) in name.trim().char_indices() {
            if idx + c.len_utf8() > Self::MAX_LEN {
                break;
            }
            end = idx + c.len_utf8();
        }
        Name::new(&name.trim()[..end]).unwrap_or_else(|_| Name(fallback.to_string()))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum NameError {
    #[error("Name must not be empty")]
    Empty,
    #[error("Name must be 64 characters or fewer ({0} > 64)")]
    TooLong(usize),
}
