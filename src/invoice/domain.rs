//! The invoice model and the file name rules for the archive.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, database_id::InvoiceID};

/// A file name that is safe to use directly inside the storage root.
///
/// Path separators become spaces, runs of whitespace become `_`, anything other
/// than ASCII letters, digits, `_`, `.` and `-` is dropped, and leading or
/// trailing `.` and `_` are stripped. For example, `../../etc/passwd` becomes
/// `etc_passwd`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileName(String);

impl FileName {
    /// Sanitize `raw_file_name`.
    ///
    /// # Errors
    /// Returns [Error::EmptyFileName] if nothing usable is left.
    pub fn new(raw_file_name: &str) -> Result<Self, Error> {
        let joined = raw_file_name
            .replace(['/', '\\'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_");

        let kept = joined
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
            .collect::<String>();

        let file_name = kept.trim_matches(['.', '_']);

        if file_name.is_empty() {
            return Err(Error::EmptyFileName);
        }

        Ok(Self(file_name.to_owned()))
    }

    /// Wrap a file name that was read back from the database.
    pub fn new_unchecked(file_name: &str) -> Self {
        Self(file_name.to_owned())
    }
}

impl AsRef<str> for FileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for FileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// An uploaded invoice: a file in the storage root plus its database record.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub id: InvoiceID,
    /// The sanitized name the file is stored and downloaded under.
    pub file_name: FileName,
    /// Where the file was written.
    pub file_path: String,
    /// The local date the file was uploaded.
    pub upload_date: Date,
}

#[cfg(test)]
mod file_name_tests {
    use crate::Error;

    use super::FileName;

    #[track_caller]
    fn assert_sanitized(raw: &str, want: &str) {
        let got = FileName::new(raw).unwrap();

        assert_eq!(got.as_ref(), want, "sanitizing {raw:?}");
    }

    #[test]
    fn keeps_safe_names() {
        assert_sanitized("invoice-2024_01.pdf", "invoice-2024_01.pdf");
    }

    #[test]
    fn strips_path_traversal() {
        assert_sanitized("../../etc/passwd", "etc_passwd");
        assert_sanitized("..\\..\\windows\\system.ini", "windows_system.ini");
        assert_sanitized("/var/www/index.html", "var_www_index.html");
    }

    #[test]
    fn joins_whitespace_with_underscores() {
        assert_sanitized("My  Invoice\tMarch.pdf", "My_Invoice_March.pdf");
    }

    #[test]
    fn drops_unsafe_characters() {
        assert_sanitized("in<voice>|2024?.pdf", "invoice2024.pdf");
        assert_sanitized("résumé.pdf", "rsum.pdf");
    }

    #[test]
    fn strips_leading_and_trailing_dots_and_underscores() {
        assert_sanitized("._.hidden_.", "hidden");
    }

    #[test]
    fn rejects_names_with_nothing_left() {
        for raw in ["", "   ", "..", "/", "***"] {
            assert_eq!(FileName::new(raw), Err(Error::EmptyFileName), "sanitizing {raw:?}");
        }
    }

    #[test]
    fn sanitized_names_are_stable() {
        let once = FileName::new("../a b/c.pdf").unwrap();
        let twice = FileName::new(once.as_ref()).unwrap();

        assert_eq!(once, twice);
    }
}
