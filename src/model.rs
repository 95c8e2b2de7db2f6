// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Documentation model of a keyword library.
//!
//! Populated by an external documentation tool. This is a pure data layer
//! with no data flow into the transcript [`Writer`]s.
//!
//! [`Writer`]: crate::Writer

use std::cmp::Ordering;

use itertools::Itertools as _;
use once_cell::sync::OnceCell;

/// Documentation of a whole keyword library.
#[derive(Clone, Debug, Default)]
pub struct LibraryDoc {
    /// Name of the library.
    pub name: String,

    /// Version of the library.
    pub version: String,

    /// Introduction of the library.
    pub doc: String,

    /// Documented keywords, kept ordered by [`compare_by_name()`].
    keywords: Vec<KeywordDoc>,
}

impl LibraryDoc {
    /// Creates a new [`LibraryDoc`] without any keywords.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        doc: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            doc: doc.into(),
            keywords: Vec::new(),
        }
    }

    /// Replaces the documented keywords, restoring the name ordering.
    pub fn set_keywords(
        &mut self,
        keywords: impl IntoIterator<Item = KeywordDoc>,
    ) {
        self.keywords = keywords.into_iter().collect();
        self.keywords.sort_by(compare_by_name);
    }

    /// Documented keywords, ordered case-insensitively by name.
    #[must_use]
    pub fn keywords(&self) -> &[KeywordDoc] {
        &self.keywords
    }

    /// Deduplicated union of all the keywords' tags, sorted.
    #[must_use]
    pub fn all_tags(&self) -> Vec<&str> {
        self.keywords
            .iter()
            .flat_map(|kw| kw.tags.iter().map(String::as_str))
            .unique()
            .sorted()
            .collect()
    }
}

/// Orders [`KeywordDoc`]s by their case-insensitive names.
///
/// Attached explicitly to every ordering operation instead of being an
/// [`Ord`] impl, so the derived-key ordering stays visible at the call site.
#[must_use]
pub fn compare_by_name(a: &KeywordDoc, b: &KeywordDoc) -> Ordering {
    a.name.to_lowercase().cmp(&b.name.to_lowercase())
}

/// Documentation of a single keyword.
#[derive(Clone, Debug, Default)]
pub struct KeywordDoc {
    /// Name of the keyword.
    pub name: String,

    /// Signature of the keyword, one rendered argument per entry.
    pub args: Vec<String>,

    /// Full documentation of the keyword.
    pub doc: String,

    /// Tags of the keyword.
    pub tags: Vec<String>,

    /// Short description of the keyword.
    short_doc: ShortDoc,
}

/// Short description of a keyword: either a stored override, or a computation
/// deferred until first access, evaluated once and cached.
///
/// Once evaluated, it's never recomputed, even if the documentation it was
/// derived from changes.
#[derive(Clone, Debug)]
enum ShortDoc {
    /// Explicitly set description.
    Overridden(String),

    /// Description derived from [`KeywordDoc::doc`] on first access.
    Deferred(OnceCell<String>),
}

impl Default for ShortDoc {
    fn default() -> Self {
        Self::Deferred(OnceCell::new())
    }
}

impl KeywordDoc {
    /// Creates a new [`KeywordDoc`] out of the given name and documentation.
    #[must_use]
    pub fn new(name: impl Into<String>, doc: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: doc.into(),
            ..Self::default()
        }
    }

    /// Short description of this keyword.
    ///
    /// Unless overridden with [`KeywordDoc::set_short_doc()`], it's the first
    /// paragraph of [`KeywordDoc::doc`] with its lines joined by spaces,
    /// computed on first access.
    #[must_use]
    pub fn short_doc(&self) -> &str {
        match &self.short_doc {
            ShortDoc::Overridden(short) => short,
            ShortDoc::Deferred(cell) => {
                cell.get_or_init(|| first_paragraph(&self.doc))
            }
        }
    }

    /// Overrides the derived short description.
    pub fn set_short_doc(&mut self, short: impl Into<String>) {
        self.short_doc = ShortDoc::Overridden(short.into());
    }

    /// Indicates whether this keyword is marked as deprecated in its
    /// documentation.
    #[must_use]
    pub fn is_deprecated(&self) -> bool {
        self.doc.starts_with("*DEPRECATED") && self.doc[1..].contains('*')
    }
}

/// First paragraph of the given documentation, with its lines joined by
/// spaces.
fn first_paragraph(doc: &str) -> String {
    doc.trim_start()
        .lines()
        .map(str::trim)
        .take_while(|line| !line.is_empty())
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_keywords_case_insensitively() {
        let mut lib = LibraryDoc::new("Lib", "1.0", "");
        lib.set_keywords([
            KeywordDoc::new("open browser", ""),
            KeywordDoc::new("Close Browser", ""),
            KeywordDoc::new("Click Link", ""),
        ]);

        let names =
            lib.keywords().iter().map(|kw| kw.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["Click Link", "Close Browser", "open browser"]);
    }

    #[test]
    fn short_doc_is_first_paragraph_joined() {
        let kw = KeywordDoc::new(
            "K",
            "Opens a new browser\nwindow.\n\nMore details here.",
        );
        assert_eq!(kw.short_doc(), "Opens a new browser window.");
    }

    #[test]
    fn short_doc_is_cached_after_first_access() {
        let mut kw = KeywordDoc::new("K", "Original.");
        assert_eq!(kw.short_doc(), "Original.");
        kw.doc = "Changed afterwards.".into();
        assert_eq!(kw.short_doc(), "Original.");
    }

    #[test]
    fn short_doc_override_wins() {
        let mut kw = KeywordDoc::new("K", "Derived would be this.");
        kw.set_short_doc("Explicit.");
        assert_eq!(kw.short_doc(), "Explicit.");
    }

    #[test]
    fn detects_deprecated_keywords() {
        assert!(KeywordDoc::new("K", "*DEPRECATED* Use `Other`.").is_deprecated());
        assert!(!KeywordDoc::new("K", "*DEPRECATED without closing").is_deprecated());
        assert!(!KeywordDoc::new("K", "Regular docs.").is_deprecated());
    }

    #[test]
    fn collects_deduplicated_sorted_tags() {
        let mut lib = LibraryDoc::new("Lib", "1.0", "");
        let mut a = KeywordDoc::new("A", "");
        a.tags = vec!["web".into(), "slow".into()];
        let mut b = KeywordDoc::new("B", "");
        b.tags = vec!["web".into(), "flaky".into()];
        lib.set_keywords([a, b]);

        assert_eq!(lib.all_tags(), ["flaky", "slow", "web"]);
    }
}
