// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wikilink target rewriting
//!
//! A wikilink is `[[target]]`, optionally followed inside the brackets by
//! `#heading`, `^blockref` and/or `|alias`, and optionally prefixed with `!`
//! for an embed. Renaming rewrites the target segment only; everything else
//! in the link is copied through byte-for-byte.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};
use std::sync::LazyLock;

// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static WIKILINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\[\]\r\n]+)\]\]").expect("constant regex pattern is valid"));

/// Markdown note extension
pub const NOTE_EXTENSION: &str = "md";

/// The two spellings a wikilink may use to point at a note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRef {
    /// File name without extension (`A` for `Projects/A.md`)
    pub name: String,
    /// Vault-relative path without extension, `/`-separated (`Projects/A`)
    pub stem: String,
}

impl NoteRef {
    /// A reference known only by its bare name
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            stem: name.clone(),
            name,
        }
    }

    /// Derive the reference for a vault-relative note path.
    ///
    /// Returns `None` unless the path ends in a `.md` file name.
    pub fn from_path(rel: &Path) -> Option<Self> {
        let ext = rel.extension()?.to_str()?;
        if !ext.eq_ignore_ascii_case(NOTE_EXTENSION) {
            return None;
        }
        let name = rel.file_stem()?.to_str()?.to_string();
        let mut parts = Vec::new();
        for component in rel.parent()?.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_str()?.to_string()),
                Component::CurDir => {}
                _ => return None,
            }
        }
        parts.push(name.clone());
        Some(Self {
            name,
            stem: parts.join("/"),
        })
    }

    /// Number of wikilinks in `content` aimed at this note
    pub fn count_links(&self, content: &str) -> usize {
        LinkRename::new(self.clone(), self.clone()).count(content)
    }
}

/// Outcome of rewriting one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub content: String,
    pub replaced: usize,
}

impl Rewrite {
    pub fn changed(&self) -> bool {
        self.replaced > 0
    }
}

/// Rewrite rule mapping links aimed at `old` onto `new`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRename {
    pub old: NoteRef,
    pub new: NoteRef,
}

impl LinkRename {
    pub fn new(old: NoteRef, new: NoteRef) -> Self {
        Self { old, new }
    }

    /// Name-only rename, e.g. `LinkRename::by_name("Old", "New")`
    pub fn by_name(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self::new(NoteRef::named(old), NoteRef::named(new))
    }

    /// Rewrite every wikilink whose target points at the old note
    pub fn rewrite(&self, content: &str) -> Rewrite {
        let mut out = String::with_capacity(content.len());
        let mut last = 0;
        let mut replaced = 0;

        for caps in WIKILINK.captures_iter(content) {
            let Some(inner) = caps.get(1) else {
                continue;
            };
            let (target, _) = split_target(inner.as_str());
            let Some(new_target) = self.replacement_for(target) else {
                continue;
            };

            // The target always starts at the beginning of the inner text
            let target_start = inner.start();
            let target_end = target_start + target.len();

            out.push_str(&content[last..target_start]);
            out.push_str(leading_ws(target));
            out.push_str(&new_target);
            out.push_str(trailing_ws(target));
            last = target_end;
            replaced += 1;
        }

        out.push_str(&content[last..]);
        Rewrite {
            content: out,
            replaced,
        }
    }

    /// Count links aimed at the old note without rewriting
    pub fn count(&self, content: &str) -> usize {
        WIKILINK
            .captures_iter(content)
            .filter_map(|caps| caps.get(1))
            .filter(|inner| {
                let (target, _) = split_target(inner.as_str());
                self.replacement_for(target).is_some()
            })
            .count()
    }

    /// Replacement for a raw target segment, preserving the spelling used
    fn replacement_for(&self, target: &str) -> Option<String> {
        let trimmed = target.trim();
        if trimmed.is_empty() {
            return None;
        }
        let md_suffix = format!(".{}", NOTE_EXTENSION);
        let spellings = [
            (format!("{}{}", self.old.stem, md_suffix), format!("{}{}", self.new.stem, md_suffix)),
            (self.old.stem.clone(), self.new.stem.clone()),
            (format!("{}{}", self.old.name, md_suffix), format!("{}{}", self.new.name, md_suffix)),
            (self.old.name.clone(), self.new.name.clone()),
        ];
        let lowered = trimmed.to_lowercase();
        spellings
            .into_iter()
            .find(|(old, _)| old.to_lowercase() == lowered)
            .map(|(_, new)| new)
    }
}

/// Split the inner text of a link into (target, rest).
///
/// The target ends at the first `#`, `^` or `|`. A table-escaped pipe (`\|`)
/// also ends it; the backslash stays with the rest.
fn split_target(inner: &str) -> (&str, &str) {
    let mut end = inner.find(['#', '^', '|']).unwrap_or(inner.len());
    if inner[end..].starts_with('|') && inner[..end].ends_with('\\') {
        end -= 1;
    }
    inner.split_at(end)
}

fn leading_ws(s: &str) -> &str {
    &s[..s.len() - s.trim_start().len()]
}

fn trailing_ws(s: &str) -> &str {
    &s[s.trim_end().len()..]
}

#[cfg(test)]
#[path = "link_tests.rs"]
mod tests;
