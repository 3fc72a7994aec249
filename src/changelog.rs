//! Changelog parsing and the "Unreleased" section state transition.
//!
//! A changelog is a markdown document whose `## ` headings each open one
//! version entry, newest first:
//!
//! ```text
//! # Changelog
//!
//! ## [1.1.0] - Unreleased
//!
//! ...
//!
//! ## [1.0.0] - 05.03.2024
//! ```
//!
//! The topmost entry is the working entry. Stamping turns an unreleased
//! working entry into a dated release and can open a fresh unreleased entry
//! above it, so the document keeps exactly one unreleased section on top.
use chrono::NaiveDate;
use log::*;
use regex::Regex;
use std::{ops::Range, sync::LazyLock};

use crate::error::{ReleaseError, Result};

/// Marker a working entry title ends with until it is released.
pub const UNRELEASED_MARKER: &str = "Unreleased";
/// Body written under a freshly opened unreleased entry.
pub const PLACEHOLDER_BODY: &str = "...";
/// Date format used in release headings, e.g. `05.03.2024`.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

static HEADING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^##[ \t]+(?<title>.*?)[ \t\r]*$").unwrap()
});

static TITLE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[?(?<version>[^\]\s]+)\]?\s+-\s+(?<date>.+)$").unwrap()
});

/// One `## ` section of a changelog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEntry {
    /// Heading text without the leading `## `.
    pub title: String,
    /// Version named in the heading, if any.
    pub version: Option<String>,
    /// Release date, `None` for unreleased entries.
    pub date: Option<String>,
    /// Section text after the heading line, leading blank lines removed.
    pub body: String,
    /// Byte range of the heading text, `## ` included, line ending excluded.
    heading: Range<usize>,
}

impl VersionEntry {
    pub fn is_unreleased(&self) -> bool {
        self.title.ends_with(UNRELEASED_MARKER)
    }
}

/// Parse the ordered version entries of a raw changelog.
pub fn parse_entries(raw: &str) -> Vec<VersionEntry> {
    let headings = HEADING_REGEX.captures_iter(raw).collect::<Vec<_>>();
    let mut entries = vec![];

    for (index, captures) in headings.iter().enumerate() {
        let (Some(line), Some(title)) =
            (captures.get(0), captures.name("title"))
        else {
            continue;
        };

        let section_end = headings
            .get(index + 1)
            .and_then(|next| next.get(0))
            .map(|next| next.start())
            .unwrap_or(raw.len());

        let body_start = raw[line.end()..section_end]
            .strip_prefix('\n')
            .map(|_| line.end() + 1)
            .unwrap_or(line.end());

        let body = raw[body_start..section_end]
            .trim_start_matches(['\r', '\n'])
            .to_string();

        let title_end = title.end();
        let title = title.as_str().to_string();
        let (version, date) = split_title(&title);

        entries.push(VersionEntry {
            title,
            version,
            date,
            body,
            heading: line.start()..title_end,
        });
    }

    entries
}

fn split_title(title: &str) -> (Option<String>, Option<String>) {
    if title == UNRELEASED_MARKER {
        return (None, None);
    }

    match TITLE_REGEX.captures(title) {
        Some(caps) => {
            let version = caps.name("version").map(|m| m.as_str().to_string());
            let date = caps
                .name("date")
                .map(|m| m.as_str().to_string())
                .filter(|d| d != UNRELEASED_MARKER);
            (version, date)
        }
        None => (Some(title.to_string()), None),
    }
}

/// Options for [`stamp_and_advance`].
#[derive(Debug, Clone)]
pub struct StampOptions {
    /// Version written into the released heading.
    pub release_version: String,
    /// Version named in the new unreleased heading, if one is opened.
    pub next_version: Option<String>,
    /// Open a new unreleased entry above the released one.
    pub prepare_next_entry: bool,
    /// Release date written into the released heading.
    pub date: NaiveDate,
}

/// Result of [`stamp_and_advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StampOutcome {
    /// The working entry was released.
    Stamped {
        changelog: String,
        released_body: String,
    },
    /// The working entry was already released; nothing changed.
    Skipped { existing_body: String },
}

/// Release the topmost unreleased entry of `raw`.
///
/// Only the top heading line is rewritten to
/// `## [<release_version>] - <dd.mm.yyyy>`; its body is returned untouched.
/// A top entry that is not unreleased yields [`StampOutcome::Skipped`], so
/// stamping twice never double-stamps.
pub fn stamp_and_advance(
    raw: &str,
    opts: &StampOptions,
) -> Result<StampOutcome> {
    let entries = parse_entries(raw);

    let top = entries.first().ok_or_else(|| {
        ReleaseError::MalformedChangelog("no version entries found".into())
    })?;

    if !top.is_unreleased() {
        info!(
            "skip changelog: top entry '{}' is already released",
            top.title
        );
        return Ok(StampOutcome::Skipped {
            existing_body: top.body.clone(),
        });
    }

    if let Some(version) = &top.version
        && version != &opts.release_version
    {
        warn!(
            "unreleased entry names version {version}, releasing it as {}",
            opts.release_version
        );
    }

    let date = opts.date.format(DATE_FORMAT);
    let released_heading = format!("## [{}] - {date}", opts.release_version);

    let mut changelog = String::with_capacity(raw.len() + 64);
    changelog.push_str(&raw[..top.heading.start]);

    if opts.prepare_next_entry {
        let next_heading = match &opts.next_version {
            Some(next) => format!("## [{next}] - {UNRELEASED_MARKER}"),
            None => format!("## {UNRELEASED_MARKER}"),
        };
        changelog
            .push_str(&format!("{next_heading}\n\n{PLACEHOLDER_BODY}\n\n"));
    }

    changelog.push_str(&released_heading);
    changelog.push_str(&raw[top.heading.end..]);

    debug!("stamped changelog heading: {released_heading}");

    Ok(StampOutcome::Stamped {
        changelog,
        released_body: top.body.clone(),
    })
}
