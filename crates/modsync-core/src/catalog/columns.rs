//! Column rules for catalog rows.
//!
//! The catalog page does not label its columns consistently, so each cell is
//! recognised by its visible text and by the shape of its `title` attribute.
//! Every rule pairs a signal with an extractor; a row is built by offering each
//! of its cells to every rule in [`RULES`]. Adding a column means adding a rule.

use modsync_schema::size::has_size_unit;
use modsync_schema::{ARCHIVE_EXT, ASSET_EXT, CatalogEntry, parse_size_bytes};
use regex::Regex;
use std::sync::OnceLock;

/// What a rule sees of one cell.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Cell<'a> {
    /// Concatenated text content of the cell.
    pub text: &'a str,
    /// The cell's `title` attribute, empty if absent.
    pub label: &'a str,
}

pub(crate) struct ColumnRule {
    pub name: &'static str,
    signal: fn(&Cell<'_>) -> bool,
    extract: fn(&Cell<'_>, &mut CatalogEntry),
}

impl ColumnRule {
    /// Apply the extractor if the cell carries this rule's signal.
    pub(crate) fn apply(&self, cell: &Cell<'_>, entry: &mut CatalogEntry) -> bool {
        if (self.signal)(cell) {
            (self.extract)(cell, entry);
            true
        } else {
            false
        }
    }
}

pub(crate) static RULES: [ColumnRule; 5] = [
    ColumnRule {
        name: "version",
        signal: version_signal,
        extract: version_extract,
    },
    ColumnRule {
        name: "author",
        signal: author_signal,
        extract: author_extract,
    },
    ColumnRule {
        name: "filename",
        signal: filename_signal,
        extract: filename_extract,
    },
    ColumnRule {
        name: "size",
        signal: size_signal,
        extract: size_extract,
    },
    ColumnRule {
        name: "active",
        signal: active_signal,
        extract: active_extract,
    },
];

/// Strict four-part dotted version, e.g. `1.0.0.0`.
pub(crate) fn is_version_label(label: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^\d+\.\d+\.\d+\.\d+$").expect("static version pattern"))
        .is_match(label)
}

fn version_signal(cell: &Cell<'_>) -> bool {
    cell.text.contains("Version") || is_version_label(cell.label)
}

fn version_extract(cell: &Cell<'_>, entry: &mut CatalogEntry) {
    // A "Version" heading over a free-form label is not a version.
    if is_version_label(cell.label) {
        entry.version = cell.label.to_string();
    }
}

fn author_signal(cell: &Cell<'_>) -> bool {
    cell.text.contains("Author")
}

fn author_extract(cell: &Cell<'_>, entry: &mut CatalogEntry) {
    if !cell.label.is_empty() {
        entry.author = Some(cell.label.to_string());
    }
}

fn filename_signal(cell: &Cell<'_>) -> bool {
    cell.text.contains("Filename")
        || cell.label.ends_with(ARCHIVE_EXT)
        || cell.label.ends_with(ASSET_EXT)
}

fn filename_extract(cell: &Cell<'_>, entry: &mut CatalogEntry) {
    if !cell.label.is_empty() {
        entry.filename = cell.label.to_string();
        entry.is_package_asset = CatalogEntry::is_asset_filename(cell.label);
    }
}

fn size_signal(cell: &Cell<'_>) -> bool {
    cell.text.contains("Size")
}

fn size_extract(cell: &Cell<'_>, entry: &mut CatalogEntry) {
    if !cell.label.is_empty() && has_size_unit(cell.label) {
        entry.size = cell.label.to_string();
        entry.size_bytes = parse_size_bytes(cell.label);
    }
}

fn active_signal(cell: &Cell<'_>) -> bool {
    cell.text.contains("Active")
}

fn active_extract(cell: &Cell<'_>, entry: &mut CatalogEntry) {
    entry.is_enabled_remotely = cell.text.contains("Yes");
}
