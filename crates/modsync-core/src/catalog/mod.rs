//! Catalog page parsing.
//!
//! The server publishes its mod list as an HTML page. Each package is a grid
//! row whose cells carry the interesting values in `title` attributes; the
//! download link sits somewhere inside the row.

mod columns;
pub mod fetch;

use modsync_schema::{
    ARCHIVE_EXT, CatalogEntry, DOWNLOAD_PREFIX, NEWER_PLATFORM_MARKER, PlatformVersion,
};
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use thiserror::Error;
use url::Url;

use columns::{Cell, RULES};

pub use fetch::{FetchError, fetch_document};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Base URL '{0}' cannot resolve relative links")]
    NotABase(String),
}

/// The page was reachable but does not expose downloadable mods.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Public mod download is not enabled. Enable it in the server control panel.")]
pub struct ValidationError;

/// Parsed catalog page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub entries: Vec<CatalogEntry>,
    pub platform: PlatformVersion,
}

impl Catalog {
    /// Entries that take part in syncing.
    pub fn syncable(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(|e| e.is_syncable())
    }
}

struct Selectors {
    row: Selector,
    cell: Selector,
    labelled: Selector,
    link: Selector,
}

fn selectors() -> &'static Selectors {
    static SELECTORS: OnceLock<Selectors> = OnceLock::new();
    SELECTORS.get_or_init(|| Selectors {
        row: Selector::parse(".container-row.grid-row").expect("static row selector"),
        cell: Selector::parse(".container-row").expect("static cell selector"),
        labelled: Selector::parse("div[title]").expect("static label selector"),
        link: Selector::parse("a[href]").expect("static link selector"),
    })
}

/// Whether a fetched page exposes mod downloads at all.
///
/// Used before [`parse`] to tell "feature disabled on the server" apart from
/// a page that fails to parse.
pub fn is_valid_catalog_page(document: &str) -> bool {
    document.contains(&format!("href=\"{DOWNLOAD_PREFIX}")) && document.contains(&format!("{ARCHIVE_EXT}\""))
}

/// Fail with [`ValidationError`] unless [`is_valid_catalog_page`] holds.
pub fn validate_page(document: &str) -> Result<(), ValidationError> {
    if is_valid_catalog_page(document) {
        Ok(())
    } else {
        Err(ValidationError)
    }
}

/// Coarse platform detection: the newer release prints a marker the older one never does.
pub fn detect_platform(document: &str) -> PlatformVersion {
    if document.contains(NEWER_PLATFORM_MARKER) {
        PlatformVersion::Fs25
    } else {
        PlatformVersion::Fs22
    }
}

/// Parse a catalog page into entries, resolving links against `base_url`.
///
/// Markup is parsed leniently (HTML5 error recovery), so only an unusable
/// base URL is a hard failure.
pub fn parse(document: &str, base_url: &str) -> Result<Catalog, ParseError> {
    let base = Url::parse(base_url).map_err(|source| ParseError::InvalidBaseUrl {
        url: base_url.to_string(),
        source,
    })?;
    if base.cannot_be_a_base() {
        return Err(ParseError::NotABase(base_url.to_string()));
    }

    let html = Html::parse_document(document);
    let sel = selectors();

    let entries: Vec<CatalogEntry> = html
        .select(&sel.row)
        .filter_map(|row| parse_row(row, sel, &base))
        .collect();

    let platform = detect_platform(document);
    tracing::debug!(
        "Parsed {} catalog entries ({platform}) from {base_url}",
        entries.len()
    );

    Ok(Catalog { entries, platform })
}

/// Elements below `row` matching `selector`, never `row` itself.
fn within<'a>(row: ElementRef<'a>, selector: &'a Selector) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    let row_id = row.id();
    row.select(selector).filter(move |el| el.id() != row_id)
}

fn parse_row(row: ElementRef<'_>, sel: &Selectors, base: &Url) -> Option<CatalogEntry> {
    let name = within(row, &sel.labelled).next()?.value().attr("title")?;
    if name.is_empty() {
        return None;
    }
    // Footer rows ("Total: 42 Mods") look like entries but are not.
    if name.contains("Total") && name.contains("Mods") {
        return None;
    }

    let mut entry = CatalogEntry {
        name: name.to_string(),
        ..Default::default()
    };

    for cell_el in within(row, &sel.cell) {
        let text: String = cell_el.text().collect();
        let cell = Cell {
            text: &text,
            label: cell_el.value().attr("title").unwrap_or_default(),
        };
        for rule in &RULES {
            if rule.apply(&cell, &mut entry) {
                tracing::trace!("{}: {} column '{}'", entry.name, rule.name, cell.label);
            }
        }
    }

    // Only `mods/<file>` links whose remainder is a bare filename count.
    let hrefs: Vec<&str> = within(row, &sel.link)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| {
            href.strip_prefix(DOWNLOAD_PREFIX)
                .is_some_and(CatalogEntry::is_plain_filename)
        })
        .collect();

    if let Some(url) = hrefs
        .iter()
        .filter(|href| href.ends_with(ARCHIVE_EXT))
        .find_map(|href| base.join(href).ok())
    {
        entry.download_url = url.to_string();
    }

    if entry.filename.is_empty() {
        if let Some(filename) = hrefs.first().and_then(|href| href.strip_prefix(DOWNLOAD_PREFIX)) {
            entry.filename = filename.to_string();
            entry.is_package_asset = CatalogEntry::is_asset_filename(filename);
        }
    }

    if entry.filename.is_empty() {
        return None;
    }
    // The filename becomes a path under the mods directory.
    if !CatalogEntry::is_plain_filename(&entry.filename) {
        tracing::warn!("{}: ignoring unsafe filename '{}'", entry.name, entry.filename);
        return None;
    }
    Some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://127.0.0.1:8080/mods.html?lang=en";

    fn row(cells: &str) -> String {
        format!(r#"<div class="container-row grid-row">{cells}</div>"#)
    }

    fn page(rows: &[String]) -> String {
        format!(
            "<html><body><div class=\"grid\">{}</div></body></html>",
            rows.concat()
        )
    }

    fn full_row() -> String {
        row(r#"
            <div class="container-row" title="Lizard Tractor"><span>Name</span></div>
            <div class="container-row" title="1.0.0.0"><span>Version</span></div>
            <div class="container-row" title="GIANTS Software"><span>Author</span></div>
            <div class="container-row" title="FS25_LizardTractor.zip"><span>Filename</span></div>
            <div class="container-row" title="512.5 MB"><span>Size</span></div>
            <div class="container-row"><span>Active</span> <b>Yes</b></div>
            <a href="mods/FS25_LizardTractor.zip">Download</a>
        "#)
    }

    #[test]
    fn test_parse_full_row() {
        let catalog = parse(&page(&[full_row()]), BASE).unwrap();
        assert_eq!(catalog.entries.len(), 1);

        let entry = &catalog.entries[0];
        assert_eq!(entry.name, "Lizard Tractor");
        assert_eq!(entry.version, "1.0.0.0");
        assert_eq!(entry.author.as_deref(), Some("GIANTS Software"));
        assert_eq!(entry.filename, "FS25_LizardTractor.zip");
        assert_eq!(entry.size, "512.5 MB");
        assert_eq!(entry.size_bytes, 537_395_200);
        assert!(entry.is_enabled_remotely);
        assert!(!entry.is_package_asset);
        assert_eq!(
            entry.download_url,
            "http://127.0.0.1:8080/mods/FS25_LizardTractor.zip"
        );
    }

    #[test]
    fn test_total_row_is_skipped() {
        let footer = row(r#"<div class="container-row" title="Total: 42 Mods">Total</div>"#);
        let catalog = parse(&page(&[full_row(), footer]), BASE).unwrap();
        assert_eq!(catalog.entries.len(), 1);
        assert!(catalog.entries.iter().all(|e| !e.name.contains("Total")));
    }

    #[test]
    fn test_row_without_label_is_skipped() {
        let unlabeled = row(r#"<div class="container-row"><a href="mods/Orphan.zip">x</a></div>"#);
        let catalog = parse(&page(&[unlabeled]), BASE).unwrap();
        assert!(catalog.entries.is_empty());
    }

    #[test]
    fn test_row_without_filename_is_discarded() {
        let nameless = row(r#"<div class="container-row" title="Mystery"><span>Name</span></div>"#);
        let catalog = parse(&page(&[nameless]), BASE).unwrap();
        assert!(catalog.entries.is_empty());
    }

    #[test]
    fn test_filename_falls_back_to_link() {
        let linked = row(r#"
            <div class="container-row" title="Fallback Plow"><span>Name</span></div>
            <a href="mods/FS25_FallbackPlow.zip">Download</a>
        "#);
        let catalog = parse(&page(&[linked]), BASE).unwrap();
        let entry = &catalog.entries[0];
        assert_eq!(entry.filename, "FS25_FallbackPlow.zip");
        assert_eq!(
            entry.download_url,
            "http://127.0.0.1:8080/mods/FS25_FallbackPlow.zip"
        );
    }

    #[test]
    fn test_asset_row_has_no_download() {
        let dlc = row(r#"
            <div class="container-row" title="Premium Expansion"><span>Name</span></div>
            <div class="container-row" title="pdlc_premiumExpansion.dlc"><span>Filename</span></div>
        "#);
        let catalog = parse(&page(&[dlc]), BASE).unwrap();
        let entry = &catalog.entries[0];
        assert!(entry.is_package_asset);
        assert!(entry.download_url.is_empty());
        assert!(!entry.is_syncable());
        assert_eq!(catalog.syncable().count(), 0);
    }

    #[test]
    fn test_first_matching_link_wins() {
        let two_links = row(r#"
            <div class="container-row" title="Twin"><span>Name</span></div>
            <a href="https://elsewhere.example/Twin.zip">Mirror</a>
            <a href="mods/FS25_Twin.zip">Download</a>
            <a href="mods/FS25_Twin_old.zip">Old</a>
        "#);
        let catalog = parse(&page(&[two_links]), BASE).unwrap();
        let entry = &catalog.entries[0];
        assert_eq!(entry.filename, "FS25_Twin.zip");
        assert_eq!(entry.download_url, "http://127.0.0.1:8080/mods/FS25_Twin.zip");
    }

    #[test]
    fn test_absolute_filename_is_dropped() {
        let absolute = row(r#"
            <div class="container-row" title="Evil"><span>Name</span></div>
            <div class="container-row" title="/tmp/outside/evil.zip"><span>Filename</span></div>
            <a href="mods/evil.zip">Download</a>
        "#);
        let catalog = parse(&page(&[absolute, full_row()]), BASE).unwrap();
        assert_eq!(catalog.entries.len(), 1);
        assert_eq!(catalog.entries[0].filename, "FS25_LizardTractor.zip");
    }

    #[test]
    fn test_filename_with_separator_is_dropped() {
        for name in ["sub/evil.zip", "sub\\evil.zip", "../evil.zip"] {
            let nested = row(&format!(
                r#"<div class="container-row" title="Nested"><span>Name</span></div>
                <div class="container-row" title="{name}"><span>Filename</span></div>
                <a href="mods/evil.zip">Download</a>"#
            ));
            let catalog = parse(&page(&[nested]), BASE).unwrap();
            assert!(catalog.entries.is_empty(), "{name}");
        }
    }

    #[test]
    fn test_parent_dir_link_is_ignored() {
        let climbing = row(r#"
            <div class="container-row" title="Climber"><span>Name</span></div>
            <a href="mods/../../escape.zip">Download</a>
        "#);
        let catalog = parse(&page(&[climbing]), BASE).unwrap();
        assert!(catalog.entries.is_empty());

        let named = row(r#"
            <div class="container-row" title="Climber"><span>Name</span></div>
            <div class="container-row" title="FS25_Climber.zip"><span>Filename</span></div>
            <a href="mods/../../escape.zip">Download</a>
        "#);
        let catalog = parse(&page(&[named]), BASE).unwrap();
        let entry = &catalog.entries[0];
        assert!(entry.download_url.is_empty());
        assert!(!entry.is_syncable());
    }

    #[test]
    fn test_platform_detection() {
        let fs22 = page(&[full_row()]);
        assert_eq!(parse(&fs22, BASE).unwrap().platform, PlatformVersion::Fs22);

        let fs25 = format!("<p>Game version 10.0.0.0</p>{fs22}");
        assert_eq!(parse(&fs25, BASE).unwrap().platform, PlatformVersion::Fs25);
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            parse(&page(&[full_row()]), "mods.html"),
            Err(ParseError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            parse(&page(&[full_row()]), "mailto:admin@example.com"),
            Err(ParseError::NotABase(_))
        ));
    }

    #[test]
    fn test_malformed_markup_is_recovered() {
        let broken = format!("<div><span>{}", full_row().replace("</div>", ""));
        let catalog = parse(&broken, BASE).unwrap();
        assert!(!catalog.entries.is_empty());
    }

    #[test]
    fn test_valid_catalog_page() {
        assert!(is_valid_catalog_page(&page(&[full_row()])));
        assert!(validate_page(&page(&[full_row()])).is_ok());
        assert!(!is_valid_catalog_page("<html><body>Login required</body></html>"));
        assert_eq!(validate_page("<html></html>"), Err(ValidationError));
    }
}
