//! Local inventory: what is installed in the mods directory, and at which version.
//!
//! Every `.zip` in the directory is opened and its `modDesc.xml` read. A
//! missing or broken descriptor marks that archive `Unknown`; it never fails
//! the scan. A well-formed descriptor without a version is `Known` with an
//! empty version, so it differs from every catalog version and gets resynced.

use modsync_schema::{ARCHIVE_EXT, DESCRIPTOR_FILE, LocalDescriptor};
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to read mods directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Installed archives keyed by filename. Recomputed on every scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    mods: HashMap<String, LocalDescriptor>,
}

impl Inventory {
    pub fn get(&self, filename: &str) -> Option<&LocalDescriptor> {
        self.mods.get(filename)
    }

    pub fn len(&self) -> usize {
        self.mods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &LocalDescriptor)> {
        self.mods.iter()
    }
}

impl FromIterator<(String, LocalDescriptor)> for Inventory {
    fn from_iter<I: IntoIterator<Item = (String, LocalDescriptor)>>(iter: I) -> Self {
        Self {
            mods: iter.into_iter().collect(),
        }
    }
}

/// Scan `dir` for mod archives.
///
/// A directory that does not exist yet is an empty inventory, not an error.
pub fn scan(dir: &Path) -> Result<Inventory, ScanError> {
    let read_dir_err = |source| ScanError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("Mods directory {} does not exist yet", dir.display());
            return Ok(Inventory::default());
        }
        Err(e) => return Err(read_dir_err(e)),
    };

    let mut mods = HashMap::new();
    for entry in entries {
        let entry = entry.map_err(read_dir_err)?;
        if entry.file_type().map_err(read_dir_err)?.is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.to_lowercase().ends_with(ARCHIVE_EXT) {
            continue;
        }

        let descriptor = read_descriptor(&entry.path());
        mods.insert(name, descriptor);
    }

    tracing::debug!("Scanned {} archives in {}", mods.len(), dir.display());
    Ok(Inventory { mods })
}

/// Read the descriptor embedded in one archive, falling back to `Unknown`.
pub fn read_descriptor(path: &Path) -> LocalDescriptor {
    match try_read_descriptor(path) {
        Ok(descriptor) => descriptor,
        Err(reason) => {
            tracing::debug!("{}: descriptor unreadable ({reason})", path.display());
            LocalDescriptor::Unknown
        }
    }
}

#[derive(Debug, Deserialize)]
struct ModDesc {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    author: Option<String>,
}

#[derive(Error, Debug)]
enum DescriptorError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("no {DESCRIPTOR_FILE} in archive")]
    Missing,
    #[error("{0}")]
    Markup(#[from] quick_xml::Error),
    #[error("{0}")]
    Xml(#[from] quick_xml::DeError),
    #[error("root element is <{0}>, expected <modDesc>")]
    WrongRoot(String),
    #[error("descriptor has no root element")]
    Empty,
}

/// The first element must be `modDesc`, in any case.
fn check_root(raw: &str) -> Result<(), DescriptorError> {
    let mut reader = Reader::from_str(raw);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                let name = e.local_name();
                if name.as_ref().eq_ignore_ascii_case(b"modDesc") {
                    return Ok(());
                }
                return Err(DescriptorError::WrongRoot(
                    String::from_utf8_lossy(name.as_ref()).into_owned(),
                ));
            }
            Event::Eof => return Err(DescriptorError::Empty),
            _ => {}
        }
    }
}

fn try_read_descriptor(path: &Path) -> Result<LocalDescriptor, DescriptorError> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    let mut raw = None;
    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let is_descriptor = file
            .name()
            .rsplit(['/', '\\'])
            .next()
            .is_some_and(|base| base.eq_ignore_ascii_case(DESCRIPTOR_FILE));
        if is_descriptor {
            let mut body = String::new();
            file.read_to_string(&mut body)?;
            raw = Some(body);
            break;
        }
    }
    let raw = raw.ok_or(DescriptorError::Missing)?;

    check_root(&raw)?;
    let desc: ModDesc = quick_xml::de::from_str(&raw)?;
    let version = desc
        .version
        .map(|v| v.trim().to_string())
        .unwrap_or_default();
    let author = desc
        .author
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty());

    Ok(LocalDescriptor::Known { version, author })
}
