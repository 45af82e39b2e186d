use crate::io::field::{ByteSource, FieldDecoder};
use crate::io::header::HeaderSources;
use crate::io::layout::{
    HeaderLayout, IdentityLayout, CEOS_LEADER, CEOS_VOLUME_DIRECTORY, FAST_HEADER_SIZE, FAST_L5_LAYOUT,
};
use crate::types::{HeaderFile, LandsatError, LandsatResult, ProductFormat};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Where a data file lives, resolved to a seekable stream at read time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    PlainFile { path: PathBuf, offset: u64 },
    /// Entry of the session's archive
    ArchiveEntry { entry_name: String, offset: u64 },
}

impl DataSource {
    pub fn offset(&self) -> u64 {
        match self {
            DataSource::PlainFile { offset, .. } | DataSource::ArchiveEntry { offset, .. } => *offset,
        }
    }

    pub fn with_offset(self, offset: u64) -> Self {
        match self {
            DataSource::PlainFile { path, .. } => DataSource::PlainFile { path, offset },
            DataSource::ArchiveEntry { entry_name, .. } => DataSource::ArchiveEntry { entry_name, offset },
        }
    }
}

/// Name and uncompressed size of an archive entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntryInfo {
    pub name: String,
    pub size: u64,
}

/// The directory or archive holding a product's files
pub enum ProductLocation {
    Directory(PathBuf),
    Archive {
        path: PathBuf,
        entries: Vec<ArchiveEntryInfo>,
        archive: ZipArchive<File>,
    },
}

impl ProductLocation {
    /// First file whose base name satisfies `matches`
    pub fn find_file<F: Fn(&str) -> bool>(&self, matches: F) -> LandsatResult<Option<DataSource>> {
        match self {
            ProductLocation::Directory(dir) => {
                for entry in std::fs::read_dir(dir)? {
                    let entry = entry?;
                    if !entry.file_type()?.is_file() {
                        continue;
                    }
                    if matches(&entry.file_name().to_string_lossy()) {
                        return Ok(Some(DataSource::PlainFile { path: entry.path(), offset: 0 }));
                    }
                }
                Ok(None)
            }
            ProductLocation::Archive { entries, .. } => Ok(entries
                .iter()
                .find(|entry| matches(base_name(&entry.name)))
                .map(|entry| DataSource::ArchiveEntry {
                    entry_name: entry.name.clone(),
                    offset: 0,
                })),
        }
    }

    pub fn is_archive(&self) -> bool {
        matches!(self, ProductLocation::Archive { .. })
    }
}

impl std::fmt::Debug for ProductLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductLocation::Directory(dir) => f.debug_tuple("Directory").field(dir).finish(),
            ProductLocation::Archive { path, entries, .. } => f
                .debug_struct("Archive")
                .field("path", path)
                .field("entries", &entries.len())
                .finish(),
        }
    }
}

/// Result of inspecting an input path
#[derive(Debug)]
pub struct Classification {
    pub format: ProductFormat,
    pub zipped: bool,
    pub satellite: String,
    pub instrument: String,
    pub location: ProductLocation,
    /// Opened header files keyed by logical identity
    pub header_sources: HeaderSources,
}

impl Classification {
    /// Known format, supported satellite and supported instrument
    pub fn is_supported(&self) -> bool {
        match HeaderLayout::for_format(self.format) {
            Some(layout) => {
                self.satellite == layout.identity.supported_satellite
                    && self.instrument == layout.identity.supported_instrument
            }
            None => false,
        }
    }
}

/// Whether an input can be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qualification {
    Intended,
    Unsupported,
}

/// Detects product format and container, and opens the header files
pub struct ContainerClassifier;

impl ContainerClassifier {
    /// Check an input without failing
    pub fn qualify<P: AsRef<Path>>(path: P) -> Qualification {
        let path = path.as_ref();
        match Self::classify(path) {
            Ok(classification) if classification.is_supported() => Qualification::Intended,
            Ok(classification) => {
                log::debug!(
                    "{}: {} product of satellite '{}' instrument '{}' is not supported",
                    path.display(),
                    classification.format,
                    classification.satellite,
                    classification.instrument
                );
                Qualification::Unsupported
            }
            Err(e) => {
                log::debug!("{}: cannot decode: {}", path.display(), e);
                Qualification::Unsupported
            }
        }
    }

    pub fn classify<P: AsRef<Path>>(path: P) -> LandsatResult<Classification> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LandsatError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", path.display()),
            )));
        }

        if path.is_dir() {
            return Self::classify_directory(path);
        }

        let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        match extension(&name).as_deref() {
            Some("zip") => Self::classify_archive(path),
            Some("dat") => {
                if std::fs::metadata(path)?.len() != FAST_HEADER_SIZE {
                    return Self::classify_directory(&parent_dir(path));
                }
                // A header-sized band file defers to a named header next to it
                if !is_fast_header_name(&name) {
                    if let Ok(classification) = Self::classify_directory(&parent_dir(path)) {
                        return Ok(classification);
                    }
                }
                let mut sources = HeaderSources::new();
                sources.insert(HeaderFile::FastHeader, ByteSource::open(path)?);
                Self::finish(ProductFormat::FastL5, false, ProductLocation::Directory(parent_dir(path)), sources)
            }
            _ if name.eq_ignore_ascii_case(CEOS_VOLUME_DIRECTORY) => Self::classify_directory(&parent_dir(path)),
            _ => Err(LandsatError::UnsupportedFormat(format!(
                "{}: unrecognized file type",
                path.display()
            ))),
        }
    }

    /// Look for a CEOS volume directory or a FAST header among the files of `dir`
    fn classify_directory(dir: &Path) -> LandsatResult<Classification> {
        let location = ProductLocation::Directory(dir.to_path_buf());

        if let Some(DataSource::PlainFile { path, .. }) =
            location.find_file(|name| name.eq_ignore_ascii_case(CEOS_VOLUME_DIRECTORY))?
        {
            let mut sources = HeaderSources::new();
            sources.insert(HeaderFile::VolumeDirectory, ByteSource::open(&path)?);
            if let Some(DataSource::PlainFile { path: leader, .. }) =
                location.find_file(|name| name.eq_ignore_ascii_case(CEOS_LEADER))?
            {
                sources.insert(HeaderFile::Leader, ByteSource::open(&leader)?);
            } else {
                log::warn!("{}: CEOS volume without {}", dir.display(), CEOS_LEADER);
            }
            return Self::finish(ProductFormat::Ceos, false, location, sources);
        }

        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            let name = entry.file_name().to_string_lossy().to_string();
            if metadata.is_file() && metadata.len() == FAST_HEADER_SIZE && is_fast_header_name(&name) {
                let mut sources = HeaderSources::new();
                sources.insert(HeaderFile::FastHeader, ByteSource::open(entry.path())?);
                return Self::finish(ProductFormat::FastL5, false, location, sources);
            }
        }

        Err(LandsatError::UnsupportedFormat(format!(
            "{}: no FAST header or CEOS volume directory",
            dir.display()
        )))
    }

    fn classify_archive(path: &Path) -> LandsatResult<Classification> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file)?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            entries.push(ArchiveEntryInfo {
                name: entry.name().to_string(),
                size: entry.size(),
            });
        }

        let provisional = entries
            .first()
            .map(|entry| format_from_name(base_name(&entry.name)))
            .unwrap_or(ProductFormat::Unknown);
        log::debug!("{}: {} entries, provisional format {}", path.display(), entries.len(), provisional);

        let volume_directory = entries
            .iter()
            .find(|entry| base_name(&entry.name).eq_ignore_ascii_case(CEOS_VOLUME_DIRECTORY))
            .cloned();
        let fast_header = Self::pick_fast_header(&mut archive, &entries)?;

        let format = match (&volume_directory, &fast_header) {
            (Some(_), Some(_)) if provisional == ProductFormat::FastL5 => ProductFormat::FastL5,
            (Some(_), _) => ProductFormat::Ceos,
            (None, Some(_)) => ProductFormat::FastL5,
            (None, None) => {
                return Err(LandsatError::UnsupportedFormat(format!(
                    "{}: archive holds no FAST header or CEOS volume directory",
                    path.display()
                )))
            }
        };

        let mut sources = HeaderSources::new();
        match format {
            ProductFormat::FastL5 => {
                if let Some(entry) = &fast_header {
                    let bytes = read_entry(&mut archive, &entry.name)?;
                    sources.insert(HeaderFile::FastHeader, ByteSource::from_bytes(entry.name.clone(), bytes));
                }
            }
            _ => {
                if let Some(entry) = &volume_directory {
                    let bytes = read_entry(&mut archive, &entry.name)?;
                    sources.insert(HeaderFile::VolumeDirectory, ByteSource::from_bytes(entry.name.clone(), bytes));
                }
                let leader = entries
                    .iter()
                    .find(|entry| base_name(&entry.name).eq_ignore_ascii_case(CEOS_LEADER))
                    .map(|entry| entry.name.clone());
                match leader {
                    Some(name) => {
                        let bytes = read_entry(&mut archive, &name)?;
                        sources.insert(HeaderFile::Leader, ByteSource::from_bytes(name, bytes));
                    }
                    None => log::warn!("{}: CEOS archive without {}", path.display(), CEOS_LEADER),
                }
            }
        }

        let location = ProductLocation::Archive {
            path: path.to_path_buf(),
            entries,
            archive,
        };
        Self::finish(format, true, location, sources)
    }

    /// Header-sized entry holding the FAST header: a header-named entry first, then one
    /// carrying the supported identity, then the first of them
    fn pick_fast_header(
        archive: &mut ZipArchive<File>,
        entries: &[ArchiveEntryInfo],
    ) -> LandsatResult<Option<ArchiveEntryInfo>> {
        let candidates: Vec<&ArchiveEntryInfo> =
            entries.iter().filter(|entry| entry.size == FAST_HEADER_SIZE).collect();
        if let Some(entry) = candidates.iter().find(|entry| is_fast_header_name(base_name(&entry.name))) {
            return Ok(Some((*entry).clone()));
        }

        if candidates.len() > 1 {
            let identity = &FAST_L5_LAYOUT.identity;
            for entry in &candidates {
                let mut source = ByteSource::from_bytes(entry.name.clone(), read_entry(archive, &entry.name)?);
                let (satellite, instrument) = read_identity(&mut source, identity)?;
                if satellite == identity.supported_satellite && instrument == identity.supported_instrument {
                    log::debug!("FAST header found by identity in entry {}", entry.name);
                    return Ok(Some((*entry).clone()));
                }
            }
        }
        Ok(candidates.first().map(|entry| (*entry).clone()))
    }

    /// Read the identity prefix and assemble the classification
    fn finish(
        format: ProductFormat,
        zipped: bool,
        location: ProductLocation,
        mut header_sources: HeaderSources,
    ) -> LandsatResult<Classification> {
        let layout = HeaderLayout::for_format(format)
            .ok_or_else(|| LandsatError::UnsupportedFormat(format!("no layout for {} products", format)))?;
        let identity = &layout.identity;

        let (satellite, instrument) = match header_sources.get_mut(&identity.file) {
            Some(source) => read_identity(source, identity)?,
            None => (String::new(), String::new()),
        };

        log::info!(
            "Classified {:?} as {} (zipped: {}), satellite '{}', instrument '{}'",
            location,
            format,
            zipped,
            satellite,
            instrument
        );

        Ok(Classification {
            format,
            zipped,
            satellite,
            instrument,
            location,
            header_sources,
        })
    }
}

/// Satellite and instrument codes from the identity prefix of `source`
fn read_identity(source: &mut ByteSource, identity: &IdentityLayout) -> LandsatResult<(String, String)> {
    let prefix = source.read_prefix(identity.prefix_len)?;
    let mut prefix = ByteSource::from_bytes("identity prefix", prefix);
    let mut decoder = FieldDecoder::new(&mut prefix);
    Ok((
        decoder
            .read_trimmed(identity.satellite.offset, identity.satellite.len)
            .unwrap_or_default(),
        decoder
            .read_trimmed(identity.instrument.offset, identity.instrument.len)
            .unwrap_or_default(),
    ))
}

/// Whole content of an archive entry
pub fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> LandsatResult<Vec<u8>> {
    let mut entry = archive.by_name(name)?;
    // The declared size is not trusted for allocation
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Last path component of an archive entry name
pub fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

fn extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

fn format_from_name(name: &str) -> ProductFormat {
    if name.eq_ignore_ascii_case(CEOS_VOLUME_DIRECTORY) {
        ProductFormat::Ceos
    } else if extension(name).as_deref() == Some("dat") {
        ProductFormat::FastL5
    } else {
        ProductFormat::Unknown
    }
}

fn is_fast_header_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".dat") && (lower.contains("header") || lower.contains("hdr"))
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
