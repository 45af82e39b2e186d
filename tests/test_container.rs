mod common;

use common::{band_samples, init_logging, write_files, write_zip, CeosProduct, FastProduct};
use landsat_tm::io::container::{ContainerClassifier, ProductLocation, Qualification};
use landsat_tm::io::landsat_reader::LandsatReader;
use landsat_tm::types::{HeaderFile, LandsatError, ProductFormat};
use tempfile::TempDir;
use zip::CompressionMethod;

#[test]
fn test_plain_fast_header_is_intended() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let header = FastProduct::default().write_dir(dir.path());

    let classification = ContainerClassifier::classify(&header).unwrap();
    assert_eq!(classification.format, ProductFormat::FastL5);
    assert!(!classification.zipped);
    assert_eq!(classification.satellite, "LANDSAT5");
    assert_eq!(classification.instrument, "TM");
    assert!(classification.header_sources.contains_key(&HeaderFile::FastHeader));
    assert!(classification.is_supported());
    assert_eq!(ContainerClassifier::qualify(&header), Qualification::Intended);
}

#[test]
fn test_band_file_finds_sibling_header() {
    init_logging();
    let dir = TempDir::new().unwrap();
    FastProduct::default().write_dir(dir.path());

    let classification = ContainerClassifier::classify(dir.path().join("band3.dat")).unwrap();
    assert_eq!(classification.format, ProductFormat::FastL5);
    assert!(matches!(classification.location, ProductLocation::Directory(_)));
}

#[test]
fn test_directory_input() {
    init_logging();
    let fast_dir = TempDir::new().unwrap();
    FastProduct::default().write_dir(fast_dir.path());
    assert_eq!(ContainerClassifier::classify(fast_dir.path()).unwrap().format, ProductFormat::FastL5);

    let ceos_dir = TempDir::new().unwrap();
    CeosProduct::default().write_dir(ceos_dir.path());
    let classification = ContainerClassifier::classify(ceos_dir.path()).unwrap();
    assert_eq!(classification.format, ProductFormat::Ceos);
    assert_eq!(classification.satellite, "LANDSAT-5");
    assert!(classification.header_sources.contains_key(&HeaderFile::VolumeDirectory));
    assert!(classification.header_sources.contains_key(&HeaderFile::Leader));
}

#[test]
fn test_ceos_volume_directory_path() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let vdf = CeosProduct::default().write_dir(dir.path());
    assert_eq!(ContainerClassifier::qualify(&vdf), Qualification::Intended);
}

#[test]
fn test_single_fast_header_entry_in_zip() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let zip_path = dir.path().join("scene.zip");
    let header = FastProduct::default().header();
    write_zip(&zip_path, &[("scene.dat".to_string(), header)], CompressionMethod::Deflated, None);

    let classification = ContainerClassifier::classify(&zip_path).unwrap();
    assert_eq!(classification.format, ProductFormat::FastL5);
    assert!(classification.zipped);
    assert!(classification.is_supported());
    match &classification.location {
        ProductLocation::Archive { entries, .. } => {
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].size, 1536);
        }
        other => panic!("expected an archive, got {:?}", other),
    }
}

#[test]
fn test_ceos_in_zip_folder() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let zip_path = dir.path().join("ceos.zip");
    write_zip(&zip_path, &CeosProduct::default().files(), CompressionMethod::Stored, Some("L5044034"));

    let classification = ContainerClassifier::classify(&zip_path).unwrap();
    assert_eq!(classification.format, ProductFormat::Ceos);
    assert!(classification.zipped);
    assert_eq!(classification.instrument, "TM");
    assert_eq!(ContainerClassifier::qualify(&zip_path), Qualification::Intended);
}

#[test]
fn test_other_satellite_is_unsupported() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let product = FastProduct { satellite: "LANDSAT7".to_string(), ..FastProduct::default() };
    let header = product.write_dir(dir.path());

    let classification = ContainerClassifier::classify(&header).unwrap();
    assert_eq!(classification.satellite, "LANDSAT7");
    assert!(!classification.is_supported());
    assert_eq!(ContainerClassifier::qualify(&header), Qualification::Unsupported);
}

#[test]
fn test_unrelated_inputs_are_unsupported() {
    init_logging();
    let dir = TempDir::new().unwrap();

    let text = dir.path().join("notes.txt");
    std::fs::write(&text, b"not a product").unwrap();
    assert!(matches!(ContainerClassifier::classify(&text), Err(LandsatError::UnsupportedFormat(_))));
    assert_eq!(ContainerClassifier::qualify(&text), Qualification::Unsupported);

    // A .dat file with no header next to it
    let lonely = TempDir::new().unwrap();
    write_files(lonely.path(), &[("band1.dat".to_string(), vec![0u8; 100])]);
    assert!(matches!(
        ContainerClassifier::classify(lonely.path().join("band1.dat")),
        Err(LandsatError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_corrupt_zip_is_io_error() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let zip_path = dir.path().join("broken.zip");
    std::fs::write(&zip_path, b"PK this is not really an archive").unwrap();

    match ContainerClassifier::classify(&zip_path) {
        Err(LandsatError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::InvalidData),
        Err(other) => panic!("expected an I/O error, got {}", other),
        Ok(_) => panic!("corrupt archive was accepted"),
    }
    assert_eq!(ContainerClassifier::qualify(&zip_path), Qualification::Unsupported);
}

#[test]
fn test_zip_without_header_is_unsupported() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let zip_path = dir.path().join("bands.zip");
    write_zip(&zip_path, &[("band1.dat".to_string(), vec![7u8; 100])], CompressionMethod::Stored, None);
    assert!(matches!(ContainerClassifier::classify(&zip_path), Err(LandsatError::UnsupportedFormat(_))));
}

/// 48x32 bands are exactly as large as the FAST header
fn header_sized_bands() -> FastProduct {
    FastProduct { width: 48, height: 32, ..FastProduct::default() }
}

#[test]
fn test_header_sized_band_before_header_in_zip() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let zip_path = dir.path().join("scene.zip");
    let product = header_sized_bands();
    let mut files = product.files();
    let header = files.remove(0);
    files.push(header);
    assert_eq!(files[0].1.len(), 1536);
    write_zip(&zip_path, &files, CompressionMethod::Stored, Some("L5193025"));

    let classification = ContainerClassifier::classify(&zip_path).unwrap();
    assert_eq!(classification.format, ProductFormat::FastL5);
    assert_eq!(classification.satellite, "LANDSAT5");
    assert_eq!(ContainerClassifier::qualify(&zip_path), Qualification::Intended);

    let mut reader = LandsatReader::open(&zip_path).unwrap();
    assert_eq!((reader.header().width, reader.header().height), (48, 32));
    let raster = reader.read_band_raster(1).unwrap();
    assert_eq!(raster.into_raw_vec(), band_samples(1, 48, 32));
}

#[test]
fn test_unnamed_header_found_by_identity() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let zip_path = dir.path().join("scene.zip");
    let product = header_sized_bands();
    let files = vec![
        ("a.dat".to_string(), band_samples(1, 48, 32)),
        ("b.dat".to_string(), product.header()),
    ];
    write_zip(&zip_path, &files, CompressionMethod::Deflated, None);

    let classification = ContainerClassifier::classify(&zip_path).unwrap();
    assert_eq!(classification.format, ProductFormat::FastL5);
    assert_eq!(classification.satellite, "LANDSAT5");
    assert_eq!(classification.instrument, "TM");
    assert!(classification.is_supported());
}

#[test]
fn test_header_sized_band_file_defers_to_named_header() {
    init_logging();
    let dir = TempDir::new().unwrap();
    header_sized_bands().write_dir(dir.path());

    let band = dir.path().join("band1.dat");
    let classification = ContainerClassifier::classify(&band).unwrap();
    assert_eq!(classification.format, ProductFormat::FastL5);
    assert_eq!(classification.satellite, "LANDSAT5");
    assert_eq!(ContainerClassifier::qualify(&band), Qualification::Intended);
}

/// Rewrite the uncompressed size recorded for `name` in the central directory
fn declare_entry_size(zip_bytes: &mut [u8], name: &str, size: u32) {
    let signature = [b'P', b'K', 1, 2];
    let mut patched = false;
    for start in 0..zip_bytes.len().saturating_sub(46) {
        if zip_bytes[start..start + 4] != signature {
            continue;
        }
        let name_len = u16::from_le_bytes([zip_bytes[start + 28], zip_bytes[start + 29]]) as usize;
        if zip_bytes.get(start + 46..start + 46 + name_len) == Some(name.as_bytes()) {
            zip_bytes[start + 24..start + 28].copy_from_slice(&size.to_le_bytes());
            patched = true;
        }
    }
    assert!(patched, "no central directory record for {}", name);
}

#[test]
fn test_declared_entry_size_is_not_trusted() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let zip_path = dir.path().join("ceos.zip");
    let product = CeosProduct::default();
    write_zip(&zip_path, &product.files(), CompressionMethod::Stored, None);

    let mut bytes = std::fs::read(&zip_path).unwrap();
    declare_entry_size(&mut bytes, "LEA_01.DAT", 0x7FFF_FFF0);
    std::fs::write(&zip_path, &bytes).unwrap();

    let classification = ContainerClassifier::classify(&zip_path).unwrap();
    assert_eq!(classification.format, ProductFormat::Ceos);
    assert!(classification.header_sources.contains_key(&HeaderFile::Leader));

    let mut reader = LandsatReader::open(&zip_path).unwrap();
    assert_eq!((reader.header().width, reader.header().height), (24, 18));
    assert_eq!(reader.read_band_raster(3).unwrap().into_raw_vec(), band_samples(3, 24, 18));
}
