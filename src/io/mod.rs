//! Product detection and fixed-offset decoding

pub mod band_reader;
pub mod container;
pub mod field;
pub mod geodata;
pub mod header;
pub mod landsat_reader;
pub mod layout;

// Re-export main types
pub use band_reader::{DestRegion, PixelBandReader, PixelStream, ReadStatus, SourceRegion};
pub use container::{Classification, ContainerClassifier, DataSource, ProductLocation, Qualification};
pub use field::{ByteSource, FieldDecoder};
pub use geodata::GeoDataDecoder;
pub use header::{HeaderDecoder, HeaderSources};
pub use landsat_reader::{LandsatReader, ReaderParams};
pub use layout::{HeaderLayout, CEOS_LAYOUT, FAST_L5_LAYOUT};
