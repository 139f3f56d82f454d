//! FleetCheck Common Library
//!
//! CLIと他のフロントエンドで共有される型とユーティリティ

pub mod types;
pub mod data_uri;
pub mod error;

pub use types::{
    CapturedPhoto, Driver, InspectionPhotos, InspectionRecord, InspectionRow, PhotoSlot,
    RecordId, Vehicle,
};
pub use data_uri::{decode_data_uri, encode_data_uri, extract_base64_from_data_uri, extract_mime_type_from_data_uri};
pub use error::{Error, Result};
