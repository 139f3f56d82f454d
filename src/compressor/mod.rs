//! 写真圧縮モジュール
//!
//! 画像ファイルをデコードし、幅が上限を超える場合は縮小してから
//! JPEGで再エンコードし、Data URIとして返す。
//!
//! デコード・縮小・エンコードはCPU処理のため `spawn_blocking` で実行する。
//! デコードが完了してから縮小・エンコードに進む。

mod resize;

pub use resize::target_dimensions;

use crate::error::MediaError;
use fleetcheck_common::{encode_data_uri, CapturedPhoto, PhotoSlot};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

/// 受け付けるMIMEタイプ
pub const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/webp"];

const OUTPUT_MIME_TYPE: &str = "image/jpeg";

/// 圧縮設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionSettings {
    /// 最大幅（px）
    pub max_width: u32,
    /// JPEG品質 (1-100)
    pub quality: u8,
    /// 入力ファイルの上限バイト数
    pub max_file_size: u64,
    pub allowed_types: Vec<String>,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            max_width: 1920,
            quality: 80,
            max_file_size: 10 * 1024 * 1024,
            allowed_types: ALLOWED_MIME_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// 圧縮前の写真ファイル
#[derive(Debug, Clone)]
pub struct PhotoFile {
    pub file_name: String,
    /// 申告されたMIMEタイプ
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// 圧縮結果
#[derive(Debug, Clone)]
pub struct CompressedImage {
    pub data_uri: String,
    pub width: u32,
    pub height: u32,
    /// エンコード後のJPEGバイト数
    pub encoded_len: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ImageCompressor {
    settings: CompressionSettings,
}

impl ImageCompressor {
    pub fn new(settings: CompressionSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &CompressionSettings {
        &self.settings
    }

    /// 写真を圧縮してCapturedPhotoを返す
    ///
    /// MIMEタイプとサイズはデコード前に検査する。
    pub async fn compress(&self, file: PhotoFile) -> Result<CapturedPhoto, MediaError> {
        self.check(&file)?;

        let settings = self.settings.clone();
        let PhotoFile { file_name, bytes, .. } = file;
        let original_byte_size = bytes.len() as u64;

        let compressed = tokio::task::spawn_blocking(move || compress_image(&bytes, &settings))
            .await
            .map_err(|e| MediaError::DecodeFailed(format!("decode task aborted: {}", e)))??;

        tracing::debug!(
            file = %file_name,
            width = compressed.width,
            height = compressed.height,
            original = original_byte_size,
            encoded = compressed.encoded_len,
            "photo compressed"
        );

        Ok(CapturedPhoto {
            encoded_image: compressed.data_uri,
            original_filename: file_name,
            original_byte_size,
        })
    }

    /// 複数スロットを並行して圧縮（結果はスロットごとに独立）
    pub async fn compress_many(
        &self,
        files: Vec<(PhotoSlot, PhotoFile)>,
    ) -> Vec<(PhotoSlot, Result<CapturedPhoto, MediaError>)> {
        let jobs = files
            .into_iter()
            .map(|(slot, file)| async move { (slot, self.compress(file).await) });
        futures::future::join_all(jobs).await
    }

    fn check(&self, file: &PhotoFile) -> Result<(), MediaError> {
        let mime = normalize_mime(&file.mime_type);
        if !self.settings.allowed_types.iter().any(|t| t.eq_ignore_ascii_case(&mime)) {
            return Err(MediaError::UnsupportedMediaType(file.mime_type.clone()));
        }

        let size = file.bytes.len() as u64;
        if size > self.settings.max_file_size {
            return Err(MediaError::FileTooLarge {
                size,
                max: self.settings.max_file_size,
            });
        }

        Ok(())
    }
}

/// デコード → 縮小 → JPEGエンコード（同期処理）
pub fn compress_image(bytes: &[u8], settings: &CompressionSettings) -> Result<CompressedImage, MediaError> {
    let img = image::load_from_memory(bytes).map_err(|e| MediaError::DecodeFailed(e.to_string()))?;

    let (width, height) = target_dimensions(img.width(), img.height(), settings.max_width);
    let img = if (width, height) != (img.width(), img.height()) {
        img.resize_exact(width, height, FilterType::Lanczos3)
    } else {
        img
    };

    // JPEGはアルファ非対応のためRGBに変換
    let rgb = img.to_rgb8();
    let mut buffer = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut buffer, settings.quality.clamp(1, 100));
        encoder
            .encode_image(&rgb)
            .map_err(|e| MediaError::EncodeFailed(e.to_string()))?;
    }

    Ok(CompressedImage {
        data_uri: encode_data_uri(OUTPUT_MIME_TYPE, &buffer),
        width,
        height,
        encoded_len: buffer.len(),
    })
}

/// "image/JPEG; name=x" → "image/jpeg"
fn normalize_mime(mime: &str) -> String {
    mime.split(';').next().unwrap_or_default().trim().to_lowercase()
}
