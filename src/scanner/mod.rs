//! 写真フォルダのスキャン
//!
//! ファイル名（拡張子を除く）が front / back / right / left のファイルを
//! 対応するスロットに割り当てる。"rear" は back として扱う。

use crate::compressor::PhotoFile;
use crate::error::{FleetCheckError, Result};
use fleetcheck_common::PhotoSlot;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 拡張子からMIMEタイプを推定
pub fn mime_from_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

/// ファイル名からスロットを判定
pub fn slot_from_path(path: &Path) -> Option<PhotoSlot> {
    path.file_stem()?.to_string_lossy().parse().ok()
}

/// 写真ファイルを読み込む
pub fn read_photo_file(path: &Path) -> Result<PhotoFile> {
    if !path.is_file() {
        return Err(FleetCheckError::FileNotFound(path.display().to_string()));
    }

    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    Ok(PhotoFile {
        file_name,
        mime_type: mime_from_extension(path).to_string(),
        bytes,
    })
}

/// フォルダ直下の写真をスロットに割り当てる（スロット順）
///
/// 同じスロットに複数ファイルがある場合はファイル名順で最初のものを使う。
pub fn scan_photo_folder(folder: &Path) -> Result<Vec<(PhotoSlot, PathBuf)>> {
    if !folder.is_dir() {
        return Err(FleetCheckError::FolderNotFound(folder.display().to_string()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(1) // 直下のみ
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect();
    files.sort();

    let mut found: Vec<(PhotoSlot, PathBuf)> = Vec::new();
    for path in files {
        let Some(slot) = slot_from_path(&path) else {
            continue;
        };
        if found.iter().any(|(s, _)| *s == slot) {
            tracing::debug!(path = %path.display(), slot = %slot, "duplicate slot file skipped");
            continue;
        }
        found.push((slot, path));
    }

    found.sort_by_key(|(slot, _)| slot.index());
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(mime_from_extension(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(mime_from_extension(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(mime_from_extension(Path::new("a.png")), "image/png");
        assert_eq!(mime_from_extension(Path::new("a.webp")), "image/webp");
        assert_eq!(mime_from_extension(Path::new("a.gif")), "image/gif");
        assert_eq!(mime_from_extension(Path::new("a")), "application/octet-stream");
    }

    #[test]
    fn test_slot_from_path() {
        assert_eq!(slot_from_path(Path::new("/x/Front.jpg")), Some(PhotoSlot::Front));
        assert_eq!(slot_from_path(Path::new("rear.png")), Some(PhotoSlot::Back));
        assert_eq!(slot_from_path(Path::new("left.webp")), Some(PhotoSlot::Left));
        assert_eq!(slot_from_path(Path::new("interior.jpg")), None);
    }

    #[test]
    fn test_read_photo_file_not_found() {
        let err = read_photo_file(Path::new("/nonexistent/front.jpg")).unwrap_err();
        assert!(matches!(err, FleetCheckError::FileNotFound(_)));
    }
}
