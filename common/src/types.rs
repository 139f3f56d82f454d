//! 点検データの型定義
//!
//! CLIと他のフロントエンドで共有される型:
//! - PhotoSlot / CapturedPhoto: 4方向の車両写真
//! - Driver / Vehicle: 外部ストアから読み込むマスタ（読み取り専用）
//! - InspectionRecord: Webhookへ送信する点検レコード
//! - InspectionRow: ストアの inspections テーブルへ書き込む行

use crate::error::Error;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// 写真スロット（車両の撮影方向）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoSlot {
    Front,
    Back,
    Right,
    Left,
}

impl PhotoSlot {
    /// 全スロット（表示・送信順）
    pub const ALL: [PhotoSlot; 4] = [PhotoSlot::Front, PhotoSlot::Back, PhotoSlot::Right, PhotoSlot::Left];

    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoSlot::Front => "front",
            PhotoSlot::Back => "back",
            PhotoSlot::Right => "right",
            PhotoSlot::Left => "left",
        }
    }

    /// スロット配列のインデックス
    pub fn index(&self) -> usize {
        match self {
            PhotoSlot::Front => 0,
            PhotoSlot::Back => 1,
            PhotoSlot::Right => 2,
            PhotoSlot::Left => 3,
        }
    }
}

impl fmt::Display for PhotoSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PhotoSlot {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "front" => Ok(PhotoSlot::Front),
            "back" | "rear" => Ok(PhotoSlot::Back),
            "right" => Ok(PhotoSlot::Right),
            "left" => Ok(PhotoSlot::Left),
            _ => Err(Error::UnknownSlot(s.to_string())),
        }
    }
}

/// 圧縮済み写真
///
/// 一度作成したら変更しない。同じスロットへの再アップロードは丸ごと置き換える。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedPhoto {
    /// Data URI（"data:image/jpeg;base64,..."）
    #[serde(rename = "base64")]
    pub encoded_image: String,

    /// 元ファイル名
    #[serde(rename = "filename")]
    pub original_filename: String,

    /// 元ファイルのバイト数（圧縮前）
    #[serde(rename = "size")]
    pub original_byte_size: u64,
}

/// ストアのレコードID
///
/// テーブルによって整数またはUUID文字列になるため、文字列として保持する。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => RecordId(s),
            Raw::Number(n) => RecordId(n.to_string()),
        })
    }
}

/// 運転者（drivers テーブル）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: RecordId,

    #[serde(rename = "full_name")]
    pub display_name: String,

    #[serde(rename = "driver_code", default)]
    pub code: String,

    #[serde(rename = "is_active", default)]
    pub active: bool,
}

impl Driver {
    /// ピッカー表示用ラベル: "氏名 (コード)"
    pub fn label(&self) -> String {
        format!("{} ({})", self.display_name, self.code)
    }
}

/// 車両（vehicles テーブル）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: RecordId,

    #[serde(rename = "van_code", default)]
    pub code: String,

    #[serde(default)]
    pub plate_number: String,

    #[serde(default)]
    pub location: String,

    #[serde(default)]
    pub status: String,
}

impl Vehicle {
    /// ピッカー表示用ラベル: "コード - ナンバー"
    pub fn label(&self) -> String {
        format!("{} - {}", self.code, self.plate_number)
    }
}

/// 4方向すべてが揃った写真セット
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionPhotos {
    pub front: CapturedPhoto,
    pub back: CapturedPhoto,
    pub right: CapturedPhoto,
    pub left: CapturedPhoto,
}

impl InspectionPhotos {
    pub fn get(&self, slot: PhotoSlot) -> &CapturedPhoto {
        match slot {
            PhotoSlot::Front => &self.front,
            PhotoSlot::Back => &self.back,
            PhotoSlot::Right => &self.right,
            PhotoSlot::Left => &self.left,
        }
    }
}

/// Webhookへ送信する点検レコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionRecord {
    pub inspection_code: String,
    /// ISO-8601 (UTC, ミリ秒付き)
    pub timestamp: String,
    pub driver_id: RecordId,
    pub driver_code: String,
    pub driver_name: String,
    pub vehicle_id: RecordId,
    pub van_code: String,
    pub plate_number: String,
    pub location: String,
    pub notes: String,
    pub declaration_accepted: bool,
    pub photos: InspectionPhotos,
}

impl InspectionRecord {
    /// ストアへ書き込む行（写真データは含まない）
    pub fn to_row(&self) -> InspectionRow {
        InspectionRow {
            inspection_code: self.inspection_code.clone(),
            driver_id: self.driver_id.clone(),
            vehicle_id: self.vehicle_id.clone(),
            timestamp: self.timestamp.clone(),
            location: self.location.clone(),
            notes: self.notes.clone(),
            declaration_accepted: self.declaration_accepted,
        }
    }
}

/// inspections テーブルの行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionRow {
    pub inspection_code: String,
    pub driver_id: RecordId,
    pub vehicle_id: RecordId,
    pub timestamp: String,
    pub location: String,
    pub notes: String,
    pub declaration_accepted: bool,
}
