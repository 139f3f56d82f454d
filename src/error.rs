use crate::i18n::{Locale, Message};
use fleetcheck_common::PhotoSlot;
use thiserror::Error;

/// 入力検証エラー（ネットワーク呼び出し前に検出、状態は変更しない）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("driver not selected")]
    MissingDriver,

    #[error("vehicle not selected")]
    MissingVehicle,

    #[error("photos missing for slots: {}", join_slots(.missing))]
    IncompletePhotos { missing: Vec<PhotoSlot> },

    #[error("vehicle condition declaration not accepted")]
    DeclarationNotAccepted,

    #[error("notes too long: {len} characters (max {max})")]
    NotesTooLong { len: usize, max: usize },

    #[error("vehicle {0} is not assigned to the selected driver")]
    VehicleNotAssigned(String),

    #[error("unknown or inactive driver: {0}")]
    UnknownDriver(String),
}

impl ValidationError {
    pub fn localized(&self, locale: Locale) -> String {
        match self {
            ValidationError::MissingDriver | ValidationError::UnknownDriver(_) => {
                Message::SelectDriver.text(locale).to_string()
            }
            ValidationError::MissingVehicle => Message::SelectVehicle.text(locale).to_string(),
            ValidationError::IncompletePhotos { .. } => {
                Message::UploadAllPhotos.text(locale).to_string()
            }
            ValidationError::DeclarationNotAccepted => {
                Message::AcceptDeclaration.text(locale).to_string()
            }
            ValidationError::NotesTooLong { len, max } => {
                format!("{} ({} / {})", Message::NotesTooLong.text(locale), len, max)
            }
            ValidationError::VehicleNotAssigned(_) => {
                Message::VehicleNotAssigned.text(locale).to_string()
            }
        }
    }
}

/// 画像処理エラー（スロット単位で回復）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("file too large: {size} bytes (max {max})")]
    FileTooLarge { size: u64, max: u64 },

    #[error("image decode failed: {0}")]
    DecodeFailed(String),

    #[error("image encode failed: {0}")]
    EncodeFailed(String),
}

impl MediaError {
    pub fn localized(&self, locale: Locale) -> String {
        match self {
            MediaError::UnsupportedMediaType(_) => Message::UnsupportedMedia.text(locale).to_string(),
            MediaError::FileTooLarge { .. } => Message::FileTooLarge.text(locale).to_string(),
            MediaError::DecodeFailed(_) | MediaError::EncodeFailed(_) => {
                Message::PhotoUploadFailed.text(locale).to_string()
            }
        }
    }
}

/// 通信エラー（ストア書き込み / Webhook通知）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("store error: {0}")]
    Store(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP error! status: {status}")]
    Status { status: u16, body: String },

    #[error("{phase} timed out after {seconds}s")]
    Timeout { phase: &'static str, seconds: u64 },

    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

/// 送信処理のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("a submission is already in progress")]
    Busy,

    /// フェーズ1（ストア書き込み）失敗
    #[error("saving inspection failed: {0}")]
    Store(TransportError),

    /// フェーズ2（Webhook通知）失敗。ストア側の行は残る
    #[error("workflow notification failed: {0}")]
    Notify(TransportError),
}

impl SubmissionError {
    /// ユーザー向けメッセージ
    ///
    /// ストア失敗時はストアのメッセージを付加し、通知失敗時は汎用メッセージのみ。
    pub fn localized(&self, locale: Locale) -> String {
        match self {
            SubmissionError::Validation(e) => e.localized(locale),
            SubmissionError::Busy => Message::Submitting.text(locale).to_string(),
            SubmissionError::Store(e) => {
                format!("{}: {}", Message::SaveFailed.text(locale), store_detail(e))
            }
            SubmissionError::Notify(_) => Message::SubmissionFailed.text(locale).to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, SubmissionError::Validation(_))
    }
}

fn store_detail(error: &TransportError) -> String {
    match error {
        TransportError::Store(message) => message.clone(),
        other => other.to_string(),
    }
}

fn join_slots(slots: &[PhotoSlot]) -> String {
    slots.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
}

#[derive(Error, Debug)]
pub enum FleetCheckError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("{0} が設定されていません。`fleetcheck config` で設定してください")]
    MissingSetting(&'static str),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] fleetcheck_common::Error),
}

impl FleetCheckError {
    /// ユーザー向けメッセージ
    pub fn localized(&self, locale: Locale) -> String {
        match self {
            FleetCheckError::Config(_) | FleetCheckError::JsonParse(_) => {
                Message::ConfigLoadFailed.text(locale).to_string()
            }
            FleetCheckError::MissingSetting(name) => {
                format!("{}: {}", Message::MissingSetting.text(locale), name)
            }
            FleetCheckError::FileNotFound(path) => {
                format!("{}: {}", Message::PhotoFileNotFound.text(locale), path)
            }
            FleetCheckError::FolderNotFound(path) => {
                format!("{}: {}", Message::PhotoFolderNotFound.text(locale), path)
            }
            FleetCheckError::Validation(e) => e.localized(locale),
            FleetCheckError::Media(e) => e.localized(locale),
            FleetCheckError::Transport(_) => Message::ConnectionFailed.text(locale).to_string(),
            FleetCheckError::Submission(e) => e.localized(locale),
            FleetCheckError::Prompt(_) => Message::PromptFailed.text(locale).to_string(),
            FleetCheckError::Io(_) | FleetCheckError::Common(_) => {
                Message::FileAccessFailed.text(locale).to_string()
            }
        }
    }
}

impl From<dialoguer::Error> for FleetCheckError {
    fn from(e: dialoguer::Error) -> Self {
        FleetCheckError::Prompt(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FleetCheckError>;
