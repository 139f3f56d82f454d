//! 外部連携（永続ストア / ワークフローWebhook）
//!
//! コントローラはトレイト越しに呼び出すため、テストではインメモリの代替実装に差し替えられる。

mod supabase;
mod webhook;

pub use supabase::SupabaseStore;
pub use webhook::WebhookNotifier;

use crate::error::TransportError;
use async_trait::async_trait;
use fleetcheck_common::{Driver, InspectionRow, RecordId, Vehicle};

/// ストアに保存された点検行
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct StoredInspection {
    pub id: RecordId,
    #[serde(default)]
    pub inspection_code: String,
}

/// 永続ストア
#[async_trait]
pub trait InspectionStore: Send + Sync {
    /// 有効な運転者一覧（氏名順）
    async fn list_active_drivers(&self) -> Result<Vec<Driver>, TransportError>;

    /// 運転者に現在割り当てられている車両一覧
    async fn list_assigned_vehicles(&self, driver_id: &RecordId) -> Result<Vec<Vehicle>, TransportError>;

    /// 点検行を書き込み、保存された行を返す
    ///
    /// 同じ `inspection_code` の行が既にあれば更新する（再送信で重複行を作らない）。
    async fn insert_inspection(&self, row: &InspectionRow) -> Result<StoredInspection, TransportError>;
}

/// ワークフロー通知
#[async_trait]
pub trait WorkflowNotifier: Send + Sync {
    /// 点検レコード全体（写真を含む）を送信。2xx以外は失敗
    async fn notify(&self, record: &fleetcheck_common::InspectionRecord) -> Result<(), TransportError>;
}

/// reqwestのエラーを分類
pub(crate) fn classify_reqwest_error(
    error: reqwest::Error,
    phase: &'static str,
    timeout: std::time::Duration,
) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout {
            phase,
            seconds: timeout.as_secs(),
        }
    } else if let Some(status) = error.status() {
        TransportError::Status {
            status: status.as_u16(),
            body: error.to_string(),
        }
    } else {
        TransportError::Network(error.to_string())
    }
}
