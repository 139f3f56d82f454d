//! 点検送信コントローラ
//!
//! 状態遷移: Idle → Validating → Submitting → Succeeded | Failed
//!
//! - 検証に失敗した場合は状態を変えず、ネットワーク呼び出しも行わない
//! - フェーズ1（ストア書き込み）が成功した場合のみフェーズ2（Webhook通知）を行う
//! - 失敗時は入力データを保持し、そのまま再送信できる
//! - 成功時はリセット待ち時間の後、写真・選択・備考・同意をすべてクリアする
//!
//! 点検コードは下書きごとに1回だけ生成し、再送信でも同じコードを使う。
//! ストアは点検コードで upsert するため、フェーズ2失敗後の再送信で行が重複しない。

mod state;

pub use state::{SubmissionSettings, SubmissionState};

use crate::backend::{InspectionStore, StoredInspection, WorkflowNotifier};
use crate::compressor::{ImageCompressor, PhotoFile};
use crate::error::{MediaError, Result, SubmissionError, TransportError, ValidationError};
use crate::i18n::{notes_counter, Locale};
use crate::photos::PhotoSlotStore;
use crate::selection::{AssignmentLoad, Roster, SelectionState};
use chrono::{DateTime, SecondsFormat, Utc};
use fleetcheck_common::{Driver, InspectionRecord, PhotoSlot, RecordId, Vehicle};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// 送信成功時の控え
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    pub inspection_code: String,
    pub timestamp: String,
    pub stored_id: RecordId,
}

pub struct SubmissionController {
    photos: PhotoSlotStore,
    selection: SelectionState,
    drivers: Roster<Driver>,
    notes: String,
    declaration_accepted: bool,
    /// 現在の下書きの点検コード（最初の送信試行で確定）
    pending_code: Option<String>,
    compressor: ImageCompressor,
    store: Arc<dyn InspectionStore>,
    notifier: Arc<dyn WorkflowNotifier>,
    settings: SubmissionSettings,
    clock: fn() -> DateTime<Utc>,
    state_tx: watch::Sender<SubmissionState>,
}

impl SubmissionController {
    pub fn new(store: Arc<dyn InspectionStore>, notifier: Arc<dyn WorkflowNotifier>) -> Self {
        let (state_tx, _) = watch::channel(SubmissionState::Idle);
        Self {
            photos: PhotoSlotStore::new(),
            selection: SelectionState::new(),
            drivers: Roster::default(),
            notes: String::new(),
            declaration_accepted: false,
            pending_code: None,
            compressor: ImageCompressor::default(),
            store,
            notifier,
            settings: SubmissionSettings::default(),
            clock: Utc::now,
            state_tx,
        }
    }

    pub fn with_settings(mut self, settings: SubmissionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_compressor(mut self, compressor: ImageCompressor) -> Self {
        self.compressor = compressor;
        self
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    // =============================================
    // 状態
    // =============================================

    pub fn state(&self) -> SubmissionState {
        *self.state_tx.borrow()
    }

    /// 状態遷移の購読（送信ボタンの有効/無効などに使う）
    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.state_tx.subscribe()
    }

    /// 送信可能か（Idle / Failed のみ）
    ///
    /// 成功後は `finish` を待つまで `Succeeded` のままで、送信は `Busy` になる。
    pub fn can_submit(&self) -> bool {
        self.state().accepts_submit()
    }

    fn transition(&self, next: SubmissionState) {
        let previous = self.state_tx.send_replace(next);
        if previous != next {
            tracing::debug!(from = %previous, to = %next, "submission state changed");
        }
    }

    // =============================================
    // 運転者・車両
    // =============================================

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn drivers(&self) -> &Roster<Driver> {
        &self.drivers
    }

    /// 有効な運転者一覧を読み込む
    pub async fn load_drivers(&mut self) -> std::result::Result<&Roster<Driver>, TransportError> {
        let drivers = within(self.settings.timeout, "loading drivers", self.store.list_active_drivers()).await?;
        if drivers.is_empty() {
            tracing::warn!("no active drivers found");
        }
        self.drivers = Roster::new(drivers);
        Ok(&self.drivers)
    }

    /// 運転者を選択し、割当車両を読み込む
    ///
    /// 同じ運転者の再選択では読み込み済みの一覧を使う。前回の読み込みが
    /// 失敗していた場合は再読み込みする。
    pub async fn choose_driver(&mut self, driver: Option<Driver>) -> Result<AssignmentLoad> {
        let changed = self.selection.select_identity(driver);
        let Some(driver_id) = self.selection.driver().map(|d| d.id.clone()) else {
            return Ok(AssignmentLoad::Empty);
        };

        if !changed && self.selection.assignments_loaded() {
            return Ok(match self.selection.assignments().len() {
                0 => AssignmentLoad::Empty,
                n => AssignmentLoad::Choices(n),
            });
        }

        tracing::info!(driver = %driver_id, "driver selected");
        let vehicles = within(
            self.settings.timeout,
            "loading vehicles",
            self.store.list_assigned_vehicles(&driver_id),
        )
        .await?;
        Ok(self.selection.load_assignments(&driver_id, vehicles))
    }

    /// 読み込み済みの運転者一覧からIDで選択
    pub async fn choose_driver_by_id(&mut self, id: &RecordId) -> Result<AssignmentLoad> {
        let driver = self
            .drivers
            .get(id)
            .cloned()
            .ok_or_else(|| ValidationError::UnknownDriver(id.to_string()))?;
        self.choose_driver(Some(driver)).await
    }

    pub fn choose_vehicle(&mut self, vehicle: Option<Vehicle>) -> std::result::Result<(), ValidationError> {
        self.selection.select_asset(vehicle)
    }

    pub fn choose_vehicle_by_id(&mut self, id: &RecordId) -> std::result::Result<(), ValidationError> {
        self.selection.select_asset_by_id(id)
    }

    // =============================================
    // 写真
    // =============================================

    pub fn photos(&self) -> &PhotoSlotStore {
        &self.photos
    }

    /// 写真を圧縮してスロットに格納。失敗時はスロットを変更しない
    pub async fn attach_photo(&mut self, slot: PhotoSlot, file: PhotoFile) -> std::result::Result<(), MediaError> {
        match self.compressor.compress(file).await {
            Ok(photo) => {
                tracing::info!(slot = %slot, file = %photo.original_filename, "photo uploaded");
                self.photos.set(slot, photo);
                Ok(())
            }
            Err(e) => {
                tracing::error!(slot = %slot, error = %e, "error uploading photo");
                Err(e)
            }
        }
    }

    /// 複数スロットを並行して圧縮し、成功したものだけ格納
    pub async fn attach_photos(
        &mut self,
        files: Vec<(PhotoSlot, PhotoFile)>,
    ) -> Vec<(PhotoSlot, std::result::Result<(), MediaError>)> {
        let results = self.compressor.compress_many(files).await;

        results
            .into_iter()
            .map(|(slot, result)| match result {
                Ok(photo) => {
                    tracing::info!(slot = %slot, file = %photo.original_filename, "photo uploaded");
                    self.photos.set(slot, photo);
                    (slot, Ok(()))
                }
                Err(e) => {
                    tracing::error!(slot = %slot, error = %e, "error uploading photo");
                    (slot, Err(e))
                }
            })
            .collect()
    }

    pub fn clear_photo(&mut self, slot: PhotoSlot) {
        self.photos.clear(slot);
    }

    // =============================================
    // 備考・同意
    // =============================================

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    /// 文字数カウンタ表示
    pub fn notes_counter(&self, locale: Locale) -> String {
        notes_counter(self.notes.chars().count(), self.settings.notes_max_chars, locale)
    }

    pub fn declaration_accepted(&self) -> bool {
        self.declaration_accepted
    }

    pub fn set_declaration(&mut self, accepted: bool) {
        self.declaration_accepted = accepted;
    }

    pub fn pending_code(&self) -> Option<&str> {
        self.pending_code.as_deref()
    }

    // =============================================
    // 検証・送信
    // =============================================

    /// 送信前検証（運転者 → 車両 → 写真 → 同意 → 備考の順）
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.selection.driver().is_none() {
            return Err(ValidationError::MissingDriver);
        }
        if self.selection.vehicle().is_none() {
            return Err(ValidationError::MissingVehicle);
        }
        if !self.photos.is_complete() {
            return Err(ValidationError::IncompletePhotos {
                missing: self.photos.missing(),
            });
        }
        if !self.declaration_accepted {
            return Err(ValidationError::DeclarationNotAccepted);
        }
        let len = self.notes.chars().count();
        if len > self.settings.notes_max_chars {
            return Err(ValidationError::NotesTooLong {
                len,
                max: self.settings.notes_max_chars,
            });
        }
        Ok(())
    }

    fn assemble(&self, inspection_code: String, timestamp: String) -> std::result::Result<InspectionRecord, ValidationError> {
        let driver = self.selection.driver().ok_or(ValidationError::MissingDriver)?;
        let vehicle = self.selection.vehicle().ok_or(ValidationError::MissingVehicle)?;
        let photos = self.photos.snapshot().ok_or_else(|| ValidationError::IncompletePhotos {
            missing: self.photos.missing(),
        })?;

        Ok(InspectionRecord {
            inspection_code,
            timestamp,
            driver_id: driver.id.clone(),
            driver_code: driver.code.clone(),
            driver_name: driver.display_name.clone(),
            vehicle_id: vehicle.id.clone(),
            van_code: vehicle.code.clone(),
            plate_number: vehicle.plate_number.clone(),
            location: vehicle.location.clone(),
            notes: self.notes.clone(),
            declaration_accepted: self.declaration_accepted,
            photos,
        })
    }

    /// 2段階送信を実行
    ///
    /// 成功時は `Succeeded` のまま戻る。自動ではリセットされないため、呼び出し側は
    /// 必ず `finish` を待つこと（リセット待ち時間の後にクリアして Idle に戻る）。
    /// `finish` を呼ばない限り、以降の送信はすべて `SubmissionError::Busy` になる。
    pub async fn submit(&mut self) -> std::result::Result<SubmissionReceipt, SubmissionError> {
        if !self.can_submit() {
            return Err(SubmissionError::Busy);
        }

        if let Err(e) = self.validate() {
            tracing::warn!(error = %e, "submission blocked by validation");
            return Err(e.into());
        }

        self.transition(SubmissionState::Validating);
        let now = (self.clock)();
        let code = self
            .pending_code
            .get_or_insert_with(|| inspection_code(now))
            .clone();
        let record = match self.assemble(code, iso_timestamp(now)) {
            Ok(record) => record,
            Err(e) => {
                self.transition(SubmissionState::Idle);
                return Err(e.into());
            }
        };

        self.transition(SubmissionState::Submitting);
        tracing::info!(code = %record.inspection_code, "submitting inspection");

        // フェーズ1: ストア書き込み
        let stored: StoredInspection = match within(
            self.settings.timeout,
            "saving inspection",
            self.store.insert_inspection(&record.to_row()),
        )
        .await
        {
            Ok(stored) => stored,
            Err(e) => return Err(self.fail(SubmissionError::Store(e))),
        };
        tracing::info!(code = %record.inspection_code, id = %stored.id, "saved to store");

        // フェーズ2: Webhook通知（フェーズ1の行はロールバックしない）
        if let Err(e) = within(self.settings.timeout, "workflow notification", self.notifier.notify(&record)).await {
            return Err(self.fail(SubmissionError::Notify(e)));
        }

        self.transition(SubmissionState::Succeeded);
        tracing::info!(code = %record.inspection_code, "inspection submitted");

        Ok(SubmissionReceipt {
            inspection_code: record.inspection_code,
            timestamp: record.timestamp,
            stored_id: stored.id,
        })
    }

    fn fail(&self, error: SubmissionError) -> SubmissionError {
        tracing::error!(error = %error, "error submitting inspection");
        self.transition(SubmissionState::Failed);
        error
    }

    /// 成功表示の待ち時間の後にフォームをリセット
    pub async fn finish(&mut self) {
        if self.state() != SubmissionState::Succeeded {
            return;
        }
        tokio::time::sleep(self.settings.reset_delay).await;
        self.reset();
    }

    /// 下書きをすべて破棄して Idle に戻す
    pub fn reset(&mut self) {
        self.photos.clear_all();
        self.selection.clear();
        self.notes.clear();
        self.declaration_accepted = false;
        self.pending_code = None;
        self.transition(SubmissionState::Idle);
        tracing::info!("form reset");
    }
}

/// 時刻由来の点検コード: "INS-<エポックミリ秒>"
pub fn inspection_code(now: DateTime<Utc>) -> String {
    format!("INS-{}", now.timestamp_millis())
}

/// ISO-8601（UTC、ミリ秒、Z付き）
pub fn iso_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

async fn within<T>(
    timeout: Duration,
    phase: &'static str,
    operation: impl Future<Output = std::result::Result<T, TransportError>>,
) -> std::result::Result<T, TransportError> {
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::Timeout {
            phase,
            seconds: timeout.as_secs(),
        }),
    }
}
