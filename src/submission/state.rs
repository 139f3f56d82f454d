use std::fmt;
use std::time::Duration;

/// 送信状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    /// 入力データは保持されたまま。再送信可能
    Failed,
}

impl SubmissionState {
    /// 送信ボタンを有効にできるか
    pub fn accepts_submit(&self) -> bool {
        matches!(self, SubmissionState::Idle | SubmissionState::Failed)
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Validating => "validating",
            SubmissionState::Submitting => "submitting",
            SubmissionState::Succeeded => "succeeded",
            SubmissionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// 送信設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionSettings {
    /// ストア書き込み・Webhook通知それぞれのタイムアウト
    pub timeout: Duration,
    /// 成功表示からリセットまでの待ち時間
    pub reset_delay: Duration,
    /// 備考の最大文字数
    pub notes_max_chars: usize,
}

impl Default for SubmissionSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            reset_delay: Duration::from_secs(2),
            notes_max_chars: 500,
        }
    }
}
