use crate::i18n::Locale;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fleetcheck")]
#[command(about = "車両点検の写真撮影・送信ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 有効な運転者を一覧表示
    Drivers,

    /// 運転者に割り当てられた車両を一覧表示
    Vehicles {
        /// 運転者ID
        #[arg(short, long, required = true)]
        driver: String,
    },

    /// 点検を送信
    Submit {
        /// 運転者ID（省略時は一覧から選択）
        #[arg(short, long)]
        driver: Option<String>,

        /// 車両ID（省略時は割当一覧から選択）
        #[arg(long)]
        vehicle: Option<String>,

        /// 写真フォルダ（front/back/right/left.* を自動割当）
        #[arg(short, long)]
        photos_dir: Option<PathBuf>,

        /// 前方写真
        #[arg(long)]
        front: Option<PathBuf>,

        /// 後方写真
        #[arg(long)]
        back: Option<PathBuf>,

        /// 右側写真
        #[arg(long)]
        right: Option<PathBuf>,

        /// 左側写真
        #[arg(long)]
        left: Option<PathBuf>,

        /// 備考（最大500文字）
        #[arg(short, long)]
        notes: Option<String>,

        /// 車両状態の申告に同意（省略時は確認プロンプト）
        #[arg(long)]
        accept_declaration: bool,
    },

    /// 写真1枚を圧縮してData URIを出力
    Compress {
        /// 入力画像
        #[arg(required = true)]
        file: PathBuf,

        /// 出力ファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// データストアURLを設定
        #[arg(long)]
        set_store_url: Option<String>,

        /// データストアAPIキーを設定
        #[arg(long)]
        set_store_key: Option<String>,

        /// Webhook URLを設定
        #[arg(long)]
        set_webhook_url: Option<String>,

        /// タイムアウト秒数を設定
        #[arg(long)]
        set_timeout: Option<u64>,
    },

    /// 表示言語を設定（省略時は切り替え）
    Language {
        #[arg(value_enum)]
        locale: Option<Locale>,
    },
}
