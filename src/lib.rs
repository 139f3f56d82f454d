//! FleetCheck - 車両点検の記録・送信
//!
//! 運転者と担当車両を選び、4方向の写真を圧縮して添付し、
//! データストアへの保存とワークフロー通知の2段階で送信する。

pub mod backend;
pub mod cli;
pub mod compressor;
pub mod config;
pub mod error;
pub mod i18n;
pub mod photos;
pub mod scanner;
pub mod selection;
pub mod submission;
