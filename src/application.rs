// アプリケーション層
// ユースケースの編成とエラー変換

pub mod error;
pub mod service;

pub use error::ApplicationError;
