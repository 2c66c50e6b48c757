/// エラー種別
/// 呼び出し側がユーザー向けメッセージを選択するための分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 入力値の検証エラー
    Validation,
    /// 状態遷移の違反
    InvalidTransition,
    /// 在庫・空き状況のエラー
    Capacity,
    /// 割引ポリシーのエラー
    Policy,
}

/// ドメイン層のエラー型
/// ビジネスルール違反を表現する
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// 無効な予約状態遷移（例: 完了済みの予約をキャンセルしようとした）
    InvalidTransition(String),
    /// 無効な滞在期間（チェックインが過去日付など）
    InvalidStayPeriod(String),
    /// 無効な人数（大人1〜10名、子供0〜10名の範囲外）
    InvalidPartySize(String),
    /// 区画が未割り当てのまま確定しようとした
    MissingAssignment,
    /// 金額が負
    NegativeAmount,
    /// 過去日付の空き枠を作成しようとした
    PastDate,
    /// 負のキャパシティ
    NegativeCapacity,
    /// 無効な数量（0以下）
    InvalidCount,
    /// 空き不足
    InsufficientAvailability,
    /// 予約済み数を超える解放
    OverRelease,
    /// 無効な日付範囲（終了が開始以前）
    InvalidRange(String),
    /// 0以下の基本価格
    NonPositivePrice,
    /// 0以下の価格係数
    NonPositiveModifier,
    /// メンテナンス中の区画への操作
    UnderMaintenance,
    /// 最低予約金額未満
    BelowMinimum,
    /// 割引コードの使用上限到達
    UsageExhausted,
    /// 通貨の不一致
    CurrencyMismatch,
    /// 無効な値
    InvalidValue(String),
    /// リポジトリ操作の失敗（ドメインサービス内での永続化エラー）
    RepositoryError(String),
}

impl DomainError {
    /// エラー種別を返す
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::InvalidTransition(_) | DomainError::MissingAssignment => {
                ErrorKind::InvalidTransition
            }
            DomainError::InsufficientAvailability | DomainError::OverRelease => ErrorKind::Capacity,
            DomainError::BelowMinimum | DomainError::UsageExhausted => ErrorKind::Policy,
            _ => ErrorKind::Validation,
        }
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::InvalidTransition(msg) => write!(f, "Invalid transition: {}", msg),
            DomainError::InvalidStayPeriod(msg) => write!(f, "Invalid stay period: {}", msg),
            DomainError::InvalidPartySize(msg) => write!(f, "Invalid party size: {}", msg),
            DomainError::MissingAssignment => write!(f, "No accommodation spot assigned"),
            DomainError::NegativeAmount => write!(f, "Amount must not be negative"),
            DomainError::PastDate => write!(f, "Date lies in the past"),
            DomainError::NegativeCapacity => write!(f, "Capacity must not be negative"),
            DomainError::InvalidCount => write!(f, "Count must be greater than zero"),
            DomainError::InsufficientAvailability => write!(f, "Insufficient availability"),
            DomainError::OverRelease => write!(f, "Release exceeds reserved units"),
            DomainError::InvalidRange(msg) => write!(f, "Invalid date range: {}", msg),
            DomainError::NonPositivePrice => write!(f, "Price must be greater than zero"),
            DomainError::NonPositiveModifier => {
                write!(f, "Price modifier must be greater than zero")
            }
            DomainError::UnderMaintenance => write!(f, "Spot is under maintenance"),
            DomainError::BelowMinimum => write!(f, "Amount below discount minimum"),
            DomainError::UsageExhausted => write!(f, "Discount usage limit reached"),
            DomainError::CurrencyMismatch => write!(f, "Currency mismatch"),
            DomainError::InvalidValue(msg) => write!(f, "Invalid value: {}", msg),
            DomainError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
