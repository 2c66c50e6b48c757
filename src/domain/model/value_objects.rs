use crate::domain::error::DomainError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

/// 予約の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingId(Uuid);

impl BookingId {
    /// 新しい一意のBookingIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから BookingId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からBookingIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

/// ゲストの一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GuestId(Uuid);

impl GuestId {
    /// 新しい一意のGuestIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから GuestId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からGuestIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for GuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for GuestId {
    fn default() -> Self {
        Self::new()
    }
}

/// キャンプ場の識別子
/// 外部から与えられるキーのため、正の整数であることのみ検証する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CampsiteId(i64);

impl CampsiteId {
    /// 正の整数からCampsiteIdを作成
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if value <= 0 {
            return Err(DomainError::InvalidValue(format!(
                "キャンプ場IDは正の整数である必要があります: {}",
                value
            )));
        }
        Ok(Self(value))
    }

    /// 内部の値を取得
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for CampsiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 宿泊タイプの識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccommodationTypeId(i64);

impl AccommodationTypeId {
    /// 正の整数からAccommodationTypeIdを作成
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if value <= 0 {
            return Err(DomainError::InvalidValue(format!(
                "宿泊タイプIDは正の整数である必要があります: {}",
                value
            )));
        }
        Ok(Self(value))
    }

    /// 内部の値を取得
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for AccommodationTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 区画（宿泊タイプの物理的な1単位）の識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpotId(i64);

impl SpotId {
    /// 正の整数からSpotIdを作成
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if value <= 0 {
            return Err(DomainError::InvalidValue(format!(
                "区画IDは正の整数である必要があります: {}",
                value
            )));
        }
        Ok(Self(value))
    }

    /// 内部の値を取得
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for SpotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 通貨
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    /// デンマーククローネ
    #[allow(clippy::upper_case_acronyms)]
    DKK,
}

/// 金額を表す値オブジェクト
/// 正確な小数演算のためDecimalを使用する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// 金額と通貨から作成
    pub fn new(amount: Decimal, currency: String) -> Result<Self, DomainError> {
        let currency = match currency.as_str() {
            "DKK" => Currency::DKK,
            _ => {
                return Err(DomainError::InvalidValue(format!(
                    "サポートされていない通貨: {}",
                    currency
                )))
            }
        };
        Ok(Self { amount, currency })
    }

    /// デンマーククローネの金額を作成
    pub fn dkk(amount: Decimal) -> Self {
        Self {
            amount,
            currency: Currency::DKK,
        }
    }

    /// ゼロ金額を作成
    pub fn zero() -> Self {
        Self::dkk(Decimal::ZERO)
    }

    /// 金額を取得
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// 通貨を文字列として取得
    pub fn currency(&self) -> String {
        match self.currency {
            Currency::DKK => "DKK".to_string(),
        }
    }

    /// 金額が負かどうか
    pub fn is_negative(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    /// 金額を加算
    pub fn add(&self, other: &Money) -> Result<Money, DomainError> {
        if self.currency != other.currency {
            return Err(DomainError::CurrencyMismatch);
        }
        Ok(Money {
            amount: self.amount + other.amount,
            currency: self.currency,
        })
    }

    /// 金額を減算
    pub fn subtract(&self, other: &Money) -> Result<Money, DomainError> {
        if self.currency != other.currency {
            return Err(DomainError::CurrencyMismatch);
        }
        Ok(Money {
            amount: self.amount - other.amount,
            currency: self.currency,
        })
    }

    /// 係数を乗算
    pub fn multiply(&self, factor: Decimal) -> Money {
        Money {
            amount: self.amount * factor,
            currency: self.currency,
        }
    }
}

/// 滞在期間を表す値オブジェクト
/// 開始日を含み、終了日を含まない（チェックアウト日は宿泊しない）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// 新しい滞在期間を作成
    /// 終了日は開始日より後である必要がある
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if end <= start {
            return Err(DomainError::InvalidRange(format!(
                "終了日({})は開始日({})より後である必要があります",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// 開始日（チェックイン）を取得
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// 終了日（チェックアウト、宿泊しない日）を取得
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// 宿泊数を計算
    pub fn nights(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// 宿泊する各日付を開始日から順に返す
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.start.iter_days().take_while(|d| *d < self.end).collect()
    }

    /// 指定日が滞在期間に含まれるか（終了日は含まない）
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// 予約のステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    /// 保留中（作成直後）
    Pending,
    /// 確定済み（区画割り当て・空き枠予約済み）
    Confirmed,
    /// キャンセル済み
    Cancelled,
    /// 滞在完了
    Completed,
}

impl BookingStatus {
    /// 指定されたステータスへ遷移可能かどうか
    /// 遷移表:
    /// - Pending   → Confirmed | Cancelled
    /// - Confirmed → Cancelled | Completed
    /// - Cancelled / Completed は終端（同一状態への再遷移も不可）
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
        )
    }

    /// 文字列からBookingStatusを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "Pending" => Ok(BookingStatus::Pending),
            "Confirmed" => Ok(BookingStatus::Confirmed),
            "Cancelled" => Ok(BookingStatus::Cancelled),
            "Completed" => Ok(BookingStatus::Completed),
            _ => Err(DomainError::InvalidValue(format!(
                "無効な予約ステータス: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status_str = match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Cancelled => "Cancelled",
            BookingStatus::Completed => "Completed",
        };
        write!(f, "{}", status_str)
    }
}
