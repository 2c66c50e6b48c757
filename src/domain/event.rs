use crate::domain::model::{
    AccommodationTypeId, BookingId, CampsiteId, DateRange, GuestId, Money, SpotId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// イベントメタデータ
/// すべてのドメインイベントに付与される共通情報
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// イベントの一意識別子（冪等性チェックに使用）
    pub event_id: Uuid,
    /// 処理フロー全体を追跡するための相関ID
    pub correlation_id: Uuid,
    /// イベントスキーマのバージョン
    pub event_version: u32,
    /// イベント発生日時
    pub occurred_at: DateTime<Utc>,
}

impl EventMetadata {
    /// 新しいメタデータを作成
    pub fn new() -> Self {
        Self {
            event_id: Uuid::new_v4(),
            correlation_id: Uuid::new_v4(),
            event_version: 1,
            occurred_at: Utc::now(),
        }
    }

    /// 相関IDを指定してメタデータを作成
    pub fn with_correlation_id(correlation_id: Uuid) -> Self {
        Self {
            correlation_id,
            ..Self::new()
        }
    }
}

impl Default for EventMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// ドメインイベント列挙型
/// ビジネス上の重要なイベントを表現する
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "event_data")]
pub enum DomainEvent {
    /// 予約が作成された
    BookingCreated(BookingCreated),
    /// 予約が確定された
    BookingConfirmed(BookingConfirmed),
    /// 予約がキャンセルされた
    BookingCancelled(BookingCancelled),
}

impl DomainEvent {
    /// イベントタイプ名を取得
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::BookingCreated(_) => "BookingCreated",
            DomainEvent::BookingConfirmed(_) => "BookingConfirmed",
            DomainEvent::BookingCancelled(_) => "BookingCancelled",
        }
    }

    /// メタデータを取得
    pub fn metadata(&self) -> &EventMetadata {
        match self {
            DomainEvent::BookingCreated(e) => &e.metadata,
            DomainEvent::BookingConfirmed(e) => &e.metadata,
            DomainEvent::BookingCancelled(e) => &e.metadata,
        }
    }

    /// メタデータを可変で取得（相関IDの設定に使用）
    pub fn metadata_mut(&mut self) -> &mut EventMetadata {
        match self {
            DomainEvent::BookingCreated(e) => &mut e.metadata,
            DomainEvent::BookingConfirmed(e) => &mut e.metadata,
            DomainEvent::BookingCancelled(e) => &mut e.metadata,
        }
    }
}

/// 予約作成イベント
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingCreated {
    /// 予約ID
    pub booking_id: BookingId,
    /// ゲストID
    pub guest_id: GuestId,
    /// キャンプ場ID
    pub campsite_id: CampsiteId,
    /// 宿泊タイプID
    pub accommodation_type_id: AccommodationTypeId,
    /// 滞在期間
    pub stay_period: DateRange,
    /// メタデータ
    pub metadata: EventMetadata,
}

impl BookingCreated {
    /// 新しい予約作成イベントを作成
    pub fn new(
        booking_id: BookingId,
        guest_id: GuestId,
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
        stay_period: DateRange,
    ) -> Self {
        Self {
            booking_id,
            guest_id,
            campsite_id,
            accommodation_type_id,
            stay_period,
            metadata: EventMetadata::new(),
        }
    }
}

/// 予約確定イベント
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfirmed {
    /// 予約ID
    pub booking_id: BookingId,
    /// ゲストID
    pub guest_id: GuestId,
    /// キャンプ場ID
    pub campsite_id: CampsiteId,
    /// 宿泊タイプID
    pub accommodation_type_id: AccommodationTypeId,
    /// 割り当て済みの区画ID
    pub spot_id: SpotId,
    /// 滞在期間
    pub stay_period: DateRange,
    /// 確定時の合計金額
    pub total_amount: Money,
    /// メタデータ
    pub metadata: EventMetadata,
}

impl BookingConfirmed {
    /// 新しい予約確定イベントを作成
    pub fn new(
        booking_id: BookingId,
        guest_id: GuestId,
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
        spot_id: SpotId,
        stay_period: DateRange,
        total_amount: Money,
    ) -> Self {
        Self {
            booking_id,
            guest_id,
            campsite_id,
            accommodation_type_id,
            spot_id,
            stay_period,
            total_amount,
            metadata: EventMetadata::new(),
        }
    }
}

/// 予約キャンセルイベント
/// 確定済みの予約のキャンセル時は空き枠の解放に使用される
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingCancelled {
    /// 予約ID
    pub booking_id: BookingId,
    /// ゲストID
    pub guest_id: GuestId,
    /// キャンプ場ID
    pub campsite_id: CampsiteId,
    /// 宿泊タイプID
    pub accommodation_type_id: AccommodationTypeId,
    /// 割り当てられていた区画ID（未割り当てならNone）
    pub spot_id: Option<SpotId>,
    /// 滞在期間
    pub stay_period: DateRange,
    /// キャンセル前に確定済みだったか（空き枠解放の要否）
    pub was_confirmed: bool,
    /// メタデータ
    pub metadata: EventMetadata,
}

impl BookingCancelled {
    /// 新しい予約キャンセルイベントを作成
    pub fn new(
        booking_id: BookingId,
        guest_id: GuestId,
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
        spot_id: Option<SpotId>,
        stay_period: DateRange,
        was_confirmed: bool,
    ) -> Self {
        Self {
            booking_id,
            guest_id,
            campsite_id,
            accommodation_type_id,
            spot_id,
            stay_period,
            was_confirmed,
            metadata: EventMetadata::new(),
        }
    }
}
