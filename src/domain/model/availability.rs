use crate::domain::error::DomainError;
use crate::domain::model::{AccommodationTypeId, CampsiteId};
use chrono::NaiveDate;

/// 空き枠台帳レコード
/// キャンプ場・宿泊タイプ・日付ごとの空き状況を管理する。
/// 宿泊タイプの在庫数はこの台帳が唯一の可変表現であり、
/// 不変条件 available_units + reserved_units = 総キャパシティ を常に保つ。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityRecord {
    campsite_id: CampsiteId,
    accommodation_type_id: AccommodationTypeId,
    date: NaiveDate,
    available_units: u32,
    reserved_units: u32,
}

impl AvailabilityRecord {
    /// 新しい空き枠レコードを作成
    /// 作成時点で予約済み数は0、空き数は総キャパシティと等しい。
    ///
    /// # Arguments
    /// * `campsite_id` - キャンプ場ID
    /// * `accommodation_type_id` - 宿泊タイプID
    /// * `date` - 対象日
    /// * `total_units` - 総キャパシティ（負の値は拒否）
    /// * `today` - 本日の日付（過去日付の作成を防ぐ）
    ///
    /// # Returns
    /// * `Ok(AvailabilityRecord)` - 作成されたレコード
    /// * `Err(DomainError)` - 過去日付または負のキャパシティ
    pub fn new(
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
        date: NaiveDate,
        total_units: i32,
        today: NaiveDate,
    ) -> Result<Self, DomainError> {
        if date < today {
            return Err(DomainError::PastDate);
        }
        if total_units < 0 {
            return Err(DomainError::NegativeCapacity);
        }

        Ok(Self {
            campsite_id,
            accommodation_type_id,
            date,
            available_units: total_units as u32,
            reserved_units: 0,
        })
    }

    /// データベースから取得したデータでレコードを再構築
    pub fn reconstruct(
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
        date: NaiveDate,
        available_units: u32,
        reserved_units: u32,
    ) -> Self {
        Self {
            campsite_id,
            accommodation_type_id,
            date,
            available_units,
            reserved_units,
        }
    }

    /// キャンプ場IDを取得
    pub fn campsite_id(&self) -> CampsiteId {
        self.campsite_id
    }

    /// 宿泊タイプIDを取得
    pub fn accommodation_type_id(&self) -> AccommodationTypeId {
        self.accommodation_type_id
    }

    /// 対象日を取得
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// 空き数を取得
    pub fn available_units(&self) -> u32 {
        self.available_units
    }

    /// 予約済み数を取得
    pub fn reserved_units(&self) -> u32 {
        self.reserved_units
    }

    /// 総キャパシティ（空き数+予約済み数）を取得
    pub fn total_capacity(&self) -> u32 {
        self.available_units + self.reserved_units
    }

    /// 指定数の空きがあるかどうか
    pub fn has_availability(&self, count: u32) -> bool {
        count > 0 && self.available_units >= count
    }

    /// 指定数の枠を予約する
    /// 空き数から予約済み数へ移すため、総キャパシティは不変。
    pub fn reserve(&mut self, count: u32) -> Result<(), DomainError> {
        if count == 0 {
            return Err(DomainError::InvalidCount);
        }
        if count > self.available_units {
            return Err(DomainError::InsufficientAvailability);
        }

        self.available_units -= count;
        self.reserved_units += count;
        Ok(())
    }

    /// 指定数の枠を解放する
    /// 予約済み数を超える解放は拒否される。
    pub fn release(&mut self, count: u32) -> Result<(), DomainError> {
        if count == 0 {
            return Err(DomainError::InvalidCount);
        }
        if count > self.reserved_units {
            return Err(DomainError::OverRelease);
        }

        self.reserved_units -= count;
        self.available_units += count;
        Ok(())
    }
}
