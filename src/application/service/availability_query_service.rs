use crate::application::ApplicationError;
use crate::domain::model::{AccommodationTypeId, AvailabilityRecord, CampsiteId, DateRange};
use crate::domain::port::AvailabilityRepository;
use chrono::NaiveDate;
use std::sync::Arc;

/// 空き枠クエリサービス
/// 読み取り専用の空き枠台帳操作を提供する
pub struct AvailabilityQueryService {
    availability_repository: Arc<dyn AvailabilityRepository>,
}

impl AvailabilityQueryService {
    /// 新しい空き枠クエリサービスを作成
    ///
    /// # Arguments
    /// * `availability_repository` - 空き枠台帳リポジトリ
    pub fn new(availability_repository: Arc<dyn AvailabilityRepository>) -> Self {
        Self {
            availability_repository,
        }
    }

    /// 滞在期間の各日の台帳レコードを取得
    /// 日付の昇順で並べて返す
    pub async fn get_calendar(
        &self,
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
        period: DateRange,
    ) -> Result<Vec<AvailabilityRecord>, ApplicationError> {
        self.availability_repository
            .find_range(campsite_id, accommodation_type_id, period)
            .await
            .map_err(ApplicationError::from)
    }

    /// 特定の日の空き数を取得
    ///
    /// # Returns
    /// * `Ok(Some(u32))` - その日の空き数
    /// * `Ok(None)` - 台帳レコードが存在しない
    /// * `Err(ApplicationError)` - 取得失敗
    pub async fn units_available_on(
        &self,
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
        date: NaiveDate,
    ) -> Result<Option<u32>, ApplicationError> {
        let record = self
            .availability_repository
            .find_by_day(campsite_id, accommodation_type_id, date)
            .await?;
        Ok(record.map(|r| r.available_units()))
    }
}
