use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::event::{BookingCancelled, BookingConfirmed, BookingCreated};
use crate::domain::event_bus::{EventHandler, HandlerError};
use crate::domain::port::{AccommodationSpotRepository, AvailabilityRepository, Logger};

/// 処理済みイベントを追跡するためのリポジトリ
/// 実際の実装では永続化ストレージ（Redis、データベースなど）を使用
#[derive(Clone)]
pub struct ProcessedEventTracker {
    processed_events: Arc<Mutex<HashSet<Uuid>>>,
}

impl Default for ProcessedEventTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessedEventTracker {
    pub fn new() -> Self {
        Self {
            processed_events: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// イベントが既に処理済みかチェック
    pub async fn is_processed(&self, event_id: Uuid) -> bool {
        let processed = self.processed_events.lock().await;
        processed.contains(&event_id)
    }

    /// イベントを処理済みとしてマーク
    pub async fn mark_processed(&self, event_id: Uuid) {
        let mut processed = self.processed_events.lock().await;
        processed.insert(event_id);
    }
}

/// 空き枠解放ハンドラー
/// BookingCancelledイベントを受信して空き枠台帳と区画を復元する。
/// 確定前のキャンセルは台帳を消費していないため何もしない。
pub struct AvailabilityReleaseHandler {
    availability_repository: Arc<dyn AvailabilityRepository>,
    spot_repository: Arc<dyn AccommodationSpotRepository>,
    processed_events: ProcessedEventTracker,
    logger: Arc<dyn Logger>,
}

impl AvailabilityReleaseHandler {
    /// 新しい空き枠解放ハンドラーを作成
    pub fn new(
        availability_repository: Arc<dyn AvailabilityRepository>,
        spot_repository: Arc<dyn AccommodationSpotRepository>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            availability_repository,
            spot_repository,
            processed_events: ProcessedEventTracker::new(),
            logger,
        }
    }
}

#[async_trait]
impl EventHandler<BookingCancelled> for AvailabilityReleaseHandler {
    async fn handle(&self, event: BookingCancelled) -> Result<(), HandlerError> {
        // ハンドラー開始ログ
        let mut context = HashMap::new();
        context.insert("event_type".to_string(), "BookingCancelled".to_string());
        self.logger.info(
            "AvailabilityReleaseHandler",
            "Processing BookingCancelled event",
            Some(event.metadata.correlation_id),
            Some(context),
        );

        let start_time = std::time::Instant::now();

        // 冪等性チェック: 既に処理済みのイベントかどうか確認
        if self
            .processed_events
            .is_processed(event.metadata.event_id)
            .await
        {
            let mut context = HashMap::new();
            context.insert("event_id".to_string(), event.metadata.event_id.to_string());
            context.insert("already_processed".to_string(), "true".to_string());

            self.logger.debug(
                "AvailabilityReleaseHandler",
                "Idempotency check: Event already processed, skipping",
                Some(event.metadata.correlation_id),
                Some(context),
            );
            return Ok(());
        }

        // 確定前のキャンセルは空き枠を消費していないためスキップ
        if !event.was_confirmed {
            let mut context = HashMap::new();
            context.insert("was_confirmed".to_string(), "false".to_string());

            self.logger.debug(
                "AvailabilityReleaseHandler",
                "Booking was not confirmed, no availability to release",
                Some(event.metadata.correlation_id),
                Some(context),
            );

            self.processed_events
                .mark_processed(event.metadata.event_id)
                .await;
            return Ok(());
        }

        // 滞在期間の全日をリポジトリ側で不可分に解放する
        let released = self
            .availability_repository
            .release_range(
                event.campsite_id,
                event.accommodation_type_id,
                event.stay_period,
                1,
            )
            .await
            .map_err(|e| HandlerError::RepositoryError(format!("空き枠解放エラー: {}", e)))?;

        // レコード欠落または解放超過
        if !released {
            let mut context = HashMap::new();
            context.insert("event_type".to_string(), "BookingCancelled".to_string());
            context.insert(
                "execution_time_ms".to_string(),
                start_time.elapsed().as_millis().to_string(),
            );

            self.logger.error(
                "AvailabilityReleaseHandler",
                "Availability release failed: ledger rejected the release",
                Some(event.metadata.correlation_id),
                Some(context),
            );

            return Err(HandlerError::ProcessingFailed(format!(
                "滞在期間の空き枠を解放できませんでした: {}",
                event.stay_period
            )));
        }

        // 区画を空きに戻す
        if let Some(spot_id) = event.spot_id {
            let spot = self
                .spot_repository
                .find_by_id(spot_id)
                .await
                .map_err(|e| HandlerError::RepositoryError(format!("区画取得エラー: {}", e)))?;

            if let Some(mut spot) = spot {
                spot.mark_available();
                self.spot_repository
                    .save(&spot)
                    .await
                    .map_err(|e| HandlerError::RepositoryError(format!("区画保存エラー: {}", e)))?;
            }
        }

        // イベントを処理済みとしてマーク
        self.processed_events
            .mark_processed(event.metadata.event_id)
            .await;

        // 処理成功ログ
        let mut context = HashMap::new();
        context.insert("event_type".to_string(), "BookingCancelled".to_string());
        context.insert(
            "execution_time_ms".to_string(),
            start_time.elapsed().as_millis().to_string(),
        );

        self.logger.info(
            "AvailabilityReleaseHandler",
            "BookingCancelled event processed successfully",
            Some(event.metadata.correlation_id),
            Some(context),
        );

        Ok(())
    }
}

/// 通知ハンドラー
/// 予約ライフサイクルのイベントを受信してゲストへ通知する
#[derive(Clone)]
pub struct NotificationHandler {
    logger: Arc<dyn Logger>,
}

impl NotificationHandler {
    /// 新しい通知ハンドラーを作成
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }

    /// 通知メッセージを送信（実装では外部サービスを呼び出し）
    async fn send_notification(
        &self,
        message: &str,
        correlation_id: Uuid,
    ) -> Result<(), HandlerError> {
        // 実際の実装では外部通知サービス（メール、SMS、プッシュ通知など）を呼び出し
        // 今回はログ出力で代用
        let mut context = HashMap::new();
        context.insert("notification_type".to_string(), "General".to_string());
        context.insert("recipient".to_string(), "guest".to_string());

        self.logger.info(
            "NotificationHandler",
            "Notification sent: General",
            Some(correlation_id),
            Some(context),
        );

        // 通知内容もログに記録
        self.logger
            .info("NotificationHandler", message, Some(correlation_id), None);

        Ok(())
    }
}

#[async_trait]
impl EventHandler<BookingCreated> for NotificationHandler {
    async fn handle(&self, event: BookingCreated) -> Result<(), HandlerError> {
        let message = format!(
            "予約を受け付けました。予約ID: {}, 滞在期間: {}",
            event.booking_id, event.stay_period
        );
        self.send_notification(&message, event.metadata.correlation_id)
            .await
    }
}

#[async_trait]
impl EventHandler<BookingConfirmed> for NotificationHandler {
    async fn handle(&self, event: BookingConfirmed) -> Result<(), HandlerError> {
        // ハンドラー開始ログ
        let mut context = HashMap::new();
        context.insert("event_type".to_string(), "BookingConfirmed".to_string());
        self.logger.info(
            "NotificationHandler",
            "Processing BookingConfirmed event",
            Some(event.metadata.correlation_id),
            Some(context),
        );

        let start_time = std::time::Instant::now();

        let message = format!(
            "ご予約が確定されました。予約ID: {}, 合計金額: {} {}",
            event.booking_id,
            event.total_amount.amount(),
            event.total_amount.currency()
        );

        self.send_notification(&message, event.metadata.correlation_id)
            .await?;

        // 処理成功ログ
        let execution_time = start_time.elapsed();
        let mut context = HashMap::new();
        context.insert("event_type".to_string(), "BookingConfirmed".to_string());
        context.insert(
            "execution_time_ms".to_string(),
            execution_time.as_millis().to_string(),
        );

        self.logger.info(
            "NotificationHandler",
            "BookingConfirmed event processed successfully",
            Some(event.metadata.correlation_id),
            Some(context),
        );

        Ok(())
    }
}

#[async_trait]
impl EventHandler<BookingCancelled> for NotificationHandler {
    async fn handle(&self, event: BookingCancelled) -> Result<(), HandlerError> {
        let message = format!(
            "ご予約がキャンセルされました。予約ID: {}",
            event.booking_id
        );
        self.send_notification(&message, event.metadata.correlation_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        AccommodationSpot, AccommodationTypeId, AvailabilityRecord, BookingId, CampsiteId,
        DateRange, GuestId, Money, SpotId, SpotStatus,
    };
    use crate::domain::port::RepositoryError;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use tokio::sync::Mutex;

    // テスト用のモック空き枠リポジトリ
    struct MockAvailabilityRepository {
        records: Arc<Mutex<Vec<AvailabilityRecord>>>,
    }

    impl MockAvailabilityRepository {
        fn new() -> Self {
            Self {
                records: Arc::new(Mutex::new(Vec::new())),
            }
        }

        async fn add_record(&self, record: AvailabilityRecord) {
            let mut records = self.records.lock().await;
            records.push(record);
        }
    }

    #[async_trait]
    impl AvailabilityRepository for MockAvailabilityRepository {
        async fn find_range(
            &self,
            campsite_id: CampsiteId,
            accommodation_type_id: AccommodationTypeId,
            period: DateRange,
        ) -> Result<Vec<AvailabilityRecord>, RepositoryError> {
            let records = self.records.lock().await;
            let mut found: Vec<AvailabilityRecord> = records
                .iter()
                .filter(|r| {
                    r.campsite_id() == campsite_id
                        && r.accommodation_type_id() == accommodation_type_id
                        && period.contains(r.date())
                })
                .cloned()
                .collect();
            found.sort_by_key(|r| r.date());
            Ok(found)
        }

        async fn find_by_day(
            &self,
            campsite_id: CampsiteId,
            accommodation_type_id: AccommodationTypeId,
            date: NaiveDate,
        ) -> Result<Option<AvailabilityRecord>, RepositoryError> {
            let records = self.records.lock().await;
            Ok(records
                .iter()
                .find(|r| {
                    r.campsite_id() == campsite_id
                        && r.accommodation_type_id() == accommodation_type_id
                        && r.date() == date
                })
                .cloned())
        }

        async fn save(&self, record: &AvailabilityRecord) -> Result<(), RepositoryError> {
            let mut records = self.records.lock().await;
            if let Some(existing) = records.iter_mut().find(|r| {
                r.campsite_id() == record.campsite_id()
                    && r.accommodation_type_id() == record.accommodation_type_id()
                    && r.date() == record.date()
            }) {
                *existing = record.clone();
            } else {
                records.push(record.clone());
            }
            Ok(())
        }

        async fn reserve_range(
            &self,
            campsite_id: CampsiteId,
            accommodation_type_id: AccommodationTypeId,
            period: DateRange,
            count: u32,
        ) -> Result<bool, RepositoryError> {
            let mut records = self.records.lock().await;
            // ロックの下で全日を検証してから反映する
            let mut updated = Vec::new();
            for date in period.dates() {
                let record = records.iter().find(|r| {
                    r.campsite_id() == campsite_id
                        && r.accommodation_type_id() == accommodation_type_id
                        && r.date() == date
                });
                match record {
                    Some(record) => {
                        let mut record = record.clone();
                        if record.reserve(count).is_err() {
                            return Ok(false);
                        }
                        updated.push(record);
                    }
                    None => return Ok(false),
                }
            }
            for record in updated {
                if let Some(existing) = records.iter_mut().find(|r| {
                    r.campsite_id() == record.campsite_id()
                        && r.accommodation_type_id() == record.accommodation_type_id()
                        && r.date() == record.date()
                }) {
                    *existing = record;
                }
            }
            Ok(true)
        }

        async fn release_range(
            &self,
            campsite_id: CampsiteId,
            accommodation_type_id: AccommodationTypeId,
            period: DateRange,
            count: u32,
        ) -> Result<bool, RepositoryError> {
            let mut records = self.records.lock().await;
            let mut updated = Vec::new();
            for date in period.dates() {
                let record = records.iter().find(|r| {
                    r.campsite_id() == campsite_id
                        && r.accommodation_type_id() == accommodation_type_id
                        && r.date() == date
                });
                match record {
                    Some(record) => {
                        let mut record = record.clone();
                        if record.release(count).is_err() {
                            return Ok(false);
                        }
                        updated.push(record);
                    }
                    None => return Ok(false),
                }
            }
            for record in updated {
                if let Some(existing) = records.iter_mut().find(|r| {
                    r.campsite_id() == record.campsite_id()
                        && r.accommodation_type_id() == record.accommodation_type_id()
                        && r.date() == record.date()
                }) {
                    *existing = record;
                }
            }
            Ok(true)
        }
    }

    // テスト用のモック区画リポジトリ
    struct MockSpotRepository {
        spots: Arc<Mutex<HashMap<SpotId, AccommodationSpot>>>,
    }

    impl MockSpotRepository {
        fn new() -> Self {
            Self {
                spots: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn add_spot(&self, spot: AccommodationSpot) {
            let mut spots = self.spots.lock().await;
            spots.insert(spot.id(), spot);
        }
    }

    #[async_trait]
    impl AccommodationSpotRepository for MockSpotRepository {
        async fn find_by_id(
            &self,
            id: SpotId,
        ) -> Result<Option<AccommodationSpot>, RepositoryError> {
            let spots = self.spots.lock().await;
            Ok(spots.get(&id).cloned())
        }

        async fn find_by_type(
            &self,
            accommodation_type_id: AccommodationTypeId,
        ) -> Result<Vec<AccommodationSpot>, RepositoryError> {
            let spots = self.spots.lock().await;
            let mut found: Vec<AccommodationSpot> = spots
                .values()
                .filter(|s| s.accommodation_type_id() == accommodation_type_id)
                .cloned()
                .collect();
            found.sort_by_key(|s| s.id().value());
            Ok(found)
        }

        async fn save(&self, spot: &AccommodationSpot) -> Result<(), RepositoryError> {
            let mut spots = self.spots.lock().await;
            spots.insert(spot.id(), spot.clone());
            Ok(())
        }
    }

    // テスト用のモックロガー
    #[derive(Clone)]
    struct MockLogger;

    impl Logger for MockLogger {
        fn debug(
            &self,
            _component: &str,
            _message: &str,
            _correlation_id: Option<Uuid>,
            _context: Option<HashMap<String, String>>,
        ) {
            // テスト用なので何もしない
        }

        fn info(
            &self,
            _component: &str,
            _message: &str,
            _correlation_id: Option<Uuid>,
            _context: Option<HashMap<String, String>>,
        ) {
            // テスト用なので何もしない
        }

        fn warn(
            &self,
            _component: &str,
            _message: &str,
            _correlation_id: Option<Uuid>,
            _context: Option<HashMap<String, String>>,
        ) {
            // テスト用なので何もしない
        }

        fn error(
            &self,
            _component: &str,
            _message: &str,
            _correlation_id: Option<Uuid>,
            _context: Option<HashMap<String, String>>,
        ) {
            // テスト用なので何もしない
        }
    }

    fn ids() -> (CampsiteId, AccommodationTypeId) {
        (
            CampsiteId::new(1).unwrap(),
            AccommodationTypeId::new(1).unwrap(),
        )
    }

    fn stay_period() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 7, 4).unwrap(),
        )
        .unwrap()
    }

    async fn seed_reserved_records(repo: &MockAvailabilityRepository) {
        let (campsite_id, type_id) = ids();
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        for date in stay_period().dates() {
            let mut record =
                AvailabilityRecord::new(campsite_id, type_id, date, 5, today).unwrap();
            record.reserve(1).unwrap();
            repo.add_record(record).await;
        }
    }

    fn cancelled_event(spot_id: Option<SpotId>, was_confirmed: bool) -> BookingCancelled {
        let (campsite_id, type_id) = ids();
        BookingCancelled::new(
            BookingId::new(),
            GuestId::new(),
            campsite_id,
            type_id,
            spot_id,
            stay_period(),
            was_confirmed,
        )
    }

    #[tokio::test]
    async fn test_release_handler_restores_ledger_and_spot() {
        let availability_repo = Arc::new(MockAvailabilityRepository::new());
        let spot_repo = Arc::new(MockSpotRepository::new());
        let logger = Arc::new(MockLogger);
        let handler = AvailabilityReleaseHandler::new(
            availability_repo.clone(),
            spot_repo.clone(),
            logger,
        );

        seed_reserved_records(&availability_repo).await;

        let (campsite_id, type_id) = ids();
        let spot_id = SpotId::new(7).unwrap();
        let mut spot = AccommodationSpot::new(
            spot_id,
            campsite_id,
            type_id,
            "A-7".to_string(),
            dec!(1.0),
        )
        .unwrap();
        spot.mark_reserved().unwrap();
        spot_repo.add_spot(spot).await;

        let event = cancelled_event(Some(spot_id), true);
        let result = handler.handle(event).await;
        assert!(result.is_ok());

        // 台帳の全日が解放されている
        let records = availability_repo
            .find_range(campsite_id, type_id, stay_period())
            .await
            .unwrap();
        assert_eq!(records.len(), 3);
        for record in records {
            assert_eq!(record.available_units(), 5);
            assert_eq!(record.reserved_units(), 0);
        }

        // 区画が空きに戻っている
        let spot = spot_repo.find_by_id(spot_id).await.unwrap().unwrap();
        assert_eq!(spot.status(), SpotStatus::Available);
    }

    #[tokio::test]
    async fn test_release_handler_skips_unconfirmed_booking() {
        let availability_repo = Arc::new(MockAvailabilityRepository::new());
        let spot_repo = Arc::new(MockSpotRepository::new());
        let logger = Arc::new(MockLogger);
        let handler = AvailabilityReleaseHandler::new(
            availability_repo.clone(),
            spot_repo.clone(),
            logger,
        );

        seed_reserved_records(&availability_repo).await;

        let event = cancelled_event(None, false);
        let result = handler.handle(event).await;
        assert!(result.is_ok());

        // 台帳は変化していない
        let (campsite_id, type_id) = ids();
        let records = availability_repo
            .find_range(campsite_id, type_id, stay_period())
            .await
            .unwrap();
        for record in records {
            assert_eq!(record.reserved_units(), 1);
        }
    }

    #[tokio::test]
    async fn test_release_handler_is_idempotent() {
        let availability_repo = Arc::new(MockAvailabilityRepository::new());
        let spot_repo = Arc::new(MockSpotRepository::new());
        let logger = Arc::new(MockLogger);
        let handler = AvailabilityReleaseHandler::new(
            availability_repo.clone(),
            spot_repo.clone(),
            logger,
        );

        seed_reserved_records(&availability_repo).await;

        let event = cancelled_event(None, true);

        // 同じイベントを2回処理しても解放は1回だけ
        handler.handle(event.clone()).await.unwrap();
        handler.handle(event).await.unwrap();

        let (campsite_id, type_id) = ids();
        let records = availability_repo
            .find_range(campsite_id, type_id, stay_period())
            .await
            .unwrap();
        for record in records {
            assert_eq!(record.available_units(), 5);
            assert_eq!(record.reserved_units(), 0);
        }
    }

    #[tokio::test]
    async fn test_release_handler_fails_on_missing_ledger_days() {
        let availability_repo = Arc::new(MockAvailabilityRepository::new());
        let spot_repo = Arc::new(MockSpotRepository::new());
        let logger = Arc::new(MockLogger);
        let handler = AvailabilityReleaseHandler::new(
            availability_repo.clone(),
            spot_repo.clone(),
            logger,
        );

        // 台帳を作成しないまま解放イベントを処理
        let event = cancelled_event(None, true);
        let result = handler.handle(event).await;
        assert!(matches!(result, Err(HandlerError::ProcessingFailed(_))));
    }

    #[tokio::test]
    async fn test_notification_handler_handles_all_events() {
        let logger = Arc::new(MockLogger);
        let handler = NotificationHandler::new(logger);

        let (campsite_id, type_id) = ids();
        let created = BookingCreated::new(
            BookingId::new(),
            GuestId::new(),
            campsite_id,
            type_id,
            stay_period(),
        );
        assert!(handler.handle(created).await.is_ok());

        let confirmed = BookingConfirmed::new(
            BookingId::new(),
            GuestId::new(),
            campsite_id,
            type_id,
            SpotId::new(1).unwrap(),
            stay_period(),
            Money::dkk(dec!(1575)),
        );
        assert!(handler.handle(confirmed).await.is_ok());

        let cancelled = cancelled_event(None, false);
        assert!(handler.handle(cancelled).await.is_ok());
    }
}
