use crate::application::ApplicationError;
use crate::domain::model::{Booking, BookingId, BookingStatus};
use crate::domain::port::BookingRepository;
use std::sync::Arc;

/// 予約クエリサービス
/// 読み取り専用の予約操作を提供する
pub struct BookingQueryService {
    booking_repository: Arc<dyn BookingRepository>,
}

impl BookingQueryService {
    /// 新しい予約クエリサービスを作成
    ///
    /// # Arguments
    /// * `booking_repository` - 予約リポジトリ
    pub fn new(booking_repository: Arc<dyn BookingRepository>) -> Self {
        Self { booking_repository }
    }

    /// 予約IDで予約を取得
    ///
    /// # Arguments
    /// * `id` - 予約ID
    ///
    /// # Returns
    /// * `Ok(Some(Booking))` - 予約が見つかった
    /// * `Ok(None)` - 予約が見つからなかった
    /// * `Err(ApplicationError)` - 取得失敗
    pub async fn get_booking_by_id(
        &self,
        id: BookingId,
    ) -> Result<Option<Booking>, ApplicationError> {
        self.booking_repository
            .find_by_id(id)
            .await
            .map_err(ApplicationError::from)
    }

    /// すべての予約を取得
    /// 作成日時の降順で並べて返す
    ///
    /// # Returns
    /// * `Ok(Vec<Booking>)` - 予約のリスト
    /// * `Err(ApplicationError)` - 取得失敗
    pub async fn get_all_bookings(&self) -> Result<Vec<Booking>, ApplicationError> {
        self.booking_repository
            .find_all()
            .await
            .map_err(ApplicationError::from)
    }

    /// 指定されたステータスの予約を取得
    /// 作成日時の降順で並べて返す
    ///
    /// # Arguments
    /// * `status` - フィルタリングする予約ステータス
    pub async fn get_bookings_by_status(
        &self,
        status: BookingStatus,
    ) -> Result<Vec<Booking>, ApplicationError> {
        self.booking_repository
            .find_by_status(status)
            .await
            .map_err(ApplicationError::from)
    }

    /// 指定されたステータス文字列の予約を取得
    /// 作成日時の降順で並べて返す
    ///
    /// # Arguments
    /// * `status_str` - フィルタリングする予約ステータス文字列
    pub async fn get_bookings_by_status_string(
        &self,
        status_str: String,
    ) -> Result<Vec<Booking>, ApplicationError> {
        let status = BookingStatus::from_string(&status_str).map_err(|_| {
            ApplicationError::NotFound(format!("無効なステータス値: {}", status_str))
        })?;

        self.get_bookings_by_status(status).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        AccommodationTypeId, CampsiteId, DateRange, GuestId, Money,
    };
    use crate::domain::port::RepositoryError;
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::Mutex;

    // テスト用のモックリポジトリ
    struct MockBookingRepository {
        bookings: Mutex<HashMap<BookingId, Booking>>,
    }

    impl MockBookingRepository {
        fn new() -> Self {
            Self {
                bookings: Mutex::new(HashMap::new()),
            }
        }

        fn add_booking(&self, booking: Booking) {
            let mut bookings = self.bookings.lock().unwrap();
            bookings.insert(booking.id(), booking);
        }
    }

    #[async_trait]
    impl BookingRepository for MockBookingRepository {
        async fn save(&self, booking: &Booking) -> Result<(), RepositoryError> {
            let mut bookings = self.bookings.lock().unwrap();
            bookings.insert(booking.id(), booking.clone());
            Ok(())
        }

        async fn find_by_id(
            &self,
            booking_id: BookingId,
        ) -> Result<Option<Booking>, RepositoryError> {
            let bookings = self.bookings.lock().unwrap();
            Ok(bookings.get(&booking_id).cloned())
        }

        async fn find_all(&self) -> Result<Vec<Booking>, RepositoryError> {
            let bookings = self.bookings.lock().unwrap();
            Ok(bookings.values().cloned().collect())
        }

        async fn find_by_status(
            &self,
            status: BookingStatus,
        ) -> Result<Vec<Booking>, RepositoryError> {
            let bookings = self.bookings.lock().unwrap();
            Ok(bookings
                .values()
                .filter(|booking| booking.status() == status)
                .cloned()
                .collect())
        }

        fn next_identity(&self) -> BookingId {
            BookingId::new()
        }
    }

    fn sample_booking() -> Booking {
        let (booking, _event) = Booking::create(
            BookingId::new(),
            GuestId::new(),
            CampsiteId::new(1).unwrap(),
            AccommodationTypeId::new(1).unwrap(),
            DateRange::new(
                NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 7, 8).unwrap(),
            )
            .unwrap(),
            Money::dkk(dec!(150)),
            2,
            0,
            None,
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        )
        .unwrap();
        booking
    }

    #[tokio::test]
    async fn test_get_booking_by_id() {
        let repo = Arc::new(MockBookingRepository::new());
        let booking = sample_booking();
        let booking_id = booking.id();
        repo.add_booking(booking);

        let service = BookingQueryService::new(repo);
        let found = service.get_booking_by_id(booking_id).await.unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().id(), booking_id);
    }

    #[tokio::test]
    async fn test_get_booking_by_id_not_found() {
        let repo = Arc::new(MockBookingRepository::new());
        let service = BookingQueryService::new(repo);
        let found = service.get_booking_by_id(BookingId::new()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_get_bookings_by_status() {
        let repo = Arc::new(MockBookingRepository::new());
        repo.add_booking(sample_booking());
        let mut cancelled = sample_booking();
        cancelled
            .cancel(Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap())
            .unwrap();
        repo.add_booking(cancelled);

        let service = BookingQueryService::new(repo);
        let pending = service
            .get_bookings_by_status(BookingStatus::Pending)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);

        let cancelled = service
            .get_bookings_by_status(BookingStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(cancelled.len(), 1);
    }

    #[tokio::test]
    async fn test_get_bookings_by_invalid_status_string() {
        let repo = Arc::new(MockBookingRepository::new());
        let service = BookingQueryService::new(repo);
        let result = service
            .get_bookings_by_status_string("Shipped".to_string())
            .await;
        assert!(matches!(result, Err(ApplicationError::NotFound(_))));
    }
}
