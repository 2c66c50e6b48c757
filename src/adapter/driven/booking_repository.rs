use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{Booking, BookingId};
use crate::domain::port::{BookingRepository, RepositoryError};
use async_trait::async_trait;

// MySQL関連のインポート
use crate::domain::model::{
    AccommodationTypeId, BookingStatus, CampsiteId, DateRange, GuestId, Money, SpotId,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{MySql, Pool, Row};

/// MySQL予約リポジトリ
/// MySQLデータベースを使用して予約を永続化する
pub struct MySqlBookingRepository {
    pool: Pool<MySql>,
}

impl MySqlBookingRepository {
    /// 新しいMySQL予約リポジトリを作成
    ///
    /// # Arguments
    /// * `pool` - MySQLコネクションプール
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    /// データベースの行から予約集約を再構築する
    fn build_booking_from_row(&self, row: &sqlx::mysql::MySqlRow) -> Result<Booking, RepositoryError> {
        let booking_id =
            BookingId::from_string(row.get("id")).map_err(|e| {
                RepositoryError::FetchFailed(format!("予約IDの解析に失敗しました: {}", e))
            })?;

        let guest_id = GuestId::from_string(row.get("guest_id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("ゲストIDの解析に失敗しました: {}", e))
        })?;

        let campsite_id = CampsiteId::new(row.get("campsite_id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("キャンプ場IDの解析に失敗しました: {}", e))
        })?;

        let accommodation_type_id =
            AccommodationTypeId::new(row.get("accommodation_type_id")).map_err(|e| {
                RepositoryError::FetchFailed(format!("宿泊タイプIDの解析に失敗しました: {}", e))
            })?;

        let spot_id = match row.get::<Option<i64>, _>("spot_id") {
            Some(value) => Some(SpotId::new(value).map_err(|e| {
                RepositoryError::FetchFailed(format!("区画IDの解析に失敗しました: {}", e))
            })?),
            None => None,
        };

        let stay_period = DateRange::new(
            row.get::<NaiveDate, _>("check_in"),
            row.get::<NaiveDate, _>("check_out"),
        )
        .map_err(|e| {
            RepositoryError::FetchFailed(format!("滞在期間の構築に失敗しました: {}", e))
        })?;

        let status = BookingStatus::from_string(row.get("status")).map_err(|e| {
            RepositoryError::FetchFailed(format!("予約ステータスの解析に失敗しました: {}", e))
        })?;

        let base_price = Money::new(
            row.get::<Decimal, _>("base_price_amount"),
            row.get("base_price_currency"),
        )
        .map_err(|e| RepositoryError::FetchFailed(format!("金額の構築に失敗しました: {}", e)))?;

        let total_price = Money::new(
            row.get::<Decimal, _>("total_price_amount"),
            row.get("total_price_currency"),
        )
        .map_err(|e| RepositoryError::FetchFailed(format!("金額の構築に失敗しました: {}", e)))?;

        Booking::reconstruct(
            booking_id,
            guest_id,
            campsite_id,
            accommodation_type_id,
            spot_id,
            stay_period,
            status,
            base_price,
            total_price,
            row.get::<u32, _>("adults"),
            row.get::<u32, _>("children"),
            row.get::<Option<String>, _>("special_requests"),
            row.get::<DateTime<Utc>, _>("created_at"),
            row.get::<DateTime<Utc>, _>("updated_at"),
            row.get::<Option<DateTime<Utc>>, _>("cancelled_at"),
        )
        .map_err(|e| {
            RepositoryError::FetchFailed(format!("予約集約の再構築に失敗しました: {}", e))
        })
    }
}

#[async_trait]
impl BookingRepository for MySqlBookingRepository {
    async fn save(&self, booking: &Booking) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, guest_id, campsite_id, accommodation_type_id, spot_id,
                check_in, check_out, status,
                base_price_amount, base_price_currency,
                total_price_amount, total_price_currency,
                adults, children, special_requests,
                created_at, updated_at, cancelled_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                spot_id = VALUES(spot_id),
                status = VALUES(status),
                total_price_amount = VALUES(total_price_amount),
                total_price_currency = VALUES(total_price_currency),
                special_requests = VALUES(special_requests),
                updated_at = VALUES(updated_at),
                cancelled_at = VALUES(cancelled_at)
            "#,
        )
        .bind(booking.id().to_string())
        .bind(booking.guest_id().to_string())
        .bind(booking.campsite_id().value())
        .bind(booking.accommodation_type_id().value())
        .bind(booking.spot_id().map(|s| s.value()))
        .bind(booking.stay_period().start())
        .bind(booking.stay_period().end())
        .bind(booking.status().to_string())
        .bind(booking.base_price().amount())
        .bind(booking.base_price().currency())
        .bind(booking.total_price().amount())
        .bind(booking.total_price().currency())
        .bind(booking.adults())
        .bind(booking.children())
        .bind(booking.special_requests())
        .bind(booking.created_at())
        .bind(booking.updated_at())
        .bind(booking.cancelled_at())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("予約の保存に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn find_by_id(&self, booking_id: BookingId) -> Result<Option<Booking>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM bookings WHERE id = ?")
            .bind(booking_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("予約の取得に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;

        match row {
            Some(row) => Ok(Some(self.build_booking_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> Result<Vec<Booking>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM bookings ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("予約の取得に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;

        rows.iter()
            .map(|row| self.build_booking_from_row(row))
            .collect()
    }

    async fn find_by_status(
        &self,
        status: BookingStatus,
    ) -> Result<Vec<Booking>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM bookings WHERE status = ? ORDER BY created_at DESC")
            .bind(status.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("予約の取得に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;

        rows.iter()
            .map(|row| self.build_booking_from_row(row))
            .collect()
    }

    fn next_identity(&self) -> BookingId {
        BookingId::new()
    }
}
