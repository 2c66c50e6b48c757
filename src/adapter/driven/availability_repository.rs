use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{
    AccommodationTypeId, AvailabilityRecord, CampsiteId, DateRange,
};
use crate::domain::port::{AvailabilityRepository, RepositoryError};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{MySql, Pool, Row};

/// MySQL空き枠台帳リポジトリ
/// キャンプ場・宿泊タイプ・日付を複合キーとして日次レコードを永続化する
pub struct MySqlAvailabilityRepository {
    pool: Pool<MySql>,
}

impl MySqlAvailabilityRepository {
    /// 新しいMySQL空き枠台帳リポジトリを作成
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    /// データベースの行から台帳レコードを再構築する
    fn build_record_from_row(
        &self,
        row: &sqlx::mysql::MySqlRow,
    ) -> Result<AvailabilityRecord, RepositoryError> {
        let campsite_id = CampsiteId::new(row.get("campsite_id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("キャンプ場IDの解析に失敗しました: {}", e))
        })?;

        let accommodation_type_id =
            AccommodationTypeId::new(row.get("accommodation_type_id")).map_err(|e| {
                RepositoryError::FetchFailed(format!("宿泊タイプIDの解析に失敗しました: {}", e))
            })?;

        Ok(AvailabilityRecord::reconstruct(
            campsite_id,
            accommodation_type_id,
            row.get::<NaiveDate, _>("date"),
            row.get::<u32, _>("available_units"),
            row.get::<u32, _>("reserved_units"),
        ))
    }
}

const UPSERT_RECORD_SQL: &str = r#"
    INSERT INTO availability_records (
        campsite_id, accommodation_type_id, date, available_units, reserved_units
    )
    VALUES (?, ?, ?, ?, ?)
    ON DUPLICATE KEY UPDATE
        available_units = VALUES(available_units),
        reserved_units = VALUES(reserved_units)
"#;

#[async_trait]
impl AvailabilityRepository for MySqlAvailabilityRepository {
    async fn find_range(
        &self,
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
        period: DateRange,
    ) -> Result<Vec<AvailabilityRecord>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM availability_records
            WHERE campsite_id = ? AND accommodation_type_id = ?
              AND date >= ? AND date < ?
            ORDER BY date ASC
            "#,
        )
        .bind(campsite_id.value())
        .bind(accommodation_type_id.value())
        .bind(period.start())
        .bind(period.end())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::QueryError(format!("空き枠レコードの取得に失敗しました: {}", e))
        })
        .map_err(RepositoryError::from)?;

        rows.iter()
            .map(|row| self.build_record_from_row(row))
            .collect()
    }

    async fn find_by_day(
        &self,
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
        date: NaiveDate,
    ) -> Result<Option<AvailabilityRecord>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT * FROM availability_records
            WHERE campsite_id = ? AND accommodation_type_id = ? AND date = ?
            "#,
        )
        .bind(campsite_id.value())
        .bind(accommodation_type_id.value())
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::QueryError(format!("空き枠レコードの取得に失敗しました: {}", e))
        })
        .map_err(RepositoryError::from)?;

        match row {
            Some(row) => Ok(Some(self.build_record_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, record: &AvailabilityRecord) -> Result<(), RepositoryError> {
        sqlx::query(UPSERT_RECORD_SQL)
            .bind(record.campsite_id().value())
            .bind(record.accommodation_type_id().value())
            .bind(record.date())
            .bind(record.available_units())
            .bind(record.reserved_units())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("空き枠レコードの保存に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn reserve_range(
        &self,
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
        period: DateRange,
        count: u32,
    ) -> Result<bool, RepositoryError> {
        // 滞在期間の全日分を1つのトランザクションで条件付き更新する。
        // 空きが足りない日があれば1件も更新せずに終わる。
        let mut tx = self.pool.begin().await.map_err(|e| {
            RepositoryError::from(DatabaseError::ConnectionError(format!(
                "トランザクションの開始に失敗しました: {}",
                e
            )))
        })?;

        for date in period.dates() {
            let result = sqlx::query(
                r#"
                UPDATE availability_records
                SET available_units = available_units - ?,
                    reserved_units = reserved_units + ?
                WHERE campsite_id = ? AND accommodation_type_id = ? AND date = ?
                  AND available_units >= ?
                "#,
            )
            .bind(count)
            .bind(count)
            .bind(campsite_id.value())
            .bind(accommodation_type_id.value())
            .bind(date)
            .bind(count)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("空き枠の予約に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

            // レコード欠落または空き不足。トランザクション破棄でロールバック
            if result.rows_affected() != 1 {
                return Ok(false);
            }
        }

        tx.commit().await.map_err(|e| {
            RepositoryError::from(DatabaseError::QueryError(format!(
                "トランザクションのコミットに失敗しました: {}",
                e
            )))
        })?;

        Ok(true)
    }

    async fn release_range(
        &self,
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
        period: DateRange,
        count: u32,
    ) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            RepositoryError::from(DatabaseError::ConnectionError(format!(
                "トランザクションの開始に失敗しました: {}",
                e
            )))
        })?;

        for date in period.dates() {
            let result = sqlx::query(
                r#"
                UPDATE availability_records
                SET available_units = available_units + ?,
                    reserved_units = reserved_units - ?
                WHERE campsite_id = ? AND accommodation_type_id = ? AND date = ?
                  AND reserved_units >= ?
                "#,
            )
            .bind(count)
            .bind(count)
            .bind(campsite_id.value())
            .bind(accommodation_type_id.value())
            .bind(date)
            .bind(count)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("空き枠の解放に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

            if result.rows_affected() != 1 {
                return Ok(false);
            }
        }

        tx.commit().await.map_err(|e| {
            RepositoryError::from(DatabaseError::QueryError(format!(
                "トランザクションのコミットに失敗しました: {}",
                e
            )))
        })?;

        Ok(true)
    }
}
