use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{
    AccommodationSpot, AccommodationType, AccommodationTypeId, CampsiteId, Money, SpotId,
    SpotStatus,
};
use crate::domain::port::{
    AccommodationSpotRepository, AccommodationTypeRepository, RepositoryError,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{MySql, Pool, Row};

/// MySQL宿泊タイプリポジトリ
pub struct MySqlAccommodationTypeRepository {
    pool: Pool<MySql>,
}

impl MySqlAccommodationTypeRepository {
    /// 新しいMySQL宿泊タイプリポジトリを作成
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    /// データベースの行から宿泊タイプを再構築する
    fn build_type_from_row(
        &self,
        row: &sqlx::mysql::MySqlRow,
    ) -> Result<AccommodationType, RepositoryError> {
        let id = AccommodationTypeId::new(row.get("id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("宿泊タイプIDの解析に失敗しました: {}", e))
        })?;

        let campsite_id = CampsiteId::new(row.get("campsite_id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("キャンプ場IDの解析に失敗しました: {}", e))
        })?;

        let base_nightly_price = Money::new(
            row.get::<Decimal, _>("base_nightly_price_amount"),
            row.get("base_nightly_price_currency"),
        )
        .map_err(|e| RepositoryError::FetchFailed(format!("金額の構築に失敗しました: {}", e)))?;

        Ok(AccommodationType::reconstruct(
            id,
            campsite_id,
            row.get("category"),
            row.get::<u32, _>("max_occupancy"),
            base_nightly_price,
            row.get::<u32, _>("total_units"),
            row.get::<bool, _>("active"),
        ))
    }
}

#[async_trait]
impl AccommodationTypeRepository for MySqlAccommodationTypeRepository {
    async fn find_by_id(
        &self,
        id: AccommodationTypeId,
    ) -> Result<Option<AccommodationType>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM accommodation_types WHERE id = ?")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("宿泊タイプの取得に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

        match row {
            Some(row) => Ok(Some(self.build_type_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_by_campsite(
        &self,
        campsite_id: CampsiteId,
    ) -> Result<Vec<AccommodationType>, RepositoryError> {
        let rows =
            sqlx::query("SELECT * FROM accommodation_types WHERE campsite_id = ? ORDER BY id ASC")
                .bind(campsite_id.value())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    DatabaseError::QueryError(format!("宿泊タイプの取得に失敗しました: {}", e))
                })
                .map_err(RepositoryError::from)?;

        rows.iter().map(|row| self.build_type_from_row(row)).collect()
    }

    async fn save(&self, accommodation_type: &AccommodationType) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO accommodation_types (
                id, campsite_id, category, max_occupancy,
                base_nightly_price_amount, base_nightly_price_currency,
                total_units, active
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                category = VALUES(category),
                max_occupancy = VALUES(max_occupancy),
                base_nightly_price_amount = VALUES(base_nightly_price_amount),
                base_nightly_price_currency = VALUES(base_nightly_price_currency),
                total_units = VALUES(total_units),
                active = VALUES(active)
            "#,
        )
        .bind(accommodation_type.id().value())
        .bind(accommodation_type.campsite_id().value())
        .bind(accommodation_type.category())
        .bind(accommodation_type.max_occupancy())
        .bind(accommodation_type.base_nightly_price().amount())
        .bind(accommodation_type.base_nightly_price().currency())
        .bind(accommodation_type.total_units())
        .bind(accommodation_type.is_active())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("宿泊タイプの保存に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        Ok(())
    }
}

/// MySQL区画リポジトリ
pub struct MySqlAccommodationSpotRepository {
    pool: Pool<MySql>,
}

impl MySqlAccommodationSpotRepository {
    /// 新しいMySQL区画リポジトリを作成
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    /// データベースの行から区画を再構築する
    fn build_spot_from_row(
        &self,
        row: &sqlx::mysql::MySqlRow,
    ) -> Result<AccommodationSpot, RepositoryError> {
        let id = SpotId::new(row.get("id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("区画IDの解析に失敗しました: {}", e))
        })?;

        let campsite_id = CampsiteId::new(row.get("campsite_id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("キャンプ場IDの解析に失敗しました: {}", e))
        })?;

        let accommodation_type_id =
            AccommodationTypeId::new(row.get("accommodation_type_id")).map_err(|e| {
                RepositoryError::FetchFailed(format!("宿泊タイプIDの解析に失敗しました: {}", e))
            })?;

        let status = SpotStatus::from_string(row.get("status")).map_err(|e| {
            RepositoryError::FetchFailed(format!("区画ステータスの解析に失敗しました: {}", e))
        })?;

        Ok(AccommodationSpot::reconstruct(
            id,
            campsite_id,
            accommodation_type_id,
            row.get("label"),
            row.get::<Decimal, _>("price_modifier"),
            status,
        ))
    }
}

#[async_trait]
impl AccommodationSpotRepository for MySqlAccommodationSpotRepository {
    async fn find_by_id(&self, id: SpotId) -> Result<Option<AccommodationSpot>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM accommodation_spots WHERE id = ?")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("区画の取得に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;

        match row {
            Some(row) => Ok(Some(self.build_spot_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_by_type(
        &self,
        accommodation_type_id: AccommodationTypeId,
    ) -> Result<Vec<AccommodationSpot>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM accommodation_spots WHERE accommodation_type_id = ? ORDER BY id ASC",
        )
        .bind(accommodation_type_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("区画の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        rows.iter().map(|row| self.build_spot_from_row(row)).collect()
    }

    async fn save(&self, spot: &AccommodationSpot) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO accommodation_spots (
                id, campsite_id, accommodation_type_id, label, price_modifier, status
            )
            VALUES (?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                label = VALUES(label),
                price_modifier = VALUES(price_modifier),
                status = VALUES(status)
            "#,
        )
        .bind(spot.id().value())
        .bind(spot.campsite_id().value())
        .bind(spot.accommodation_type_id().value())
        .bind(spot.label())
        .bind(spot.price_modifier())
        .bind(spot.status().to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("区画の保存に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        Ok(())
    }
}
