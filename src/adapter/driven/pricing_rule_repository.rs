use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{AccommodationTypeId, CampsiteId, SeasonalPricingRule};
use crate::domain::port::{PricingRuleRepository, RepositoryError};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{MySql, Pool, Row};

/// MySQL季節料金ルールリポジトリ
pub struct MySqlPricingRuleRepository {
    pool: Pool<MySql>,
}

impl MySqlPricingRuleRepository {
    /// 新しいMySQL季節料金ルールリポジトリを作成
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    /// データベースの行から季節料金ルールを再構築する
    fn build_rule_from_row(
        &self,
        row: &sqlx::mysql::MySqlRow,
    ) -> Result<SeasonalPricingRule, RepositoryError> {
        let campsite_id = CampsiteId::new(row.get("campsite_id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("キャンプ場IDの解析に失敗しました: {}", e))
        })?;

        let accommodation_type_id =
            AccommodationTypeId::new(row.get("accommodation_type_id")).map_err(|e| {
                RepositoryError::FetchFailed(format!("宿泊タイプIDの解析に失敗しました: {}", e))
            })?;

        Ok(SeasonalPricingRule::reconstruct(
            row.get::<i64, _>("id"),
            campsite_id,
            accommodation_type_id,
            row.get("season_name"),
            row.get::<NaiveDate, _>("start_date"),
            row.get::<NaiveDate, _>("end_date"),
            row.get::<Decimal, _>("multiplier"),
            row.get::<bool, _>("active"),
        ))
    }
}

#[async_trait]
impl PricingRuleRepository for MySqlPricingRuleRepository {
    async fn find_for(
        &self,
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
    ) -> Result<Vec<SeasonalPricingRule>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM seasonal_pricing_rules
            WHERE campsite_id = ? AND accommodation_type_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(campsite_id.value())
        .bind(accommodation_type_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::QueryError(format!("季節料金ルールの取得に失敗しました: {}", e))
        })
        .map_err(RepositoryError::from)?;

        rows.iter().map(|row| self.build_rule_from_row(row)).collect()
    }

    async fn save(&self, rule: &SeasonalPricingRule) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO seasonal_pricing_rules (
                id, campsite_id, accommodation_type_id, season_name,
                start_date, end_date, multiplier, active
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                season_name = VALUES(season_name),
                start_date = VALUES(start_date),
                end_date = VALUES(end_date),
                multiplier = VALUES(multiplier),
                active = VALUES(active)
            "#,
        )
        .bind(rule.id())
        .bind(rule.campsite_id().value())
        .bind(rule.accommodation_type_id().value())
        .bind(rule.season_name())
        .bind(rule.start_date())
        .bind(rule.end_date())
        .bind(rule.multiplier())
        .bind(rule.is_active())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::QueryError(format!("季節料金ルールの保存に失敗しました: {}", e))
        })
        .map_err(RepositoryError::from)?;

        Ok(())
    }
}
