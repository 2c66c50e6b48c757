use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{DiscountCode, DiscountKind, Money};
use crate::domain::port::{DiscountCodeRepository, RepositoryError};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{MySql, Pool, Row};

/// MySQL割引コードリポジトリ
pub struct MySqlDiscountCodeRepository {
    pool: Pool<MySql>,
}

impl MySqlDiscountCodeRepository {
    /// 新しいMySQL割引コードリポジトリを作成
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    /// データベースの行から割引コードを再構築する
    fn build_code_from_row(
        &self,
        row: &sqlx::mysql::MySqlRow,
    ) -> Result<DiscountCode, RepositoryError> {
        let kind = DiscountKind::from_string(row.get("kind")).map_err(|e| {
            RepositoryError::FetchFailed(format!("割引種別の解析に失敗しました: {}", e))
        })?;

        let minimum_booking_amount = Money::new(
            row.get::<Decimal, _>("minimum_booking_amount"),
            row.get("minimum_booking_currency"),
        )
        .map_err(|e| RepositoryError::FetchFailed(format!("金額の構築に失敗しました: {}", e)))?;

        Ok(DiscountCode::reconstruct(
            row.get::<i64, _>("id"),
            row.get("code"),
            row.get("description"),
            kind,
            row.get::<Decimal, _>("value"),
            row.get::<NaiveDate, _>("valid_from"),
            row.get::<NaiveDate, _>("valid_until"),
            row.get::<u32, _>("used_count"),
            row.get::<u32, _>("max_uses"),
            minimum_booking_amount,
            row.get::<bool, _>("active"),
        ))
    }
}

#[async_trait]
impl DiscountCodeRepository for MySqlDiscountCodeRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<DiscountCode>, RepositoryError> {
        // 照合前にコードを正規化する
        let normalized = DiscountCode::normalize(code);

        let row = sqlx::query("SELECT * FROM discount_codes WHERE code = ?")
            .bind(normalized)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("割引コードの取得に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

        match row {
            Some(row) => Ok(Some(self.build_code_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, discount_code: &DiscountCode) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO discount_codes (
                id, code, description, kind, value,
                valid_from, valid_until, used_count, max_uses,
                minimum_booking_amount, minimum_booking_currency, active
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                description = VALUES(description),
                kind = VALUES(kind),
                value = VALUES(value),
                valid_from = VALUES(valid_from),
                valid_until = VALUES(valid_until),
                used_count = VALUES(used_count),
                max_uses = VALUES(max_uses),
                minimum_booking_amount = VALUES(minimum_booking_amount),
                minimum_booking_currency = VALUES(minimum_booking_currency),
                active = VALUES(active)
            "#,
        )
        .bind(discount_code.id())
        .bind(discount_code.code())
        .bind(discount_code.description())
        .bind(discount_code.kind().to_string())
        .bind(discount_code.value())
        .bind(discount_code.valid_from())
        .bind(discount_code.valid_until())
        .bind(discount_code.used_count())
        .bind(discount_code.max_uses())
        .bind(discount_code.minimum_booking_amount().amount())
        .bind(discount_code.minimum_booking_amount().currency())
        .bind(discount_code.is_active())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::QueryError(format!("割引コードの保存に失敗しました: {}", e))
        })
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn record_usage(&self, code: &str) -> Result<bool, RepositoryError> {
        let normalized = DiscountCode::normalize(code);

        // 判定と加算を1文で行う。activeは加算前のused_countで評価される
        let result = sqlx::query(
            r#"
            UPDATE discount_codes
            SET active = (max_uses = 0 OR used_count + 1 < max_uses),
                used_count = used_count + 1
            WHERE code = ? AND active = TRUE
              AND (max_uses = 0 OR used_count < max_uses)
            "#,
        )
        .bind(normalized)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::QueryError(format!("割引コード使用回数の記録に失敗しました: {}", e))
        })
        .map_err(RepositoryError::from)?;

        Ok(result.rows_affected() == 1)
    }

    async fn refund_usage(&self, code: &str) -> Result<(), RepositoryError> {
        let normalized = DiscountCode::normalize(code);

        // 上限到達で自動無効化されていた場合のみ有効に戻す
        sqlx::query(
            r#"
            UPDATE discount_codes
            SET active = (active OR used_count = max_uses),
                used_count = used_count - 1
            WHERE code = ? AND used_count > 0
            "#,
        )
        .bind(normalized)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::QueryError(format!("割引コード使用記録の取り消しに失敗しました: {}", e))
        })
        .map_err(RepositoryError::from)?;

        Ok(())
    }
}
