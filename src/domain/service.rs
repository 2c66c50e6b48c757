// ドメインサービス
// 複数の集約にまたがるビジネスロジックを実装

use crate::domain::error::DomainError;
use crate::domain::model::{
    AccommodationTypeId, CampsiteId, DateRange, Money, SeasonalPricingRule,
};
use crate::domain::port::{AvailabilityRepository, DiscountCodeRepository};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;

/// 空き枠サービス
/// 滞在期間全体にまたがる空き枠の予約・解放を担当する。
/// 台帳の更新は全日成功か全日失敗のどちらかであり、
/// 一部の日だけ予約された状態は永続化されない。
pub struct AvailabilityService {
    availability_repository: Arc<dyn AvailabilityRepository>,
}

impl AvailabilityService {
    /// 新しい空き枠サービスを作成
    ///
    /// # Arguments
    /// * `availability_repository` - 空き枠台帳リポジトリ
    pub fn new(availability_repository: Arc<dyn AvailabilityRepository>) -> Self {
        Self {
            availability_repository,
        }
    }

    /// 滞在期間の全日について空き枠を予約する
    /// 台帳レコードが存在しない日は空きなしとして扱う。
    /// 空き判定と更新はリポジトリ側で不可分に行われるため、
    /// 同時実行される予約どうしで枠を二重に確保することはない。
    ///
    /// # Arguments
    /// * `campsite_id` - キャンプ場ID
    /// * `accommodation_type_id` - 宿泊タイプID
    /// * `period` - 滞在期間
    /// * `count` - 予約する単位数
    ///
    /// # Returns
    /// * `Ok(())` - 予約成功
    /// * `Err(DomainError)` - 空き不足または永続化失敗
    pub async fn reserve_stay(
        &self,
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
        period: DateRange,
        count: u32,
    ) -> Result<(), DomainError> {
        if count == 0 {
            return Err(DomainError::InvalidCount);
        }

        let reserved = self
            .availability_repository
            .reserve_range(campsite_id, accommodation_type_id, period, count)
            .await
            .map_err(|e| DomainError::RepositoryError(format!("空き枠の予約に失敗: {}", e)))?;

        if !reserved {
            return Err(DomainError::InsufficientAvailability);
        }

        Ok(())
    }

    /// 滞在期間の全日について空き枠を解放する（キャンセル時など）
    ///
    /// # Arguments
    /// * `campsite_id` - キャンプ場ID
    /// * `accommodation_type_id` - 宿泊タイプID
    /// * `period` - 滞在期間
    /// * `count` - 解放する単位数
    pub async fn release_stay(
        &self,
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
        period: DateRange,
        count: u32,
    ) -> Result<(), DomainError> {
        if count == 0 {
            return Err(DomainError::InvalidCount);
        }

        let released = self
            .availability_repository
            .release_range(campsite_id, accommodation_type_id, period, count)
            .await
            .map_err(|e| DomainError::RepositoryError(format!("空き枠の解放に失敗: {}", e)))?;

        if !released {
            return Err(DomainError::OverRelease);
        }

        Ok(())
    }

    /// 滞在期間の全日に指定数の空きがあるかチェックする
    pub async fn has_availability(
        &self,
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
        period: DateRange,
        count: u32,
    ) -> Result<bool, DomainError> {
        let records = self
            .availability_repository
            .find_range(campsite_id, accommodation_type_id, period)
            .await
            .map_err(|e| DomainError::RepositoryError(format!("空き枠の取得に失敗: {}", e)))?;

        if records.len() as i64 != period.nights() {
            return Ok(false);
        }

        Ok(records.iter().all(|r| r.has_availability(count)))
    }
}

/// 割引サービス
/// 割引コードの検証・計算・使用記録をひとつの操作として扱う。
/// 使用回数の判定と加算はリポジトリ側で不可分に行われるため、
/// 同時に同じコードが使われても上限を超えることはない。
pub struct DiscountService {
    discount_code_repository: Arc<dyn DiscountCodeRepository>,
}

impl DiscountService {
    /// 新しい割引サービスを作成
    pub fn new(discount_code_repository: Arc<dyn DiscountCodeRepository>) -> Self {
        Self {
            discount_code_repository,
        }
    }

    /// 割引コードを適用して割引額を返す
    /// 検証・計算・使用回数の記録をまとめて行う。計算に成功した
    /// 場合のみ使用回数が増える。
    ///
    /// # Arguments
    /// * `code` - コード文字列（正規化前でもよい）
    /// * `amount` - 割引前の予約合計
    /// * `today` - 本日の日付
    ///
    /// # Returns
    /// * `Ok(Money)` - 割引額
    /// * `Err(DomainError)` - 無効なコード・条件未達・永続化失敗
    pub async fn redeem(
        &self,
        code: &str,
        amount: Money,
        today: NaiveDate,
    ) -> Result<Money, DomainError> {
        let discount_code = self
            .discount_code_repository
            .find_by_code(code)
            .await
            .map_err(|e| DomainError::RepositoryError(format!("割引コードの取得に失敗: {}", e)))?
            .ok_or_else(|| {
                DomainError::InvalidValue(format!("割引コードが見つかりません: {}", code))
            })?;

        if !discount_code.is_valid(today) {
            return Err(DomainError::InvalidValue(format!(
                "割引コードは使用できません: {}",
                discount_code.code()
            )));
        }

        let discount = discount_code.calculate_discount(amount)?;

        // 読み取り後に他の予約がコードを使い切っていた場合はここで弾かれる
        let recorded = self
            .discount_code_repository
            .record_usage(discount_code.code())
            .await
            .map_err(|e| {
                DomainError::RepositoryError(format!("割引コード使用回数の記録に失敗: {}", e))
            })?;

        if !recorded {
            return Err(DomainError::UsageExhausted);
        }

        Ok(discount)
    }

    /// 使用記録を1件取り消す（予約確定の巻き戻し時）
    pub async fn refund(&self, code: &str) -> Result<(), DomainError> {
        self.discount_code_repository
            .refund_usage(code)
            .await
            .map_err(|e| {
                DomainError::RepositoryError(format!("割引コード使用記録の取り消しに失敗: {}", e))
            })
    }

    /// 割引コードが指定日に使用可能かチェックする（使用記録は行わない）
    pub async fn validate(&self, code: &str, today: NaiveDate) -> Result<bool, DomainError> {
        let discount_code = self
            .discount_code_repository
            .find_by_code(code)
            .await
            .map_err(|e| DomainError::RepositoryError(format!("割引コードの取得に失敗: {}", e)))?;

        Ok(discount_code.map(|c| c.is_valid(today)).unwrap_or(false))
    }
}

/// 1泊分の料金明細
#[derive(Debug, Clone, PartialEq)]
pub struct NightlyRate {
    /// 宿泊日
    pub date: NaiveDate,
    /// 適用されたシーズン名
    pub season_name: String,
    /// 適用された価格係数
    pub multiplier: Decimal,
    /// この1泊の価格
    pub price: Money,
}

/// 滞在全体の料金見積もり
#[derive(Debug, Clone, PartialEq)]
pub struct StayQuote {
    /// 各泊の明細（宿泊日の昇順）
    pub nights: Vec<NightlyRate>,
    /// 滞在全体の合計金額
    pub total: Money,
    /// 全泊の平均価格係数
    pub average_multiplier: Decimal,
    /// 複数のシーズンにまたがるか
    pub spans_multiple_seasons: bool,
}

/// 料金サービス
/// 季節料金ルールと区画の価格係数から滞在の料金を計算する。
/// 純粋な計算のみでリポジトリには依存しない。
pub struct PricingService;

/// ルールが適用されない日のシーズン名
const REGULAR_SEASON: &str = "Regular";

impl PricingService {
    /// 指定日に適用するルールを1つ選択する
    /// 複数のルールが競合した場合は決定的に解決する:
    /// 1. 日付窓が最も狭いルール（より specific な意図を優先）
    /// 2. 係数が最も大きいルール
    /// 3. ルールIDが最も小さいルール
    fn resolve_rule_for_date<'a>(
        rules: &'a [SeasonalPricingRule],
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
        date: NaiveDate,
    ) -> Option<&'a SeasonalPricingRule> {
        rules
            .iter()
            .filter(|r| r.matches(campsite_id, accommodation_type_id) && r.applies_on(date))
            .min_by(|a, b| {
                a.window_days()
                    .cmp(&b.window_days())
                    .then(b.multiplier().cmp(&a.multiplier()))
                    .then(a.id().cmp(&b.id()))
            })
    }

    /// 滞在全体の料金見積もりを計算する
    /// 各泊にそれぞれの日のルールを適用し、明細と合計を返す。
    ///
    /// # Arguments
    /// * `rules` - 候補となる季節料金ルール
    /// * `campsite_id` - キャンプ場ID
    /// * `accommodation_type_id` - 宿泊タイプID
    /// * `base_price_per_night` - 1泊あたりの基本価格（0より大きい）
    /// * `period` - 滞在期間
    /// * `spot_modifier` - 区画の価格係数（0より大きい）
    ///
    /// # Returns
    /// * `Ok(StayQuote)` - 見積もり
    /// * `Err(DomainError)` - 無効な入力
    pub fn quote_stay(
        rules: &[SeasonalPricingRule],
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
        base_price_per_night: Money,
        period: DateRange,
        spot_modifier: Decimal,
    ) -> Result<StayQuote, DomainError> {
        if base_price_per_night.amount() <= Decimal::ZERO {
            return Err(DomainError::NonPositivePrice);
        }
        if spot_modifier <= Decimal::ZERO {
            return Err(DomainError::NonPositiveModifier);
        }

        let spot_adjusted = base_price_per_night.multiply(spot_modifier);

        let mut nights = Vec::with_capacity(period.nights() as usize);
        let mut total = Money::zero();
        let mut multiplier_sum = Decimal::ZERO;

        for date in period.dates() {
            let (season_name, multiplier) =
                match Self::resolve_rule_for_date(rules, campsite_id, accommodation_type_id, date)
                {
                    Some(rule) => (rule.season_name().to_string(), rule.multiplier()),
                    None => (REGULAR_SEASON.to_string(), Decimal::ONE),
                };

            let price = spot_adjusted.multiply(multiplier);
            total = total.add(&price)?;
            multiplier_sum += multiplier;

            nights.push(NightlyRate {
                date,
                season_name,
                multiplier,
                price,
            });
        }

        let night_count = Decimal::from(nights.len() as u32);
        let average_multiplier = multiplier_sum / night_count;
        let spans_multiple_seasons = nights
            .windows(2)
            .any(|pair| pair[0].season_name != pair[1].season_name);

        Ok(StayQuote {
            nights,
            total,
            average_multiplier,
            spans_multiple_seasons,
        })
    }
}
