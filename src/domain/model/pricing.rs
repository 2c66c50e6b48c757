use crate::domain::error::DomainError;
use crate::domain::model::{AccommodationTypeId, CampsiteId};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// 季節料金ルール
/// 日付窓（両端を含む）と価格係数の組。ハイシーズンには1.0より大きい
/// 係数、オフシーズンには1.0より小さい係数を設定する。
#[derive(Debug, Clone)]
pub struct SeasonalPricingRule {
    id: i64,
    campsite_id: CampsiteId,
    accommodation_type_id: AccommodationTypeId,
    season_name: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    multiplier: Decimal,
    active: bool,
}

impl SeasonalPricingRule {
    /// 新しい季節料金ルールを作成
    ///
    /// # Arguments
    /// * `id` - ルールID
    /// * `campsite_id` - 対象キャンプ場ID
    /// * `accommodation_type_id` - 対象宿泊タイプID
    /// * `season_name` - シーズン名（例: "High season"）
    /// * `start_date` - 適用開始日（含む）
    /// * `end_date` - 適用終了日（含む）
    /// * `multiplier` - 価格係数（0より大きい）
    pub fn new(
        id: i64,
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
        season_name: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
        multiplier: Decimal,
    ) -> Result<Self, DomainError> {
        if multiplier <= Decimal::ZERO {
            return Err(DomainError::NonPositiveModifier);
        }
        if end_date < start_date {
            return Err(DomainError::InvalidRange(format!(
                "終了日({})は開始日({})以降である必要があります",
                end_date, start_date
            )));
        }

        Ok(Self {
            id,
            campsite_id,
            accommodation_type_id,
            season_name,
            start_date,
            end_date,
            multiplier,
            active: true,
        })
    }

    /// データベースから取得したデータで再構築
    #[allow(clippy::too_many_arguments)]
    pub fn reconstruct(
        id: i64,
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
        season_name: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
        multiplier: Decimal,
        active: bool,
    ) -> Self {
        Self {
            id,
            campsite_id,
            accommodation_type_id,
            season_name,
            start_date,
            end_date,
            multiplier,
            active,
        }
    }

    /// ルールIDを取得
    pub fn id(&self) -> i64 {
        self.id
    }

    /// 対象キャンプ場IDを取得
    pub fn campsite_id(&self) -> CampsiteId {
        self.campsite_id
    }

    /// 対象宿泊タイプIDを取得
    pub fn accommodation_type_id(&self) -> AccommodationTypeId {
        self.accommodation_type_id
    }

    /// シーズン名を取得
    pub fn season_name(&self) -> &str {
        &self.season_name
    }

    /// 適用開始日を取得
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// 適用終了日（含む）を取得
    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// 価格係数を取得
    pub fn multiplier(&self) -> Decimal {
        self.multiplier
    }

    /// 有効かどうか
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// 日付窓の長さ（日数、両端を含む）
    /// 複数ルールが競合した際の優先度判定に使用する
    pub fn window_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// 指定日に適用されるか（窓は両端を含む）
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        self.active && self.start_date <= date && date <= self.end_date
    }

    /// 指定のキャンプ場・宿泊タイプを対象とするか
    pub fn matches(&self, campsite_id: CampsiteId, accommodation_type_id: AccommodationTypeId) -> bool {
        self.campsite_id == campsite_id && self.accommodation_type_id == accommodation_type_id
    }

    /// ルールを無効化する
    pub fn deactivate(&mut self) {
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rule(start: (u32, u32), end: (u32, u32), multiplier: Decimal) -> SeasonalPricingRule {
        SeasonalPricingRule::new(
            1,
            CampsiteId::new(1).unwrap(),
            AccommodationTypeId::new(1).unwrap(),
            "High season".to_string(),
            NaiveDate::from_ymd_opt(2025, start.0, start.1).unwrap(),
            NaiveDate::from_ymd_opt(2025, end.0, end.1).unwrap(),
            multiplier,
        )
        .unwrap()
    }

    #[test]
    fn test_rule_window_is_inclusive() {
        let rule = rule((6, 15), (8, 15), dec!(1.5));
        assert!(rule.applies_on(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()));
        assert!(rule.applies_on(NaiveDate::from_ymd_opt(2025, 8, 15).unwrap()));
        assert!(!rule.applies_on(NaiveDate::from_ymd_opt(2025, 6, 14).unwrap()));
        assert!(!rule.applies_on(NaiveDate::from_ymd_opt(2025, 8, 16).unwrap()));
    }

    #[test]
    fn test_inactive_rule_never_applies() {
        let mut rule = rule((6, 1), (8, 31), dec!(1.5));
        rule.deactivate();
        assert!(!rule.applies_on(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()));
    }

    #[test]
    fn test_single_day_window_is_valid() {
        let rule = rule((7, 1), (7, 1), dec!(2.0));
        assert_eq!(rule.window_days(), 1);
        assert!(rule.applies_on(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()));
    }

    #[test]
    fn test_non_positive_multiplier_fails() {
        let result = SeasonalPricingRule::new(
            1,
            CampsiteId::new(1).unwrap(),
            AccommodationTypeId::new(1).unwrap(),
            "Bad".to_string(),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            dec!(0),
        );
        assert_eq!(result.unwrap_err(), DomainError::NonPositiveModifier);
    }

    #[test]
    fn test_end_before_start_fails() {
        let result = SeasonalPricingRule::new(
            1,
            CampsiteId::new(1).unwrap(),
            AccommodationTypeId::new(1).unwrap(),
            "Bad".to_string(),
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            dec!(1.2),
        );
        assert!(matches!(result, Err(DomainError::InvalidRange(_))));
    }

    #[test]
    fn test_matches_campsite_and_type() {
        let rule = rule((6, 1), (8, 31), dec!(1.5));
        assert!(rule.matches(
            CampsiteId::new(1).unwrap(),
            AccommodationTypeId::new(1).unwrap()
        ));
        assert!(!rule.matches(
            CampsiteId::new(2).unwrap(),
            AccommodationTypeId::new(1).unwrap()
        ));
        assert!(!rule.matches(
            CampsiteId::new(1).unwrap(),
            AccommodationTypeId::new(2).unwrap()
        ));
    }

    #[test]
    fn test_window_days() {
        assert_eq!(rule((7, 1), (7, 7), dec!(1.5)).window_days(), 7);
    }
}
