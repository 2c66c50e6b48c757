use crate::domain::error::DomainError;
use crate::domain::model::{AccommodationTypeId, CampsiteId, Money, SpotId};
use rust_decimal::Decimal;

/// 宿泊タイプ
/// キャンプ場が提供する宿泊形態（テント区画、キャビン、グランピングなど）の
/// カタログ情報。日々の空き状況は空き枠台帳が管理するため、
/// このエンティティは予約カウンタを持たない。
#[derive(Debug, Clone)]
pub struct AccommodationType {
    id: AccommodationTypeId,
    campsite_id: CampsiteId,
    category: String,
    max_occupancy: u32,
    base_nightly_price: Money,
    total_units: u32,
    active: bool,
}

impl AccommodationType {
    /// 新しい宿泊タイプを作成
    ///
    /// # Arguments
    /// * `id` - 宿泊タイプID
    /// * `campsite_id` - キャンプ場ID
    /// * `category` - カテゴリ名（例: "Tent", "Cabin"）
    /// * `max_occupancy` - 最大収容人数（1以上）
    /// * `base_nightly_price` - 1泊あたりの基本価格
    /// * `total_units` - 提供単位数（負の値は拒否）
    pub fn new(
        id: AccommodationTypeId,
        campsite_id: CampsiteId,
        category: String,
        max_occupancy: u32,
        base_nightly_price: Money,
        total_units: i32,
    ) -> Result<Self, DomainError> {
        if max_occupancy == 0 {
            return Err(DomainError::InvalidValue(
                "最大収容人数は1以上である必要があります".to_string(),
            ));
        }
        if total_units < 0 {
            return Err(DomainError::NegativeCapacity);
        }
        if base_nightly_price.is_negative() {
            return Err(DomainError::NegativeAmount);
        }

        Ok(Self {
            id,
            campsite_id,
            category,
            max_occupancy,
            base_nightly_price,
            total_units: total_units as u32,
            active: true,
        })
    }

    /// データベースから取得したデータで再構築
    pub fn reconstruct(
        id: AccommodationTypeId,
        campsite_id: CampsiteId,
        category: String,
        max_occupancy: u32,
        base_nightly_price: Money,
        total_units: u32,
        active: bool,
    ) -> Self {
        Self {
            id,
            campsite_id,
            category,
            max_occupancy,
            base_nightly_price,
            total_units,
            active,
        }
    }

    /// 宿泊タイプIDを取得
    pub fn id(&self) -> AccommodationTypeId {
        self.id
    }

    /// キャンプ場IDを取得
    pub fn campsite_id(&self) -> CampsiteId {
        self.campsite_id
    }

    /// カテゴリ名を取得
    pub fn category(&self) -> &str {
        &self.category
    }

    /// 最大収容人数を取得
    pub fn max_occupancy(&self) -> u32 {
        self.max_occupancy
    }

    /// 1泊あたりの基本価格を取得
    pub fn base_nightly_price(&self) -> Money {
        self.base_nightly_price
    }

    /// 提供単位数を取得
    /// 空き枠台帳の日次レコードを作成する際の初期キャパシティとなる
    pub fn total_units(&self) -> u32 {
        self.total_units
    }

    /// 提供中かどうか
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// 指定人数を収容できるかどうか
    pub fn can_accommodate(&self, guests: u32) -> bool {
        guests > 0 && guests <= self.max_occupancy
    }

    /// 提供を停止する
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// 提供を再開する
    pub fn activate(&mut self) {
        self.active = true;
    }
}

/// 区画のステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpotStatus {
    /// 空き
    Available,
    /// 予約済み
    Reserved,
    /// 使用中
    Occupied,
    /// メンテナンス中
    Maintenance,
}

impl SpotStatus {
    /// 文字列からSpotStatusを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "Available" => Ok(SpotStatus::Available),
            "Reserved" => Ok(SpotStatus::Reserved),
            "Occupied" => Ok(SpotStatus::Occupied),
            "Maintenance" => Ok(SpotStatus::Maintenance),
            _ => Err(DomainError::InvalidValue(format!(
                "無効な区画ステータス: {}",
                s
            ))),
        }
    }
}

impl std::fmt::Display for SpotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SpotStatus::Available => "Available",
            SpotStatus::Reserved => "Reserved",
            SpotStatus::Occupied => "Occupied",
            SpotStatus::Maintenance => "Maintenance",
        };
        write!(f, "{}", s)
    }
}

/// 区画
/// 宿泊タイプに属する物理的な1単位。区画ごとの価格係数を持ち、
/// 眺望の良い区画などはタイプの基本価格に係数を乗じて価格付けされる。
#[derive(Debug, Clone)]
pub struct AccommodationSpot {
    id: SpotId,
    campsite_id: CampsiteId,
    accommodation_type_id: AccommodationTypeId,
    label: String,
    price_modifier: Decimal,
    status: SpotStatus,
}

impl AccommodationSpot {
    /// 新しい区画を作成
    /// 初期ステータスはAvailable
    pub fn new(
        id: SpotId,
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
        label: String,
        price_modifier: Decimal,
    ) -> Result<Self, DomainError> {
        if price_modifier <= Decimal::ZERO {
            return Err(DomainError::NonPositiveModifier);
        }

        Ok(Self {
            id,
            campsite_id,
            accommodation_type_id,
            label,
            price_modifier,
            status: SpotStatus::Available,
        })
    }

    /// データベースから取得したデータで再構築
    pub fn reconstruct(
        id: SpotId,
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
        label: String,
        price_modifier: Decimal,
        status: SpotStatus,
    ) -> Self {
        Self {
            id,
            campsite_id,
            accommodation_type_id,
            label,
            price_modifier,
            status,
        }
    }

    /// 区画IDを取得
    pub fn id(&self) -> SpotId {
        self.id
    }

    /// キャンプ場IDを取得
    pub fn campsite_id(&self) -> CampsiteId {
        self.campsite_id
    }

    /// 所属する宿泊タイプIDを取得
    pub fn accommodation_type_id(&self) -> AccommodationTypeId {
        self.accommodation_type_id
    }

    /// ラベル（例: "A-12"）を取得
    pub fn label(&self) -> &str {
        &self.label
    }

    /// 価格係数を取得
    pub fn price_modifier(&self) -> Decimal {
        self.price_modifier
    }

    /// ステータスを取得
    pub fn status(&self) -> SpotStatus {
        self.status
    }

    /// 予約可能かどうか
    pub fn is_bookable(&self) -> bool {
        self.status == SpotStatus::Available
    }

    /// 空きとしてマーク
    /// メンテナンス中からの復帰もこの操作で行う
    pub fn mark_available(&mut self) {
        self.status = SpotStatus::Available;
    }

    /// 予約済みとしてマーク
    /// メンテナンス中の区画は予約できない
    pub fn mark_reserved(&mut self) -> Result<(), DomainError> {
        if self.status == SpotStatus::Maintenance {
            return Err(DomainError::UnderMaintenance);
        }
        self.status = SpotStatus::Reserved;
        Ok(())
    }

    /// 使用中としてマーク
    pub fn mark_occupied(&mut self) -> Result<(), DomainError> {
        if self.status == SpotStatus::Maintenance {
            return Err(DomainError::UnderMaintenance);
        }
        self.status = SpotStatus::Occupied;
        Ok(())
    }

    /// メンテナンス中としてマーク
    /// どの状態からでも遷移できる
    pub fn mark_maintenance(&mut self) {
        self.status = SpotStatus::Maintenance;
    }

    /// 価格係数を更新
    pub fn update_price_modifier(&mut self, modifier: Decimal) -> Result<(), DomainError> {
        if modifier <= Decimal::ZERO {
            return Err(DomainError::NonPositiveModifier);
        }
        self.price_modifier = modifier;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn accommodation_type() -> AccommodationType {
        AccommodationType::new(
            AccommodationTypeId::new(1).unwrap(),
            CampsiteId::new(1).unwrap(),
            "Cabin".to_string(),
            4,
            Money::dkk(dec!(150)),
            5,
        )
        .unwrap()
    }

    fn spot() -> AccommodationSpot {
        AccommodationSpot::new(
            SpotId::new(1).unwrap(),
            CampsiteId::new(1).unwrap(),
            AccommodationTypeId::new(1).unwrap(),
            "A-12".to_string(),
            dec!(1.0),
        )
        .unwrap()
    }

    #[test]
    fn test_accommodation_type_creation() {
        let t = accommodation_type();
        assert_eq!(t.category(), "Cabin");
        assert_eq!(t.total_units(), 5);
        assert!(t.is_active());
    }

    #[test]
    fn test_accommodation_type_zero_occupancy_fails() {
        let result = AccommodationType::new(
            AccommodationTypeId::new(1).unwrap(),
            CampsiteId::new(1).unwrap(),
            "Tent".to_string(),
            0,
            Money::dkk(dec!(100)),
            3,
        );
        assert!(matches!(result, Err(DomainError::InvalidValue(_))));
    }

    #[test]
    fn test_accommodation_type_negative_units_fails() {
        let result = AccommodationType::new(
            AccommodationTypeId::new(1).unwrap(),
            CampsiteId::new(1).unwrap(),
            "Tent".to_string(),
            2,
            Money::dkk(dec!(100)),
            -1,
        );
        assert_eq!(result.unwrap_err(), DomainError::NegativeCapacity);
    }

    #[test]
    fn test_can_accommodate() {
        let t = accommodation_type();
        assert!(t.can_accommodate(1));
        assert!(t.can_accommodate(4));
        assert!(!t.can_accommodate(5));
        assert!(!t.can_accommodate(0));
    }

    #[test]
    fn test_activate_deactivate() {
        let mut t = accommodation_type();
        t.deactivate();
        assert!(!t.is_active());
        t.activate();
        assert!(t.is_active());
    }

    #[test]
    fn test_spot_starts_available() {
        let s = spot();
        assert_eq!(s.status(), SpotStatus::Available);
        assert!(s.is_bookable());
    }

    #[test]
    fn test_spot_non_positive_modifier_fails() {
        let result = AccommodationSpot::new(
            SpotId::new(1).unwrap(),
            CampsiteId::new(1).unwrap(),
            AccommodationTypeId::new(1).unwrap(),
            "B-1".to_string(),
            dec!(0),
        );
        assert_eq!(result.unwrap_err(), DomainError::NonPositiveModifier);
    }

    #[test]
    fn test_spot_reserve_under_maintenance_fails() {
        let mut s = spot();
        s.mark_maintenance();
        assert_eq!(s.mark_reserved().unwrap_err(), DomainError::UnderMaintenance);
        assert_eq!(s.mark_occupied().unwrap_err(), DomainError::UnderMaintenance);
    }

    #[test]
    fn test_spot_maintenance_recovery() {
        let mut s = spot();
        s.mark_maintenance();
        assert_eq!(s.status(), SpotStatus::Maintenance);
        s.mark_available();
        assert!(s.is_bookable());
        assert!(s.mark_reserved().is_ok());
    }

    #[test]
    fn test_spot_update_price_modifier() {
        let mut s = spot();
        s.update_price_modifier(dec!(1.25)).unwrap();
        assert_eq!(s.price_modifier(), dec!(1.25));
        assert_eq!(
            s.update_price_modifier(dec!(-0.5)).unwrap_err(),
            DomainError::NonPositiveModifier
        );
    }

    #[test]
    fn test_spot_status_from_string() {
        assert_eq!(
            SpotStatus::from_string("Maintenance").unwrap(),
            SpotStatus::Maintenance
        );
        assert!(SpotStatus::from_string("Broken").is_err());
    }
}
