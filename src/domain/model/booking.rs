use crate::domain::error::DomainError;
use crate::domain::event::{BookingCancelled, BookingConfirmed, BookingCreated};
use crate::domain::model::{
    AccommodationTypeId, BookingId, BookingStatus, CampsiteId, DateRange, GuestId, Money, SpotId,
};
use chrono::{DateTime, Utc};

/// 大人の人数の許容範囲
const ADULTS_RANGE: std::ops::RangeInclusive<u32> = 1..=10;
/// 子供の人数の許容範囲
const CHILDREN_RANGE: std::ops::RangeInclusive<u32> = 0..=10;

/// Booking集約
/// 予約のライフサイクルを管理し、ビジネスルールを適用する。
/// 状態を変更する操作は、成功時に対応するドメインイベントを値として返す。
/// イベントは集約内に蓄積されないため、発行漏れや二重発行が起こらない。
#[derive(Debug, Clone)]
pub struct Booking {
    id: BookingId,
    guest_id: GuestId,
    campsite_id: CampsiteId,
    accommodation_type_id: AccommodationTypeId,
    spot_id: Option<SpotId>,
    stay_period: DateRange,
    status: BookingStatus,
    base_price: Money,
    total_price: Money,
    adults: u32,
    children: u32,
    special_requests: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    cancelled_at: Option<DateTime<Utc>>,
}

impl Booking {
    /// 新しい予約を作成
    /// すべての不変条件を検証してから生成するため、不正な状態の
    /// インスタンスは存在し得ない。初期ステータスはPending、
    /// 合計金額は基本価格と等しい。
    ///
    /// # Arguments
    /// * `id` - 予約ID
    /// * `guest_id` - ゲストID
    /// * `campsite_id` - キャンプ場ID
    /// * `accommodation_type_id` - 宿泊タイプID
    /// * `stay_period` - 滞在期間
    /// * `base_price` - 1泊あたりの基本価格
    /// * `adults` - 大人の人数（1〜10）
    /// * `children` - 子供の人数（0〜10）
    /// * `special_requests` - 特別リクエスト（任意）
    /// * `now` - 現在時刻（Clockポートから供給）
    ///
    /// # Returns
    /// * `Ok((Booking, BookingCreated))` - 作成された予約とイベント
    /// * `Err(DomainError)` - 不変条件違反
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        id: BookingId,
        guest_id: GuestId,
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
        stay_period: DateRange,
        base_price: Money,
        adults: u32,
        children: u32,
        special_requests: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(Self, BookingCreated), DomainError> {
        // チェックインは本日以降
        if stay_period.start() < now.date_naive() {
            return Err(DomainError::InvalidStayPeriod(format!(
                "チェックイン日({})が過去です",
                stay_period.start()
            )));
        }

        // 人数のバリデーション
        if !ADULTS_RANGE.contains(&adults) {
            return Err(DomainError::InvalidPartySize(format!(
                "大人の人数は1〜10名である必要があります: {}",
                adults
            )));
        }
        if !CHILDREN_RANGE.contains(&children) {
            return Err(DomainError::InvalidPartySize(format!(
                "子供の人数は0〜10名である必要があります: {}",
                children
            )));
        }

        // 基本価格は負であってはならない
        if base_price.is_negative() {
            return Err(DomainError::NegativeAmount);
        }

        let booking = Self {
            id,
            guest_id,
            campsite_id,
            accommodation_type_id,
            spot_id: None,
            stay_period,
            status: BookingStatus::Pending,
            base_price,
            total_price: base_price,
            adults,
            children,
            special_requests,
            created_at: now,
            updated_at: now,
            cancelled_at: None,
        };

        let event = BookingCreated::new(id, guest_id, campsite_id, accommodation_type_id, stay_period);

        Ok((booking, event))
    }

    /// データベースから取得したデータで予約を再構築
    /// リポジトリでの使用を想定
    #[allow(clippy::too_many_arguments)]
    pub fn reconstruct(
        id: BookingId,
        guest_id: GuestId,
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
        spot_id: Option<SpotId>,
        stay_period: DateRange,
        status: BookingStatus,
        base_price: Money,
        total_price: Money,
        adults: u32,
        children: u32,
        special_requests: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        cancelled_at: Option<DateTime<Utc>>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            id,
            guest_id,
            campsite_id,
            accommodation_type_id,
            spot_id,
            stay_period,
            status,
            base_price,
            total_price,
            adults,
            children,
            special_requests,
            created_at,
            updated_at,
            cancelled_at,
        })
    }

    /// 予約IDを取得
    pub fn id(&self) -> BookingId {
        self.id
    }

    /// ゲストIDを取得
    pub fn guest_id(&self) -> GuestId {
        self.guest_id
    }

    /// キャンプ場IDを取得
    pub fn campsite_id(&self) -> CampsiteId {
        self.campsite_id
    }

    /// 宿泊タイプIDを取得
    pub fn accommodation_type_id(&self) -> AccommodationTypeId {
        self.accommodation_type_id
    }

    /// 割り当て済み区画IDを取得
    pub fn spot_id(&self) -> Option<SpotId> {
        self.spot_id
    }

    /// 滞在期間を取得
    pub fn stay_period(&self) -> DateRange {
        self.stay_period
    }

    /// 予約ステータスを取得
    pub fn status(&self) -> BookingStatus {
        self.status
    }

    /// 1泊あたりの基本価格を取得
    pub fn base_price(&self) -> Money {
        self.base_price
    }

    /// 合計金額を取得
    pub fn total_price(&self) -> Money {
        self.total_price
    }

    /// 大人の人数を取得
    pub fn adults(&self) -> u32 {
        self.adults
    }

    /// 子供の人数を取得
    pub fn children(&self) -> u32 {
        self.children
    }

    /// 特別リクエストを取得
    pub fn special_requests(&self) -> Option<&str> {
        self.special_requests.as_deref()
    }

    /// 作成日時を取得
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 最終更新日時を取得
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// キャンセル日時を取得
    pub fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        self.cancelled_at
    }

    /// 宿泊数を取得
    pub fn nights(&self) -> i64 {
        self.stay_period.nights()
    }

    /// 合計人数を取得
    pub fn total_guests(&self) -> u32 {
        self.adults + self.children
    }

    /// アクティブな予約かどうか（キャンセル済み・完了済みでない）
    pub fn is_active(&self) -> bool {
        !matches!(
            self.status,
            BookingStatus::Cancelled | BookingStatus::Completed
        )
    }

    /// 変更可能な予約かどうか（PendingまたはConfirmed）
    pub fn can_be_modified(&self) -> bool {
        matches!(
            self.status,
            BookingStatus::Pending | BookingStatus::Confirmed
        )
    }

    /// 区画を割り当てる
    /// 事前条件:
    /// - ステータスがPending
    ///
    /// 空き枠台帳の更新はこのメソッドでは行わない。台帳の調整は
    /// 確定フローを所有する呼び出し側の責務となる。
    pub fn assign_spot(&mut self, spot_id: SpotId, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status != BookingStatus::Pending {
            return Err(DomainError::InvalidTransition(format!(
                "区画を割り当てられるのはPending状態のみです（現在: {}）",
                self.status
            )));
        }

        self.spot_id = Some(spot_id);
        self.touch(now);
        Ok(())
    }

    /// 予約を確定
    /// 事前条件:
    /// - ステータスがPending
    /// - 区画が割り当て済み
    pub fn confirm(&mut self, now: DateTime<Utc>) -> Result<BookingConfirmed, DomainError> {
        if self.status != BookingStatus::Pending {
            return Err(DomainError::InvalidTransition(format!(
                "予約を確定できるのはPending状態のみです（現在: {}）",
                self.status
            )));
        }

        let spot_id = self.spot_id.ok_or(DomainError::MissingAssignment)?;

        self.status = BookingStatus::Confirmed;
        self.touch(now);

        Ok(BookingConfirmed::new(
            self.id,
            self.guest_id,
            self.campsite_id,
            self.accommodation_type_id,
            spot_id,
            self.stay_period,
            self.total_price,
        ))
    }

    /// 予約をキャンセル
    /// 事前条件:
    /// - ステータスがPendingまたはConfirmed
    ///
    /// キャンセル日時を記録する。確定済みだった場合、返される
    /// イベントのwas_confirmedがtrueとなり、空き枠の解放が行われる。
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<BookingCancelled, DomainError> {
        let was_confirmed = match self.status {
            BookingStatus::Pending => false,
            BookingStatus::Confirmed => true,
            BookingStatus::Cancelled => {
                return Err(DomainError::InvalidTransition(
                    "既にキャンセル済みの予約です".to_string(),
                ));
            }
            BookingStatus::Completed => {
                return Err(DomainError::InvalidTransition(
                    "完了済みの予約はキャンセルできません".to_string(),
                ));
            }
        };

        self.status = BookingStatus::Cancelled;
        self.cancelled_at = Some(now);
        self.touch(now);

        Ok(BookingCancelled::new(
            self.id,
            self.guest_id,
            self.campsite_id,
            self.accommodation_type_id,
            self.spot_id,
            self.stay_period,
            was_confirmed,
        ))
    }

    /// 滞在を完了としてマーク
    /// 事前条件:
    /// - ステータスがConfirmed
    ///
    /// 終端遷移であり、空き枠台帳には影響しない。
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status != BookingStatus::Confirmed {
            return Err(DomainError::InvalidTransition(format!(
                "完了にできるのはConfirmed状態のみです（現在: {}）",
                self.status
            )));
        }

        self.status = BookingStatus::Completed;
        self.touch(now);
        Ok(())
    }

    /// 合計金額を更新
    /// 事前条件:
    /// - キャンセル済み・完了済みでない
    /// - 新しい金額が負でない
    pub fn reprice(&mut self, new_total: Money, now: DateTime<Utc>) -> Result<(), DomainError> {
        if !self.can_be_modified() {
            return Err(DomainError::InvalidTransition(format!(
                "キャンセル済み・完了済みの予約の金額は変更できません（現在: {}）",
                self.status
            )));
        }
        if new_total.is_negative() {
            return Err(DomainError::NegativeAmount);
        }

        self.total_price = new_total;
        self.touch(now);
        Ok(())
    }

    /// 特別リクエストを更新
    /// 事前条件はrepriceと同じ
    pub fn update_special_requests(
        &mut self,
        text: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if !self.can_be_modified() {
            return Err(DomainError::InvalidTransition(format!(
                "キャンセル済み・完了済みの予約は変更できません（現在: {}）",
                self.status
            )));
        }

        self.special_requests = text;
        self.touch(now);
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use rust_decimal_macros::dec;

    fn period(start: (i32, u32, u32), end: (i32, u32, u32)) -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
        )
        .unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn create_booking() -> Booking {
        let (booking, _event) = Booking::create(
            BookingId::new(),
            GuestId::new(),
            CampsiteId::new(1).unwrap(),
            AccommodationTypeId::new(1).unwrap(),
            period((2025, 7, 1), (2025, 7, 8)),
            Money::dkk(dec!(150)),
            2,
            1,
            None,
            now(),
        )
        .unwrap();
        booking
    }

    #[test]
    fn test_create_booking_is_pending_with_total_equal_to_base() {
        let booking = create_booking();
        assert_eq!(booking.status(), BookingStatus::Pending);
        assert_eq!(booking.total_price(), booking.base_price());
        assert_eq!(booking.nights(), 7);
        assert_eq!(booking.total_guests(), 3);
        assert!(booking.spot_id().is_none());
        assert!(booking.cancelled_at().is_none());
    }

    #[test]
    fn test_create_booking_emits_created_event() {
        let id = BookingId::new();
        let (booking, event) = Booking::create(
            id,
            GuestId::new(),
            CampsiteId::new(1).unwrap(),
            AccommodationTypeId::new(2).unwrap(),
            period((2025, 7, 1), (2025, 7, 3)),
            Money::dkk(dec!(100)),
            1,
            0,
            None,
            now(),
        )
        .unwrap();
        assert_eq!(event.booking_id, id);
        assert_eq!(event.stay_period, booking.stay_period());
    }

    #[test]
    fn test_create_booking_in_past_fails() {
        let result = Booking::create(
            BookingId::new(),
            GuestId::new(),
            CampsiteId::new(1).unwrap(),
            AccommodationTypeId::new(1).unwrap(),
            period((2025, 5, 1), (2025, 5, 3)),
            Money::dkk(dec!(100)),
            2,
            0,
            None,
            now(),
        );
        assert!(matches!(result, Err(DomainError::InvalidStayPeriod(_))));
    }

    #[test]
    fn test_create_booking_invalid_party_size_fails() {
        for (adults, children) in [(0u32, 0u32), (11, 0), (2, 11)] {
            let result = Booking::create(
                BookingId::new(),
                GuestId::new(),
                CampsiteId::new(1).unwrap(),
                AccommodationTypeId::new(1).unwrap(),
                period((2025, 7, 1), (2025, 7, 3)),
                Money::dkk(dec!(100)),
                adults,
                children,
                None,
                now(),
            );
            assert!(matches!(result, Err(DomainError::InvalidPartySize(_))));
        }
    }

    #[test]
    fn test_assign_spot_while_pending() {
        let mut booking = create_booking();
        let spot_id = SpotId::new(42).unwrap();
        assert!(booking.assign_spot(spot_id, now()).is_ok());
        assert_eq!(booking.spot_id(), Some(spot_id));
    }

    #[test]
    fn test_assign_spot_after_confirm_fails() {
        let mut booking = create_booking();
        booking.assign_spot(SpotId::new(1).unwrap(), now()).unwrap();
        booking.confirm(now()).unwrap();

        let result = booking.assign_spot(SpotId::new(2).unwrap(), now());
        assert!(matches!(result, Err(DomainError::InvalidTransition(_))));
    }

    #[test]
    fn test_confirm_without_spot_fails_with_missing_assignment() {
        let mut booking = create_booking();
        let result = booking.confirm(now());
        assert_eq!(result.unwrap_err(), DomainError::MissingAssignment);
        // ステータスは変わらない
        assert_eq!(booking.status(), BookingStatus::Pending);
    }

    #[test]
    fn test_confirm_with_spot_succeeds_and_emits_event() {
        let mut booking = create_booking();
        let spot_id = SpotId::new(7).unwrap();
        booking.assign_spot(spot_id, now()).unwrap();

        let event = booking.confirm(now()).unwrap();
        assert_eq!(booking.status(), BookingStatus::Confirmed);
        assert_eq!(event.spot_id, spot_id);
        assert_eq!(event.total_amount, booking.total_price());
    }

    #[test]
    fn test_cancel_pending_booking() {
        let mut booking = create_booking();
        let event = booking.cancel(now()).unwrap();
        assert_eq!(booking.status(), BookingStatus::Cancelled);
        assert!(booking.cancelled_at().is_some());
        assert!(!event.was_confirmed);
    }

    #[test]
    fn test_cancel_confirmed_booking_flags_release() {
        let mut booking = create_booking();
        booking.assign_spot(SpotId::new(1).unwrap(), now()).unwrap();
        booking.confirm(now()).unwrap();

        let event = booking.cancel(now()).unwrap();
        assert_eq!(booking.status(), BookingStatus::Cancelled);
        assert!(event.was_confirmed);
    }

    #[test]
    fn test_cancel_twice_fails() {
        let mut booking = create_booking();
        booking.cancel(now()).unwrap();
        let result = booking.cancel(now());
        assert!(matches!(result, Err(DomainError::InvalidTransition(_))));
    }

    #[test]
    fn test_cancel_completed_booking_fails() {
        let mut booking = create_booking();
        booking.assign_spot(SpotId::new(1).unwrap(), now()).unwrap();
        booking.confirm(now()).unwrap();
        booking.complete(now()).unwrap();

        let result = booking.cancel(now());
        assert!(matches!(result, Err(DomainError::InvalidTransition(_))));
    }

    #[test]
    fn test_complete_from_confirmed() {
        let mut booking = create_booking();
        booking.assign_spot(SpotId::new(1).unwrap(), now()).unwrap();
        booking.confirm(now()).unwrap();

        assert!(booking.complete(now()).is_ok());
        assert_eq!(booking.status(), BookingStatus::Completed);
    }

    #[test]
    fn test_complete_from_pending_fails() {
        let mut booking = create_booking();
        let result = booking.complete(now());
        assert!(matches!(result, Err(DomainError::InvalidTransition(_))));
    }

    #[test]
    fn test_reprice_updates_total() {
        let mut booking = create_booking();
        booking.reprice(Money::dkk(dec!(1575)), now()).unwrap();
        assert_eq!(booking.total_price().amount(), dec!(1575));
    }

    #[test]
    fn test_reprice_negative_fails() {
        let mut booking = create_booking();
        let result = booking.reprice(Money::dkk(dec!(-1)), now());
        assert_eq!(result.unwrap_err(), DomainError::NegativeAmount);
    }

    #[test]
    fn test_reprice_after_cancel_fails() {
        let mut booking = create_booking();
        booking.cancel(now()).unwrap();
        let result = booking.reprice(Money::dkk(dec!(100)), now());
        assert!(matches!(result, Err(DomainError::InvalidTransition(_))));
    }

    #[test]
    fn test_update_special_requests() {
        let mut booking = create_booking();
        booking
            .update_special_requests(Some("静かな区画を希望".to_string()), now())
            .unwrap();
        assert_eq!(booking.special_requests(), Some("静かな区画を希望"));
    }

    #[test]
    fn test_update_special_requests_after_complete_fails() {
        let mut booking = create_booking();
        booking.assign_spot(SpotId::new(1).unwrap(), now()).unwrap();
        booking.confirm(now()).unwrap();
        booking.complete(now()).unwrap();

        let result = booking.update_special_requests(Some("変更".to_string()), now());
        assert!(matches!(result, Err(DomainError::InvalidTransition(_))));
    }

    #[test]
    fn test_is_active_and_can_be_modified() {
        let mut booking = create_booking();
        assert!(booking.is_active());
        assert!(booking.can_be_modified());

        booking.assign_spot(SpotId::new(1).unwrap(), now()).unwrap();
        booking.confirm(now()).unwrap();
        assert!(booking.is_active());
        assert!(booking.can_be_modified());

        booking.complete(now()).unwrap();
        assert!(!booking.is_active());
        assert!(!booking.can_be_modified());
    }

    #[test]
    fn test_timestamps_come_from_supplied_clock() {
        let mut booking = create_booking();
        assert_eq!(booking.created_at(), now());
        assert_eq!(booking.updated_at(), now());

        let later = Utc.with_ymd_and_hms(2025, 6, 2, 9, 30, 0).unwrap();
        booking.cancel(later).unwrap();
        assert_eq!(booking.cancelled_at(), Some(later));
        assert_eq!(booking.updated_at(), later);
    }
}
