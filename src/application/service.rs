use crate::application::ApplicationError;
use crate::domain::error::DomainError;
use crate::domain::event::DomainEvent;
use crate::domain::model::{
    AccommodationSpot, AccommodationTypeId, AvailabilityRecord, Booking, BookingId, BookingStatus,
    CampsiteId, DateRange, GuestId, Money, SpotId, SpotStatus,
};
use crate::domain::port::{
    AccommodationSpotRepository, AccommodationTypeRepository, AvailabilityRepository,
    BookingRepository, Clock, EventBus, PricingRuleRepository,
};
use crate::domain::service::{AvailabilityService, DiscountService, PricingService, StayQuote};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

pub mod availability_query_service;
pub mod booking_query_service;

pub use availability_query_service::AvailabilityQueryService;
pub use booking_query_service::BookingQueryService;

/// 予約アプリケーションサービス
/// 予約ライフサイクルのユースケースを編成する。確定時の料金計算、
/// 割引適用、空き枠の予約をひとつのフローとして扱う。
pub struct BookingApplicationService {
    booking_repository: Arc<dyn BookingRepository>,
    accommodation_type_repository: Arc<dyn AccommodationTypeRepository>,
    spot_repository: Arc<dyn AccommodationSpotRepository>,
    pricing_rule_repository: Arc<dyn PricingRuleRepository>,
    availability_service: AvailabilityService,
    discount_service: DiscountService,
    event_bus: Arc<dyn EventBus>,
    clock: Arc<dyn Clock>,
}

impl BookingApplicationService {
    /// 新しい予約アプリケーションサービスを作成
    ///
    /// # Arguments
    /// * `booking_repository` - 予約リポジトリ
    /// * `accommodation_type_repository` - 宿泊タイプリポジトリ
    /// * `spot_repository` - 区画リポジトリ
    /// * `pricing_rule_repository` - 季節料金ルールリポジトリ
    /// * `availability_service` - 空き枠サービス
    /// * `discount_service` - 割引サービス
    /// * `event_bus` - イベントバス
    /// * `clock` - 時刻の供給源
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        booking_repository: Arc<dyn BookingRepository>,
        accommodation_type_repository: Arc<dyn AccommodationTypeRepository>,
        spot_repository: Arc<dyn AccommodationSpotRepository>,
        pricing_rule_repository: Arc<dyn PricingRuleRepository>,
        availability_service: AvailabilityService,
        discount_service: DiscountService,
        event_bus: Arc<dyn EventBus>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            booking_repository,
            accommodation_type_repository,
            spot_repository,
            pricing_rule_repository,
            availability_service,
            discount_service,
            event_bus,
            clock,
        }
    }

    /// イベントに相関IDを設定して発行する
    async fn publish_with_correlation_id(
        &self,
        mut event: DomainEvent,
        correlation_id: Uuid,
    ) -> Result<(), ApplicationError> {
        event.metadata_mut().correlation_id = correlation_id;
        self.event_bus
            .publish(event)
            .await
            .map_err(|e| ApplicationError::EventPublishingFailed(e.to_string()))
    }

    /// 新しい予約を作成
    /// 宿泊タイプの存在と収容人数を確認し、Pending状態の予約を作成する。
    /// この時点では空き枠は消費されない。
    ///
    /// # Arguments
    /// * `guest_id` - ゲストID
    /// * `campsite_id` - キャンプ場ID
    /// * `accommodation_type_id` - 宿泊タイプID
    /// * `stay_period` - 滞在期間
    /// * `adults` - 大人の人数
    /// * `children` - 子供の人数
    /// * `special_requests` - 特別リクエスト（任意）
    ///
    /// # Returns
    /// * `Ok(BookingId)` - 作成された予約のID
    /// * `Err(ApplicationError)` - 作成失敗
    #[allow(clippy::too_many_arguments)]
    pub async fn create_booking(
        &self,
        guest_id: GuestId,
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
        stay_period: DateRange,
        adults: u32,
        children: u32,
        special_requests: Option<String>,
    ) -> Result<BookingId, ApplicationError> {
        let accommodation_type = self
            .accommodation_type_repository
            .find_by_id(accommodation_type_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!(
                    "宿泊タイプが見つかりません: {}",
                    accommodation_type_id
                ))
            })?;

        if !accommodation_type.is_active() {
            return Err(ApplicationError::DomainError(DomainError::InvalidValue(
                format!("宿泊タイプは提供を停止しています: {}", accommodation_type_id),
            )));
        }

        if !accommodation_type.can_accommodate(adults + children) {
            return Err(ApplicationError::DomainError(DomainError::InvalidPartySize(
                format!(
                    "最大収容人数({}名)を超えています: {}名",
                    accommodation_type.max_occupancy(),
                    adults + children
                ),
            )));
        }

        let booking_id = self.booking_repository.next_identity();
        let (booking, event) = Booking::create(
            booking_id,
            guest_id,
            campsite_id,
            accommodation_type_id,
            stay_period,
            accommodation_type.base_nightly_price(),
            adults,
            children,
            special_requests,
            self.clock.now(),
        )?;

        self.booking_repository.save(&booking).await?;

        let correlation_id = Uuid::new_v4();
        self.publish_with_correlation_id(DomainEvent::BookingCreated(event), correlation_id)
            .await?;

        Ok(booking_id)
    }

    /// 予約に区画を割り当てる
    /// 区画は予約の宿泊タイプに属し、メンテナンス中でないこと。
    ///
    /// # Arguments
    /// * `booking_id` - 予約ID
    /// * `spot_id` - 割り当てる区画ID
    pub async fn assign_spot(
        &self,
        booking_id: BookingId,
        spot_id: SpotId,
    ) -> Result<(), ApplicationError> {
        let mut booking = self.find_booking(booking_id).await?;

        let spot = self
            .spot_repository
            .find_by_id(spot_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("区画が見つかりません: {}", spot_id))
            })?;

        if spot.accommodation_type_id() != booking.accommodation_type_id() {
            return Err(ApplicationError::DomainError(DomainError::InvalidValue(
                format!(
                    "区画{}は予約の宿泊タイプ{}に属していません",
                    spot_id,
                    booking.accommodation_type_id()
                ),
            )));
        }

        if spot.status() == SpotStatus::Maintenance {
            return Err(ApplicationError::DomainError(DomainError::UnderMaintenance));
        }

        booking.assign_spot(spot_id, self.clock.now())?;
        self.booking_repository.save(&booking).await?;

        Ok(())
    }

    /// 予約を確定
    /// 季節料金と区画の価格係数から合計金額を計算し、滞在期間の全日の
    /// 空き枠を予約した上で、任意の割引コードを適用する。割引の使用
    /// 記録は空き枠の確保後にのみ行われるため、空き不足で失敗した
    /// 確定がコードを消費することはない。空き枠の予約後に後続の手順が
    /// 失敗した場合は、空き枠・区画・割引の使用記録を巻き戻す。
    ///
    /// # Arguments
    /// * `booking_id` - 予約ID
    /// * `discount_code` - 適用する割引コード（任意）
    ///
    /// # Returns
    /// * `Ok(Money)` - 確定した合計金額
    /// * `Err(ApplicationError)` - 確定失敗
    pub async fn confirm_booking(
        &self,
        booking_id: BookingId,
        discount_code: Option<String>,
    ) -> Result<Money, ApplicationError> {
        let mut booking = self.find_booking(booking_id).await?;

        // 事前条件の検証（空き枠を消費する前に失敗を検出する）
        if booking.status() != BookingStatus::Pending {
            return Err(ApplicationError::DomainError(DomainError::InvalidTransition(
                format!(
                    "予約を確定できるのはPending状態のみです（現在: {}）",
                    booking.status()
                ),
            )));
        }
        let spot_id = booking
            .spot_id()
            .ok_or(ApplicationError::DomainError(DomainError::MissingAssignment))?;

        let mut spot = self
            .spot_repository
            .find_by_id(spot_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("区画が見つかりません: {}", spot_id))
            })?;

        let accommodation_type = self
            .accommodation_type_repository
            .find_by_id(booking.accommodation_type_id())
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!(
                    "宿泊タイプが見つかりません: {}",
                    booking.accommodation_type_id()
                ))
            })?;

        // 料金計算
        let rules = self
            .pricing_rule_repository
            .find_for(booking.campsite_id(), booking.accommodation_type_id())
            .await?;
        let quote = PricingService::quote_stay(
            &rules,
            booking.campsite_id(),
            booking.accommodation_type_id(),
            accommodation_type.base_nightly_price(),
            booking.stay_period(),
            spot.price_modifier(),
        )?;

        // 区画が予約済みに遷移できるか先に検証する（メモリ上の遷移のみ）
        spot.mark_reserved()?;

        // 滞在期間の全日の空き枠を予約。空き不足ならここで終わり、
        // 台帳は変化していない
        self.availability_service
            .reserve_stay(
                booking.campsite_id(),
                booking.accommodation_type_id(),
                booking.stay_period(),
                1,
            )
            .await?;

        // ここから先の失敗はすべて予約済みの空き枠を解放して巻き戻す
        if let Err(save_error) = self.spot_repository.save(&spot).await {
            self.rollback_confirmation(&booking, &mut spot, None).await;
            return Err(ApplicationError::from(save_error));
        }

        // 割引コードの適用。使用記録は空き枠の確保に成功した後でのみ行う
        let total = match discount_code.as_deref() {
            Some(code) => {
                let discount = match self
                    .discount_service
                    .redeem(code, quote.total, self.clock.today())
                    .await
                {
                    Ok(discount) => discount,
                    Err(e) => {
                        self.rollback_confirmation(&booking, &mut spot, None).await;
                        return Err(ApplicationError::from(e));
                    }
                };
                match quote.total.subtract(&discount) {
                    Ok(total) => total,
                    Err(e) => {
                        self.rollback_confirmation(&booking, &mut spot, Some(code)).await;
                        return Err(ApplicationError::from(e));
                    }
                }
            }
            None => quote.total,
        };

        let now = self.clock.now();
        if let Err(e) = booking.reprice(total, now) {
            self.rollback_confirmation(&booking, &mut spot, discount_code.as_deref())
                .await;
            return Err(ApplicationError::from(e));
        }
        let event = match booking.confirm(now) {
            Ok(event) => event,
            Err(e) => {
                self.rollback_confirmation(&booking, &mut spot, discount_code.as_deref())
                    .await;
                return Err(ApplicationError::from(e));
            }
        };

        if let Err(save_error) = self.booking_repository.save(&booking).await {
            self.rollback_confirmation(&booking, &mut spot, discount_code.as_deref())
                .await;
            return Err(ApplicationError::from(save_error));
        }

        let correlation_id = Uuid::new_v4();
        self.publish_with_correlation_id(DomainEvent::BookingConfirmed(event), correlation_id)
            .await?;

        Ok(total)
    }

    /// 確定フローの途中失敗時の巻き戻し
    /// 予約済みの空き枠を解放し、区画を空きに戻し、割引コードの
    /// 使用記録があれば取り消す。巻き戻し自体の失敗で元のエラーを
    /// 覆い隠さないよう、結果は捨てる。
    async fn rollback_confirmation(
        &self,
        booking: &Booking,
        spot: &mut AccommodationSpot,
        redeemed_code: Option<&str>,
    ) {
        let _ = self
            .availability_service
            .release_stay(
                booking.campsite_id(),
                booking.accommodation_type_id(),
                booking.stay_period(),
                1,
            )
            .await;
        spot.mark_available();
        let _ = self.spot_repository.save(spot).await;
        if let Some(code) = redeemed_code {
            let _ = self.discount_service.refund(code).await;
        }
    }

    /// 予約をキャンセル
    /// 確定済みの予約の空き枠の解放は、発行されるBookingCancelled
    /// イベントを受信した空き枠解放ハンドラーが行う。
    ///
    /// # Arguments
    /// * `booking_id` - 予約ID
    pub async fn cancel_booking(&self, booking_id: BookingId) -> Result<(), ApplicationError> {
        let mut booking = self.find_booking(booking_id).await?;

        let event = booking.cancel(self.clock.now())?;
        self.booking_repository.save(&booking).await?;

        let correlation_id = Uuid::new_v4();
        self.publish_with_correlation_id(DomainEvent::BookingCancelled(event), correlation_id)
            .await?;

        Ok(())
    }

    /// 滞在を完了としてマーク
    /// 終端遷移でありイベントは発行されない。滞在は消費済みのため
    /// 空き枠にも影響しない。
    ///
    /// # Arguments
    /// * `booking_id` - 予約ID
    pub async fn complete_booking(&self, booking_id: BookingId) -> Result<(), ApplicationError> {
        let mut booking = self.find_booking(booking_id).await?;

        booking.complete(self.clock.now())?;
        self.booking_repository.save(&booking).await?;

        Ok(())
    }

    /// 予約の特別リクエストを更新
    ///
    /// # Arguments
    /// * `booking_id` - 予約ID
    /// * `special_requests` - 新しい特別リクエスト（Noneで削除）
    pub async fn update_special_requests(
        &self,
        booking_id: BookingId,
        special_requests: Option<String>,
    ) -> Result<(), ApplicationError> {
        let mut booking = self.find_booking(booking_id).await?;

        booking.update_special_requests(special_requests, self.clock.now())?;
        self.booking_repository.save(&booking).await?;

        Ok(())
    }

    /// 滞在の料金見積もりを計算（予約を作成せずに参照のみ）
    ///
    /// # Arguments
    /// * `campsite_id` - キャンプ場ID
    /// * `accommodation_type_id` - 宿泊タイプID
    /// * `stay_period` - 滞在期間
    /// * `spot_id` - 区画ID（任意、指定時は区画の価格係数を適用）
    pub async fn quote_stay(
        &self,
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
        stay_period: DateRange,
        spot_id: Option<SpotId>,
    ) -> Result<StayQuote, ApplicationError> {
        let accommodation_type = self
            .accommodation_type_repository
            .find_by_id(accommodation_type_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!(
                    "宿泊タイプが見つかりません: {}",
                    accommodation_type_id
                ))
            })?;

        let spot_modifier = match spot_id {
            Some(id) => self
                .spot_repository
                .find_by_id(id)
                .await?
                .ok_or_else(|| {
                    ApplicationError::NotFound(format!("区画が見つかりません: {}", id))
                })?
                .price_modifier(),
            None => Decimal::ONE,
        };

        let rules = self
            .pricing_rule_repository
            .find_for(campsite_id, accommodation_type_id)
            .await?;

        let quote = PricingService::quote_stay(
            &rules,
            campsite_id,
            accommodation_type_id,
            accommodation_type.base_nightly_price(),
            stay_period,
            spot_modifier,
        )?;

        Ok(quote)
    }

    /// 割引コードが本日使用可能かチェック（使用記録は行わない）
    pub async fn validate_discount_code(&self, code: &str) -> Result<bool, ApplicationError> {
        self.discount_service
            .validate(code, self.clock.today())
            .await
            .map_err(ApplicationError::from)
    }

    async fn find_booking(&self, booking_id: BookingId) -> Result<Booking, ApplicationError> {
        self.booking_repository
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("予約が見つかりません: {}", booking_id))
            })
    }
}

/// 空き枠アプリケーションサービス
/// 空き枠台帳の準備と照会を担当する
pub struct AvailabilityApplicationService {
    availability_repository: Arc<dyn AvailabilityRepository>,
    accommodation_type_repository: Arc<dyn AccommodationTypeRepository>,
    clock: Arc<dyn Clock>,
}

impl AvailabilityApplicationService {
    /// 新しい空き枠アプリケーションサービスを作成
    ///
    /// # Arguments
    /// * `availability_repository` - 空き枠台帳リポジトリ
    /// * `accommodation_type_repository` - 宿泊タイプリポジトリ
    /// * `clock` - 時刻の供給源
    pub fn new(
        availability_repository: Arc<dyn AvailabilityRepository>,
        accommodation_type_repository: Arc<dyn AccommodationTypeRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            availability_repository,
            accommodation_type_repository,
            clock,
        }
    }

    /// 指定期間の空き枠台帳を準備する
    /// 既にレコードが存在する日はそのまま残すため、繰り返し実行しても
    /// 予約状況が失われることはない。
    ///
    /// # Arguments
    /// * `campsite_id` - キャンプ場ID
    /// * `accommodation_type_id` - 宿泊タイプID
    /// * `period` - 準備する期間
    ///
    /// # Returns
    /// * `Ok(u32)` - 新規作成されたレコード数
    /// * `Err(ApplicationError)` - 準備失敗
    pub async fn provision_calendar(
        &self,
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
        period: DateRange,
    ) -> Result<u32, ApplicationError> {
        let accommodation_type = self
            .accommodation_type_repository
            .find_by_id(accommodation_type_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!(
                    "宿泊タイプが見つかりません: {}",
                    accommodation_type_id
                ))
            })?;

        let today = self.clock.today();
        let mut created = 0u32;

        for date in period.dates() {
            let existing = self
                .availability_repository
                .find_by_day(campsite_id, accommodation_type_id, date)
                .await?;
            if existing.is_some() {
                continue;
            }

            let record = AvailabilityRecord::new(
                campsite_id,
                accommodation_type_id,
                date,
                accommodation_type.total_units() as i32,
                today,
            )?;
            self.availability_repository.save(&record).await?;
            created += 1;
        }

        Ok(created)
    }

    /// 滞在期間の全日に指定数の空きがあるかチェックする
    /// 台帳レコードが存在しない日は空きなしとして扱う。
    pub async fn check_availability(
        &self,
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
        period: DateRange,
        count: u32,
    ) -> Result<bool, ApplicationError> {
        let records = self
            .availability_repository
            .find_range(campsite_id, accommodation_type_id, period)
            .await?;

        if records.len() as i64 != period.nights() {
            return Ok(false);
        }

        Ok(records.iter().all(|r| r.has_availability(count)))
    }

    /// 滞在期間の各日の台帳レコードを取得する
    pub async fn get_calendar(
        &self,
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
        period: DateRange,
    ) -> Result<Vec<AvailabilityRecord>, ApplicationError> {
        self.availability_repository
            .find_range(campsite_id, accommodation_type_id, period)
            .await
            .map_err(ApplicationError::from)
    }
}
