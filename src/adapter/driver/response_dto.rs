use crate::domain::model::{AvailabilityRecord, Booking};
use crate::domain::service::{NightlyRate, StayQuote};
use rust_decimal::Decimal;
use serde::Serialize;

/// 予約一覧用のレスポンスDTO
#[derive(Serialize)]
pub struct BookingSummaryResponse {
    pub booking_id: String,
    pub guest_id: String,
    pub campsite_id: i64,
    pub accommodation_type_id: i64,
    pub check_in: String,
    pub check_out: String,
    pub status: String,
    pub total_amount: Decimal,
    pub total_currency: String,
    pub created_at: String,
}

/// 予約詳細用のレスポンスDTO
#[derive(Serialize)]
pub struct BookingDetailResponse {
    pub booking_id: String,
    pub guest_id: String,
    pub campsite_id: i64,
    pub accommodation_type_id: i64,
    pub spot_id: Option<i64>,
    pub check_in: String,
    pub check_out: String,
    pub nights: i64,
    pub status: String,
    pub adults: u32,
    pub children: u32,
    pub special_requests: Option<String>,
    pub base_price_amount: Decimal,
    pub base_price_currency: String,
    pub total_amount: Decimal,
    pub total_currency: String,
    pub created_at: String,
    pub cancelled_at: Option<String>,
}

/// 空き枠台帳レコード用のレスポンスDTO
#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub campsite_id: i64,
    pub accommodation_type_id: i64,
    pub date: String,
    pub available_units: u32,
    pub reserved_units: u32,
}

/// 1泊分の料金明細用のレスポンスDTO
#[derive(Serialize)]
pub struct NightlyRateResponse {
    pub date: String,
    pub season_name: String,
    pub multiplier: Decimal,
    pub price_amount: Decimal,
    pub price_currency: String,
}

/// 料金見積もり用のレスポンスDTO
#[derive(Serialize)]
pub struct StayQuoteResponse {
    pub nights: Vec<NightlyRateResponse>,
    pub total_amount: Decimal,
    pub total_currency: String,
    pub average_multiplier: Decimal,
    pub spans_multiple_seasons: bool,
}

impl BookingSummaryResponse {
    /// ドメインオブジェクトからBookingSummaryResponseを作成
    pub fn from_booking(booking: &Booking) -> Self {
        let total = booking.total_price();
        Self {
            booking_id: booking.id().to_string(),
            guest_id: booking.guest_id().to_string(),
            campsite_id: booking.campsite_id().value(),
            accommodation_type_id: booking.accommodation_type_id().value(),
            check_in: booking.stay_period().start().to_string(),
            check_out: booking.stay_period().end().to_string(),
            status: booking.status().to_string(),
            total_amount: total.amount(),
            total_currency: total.currency(),
            created_at: booking.created_at().to_rfc3339(),
        }
    }
}

impl BookingDetailResponse {
    /// ドメインオブジェクトからBookingDetailResponseを作成
    pub fn from_booking(booking: &Booking) -> Self {
        let base = booking.base_price();
        let total = booking.total_price();
        Self {
            booking_id: booking.id().to_string(),
            guest_id: booking.guest_id().to_string(),
            campsite_id: booking.campsite_id().value(),
            accommodation_type_id: booking.accommodation_type_id().value(),
            spot_id: booking.spot_id().map(|s| s.value()),
            check_in: booking.stay_period().start().to_string(),
            check_out: booking.stay_period().end().to_string(),
            nights: booking.nights(),
            status: booking.status().to_string(),
            adults: booking.adults(),
            children: booking.children(),
            special_requests: booking.special_requests().map(|s| s.to_string()),
            base_price_amount: base.amount(),
            base_price_currency: base.currency(),
            total_amount: total.amount(),
            total_currency: total.currency(),
            created_at: booking.created_at().to_rfc3339(),
            cancelled_at: booking.cancelled_at().map(|t| t.to_rfc3339()),
        }
    }
}

impl AvailabilityResponse {
    /// ドメインオブジェクトからAvailabilityResponseを作成
    pub fn from_record(record: &AvailabilityRecord) -> Self {
        Self {
            campsite_id: record.campsite_id().value(),
            accommodation_type_id: record.accommodation_type_id().value(),
            date: record.date().to_string(),
            available_units: record.available_units(),
            reserved_units: record.reserved_units(),
        }
    }
}

impl NightlyRateResponse {
    /// ドメインオブジェクトからNightlyRateResponseを作成
    pub fn from_nightly_rate(rate: &NightlyRate) -> Self {
        Self {
            date: rate.date.to_string(),
            season_name: rate.season_name.clone(),
            multiplier: rate.multiplier,
            price_amount: rate.price.amount(),
            price_currency: rate.price.currency(),
        }
    }
}

impl StayQuoteResponse {
    /// ドメインオブジェクトからStayQuoteResponseを作成
    pub fn from_quote(quote: &StayQuote) -> Self {
        Self {
            nights: quote
                .nights
                .iter()
                .map(NightlyRateResponse::from_nightly_rate)
                .collect(),
            total_amount: quote.total.amount(),
            total_currency: quote.total.currency(),
            average_multiplier: quote.average_multiplier,
            spans_multiple_seasons: quote.spans_multiple_seasons,
        }
    }
}
