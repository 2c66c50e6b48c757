use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::adapter::driver::request_dto::{
    AssignSpotRequest, AvailabilityQueryParams, BookingsQueryParams, ConfirmBookingRequest,
    CreateAccommodationTypeRequest, CreateBookingRequest, CreateDiscountCodeRequest,
    CreatePricingRuleRequest, CreateSpotRequest, ProvisionCalendarRequest, QuoteQueryParams,
    UpdateSpecialRequestsRequest,
};
use crate::adapter::driver::response_dto::{
    AvailabilityResponse, BookingDetailResponse, BookingSummaryResponse, StayQuoteResponse,
};
use crate::application::service::{
    AvailabilityApplicationService, AvailabilityQueryService, BookingApplicationService,
    BookingQueryService,
};
use crate::application::ApplicationError;
use crate::domain::error::{DomainError, ErrorKind};
use crate::domain::model::{
    AccommodationSpot, AccommodationType, AccommodationTypeId, BookingId, BookingStatus,
    CampsiteId, DateRange, DiscountCode, DiscountKind, GuestId, Money, SeasonalPricingRule, SpotId,
};
use crate::domain::port::{
    AccommodationSpotRepository, AccommodationTypeRepository, DiscountCodeRepository,
    PricingRuleRepository,
};

// REST API用のレスポンスDTO
#[derive(Serialize, Deserialize)]
pub struct CreateBookingResponse {
    pub booking_id: Uuid,
    pub guest_id: Uuid,
}

#[derive(Serialize, Deserialize)]
pub struct ConfirmBookingResponse {
    pub total_amount: Decimal,
    pub total_currency: String,
}

#[derive(Serialize, Deserialize)]
pub struct ProvisionCalendarResponse {
    pub created_days: u32,
}

#[derive(Serialize, Deserialize)]
pub struct ValidateDiscountCodeResponse {
    pub code: String,
    pub valid: bool,
}

#[derive(Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

// アプリケーションサービスを含む状態
pub type AppState = AppStateInner;

#[derive(Clone)]
pub struct AppStateInner {
    pub booking_service: Arc<BookingApplicationService>,
    pub availability_service: Arc<AvailabilityApplicationService>,
    pub booking_query_service: Arc<BookingQueryService>,
    pub availability_query_service: Arc<AvailabilityQueryService>,
    pub accommodation_type_repository: Arc<dyn AccommodationTypeRepository>,
    pub spot_repository: Arc<dyn AccommodationSpotRepository>,
    pub pricing_rule_repository: Arc<dyn PricingRuleRepository>,
    pub discount_code_repository: Arc<dyn DiscountCodeRepository>,
}

// REST APIルーターを作成
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/bookings", post(create_booking))
        .route("/bookings", get(get_bookings))
        .route("/bookings/:booking_id", get(get_booking_by_id))
        .route("/bookings/:booking_id/spot", post(assign_spot))
        .route("/bookings/:booking_id/confirm", post(confirm_booking))
        .route("/bookings/:booking_id/cancel", post(cancel_booking))
        .route("/bookings/:booking_id/complete", post(complete_booking))
        .route(
            "/bookings/:booking_id/special-requests",
            put(update_special_requests),
        )
        .route("/availability/provision", post(provision_calendar))
        .route("/availability", get(get_availability))
        .route("/pricing/quote", get(get_quote))
        .route(
            "/discount-codes/:code/validate",
            get(validate_discount_code),
        )
        // カタログ登録用エンドポイント（運用ツールからの投入を想定）
        .route("/accommodation-types", post(create_accommodation_type))
        .route("/accommodation-spots", post(create_spot))
        .route("/pricing-rules", post(create_pricing_rule))
        .route("/discount-codes", post(create_discount_code))
}

// ヘルスチェックエンドポイント
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "campsite-reservation-management",
        "version": "0.1.0"
    }))
}

// 予約作成エンドポイント
async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Json<CreateBookingResponse>, (StatusCode, Json<ApiError>)> {
    let guest_id = request
        .guest_id
        .map(GuestId::from_uuid)
        .unwrap_or_default();

    let campsite_id = parse_campsite_id(request.campsite_id)?;
    let accommodation_type_id = parse_accommodation_type_id(request.accommodation_type_id)?;
    let stay_period = parse_date_range(request.check_in, request.check_out)?;

    match state
        .booking_service
        .create_booking(
            guest_id,
            campsite_id,
            accommodation_type_id,
            stay_period,
            request.adults,
            request.children,
            request.special_requests,
        )
        .await
    {
        Ok(booking_id) => Ok(Json(CreateBookingResponse {
            booking_id: booking_id.as_uuid(),
            guest_id: guest_id.as_uuid(),
        })),
        Err(err) => Err(map_application_error(err)),
    }
}

// 区画割り当てエンドポイント
async fn assign_spot(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<AssignSpotRequest>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let booking_id = BookingId::from_uuid(booking_id);
    let spot_id = parse_spot_id(request.spot_id)?;

    match state.booking_service.assign_spot(booking_id, spot_id).await {
        Ok(()) => Ok(StatusCode::OK),
        Err(err) => Err(map_application_error(err)),
    }
}

// 予約確定エンドポイント
async fn confirm_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<ConfirmBookingRequest>,
) -> Result<Json<ConfirmBookingResponse>, (StatusCode, Json<ApiError>)> {
    let booking_id = BookingId::from_uuid(booking_id);

    match state
        .booking_service
        .confirm_booking(booking_id, request.discount_code)
        .await
    {
        Ok(total) => Ok(Json(ConfirmBookingResponse {
            total_amount: total.amount(),
            total_currency: total.currency(),
        })),
        Err(err) => Err(map_application_error(err)),
    }
}

// 予約キャンセルエンドポイント
async fn cancel_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let booking_id = BookingId::from_uuid(booking_id);

    match state.booking_service.cancel_booking(booking_id).await {
        Ok(()) => Ok(StatusCode::OK),
        Err(err) => Err(map_application_error(err)),
    }
}

// 滞在完了エンドポイント
async fn complete_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let booking_id = BookingId::from_uuid(booking_id);

    match state.booking_service.complete_booking(booking_id).await {
        Ok(()) => Ok(StatusCode::OK),
        Err(err) => Err(map_application_error(err)),
    }
}

// 特別リクエスト更新エンドポイント
async fn update_special_requests(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<UpdateSpecialRequestsRequest>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let booking_id = BookingId::from_uuid(booking_id);

    match state
        .booking_service
        .update_special_requests(booking_id, request.special_requests)
        .await
    {
        Ok(()) => Ok(StatusCode::OK),
        Err(err) => Err(map_application_error(err)),
    }
}

// 予約一覧取得エンドポイント
async fn get_bookings(
    State(state): State<AppState>,
    query: Result<Query<BookingsQueryParams>, axum::extract::rejection::QueryRejection>,
) -> Result<Json<Vec<BookingSummaryResponse>>, (StatusCode, Json<ApiError>)> {
    let Query(params) = query.map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "無効なクエリパラメータです".to_string(),
                code: "INVALID_PARAMETER".to_string(),
            }),
        )
    })?;

    let bookings = if let Some(status_str) = params.status {
        // ステータスでフィルタリング
        let status = match BookingStatus::from_string(&status_str) {
            Ok(status) => status,
            Err(_) => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(ApiError {
                        error: format!("無効なステータス値: {}", status_str),
                        code: "INVALID_STATUS".to_string(),
                    }),
                ))
            }
        };

        match state
            .booking_query_service
            .get_bookings_by_status(status)
            .await
        {
            Ok(bookings) => bookings,
            Err(err) => return Err(map_application_error(err)),
        }
    } else {
        match state.booking_query_service.get_all_bookings().await {
            Ok(bookings) => bookings,
            Err(err) => return Err(map_application_error(err)),
        }
    };

    let response: Vec<BookingSummaryResponse> = bookings
        .iter()
        .map(BookingSummaryResponse::from_booking)
        .collect();

    Ok(Json(response))
}

// 予約詳細取得エンドポイント
async fn get_booking_by_id(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingDetailResponse>, (StatusCode, Json<ApiError>)> {
    let booking_id = BookingId::from_uuid(booking_id);

    match state
        .booking_query_service
        .get_booking_by_id(booking_id)
        .await
    {
        Ok(Some(booking)) => Ok(Json(BookingDetailResponse::from_booking(&booking))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: "指定された予約が見つかりません".to_string(),
                code: "BOOKING_NOT_FOUND".to_string(),
            }),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// 空き枠台帳の準備エンドポイント
async fn provision_calendar(
    State(state): State<AppState>,
    Json(request): Json<ProvisionCalendarRequest>,
) -> Result<Json<ProvisionCalendarResponse>, (StatusCode, Json<ApiError>)> {
    let campsite_id = parse_campsite_id(request.campsite_id)?;
    let accommodation_type_id = parse_accommodation_type_id(request.accommodation_type_id)?;
    let period = parse_date_range(request.start_date, request.end_date)?;

    match state
        .availability_service
        .provision_calendar(campsite_id, accommodation_type_id, period)
        .await
    {
        Ok(created) => Ok(Json(ProvisionCalendarResponse {
            created_days: created,
        })),
        Err(err) => Err(map_application_error(err)),
    }
}

// 空き状況照会エンドポイント
async fn get_availability(
    State(state): State<AppState>,
    query: Result<Query<AvailabilityQueryParams>, axum::extract::rejection::QueryRejection>,
) -> Result<Json<Vec<AvailabilityResponse>>, (StatusCode, Json<ApiError>)> {
    let Query(params) = query.map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "無効なクエリパラメータです".to_string(),
                code: "INVALID_PARAMETER".to_string(),
            }),
        )
    })?;

    let campsite_id = parse_campsite_id(params.campsite_id)?;
    let accommodation_type_id = parse_accommodation_type_id(params.accommodation_type_id)?;
    let period = parse_date_range(params.start_date, params.end_date)?;

    match state
        .availability_query_service
        .get_calendar(campsite_id, accommodation_type_id, period)
        .await
    {
        Ok(records) => {
            let response: Vec<AvailabilityResponse> =
                records.iter().map(AvailabilityResponse::from_record).collect();
            Ok(Json(response))
        }
        Err(err) => Err(map_application_error(err)),
    }
}

// 料金見積もりエンドポイント
async fn get_quote(
    State(state): State<AppState>,
    query: Result<Query<QuoteQueryParams>, axum::extract::rejection::QueryRejection>,
) -> Result<Json<StayQuoteResponse>, (StatusCode, Json<ApiError>)> {
    let Query(params) = query.map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "無効なクエリパラメータです".to_string(),
                code: "INVALID_PARAMETER".to_string(),
            }),
        )
    })?;

    let campsite_id = parse_campsite_id(params.campsite_id)?;
    let accommodation_type_id = parse_accommodation_type_id(params.accommodation_type_id)?;
    let period = parse_date_range(params.check_in, params.check_out)?;
    let spot_id = match params.spot_id {
        Some(value) => Some(parse_spot_id(value)?),
        None => None,
    };

    match state
        .booking_service
        .quote_stay(campsite_id, accommodation_type_id, period, spot_id)
        .await
    {
        Ok(quote) => Ok(Json(StayQuoteResponse::from_quote(&quote))),
        Err(err) => Err(map_application_error(err)),
    }
}

// 割引コード検証エンドポイント（使用記録は行わない）
async fn validate_discount_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ValidateDiscountCodeResponse>, (StatusCode, Json<ApiError>)> {
    match state.booking_service.validate_discount_code(&code).await {
        Ok(valid) => Ok(Json(ValidateDiscountCodeResponse { code, valid })),
        Err(err) => Err(map_application_error(err)),
    }
}

// 宿泊タイプ作成エンドポイント
async fn create_accommodation_type(
    State(state): State<AppState>,
    Json(request): Json<CreateAccommodationTypeRequest>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let id = parse_accommodation_type_id(request.id)?;
    let campsite_id = parse_campsite_id(request.campsite_id)?;

    let accommodation_type = AccommodationType::new(
        id,
        campsite_id,
        request.category,
        request.max_occupancy,
        Money::dkk(request.base_nightly_price),
        request.total_units,
    )
    .map_err(map_domain_error)?;

    match state
        .accommodation_type_repository
        .save(&accommodation_type)
        .await
    {
        Ok(()) => Ok(StatusCode::CREATED),
        Err(err) => Err(map_application_error(ApplicationError::from(err))),
    }
}

// 区画作成エンドポイント
async fn create_spot(
    State(state): State<AppState>,
    Json(request): Json<CreateSpotRequest>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let id = parse_spot_id(request.id)?;
    let campsite_id = parse_campsite_id(request.campsite_id)?;
    let accommodation_type_id = parse_accommodation_type_id(request.accommodation_type_id)?;

    let spot = AccommodationSpot::new(
        id,
        campsite_id,
        accommodation_type_id,
        request.label,
        request.price_modifier,
    )
    .map_err(map_domain_error)?;

    match state.spot_repository.save(&spot).await {
        Ok(()) => Ok(StatusCode::CREATED),
        Err(err) => Err(map_application_error(ApplicationError::from(err))),
    }
}

// 季節料金ルール作成エンドポイント
async fn create_pricing_rule(
    State(state): State<AppState>,
    Json(request): Json<CreatePricingRuleRequest>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let campsite_id = parse_campsite_id(request.campsite_id)?;
    let accommodation_type_id = parse_accommodation_type_id(request.accommodation_type_id)?;

    let rule = SeasonalPricingRule::new(
        request.id,
        campsite_id,
        accommodation_type_id,
        request.season_name,
        request.start_date,
        request.end_date,
        request.multiplier,
    )
    .map_err(map_domain_error)?;

    match state.pricing_rule_repository.save(&rule).await {
        Ok(()) => Ok(StatusCode::CREATED),
        Err(err) => Err(map_application_error(ApplicationError::from(err))),
    }
}

// 割引コード作成エンドポイント
async fn create_discount_code(
    State(state): State<AppState>,
    Json(request): Json<CreateDiscountCodeRequest>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let kind = DiscountKind::from_string(&request.kind).map_err(map_domain_error)?;

    let discount_code = DiscountCode::new(
        request.id,
        request.code,
        request.description,
        kind,
        request.value,
        request.valid_from,
        request.valid_until,
        request.max_uses,
        Money::dkk(request.minimum_booking_amount),
    )
    .map_err(map_domain_error)?;

    match state.discount_code_repository.save(&discount_code).await {
        Ok(()) => Ok(StatusCode::CREATED),
        Err(err) => Err(map_application_error(ApplicationError::from(err))),
    }
}

fn parse_campsite_id(value: i64) -> Result<CampsiteId, (StatusCode, Json<ApiError>)> {
    CampsiteId::new(value).map_err(map_domain_error)
}

fn parse_accommodation_type_id(
    value: i64,
) -> Result<AccommodationTypeId, (StatusCode, Json<ApiError>)> {
    AccommodationTypeId::new(value).map_err(map_domain_error)
}

fn parse_spot_id(value: i64) -> Result<SpotId, (StatusCode, Json<ApiError>)> {
    SpotId::new(value).map_err(map_domain_error)
}

fn parse_date_range(
    start: chrono::NaiveDate,
    end: chrono::NaiveDate,
) -> Result<DateRange, (StatusCode, Json<ApiError>)> {
    DateRange::new(start, end).map_err(map_domain_error)
}

// アプリケーションエラーをHTTPエラーにマッピング
fn map_application_error(err: ApplicationError) -> (StatusCode, Json<ApiError>) {
    match err {
        ApplicationError::DomainError(domain_err) => map_domain_error(domain_err),
        ApplicationError::RepositoryError(repo_err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: format!("{}", repo_err),
                code: "REPOSITORY_ERROR".to_string(),
            }),
        ),
        ApplicationError::EventPublishingFailed(msg) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: msg,
                code: "EVENT_PUBLISHING_FAILED".to_string(),
            }),
        ),
        ApplicationError::NotFound(msg) => (
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: msg,
                code: "NOT_FOUND".to_string(),
            }),
        ),
    }
}

// ドメインエラーを適切なHTTPステータスコードとエラーコードにマッピング
fn map_domain_error(domain_err: DomainError) -> (StatusCode, Json<ApiError>) {
    if let DomainError::RepositoryError(msg) = domain_err {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: msg,
                code: "REPOSITORY_ERROR".to_string(),
            }),
        );
    }

    let (status, code) = match domain_err.kind() {
        ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        ErrorKind::InvalidTransition => (StatusCode::CONFLICT, "INVALID_TRANSITION"),
        ErrorKind::Capacity => (StatusCode::CONFLICT, "CAPACITY_CONFLICT"),
        ErrorKind::Policy => (StatusCode::UNPROCESSABLE_ENTITY, "POLICY_VIOLATION"),
    };

    (
        status,
        Json(ApiError {
            error: format!("{}", domain_err),
            code: code.to_string(),
        }),
    )
}
