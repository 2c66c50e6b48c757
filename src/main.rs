use campsite_reservation_management::adapter::driven::{
    ConsoleLogger, EventBusConfig, InMemoryEventBus, MySqlAccommodationSpotRepository,
    MySqlAccommodationTypeRepository, MySqlAvailabilityRepository, MySqlBookingRepository,
    MySqlDiscountCodeRepository, MySqlPricingRuleRepository, SystemClock,
};
use campsite_reservation_management::adapter::driver::rest_api::{create_router, AppStateInner};
use campsite_reservation_management::adapter::{DatabaseConfig, DatabaseMigration};
use campsite_reservation_management::application::service::{
    AvailabilityApplicationService, AvailabilityQueryService, BookingApplicationService,
    BookingQueryService,
};
use campsite_reservation_management::domain::handler::{
    AvailabilityReleaseHandler, NotificationHandler,
};
use campsite_reservation_management::domain::port::{Clock, Logger};
use campsite_reservation_management::domain::service::{AvailabilityService, DiscountService};

use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== キャンプ場予約管理システム REST API ===");
    println!();

    // .envファイルから環境変数を読み込む
    dotenvy::dotenv().ok();

    // データベース設定を読み込む
    let config = DatabaseConfig::from_env()?;
    println!(
        "データベース設定を読み込みました: {}:{}",
        config.host, config.port
    );

    // 接続プールを作成
    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.connection_string())
        .await?;
    println!("データベース接続プールを作成しました");

    // マイグレーションを実行
    let migration = DatabaseMigration::new(pool.clone());
    migration.run().await?;
    println!("データベースマイグレーションを実行しました");

    // MySQLリポジトリを作成
    let booking_repository = Arc::new(MySqlBookingRepository::new(pool.clone()));
    let availability_repository = Arc::new(MySqlAvailabilityRepository::new(pool.clone()));
    let accommodation_type_repository =
        Arc::new(MySqlAccommodationTypeRepository::new(pool.clone()));
    let spot_repository = Arc::new(MySqlAccommodationSpotRepository::new(pool.clone()));
    let pricing_rule_repository = Arc::new(MySqlPricingRuleRepository::new(pool.clone()));
    let discount_code_repository = Arc::new(MySqlDiscountCodeRepository::new(pool.clone()));

    // ロガーと時計を作成
    let logger: Arc<dyn Logger> = Arc::new(ConsoleLogger::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());

    // イベントバスを作成
    let event_bus = Arc::new(InMemoryEventBus::new(EventBusConfig::default()));

    // イベントハンドラーを作成して登録
    // キャンセル時の空き枠解放はイベント経由で非同期に行う
    let release_handler = AvailabilityReleaseHandler::new(
        availability_repository.clone(),
        spot_repository.clone(),
        logger.clone(),
    );
    let notification_handler = NotificationHandler::new(logger.clone());

    event_bus.subscribe_booking_cancelled(release_handler).await?;
    event_bus
        .subscribe_booking_created(notification_handler.clone())
        .await?;
    event_bus
        .subscribe_booking_confirmed(notification_handler.clone())
        .await?;
    event_bus
        .subscribe_booking_cancelled(notification_handler)
        .await?;

    println!("イベントハンドラーを登録しました");
    println!("予約フロー:");
    println!("  1. 予約作成 → Pending状態（空き枠は消費しない）");
    println!("  2. 区画割り当て → POST /bookings/:id/spot");
    println!("  3. 予約確定 → 料金計算 + 割引適用 + 空き枠予約");
    println!("  4. キャンセル → 空き枠解放（イベント経由・自動）");

    // ドメインサービスを作成
    let availability_domain_service =
        AvailabilityService::new(availability_repository.clone());
    let discount_service = DiscountService::new(discount_code_repository.clone());

    // アプリケーションサービスを作成
    let booking_service = BookingApplicationService::new(
        booking_repository.clone(),
        accommodation_type_repository.clone(),
        spot_repository.clone(),
        pricing_rule_repository.clone(),
        availability_domain_service,
        discount_service,
        event_bus.clone(),
        clock.clone(),
    );
    let availability_service = AvailabilityApplicationService::new(
        availability_repository.clone(),
        accommodation_type_repository.clone(),
        clock.clone(),
    );

    // クエリサービスを作成
    let booking_query_service = BookingQueryService::new(booking_repository.clone());
    let availability_query_service =
        AvailabilityQueryService::new(availability_repository.clone());

    // アプリケーション状態を作成
    let app_state = AppStateInner {
        booking_service: Arc::new(booking_service),
        availability_service: Arc::new(availability_service),
        booking_query_service: Arc::new(booking_query_service),
        availability_query_service: Arc::new(availability_query_service),
        accommodation_type_repository,
        spot_repository,
        pricing_rule_repository,
        discount_code_repository,
    };

    // REST APIルーターを作成
    let app = create_router()
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // サーバーを起動
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    println!("REST APIサーバーが起動しました: http://localhost:3000");
    println!("ヘルスチェック: GET http://localhost:3000/health");
    println!("API仕様:");
    println!("  POST /bookings - 予約作成");
    println!("  GET  /bookings - 予約一覧取得");
    println!("  GET  /bookings/:id - 予約詳細取得");
    println!("  POST /bookings/:id/spot - 区画割り当て");
    println!("  POST /bookings/:id/confirm - 予約確定");
    println!("  POST /bookings/:id/cancel - 予約キャンセル");
    println!("  POST /bookings/:id/complete - 滞在完了");
    println!("  PUT  /bookings/:id/special-requests - 特別リクエスト更新");
    println!("  POST /availability/provision - 空き枠台帳の準備");
    println!("  GET  /availability - 空き状況照会");
    println!("  GET  /pricing/quote - 料金見積もり");
    println!("  GET  /discount-codes/:code/validate - 割引コード検証");
    println!("  POST /accommodation-types - 宿泊タイプ登録");
    println!("  POST /accommodation-spots - 区画登録");
    println!("  POST /pricing-rules - 季節料金ルール登録");
    println!("  POST /discount-codes - 割引コード登録");
    println!();

    axum::serve(listener, app).await?;

    Ok(())
}
