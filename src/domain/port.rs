// 出力ポート
// ドメイン層が外部に依存する機能をトレイトとして定義
// アダプター層でこれらのトレイトを実装する

use crate::domain::event::DomainEvent;
use crate::domain::model::{
    AccommodationSpot, AccommodationType, AccommodationTypeId, AvailabilityRecord, Booking,
    BookingId, BookingStatus, CampsiteId, DateRange, DiscountCode, SeasonalPricingRule, SpotId,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use uuid::Uuid;

/// ログレベル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// ロガートレイト
/// ログ出力を抽象化するポート
pub trait Logger: Send + Sync {
    /// デバッグレベルのログを出力
    fn debug(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );

    /// 情報レベルのログを出力
    fn info(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );

    /// 警告レベルのログを出力
    fn warn(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );

    /// エラーレベルのログを出力
    fn error(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );
}

/// 時刻の供給源
/// ドメインが現在時刻に依存する箇所を差し替え可能にするポート
pub trait Clock: Send + Sync {
    /// 現在時刻を取得
    fn now(&self) -> DateTime<Utc>;

    /// 本日の日付を取得
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// リポジトリエラー型
/// リポジトリ操作で発生するエラーを表現する
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::enum_variant_names)]
pub enum RepositoryError {
    /// データベース接続に失敗
    ConnectionFailed(String),
    /// 操作に失敗
    OperationFailed(String),
    /// データの取得に失敗
    FetchFailed(String),
}

impl std::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepositoryError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            RepositoryError::OperationFailed(msg) => write!(f, "Operation failed: {}", msg),
            RepositoryError::FetchFailed(msg) => write!(f, "Fetch failed: {}", msg),
        }
    }
}

impl std::error::Error for RepositoryError {}

/// 予約リポジトリトレイト
/// 予約集約の永続化を抽象化する
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// 予約を保存する
    ///
    /// # Arguments
    /// * `booking` - 保存する予約
    ///
    /// # Returns
    /// * `Ok(())` - 保存成功
    /// * `Err(RepositoryError)` - 保存失敗
    async fn save(&self, booking: &Booking) -> Result<(), RepositoryError>;

    /// 予約IDで予約を検索する
    ///
    /// # Returns
    /// * `Ok(Some(Booking))` - 予約が見つかった
    /// * `Ok(None)` - 予約が見つからなかった
    /// * `Err(RepositoryError)` - 検索失敗
    async fn find_by_id(&self, booking_id: BookingId) -> Result<Option<Booking>, RepositoryError>;

    /// すべての予約を取得する
    /// 作成日時の降順で並べて返す
    async fn find_all(&self) -> Result<Vec<Booking>, RepositoryError>;

    /// 指定されたステータスの予約を取得する
    /// 作成日時の降順で並べて返す
    async fn find_by_status(&self, status: BookingStatus)
        -> Result<Vec<Booking>, RepositoryError>;

    /// 新しい一意の予約IDを生成する
    fn next_identity(&self) -> BookingId;
}

/// 空き枠台帳リポジトリトレイト
#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    /// 滞在期間に含まれる各日のレコードを取得する
    /// 日付の昇順で並べて返す。存在しない日はレコードが欠落する。
    async fn find_range(
        &self,
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
        period: DateRange,
    ) -> Result<Vec<AvailabilityRecord>, RepositoryError>;

    /// 特定の日のレコードを取得する
    async fn find_by_day(
        &self,
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
        date: NaiveDate,
    ) -> Result<Option<AvailabilityRecord>, RepositoryError>;

    /// 1件のレコードを保存する
    async fn save(&self, record: &AvailabilityRecord) -> Result<(), RepositoryError>;

    /// 滞在期間の全日について指定数の枠を予約する
    /// 全日に十分な空きがある場合のみ更新が成立し、1日でも不足が
    /// あればどの日も変更されない。成立したかどうかを返す。
    /// 空き判定と更新は格納層で不可分に行われる。
    async fn reserve_range(
        &self,
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
        period: DateRange,
        count: u32,
    ) -> Result<bool, RepositoryError>;

    /// 滞在期間の全日について指定数の枠を解放する
    /// 全日に十分な予約済み数がある場合のみ更新が成立する。
    async fn release_range(
        &self,
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
        period: DateRange,
        count: u32,
    ) -> Result<bool, RepositoryError>;
}

/// 季節料金ルールリポジトリトレイト
#[async_trait]
pub trait PricingRuleRepository: Send + Sync {
    /// 指定のキャンプ場・宿泊タイプを対象とするルールを取得する
    /// ルールIDの昇順で並べて返す
    async fn find_for(
        &self,
        campsite_id: CampsiteId,
        accommodation_type_id: AccommodationTypeId,
    ) -> Result<Vec<SeasonalPricingRule>, RepositoryError>;

    /// ルールを保存する
    async fn save(&self, rule: &SeasonalPricingRule) -> Result<(), RepositoryError>;
}

/// 割引コードリポジトリトレイト
#[async_trait]
pub trait DiscountCodeRepository: Send + Sync {
    /// コード文字列で割引コードを検索する
    /// 検索前にコードは正規化される
    async fn find_by_code(&self, code: &str) -> Result<Option<DiscountCode>, RepositoryError>;

    /// 割引コードを保存する
    async fn save(&self, discount_code: &DiscountCode) -> Result<(), RepositoryError>;

    /// 使用回数を1増やす
    /// コードが有効かつ使用回数上限に達していない場合のみ加算が
    /// 成立し、上限ちょうどに達したコードは同時に無効化される。
    /// 判定と加算は格納層で不可分に行われる。成立したかどうかを返す。
    async fn record_usage(&self, code: &str) -> Result<bool, RepositoryError>;

    /// 使用回数の記録を1件取り消す
    /// 上限到達による自動無効化も巻き戻す。使用回数0のコードには
    /// 何もしない。
    async fn refund_usage(&self, code: &str) -> Result<(), RepositoryError>;
}

/// 宿泊タイプリポジトリトレイト
#[async_trait]
pub trait AccommodationTypeRepository: Send + Sync {
    /// 宿泊タイプIDで検索する
    async fn find_by_id(
        &self,
        id: AccommodationTypeId,
    ) -> Result<Option<AccommodationType>, RepositoryError>;

    /// キャンプ場に属する宿泊タイプを取得する
    /// IDの昇順で並べて返す
    async fn find_by_campsite(
        &self,
        campsite_id: CampsiteId,
    ) -> Result<Vec<AccommodationType>, RepositoryError>;

    /// 宿泊タイプを保存する
    async fn save(&self, accommodation_type: &AccommodationType) -> Result<(), RepositoryError>;
}

/// 区画リポジトリトレイト
#[async_trait]
pub trait AccommodationSpotRepository: Send + Sync {
    /// 区画IDで検索する
    async fn find_by_id(&self, id: SpotId) -> Result<Option<AccommodationSpot>, RepositoryError>;

    /// 宿泊タイプに属する区画を取得する
    /// IDの昇順で並べて返す
    async fn find_by_type(
        &self,
        accommodation_type_id: AccommodationTypeId,
    ) -> Result<Vec<AccommodationSpot>, RepositoryError>;

    /// 区画を保存する
    async fn save(&self, spot: &AccommodationSpot) -> Result<(), RepositoryError>;
}

/// イベントバスエラー
#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("Event publishing failed: {0}")]
    PublishingFailed(String),
}

/// イベントバストレイト
/// イベントの発行と配信を管理するポート
#[async_trait]
pub trait EventBus: Send + Sync {
    /// イベントを発行し、登録されたハンドラーに配信
    async fn publish(&self, event: DomainEvent) -> Result<(), EventBusError>;
}
