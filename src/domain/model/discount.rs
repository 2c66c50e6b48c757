use crate::domain::error::DomainError;
use crate::domain::model::Money;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// 割引の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountKind {
    /// パーセンテージ割引（valueは0〜100）
    Percentage,
    /// 固定額割引（valueは金額）
    Fixed,
}

impl DiscountKind {
    /// 文字列からDiscountKindを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "Percentage" => Ok(DiscountKind::Percentage),
            "Fixed" => Ok(DiscountKind::Fixed),
            _ => Err(DomainError::InvalidValue(format!(
                "無効な割引種別: {}",
                s
            ))),
        }
    }
}

impl std::fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DiscountKind::Percentage => "Percentage",
            DiscountKind::Fixed => "Fixed",
        };
        write!(f, "{}", s)
    }
}

/// 割引コード
/// 有効期間・使用回数上限・最低予約金額の条件付きで予約合計を割り引く。
/// コードは正規化（前後の空白除去と大文字化）された形で保持する。
#[derive(Debug, Clone)]
pub struct DiscountCode {
    id: i64,
    code: String,
    description: String,
    kind: DiscountKind,
    value: Decimal,
    valid_from: NaiveDate,
    valid_until: NaiveDate,
    used_count: u32,
    max_uses: u32,
    minimum_booking_amount: Money,
    active: bool,
}

impl DiscountCode {
    /// 新しい割引コードを作成
    ///
    /// # Arguments
    /// * `id` - 割引コードID
    /// * `code` - コード文字列（正規化されて保存される）
    /// * `description` - 説明
    /// * `kind` - 割引種別
    /// * `value` - 割引値（Percentageは0〜100、Fixedは金額）
    /// * `valid_from` - 有効開始日（含む）
    /// * `valid_until` - 有効終了日（含む）
    /// * `max_uses` - 使用回数上限（0は無制限）
    /// * `minimum_booking_amount` - 適用に必要な最低予約金額
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: i64,
        code: String,
        description: String,
        kind: DiscountKind,
        value: Decimal,
        valid_from: NaiveDate,
        valid_until: NaiveDate,
        max_uses: u32,
        minimum_booking_amount: Money,
    ) -> Result<Self, DomainError> {
        if value <= Decimal::ZERO {
            return Err(DomainError::InvalidValue(
                "割引値は0より大きい必要があります".to_string(),
            ));
        }
        if kind == DiscountKind::Percentage && value > Decimal::ONE_HUNDRED {
            return Err(DomainError::InvalidValue(format!(
                "パーセンテージ割引は100以下である必要があります: {}",
                value
            )));
        }
        if valid_until < valid_from {
            return Err(DomainError::InvalidRange(format!(
                "有効終了日({})は有効開始日({})以降である必要があります",
                valid_until, valid_from
            )));
        }
        if minimum_booking_amount.is_negative() {
            return Err(DomainError::NegativeAmount);
        }

        Ok(Self {
            id,
            code: Self::normalize(&code),
            description,
            kind,
            value,
            valid_from,
            valid_until,
            used_count: 0,
            max_uses,
            minimum_booking_amount,
            active: true,
        })
    }

    /// データベースから取得したデータで再構築
    #[allow(clippy::too_many_arguments)]
    pub fn reconstruct(
        id: i64,
        code: String,
        description: String,
        kind: DiscountKind,
        value: Decimal,
        valid_from: NaiveDate,
        valid_until: NaiveDate,
        used_count: u32,
        max_uses: u32,
        minimum_booking_amount: Money,
        active: bool,
    ) -> Self {
        Self {
            id,
            code,
            description,
            kind,
            value,
            valid_from,
            valid_until,
            used_count,
            max_uses,
            minimum_booking_amount,
            active,
        }
    }

    /// コード文字列を正規化する（前後の空白除去と大文字化）
    pub fn normalize(code: &str) -> String {
        code.trim().to_uppercase()
    }

    /// 割引コードIDを取得
    pub fn id(&self) -> i64 {
        self.id
    }

    /// 正規化済みコード文字列を取得
    pub fn code(&self) -> &str {
        &self.code
    }

    /// 説明を取得
    pub fn description(&self) -> &str {
        &self.description
    }

    /// 割引種別を取得
    pub fn kind(&self) -> DiscountKind {
        self.kind
    }

    /// 割引値を取得
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// 有効開始日を取得
    pub fn valid_from(&self) -> NaiveDate {
        self.valid_from
    }

    /// 有効終了日（含む）を取得
    pub fn valid_until(&self) -> NaiveDate {
        self.valid_until
    }

    /// 使用回数を取得
    pub fn used_count(&self) -> u32 {
        self.used_count
    }

    /// 使用回数上限を取得（0は無制限）
    pub fn max_uses(&self) -> u32 {
        self.max_uses
    }

    /// 最低予約金額を取得
    pub fn minimum_booking_amount(&self) -> Money {
        self.minimum_booking_amount
    }

    /// 有効フラグを取得
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// 指定日に使用可能かどうか
    /// 有効フラグ・有効期間・使用回数上限をまとめて判定する
    pub fn is_valid(&self, on_date: NaiveDate) -> bool {
        self.active
            && self.valid_from <= on_date
            && on_date <= self.valid_until
            && (self.max_uses == 0 || self.used_count < self.max_uses)
    }

    /// 割引額を計算する
    /// 固定額割引は予約合計を超えない（合計が負になることはない）。
    ///
    /// # Returns
    /// * `Ok(Money)` - 割引額
    /// * `Err(DomainError::BelowMinimum)` - 予約合計が最低金額未満
    pub fn calculate_discount(&self, amount: Money) -> Result<Money, DomainError> {
        if amount.amount() < self.minimum_booking_amount.amount() {
            return Err(DomainError::BelowMinimum);
        }

        let discount = match self.kind {
            DiscountKind::Percentage => amount.multiply(self.value / Decimal::ONE_HUNDRED),
            DiscountKind::Fixed => {
                if self.value > amount.amount() {
                    amount
                } else {
                    Money::dkk(self.value)
                }
            }
        };
        Ok(discount)
    }

    /// 使用回数を1増やす
    /// 上限到達時はUsageExhaustedを返す。上限ちょうどに達した場合は
    /// 自動的に無効化される。
    pub fn increment_usage(&mut self) -> Result<(), DomainError> {
        if self.max_uses != 0 && self.used_count >= self.max_uses {
            return Err(DomainError::UsageExhausted);
        }

        self.used_count += 1;
        if self.max_uses != 0 && self.used_count >= self.max_uses {
            self.active = false;
        }
        Ok(())
    }

    /// 使用記録を1件取り消す
    /// 上限到達による自動無効化も巻き戻す。使用回数が0のときは何もしない。
    pub fn refund_usage(&mut self) {
        if self.used_count == 0 {
            return;
        }
        if self.max_uses != 0 && self.used_count == self.max_uses && !self.active {
            self.active = true;
        }
        self.used_count -= 1;
    }

    /// コードを無効化する
    pub fn deactivate(&mut self) {
        self.active = false;
    }
}
