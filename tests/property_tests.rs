use campsite_reservation_management::domain::model::{
    AccommodationTypeId, AvailabilityRecord, BookingStatus, CampsiteId, DateRange, DiscountCode,
    DiscountKind, Money,
};
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

fn dkk(amount: i64) -> Money {
    Money::dkk(Decimal::from(amount))
}

// Money のプロパティベーステスト
proptest! {
    /// Money の加算は交換法則を満たす (a + b = b + a)
    #[test]
    fn test_money_addition_is_commutative(
        amount1 in 0i64..1_000_000,
        amount2 in 0i64..1_000_000,
    ) {
        let money1 = dkk(amount1);
        let money2 = dkk(amount2);

        let result1 = money1.add(&money2).unwrap();
        let result2 = money2.add(&money1).unwrap();

        prop_assert_eq!(result1, result2);
    }

    /// Money の加算は結合法則を満たす ((a + b) + c = a + (b + c))
    #[test]
    fn test_money_addition_is_associative(
        amount1 in 0i64..100_000,
        amount2 in 0i64..100_000,
        amount3 in 0i64..100_000,
    ) {
        let money1 = dkk(amount1);
        let money2 = dkk(amount2);
        let money3 = dkk(amount3);

        let result1 = money1.add(&money2).unwrap().add(&money3).unwrap();
        let result2 = money1.add(&money2.add(&money3).unwrap()).unwrap();

        prop_assert_eq!(result1, result2);
    }

    /// Money の乗算は分配法則を満たす (a * (b + c) = a * b + a * c)
    #[test]
    fn test_money_multiplication_distributive(
        base_amount in 1i64..10_000,
        factor1 in 1i64..100,
        factor2 in 1i64..100,
    ) {
        let money = dkk(base_amount);
        let f1 = Decimal::from(factor1);
        let f2 = Decimal::from(factor2);

        let left_side = money.multiply(f1 + f2);
        let right_side = money.multiply(f1).add(&money.multiply(f2)).unwrap();

        prop_assert_eq!(left_side, right_side);
    }

    /// 加算してから同じ額を減算すると元の値に戻る
    #[test]
    fn test_money_add_subtract_round_trip(
        amount1 in 0i64..1_000_000,
        amount2 in 0i64..1_000_000,
    ) {
        let money1 = dkk(amount1);
        let money2 = dkk(amount2);

        let result = money1.add(&money2).unwrap().subtract(&money2).unwrap();

        prop_assert_eq!(result, money1);
    }

    /// Money の乗算で1を掛けると元の値と同じ
    #[test]
    fn test_money_multiply_by_one(
        amount in 0i64..1_000_000,
    ) {
        let money = dkk(amount);
        let result = money.multiply(Decimal::ONE);

        prop_assert_eq!(result, money);
    }
}

// DateRange のプロパティベーステスト
proptest! {
    /// 泊数は日付リストの長さと常に等しい
    #[test]
    fn test_date_range_nights_matches_dates(
        start_offset in 0i64..3650,
        nights in 1i64..60,
    ) {
        let base = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let start = base + chrono::Duration::days(start_offset);
        let end = start + chrono::Duration::days(nights);

        let range = DateRange::new(start, end).unwrap();

        prop_assert_eq!(range.nights(), nights);
        prop_assert_eq!(range.dates().len() as i64, nights);
    }

    /// 期間内の全日付はcontainsで真、チェックアウト日は偽
    #[test]
    fn test_date_range_contains_is_half_open(
        nights in 1i64..30,
    ) {
        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let end = start + chrono::Duration::days(nights);
        let range = DateRange::new(start, end).unwrap();

        for date in range.dates() {
            prop_assert!(range.contains(date));
        }
        prop_assert!(!range.contains(end));
    }
}

// 空き枠台帳のプロパティベーステスト
proptest! {
    /// 予約と解放を往復しても総キャパシティは不変
    #[test]
    fn test_availability_reserve_release_round_trip(
        total in 1i32..100,
        count in 1u32..100,
    ) {
        prop_assume!(count <= total as u32);

        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let mut record = AvailabilityRecord::new(
            CampsiteId::new(1).unwrap(),
            AccommodationTypeId::new(1).unwrap(),
            today,
            total,
            today,
        )
        .unwrap();

        let capacity_before = record.total_capacity();

        record.reserve(count).unwrap();
        prop_assert_eq!(record.total_capacity(), capacity_before);
        prop_assert_eq!(record.reserved_units(), count);

        record.release(count).unwrap();
        prop_assert_eq!(record.total_capacity(), capacity_before);
        prop_assert_eq!(record.reserved_units(), 0);
    }

    /// 空き数を超える予約は常に失敗し、レコードは変化しない
    #[test]
    fn test_availability_over_reserve_fails(
        total in 0i32..50,
        excess in 1u32..50,
    ) {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let mut record = AvailabilityRecord::new(
            CampsiteId::new(1).unwrap(),
            AccommodationTypeId::new(1).unwrap(),
            today,
            total,
            today,
        )
        .unwrap();

        let before = record.clone();
        let result = record.reserve(total as u32 + excess);

        prop_assert!(result.is_err());
        prop_assert_eq!(record, before);
    }
}

// 割引コードのプロパティベーステスト
proptest! {
    /// パーセンテージ割引は常に amount * value / 100 と等しい
    #[test]
    fn test_percentage_discount_formula(
        amount in 1i64..1_000_000,
        percent in 1i64..100,
    ) {
        let code = DiscountCode::new(
            1,
            "PROMO".to_string(),
            "desc".to_string(),
            DiscountKind::Percentage,
            Decimal::from(percent),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            0,
            Money::zero(),
        )
        .unwrap();

        let total = dkk(amount);
        let discount = code.calculate_discount(total).unwrap();
        let expected = total.amount() * Decimal::from(percent) / Decimal::from(100);

        prop_assert_eq!(discount.amount(), expected);
    }

    /// 固定額割引は予約合計を超えない
    #[test]
    fn test_fixed_discount_never_exceeds_total(
        amount in 1i64..10_000,
        value in 1i64..20_000,
    ) {
        let code = DiscountCode::new(
            1,
            "PROMO".to_string(),
            "desc".to_string(),
            DiscountKind::Fixed,
            Decimal::from(value),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            0,
            Money::zero(),
        )
        .unwrap();

        let total = dkk(amount);
        let discount = code.calculate_discount(total).unwrap();

        prop_assert!(discount.amount() <= total.amount());
        prop_assert!(!total.subtract(&discount).unwrap().is_negative());
    }
}

// 予約ステータス遷移のプロパティベーステスト
proptest! {
    /// 終端状態からはどの状態にも遷移できない
    #[test]
    fn test_terminal_statuses_allow_no_transitions(
        target in prop::sample::select(vec![
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ]),
    ) {
        prop_assert!(!BookingStatus::Cancelled.can_transition_to(target));
        prop_assert!(!BookingStatus::Completed.can_transition_to(target));
    }
}

#[test]
fn test_status_transition_table() {
    use BookingStatus::*;

    // Pendingからは確定またはキャンセルのみ
    assert!(Pending.can_transition_to(Confirmed));
    assert!(Pending.can_transition_to(Cancelled));
    assert!(!Pending.can_transition_to(Completed));
    assert!(!Pending.can_transition_to(Pending));

    // Confirmedからはキャンセルまたは完了のみ
    assert!(Confirmed.can_transition_to(Cancelled));
    assert!(Confirmed.can_transition_to(Completed));
    assert!(!Confirmed.can_transition_to(Pending));
    assert!(!Confirmed.can_transition_to(Confirmed));
}
