//! Trade tracker tests: positions and covered calls.

mod common;

use canslim_sdk::models::{CallStatus, TradeStatus, TradeType};
use canslim_sdk::store::calls::{CallOutcome, NewCoveredCall};
use canslim_sdk::store::positions::{NewPosition, PositionPatch};
use canslim_sdk::CanslimError;
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn dec(text: &str) -> Decimal {
    text.parse().unwrap()
}

fn new_position(ticker: &str, trade_type: TradeType, entry: &str, shares: u32) -> NewPosition {
    NewPosition {
        ticker: ticker.to_string(),
        account: None,
        trade_type,
        entry_date: NaiveDate::from_ymd_opt(2024, 2, 1),
        entry_price: dec(entry),
        shares,
        stop_price: None,
        target_price: None,
        setup_type: None,
        notes: None,
    }
}

fn new_call(ticker: &str, strike: &str, contracts: u32, premium: &str) -> NewCoveredCall {
    NewCoveredCall {
        ticker: ticker.to_string(),
        sell_date: NaiveDate::from_ymd_opt(2024, 1, 5),
        expiry: NaiveDate::from_ymd_opt(2024, 1, 19),
        strike: dec(strike),
        contracts,
        premium_per_contract: dec(premium),
        delta: Some(0.10),
        stock_price_at_sell: None,
        notes: None,
    }
}

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

#[test]
fn position_add_assigns_ids_and_cost_basis() {
    let (sdk, _tmp) = common::sdk_store_only();

    let first = sdk
        .positions()
        .add(new_position("AAPL", TradeType::Long, "185.50", 100))
        .unwrap();
    let second = sdk
        .positions()
        .add(new_position("NVDA", TradeType::Long, "700", 10))
        .unwrap();

    assert_eq!(first.id, 1);
    assert_eq!(second.id, 2);
    assert_eq!(first.cost_basis, dec("18550.00"));
    assert_eq!(first.account, "default");
    assert_eq!(first.status, TradeStatus::Open);
}

#[test]
fn position_add_validates_inputs() {
    let (sdk, _tmp) = common::sdk_store_only();

    let err = sdk
        .positions()
        .add(new_position("AAPL", TradeType::Long, "185.50", 0))
        .unwrap_err();
    assert!(matches!(err, CanslimError::InvalidArgument(_)));

    let err = sdk
        .positions()
        .add(new_position("AAPL", TradeType::Long, "-5", 100))
        .unwrap_err();
    assert!(matches!(err, CanslimError::InvalidArgument(_)));

    let err = sdk
        .positions()
        .add(new_position("not a ticker!", TradeType::Long, "10", 100))
        .unwrap_err();
    assert!(matches!(err, CanslimError::InvalidArgument(_)));
}

#[test]
fn closing_a_long_realizes_pnl() {
    let (sdk, _tmp) = common::sdk_store_only();
    let position = sdk
        .positions()
        .add(new_position("AAPL", TradeType::Long, "100", 100))
        .unwrap();

    let closed = sdk
        .positions()
        .update(
            position.id,
            PositionPatch {
                close_price: Some(dec("110")),
                close_date: NaiveDate::from_ymd_opt(2024, 3, 1),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(closed.status, TradeStatus::Closed);
    assert_eq!(closed.pnl, Some(dec("1000.00")));
    assert_eq!(closed.close_date, NaiveDate::from_ymd_opt(2024, 3, 1));
}

#[test]
fn closing_a_short_inverts_the_pnl() {
    let (sdk, _tmp) = common::sdk_store_only();
    let position = sdk
        .positions()
        .add(new_position("XYZ", TradeType::Short, "50", 10))
        .unwrap();

    let closed = sdk
        .positions()
        .update(
            position.id,
            PositionPatch {
                close_price: Some(dec("45")),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(closed.pnl, Some(dec("50.00")));
}

#[test]
fn position_update_unknown_id_is_not_found() {
    let (sdk, _tmp) = common::sdk_store_only();
    let err = sdk
        .positions()
        .update(99, PositionPatch::default())
        .unwrap_err();
    assert!(matches!(err, CanslimError::NotFound(_)));
}

#[test]
fn position_remove_deletes_by_id() {
    let (sdk, _tmp) = common::sdk_store_only();
    let position = sdk
        .positions()
        .add(new_position("AAPL", TradeType::Long, "100", 10))
        .unwrap();

    sdk.positions().remove(position.id).unwrap();
    assert!(sdk.positions().list().unwrap().is_empty());

    let err = sdk.positions().remove(position.id).unwrap_err();
    assert!(matches!(err, CanslimError::NotFound(_)));
}

#[test]
fn positions_summary_tracks_wins_and_r_multiples() {
    let (sdk, _tmp) = common::sdk_store_only();

    // Winner: entry 100, stop 95, closed at 110 -> +2R.
    let mut winner = new_position("AAPL", TradeType::Long, "100", 100);
    winner.stop_price = Some(dec("95"));
    let winner = sdk.positions().add(winner).unwrap();
    sdk.positions()
        .update(
            winner.id,
            PositionPatch {
                close_price: Some(dec("110")),
                ..Default::default()
            },
        )
        .unwrap();

    // Loser: entry 50, stop 48, stopped at 48 -> -1R.
    let mut loser = new_position("XYZ", TradeType::Long, "50", 10);
    loser.stop_price = Some(dec("48"));
    let loser = sdk.positions().add(loser).unwrap();
    sdk.positions()
        .update(
            loser.id,
            PositionPatch {
                close_price: Some(dec("48")),
                ..Default::default()
            },
        )
        .unwrap();

    // Still open, ties up capital.
    sdk.positions()
        .add(new_position("MSFT", TradeType::Long, "400", 10))
        .unwrap();

    let summary = sdk.positions().summary().unwrap();
    assert_eq!(summary.overall.open_count, 1);
    assert_eq!(summary.overall.closed_count, 2);
    assert_eq!(summary.overall.win_count, 1);
    assert_eq!(summary.overall.loss_count, 1);
    assert_eq!(summary.overall.win_rate, 50.0);
    assert_eq!(summary.overall.total_capital, dec("4000.00"));
    assert_eq!(summary.overall.total_pnl, dec("980.00"));
    assert!((summary.overall.avg_r_multiple - 0.5).abs() < 1e-9);
    assert!(summary.by_account.contains_key("default"));
}

// ---------------------------------------------------------------------------
// Covered calls
// ---------------------------------------------------------------------------

#[test]
fn call_add_fixes_the_premium_total() {
    let (sdk, _tmp) = common::sdk_store_only();
    let call = sdk.calls().add(new_call("SPY", "480", 2, "2.50")).unwrap();

    assert_eq!(call.id, 1);
    assert_eq!(call.premium_total, dec("500.00"));
    assert_eq!(call.status, CallStatus::Open);
}

#[test]
fn call_add_validates_inputs() {
    let (sdk, _tmp) = common::sdk_store_only();

    let err = sdk
        .calls()
        .add(new_call("SPY", "480", 0, "2.50"))
        .unwrap_err();
    assert!(matches!(err, CanslimError::InvalidArgument(_)));

    let err = sdk
        .calls()
        .add(new_call("SPY", "0", 1, "2.50"))
        .unwrap_err();
    assert!(matches!(err, CanslimError::InvalidArgument(_)));

    let err = sdk
        .calls()
        .add(new_call("SPY", "480", 1, "-1"))
        .unwrap_err();
    assert!(matches!(err, CanslimError::InvalidArgument(_)));
}

#[test]
fn expired_call_keeps_the_premium() {
    let (sdk, _tmp) = common::sdk_store_only();
    let call = sdk.calls().add(new_call("SPY", "480", 2, "2.50")).unwrap();

    let closed = sdk
        .calls()
        .close(call.id, CallOutcome::Expired, None, None)
        .unwrap();

    assert_eq!(closed.status, CallStatus::Expired);
    assert_eq!(closed.pnl, Some(dec("500.00")));
    assert!(closed.close_date.is_some());
}

#[test]
fn called_away_adds_strike_appreciation() {
    let (sdk, _tmp) = common::sdk_store_only();
    let mut new = new_call("SPY", "105", 1, "1.00");
    new.stock_price_at_sell = Some(dec("100"));
    let call = sdk.calls().add(new).unwrap();

    let closed = sdk
        .calls()
        .close(call.id, CallOutcome::CalledAway, None, None)
        .unwrap();

    // 100 premium + (105 - 100) * 100 shares.
    assert_eq!(closed.pnl, Some(dec("600.00")));
}

#[test]
fn buyback_subtracts_the_buyback_cost() {
    let (sdk, _tmp) = common::sdk_store_only();
    let call = sdk.calls().add(new_call("SPY", "480", 1, "2.00")).unwrap();

    let closed = sdk
        .calls()
        .close(
            call.id,
            CallOutcome::BoughtBack {
                buyback_price: dec("0.50"),
            },
            None,
            Some("rolled early".to_string()),
        )
        .unwrap();

    assert_eq!(closed.status, CallStatus::BoughtBack);
    assert_eq!(closed.pnl, Some(dec("150.00")));
    assert_eq!(closed.close_price, Some(dec("0.50")));
    assert_eq!(closed.notes, "rolled early");
}

#[test]
fn calls_summary_annualizes_premium_against_capital() {
    let (sdk, _tmp) = common::sdk_store_only();
    let call = sdk.calls().add(new_call("SPY", "480", 2, "2.50")).unwrap();
    sdk.calls()
        .close(call.id, CallOutcome::Expired, None, None)
        .unwrap();

    let summary = sdk.calls().summary(Decimal::from(100_000)).unwrap();
    assert_eq!(summary.overall.total_trades, 1);
    assert_eq!(summary.overall.expired, 1);
    assert_eq!(summary.overall.total_premium, dec("500.00"));
    assert_eq!(summary.overall.total_pnl, dec("500.00"));
    // 500 per month, annualized: 500 * 12 / 100_000 * 100 = 6%.
    assert!((summary.overall.annualized_yield - 6.0).abs() < 1e-9);
    assert!(summary.by_ticker.contains_key("SPY"));
}

#[test]
fn call_remove_deletes_by_id() {
    let (sdk, _tmp) = common::sdk_store_only();
    let call = sdk.calls().add(new_call("SPY", "480", 1, "1.00")).unwrap();

    sdk.calls().remove(call.id).unwrap();
    assert!(sdk.calls().list().unwrap().is_empty());

    let err = sdk.calls().remove(call.id).unwrap_err();
    assert!(matches!(err, CanslimError::NotFound(_)));
}
