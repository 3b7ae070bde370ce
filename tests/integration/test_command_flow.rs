//! End-to-end command flow: raw text in, reply text out.

use chrono::NaiveDate;

use tally::query::NO_DATA_MESSAGE;
use tally::{MemoryStore, Payment, QueryEngine};

fn payment(y: i32, mo: u32, d: u32, category: &str, value: f64) -> Payment {
    Payment {
        dt: NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap(),
        category: category.to_string(),
        value,
    }
}

fn engine() -> QueryEngine<MemoryStore> {
    QueryEngine::new(MemoryStore::new(vec![
        payment(2024, 1, 3, "groceries", 25.10),
        payment(2024, 1, 18, "groceries", 14.90),
        payment(2024, 2, 2, "groceries", 31.00),
        payment(2024, 1, 1, "rent", 1200.00),
        payment(2024, 2, 1, "rent", 1200.00),
        payment(2024, 1, 9, "transport", 2.75),
    ]))
}

#[tokio::test]
async fn sum_over_range_reports_total() {
    let reply = engine().handle("/sum groceries 2024-01-01 2024-01-31").await;
    assert!(reply.contains("groceries"), "reply was: {reply}");
    assert!(reply.contains("40.00"), "reply was: {reply}");
}

#[tokio::test]
async fn sum_respects_amount_filters() {
    let reply = engine()
        .handle("/sum groceries 2024-01-01 2024-02-28 min=20")
        .await;
    assert!(reply.contains("56.10"), "reply was: {reply}");
}

#[tokio::test]
async fn unknown_category_is_named_in_reply() {
    let reply = engine().handle("/sum bogus 2024-01-01 2024-01-31").await;
    assert!(reply.contains("bogus"), "reply was: {reply}");
    assert!(!reply.contains("40.00"));
}

#[tokio::test]
async fn inverted_range_gets_range_specific_message() {
    let reply = engine().handle("/sum groceries 2024-02-01 2024-01-01").await;
    assert!(reply.contains("invalid date range"), "reply was: {reply}");
}

#[tokio::test]
async fn unrecognized_command_references_help() {
    let reply = engine().handle("/totallyunknown").await;
    assert!(reply.contains("/help"), "reply was: {reply}");
}

#[tokio::test]
async fn malformed_date_points_at_the_argument() {
    let reply = engine().handle("/sum groceries January 2024-01-31").await;
    assert!(reply.contains("argument 2"), "reply was: {reply}");
    assert!(reply.contains("date"), "reply was: {reply}");
}

#[tokio::test]
async fn count_without_range_covers_everything() {
    let reply = engine().handle("/count rent").await;
    assert!(reply.contains("2 payments"), "reply was: {reply}");
}

#[tokio::test]
async fn series_by_month_lists_period_totals_in_order() {
    let reply = engine()
        .handle("/series month 2024-01-01 2024-02-28 groceries")
        .await;
    let jan = reply.find("2024-01-01T00:00:00").expect("january row");
    let feb = reply.find("2024-02-01T00:00:00").expect("february row");
    assert!(jan < feb, "reply was: {reply}");
    assert!(reply.contains("40.00"), "reply was: {reply}");
    assert!(reply.contains("31.00"), "reply was: {reply}");
}

#[tokio::test]
async fn empty_result_uses_no_data_message() {
    let reply = engine().handle("/sum transport 2030-01-01 2030-12-31").await;
    assert_eq!(reply, NO_DATA_MESSAGE);
}

#[tokio::test]
async fn help_lists_every_command() {
    let reply = engine().handle("/help").await;
    for name in ["/start", "/help", "/categories", "/sum", "/count", "/series"] {
        assert!(reply.contains(name), "missing {name} in: {reply}");
    }
}

#[tokio::test]
async fn dry_run_from_seed_file_answers_without_a_database() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[{{"dt": "2024-01-03T10:30:00", "category": "groceries", "value": 25.10}},
           {{"dt": "2024-01-18T10:30:00", "category": "groceries", "value": 14.90}}]"#
    )
    .unwrap();

    let payments = tally::load_payments(file.path()).unwrap();
    let engine = QueryEngine::new(MemoryStore::new(payments));
    let reply = engine.handle("/sum groceries 2024-01-01 2024-01-31").await;
    assert!(reply.contains("40.00"), "reply was: {reply}");
}

#[tokio::test]
async fn identical_requests_get_identical_replies() {
    let engine = engine();
    let first = engine.handle("/series day 2024-01-01 2024-01-31").await;
    let second = engine.handle("/series day 2024-01-01 2024-01-31").await;
    assert_eq!(first, second);
}
