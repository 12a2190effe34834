//! End-to-end tests: build a table, transform its columns in parallel and
//! turn the results back into columns.

use chrono::NaiveTime;
use colgrid_core::{
    text, Categorical, Column, ColumnTypeId, EngineConfig, Error, Format, Objects, Order,
    PoolContext, Precision, SequentialContext, Table, Workload,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn sales_table(rows: usize) -> Table {
    let regions = ["north", "south", "east", "west"];
    Table::new(vec![
        (
            "amount".to_string(),
            Column::real((0..rows).map(|i| (i % 100) as f64 * 1.5).collect()),
        ),
        (
            "quantity".to_string(),
            Column::integer((0..rows).map(|i| (i % 7) as f64).collect()),
        ),
        (
            "region".to_string(),
            Column::objects(
                (0..rows)
                    .map(|i| (i % 5 != 0).then(|| regions[i % 4].to_string()))
                    .collect(),
                text(),
            ),
        ),
    ])
    .unwrap()
}

#[test]
fn test_table_transform_round_trip() {
    init_tracing();
    let table = sales_table(20_000);
    let context = PoolContext::new(4).unwrap();

    let doubled = table
        .transform_label("amount")
        .unwrap()
        .workload(Workload::Large)
        .apply_numeric_to_integer(|v| 2.0 * v, &context)
        .unwrap()
        .into_column();

    assert_eq!(doubled.type_id(), ColumnTypeId::Integer);
    assert_eq!(doubled.size(), 20_000);
    assert_eq!(doubled.numeric_at(99), 297.0);
    assert_eq!(doubled.numeric_at(101), 3.0);
}

#[test]
fn test_objects_to_categorical_column() {
    init_tracing();
    let table = sales_table(10_000);
    let context = PoolContext::new(3).unwrap();

    let buffer = table
        .transform_label("region")
        .unwrap()
        .workload(Workload::Huge)
        .apply_object(
            |region: Option<&String>| region.map(|r| r.to_uppercase()),
            Categorical::with_type(Format::UnsignedInt4, text()),
            &context,
        )
        .unwrap();
    let column = buffer.to_column();

    assert_eq!(column.type_id(), ColumnTypeId::Categorical);
    assert_eq!(column.dictionary_size(), 4);
    assert_eq!(column.object_at::<String>(0), None);
    assert_eq!(column.object_at::<String>(1).map(String::as_str), Some("SOUTH"));
    assert!(column.capabilities().contains(colgrid_core::Capability::Sortable));
}

#[test]
fn test_row_transform_over_table() {
    let table = sales_table(1_000);
    let context = SequentialContext::new();

    let totals = table
        .transform_rows(&["amount", "quantity"])
        .unwrap()
        .apply_numeric_rows(|row| row.numeric(0) * row.numeric(1), colgrid_core::Real, &context)
        .unwrap()
        .into_column();

    assert_eq!(totals.numeric_at(3), 4.5 * 3.0);
    assert_eq!(totals.numeric_at(7), 0.0);
}

#[test]
fn test_transform_then_sort() {
    let table = sales_table(50);
    let context = SequentialContext::new();

    let labels = table
        .transform_label("quantity")
        .unwrap()
        .apply_numeric(
            |v| Some(format!("q{v}")),
            Objects::new(text()),
            &context,
        )
        .unwrap()
        .into_column();
    let extended = Table::new(vec![
        ("label".to_string(), labels),
        (
            "amount".to_string(),
            table.column("amount").unwrap().clone(),
        ),
    ])
    .unwrap();

    let sorted = extended.sort("label", Order::Descending).unwrap();
    let label = sorted.column("label").unwrap();

    assert_eq!(label.object_at::<String>(0).map(String::as_str), Some("q6"));
    assert_eq!(label.object_at::<String>(49).map(String::as_str), Some("q0"));
}

#[test]
fn test_times_from_config() {
    let config = EngineConfig::from_toml(
        r#"
        [execution]
        parallelism = 2
        thread_name_prefix = "it-worker"

        [transform]
        default_workload = "medium"
        batch_rows = 64
        "#,
    )
    .unwrap();
    config.validate().unwrap();
    let context = PoolContext::from_config(&config.execution).unwrap();
    let seconds = Column::real((0..5_000).map(|i| f64::from(i % 86_400)).collect());

    let times = colgrid_core::Transformer::new(&seconds)
        .with_config(&config.transform)
        .apply_numeric(
            |v| NaiveTime::from_num_seconds_from_midnight_opt(v as u32, 0),
            colgrid_core::Times,
            &context,
        )
        .unwrap()
        .into_column();

    assert_eq!(times.time_at(3_661), NaiveTime::from_hms_opt(1, 1, 1));
    assert!(times.sort(Order::Ascending).is_ok());
}

#[test]
fn test_date_times_keep_precision() {
    let seconds = Column::real(vec![0.0, 1.0e9]);
    let context = SequentialContext::new();

    let low = colgrid_core::Transformer::new(&seconds)
        .apply_numeric(
            |v| chrono::DateTime::from_timestamp(v as i64, 123),
            colgrid_core::DateTimes::new(Precision::Seconds),
            &context,
        )
        .unwrap()
        .into_column();

    assert_eq!(
        low.date_time_at(1),
        chrono::DateTime::from_timestamp(1_000_000_000, 0)
    );
}

#[test]
fn test_shutdown_pool_rejects_transform() {
    let table = sales_table(100);
    let context = PoolContext::new(2).unwrap();
    context.shutdown();

    let result = table
        .transform(0)
        .unwrap()
        .apply_numeric_to_real(|v| v, &context);

    assert!(matches!(result, Err(Error::TaskAborted { .. })));
}
