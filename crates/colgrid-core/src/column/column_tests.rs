//! Tests for `column` module - typed immutable columns.

use super::*;
use crate::packing::Format;
use chrono::TimeZone;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| (*s).to_string()).collect()
}

fn letters() -> Column {
    let indices = PackedIndices::from_indices(Format::UnsignedInt2, &[1, 2, 0, 1]).unwrap();
    Column::categorical(indices, Dictionary::new(strings(&["b", "a"])), text()).unwrap()
}

#[test]
fn test_real_column_reads() {
    let column = Column::real(vec![1.5, f64::NAN, -2.0]);

    assert_eq!(column.size(), 3);
    assert_eq!(column.type_id(), ColumnTypeId::Real);
    assert_eq!(column.category(), Category::Numeric);
    assert_eq!(column.numeric_at(0), 1.5);
    assert!(column.numeric_at(1).is_nan());
    assert!(column.numeric_at(3).is_nan());
    assert_eq!(column.index_at(0), 0);
}

#[test]
fn test_integer_column_rounds_half_up() {
    let column = Column::integer(vec![1.5, 2.4, -1.5, -0.6]);

    let mut target = vec![0.0; 4];
    assert_eq!(column.fill_numeric(&mut target, 0).unwrap(), 4);
    assert_eq!(target, vec![2.0, 2.0, -1.0, -1.0]);
}

#[test]
fn test_fill_numeric_partial_tail() {
    let column = Column::real(vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    let mut target = vec![-1.0; 4];

    let copied = column.fill_numeric(&mut target, 3).unwrap();

    assert_eq!(copied, 2);
    assert_eq!(target, vec![3.0, 4.0, -1.0, -1.0]);
}

#[test]
fn test_capabilities_per_type() {
    use Capability::{NumericReadable, ObjectReadable, Sortable};

    let real = Column::real(vec![1.0]).capabilities();
    assert!(real.contains(NumericReadable) && real.contains(Sortable));
    assert!(!real.contains(ObjectReadable));

    let objects = Column::objects(vec![Some(1_u8)], ObjectType::new()).capabilities();
    assert!(objects.contains(ObjectReadable));
    assert!(!objects.contains(NumericReadable));
    assert!(!objects.contains(Sortable));

    let ordered = Column::objects(vec![Some(1_u8)], ObjectType::ordered()).capabilities();
    assert!(ordered.contains(Sortable));

    let categorical = letters().capabilities();
    assert!(categorical.contains(NumericReadable));
    assert!(categorical.contains(ObjectReadable));
    assert!(categorical.contains(Sortable));
}

#[test]
fn test_categorical_reads() {
    let column = letters();

    assert_eq!(column.dictionary_size(), 2);
    assert_eq!(column.index_at(1), 2);
    assert_eq!(column.numeric_at(1), 2.0);
    assert!(column.numeric_at(2).is_nan());
    assert_eq!(column.object_at::<String>(0).map(String::as_str), Some("b"));
    assert_eq!(column.object_at::<String>(2), None);
    assert_eq!(column.object_at::<u32>(0), None);
}

#[test]
fn test_categorical_rejects_unknown_index() {
    let indices = PackedIndices::from_indices(Format::UnsignedInt4, &[1, 3]).unwrap();

    let result = Column::categorical(indices, Dictionary::new(strings(&["x", "y"])), text());

    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[test]
fn test_fill_indices_requires_categorical() {
    let mut target = [0_u32; 2];

    let result = Column::real(vec![1.0, 2.0]).fill_indices(&mut target, 0);

    assert!(matches!(result, Err(Error::Unsupported(_))));
    assert_eq!(letters().fill_indices(&mut target, 2).unwrap(), 2);
    assert_eq!(target, [0, 1]);
}

#[test]
fn test_fill_objects_from_categorical() {
    let mut target = vec![None; 4];

    letters().fill_objects::<String>(&mut target, 0).unwrap();

    assert_eq!(
        target,
        vec![
            Some("b".to_string()),
            Some("a".to_string()),
            None,
            Some("b".to_string())
        ]
    );
}

#[test]
fn test_object_reader_type_checks() {
    let column = Column::objects(vec![Some(7_i64), None], ObjectType::new());

    let reader = column.object_reader::<i64>().unwrap();
    assert_eq!(reader.len(), 2);
    assert_eq!(reader.get(0), Some(&7));
    assert_eq!(reader.get(1), None);
    assert_eq!(reader.get(2), None);

    assert!(matches!(
        column.object_reader::<String>(),
        Err(Error::TypeMismatch { .. })
    ));
    assert!(matches!(
        Column::real(vec![1.0]).object_reader::<f64>(),
        Err(Error::Unsupported(_))
    ));
}

#[test]
fn test_fill_numeric_on_object_column_is_unsupported() {
    let column = Column::objects(vec![Some("x".to_string())], ObjectType::new());
    let mut target = [0.0];

    assert!(matches!(
        column.fill_numeric(&mut target, 0),
        Err(Error::Unsupported(_))
    ));
}

#[test]
fn test_map_materialized_with_holes() {
    let column = Column::real(vec![1.0, 2.0, 3.0]);

    let mapped = column.map(&[2, 0, 5], false);

    assert!(!mapped.is_view());
    assert_eq!(mapped.size(), 3);
    assert_eq!(mapped.numeric_at(0), 3.0);
    assert_eq!(mapped.numeric_at(1), 1.0);
    assert!(mapped.numeric_at(2).is_nan());
}

#[test]
fn test_map_view_composes() {
    let column = Column::real(vec![10.0, 11.0, 12.0, 13.0]);

    let view = column.map(&[3, 2, 1], true);
    let nested = view.map(&[2, 0, 9], true);

    assert!(view.is_view());
    assert_eq!(nested.size(), 3);
    assert_eq!(nested.numeric_at(0), 11.0);
    assert_eq!(nested.numeric_at(1), 13.0);
    assert!(nested.numeric_at(2).is_nan());
}

#[test]
fn test_map_categorical_keeps_dictionary() {
    let mapped = letters().map(&[3, 1, 7], false);

    assert_eq!(mapped.object_at::<String>(0).map(String::as_str), Some("b"));
    assert_eq!(mapped.object_at::<String>(1).map(String::as_str), Some("a"));
    assert_eq!(mapped.index_at(2), 0);
    assert_eq!(mapped.dictionary_size(), 2);
}

#[test]
fn test_map_object_view_reader() {
    let column = Column::objects(vec![Some(1_i32), Some(2), Some(3)], ObjectType::new());
    let view = column.map(&[2, 2, 0], true);

    let reader = view.object_reader::<i32>().unwrap();

    assert_eq!(reader.get(0), Some(&3));
    assert_eq!(reader.get(1), Some(&3));
    assert_eq!(reader.get(2), Some(&1));
}

#[test]
fn test_sort_real_column() {
    let column = Column::real(vec![2.0, f64::NAN, -1.0, 2.0]);

    assert_eq!(column.sort(Order::Ascending).unwrap(), vec![2, 0, 3, 1]);
    assert_eq!(column.sort(Order::Descending).unwrap(), vec![1, 0, 3, 2]);
}

#[test]
fn test_sort_categorical_by_value_missing_last() {
    assert_eq!(letters().sort(Order::Ascending).unwrap(), vec![1, 0, 3, 2]);
}

#[test]
fn test_sort_view_uses_view_rows() {
    let view = Column::real(vec![3.0, 1.0, 2.0]).map(&[2, 1], true);

    assert_eq!(view.sort(Order::Ascending).unwrap(), vec![1, 0]);
}

#[test]
fn test_sort_unordered_objects_is_unsupported() {
    let column = Column::objects(vec![Some(1_u8)], ObjectType::new());

    assert!(matches!(
        column.sort(Order::Ascending),
        Err(Error::Unsupported(_))
    ));
}

#[test]
fn test_time_column() {
    let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
    let early = NaiveTime::from_hms_nano_opt(0, 0, 1, 5).unwrap();
    let column = Column::times(&[Some(noon), None, Some(early)]);

    assert_eq!(column.time_at(0), Some(noon));
    assert_eq!(column.time_at(1), None);
    assert_eq!(column.numeric_at(2), 1_000_000_005.0);
    assert!(column.numeric_at(1).is_nan());
    assert_eq!(column.sort(Order::Ascending).unwrap(), vec![2, 0, 1]);
    let reader = column.object_reader::<NaiveTime>().unwrap();
    assert_eq!(reader.get(2), Some(&early));
}

#[test]
fn test_date_time_precision() {
    let instant = Utc.timestamp_opt(1_700_000_000, 123).unwrap();

    let low = Column::date_times(&[Some(instant), None], Precision::Seconds);
    let high = Column::date_times(&[Some(instant), None], Precision::Nanoseconds);

    assert_eq!(low.date_time_at(0), Utc.timestamp_opt(1_700_000_000, 0).single());
    assert_eq!(high.date_time_at(0), Some(instant));
    assert_eq!(high.date_time_at(1), None);
    assert_eq!(high.sort(Order::Descending).unwrap(), vec![1, 0]);
}

#[test]
fn test_to_boolean() {
    let dictionary = Dictionary::new(strings(&["one", "two"]))
        .into_boolean(Some(&"one".to_string()))
        .unwrap();
    let indices = PackedIndices::from_indices(Format::UnsignedInt2, &[1, 2, 0]).unwrap();
    let column = Column::categorical(indices, dictionary, text()).unwrap();

    assert_eq!(column.to_boolean(1).unwrap(), Some(true));
    assert_eq!(column.to_boolean(2).unwrap(), Some(false));
    assert_eq!(column.to_boolean(0).unwrap(), None);
    assert!(letters().to_boolean(1).is_err());
    assert!(Column::real(vec![1.0]).to_boolean(1).is_err());
}

#[test]
fn test_dictionary_access_checks_type() {
    let column = letters();

    let dictionary = column.dictionary::<String>().unwrap();

    assert_eq!(dictionary.get(2).map(String::as_str), Some("a"));
    assert!(matches!(
        column.dictionary::<u32>(),
        Err(Error::TypeMismatch { .. })
    ));
}
