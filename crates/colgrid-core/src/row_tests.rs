//! Tests for `row` module - positioned row cursor.

use super::buffer::Precision;
use super::column::{Column, ObjectType};
use super::error::Error;
use super::row::*;
use chrono::{DateTime, NaiveTime, TimeZone, Utc};

#[test]
fn test_cursor_starts_before_first() {
    let a = Column::real(vec![1.0, 2.0]);
    let columns = [&a];

    let cursor = RowCursor::new(&columns).unwrap();

    assert_eq!(cursor.width(), 1);
    assert_eq!(cursor.height(), 2);
    assert_eq!(cursor.position(), BEFORE_FIRST);
    assert!(cursor.has_remaining());
    assert!(cursor.numeric(0).is_nan());
}

#[test]
fn test_advance_visits_every_row() {
    let a = Column::real(vec![1.0, 2.0, 3.0]);
    let b = Column::objects(vec![Some("x"), None, Some("z")], ObjectType::new());
    let columns = [&a, &b];
    let mut cursor = RowCursor::new(&columns).unwrap();

    let mut seen = Vec::new();
    while cursor.has_remaining() {
        cursor.advance();
        seen.push((cursor.numeric(0), cursor.get::<&str>(1)));
    }

    assert_eq!(seen, vec![(1.0, Some("x")), (2.0, None), (3.0, Some("z"))]);
    assert_eq!(cursor.position(), Some(2));
}

#[test]
fn test_set_position_and_reset() {
    let a = Column::integer(vec![5.0, 6.0]);
    let columns = [&a];
    let mut cursor = RowCursor::new(&columns).unwrap();

    cursor.set_position(Some(1)).unwrap();
    assert_eq!(cursor.numeric(0), 6.0);
    assert_eq!(cursor.numeric(0), 6.0);
    assert_eq!(cursor.position(), Some(1));

    cursor.set_position(BEFORE_FIRST).unwrap();
    assert_eq!(cursor.position(), None);
    cursor.advance();
    assert_eq!(cursor.position(), Some(0));

    assert!(matches!(
        cursor.set_position(Some(2)),
        Err(Error::IndexOutOfBounds { index: 2, size: 2 })
    ));
}

#[test]
fn test_mismatched_heights() {
    let a = Column::real(vec![1.0]);
    let b = Column::real(vec![1.0, 2.0]);
    let columns = [&a, &b];

    assert!(matches!(
        RowCursor::new(&columns),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn test_empty_cursor() {
    let cursor = RowCursor::new(&[]).unwrap();

    assert_eq!(cursor.width(), 0);
    assert_eq!(cursor.height(), 0);
    assert!(!cursor.has_remaining());
}

#[test]
fn test_get_decodes_temporal_columns() {
    let time = NaiveTime::from_hms_opt(10, 0, 0);
    let instant = Utc.timestamp_opt(1_000, 5).single();
    let times = Column::times(&[time]);
    let instants = Column::date_times(&[instant], Precision::Nanoseconds);
    let columns = [&times, &instants];
    let mut cursor = RowCursor::new(&columns).unwrap();

    assert_eq!(cursor.get::<NaiveTime>(0), None);
    cursor.advance();

    assert_eq!(cursor.get::<NaiveTime>(0), time);
    assert_eq!(cursor.get::<DateTime<Utc>>(1), instant);
    assert_eq!(cursor.get::<NaiveTime>(1), None);
}
