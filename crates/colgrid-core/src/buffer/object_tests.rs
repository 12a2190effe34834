//! Tests for `object` buffers

use super::*;
use crate::column::{Capability, ObjectType};

#[derive(Debug, Clone, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

#[test]
fn test_roundtrip_with_missing() {
    let mut buffer = ObjectBuffer::new(3, ObjectType::new());

    buffer.set(0, Some(Point { x: 1, y: 2 })).unwrap();
    buffer.set(2, Some(Point { x: -1, y: 0 })).unwrap();

    assert_eq!(buffer.get(0).unwrap(), Some(&Point { x: 1, y: 2 }));
    assert_eq!(buffer.get(1).unwrap(), None);
    assert_eq!(buffer.get(2).unwrap(), Some(&Point { x: -1, y: 0 }));
    assert!(buffer.get(3).is_err());
}

#[test]
fn test_frozen_rejects_writes() {
    let mut buffer = ObjectBuffer::new(1, ObjectType::<String>::new());
    buffer.freeze();

    assert!(matches!(
        buffer.set(0, Some("x".to_string())),
        Err(Error::IllegalState(_))
    ));
}

#[test]
fn test_into_column_keeps_type() {
    let mut buffer = ObjectBuffer::new(2, ObjectType::<String>::ordered());
    buffer.set(0, Some("b".to_string())).unwrap();
    buffer.set(1, Some("a".to_string())).unwrap();

    let column = buffer.into_column();

    assert!(column.capabilities().contains(Capability::Sortable));
    assert_eq!(column.object_at::<String>(1).map(String::as_str), Some("a"));
    assert_eq!(column.sort(crate::sorting::Order::Ascending).unwrap(), vec![1, 0]);
}

#[test]
fn test_parts_write_in_place() {
    let mut buffer = ObjectBuffer::new(4, ObjectType::new());
    {
        let mut parts = buffer.parts(&[(0, 1), (1, 4)]).unwrap();
        parts[0].set(0, Some(10_u64)).unwrap();
        parts[1].set(3, Some(13)).unwrap();
        assert!(parts[1].set(0, Some(0)).is_err());
    }

    assert_eq!(buffer.get(0).unwrap(), Some(&10));
    assert_eq!(buffer.get(3).unwrap(), Some(&13));
}

#[test]
fn test_preview() {
    let mut buffer = ObjectBuffer::new(2, ObjectType::new());
    buffer.set(1, Some(5_i8)).unwrap();

    assert_eq!(buffer.to_string(), "Object Buffer (2)\n(?, 5)");
}
