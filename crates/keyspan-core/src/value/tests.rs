use crate::value::{Value, compare::tuple_cmp};
use std::cmp::Ordering;

#[test]
fn empty_text_is_null() {
    assert!(Value::from("").is_null());
    assert_eq!(Value::from("").normalized(), Value::Null);
    assert!(!Value::from("a").is_null());
    assert_eq!(Value::from(None::<i32>), Value::Null);
}

#[test]
fn natural_order_puts_null_first() {
    assert_eq!(
        Value::Null.natural_cmp(&Value::Integer(i32::MIN)),
        Some(Ordering::Less)
    );
    assert_eq!(
        Value::from("").natural_cmp(&Value::Null),
        Some(Ordering::Equal)
    );
    assert_eq!(
        Value::from("xy").natural_cmp(&Value::from("xyz")),
        Some(Ordering::Less)
    );
}

#[test]
fn natural_order_rejects_mixed_kinds() {
    assert_eq!(Value::Integer(1).natural_cmp(&Value::Long(1)), None);
}

#[test]
fn tuple_order_is_left_to_right() {
    let left = [Value::from("abc"), Value::Integer(9)];
    let right = [Value::from("abcd"), Value::Integer(1)];

    assert_eq!(tuple_cmp(&left, &right), Some(Ordering::Less));
}
