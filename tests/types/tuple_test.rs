use heapstore::types::{
    error::{DatabaseError, ErrorKind},
    tuple::Tuple,
    value::{Field, Type},
};

fn create_test_tuple() -> Tuple {
    Tuple::new(vec![
        Field::Int(42),
        Field::Char("hello".to_string()),
        Field::Double(3.25),
    ])
}

#[test]
fn test_new_tuple_creation() {
    let fields = vec![Field::Int(123), Field::Char("test".to_string())];
    let tuple = Tuple::new(fields.clone());

    assert_eq!(tuple.size(), 2);
    assert_eq!(tuple.fields(), fields.as_slice());
    assert_eq!(tuple.into_fields(), fields);
}

#[test]
fn test_empty_tuple() {
    let tuple = Tuple::new(vec![]);
    assert_eq!(tuple.size(), 0);
    assert!(tuple.get_field(0).is_err());
}

#[test]
fn test_field_types() {
    let tuple = create_test_tuple();
    assert_eq!(tuple.field_type(0).unwrap(), Type::Int);
    assert_eq!(tuple.field_type(1).unwrap(), Type::Char);
    assert_eq!(tuple.field_type(2).unwrap(), Type::Double);
}

#[test]
fn test_get_field() {
    let tuple = create_test_tuple();
    assert_eq!(tuple.get_field(0).unwrap(), &Field::Int(42));
    assert_eq!(tuple.get_field(2).unwrap(), &Field::Double(3.25));
}

#[test]
fn test_out_of_bounds_access() {
    let tuple = create_test_tuple();

    let err = tuple.get_field(3).unwrap_err();
    assert!(matches!(
        err,
        DatabaseError::FieldIndexOutOfBounds { index: 3, size: 3 }
    ));
    assert_eq!(err.kind(), ErrorKind::Range);

    let err = tuple.field_type(10).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);
}

#[test]
fn test_tuple_from_vec() {
    let tuple: Tuple = vec![Field::Int(1)].into();
    assert_eq!(tuple, Tuple::new(vec![Field::Int(1)]));
}
