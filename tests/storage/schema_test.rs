use heapstore::{
    storage::schema::TupleDesc,
    types::{
        CHAR_SIZE,
        error::{DatabaseError, ErrorKind},
        tuple::Tuple,
        value::{Field, Type},
    },
};

fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn mixed_desc() -> TupleDesc {
    TupleDesc::new(
        vec![Type::Int, Type::Char, Type::Double, Type::Int],
        names(&["id", "name", "score", "age"]),
    )
    .unwrap()
}

fn round_trip(td: &TupleDesc, tuple: &Tuple) -> Tuple {
    let mut buf = vec![0u8; td.length()];
    td.serialize(&mut buf, tuple).unwrap();
    td.deserialize(&buf).unwrap()
}

#[test]
fn test_construction_errors() {
    let err = TupleDesc::new(vec![Type::Int], names(&["a", "b"])).unwrap_err();
    assert!(matches!(
        err,
        DatabaseError::FieldCountMismatch { types: 1, names: 2 }
    ));
    assert_eq!(err.kind(), ErrorKind::Schema);

    let err = TupleDesc::new(vec![Type::Int, Type::Double], names(&["a", "a"])).unwrap_err();
    assert!(matches!(err, DatabaseError::DuplicateField { ref name } if name == "a"));
    assert_eq!(err.kind(), ErrorKind::Schema);
}

#[test]
fn test_offsets_and_length() {
    let td = mixed_desc();
    assert_eq!(td.size(), 4);
    for i in 0..td.size() - 1 {
        let width = td.field_type(i).unwrap().size();
        assert_eq!(td.offset_of(i + 1).unwrap(), td.offset_of(i).unwrap() + width);
    }
    let last = td.size() - 1;
    assert_eq!(
        td.length(),
        td.offset_of(last).unwrap() + td.field_type(last).unwrap().size()
    );
    assert_eq!(td.length(), 4 + CHAR_SIZE + 8 + 4);
}

#[test]
fn test_empty_schema() {
    let td = TupleDesc::new(vec![], vec![]).unwrap();
    assert_eq!(td.size(), 0);
    assert_eq!(td.length(), 0);
    assert!(td.compatible(&Tuple::new(vec![])));
}

#[test]
fn test_lookup_errors() {
    let td = mixed_desc();
    assert_eq!(td.index_of("score").unwrap(), 2);
    assert_eq!(td.field_name(1).unwrap(), "name");

    let err = td.index_of("missing").unwrap_err();
    assert!(matches!(err, DatabaseError::FieldNotFound { .. }));
    assert_eq!(err.kind(), ErrorKind::Range);

    let err = td.offset_of(4).unwrap_err();
    assert!(matches!(
        err,
        DatabaseError::FieldIndexOutOfBounds { index: 4, size: 4 }
    ));
}

#[test]
fn test_compatible() {
    let td = mixed_desc();
    let good = Tuple::new(vec![
        Field::Int(1),
        Field::Char("a".to_string()),
        Field::Double(1.0),
        Field::Int(2),
    ]);
    assert!(td.compatible(&good));

    let short = Tuple::new(vec![Field::Int(1)]);
    assert!(!td.compatible(&short));

    let wrong_order = Tuple::new(vec![
        Field::Char("a".to_string()),
        Field::Int(1),
        Field::Double(1.0),
        Field::Int(2),
    ]);
    assert!(!td.compatible(&wrong_order));
}

#[test]
fn test_serialize_incompatible_fails() {
    let td = mixed_desc();
    let mut buf = vec![0u8; td.length()];
    let err = td
        .serialize(&mut buf, &Tuple::new(vec![Field::Int(1)]))
        .unwrap_err();
    assert!(matches!(err, DatabaseError::IncompatibleTuple { .. }));
    assert_eq!(err.kind(), ErrorKind::Schema);
    assert!(buf.iter().all(|&b| b == 0));
}

#[test]
fn test_round_trip_mixed() {
    let td = mixed_desc();
    let tuple = Tuple::new(vec![
        Field::Int(-7),
        Field::Char("alice".to_string()),
        Field::Double(-0.125),
        Field::Int(i32::MAX),
    ]);
    assert_eq!(round_trip(&td, &tuple), tuple);
}

#[test]
fn test_char_capacity_boundaries() {
    let td = TupleDesc::new(vec![Type::Char], names(&["s"])).unwrap();

    let exact = Tuple::new(vec![Field::Char("x".repeat(CHAR_SIZE))]);
    assert_eq!(round_trip(&td, &exact), exact);

    let short = Tuple::new(vec![Field::Char("abc".to_string())]);
    assert_eq!(round_trip(&td, &short), short);

    let empty = Tuple::new(vec![Field::Char(String::new())]);
    assert_eq!(round_trip(&td, &empty), empty);

    let long = "y".repeat(CHAR_SIZE) + "overflow";
    let truncated = round_trip(&td, &Tuple::new(vec![Field::Char(long)]));
    assert_eq!(
        truncated,
        Tuple::new(vec![Field::Char("y".repeat(CHAR_SIZE))])
    );
}

#[test]
fn test_char_is_zero_padded() {
    let td = TupleDesc::new(vec![Type::Int, Type::Char], names(&["id", "s"])).unwrap();
    let mut buf = vec![0xffu8; td.length()];
    td.serialize(&mut buf, &Tuple::new(vec![Field::Int(1), Field::Char("ab".to_string())]))
        .unwrap();
    assert_eq!(&buf[0..4], &1i32.to_le_bytes());
    assert_eq!(&buf[4..6], b"ab");
    assert!(buf[6..].iter().all(|&b| b == 0));
}

#[test]
fn test_serialize_writes_only_record_width() {
    let td = TupleDesc::new(vec![Type::Int], names(&["id"])).unwrap();
    let mut buf = vec![0xaau8; 8];
    td.serialize(&mut buf, &Tuple::new(vec![Field::Int(0)])).unwrap();
    assert_eq!(&buf[..4], &[0, 0, 0, 0]);
    assert_eq!(&buf[4..], &[0xaa; 4]);
}

#[test]
fn test_buffer_too_small() {
    let td = mixed_desc();
    let mut buf = vec![0u8; td.length() - 1];
    let tuple = Tuple::new(vec![
        Field::Int(1),
        Field::Char("a".to_string()),
        Field::Double(1.0),
        Field::Int(2),
    ]);
    assert!(matches!(
        td.serialize(&mut buf, &tuple),
        Err(DatabaseError::BufferTooSmall { .. })
    ));
    assert!(matches!(
        td.deserialize(&buf),
        Err(DatabaseError::BufferTooSmall { .. })
    ));
}

#[test]
fn test_merge() {
    let a = TupleDesc::new(vec![Type::Int, Type::Char], names(&["id", "name"])).unwrap();
    let b = TupleDesc::new(vec![Type::Double], names(&["score"])).unwrap();

    let merged = TupleDesc::merge(&a, &b).unwrap();
    assert_eq!(merged.size(), a.size() + b.size());
    assert_eq!(merged.names(), &names(&["id", "name", "score"])[..]);
    assert_eq!(merged.types(), &[Type::Int, Type::Char, Type::Double]);
    assert_eq!(merged.offset_of(2).unwrap(), a.length());
    assert_eq!(merged.length(), a.length() + b.length());
    assert_eq!(merged.index_of("score").unwrap(), 2);
}

#[test]
fn test_merge_name_collision() {
    let a = TupleDesc::new(vec![Type::Int, Type::Char], names(&["id", "name"])).unwrap();
    let b = TupleDesc::new(vec![Type::Double, Type::Int], names(&["score", "id"])).unwrap();
    let err = TupleDesc::merge(&a, &b).unwrap_err();
    assert!(matches!(err, DatabaseError::DuplicateField { ref name } if name == "id"));
}

#[test]
fn test_json_round_trip_keeps_layout() {
    let td = mixed_desc();
    let json = serde_json::to_string(&td).unwrap();
    assert!(!json.contains("offsets"));
    let decoded: TupleDesc = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, td);
    assert_eq!(decoded.index_of("score").unwrap(), 2);
}

#[test]
fn test_deserialize_rejects_duplicate_names() {
    let json = r#"{"types":["Int","Int"],"names":["a","a"]}"#;
    let err = serde_json::from_str::<TupleDesc>(json).unwrap_err();
    assert!(err.to_string().contains("Duplicate field name 'a'"));
}

#[test]
fn test_deserialize_rejects_count_mismatch() {
    let json = r#"{"types":["Int","Double"],"names":["a"]}"#;
    assert!(serde_json::from_str::<TupleDesc>(json).is_err());
}

#[test]
fn test_deserialize_recomputes_offsets() {
    let json = r#"{
        "types": ["Int", "Int"],
        "names": ["a", "b"],
        "offsets": [100, 0],
        "length": 3
    }"#;
    let td: TupleDesc = serde_json::from_str(json).unwrap();
    assert_eq!(td.offset_of(0).unwrap(), 0);
    assert_eq!(td.offset_of(1).unwrap(), 4);
    assert_eq!(td.length(), 8);

    let tuple = Tuple::new(vec![Field::Int(1), Field::Int(2)]);
    let mut buf = vec![0u8; td.length()];
    td.serialize(&mut buf, &tuple).unwrap();
    assert_eq!(td.deserialize(&buf).unwrap(), tuple);
}
