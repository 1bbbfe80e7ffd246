//! Property-based tests for field whitelists and CNAME exclusivity

use proptest::prelude::*;

use configdns::{DnsRecord, RecordError, RecordType, Zone};

fn record_type_strategy() -> impl Strategy<Value = RecordType> {
    prop::sample::select(RecordType::ALL.to_vec())
}

// Small name pool so that operations collide often, in mixed case
fn owner_name_strategy() -> impl Strategy<Value = String> {
    (prop::sample::select(vec!["", "www", "mail", "api", "blog"]), any::<bool>())
        .prop_map(|(name, upper)| if upper { name.to_uppercase() } else { name.to_string() })
}

fn field_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z_]{1,24}").unwrap()
}

#[derive(Debug, Clone)]
enum Op {
    Set(RecordType, String),
    Add(RecordType, String),
    RemoveByName(String),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let named_type = prop::sample::select(vec![
        RecordType::A,
        RecordType::Aaaa,
        RecordType::Cname,
        RecordType::Mx,
        RecordType::Ns,
        RecordType::Srv,
        RecordType::Txt,
    ]);
    prop_oneof![
        (named_type.clone(), owner_name_strategy()).prop_map(|(t, n)| Op::Set(t, n)),
        (named_type, owner_name_strategy()).prop_map(|(t, n)| Op::Add(t, n)),
        owner_name_strategy().prop_map(Op::RemoveByName),
    ]
}

fn named_record(record_type: RecordType, name: &str) -> DnsRecord {
    let mut record = DnsRecord::new(record_type);
    record.set_field("name", name).unwrap();
    record
}

/// A non-apex CNAME owner name owns nothing else
fn assert_cname_exclusive(zone: &Zone) -> Result<(), TestCaseError> {
    for cname in zone.record_set(RecordType::Cname).unwrap().iter() {
        if cname.owner_name().is_empty() {
            continue;
        }
        let owned = zone.find_records_by_name(cname.owner_name(), &[]);
        prop_assert_eq!(
            owned.len(),
            1,
            "CNAME {:?} shares its name with {:?}",
            cname.owner_name(),
            owned.iter().map(|found| found.record.record_type()).collect::<Vec<_>>()
        );
    }
    Ok(())
}

proptest! {
    #[test]
    fn test_field_whitelist(record_type in record_type_strategy(), field in field_name_strategy()) {
        let mut record = DnsRecord::new(record_type);
        let before = record.clone();
        let allowed = record_type.allows(&field);

        match record.set_field(&field, 1) {
            Err(RecordError::FieldRejected { .. }) => prop_assert!(!allowed),
            Err(RecordError::FieldTypeMismatch { .. }) => prop_assert!(allowed),
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
            Ok(()) => {
                prop_assert!(allowed);
                return Ok(());
            }
        }
        prop_assert_eq!(record, before);
    }

    #[test]
    fn test_allowed_fields_accept_their_kind(record_type in record_type_strategy()) {
        let mut record = DnsRecord::new(record_type);
        for field in record_type.allowed_fields() {
            let value = record.get_field(field).unwrap();
            prop_assert!(record.set_field(field, value).is_ok(), "{} rejected on {}", field, record_type);
        }
    }

    #[test]
    fn test_cname_exclusivity(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut zone = Zone::new("example.com");

        for op in ops {
            match op {
                Op::Set(record_type, name) => {
                    zone.set_record(named_record(record_type, &name));
                }
                Op::Add(record_type, name) => {
                    let snapshot = zone.clone();
                    if let Err(e) = zone.add_record(named_record(record_type, &name)) {
                        prop_assert!(e.is_conflict());
                        prop_assert_eq!(&zone, &snapshot);
                    }
                }
                Op::RemoveByName(name) => {
                    let expected = zone.find_records_by_name(&name, &[]).len();
                    prop_assert_eq!(zone.remove_records_by_name(&name, &[]), expected);
                    prop_assert!(zone.find_records_by_name(&name, &[]).is_empty());
                }
            }
            assert_cname_exclusive(&zone)?;
        }
    }

    #[test]
    fn test_set_record_idempotent(record_type in record_type_strategy(), name in owner_name_strategy()) {
        let mut zone = Zone::new("example.com");
        let mut record = DnsRecord::new(record_type);
        if record_type.has_owner_name() {
            record.set_field("name", name.as_str()).unwrap();
        }

        let first = zone.set_record(record.clone());
        let snapshot = zone.clone();
        let second = zone.set_record(record);

        prop_assert_eq!(first, second);
        prop_assert_eq!(zone, snapshot);
    }
}
