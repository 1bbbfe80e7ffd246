//! Resource record shapes and per-type field validation
//!
//! Most record types share the generic [`Record`] shape, which carries the
//! superset of every field the zone API knows about. NAPTR, NS, NSEC3,
//! NSEC3PARAM and SRV have their own shapes because their JSON differs
//! (text flags, nullable owner names, fields that are sent even when zero).
//!
//! Whatever the shape, only the fields returned by
//! [`RecordType::allowed_fields`] may be set. Everything else stays at its
//! zero value and is therefore omitted from the JSON sent to the API.
//!
//! ```ignore
//! let mut mx = DnsRecord::new(RecordType::Mx);
//! mx.set_field("name", "mail")?;
//! mx.set_field("target", "mx1.example.com.")?;
//! mx.set_field("priority", 10)?;
//!
//! // MX records have no weight; the record is left untouched.
//! assert!(mx.set_field("weight", 5).is_err());
//! ```

use std::fmt;

use serde_derive::{Deserialize, Serialize};

use crate::dns::errors::RecordError;
use crate::dns::record_type::{RecordShape, RecordType};

/// A value passed to or read from a record field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Text(String),
    Null,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(v) => write!(f, "{}", v),
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::Text(v) => f.write_str(v),
            FieldValue::Null => f.write_str("null"),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v as i64)
    }
}

impl From<u16> for FieldValue {
    fn from(v: u16) -> Self {
        FieldValue::Int(v as i64)
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        FieldValue::Int(v as i64)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<Option<String>> for FieldValue {
    fn from(v: Option<String>) -> Self {
        v.map_or(FieldValue::Null, FieldValue::Text)
    }
}

impl From<&bool> for FieldValue {
    fn from(v: &bool) -> Self {
        FieldValue::Bool(*v)
    }
}

impl From<&i64> for FieldValue {
    fn from(v: &i64) -> Self {
        FieldValue::Int(*v)
    }
}

impl From<&String> for FieldValue {
    fn from(v: &String) -> Self {
        FieldValue::Text(v.clone())
    }
}

impl From<&Option<String>> for FieldValue {
    fn from(v: &Option<String>) -> Self {
        v.clone().into()
    }
}

/// Declared type of a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Int,
    Text,
    /// Text that may be absent (`null` on the wire)
    NullableText,
}

impl FieldKind {
    pub fn describe(&self) -> &'static str {
        match self {
            FieldKind::Bool => "boolean",
            FieldKind::Int => "integer",
            FieldKind::Text => "string",
            FieldKind::NullableText => "string or null",
        }
    }

    /// Parse a command-line style value into this kind
    pub fn parse(&self, raw: &str) -> Option<FieldValue> {
        match self {
            FieldKind::Bool => raw.parse::<bool>().ok().map(FieldValue::Bool),
            FieldKind::Int => raw.parse::<i64>().ok().map(FieldValue::Int),
            FieldKind::Text => Some(FieldValue::Text(raw.to_string())),
            FieldKind::NullableText if raw == "null" => Some(FieldValue::Null),
            FieldKind::NullableText => Some(FieldValue::Text(raw.to_string())),
        }
    }
}

/// Mutable access to one field of a record shape
pub enum FieldSlot<'a> {
    Bool(&'a mut bool),
    Int(&'a mut i64),
    Text(&'a mut String),
    NullableText(&'a mut Option<String>),
}

impl FieldSlot<'_> {
    fn kind(&self) -> FieldKind {
        match self {
            FieldSlot::Bool(_) => FieldKind::Bool,
            FieldSlot::Int(_) => FieldKind::Int,
            FieldSlot::Text(_) => FieldKind::Text,
            FieldSlot::NullableText(_) => FieldKind::NullableText,
        }
    }

    fn clear(self) {
        match self {
            FieldSlot::Bool(slot) => *slot = false,
            FieldSlot::Int(slot) => *slot = 0,
            FieldSlot::Text(slot) => slot.clear(),
            FieldSlot::NullableText(slot) => *slot = None,
        }
    }
}

/// Name-based access to the fields of a record shape.
///
/// Field names passed to these methods are already lowercased.
pub trait FieldTable {
    fn field_names(&self) -> &'static [&'static str];
    fn field_slot(&mut self, field: &str) -> Option<FieldSlot<'_>>;
    fn field_value(&self, field: &str) -> Option<FieldValue>;
    fn field_kind(&self, field: &str) -> Option<FieldKind>;
}

/// Common contract of every record shape
pub trait ResourceRecord: FieldTable {
    fn record_type(&self) -> RecordType;

    fn allows(&self, field: &str) -> bool {
        self.record_type().allows(field)
    }

    fn allowed_fields(&self) -> &'static [&'static str] {
        self.record_type().allowed_fields()
    }

    /// Assign `value` to `name` if the field is allowed for this record's
    /// type and the value has the field's kind. On error nothing changes.
    fn set_field<V>(&mut self, name: &str, value: V) -> Result<(), RecordError>
    where
        V: Into<FieldValue>,
        Self: Sized,
    {
        let record_type = self.record_type();
        let field = name.to_ascii_lowercase();
        let rejected = || RecordError::FieldRejected {
            record_type,
            field: name.to_string(),
        };

        if !record_type.allows(&field) {
            return Err(rejected());
        }

        let slot = self.field_slot(&field).ok_or_else(rejected)?;
        match (slot, value.into()) {
            (FieldSlot::Bool(slot), FieldValue::Bool(v)) => *slot = v,
            (FieldSlot::Int(slot), FieldValue::Int(v)) => *slot = v,
            (FieldSlot::Text(slot), FieldValue::Text(v)) => *slot = v,
            (FieldSlot::NullableText(slot), FieldValue::Text(v)) => *slot = Some(v),
            (FieldSlot::NullableText(slot), FieldValue::Null) => *slot = None,
            (slot, _) => {
                return Err(RecordError::FieldTypeMismatch {
                    record_type,
                    field: name.to_string(),
                    expected: slot.kind().describe(),
                })
            }
        }

        Ok(())
    }

    /// Read an allowed field; `None` when the field is not allowed
    fn get_field(&self, name: &str) -> Option<FieldValue> {
        let field = name.to_ascii_lowercase();
        if !self.allows(&field) {
            return None;
        }
        self.field_value(&field)
    }

    /// Declared kind of an allowed field
    fn kind_of(&self, name: &str) -> Option<FieldKind> {
        let field = name.to_ascii_lowercase();
        if !self.allows(&field) {
            return None;
        }
        self.field_kind(&field)
    }
}

macro_rules! field_table {
    ($shape:ty { $($field:ident => $kind:ident),* $(,)? }) => {
        impl FieldTable for $shape {
            fn field_names(&self) -> &'static [&'static str] {
                &[$(stringify!($field)),*]
            }

            fn field_slot(&mut self, field: &str) -> Option<FieldSlot<'_>> {
                match field {
                    $(stringify!($field) => Some(FieldSlot::$kind(&mut self.$field)),)*
                    _ => None,
                }
            }

            fn field_value(&self, field: &str) -> Option<FieldValue> {
                match field {
                    $(stringify!($field) => Some(FieldValue::from(&self.$field)),)*
                    _ => None,
                }
            }

            fn field_kind(&self, field: &str) -> Option<FieldKind> {
                match field {
                    $(stringify!($field) => Some(FieldKind::$kind),)*
                    _ => None,
                }
            }
        }
    };
}

fn is_false(v: &bool) -> bool {
    !*v
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}

fn placeholder_type() -> RecordType {
    RecordType::A
}

/// Generic record shape carrying the superset of all record fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(skip, default = "placeholder_type")]
    record_type: RecordType,
    #[serde(default, skip_serializing_if = "is_false")]
    active: bool,
    #[serde(default, skip_serializing_if = "is_zero")]
    algorithm: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    contact: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    digest: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    digest_type: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    expiration: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    expire: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    fingerprint: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    fingerprint_type: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    flags: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    hardware: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    inception: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    iterations: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    key: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    keytag: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    labels: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    mailbox: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    minimum: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    next_hashed_owner_name: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    order: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    original_ttl: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    originserver: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    port: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    preference: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    priority: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    protocol: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    refresh: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    regexp: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    replacement: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    retry: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    salt: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    serial: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    service: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    signature: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    signer: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    software: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    subtype: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    target: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    ttl: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    txt: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    type_bitmaps: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    type_covered: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    weight: i64,
}

field_table!(Record {
    active => Bool,
    algorithm => Int,
    contact => Text,
    digest => Text,
    digest_type => Int,
    expiration => Text,
    expire => Int,
    fingerprint => Text,
    fingerprint_type => Int,
    flags => Int,
    hardware => Text,
    inception => Text,
    iterations => Int,
    key => Text,
    keytag => Int,
    labels => Int,
    mailbox => Text,
    minimum => Int,
    name => Text,
    next_hashed_owner_name => Text,
    order => Int,
    original_ttl => Int,
    originserver => Text,
    port => Int,
    preference => Int,
    priority => Int,
    protocol => Int,
    refresh => Int,
    regexp => Text,
    replacement => Text,
    retry => Int,
    salt => Text,
    serial => Int,
    service => Text,
    signature => Text,
    signer => Text,
    software => Text,
    subtype => Int,
    target => Text,
    ttl => Int,
    txt => Text,
    type_bitmaps => Text,
    type_covered => Text,
    weight => Int,
});

impl ResourceRecord for Record {
    fn record_type(&self) -> RecordType {
        self.record_type
    }
}

impl Record {
    /// Create an empty record of a type stored in the generic shape
    pub fn new(record_type: RecordType) -> Result<Record, RecordError> {
        if record_type.shape() != RecordShape::Generic {
            return Err(RecordError::ShapeMismatch(record_type));
        }
        if record_type == RecordType::Soa {
            return Ok(Record::new_soa());
        }
        Ok(Record::blank(record_type))
    }

    /// Create an SOA record whose serial defaults to the current Unix time
    pub fn new_soa() -> Record {
        let mut soa = Record::blank(RecordType::Soa);
        soa.serial = chrono::Utc::now().timestamp();
        soa
    }

    fn blank(record_type: RecordType) -> Record {
        Record {
            record_type,
            active: false,
            algorithm: 0,
            contact: String::new(),
            digest: String::new(),
            digest_type: 0,
            expiration: String::new(),
            expire: 0,
            fingerprint: String::new(),
            fingerprint_type: 0,
            flags: 0,
            hardware: String::new(),
            inception: String::new(),
            iterations: 0,
            key: String::new(),
            keytag: 0,
            labels: 0,
            mailbox: String::new(),
            minimum: 0,
            name: String::new(),
            next_hashed_owner_name: String::new(),
            order: 0,
            original_ttl: 0,
            originserver: String::new(),
            port: 0,
            preference: 0,
            priority: 0,
            protocol: 0,
            refresh: 0,
            regexp: String::new(),
            replacement: String::new(),
            retry: 0,
            salt: String::new(),
            serial: 0,
            service: String::new(),
            signature: String::new(),
            signer: String::new(),
            software: String::new(),
            subtype: 0,
            target: String::new(),
            ttl: 0,
            txt: String::new(),
            type_bitmaps: String::new(),
            type_covered: String::new(),
            weight: 0,
        }
    }

    /// Attach the type a decoded record was found under and drop values in
    /// fields that type does not allow. Returns the number of fields cleared.
    pub(crate) fn adopt_type(&mut self, record_type: RecordType) -> usize {
        self.record_type = record_type;

        let mut cleared = 0;
        for field in self.field_names() {
            if record_type.allows(field) {
                continue;
            }
            let is_set = match self.field_value(field) {
                Some(FieldValue::Bool(v)) => v,
                Some(FieldValue::Int(v)) => v != 0,
                Some(FieldValue::Text(v)) => !v.is_empty(),
                _ => false,
            };
            if is_set {
                if let Some(slot) = self.field_slot(field) {
                    slot.clear();
                    cleared += 1;
                }
            }
        }
        cleared
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn ttl(&self) -> i64 {
        self.ttl
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn serial(&self) -> i64 {
        self.serial
    }

    /// Move the serial to `now`, or one past its current value when that is
    /// already later. Returns the new serial.
    pub(crate) fn advance_serial(&mut self, now: i64) -> i64 {
        self.serial = now.max(self.serial.saturating_add(1));
        self.serial
    }
}

/// NAPTR record; `flags` is text and `order` is sent even when zero
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NaptrRecord {
    #[serde(default, skip_serializing_if = "is_false")]
    active: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    flags: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(default)]
    order: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    preference: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    regexp: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    replacement: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    service: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    ttl: i64,
}

field_table!(NaptrRecord {
    active => Bool,
    flags => Text,
    name => Text,
    order => Int,
    preference => Int,
    regexp => Text,
    replacement => Text,
    service => Text,
    ttl => Int,
});

impl ResourceRecord for NaptrRecord {
    fn record_type(&self) -> RecordType {
        RecordType::Naptr
    }
}

impl NaptrRecord {
    pub fn new() -> NaptrRecord {
        NaptrRecord::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// NS record; an absent owner name (`null`) differs from an empty one
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NsRecord {
    #[serde(default, skip_serializing_if = "is_false")]
    active: bool,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    target: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    ttl: i64,
}

field_table!(NsRecord {
    active => Bool,
    name => NullableText,
    target => Text,
    ttl => Int,
});

impl ResourceRecord for NsRecord {
    fn record_type(&self) -> RecordType {
        RecordType::Ns
    }
}

impl NsRecord {
    pub fn new() -> NsRecord {
        NsRecord::default()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

/// NSEC3 record; `flags` is sent even when zero
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nsec3Record {
    #[serde(default, skip_serializing_if = "is_false")]
    active: bool,
    #[serde(default, skip_serializing_if = "is_zero")]
    algorithm: i64,
    #[serde(default)]
    flags: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    iterations: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    next_hashed_owner_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    salt: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    ttl: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    type_bitmaps: String,
}

field_table!(Nsec3Record {
    active => Bool,
    algorithm => Int,
    flags => Int,
    iterations => Int,
    name => Text,
    next_hashed_owner_name => Text,
    salt => Text,
    ttl => Int,
    type_bitmaps => Text,
});

impl ResourceRecord for Nsec3Record {
    fn record_type(&self) -> RecordType {
        RecordType::Nsec3
    }
}

impl Nsec3Record {
    pub fn new() -> Nsec3Record {
        Nsec3Record::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// NSEC3PARAM record; `flags` is sent even when zero
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nsec3paramRecord {
    #[serde(default, skip_serializing_if = "is_false")]
    active: bool,
    #[serde(default, skip_serializing_if = "is_zero")]
    algorithm: i64,
    #[serde(default)]
    flags: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    iterations: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    salt: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    ttl: i64,
}

field_table!(Nsec3paramRecord {
    active => Bool,
    algorithm => Int,
    flags => Int,
    iterations => Int,
    name => Text,
    salt => Text,
    ttl => Int,
});

impl ResourceRecord for Nsec3paramRecord {
    fn record_type(&self) -> RecordType {
        RecordType::Nsec3param
    }
}

impl Nsec3paramRecord {
    pub fn new() -> Nsec3paramRecord {
        Nsec3paramRecord::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// SRV record; `weight` is sent even when zero
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrvRecord {
    #[serde(default, skip_serializing_if = "is_false")]
    active: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    port: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    priority: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    target: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    ttl: i64,
    #[serde(default)]
    weight: i64,
}

field_table!(SrvRecord {
    active => Bool,
    name => Text,
    port => Int,
    priority => Int,
    target => Text,
    ttl => Int,
    weight => Int,
});

impl ResourceRecord for SrvRecord {
    fn record_type(&self) -> RecordType {
        RecordType::Srv
    }
}

impl SrvRecord {
    pub fn new() -> SrvRecord {
        SrvRecord::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A record of any supported type, tagged by its shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DnsRecord {
    Generic(Record),
    Naptr(NaptrRecord),
    Ns(NsRecord),
    Nsec3(Nsec3Record),
    Nsec3param(Nsec3paramRecord),
    Srv(SrvRecord),
}

macro_rules! each_shape {
    ($record:expr, $inner:ident => $body:expr) => {
        match $record {
            DnsRecord::Generic($inner) => $body,
            DnsRecord::Naptr($inner) => $body,
            DnsRecord::Ns($inner) => $body,
            DnsRecord::Nsec3($inner) => $body,
            DnsRecord::Nsec3param($inner) => $body,
            DnsRecord::Srv($inner) => $body,
        }
    };
}

impl DnsRecord {
    /// Create an empty record of any type in its proper shape
    pub fn new(record_type: RecordType) -> DnsRecord {
        match record_type.shape() {
            RecordShape::Naptr => DnsRecord::Naptr(NaptrRecord::new()),
            RecordShape::Ns => DnsRecord::Ns(NsRecord::new()),
            RecordShape::Nsec3 => DnsRecord::Nsec3(Nsec3Record::new()),
            RecordShape::Nsec3param => DnsRecord::Nsec3param(Nsec3paramRecord::new()),
            RecordShape::Srv => DnsRecord::Srv(SrvRecord::new()),
            RecordShape::Generic if record_type == RecordType::Soa => {
                DnsRecord::Generic(Record::new_soa())
            }
            RecordShape::Generic => DnsRecord::Generic(Record::blank(record_type)),
        }
    }

    pub fn record_type(&self) -> RecordType {
        each_shape!(self, r => r.record_type())
    }

    /// Owner name, `None` for SOA records and NS records without a name
    pub fn name(&self) -> Option<&str> {
        match self {
            DnsRecord::Generic(r) if r.record_type() == RecordType::Soa => None,
            DnsRecord::Generic(r) => Some(r.name()),
            DnsRecord::Naptr(r) => Some(r.name()),
            DnsRecord::Ns(r) => r.name(),
            DnsRecord::Nsec3(r) => Some(r.name()),
            DnsRecord::Nsec3param(r) => Some(r.name()),
            DnsRecord::Srv(r) => Some(r.name()),
        }
    }

    /// Owner name with absent names read as empty
    pub fn owner_name(&self) -> &str {
        self.name().unwrap_or("")
    }

    pub fn allows(&self, field: &str) -> bool {
        self.record_type().allows(field)
    }

    pub fn allowed_fields(&self) -> &'static [&'static str] {
        self.record_type().allowed_fields()
    }

    pub fn set_field<V: Into<FieldValue>>(&mut self, name: &str, value: V) -> Result<(), RecordError> {
        each_shape!(self, r => r.set_field(name, value))
    }

    pub fn get_field(&self, name: &str) -> Option<FieldValue> {
        each_shape!(self, r => r.get_field(name))
    }

    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        each_shape!(self, r => r.kind_of(name))
    }

    /// Allowed fields paired with their current values
    pub fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        self.allowed_fields()
            .iter()
            .filter_map(|field| self.get_field(field).map(|value| (*field, value)))
            .collect()
    }

    pub fn as_generic(&self) -> Option<&Record> {
        match self {
            DnsRecord::Generic(r) => Some(r),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        each_shape!(self, r => serde_json::to_value(r))
    }
}

impl serde::Serialize for DnsRecord {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        each_shape!(self, r => serde::Serialize::serialize(r, serializer))
    }
}

impl From<Record> for DnsRecord {
    fn from(record: Record) -> Self {
        DnsRecord::Generic(record)
    }
}

impl From<NaptrRecord> for DnsRecord {
    fn from(record: NaptrRecord) -> Self {
        DnsRecord::Naptr(record)
    }
}

impl From<NsRecord> for DnsRecord {
    fn from(record: NsRecord) -> Self {
        DnsRecord::Ns(record)
    }
}

impl From<Nsec3Record> for DnsRecord {
    fn from(record: Nsec3Record) -> Self {
        DnsRecord::Nsec3(record)
    }
}

impl From<Nsec3paramRecord> for DnsRecord {
    fn from(record: Nsec3paramRecord) -> Self {
        DnsRecord::Nsec3param(record)
    }
}

impl From<SrvRecord> for DnsRecord {
    fn from(record: SrvRecord) -> Self {
        DnsRecord::Srv(record)
    }
}
