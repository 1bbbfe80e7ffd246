//! JSON encoding of zones as exchanged with the zone API
//!
//! ```json
//! {
//!   "token": "a184671d5307a388180fbf7f11dbdf46",
//!   "zone": {
//!     "name": "example.com",
//!     "soa": { "ttl": 900, "originserver": "...", ... },
//!     "a": [ { "name": "www", "target": "192.0.2.1", ... } ],
//!     "ns": [ { "name": null, "target": "use4.akam.net.", ... } ]
//!   }
//! }
//! ```
//!
//! Record collections are keyed by the lowercase type name. Empty
//! collections are left out when encoding and missing ones decode as empty.

use std::collections::BTreeMap;
use std::convert::TryFrom;

use serde::Serializer;
use serde_derive::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dns::errors::ZoneError;
use crate::dns::record::{
    DnsRecord, NaptrRecord, Nsec3Record, Nsec3paramRecord, NsRecord, Record, SrvRecord,
};
use crate::dns::record_type::{RecordShape, RecordType};
use crate::dns::zone::Zone;

/// Decoded form of the zone document
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ZoneWire {
    #[serde(default)]
    token: String,
    #[serde(default)]
    zone: ZoneBody,
}

#[derive(Debug, Default, Deserialize)]
struct ZoneBody {
    #[serde(default)]
    name: String,
    #[serde(default)]
    soa: Option<Record>,
    #[serde(flatten)]
    sets: Map<String, Value>,
}

#[derive(Serialize)]
struct ZoneWireRef<'a> {
    token: &'a str,
    zone: ZoneBodyRef<'a>,
}

#[derive(Serialize)]
struct ZoneBodyRef<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    soa: Option<&'a Record>,
    #[serde(flatten)]
    sets: BTreeMap<&'static str, Vec<&'a DnsRecord>>,
}

impl serde::Serialize for Zone {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let sets = self
            .populated_sets()
            .map(|(rtype, set)| (rtype.wire_key(), set.iter().collect()))
            .collect();

        let wire = ZoneWireRef {
            token: self.token(),
            zone: ZoneBodyRef {
                name: self.name(),
                soa: self.soa(),
                sets,
            },
        };
        serde::Serialize::serialize(&wire, serializer)
    }
}

impl TryFrom<ZoneWire> for Zone {
    type Error = ZoneError;

    fn try_from(wire: ZoneWire) -> Result<Self, Self::Error> {
        let ZoneWire { token, zone: body } = wire;
        let ZoneBody { name, soa, mut sets } = body;

        let soa = soa.map(|mut soa| {
            adopt(&mut soa, RecordType::Soa);
            soa
        });

        let mut records = Vec::new();
        for rtype in RecordType::ALL.iter().filter(|t| t.has_owner_name()) {
            match sets.remove(rtype.wire_key()) {
                None | Some(Value::Null) => continue,
                Some(value) => records.extend(decode_set(*rtype, value)?),
            }
        }

        Ok(Zone::from_parts(token, name, soa, records))
    }
}

fn adopt(record: &mut Record, record_type: RecordType) {
    let cleared = record.adopt_type(record_type);
    if cleared > 0 {
        log::debug!(
            "Dropped {} field(s) not used by {} record \"{}\"",
            cleared,
            record_type,
            record.name()
        );
    }
}

fn decode_set(record_type: RecordType, value: Value) -> Result<Vec<DnsRecord>, serde_json::Error> {
    let records = match record_type.shape() {
        RecordShape::Generic => serde_json::from_value::<Vec<Record>>(value)?
            .into_iter()
            .map(|mut record| {
                adopt(&mut record, record_type);
                DnsRecord::from(record)
            })
            .collect(),
        RecordShape::Naptr => shaped::<NaptrRecord>(value)?,
        RecordShape::Ns => shaped::<NsRecord>(value)?,
        RecordShape::Nsec3 => shaped::<Nsec3Record>(value)?,
        RecordShape::Nsec3param => shaped::<Nsec3paramRecord>(value)?,
        RecordShape::Srv => shaped::<SrvRecord>(value)?,
    };
    Ok(records)
}

fn shaped<T>(value: Value) -> Result<Vec<DnsRecord>, serde_json::Error>
where
    T: serde::de::DeserializeOwned + Into<DnsRecord>,
{
    let records: Vec<T> = serde_json::from_value(value)?;
    Ok(records.into_iter().map(Into::into).collect())
}
