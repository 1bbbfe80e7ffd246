//! DNS record type definitions and the per-type dispatch table
//!
//! Every property that depends on the record type lives here: the canonical
//! name, the key used in the zone JSON, the record shape and the list of
//! fields the API accepts for that type. Adding a record type means adding a
//! variant and one arm in each table below.

use std::fmt;
use std::str::FromStr;

use serde_derive::{Deserialize, Serialize};

use crate::dns::errors::RecordError;

/// `RecordType` is one of the resource record types the zone API manages
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Hash, Copy, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    A,
    Aaaa,
    Afsdb,
    Cname,
    Dnskey,
    Ds,
    Hinfo,
    Loc,
    Mx,
    Naptr,
    Ns,
    Nsec3,
    Nsec3param,
    Ptr,
    Rp,
    Rrsig,
    Soa,
    Spf,
    Srv,
    Sshfp,
    Txt,
}

/// The struct a record type is stored in
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum RecordShape {
    /// `Record`, the superset shape shared by most types
    Generic,
    Naptr,
    Ns,
    Nsec3,
    Nsec3param,
    Srv,
}

const ADDRESS_FIELDS: &[&str] = &["name", "ttl", "active", "target"];
const AFSDB_FIELDS: &[&str] = &["name", "ttl", "active", "target", "subtype"];
const DNSKEY_FIELDS: &[&str] = &["name", "ttl", "active", "flags", "protocol", "algorithm", "key"];
const DS_FIELDS: &[&str] = &["name", "ttl", "active", "keytag", "algorithm", "digest_type", "digest"];
const HINFO_FIELDS: &[&str] = &["name", "ttl", "active", "hardware", "software"];
const MX_FIELDS: &[&str] = &["name", "ttl", "active", "target", "priority"];
const NAPTR_FIELDS: &[&str] = &[
    "name",
    "ttl",
    "active",
    "order",
    "preference",
    "flags",
    "service",
    "regexp",
    "replacement",
];
const NSEC3_FIELDS: &[&str] = &[
    "name",
    "ttl",
    "active",
    "algorithm",
    "flags",
    "iterations",
    "salt",
    "next_hashed_owner_name",
    "type_bitmaps",
];
const NSEC3PARAM_FIELDS: &[&str] = &["name", "ttl", "active", "algorithm", "flags", "iterations", "salt"];
const RP_FIELDS: &[&str] = &["name", "ttl", "active", "mailbox", "txt"];
const RRSIG_FIELDS: &[&str] = &[
    "name",
    "ttl",
    "active",
    "type_covered",
    "algorithm",
    "original_ttl",
    "expiration",
    "inception",
    "keytag",
    "signer",
    "signature",
    "labels",
];
const SOA_FIELDS: &[&str] = &[
    "ttl",
    "originserver",
    "contact",
    "serial",
    "refresh",
    "retry",
    "expire",
    "minimum",
];
const SRV_FIELDS: &[&str] = &["name", "ttl", "active", "target", "priority", "weight", "port"];
const SSHFP_FIELDS: &[&str] = &["name", "ttl", "active", "algorithm", "fingerprint_type", "fingerprint"];

impl RecordType {
    /// All supported types, in the order zones iterate them
    pub const ALL: [RecordType; 21] = [
        RecordType::A,
        RecordType::Aaaa,
        RecordType::Afsdb,
        RecordType::Cname,
        RecordType::Dnskey,
        RecordType::Ds,
        RecordType::Hinfo,
        RecordType::Loc,
        RecordType::Mx,
        RecordType::Naptr,
        RecordType::Ns,
        RecordType::Nsec3,
        RecordType::Nsec3param,
        RecordType::Ptr,
        RecordType::Rp,
        RecordType::Rrsig,
        RecordType::Soa,
        RecordType::Spf,
        RecordType::Srv,
        RecordType::Sshfp,
        RecordType::Txt,
    ];

    pub fn as_str(&self) -> &'static str {
        match *self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Afsdb => "AFSDB",
            RecordType::Cname => "CNAME",
            RecordType::Dnskey => "DNSKEY",
            RecordType::Ds => "DS",
            RecordType::Hinfo => "HINFO",
            RecordType::Loc => "LOC",
            RecordType::Mx => "MX",
            RecordType::Naptr => "NAPTR",
            RecordType::Ns => "NS",
            RecordType::Nsec3 => "NSEC3",
            RecordType::Nsec3param => "NSEC3PARAM",
            RecordType::Ptr => "PTR",
            RecordType::Rp => "RP",
            RecordType::Rrsig => "RRSIG",
            RecordType::Soa => "SOA",
            RecordType::Spf => "SPF",
            RecordType::Srv => "SRV",
            RecordType::Sshfp => "SSHFP",
            RecordType::Txt => "TXT",
        }
    }

    /// Key of this type's collection inside the `zone` JSON object
    pub fn wire_key(&self) -> &'static str {
        match *self {
            RecordType::A => "a",
            RecordType::Aaaa => "aaaa",
            RecordType::Afsdb => "afsdb",
            RecordType::Cname => "cname",
            RecordType::Dnskey => "dnskey",
            RecordType::Ds => "ds",
            RecordType::Hinfo => "hinfo",
            RecordType::Loc => "loc",
            RecordType::Mx => "mx",
            RecordType::Naptr => "naptr",
            RecordType::Ns => "ns",
            RecordType::Nsec3 => "nsec3",
            RecordType::Nsec3param => "nsec3param",
            RecordType::Ptr => "ptr",
            RecordType::Rp => "rp",
            RecordType::Rrsig => "rrsig",
            RecordType::Soa => "soa",
            RecordType::Spf => "spf",
            RecordType::Srv => "srv",
            RecordType::Sshfp => "sshfp",
            RecordType::Txt => "txt",
        }
    }

    pub fn shape(&self) -> RecordShape {
        match *self {
            RecordType::Naptr => RecordShape::Naptr,
            RecordType::Ns => RecordShape::Ns,
            RecordType::Nsec3 => RecordShape::Nsec3,
            RecordType::Nsec3param => RecordShape::Nsec3param,
            RecordType::Srv => RecordShape::Srv,
            _ => RecordShape::Generic,
        }
    }

    /// Fields the API accepts for this type, in canonical order
    pub fn allowed_fields(&self) -> &'static [&'static str] {
        match *self {
            RecordType::A
            | RecordType::Aaaa
            | RecordType::Cname
            | RecordType::Loc
            | RecordType::Ns
            | RecordType::Ptr
            | RecordType::Spf
            | RecordType::Txt => ADDRESS_FIELDS,
            RecordType::Afsdb => AFSDB_FIELDS,
            RecordType::Dnskey => DNSKEY_FIELDS,
            RecordType::Ds => DS_FIELDS,
            RecordType::Hinfo => HINFO_FIELDS,
            RecordType::Mx => MX_FIELDS,
            RecordType::Naptr => NAPTR_FIELDS,
            RecordType::Nsec3 => NSEC3_FIELDS,
            RecordType::Nsec3param => NSEC3PARAM_FIELDS,
            RecordType::Rp => RP_FIELDS,
            RecordType::Rrsig => RRSIG_FIELDS,
            RecordType::Soa => SOA_FIELDS,
            RecordType::Srv => SRV_FIELDS,
            RecordType::Sshfp => SSHFP_FIELDS,
        }
    }

    /// Case-insensitive membership test against `allowed_fields`
    pub fn allows(&self, field: &str) -> bool {
        self.allowed_fields()
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(field))
    }

    /// Whether records of this type are owned by a name. SOA is not.
    pub fn has_owner_name(&self) -> bool {
        *self != RecordType::Soa
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordType::ALL
            .iter()
            .find(|rtype| rtype.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| RecordError::UnknownRecordType(s.to_string()))
    }
}
