//! The zone aggregate: one SOA record plus one record set per record type
//!
//! ## CNAME exclusivity
//!
//! A name that owns a CNAME record may own nothing else. The zone keeps this
//! true on every mutation:
//!
//! - `set_record` takes over the name. Setting a CNAME removes every other
//!   record at that name; setting any other named record removes a CNAME
//!   at that name.
//! - `add_record` refuses the insertion instead and leaves the zone as it was.
//!
//! Names are compared ASCII case-insensitively.
//!
//! ## Handles
//!
//! Every stored record gets a [`RecordHandle`] when it enters the zone.
//! Removal works on handles, so two records with identical fields are still
//! told apart. Handles are unique for the lifetime of the process; a handle
//! taken from a zone that was since replaced by `save` simply finds nothing.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_derive::Deserialize;

use crate::dns::errors::{ZoneError, ZoneResult};
use crate::dns::record::{DnsRecord, Record};
use crate::dns::record_type::RecordType;
use crate::dns::wire::ZoneWire;

/// Token of a zone that has never been saved
pub const NEW_ZONE_TOKEN: &str = "new";

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of a record stored in a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordHandle {
    record_type: RecordType,
    id: u64,
}

impl RecordHandle {
    fn issue(record_type: RecordType) -> RecordHandle {
        RecordHandle {
            record_type,
            id: NEXT_HANDLE.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }
}

#[derive(Debug, Clone, PartialEq)]
struct StoredRecord {
    handle: RecordHandle,
    record: DnsRecord,
}

impl StoredRecord {
    fn new(record: DnsRecord) -> StoredRecord {
        StoredRecord {
            handle: RecordHandle::issue(record.record_type()),
            record,
        }
    }
}

/// Ordered records of a single type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    entries: Vec<StoredRecord>,
}

impl RecordSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DnsRecord> {
        self.entries.iter().map(|entry| &entry.record)
    }

    pub fn handles(&self) -> impl Iterator<Item = RecordHandle> + '_ {
        self.entries.iter().map(|entry| entry.handle)
    }

    pub fn get(&self, index: usize) -> Option<&DnsRecord> {
        self.entries.get(index).map(|entry| &entry.record)
    }

    fn push(&mut self, record: DnsRecord) -> RecordHandle {
        let stored = StoredRecord::new(record);
        let handle = stored.handle;
        self.entries.push(stored);
        handle
    }

    fn remove_named(&mut self, name: &str) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|entry| !same_name(entry.record.owner_name(), name));
        before - self.entries.len()
    }

    /// Remove all but the first record named `name`
    fn dedup_named(&mut self, name: &str) -> usize {
        let before = self.entries.len();
        let mut seen = false;
        self.entries.retain(|entry| {
            if !same_name(entry.record.owner_name(), name) {
                return true;
            }
            let keep = !seen;
            seen = true;
            keep
        });
        before - self.entries.len()
    }

    fn owns(&self, name: &str) -> bool {
        self.iter().any(|record| same_name(record.owner_name(), name))
    }
}

/// What `Zone::get_record_type` hands back for a type name
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordCollection<'a> {
    Set(&'a RecordSet),
    /// The SOA slot, which holds at most one record
    Single(Option<&'a DnsRecord>),
}

impl RecordCollection<'_> {
    pub fn len(&self) -> usize {
        match self {
            RecordCollection::Set(set) => set.len(),
            RecordCollection::Single(record) => record.map_or(0, |_| 1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A record returned by a lookup, with the handle to remove it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoundRecord<'a> {
    pub handle: RecordHandle,
    pub record: &'a DnsRecord,
}

fn same_name(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

fn same_optional_name(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => same_name(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// A DNS zone as managed through the zone API
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "ZoneWire")]
pub struct Zone {
    token: String,
    name: String,
    soa: Option<StoredRecord>,
    sets: BTreeMap<RecordType, RecordSet>,
}

impl Zone {
    /// Create an empty, never saved zone
    pub fn new(name: &str) -> Zone {
        let sets = RecordType::ALL
            .iter()
            .filter(|rtype| **rtype != RecordType::Soa)
            .map(|rtype| (*rtype, RecordSet::default()))
            .collect();

        Zone {
            token: NEW_ZONE_TOKEN.to_string(),
            name: name.to_string(),
            soa: None,
            sets,
        }
    }

    /// Rebuild a zone from decoded API data. No conflict resolution is
    /// applied; the API's view is taken as it is.
    pub(crate) fn from_parts(token: String, name: String, soa: Option<Record>, records: Vec<DnsRecord>) -> Zone {
        let mut zone = Zone::new(&name);
        zone.token = token;
        zone.soa = soa.map(|soa| StoredRecord::new(soa.into()));
        for record in records {
            zone.set_mut(record.record_type()).push(record);
        }
        zone
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn is_new(&self) -> bool {
        self.token == NEW_ZONE_TOKEN
    }

    pub fn soa(&self) -> Option<&Record> {
        self.soa.as_ref().and_then(|stored| stored.record.as_generic())
    }

    /// Advance the SOA serial ahead of a submission; `None` without an SOA
    pub(crate) fn advance_serial(&mut self, now: i64) -> Option<i64> {
        match self.soa.as_mut().map(|stored| &mut stored.record) {
            Some(DnsRecord::Generic(soa)) => Some(soa.advance_serial(now)),
            _ => None,
        }
    }

    /// Record set of a type; `None` for SOA, which is not a set
    pub fn record_set(&self, record_type: RecordType) -> Option<&RecordSet> {
        self.sets.get(&record_type)
    }

    /// Look up the collection for a type name, case-insensitively.
    /// Unrecognised names yield `None`.
    pub fn get_record_type(&self, type_name: &str) -> Option<RecordCollection<'_>> {
        let record_type = type_name.parse::<RecordType>().ok()?;
        if record_type == RecordType::Soa {
            return Some(RecordCollection::Single(self.soa.as_ref().map(|s| &s.record)));
        }
        self.sets.get(&record_type).map(RecordCollection::Set)
    }

    pub fn get_record(&self, handle: RecordHandle) -> Option<&DnsRecord> {
        if handle.record_type == RecordType::Soa {
            return self
                .soa
                .as_ref()
                .filter(|stored| stored.handle == handle)
                .map(|stored| &stored.record);
        }
        self.sets
            .get(&handle.record_type)?
            .entries
            .iter()
            .find(|entry| entry.handle == handle)
            .map(|entry| &entry.record)
    }

    /// Insert or replace a record, taking over its owner name.
    ///
    /// A record replaces the first record of the same type and name in
    /// place and keeps that record's handle.
    pub fn set_record<R: Into<DnsRecord>>(&mut self, record: R) -> RecordHandle {
        let record = record.into();
        let record_type = record.record_type();

        self.take_over_name(&record);

        if record_type == RecordType::Soa {
            let handle = self
                .soa
                .as_ref()
                .map(|stored| stored.handle)
                .unwrap_or_else(|| RecordHandle::issue(RecordType::Soa));
            self.soa = Some(StoredRecord { handle, record });
            return handle;
        }

        let set = self.set_mut(record_type);
        let existing = set
            .entries
            .iter_mut()
            .find(|entry| same_optional_name(entry.record.name(), record.name()));

        match existing {
            Some(entry) => {
                log::debug!(
                    "Replacing {} record \"{}\" in place",
                    record_type,
                    record.owner_name()
                );
                entry.record = record;
                entry.handle
            }
            None => set.push(record),
        }
    }

    /// Insert a record, refusing anything that would break CNAME
    /// exclusivity. Records with the same name are otherwise allowed.
    pub fn add_record<R: Into<DnsRecord>>(&mut self, record: R) -> ZoneResult<RecordHandle> {
        let record = record.into();
        let record_type = record.record_type();

        if record_type == RecordType::Soa {
            if self.soa.is_some() {
                return Err(ZoneError::SoaExists);
            }
            let stored = StoredRecord::new(record);
            let handle = stored.handle;
            self.soa = Some(stored);
            return Ok(handle);
        }

        let name = record.owner_name();
        let conflict = if record_type == RecordType::Cname {
            self.sets.values().any(|set| set.owns(name))
        } else if !name.is_empty() {
            self.sets
                .get(&RecordType::Cname)
                .map_or(false, |cnames| cnames.owns(name))
        } else {
            false
        };

        if conflict {
            return Err(ZoneError::CnameConflict {
                name: name.to_string(),
                record_type,
            });
        }

        Ok(self.set_mut(record_type).push(record))
    }

    /// Remove the record a handle points at and hand it back
    pub fn remove_record(&mut self, handle: RecordHandle) -> ZoneResult<DnsRecord> {
        let record_type = handle.record_type;
        let not_found = ZoneError::RecordNotFound { record_type };

        if record_type == RecordType::Soa {
            return match self.soa.take() {
                Some(stored) if stored.handle == handle => Ok(stored.record),
                other => {
                    self.soa = other;
                    Err(not_found)
                }
            };
        }

        let set = self.set_mut(record_type);
        match set.entries.iter().position(|entry| entry.handle == handle) {
            Some(index) => Ok(set.entries.remove(index).record),
            None => Err(not_found),
        }
    }

    /// Records owned by `name` among `types` (all types when empty), in
    /// type order and then insertion order
    pub fn find_records_by_name(&self, name: &str, types: &[RecordType]) -> Vec<FoundRecord<'_>> {
        self.sets
            .iter()
            .filter(|(rtype, _)| types.is_empty() || types.contains(rtype))
            .flat_map(|(_, set)| set.entries.iter())
            .filter(|entry| same_name(entry.record.owner_name(), name))
            .map(|entry| FoundRecord {
                handle: entry.handle,
                record: &entry.record,
            })
            .collect()
    }

    /// Remove every record `find_records_by_name` would return; returns how
    /// many were removed
    pub fn remove_records_by_name(&mut self, name: &str, types: &[RecordType]) -> usize {
        let removed: usize = self
            .sets
            .iter_mut()
            .filter(|(rtype, _)| types.is_empty() || types.contains(rtype))
            .map(|(_, set)| set.remove_named(name))
            .sum();

        if removed > 0 {
            log::info!("Removed {} record(s) named \"{}\" from zone {}", removed, name, self.name);
        }
        removed
    }

    /// Every record in the zone, SOA included, in type order
    pub fn records(&self) -> Vec<FoundRecord<'_>> {
        let mut records = Vec::with_capacity(self.record_count());
        for rtype in RecordType::ALL.iter() {
            if *rtype == RecordType::Soa {
                if let Some(stored) = &self.soa {
                    records.push(FoundRecord {
                        handle: stored.handle,
                        record: &stored.record,
                    });
                }
                continue;
            }
            if let Some(set) = self.sets.get(rtype) {
                records.extend(set.entries.iter().map(|entry| FoundRecord {
                    handle: entry.handle,
                    record: &entry.record,
                }));
            }
        }
        records
    }

    pub fn record_count(&self) -> usize {
        self.soa.iter().count() + self.sets.values().map(RecordSet::len).sum::<usize>()
    }

    /// Non-empty record sets keyed by type, for encoding
    pub(crate) fn populated_sets(&self) -> impl Iterator<Item = (RecordType, &RecordSet)> {
        self.sets
            .iter()
            .filter(|(_, set)| !set.is_empty())
            .map(|(rtype, set)| (*rtype, set))
    }

    fn set_mut(&mut self, record_type: RecordType) -> &mut RecordSet {
        self.sets.entry(record_type).or_default()
    }

    /// Clear the way for `record` under the CNAME exclusivity rule
    fn take_over_name(&mut self, record: &DnsRecord) -> usize {
        if !record.record_type().has_owner_name() {
            return 0;
        }
        let name = record.owner_name();

        if record.record_type() == RecordType::Cname {
            let mut removed = 0;
            for (rtype, set) in self.sets.iter_mut() {
                if *rtype == RecordType::Cname {
                    let count = set.dedup_named(name);
                    if count > 0 {
                        log::warn!("{} duplicate CNAME record(s) at \"{}\" removed", count, name);
                    }
                    removed += count;
                    continue;
                }
                let count = set.remove_named(name);
                if count > 0 {
                    log::warn!(
                        "{} {} record(s) conflict with CNAME \"{}\", removed",
                        count,
                        rtype,
                        name
                    );
                }
                removed += count;
            }
            removed
        } else if !name.is_empty() {
            let removed = self.set_mut(RecordType::Cname).remove_named(name);
            if removed > 0 {
                log::warn!(
                    "{} record \"{}\" conflicts with existing CNAME, CNAME removed",
                    record.record_type(),
                    name
                );
            }
            removed
        } else {
            0
        }
    }
}
