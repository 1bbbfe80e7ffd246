//! configdns
//!
//! Client library for the legacy Akamai Edge DNS zone API (`config-dns/v1`).
//!
//! # Features
//!
//! * Typed records for 21 record types, with per-type field whitelists
//! * A zone model that keeps CNAME records exclusive to their owner name
//! * Save with submit-then-poll reconciliation of the zone token
//! * Blocking HTTP gateway, configuration loading and log setup
//!
//! ```no_run
//! use configdns::{ClientConfig, DnsRecord, HttpZoneGateway, RecordType, SaveOptions, ZoneGateway};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::load(None)?;
//! let gateway = HttpZoneGateway::new(&config)?;
//! let mut zone = gateway.fetch_zone("example.com")?;
//!
//! let mut www = DnsRecord::new(RecordType::A);
//! www.set_field("name", "www")?;
//! www.set_field("target", "192.0.2.10")?;
//! www.set_field("ttl", 300)?;
//! zone.set_record(www);
//!
//! zone.save(&gateway, &SaveOptions::default())?;
//! # Ok(())
//! # }
//! ```

/// Zone model, codec, transport and save protocol
pub mod dns;

/// Client configuration
pub mod config;

/// Tracing subscriber setup
pub mod logging;

pub use crate::config::{ClientConfig, ConfigError};
pub use crate::dns::cancel::CancelSignal;
pub use crate::dns::errors::{RecordError, ZoneError, ZoneResult};
pub use crate::dns::gateway::{HttpZoneGateway, ZoneGateway};
pub use crate::dns::reconcile::{save, PollPolicy, SaveOptions, SaveReport};
pub use crate::dns::record::{
    DnsRecord, FieldKind, FieldValue, NaptrRecord, Nsec3Record, Nsec3paramRecord, NsRecord, Record,
    ResourceRecord, SrvRecord,
};
pub use crate::dns::record_type::{RecordShape, RecordType};
pub use crate::dns::zone::{FoundRecord, RecordCollection, RecordHandle, RecordSet, Zone};
