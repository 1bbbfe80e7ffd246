//! Zone management for the legacy zone API
//!
//! # Module Structure
//!
//! * `record_type` - supported record types and their field tables
//! * `record` - record shapes and field validation
//! * `zone` - the zone aggregate and its mutation rules
//! * `wire` - JSON encoding of zones
//! * `gateway` - transport trait and its HTTP implementation
//! * `reconcile` - submit-then-poll save protocol
//! * `cancel` - cancellation of a running save
//! * `errors` - error types shared by all of the above

/// Record type definitions and per-type field whitelists
pub mod record_type;

/// Generic and specialised record shapes
pub mod record;

/// Zone aggregate with CNAME exclusivity
pub mod zone;

/// Zone JSON codec
pub mod wire;

/// Zone API transport
pub mod gateway;

/// Save protocol with bounded polling
pub mod reconcile;

/// Cross-thread cancellation signal
pub mod cancel;

/// Error types for records and zones
pub mod errors;
