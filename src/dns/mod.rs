//! A small RFC 1035 message codec.
//!
//! This plays the role the spec calls "the DNS library": the rest of the
//! crate treats [`DnsMessage`] as an opaque value, peeking only at question
//! count, question type, rcode, and answer TTLs. It implements exactly the
//! subset of the wire format this resolver needs — class IN, record types A
//! and AAAA typed, everything else carried as opaque RDATA bytes so
//! pass-through queries still relay byte-faithfully.

mod cursor;
mod header;
mod message;
mod name;
mod question;
mod record;
mod types;

pub use cursor::Reader;
pub use header::DnsHeader;
pub use message::DnsMessage;
pub use name::fqdn;
pub use question::DnsQuestion;
pub use record::{DnsRecord, RData};
pub use types::{DnsClass, DnsType, Rcode};
