//! DNS record model
//!
//! [`DnsRecord`] is the structured form shared by the zone codec, the provider
//! client and the bulk operations. The type-specific payload lives in
//! [`RecordData`], one variant per record type, so an MX record cannot carry
//! a port and a CNAME cannot carry a priority.
//!
//! ## JSON shape
//!
//! Records travel to and from the provider API in a flat shape:
//!
//! ```json
//! {
//!   "id": 5123,
//!   "fieldType": "MX",
//!   "subDomain": "",
//!   "ttl": 3600,
//!   "target": "mail.example.com",
//!   "priority": 10
//! }
//! ```
//!
//! `DnsRecord` (de)serializes through that shape. Numeric ids are kept as
//! strings.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// TTL used when a record does not carry one
pub const DEFAULT_TTL: u32 = 3600;

/// DNS record type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    Aaaa,
    Cname,
    Mx,
    Txt,
    Spf,
    Srv,
    Ns,
    Caa,
    Soa,
    /// Any type without dedicated handling, kept verbatim
    Other(String),
}

impl RecordType {
    /// Zone-file mnemonic for this type
    pub fn as_str(&self) -> &str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Txt => "TXT",
            RecordType::Spf => "SPF",
            RecordType::Srv => "SRV",
            RecordType::Ns => "NS",
            RecordType::Caa => "CAA",
            RecordType::Soa => "SOA",
            RecordType::Other(name) => name,
        }
    }
}

/// Type mnemonics are matched case-sensitively; anything unknown becomes
/// [`RecordType::Other`].
impl FromStr for RecordType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "A" => RecordType::A,
            "AAAA" => RecordType::Aaaa,
            "CNAME" => RecordType::Cname,
            "MX" => RecordType::Mx,
            "TXT" => RecordType::Txt,
            "SPF" => RecordType::Spf,
            "SRV" => RecordType::Srv,
            "NS" => RecordType::Ns,
            "CAA" => RecordType::Caa,
            "SOA" => RecordType::Soa,
            other => RecordType::Other(other.to_string()),
        })
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RecordType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RecordType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(RecordType::from_str(&name).unwrap_or_else(|never| match never {}))
    }
}

/// Type-specific record payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    A {
        target: String,
    },
    Aaaa {
        target: String,
    },
    Cname {
        target: String,
    },
    Ns {
        target: String,
    },
    Mx {
        priority: Option<u16>,
        target: String,
    },
    Txt {
        target: String,
    },
    Spf {
        target: String,
    },
    Srv {
        priority: Option<u16>,
        weight: Option<u16>,
        port: Option<u16>,
        target: String,
    },
    Caa {
        flags: Option<u8>,
        tag: Option<String>,
        target: String,
    },
    /// Provider-managed; never produced by the zone parser
    Soa {
        target: String,
    },
    Other {
        record_type: String,
        target: String,
    },
}

impl RecordData {
    /// The record type of this payload
    pub fn record_type(&self) -> RecordType {
        match self {
            RecordData::A { .. } => RecordType::A,
            RecordData::Aaaa { .. } => RecordType::Aaaa,
            RecordData::Cname { .. } => RecordType::Cname,
            RecordData::Ns { .. } => RecordType::Ns,
            RecordData::Mx { .. } => RecordType::Mx,
            RecordData::Txt { .. } => RecordType::Txt,
            RecordData::Spf { .. } => RecordType::Spf,
            RecordData::Srv { .. } => RecordType::Srv,
            RecordData::Caa { .. } => RecordType::Caa,
            RecordData::Soa { .. } => RecordType::Soa,
            RecordData::Other { record_type, .. } => RecordType::Other(record_type.clone()),
        }
    }

    /// Zone-file mnemonic, without allocating
    pub fn type_name(&self) -> &str {
        match self {
            RecordData::Other { record_type, .. } => record_type,
            RecordData::A { .. } => "A",
            RecordData::Aaaa { .. } => "AAAA",
            RecordData::Cname { .. } => "CNAME",
            RecordData::Ns { .. } => "NS",
            RecordData::Mx { .. } => "MX",
            RecordData::Txt { .. } => "TXT",
            RecordData::Spf { .. } => "SPF",
            RecordData::Srv { .. } => "SRV",
            RecordData::Caa { .. } => "CAA",
            RecordData::Soa { .. } => "SOA",
        }
    }

    /// Position in the canonical zone-file export order
    pub fn sort_rank(&self) -> u8 {
        match self {
            RecordData::Soa { .. } => 0,
            RecordData::Ns { .. } => 1,
            RecordData::A { .. } => 2,
            RecordData::Aaaa { .. } => 3,
            RecordData::Cname { .. } => 4,
            RecordData::Mx { .. } => 5,
            RecordData::Txt { .. } => 6,
            RecordData::Spf { .. } => 7,
            RecordData::Srv { .. } => 8,
            RecordData::Caa { .. } | RecordData::Other { .. } => 99,
        }
    }

    /// The target (record value) carried by every variant
    pub fn target(&self) -> &str {
        match self {
            RecordData::A { target }
            | RecordData::Aaaa { target }
            | RecordData::Cname { target }
            | RecordData::Ns { target }
            | RecordData::Mx { target, .. }
            | RecordData::Txt { target }
            | RecordData::Spf { target }
            | RecordData::Srv { target, .. }
            | RecordData::Caa { target, .. }
            | RecordData::Soa { target }
            | RecordData::Other { target, .. } => target,
        }
    }
}

/// A DNS resource record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RecordWire", into = "RecordWire")]
pub struct DnsRecord {
    /// Provider-assigned identifier, absent for records not yet created
    pub id: Option<String>,
    /// Subdomain label; empty for the zone apex
    pub owner: String,
    /// Time-to-live in seconds
    pub ttl: u32,
    /// Type-specific payload
    pub data: RecordData,
}

impl DnsRecord {
    /// Create a record with the default TTL and no id
    pub fn new(owner: impl Into<String>, data: RecordData) -> Self {
        Self {
            id: None,
            owner: owner.into(),
            ttl: DEFAULT_TTL,
            data,
        }
    }

    /// Set the TTL
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the provider id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn record_type(&self) -> RecordType {
        self.data.record_type()
    }

    pub fn target(&self) -> &str {
        self.data.target()
    }

    /// Whether this record sits at the zone apex
    pub fn is_apex(&self) -> bool {
        self.owner.is_empty()
    }
}

/// Partial update applied by bulk record updates
///
/// Only the fields that are set are sent to the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<RecordType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}

impl RecordPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field_type(mut self, field_type: RecordType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// A zero TTL is treated as "leave unchanged"
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = (ttl > 0).then_some(ttl);
        self
    }

    /// True when the patch would change nothing
    pub fn is_empty(&self) -> bool {
        self.field_type.is_none() && self.target.is_none() && self.ttl.is_none()
    }
}

/// Remove a single trailing dot, if present
pub(crate) fn strip_trailing_dot(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

/// Provider ids come back as numbers from some APIs and strings from others
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum WireId {
    Number(u64),
    Text(String),
}

impl From<WireId> for String {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Number(n) => n.to_string(),
            WireId::Text(s) => s,
        }
    }
}

/// Flat provider representation of a record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<WireId>,
    field_type: RecordType,
    #[serde(default)]
    sub_domain: Option<String>,
    #[serde(default)]
    ttl: Option<u32>,
    #[serde(default)]
    target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    priority: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    weight: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    flags: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
}

impl From<RecordWire> for DnsRecord {
    fn from(wire: RecordWire) -> Self {
        let target = wire.target.unwrap_or_default();
        let name_target = strip_trailing_dot(&target).to_string();

        let data = match wire.field_type {
            RecordType::A => RecordData::A { target },
            RecordType::Aaaa => RecordData::Aaaa { target },
            RecordType::Cname => RecordData::Cname {
                target: name_target,
            },
            RecordType::Ns => RecordData::Ns {
                target: name_target,
            },
            RecordType::Mx => RecordData::Mx {
                priority: wire.priority,
                target: name_target,
            },
            RecordType::Txt => RecordData::Txt { target },
            RecordType::Spf => RecordData::Spf { target },
            RecordType::Srv => RecordData::Srv {
                priority: wire.priority,
                weight: wire.weight,
                port: wire.port,
                target: name_target,
            },
            RecordType::Caa => RecordData::Caa {
                flags: wire.flags,
                tag: wire.tag,
                target,
            },
            RecordType::Soa => RecordData::Soa { target },
            RecordType::Other(record_type) => RecordData::Other {
                record_type,
                target,
            },
        };

        let owner = wire.sub_domain.unwrap_or_default();

        DnsRecord {
            id: wire.id.map(String::from),
            owner: strip_trailing_dot(&owner).to_string(),
            ttl: wire.ttl.filter(|ttl| *ttl > 0).unwrap_or(DEFAULT_TTL),
            data,
        }
    }
}

impl From<DnsRecord> for RecordWire {
    fn from(record: DnsRecord) -> Self {
        let mut wire = RecordWire {
            id: record.id.map(WireId::Text),
            field_type: record.data.record_type(),
            sub_domain: Some(record.owner),
            ttl: Some(record.ttl),
            target: None,
            priority: None,
            weight: None,
            port: None,
            flags: None,
            tag: None,
        };

        let target = match record.data {
            RecordData::Mx { priority, target } => {
                wire.priority = priority;
                target
            }
            RecordData::Srv {
                priority,
                weight,
                port,
                target,
            } => {
                wire.priority = priority;
                wire.weight = weight;
                wire.port = port;
                target
            }
            RecordData::Caa { flags, tag, target } => {
                wire.flags = flags;
                wire.tag = tag;
                target
            }
            RecordData::A { target }
            | RecordData::Aaaa { target }
            | RecordData::Cname { target }
            | RecordData::Ns { target }
            | RecordData::Txt { target }
            | RecordData::Spf { target }
            | RecordData::Soa { target }
            | RecordData::Other { target, .. } => target,
        };
        wire.target = Some(target);

        wire
    }
}
