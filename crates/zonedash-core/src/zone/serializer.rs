//! Zone-file serializer
//!
//! Records are emitted in a canonical type order (SOA, NS, A, AAAA, CNAME,
//! MX, TXT, SPF, SRV, then everything else). The sort is stable: records of
//! the same type keep their input order, so successive exports of an
//! unchanged zone diff cleanly.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::record::{DEFAULT_TTL, DnsRecord, RecordData, strip_trailing_dot};

const DEFAULT_MX_PRIORITY: u16 = 10;
const DEFAULT_CAA_TAG: &str = "issue";

/// Serialize records as a zone file, stamped with the current time
pub fn serialize(zone_name: &str, records: &[DnsRecord]) -> String {
    serialize_at(zone_name, records, Utc::now())
}

/// Serialize records as a zone file with an explicit generation time
pub fn serialize_at(
    zone_name: &str,
    records: &[DnsRecord],
    generated_at: DateTime<Utc>,
) -> String {
    let mut sorted: Vec<&DnsRecord> = records.iter().collect();
    sorted.sort_by_key(|record| record.data.sort_rank());

    let mut lines = Vec::with_capacity(sorted.len() + 6);
    lines.push(format!("; Zone file for {}", zone_name));
    lines.push(format!(
        "; Generated on {}",
        generated_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    ));
    lines.push(String::new());
    lines.push(format!("$ORIGIN {}.", strip_trailing_dot(zone_name)));
    lines.push(String::new());

    lines.extend(sorted.into_iter().map(render_record));

    lines.push(String::new());
    lines.join("\n")
}

/// Render one record as `owner\tttl\tIN\ttype\trdata`
fn render_record(record: &DnsRecord) -> String {
    let owner = if record.owner.is_empty() {
        "@"
    } else {
        record.owner.as_str()
    };
    let ttl = if record.ttl == 0 {
        DEFAULT_TTL
    } else {
        record.ttl
    };

    format!(
        "{}\t{}\tIN\t{}\t{}",
        owner,
        ttl,
        record.data.type_name(),
        render_rdata(&record.data)
    )
}

fn render_rdata(data: &RecordData) -> String {
    match data {
        RecordData::A { target }
        | RecordData::Aaaa { target }
        | RecordData::Soa { target }
        | RecordData::Other { target, .. } => target.clone(),
        RecordData::Cname { target } | RecordData::Ns { target } => absolute(target),
        RecordData::Mx { priority, target } => format!(
            "{} {}",
            priority.unwrap_or(DEFAULT_MX_PRIORITY),
            absolute(target)
        ),
        RecordData::Txt { target } | RecordData::Spf { target } => quote_if_spaced(target),
        RecordData::Srv {
            priority,
            weight,
            port,
            target,
        } => format!(
            "{} {} {} {}",
            priority.unwrap_or(0),
            weight.unwrap_or(0),
            port.unwrap_or(0),
            absolute(target)
        ),
        RecordData::Caa { flags, tag, target } => format!(
            "{} {} \"{}\"",
            flags.unwrap_or(0),
            tag.as_deref()
                .filter(|tag| !tag.is_empty())
                .unwrap_or(DEFAULT_CAA_TAG),
            target
        ),
    }
}

/// Append the trailing dot that makes a name absolute
fn absolute(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{}.", name)
    }
}

fn quote_if_spaced(value: &str) -> String {
    if value.chars().any(char::is_whitespace) && !value.starts_with('"') {
        format!("\"{}\"", value)
    } else {
        value.to_string()
    }
}
