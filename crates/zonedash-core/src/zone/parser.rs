//! Zone-file parser
//!
//! Parsing is best-effort: a line that cannot be turned into a record is
//! skipped and logged at debug level, and the rest of the file is still read.
//!
//! Each record line is read left to right:
//!
//! ```text
//! owner [ttl] [class] type rdata...
//! ```
//!
//! `@` as owner means the zone apex. A missing TTL defaults to 3600. The class
//! (`IN`, `CH` or `HS`) is accepted and discarded.

use std::str::FromStr;

use tracing::debug;

use super::ZoneDocument;
use crate::error::{Error, Result};
use crate::record::{DEFAULT_TTL, DnsRecord, RecordData, RecordType, strip_trailing_dot};

/// Fewer whitespace-separated fields than this and the line is not a record
const MIN_RECORD_FIELDS: usize = 4;

const CLASSES: &[&str] = &["IN", "CH", "HS"];

/// Parse zone-file text into records, in source order
///
/// SOA records are dropped since the provider manages them.
pub fn parse(zone_name: &str, text: &str) -> Vec<DnsRecord> {
    ZoneParser::new(zone_name).parse_document(text).records
}

/// Line-oriented zone-file parser
///
/// Tracks the origin across `$ORIGIN` directives. The origin is reported in
/// the resulting [`ZoneDocument`]; owners are kept relative.
#[derive(Debug, Clone)]
pub struct ZoneParser {
    origin: String,
    line_number: usize,
}

impl ZoneParser {
    /// Create a parser for the given zone
    pub fn new(zone_name: &str) -> Self {
        Self {
            origin: strip_trailing_dot(zone_name).to_string(),
            line_number: 0,
        }
    }

    /// Current origin, without trailing dot
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Parse a whole zone file
    pub fn parse_document(mut self, text: &str) -> ZoneDocument {
        let mut records = Vec::new();

        for (idx, line) in text.lines().enumerate() {
            self.line_number = idx + 1;

            match self.parse_line(line) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => debug!("Skipping line {}: {}", self.line_number, e),
            }
        }

        debug!(
            "Parsed {} record(s) for origin {}",
            records.len(),
            self.origin
        );

        ZoneDocument {
            origin: self.origin,
            records,
        }
    }

    /// Parse a single line
    ///
    /// Returns `Ok(None)` for blank lines, comments, directives and SOA records.
    fn parse_line(&mut self, line: &str) -> Result<Option<DnsRecord>> {
        // Naive: a ';' inside a quoted value also starts a comment
        let line = match line.find(';') {
            Some(pos) => &line[..pos],
            None => line,
        };

        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        if line.starts_with("$ORIGIN") {
            if let Some(origin) = line.split_whitespace().nth(1) {
                self.origin = strip_trailing_dot(origin).to_string();
            }
            return Ok(None);
        }

        // $TTL, $INCLUDE and friends
        if line.starts_with('$') {
            return Ok(None);
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < MIN_RECORD_FIELDS {
            return Err(Error::format(format!(
                "expected at least {} fields, found {}",
                MIN_RECORD_FIELDS,
                tokens.len()
            )));
        }

        let mut fields = Fields::new(&tokens);
        parse_record(&mut fields)
    }
}

/// Whether `token` is written as a (possibly signed) decimal integer
fn is_integer(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn parse_record(fields: &mut Fields<'_>) -> Result<Option<DnsRecord>> {
    let owner = match fields.required("owner")? {
        "@" => "",
        name => strip_trailing_dot(name),
    };

    let ttl = match fields.peek().filter(|token| is_integer(token)) {
        Some(token) => {
            fields.advance();
            token
                .parse::<u32>()
                .map_err(|_| Error::format(format!("TTL out of range: {}", token)))?
        }
        None => DEFAULT_TTL,
    };

    if fields.peek().is_some_and(|token| CLASSES.contains(&token)) {
        fields.advance();
    }

    let record_type = fields
        .required("type")?
        .parse::<RecordType>()
        .unwrap_or_else(|never| match never {});

    let data = match record_type {
        RecordType::A => RecordData::A {
            target: fields.required("address")?.to_string(),
        },
        RecordType::Aaaa => RecordData::Aaaa {
            target: fields.required("address")?.to_string(),
        },
        RecordType::Cname => RecordData::Cname {
            target: fields.name("target")?,
        },
        RecordType::Ns => RecordData::Ns {
            target: fields.name("target")?,
        },
        RecordType::Mx => {
            let priority = fields.integer::<u16>("priority")?;
            RecordData::Mx {
                priority: Some(priority),
                target: fields.name("target")?,
            }
        }
        RecordType::Txt => RecordData::Txt {
            target: unquote(&fields.rest()).to_string(),
        },
        RecordType::Spf => RecordData::Spf {
            target: unquote(&fields.rest()).to_string(),
        },
        RecordType::Srv => {
            let priority = fields.integer::<u16>("priority")?;
            let weight = fields.integer::<u16>("weight")?;
            let port = fields.integer::<u16>("port")?;
            RecordData::Srv {
                priority: Some(priority),
                weight: Some(weight),
                port: Some(port),
                target: fields.name("target")?,
            }
        }
        RecordType::Caa => {
            let flags = fields.integer::<u8>("flags")?;
            let tag = fields.required("tag")?.to_string();
            RecordData::Caa {
                flags: Some(flags),
                tag: Some(tag),
                target: unquote(&fields.rest()).to_string(),
            }
        }
        RecordType::Soa => {
            debug!("Dropping provider-managed SOA record");
            return Ok(None);
        }
        RecordType::Other(record_type) => RecordData::Other {
            record_type,
            target: fields.rest(),
        },
    };

    Ok(Some(DnsRecord::new(owner, data).with_ttl(ttl)))
}

/// Strip one pair of surrounding double quotes
fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Cursor over the whitespace-separated fields of a record line
struct Fields<'a> {
    tokens: &'a [&'a str],
    pos: usize,
}

impl<'a> Fields<'a> {
    fn new(tokens: &'a [&'a str]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn required(&mut self, what: &str) -> Result<&'a str> {
        let token = self
            .peek()
            .ok_or_else(|| Error::format(format!("missing {}", what)))?;
        self.advance();
        Ok(token)
    }

    /// A domain-name field, trailing dot removed
    fn name(&mut self, what: &str) -> Result<String> {
        self.required(what)
            .map(|token| strip_trailing_dot(token).to_string())
    }

    fn integer<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let token = self.required(what)?;
        token
            .parse()
            .map_err(|_| Error::format(format!("invalid {} '{}'", what, token)))
    }

    /// Remaining fields joined with single spaces
    fn rest(&mut self) -> String {
        let rest = self.tokens[self.pos..].join(" ");
        self.pos = self.tokens.len();
        rest
    }
}
