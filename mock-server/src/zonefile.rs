//! Minimal zone file dialect: one `name [ttl] [IN] type value...` per line.
//!
//! Blank lines, `;` comments and `$` directives are skipped.

pub const RECORD_TYPES: &[&str] = &[
    "A", "AAAA", "PTR", "NS", "MX", "CNAME", "RP", "TXT", "SOA", "HINFO", "SRV", "DANE", "TLSA", "DS", "CAA",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub ttl: Option<u64>,
    pub record_type: String,
    pub value: String,
}

/// Outcome of scanning a zone file line by line.
#[derive(Debug, Default)]
pub struct Scan {
    /// Lines that looked like records.
    pub parsed: usize,
    pub valid: Vec<Entry>,
    /// `(line number, reason)` for every rejected line.
    pub errors: Vec<(usize, String)>,
}

pub fn scan(text: &str) -> Scan {
    let mut scan = Scan::default();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('$') {
            continue;
        }
        scan.parsed += 1;
        match parse_line(line) {
            Ok(entry) => scan.valid.push(entry),
            Err(reason) => scan.errors.push((idx + 1, reason)),
        }
    }
    scan
}

fn parse_line(line: &str) -> Result<Entry, String> {
    let mut tokens = line.split_whitespace().peekable();
    let name = tokens.next().ok_or("missing name")?.to_string();

    let ttl = match tokens.peek().and_then(|t| t.parse::<u64>().ok()) {
        Some(ttl) => {
            tokens.next();
            Some(ttl)
        }
        None => None,
    };
    if tokens.peek().is_some_and(|t| t.eq_ignore_ascii_case("IN")) {
        tokens.next();
    }

    let record_type = tokens.next().ok_or("missing record type")?.to_ascii_uppercase();
    if !RECORD_TYPES.contains(&record_type.as_str()) {
        return Err(format!("unsupported record type {record_type}"));
    }

    let value = tokens.collect::<Vec<_>>().join(" ");
    if value.is_empty() {
        return Err("missing value".to_string());
    }

    Ok(Entry {
        name,
        ttl,
        record_type,
        value,
    })
}

pub fn render(origin: &str, default_ttl: u64, entries: &[Entry]) -> String {
    let mut out = format!("$ORIGIN {origin}.\n$TTL {default_ttl}\n");
    for entry in entries {
        let ttl = entry.ttl.unwrap_or(default_ttl);
        out.push_str(&format!("{} {} IN {} {}\n", entry.name, ttl, entry.record_type, entry.value));
    }
    out
}
