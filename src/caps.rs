//! Parsing of MCCS capabilities strings.
//!
//! A capabilities string is a parenthesized list of named groups, e.g.
//! `(prot(monitor)type(lcd)model(X)cmds(01 02 03)vcp(10 12 14(05 08 0B))mccs_ver(2.1))`.
//! Only `vcp` groups are interpreted. Every other group is kept verbatim,
//! however deeply it nests. A string that cannot be parsed is rejected as a
//! whole.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use serde::Serialize;
use crate::{Error, VcpCode};

/// One entry of a `vcp` group.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct VcpEntry {
    /// The supported code.
    pub code: VcpCode,
    /// The discrete values allowed for it, or `None` when any value is legal.
    pub values: Option<Vec<u8>>,
}

/// A top-level group of a capabilities string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Group {
    /// A `vcp(...)` group.
    Vcp(Vec<VcpEntry>),
    /// Any other group, with its body kept as opaque text. Bare words have
    /// no body.
    Other {
        /// Group name, e.g. `model`.
        name: String,
        /// Text between the group's parentheses.
        body: Option<String>,
    },
}

/// A parsed capabilities string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Capabilities {
    groups: Vec<Group>,
}

impl Capabilities {
    /// The groups in the order they appeared.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// All `vcp` entries in the order they appeared.
    pub fn vcp_entries(&self) -> impl Iterator<Item = &VcpEntry> {
        self.groups.iter()
            .filter_map(|group| match group {
                Group::Vcp(entries) => Some(entries),
                Group::Other { .. } => None,
            })
            .flatten()
    }

    /// Supported codes mapped to their allowed values (`None` = any value).
    ///
    /// Codes listed more than once are merged: their value sets are joined,
    /// and an unrestricted listing wins.
    pub fn features(&self) -> BTreeMap<VcpCode, Option<BTreeSet<u8>>> {
        let mut features = BTreeMap::new();
        for entry in self.vcp_entries() {
            let merged = features.entry(entry.code)
                .or_insert_with(|| entry.values.as_ref().map(|_| BTreeSet::new()));
            match (merged, &entry.values) {
                (Some(set), Some(values)) => set.extend(values.iter().cloned()),
                (merged, None) => *merged = None,
                (None, Some(..)) => (),
            }
        }
        features
    }

    /// Whether `code` is listed.
    pub fn supports(&self, code: VcpCode) -> bool {
        self.vcp_entries().any(|entry| entry.code == code)
    }

    /// The body of the first non-`vcp` group called `name` (ASCII
    /// case-insensitive).
    pub fn group(&self, name: &str) -> Option<&str> {
        self.groups.iter().find_map(|group| match group {
            Group::Other { name: n, body: Some(body) } if n.eq_ignore_ascii_case(name) => Some(&body[..]),
            _ => None,
        })
    }

    /// The `model` group.
    pub fn model(&self) -> Option<&str> {
        self.group("model")
    }

    /// The `mccs_ver` group.
    pub fn mccs_version(&self) -> Option<&str> {
        self.group("mccs_ver")
    }
}

impl fmt::Display for VcpEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02X}", self.code)?;
        if let Some(values) = &self.values {
            f.write_str("(")?;
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{:02X}", value)?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Group::Vcp(entries) => {
                f.write_str("vcp(")?;
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", entry)?;
                }
                f.write_str(")")
            },
            Group::Other { name, body: Some(body) } => write!(f, "{}({})", name, body),
            Group::Other { name, body: None } => f.write_str(name),
        }
    }
}

/// Re-serializes to a canonical capabilities string.
impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("(")?;
        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", group)?;
        }
        f.write_str(")")
    }
}

impl std::str::FromStr for Capabilities {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        parse(s)
    }
}

fn malformed<T>(offset: usize, reason: impl Into<String>) -> Result<T, Error> {
    Err(Error::MalformedCapabilities {
        offset,
        reason: reason.into(),
    })
}

/// Find the `)` closing the `(` at `open`. Offsets in errors are shifted
/// by `base`.
fn closing_paren(text: &[u8], open: usize, base: usize) -> Result<usize, Error> {
    let mut depth = 0usize;
    for (i, &c) in text.iter().enumerate().skip(open) {
        match c {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i)
                }
            },
            _ => (),
        }
    }

    malformed(base + open, "unbalanced '('")
}

fn skip_whitespace(text: &[u8], mut i: usize) -> usize {
    while i < text.len() && text[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

fn token_end(text: &[u8], mut i: usize) -> usize {
    while i < text.len() && !text[i].is_ascii_whitespace() && text[i] != b'(' && text[i] != b')' {
        i += 1;
    }
    i
}

fn hex_byte(token: &str, offset: usize) -> Result<u8, Error> {
    if token.is_empty() || token.len() > 2 || !token.bytes().all(|c| c.is_ascii_hexdigit()) {
        return malformed(offset, format!("{:?} is not a hex byte", token))
    }

    u8::from_str_radix(token, 16).or_else(|_| malformed(offset, format!("{:?} is not a hex byte", token)))
}

/// Parse a raw capabilities string.
///
/// Surrounding whitespace and trailing NULs are ignored, and a string
/// missing its outer parentheses is accepted. Unbalanced parentheses or a
/// non-hex token inside `vcp` fail the whole parse.
pub fn parse(raw: &str) -> Result<Capabilities, Error> {
    let trimmed = raw.trim_end_matches(|c: char| c == '\0' || c.is_ascii_whitespace());
    let start = trimmed.len() - trimmed.trim_start().len();
    let text = &trimmed[start..];

    if text.is_empty() {
        return malformed(start, "empty capabilities string")
    }

    let bytes = text.as_bytes();
    let (body, base) = if bytes[0] == b'(' {
        let close = closing_paren(bytes, 0, start)?;
        if close != bytes.len() - 1 {
            return malformed(start + close + 1, "trailing data after capabilities")
        }
        (&text[1..close], start + 1)
    } else {
        (text, start)
    };

    Ok(Capabilities {
        groups: parse_groups(body, base)?,
    })
}

fn parse_groups(body: &str, base: usize) -> Result<Vec<Group>, Error> {
    let bytes = body.as_bytes();
    let mut groups = Vec::new();
    let mut i = skip_whitespace(bytes, 0);

    while i < bytes.len() {
        match bytes[i] {
            b')' => return malformed(base + i, "unbalanced ')'"),
            b'(' => return malformed(base + i, "group without a name"),
            _ => (),
        }

        let end = token_end(bytes, i);
        let name = &body[i..end];
        let open = skip_whitespace(bytes, end);

        if open < bytes.len() && bytes[open] == b'(' {
            let close = closing_paren(bytes, open, base)?;
            let inner = &body[open + 1..close];
            groups.push(if name.eq_ignore_ascii_case("vcp") {
                Group::Vcp(parse_vcp(inner, base + open + 1)?)
            } else {
                Group::Other {
                    name: name.to_owned(),
                    body: Some(inner.to_owned()),
                }
            });
            i = close + 1;
        } else {
            groups.push(Group::Other {
                name: name.to_owned(),
                body: None,
            });
            i = end;
        }

        i = skip_whitespace(bytes, i);
    }

    Ok(groups)
}

fn parse_vcp(body: &str, base: usize) -> Result<Vec<VcpEntry>, Error> {
    let bytes = body.as_bytes();
    let mut entries = Vec::new();
    let mut i = skip_whitespace(bytes, 0);

    while i < bytes.len() {
        match bytes[i] {
            b')' => return malformed(base + i, "unbalanced ')'"),
            b'(' => return malformed(base + i, "value list without a VCP code"),
            _ => (),
        }

        let end = token_end(bytes, i);
        let code = hex_byte(&body[i..end], base + i)?;
        let open = skip_whitespace(bytes, end);

        let values = if open < bytes.len() && bytes[open] == b'(' {
            let close = closing_paren(bytes, open, base)?;
            let values = parse_values(&body[open + 1..close], base + open + 1)?;
            i = close + 1;
            Some(values)
        } else {
            i = end;
            None
        };

        entries.push(VcpEntry { code, values });
        i = skip_whitespace(bytes, i);
    }

    Ok(entries)
}

fn parse_values(body: &str, base: usize) -> Result<Vec<u8>, Error> {
    let bytes = body.as_bytes();
    let mut values = Vec::new();
    let mut i = skip_whitespace(bytes, 0);

    while i < bytes.len() {
        match bytes[i] {
            b'(' => return malformed(base + i, "nested value list"),
            b')' => return malformed(base + i, "unbalanced ')'"),
            _ => (),
        }

        let end = token_end(bytes, i);
        values.push(hex_byte(&body[i..end], base + i)?);
        i = skip_whitespace(bytes, end);
    }

    Ok(values)
}
