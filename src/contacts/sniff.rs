//! Sniff a contact table out of pasted text.
//!
//! DESIGN
//! ======
//! Best effort, no guarantees:
//! 1. Keep non-blank lines.
//! 2. Pick the candidate delimiter occurring most often in the first line.
//! 3. If the first row reads like a header (at least two cells match known
//!    keywords), map fields to columns by it and treat the remaining rows as
//!    data.
//! 4. Otherwise guess by position: last name, first name, then phone, email
//!    or department by looking at the cell contents.
//!
//! Rows that yield neither a first nor a last name are dropped.

use std::collections::BTreeMap;
use std::fmt;

use crate::api::types::{Contact, non_blank};

/// Candidate delimiters. On equal counts the later one wins.
pub const DELIMITERS: [char; 4] = [',', ';', '\t', '|'];

/// Delimiter picked when no candidate occurs in the first line.
pub const DEFAULT_DELIMITER: char = '|';

/// Keyword matches needed before the first row counts as a header.
pub const HEADER_MIN_MATCHES: usize = 2;

// =============================================================================
// FIELDS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContactField {
    FirstName,
    LastName,
    Phone,
    Mobile,
    Email,
    Department,
    Address,
    Notes,
}

impl ContactField {
    /// Fields recognised in a header row, in match-priority order.
    pub const HEADER_FIELDS: [Self; 7] = [
        Self::FirstName,
        Self::LastName,
        Self::Phone,
        Self::Mobile,
        Self::Email,
        Self::Department,
        Self::Address,
    ];

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::FirstName => &["vorname", "first name", "first", "given name"],
            Self::LastName => &["nachname", "last name", "last", "surname", "family name"],
            Self::Phone => &["telefon", "phone", "tel", "telephone", "festnetz"],
            Self::Mobile => &["mobil", "mobile", "handy", "cell", "cellphone"],
            Self::Email => &["email", "e-mail", "mail", "e-mail-adresse"],
            Self::Department => &["abteilung", "department", "dept", "bereich", "abt"],
            Self::Address => &["adresse", "address", "anschrift"],
            Self::Notes => &[],
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Phone => "phone",
            Self::Mobile => "mobile",
            Self::Email => "email",
            Self::Department => "department",
            Self::Address => "address",
            Self::Notes => "notes",
        }
    }

    /// Parse a field name as used in manual column mappings. `""`, `-` and
    /// `ignore` mean "skip this column" and yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns the unrecognised name.
    pub fn parse_mapping(raw: &str) -> Result<Option<Self>, String> {
        let raw = raw.trim().to_lowercase();
        if matches!(raw.as_str(), "" | "-" | "ignore") {
            return Ok(None);
        }
        let found = Self::HEADER_FIELDS
            .into_iter()
            .chain([Self::Notes])
            .find(|f| f.as_str() == raw);
        found.map(Some).ok_or(raw)
    }

    /// Header field whose keyword list has an entry contained in `cell`.
    fn from_header_cell(cell: &str) -> Option<Self> {
        let cell = cell.trim().to_lowercase();
        Self::HEADER_FIELDS
            .into_iter()
            .find(|field| field.keywords().iter().any(|kw| cell.contains(kw)))
    }

    fn slot(self, contact: &mut Contact) -> &mut Option<String> {
        match self {
            Self::FirstName => &mut contact.first_name,
            Self::LastName => &mut contact.last_name,
            Self::Phone => &mut contact.phone,
            Self::Mobile => &mut contact.mobile,
            Self::Email => &mut contact.email,
            Self::Department => &mut contact.department,
            Self::Address => &mut contact.address,
            Self::Notes => &mut contact.notes,
        }
    }

    /// Store a trimmed cell; blank cells leave the field unset.
    fn assign(self, contact: &mut Contact, cell: &str) {
        let value = cell.trim();
        if !value.is_empty() {
            *self.slot(contact) = Some(value.to_owned());
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field → column index, built from a header row.
pub type HeaderMap = BTreeMap<ContactField, usize>;

// =============================================================================
// ANALYSIS
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardAnalysis {
    pub delimiter: char,
    /// Cells in the first row; drives the manual mapping UI.
    pub column_count: usize,
    /// Present when the first row was recognised as a header.
    pub header: Option<HeaderMap>,
    pub contacts: Vec<Contact>,
}

/// Split into lines and drop the blank ones.
#[must_use]
pub fn split_lines(text: &str) -> Vec<&str> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .collect()
}

/// Candidate with the most occurrences in `line`. Ties go to the later
/// candidate, so a line without any of them gives [`DEFAULT_DELIMITER`].
#[must_use]
pub fn detect_delimiter(line: &str) -> char {
    let mut best = DELIMITERS[0];
    let mut best_count = 0;
    for candidate in DELIMITERS {
        let count = line.matches(candidate).count();
        if count >= best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

/// Recognise a header row. Needs [`HEADER_MIN_MATCHES`] matching cells; when
/// two columns name the same field, the last one wins.
#[must_use]
pub fn map_header(row: &[&str]) -> Option<HeaderMap> {
    let mut mapping = HeaderMap::new();
    let mut matches = 0;
    for (index, cell) in row.iter().enumerate() {
        if let Some(field) = ContactField::from_header_cell(cell) {
            matches += 1;
            mapping.insert(field, index);
        }
    }
    (matches >= HEADER_MIN_MATCHES).then_some(mapping)
}

/// Contact from a data row using a header mapping.
#[must_use]
pub fn contact_from_header(row: &[&str], header: &HeaderMap) -> Contact {
    let mut contact = Contact::default();
    for (field, &index) in header {
        if let Some(cell) = row.get(index) {
            field.assign(&mut contact, cell);
        }
    }
    contact
}

/// Contact from a data row by position: last name, first name, then two
/// columns sniffed for phone, email or department.
#[must_use]
pub fn contact_from_position(row: &[&str]) -> Contact {
    let mut contact = Contact::default();
    if let Some(cell) = row.first() {
        ContactField::LastName.assign(&mut contact, cell);
    }
    if let Some(cell) = row.get(1) {
        ContactField::FirstName.assign(&mut contact, cell);
    }
    if let Some(cell) = row.get(2) {
        let cell = cell.trim();
        let field = if looks_like_phone(cell) {
            ContactField::Phone
        } else if cell.contains('@') {
            ContactField::Email
        } else {
            ContactField::Department
        };
        field.assign(&mut contact, cell);
    }
    if let Some(cell) = row.get(3) {
        let cell = cell.trim();
        if contact.phone.is_none() && looks_like_phone(cell) {
            ContactField::Phone.assign(&mut contact, cell);
        } else if contact.email.is_none() && cell.contains('@') {
            ContactField::Email.assign(&mut contact, cell);
        } else if contact.department.is_none() {
            ContactField::Department.assign(&mut contact, cell);
        }
    }
    contact
}

/// Contact from a data row using an explicit per-column mapping.
#[must_use]
pub fn contact_from_mapping(row: &[&str], mapping: &[Option<ContactField>]) -> Contact {
    let mut contact = Contact::default();
    for (cell, field) in row.iter().zip(mapping) {
        if let Some(field) = field {
            field.assign(&mut contact, cell);
        }
    }
    contact
}

/// Digits, `+`, `-`, parentheses and whitespace only.
#[must_use]
pub fn looks_like_phone(cell: &str) -> bool {
    !cell.is_empty()
        && cell
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')') || c.is_whitespace())
}

fn split_rows<'a>(lines: &[&'a str], delimiter: char) -> Vec<Vec<&'a str>> {
    lines
        .iter()
        .map(|line| line.split(delimiter).collect())
        .collect()
}

/// Run the full sniffing pipeline over pasted text.
#[must_use]
pub fn analyze(text: &str) -> ClipboardAnalysis {
    let lines = split_lines(text);
    let Some(first_line) = lines.first() else {
        return ClipboardAnalysis {
            delimiter: DEFAULT_DELIMITER,
            column_count: 0,
            header: None,
            contacts: Vec::new(),
        };
    };

    let delimiter = detect_delimiter(first_line);
    let rows = split_rows(&lines, delimiter);
    let column_count = rows[0].len();
    let header = map_header(&rows[0]);

    let contacts: Vec<Contact> = match &header {
        Some(mapping) => rows[1..]
            .iter()
            .map(|row| contact_from_header(row, mapping))
            .collect(),
        None => rows.iter().map(|row| contact_from_position(row)).collect(),
    };
    let contacts: Vec<Contact> = contacts.into_iter().filter(Contact::has_name).collect();

    tracing::debug!(
        delimiter = ?delimiter,
        columns = column_count,
        header = header.is_some(),
        contacts = contacts.len(),
        "clipboard analyzed"
    );
    ClipboardAnalysis { delimiter, column_count, header, contacts }
}

/// Re-parse with a caller-chosen column mapping. The delimiter is still
/// sniffed; `skip_first` drops a header row.
#[must_use]
pub fn parse_with_mapping(text: &str, mapping: &[Option<ContactField>], skip_first: bool) -> Vec<Contact> {
    let lines = split_lines(text);
    let Some(first_line) = lines.first() else {
        return Vec::new();
    };
    let delimiter = detect_delimiter(first_line);
    let data = if skip_first { &lines[1..] } else { &lines[..] };

    split_rows(data, delimiter)
        .iter()
        .map(|row| contact_from_mapping(row, mapping))
        .filter(Contact::has_name)
        .collect()
}

/// Keep contacts that have a name and a phone (mobile counts), normalising
/// the phone field and stamping `added_date`.
#[must_use]
pub fn importable(contacts: Vec<Contact>, added_date: &str) -> Vec<Contact> {
    contacts
        .into_iter()
        .filter_map(|mut contact| {
            let phone = contact.primary_phone()?.to_owned();
            if !contact.has_name() {
                return None;
            }
            contact.phone = Some(phone);
            if non_blank(contact.added_date.as_deref()).is_none() {
                contact.added_date = Some(added_date.to_owned());
            }
            Some(contact)
        })
        .collect()
}

#[cfg(test)]
#[path = "sniff_test.rs"]
mod tests;
