//! Lookup tables parsed from the SAS label description file.
//!
//! The description file is a SAS `PROC FORMAT` script. Each category block
//! starts somewhere after its marker (e.g. `I94MODE`), lists one
//! `'CODE' = 'VALUE'` pair per line and is terminated by `;`.

use std::fmt;
use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::record_batch::RecordBatch;
use log::{debug, warn};
use rustc_hash::FxHashSet;

use crate::error::{EtlError, Result};
use crate::schema::label_schema;

/// The five label categories read from the description file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelCategory {
    Mode,
    Visa,
    State,
    Country,
    Port,
}

impl LabelCategory {
    /// All categories in load order
    pub const ALL: [Self; 5] = [Self::Port, Self::Country, Self::State, Self::Mode, Self::Visa];

    /// Marker locating the category block in the description text
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Mode => "I94MODE",
            Self::Visa => "I94VISA",
            Self::State => "I94ADDR",
            Self::Country => "I94CIT",
            Self::Port => "I94PORT",
        }
    }

    /// Name of the value column next to `code`
    #[must_use]
    pub const fn value_column(self) -> &'static str {
        match self {
            Self::Mode => "mode",
            Self::Visa => "visa_type",
            Self::State => "state_name",
            Self::Country => "country_name",
            Self::Port => "port_name",
        }
    }

    /// Name of the output written for this lookup
    #[must_use]
    pub const fn output_name(self) -> &'static str {
        match self {
            Self::Mode => "mode",
            Self::Visa => "visa_type",
            Self::State => "state",
            Self::Country => "country",
            Self::Port => "port",
        }
    }
}

impl fmt::Display for LabelCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// Extract the code/value pairs of one category from the description text
///
/// The block runs from the first occurrence of `marker` up to the next `;`.
/// Lines that do not split into exactly two parts on `=` are skipped. Both
/// parts are trimmed of whitespace and then of enclosing single quotes.
/// A code seen twice keeps its first value.
///
/// # Errors
/// [`EtlError::NotFound`] if `marker` does not occur in `raw_text`, and
/// [`EtlError::MalformedInput`] if no `;` follows it.
pub fn parse_labels(raw_text: &str, marker: &str) -> Result<(Vec<String>, Vec<String>)> {
    let start = raw_text.find(marker).ok_or_else(|| EtlError::NotFound {
        marker: marker.to_string(),
    })?;
    let block = &raw_text[start..];
    let end = block.find(';').ok_or_else(|| EtlError::MalformedInput {
        marker: marker.to_string(),
    })?;

    let mut seen = FxHashSet::default();
    let mut codes = Vec::new();
    let mut values = Vec::new();

    for line in block[..end].lines() {
        let parts: Vec<&str> = line.split('=').collect();
        let [code, value] = parts.as_slice() else {
            continue;
        };
        let code = strip_label(code);
        if !seen.insert(code.to_string()) {
            warn!("Duplicate {marker} code '{code}' ignored");
            continue;
        }
        codes.push(code.to_string());
        values.push(strip_label(value).to_string());
    }

    debug!("Parsed {} {marker} labels", codes.len());
    Ok((codes, values))
}

fn strip_label(part: &str) -> &str {
    part.trim().trim_matches('\'')
}

/// A code to value lookup for one label category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
    pub category: LabelCategory,
    pub codes: Vec<String>,
    pub values: Vec<String>,
}

impl LabelTable {
    /// Parse the table for `category` out of the description text
    pub fn parse(raw_text: &str, category: LabelCategory) -> Result<Self> {
        let (codes, values) = parse_labels(raw_text, category.marker())?;
        Ok(Self {
            category,
            codes,
            values,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Value for `code`, if present
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&str> {
        self.codes
            .iter()
            .position(|c| c == code)
            .map(|idx| self.values[idx].as_str())
    }

    /// Convert to a two-column record batch (`code`, value column)
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(self.codes.clone())),
            Arc::new(StringArray::from(self.values.clone())),
        ];
        Ok(RecordBatch::try_new(label_schema(self.category), columns)?)
    }
}

/// I94 travel modes (`code`, `mode`)
pub fn i94_modes(raw_text: &str) -> Result<RecordBatch> {
    LabelTable::parse(raw_text, LabelCategory::Mode)?.to_record_batch()
}

/// I94 visa categories (`code`, `visa_type`)
pub fn i94_visas(raw_text: &str) -> Result<RecordBatch> {
    LabelTable::parse(raw_text, LabelCategory::Visa)?.to_record_batch()
}

/// I94 address states (`code`, `state_name`)
pub fn i94_states(raw_text: &str) -> Result<RecordBatch> {
    LabelTable::parse(raw_text, LabelCategory::State)?.to_record_batch()
}

/// I94 citizenship / residence countries (`code`, `country_name`)
pub fn i94_countries(raw_text: &str) -> Result<RecordBatch> {
    LabelTable::parse(raw_text, LabelCategory::Country)?.to_record_batch()
}

/// I94 ports of entry (`code`, `port_name`)
pub fn i94_ports(raw_text: &str) -> Result<RecordBatch> {
    LabelTable::parse(raw_text, LabelCategory::Port)?.to_record_batch()
}
