// docmongo-core/src/sort_spec.rs
// Compact sort strings: "field1=1,field2=-1"

use mongodb::bson::Document;
use std::str::FromStr;

use crate::error::{DocMongoError, Result};

/// Ordered field → direction mapping (1 ascending, -1 descending)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SortSpec {
    fields: Vec<(String, i32)>,
}

impl SortSpec {
    /// Parse a sort string. Any malformed pair rejects the whole string.
    pub fn parse(input: &str) -> Result<Self> {
        if input.trim().is_empty() {
            return Err(DocMongoError::InvalidSortSpec(
                "sort string is empty".to_string(),
            ));
        }

        let mut fields: Vec<(String, i32)> = Vec::new();
        for pair in input.split(',') {
            let (field, direction) = pair.split_once('=').ok_or_else(|| {
                DocMongoError::InvalidSortSpec(format!("'{}' is not field=direction", pair))
            })?;

            let field = field.trim();
            if field.is_empty() {
                return Err(DocMongoError::InvalidSortSpec(format!(
                    "missing field name in '{}'",
                    pair
                )));
            }

            let direction = match direction.trim() {
                "1" => 1,
                "-1" => -1,
                other => {
                    return Err(DocMongoError::InvalidSortSpec(format!(
                        "direction for '{}' must be 1 or -1, got '{}'",
                        field, other
                    )))
                }
            };

            // repeated field: last direction wins, first position kept
            match fields.iter_mut().find(|(name, _)| name == field) {
                Some(existing) => existing.1 = direction,
                None => fields.push((field.to_string(), direction)),
            }
        }

        Ok(SortSpec { fields })
    }

    pub fn fields(&self) -> &[(String, i32)] {
        &self.fields
    }

    pub fn direction(&self, field: &str) -> Option<i32> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, direction)| *direction)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Driver-ready sort document, keys in parse order
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        for (field, direction) in &self.fields {
            doc.insert(field.clone(), *direction);
        }
        doc
    }
}

impl FromStr for SortSpec {
    type Err = DocMongoError;

    fn from_str(s: &str) -> Result<Self> {
        SortSpec::parse(s)
    }
}

impl From<SortSpec> for Document {
    fn from(spec: SortSpec) -> Self {
        spec.to_document()
    }
}
