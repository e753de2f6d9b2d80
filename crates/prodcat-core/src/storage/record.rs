//! Stored record encodings.

use crate::error::Error;
use crate::model::{Category, CategoryId, Template};
use rkyv::util::AlignedVec;
use rkyv::{Archive, Deserialize, Serialize};

/// Copy bytes read from sled into an aligned buffer for rkyv.
pub(crate) fn aligned(bytes: &[u8]) -> AlignedVec {
    let mut buf = AlignedVec::<16>::with_capacity(bytes.len());
    buf.extend_from_slice(bytes);
    buf
}

/// Stored template columns. Categories live in the link trees.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct TemplateRecord {
    /// Template name.
    pub name: String,
    /// Accounting category.
    pub accounting_category: Option<CategoryId>,
    /// Creation timestamp in microseconds since Unix epoch.
    pub created_at: u64,
    /// Last write timestamp in microseconds since Unix epoch.
    pub updated_at: u64,
}

impl TemplateRecord {
    /// Build the record for a template write.
    pub fn from_template(template: &Template, created_at: Option<u64>) -> Self {
        let now = super::key::current_timestamp();
        Self {
            name: template.name.clone(),
            accounting_category: template.accounting_category,
            created_at: created_at.unwrap_or(now),
            updated_at: now,
        }
    }

    /// Serialize the record to bytes using rkyv.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map(|v| v.to_vec())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize a record from bytes using rkyv.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(&aligned(bytes))
            .map_err(|e| Error::Deserialization(e.to_string()))
    }
}

/// Serialize a category using rkyv.
pub(crate) fn encode_category(category: &Category) -> Result<Vec<u8>, Error> {
    rkyv::to_bytes::<rkyv::rancor::Error>(category)
        .map(|v| v.to_vec())
        .map_err(|e| Error::Serialization(e.to_string()))
}

/// Deserialize a category using rkyv.
pub(crate) fn decode_category(bytes: &[u8]) -> Result<Category, Error> {
    rkyv::from_bytes::<Category, rkyv::rancor::Error>(&aligned(bytes))
        .map_err(|e| Error::Deserialization(e.to_string()))
}
