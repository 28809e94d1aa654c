//! Multi-asset time alignment.
//!
//! Each asset is filtered independently; the table's time index is the union
//! of the surviving timestamps. An asset with no row at some index position
//! simply has no value there. There is no forward-fill and no inner join:
//! consumers that need strictly complete rows use
//! [`AlignedTable::complete_rows`].

use super::cache::CsvCache;
use super::provider::DataError;
use crate::domain::{normalize_symbol, DomainError, Field, TimeRange};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::info;

/// One asset's surviving rows: timestamp → one value per retained field.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetFrame {
    fields: Vec<Field>,
    rows: BTreeMap<DateTime<Utc>, Vec<Decimal>>,
}

impl AssetFrame {
    pub fn new(fields: Vec<Field>) -> Self {
        Self {
            fields,
            rows: BTreeMap::new(),
        }
    }

    /// Add a row. The first row seen for a timestamp wins; later ones are
    /// ignored and `false` is returned.
    pub fn insert(&mut self, timestamp: DateTime<Utc>, values: Vec<Decimal>) -> bool {
        debug_assert_eq!(values.len(), self.fields.len());
        match self.rows.entry(timestamp) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(values);
                true
            }
            std::collections::btree_map::Entry::Occupied(_) => false,
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Timestamps in ascending order.
    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.rows.keys().copied()
    }

    /// Rows in ascending timestamp order.
    pub fn rows(&self) -> impl Iterator<Item = (DateTime<Utc>, &[Decimal])> + '_ {
        self.rows.iter().map(|(ts, v)| (*ts, v.as_slice()))
    }

    pub fn get(&self, timestamp: DateTime<Utc>, field: Field) -> Option<Decimal> {
        let pos = self.fields.iter().position(|f| *f == field)?;
        self.rows.get(&timestamp).map(|values| values[pos])
    }
}

/// Aligned data for multiple assets on the union timeline.
#[derive(Debug, Clone, Default)]
pub struct AlignedTable {
    /// Assets in insertion order.
    assets: Vec<String>,
    frames: HashMap<String, AssetFrame>,
    /// Union of all assets' timestamps.
    index: BTreeSet<DateTime<Utc>>,
}

impl AlignedTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one asset's frame into the table.
    ///
    /// A new asset is appended after the existing ones and its timestamps are
    /// unioned into the index. Re-inserting an asset replaces its frame and
    /// rebuilds the index.
    pub fn insert(&mut self, asset: impl Into<String>, frame: AssetFrame) {
        let asset = asset.into();
        if self.frames.contains_key(&asset) {
            self.frames.insert(asset, frame);
            self.index = self
                .frames
                .values()
                .flat_map(|f| f.timestamps())
                .collect();
        } else {
            self.index.extend(frame.timestamps());
            self.assets.push(asset.clone());
            self.frames.insert(asset, frame);
        }
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn frame(&self, asset: &str) -> Option<&AssetFrame> {
        self.frames.get(asset)
    }

    /// The shared time index, ascending.
    pub fn index(&self) -> Vec<DateTime<Utc>> {
        self.index.iter().copied().collect()
    }

    /// Number of rows in the union index.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn value(&self, asset: &str, field: Field, timestamp: DateTime<Utc>) -> Option<Decimal> {
        self.frames.get(asset)?.get(timestamp, field)
    }

    /// One asset's values for `field`, aligned to [`AlignedTable::index`].
    /// Positions where the asset has no row are `None`.
    pub fn column(&self, asset: &str, field: Field) -> Option<Vec<Option<Decimal>>> {
        let frame = self.frames.get(asset)?;
        Some(self.index.iter().map(|ts| frame.get(*ts, field)).collect())
    }

    /// Rows where every asset has a value for `field`, values in asset order.
    pub fn complete_rows(&self, field: Field) -> Vec<(DateTime<Utc>, Vec<Decimal>)> {
        self.index
            .iter()
            .filter_map(|ts| {
                let values: Option<Vec<Decimal>> = self
                    .assets
                    .iter()
                    .map(|a| self.value(a, field, *ts))
                    .collect();
                values.map(|v| (*ts, v))
            })
            .collect()
    }
}

/// Load several assets from the cache and align them.
///
/// Assets are read in the given order; a repeated symbol is read once. Any
/// asset failing to load aborts the whole call.
pub fn load_aligned(
    cache: &CsvCache,
    assets: &[&str],
    fields: &[Field],
    range: &TimeRange,
) -> Result<AlignedTable, DataError> {
    if assets.is_empty() {
        return Err(DomainError::EmptyAssetList.into());
    }
    if fields.is_empty() {
        return Err(DomainError::EmptyFieldList.into());
    }

    let mut table = AlignedTable::new();
    for asset in assets {
        let asset = normalize_symbol(asset)?;
        if table.frame(&asset).is_some() {
            continue;
        }
        let frame = cache.read(&asset, fields, range)?;
        table.insert(asset, frame);
    }

    info!(
        assets = table.assets().len(),
        rows = table.len(),
        start = %range.start(),
        end = %range.end(),
        "aligned table loaded"
    );
    Ok(table)
}
