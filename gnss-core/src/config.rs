//! The in-memory configuration database: items keyed by 32-bit id, and the
//! two tables the reconciliation engine drives towards (ASCFG, DEFCFG).

use std::collections::BTreeMap;

use crate::value::{SemanticType, TypedValue};

/// 32-bit configuration key id. The high nibble of the id encodes the
/// storage-size class per the ICD; `storage_class` exposes it without
/// committing callers to a particular bit layout.
pub type ConfigId = u32;

/// Observed value of a configuration item: either not yet read back from
/// the receiver, or the last value a VALGET response reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observed {
    Unknown,
    Value(TypedValue),
}

impl Observed {
    pub fn matches(&self, expected: TypedValue) -> bool {
        matches!(self, Observed::Value(v) if *v == expected)
    }
}

#[derive(Debug, Clone)]
pub struct ConfigItem {
    pub id: ConfigId,
    pub name: &'static str,
    pub expected: TypedValue,
    pub observed: Observed,
}

impl ConfigItem {
    pub fn new(id: ConfigId, name: &'static str, expected: TypedValue) -> Self {
        Self {
            id,
            name,
            expected,
            observed: Observed::Unknown,
        }
    }

    pub fn semantic_type(&self) -> SemanticType {
        self.expected.semantic_type()
    }

    /// The id's storage-size class, read out of its high nibble per the ICD.
    pub fn storage_class(&self) -> u8 {
        ((self.id >> 28) & 0xf) as u8
    }

    pub fn is_reconciled(&self) -> bool {
        self.observed.matches(self.expected)
    }
}

/// A keyed collection of configuration items. `ASCFG` (application-specific
/// overrides) and `DEFCFG` (everything else) are each represented by one of
/// these; construction of the pair enforces the disjointness invariant from
/// §3: an id never appears in both.
#[derive(Debug, Clone, Default)]
pub struct ConfigTable {
    items: BTreeMap<ConfigId, ConfigItem>,
}

impl ConfigTable {
    pub fn new() -> Self {
        Self { items: BTreeMap::new() }
    }

    pub fn insert(&mut self, item: ConfigItem) {
        self.items.insert(item.id, item);
    }

    pub fn get(&self, id: ConfigId) -> Option<&ConfigItem> {
        self.items.get(&id)
    }

    pub fn get_mut(&mut self, id: ConfigId) -> Option<&mut ConfigItem> {
        self.items.get_mut(&id)
    }

    pub fn contains(&self, id: ConfigId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ConfigId> + '_ {
        self.items.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigItem> {
        self.items.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ConfigItem> {
        self.items.values_mut()
    }

    /// Ids whose observed value does not (yet) match expected.
    pub fn unreconciled_ids(&self) -> Vec<ConfigId> {
        self.items
            .values()
            .filter(|item| !item.is_reconciled())
            .map(|item| item.id)
            .collect()
    }

    pub fn all_reconciled(&self) -> bool {
        self.items.values().all(ConfigItem::is_reconciled)
    }

    /// Reset every item's observed value to `Unknown`. Used at mode cleanup
    /// so stale knowledge from one PBIT/CBIT/IBIT run never leaks into the
    /// next (§3 lifecycle).
    pub fn reset_observed(&mut self) {
        for item in self.items.values_mut() {
            item.observed = Observed::Unknown;
        }
    }
}

/// Build the disjoint (ASCFG, DEFCFG) pair from a full ICD-default table and
/// a small set of application overrides. Any id present in `overrides`
/// moves from the default table into ASCFG; DEFCFG keeps everything else.
pub fn split_ascfg_defcfg(
    icd_defaults: &[(ConfigId, &'static str, TypedValue)],
    overrides: &[(ConfigId, &'static str, TypedValue)],
) -> (ConfigTable, ConfigTable) {
    let mut ascfg = ConfigTable::new();
    for &(id, name, expected) in overrides {
        ascfg.insert(ConfigItem::new(id, name, expected));
    }

    let mut defcfg = ConfigTable::new();
    for &(id, name, expected) in icd_defaults {
        if ascfg.contains(id) {
            continue;
        }
        defcfg.insert(ConfigItem::new(id, name, expected));
    }

    (ascfg, defcfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascfg_and_defcfg_are_disjoint() {
        let defaults = [
            (0x1023_0001, "a", TypedValue::U8(1)),
            (0x1051_0003, "b", TypedValue::U8(2)),
            (0x20d0_0001, "c", TypedValue::U8(3)),
        ];
        let overrides = [(0x1023_0001, "a", TypedValue::U8(9))];

        let (ascfg, defcfg) = split_ascfg_defcfg(&defaults, &overrides);

        assert!(ascfg.contains(0x1023_0001));
        assert!(!defcfg.contains(0x1023_0001));
        assert_eq!(ascfg.len() + defcfg.len(), defaults.len());
    }

    #[test]
    fn storage_class_is_the_id_high_nibble() {
        let item = ConfigItem::new(0x1023_0001, "x", TypedValue::U8(1));
        assert_eq!(item.storage_class(), 0x1);
        let item = ConfigItem::new(0x20d0_0001, "y", TypedValue::U32(1));
        assert_eq!(item.storage_class(), 0x2);
    }

    #[test]
    fn reconciled_only_when_observed_equals_expected() {
        let mut item = ConfigItem::new(1, "x", TypedValue::U8(5));
        assert!(!item.is_reconciled());
        item.observed = Observed::Value(TypedValue::U8(5));
        assert!(item.is_reconciled());
    }

    #[test]
    fn reset_observed_clears_every_item() {
        let mut table = ConfigTable::new();
        let mut item = ConfigItem::new(1, "x", TypedValue::U8(5));
        item.observed = Observed::Value(TypedValue::U8(5));
        table.insert(item);
        table.reset_observed();
        assert!(matches!(table.get(1).unwrap().observed, Observed::Unknown));
    }

    #[test]
    fn empty_table_is_fully_reconciled() {
        assert!(ConfigTable::new().all_reconciled());
    }
}
