//! Two-phase configuration reconciliation engine (§4.3): VALGET identifies
//! mismatches, VALSET writes them layer by layer, then a final VALGET
//! verifies. The engine never fails on its own — only the owning mode
//! times it out.

use gnss_core::config::{ConfigTable, Observed};
use gnss_core::layer::{layer_write_excluded, CfgMemLayer};
use gnss_core::pending::{CommandKind, PendingCommandSet};

use crate::codec::{class_id, Event};
use crate::requests::{self, MAX_VALGET_REQ_ITEMS, MAX_VALSET_REQ_ITEMS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    ValGet,
    ValSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileStatus {
    InProgress,
    Success,
}

/// Drives a single `ConfigTable` towards full reconciliation. One instance
/// per table in play (ASCFG, DEFCFG each own one); state is not shared.
pub struct ReconcileEngine {
    phase: Phase,
    layer: CfgMemLayer,
    to_set: Vec<u32>,
    in_flight: bool,
    requested_count: usize,
    more_pages: bool,
}

impl ReconcileEngine {
    pub fn new() -> Self {
        Self {
            phase: Phase::ValGet,
            layer: CfgMemLayer::Ram,
            to_set: Vec::new(),
            in_flight: false,
            requested_count: 0,
            more_pages: false,
        }
    }

    /// Advance the engine by one tick. `out_frames` accumulates zero or one
    /// outgoing request (the engine emits at most one frame per tick).
    pub fn tick(
        &mut self,
        table: &mut ConfigTable,
        events: &[Event],
        pending: &mut PendingCommandSet,
        flash_present: bool,
        out_frames: &mut Vec<Vec<u8>>,
    ) -> ReconcileStatus {
        match self.phase {
            Phase::ValGet => self.tick_valget(table, events, out_frames),
            Phase::ValSet => self.tick_valset(table, events, pending, flash_present, out_frames),
        }
    }

    fn tick_valget(
        &mut self,
        table: &mut ConfigTable,
        events: &[Event],
        out: &mut Vec<Vec<u8>>,
    ) -> ReconcileStatus {
        if !self.in_flight {
            let mut unreconciled = table.unreconciled_ids();
            self.more_pages = unreconciled.len() > MAX_VALGET_REQ_ITEMS;
            unreconciled.truncate(MAX_VALGET_REQ_ITEMS);

            if unreconciled.is_empty() && !self.more_pages {
                return ReconcileStatus::Success;
            }

            self.requested_count = unreconciled.len();
            out.push(requests::valget(&unreconciled, self.layer, 0));
            self.in_flight = true;
            return ReconcileStatus::InProgress;
        }

        for event in events {
            let Event::CfgValget { items } = event else { continue };
            if items.len() < self.requested_count {
                continue;
            }

            for &(id, value) in items {
                if let Some(item) = table.get_mut(id) {
                    item.observed = Observed::Value(value);
                    if item.is_reconciled() {
                        self.to_set.retain(|&i| i != id);
                    } else if !self.to_set.contains(&id) {
                        self.to_set.push(id);
                    }
                }
            }

            self.in_flight = false;
            if self.to_set.is_empty() && !self.more_pages {
                return ReconcileStatus::Success;
            }
            self.phase = Phase::ValSet;
            self.layer = CfgMemLayer::Ram;
            return ReconcileStatus::InProgress;
        }

        ReconcileStatus::InProgress
    }

    fn tick_valset(
        &mut self,
        table: &mut ConfigTable,
        events: &[Event],
        pending: &mut PendingCommandSet,
        flash_present: bool,
        out: &mut Vec<Vec<u8>>,
    ) -> ReconcileStatus {
        if !self.in_flight {
            let mut items = Vec::new();
            for &id in &self.to_set {
                if layer_write_excluded(self.layer, flash_present, id) {
                    if let Some(item) = table.get_mut(id) {
                        item.observed = Observed::Value(item.expected);
                    }
                    continue;
                }
                let Some(item) = table.get(id) else { continue };
                if item.is_reconciled() {
                    continue;
                }
                if items.len() < MAX_VALSET_REQ_ITEMS {
                    items.push((id, item.expected));
                }
            }

            if items.is_empty() {
                self.advance_layer();
                return ReconcileStatus::InProgress;
            }

            out.push(requests::valset(&items, self.layer, pending));
            self.in_flight = true;
            return ReconcileStatus::InProgress;
        }

        for event in events {
            let acked = matches!(event, Event::Ack(c) if *c == class_id::CFG_VALSET);
            let naked = matches!(event, Event::Nak(c) if *c == class_id::CFG_VALSET);
            if acked || naked {
                pending.clear(CommandKind::Ack);
                self.in_flight = false;
                self.advance_layer();
                return ReconcileStatus::InProgress;
            }
        }

        ReconcileStatus::InProgress
    }

    fn advance_layer(&mut self) {
        match self.layer.next() {
            Some(next) => self.layer = next,
            None => {
                self.phase = Phase::ValGet;
                self.layer = CfgMemLayer::Ram;
                self.to_set.clear();
            }
        }
    }
}

impl Default for ReconcileEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gnss_core::config::ConfigItem;
    use gnss_core::value::TypedValue;

    fn table_with(items: &[(u32, TypedValue)]) -> ConfigTable {
        let mut table = ConfigTable::new();
        for &(id, expected) in items {
            table.insert(ConfigItem::new(id, "x", expected));
        }
        table
    }

    #[test]
    fn already_reconciled_table_succeeds_with_zero_frames() {
        let mut table = table_with(&[(1, TypedValue::U8(5))]);
        table.get_mut(1).unwrap().observed = Observed::Value(TypedValue::U8(5));

        let mut engine = ReconcileEngine::new();
        let mut pending = PendingCommandSet::new();
        let mut out = Vec::new();
        let status = engine.tick(&mut table, &[], &mut pending, true, &mut out);

        assert_eq!(status, ReconcileStatus::Success);
        assert!(out.is_empty());
    }

    #[test]
    fn full_cycle_reconciles_a_mismatched_ram_item() {
        let mut table = table_with(&[(0x1023_0001, TypedValue::Enum8(4))]);
        let mut engine = ReconcileEngine::new();
        let mut pending = PendingCommandSet::new();

        // ValGet: emits a request.
        let mut out = Vec::new();
        let status = engine.tick(&mut table, &[], &mut pending, true, &mut out);
        assert_eq!(status, ReconcileStatus::InProgress);
        assert_eq!(out.len(), 1);

        // Receiver reports the current (wrong) value.
        let response = [Event::CfgValget { items: vec![(0x1023_0001, TypedValue::Enum8(0))] }];
        let mut out = Vec::new();
        let status = engine.tick(&mut table, &response, &mut pending, true, &mut out);
        assert_eq!(status, ReconcileStatus::InProgress);

        // ValSet at RAM: emits one frame, arms Ack.
        let mut out = Vec::new();
        let status = engine.tick(&mut table, &[], &mut pending, true, &mut out);
        assert_eq!(status, ReconcileStatus::InProgress);
        assert_eq!(out.len(), 1);
        assert!(pending.is_pending(CommandKind::Ack));

        // Ack arrives: layer advances from RAM to BBR.
        let ack = [Event::Ack(class_id::CFG_VALSET)];
        let mut out = Vec::new();
        let status = engine.tick(&mut table, &ack, &mut pending, true, &mut out);
        assert_eq!(status, ReconcileStatus::InProgress);
        assert!(!pending.is_pending(CommandKind::Ack));

        // BBR is always excluded: the item is force-marked reconciled and
        // the layer advances to Flash without a frame.
        let mut out = Vec::new();
        let status = engine.tick(&mut table, &[], &mut pending, true, &mut out);
        assert_eq!(status, ReconcileStatus::InProgress);
        assert!(out.is_empty());
        assert!(table.get(0x1023_0001).unwrap().is_reconciled());

        // Flash: already reconciled by the BBR step, so there's nothing
        // left to send; the layer progression completes.
        let mut out = Vec::new();
        let status = engine.tick(&mut table, &[], &mut pending, true, &mut out);
        assert_eq!(status, ReconcileStatus::InProgress);
        assert!(out.is_empty());

        // Final verification pass: already reconciled, success with no frame.
        let mut out = Vec::new();
        let status = engine.tick(&mut table, &[], &mut pending, true, &mut out);
        assert_eq!(status, ReconcileStatus::Success);
        assert!(out.is_empty());
    }

    #[test]
    fn to_set_boundary_at_64_and_65_items() {
        let items: Vec<(u32, TypedValue)> =
            (0..65u32).map(|i| (i, TypedValue::U8(1))).collect();
        let mut table = table_with(&items);
        let mut engine = ReconcileEngine::new();
        let mut pending = PendingCommandSet::new();
        let mut out = Vec::new();
        engine.tick(&mut table, &[], &mut pending, true, &mut out);
        assert_eq!(out.len(), 1);
        assert!(engine.more_pages);
    }
}
