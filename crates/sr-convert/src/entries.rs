use std::collections::VecDeque;

use rhai::Dynamic;

use crate::access;

/// Ordered key/value sequence over a map-shaped dynamic value, exposed as a
/// two-phase iterator: each entry yields its key, then its value, before the
/// sequence advances. The combined element index a map cursor reports is
/// `2 * entry_position + phase`.
#[derive(Debug)]
pub struct MapEntries {
    remaining: VecDeque<(String, Dynamic)>,
    pending_value: Option<Dynamic>,
}

impl MapEntries {
    pub fn new(value: &Dynamic) -> Self {
        Self {
            remaining: access::entries(value).into(),
            pending_value: None,
        }
    }

    pub fn has_next(&self) -> bool {
        self.pending_value.is_some() || !self.remaining.is_empty()
    }

    pub fn next_slot(&mut self) -> Option<Dynamic> {
        if let Some(value) = self.pending_value.take() {
            return Some(value);
        }
        let (key, value) = self.remaining.pop_front()?;
        self.pending_value = Some(value);
        Some(key.into())
    }
}
