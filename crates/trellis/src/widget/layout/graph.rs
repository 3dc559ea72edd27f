//! Dependency tracking between layout slots.
//!
//! Every widget has two slots, its position and its size. A slot depends on
//! the slots its layout expressions read. The graph keeps both directions so
//! that a change can be pushed to dependents and a slot can drop all of its
//! subscriptions at once.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use crate::widget::WidgetId;

/// Which half of a widget's geometry a slot refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayoutComponent {
    Position,
    Size,
}

impl LayoutComponent {
    pub fn name(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Size => "size",
        }
    }
}

/// A widget's position or size.
pub type Slot = (WidgetId, LayoutComponent);

/// Bidirectional dependency graph between slots.
#[derive(Debug, Default)]
pub struct LayoutGraph {
    /// source -> slots that read it
    dependents: HashMap<Slot, BTreeSet<Slot>>,
    /// slot -> sources it reads
    sources: HashMap<Slot, Vec<Slot>>,
}

impl LayoutGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the sources of `slot`.
    ///
    /// Fails without modifying the graph if a new source is `slot` itself or
    /// already (transitively) depends on `slot`.
    pub fn set_sources(&mut self, slot: Slot, sources: Vec<Slot>) -> Result<(), Slot> {
        let old = self.clear_sources(slot);
        if let Some(bad) = sources
            .iter()
            .find(|source| **source == slot || self.reaches(slot, **source))
        {
            let bad = *bad;
            self.link(slot, old);
            return Err(bad);
        }
        self.link(slot, sources);
        Ok(())
    }

    /// Remove every subscription of `slot`. Idempotent. Returns the sources
    /// that were removed.
    pub fn clear_sources(&mut self, slot: Slot) -> Vec<Slot> {
        let old = self.sources.remove(&slot).unwrap_or_default();
        for source in &old {
            if let Some(set) = self.dependents.get_mut(source) {
                set.remove(&slot);
                if set.is_empty() {
                    self.dependents.remove(source);
                }
            }
        }
        old
    }

    /// Forget a widget entirely: its own subscriptions and every edge that
    /// reads one of its slots.
    pub fn remove_widget(&mut self, id: WidgetId) {
        for component in [LayoutComponent::Position, LayoutComponent::Size] {
            let slot = (id, component);
            self.clear_sources(slot);
            if let Some(readers) = self.dependents.remove(&slot) {
                for reader in readers {
                    if let Some(sources) = self.sources.get_mut(&reader) {
                        sources.retain(|source| *source != slot);
                        if sources.is_empty() {
                            self.sources.remove(&reader);
                        }
                    }
                }
            }
        }
    }

    /// Slots that directly read `slot`.
    pub fn dependents(&self, slot: Slot) -> Vec<Slot> {
        self.dependents
            .get(&slot)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Slots that `slot` directly reads.
    pub fn sources(&self, slot: Slot) -> &[Slot] {
        self.sources.get(&slot).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Order in which the transitive dependents of `changed` must be
    /// recomputed: breadth-first, and a slot only after every slot it reads
    /// within the affected set. Each slot appears at most once.
    pub fn propagation_order(&self, changed: Slot) -> Vec<Slot> {
        // Breadth-first discovery of the affected set.
        let mut reached = vec![changed];
        let mut seen = HashSet::from([changed]);
        let mut cursor = 0;
        while cursor < reached.len() {
            for dependent in self.dependents(reached[cursor]) {
                if seen.insert(dependent) {
                    reached.push(dependent);
                }
            }
            cursor += 1;
        }

        // Kahn's algorithm restricted to the affected set.
        let mut pending: HashMap<Slot, usize> = reached[1..]
            .iter()
            .map(|slot| {
                let count = self.sources(*slot).iter().filter(|s| seen.contains(*s)).count();
                (*slot, count)
            })
            .collect();
        let mut queue = VecDeque::from([changed]);
        let mut order = Vec::with_capacity(reached.len() - 1);
        while let Some(slot) = queue.pop_front() {
            for dependent in self.dependents(slot) {
                if let Some(count) = pending.get_mut(&dependent) {
                    *count -= 1;
                    if *count == 0 {
                        pending.remove(&dependent);
                        order.push(dependent);
                        queue.push_back(dependent);
                    }
                }
            }
        }

        // Only reachable with a cycle; visit the rest once in discovery order.
        if !pending.is_empty() {
            order.extend(reached[1..].iter().filter(|slot| pending.contains_key(*slot)));
        }
        order
    }

    /// Whether `target` is reachable from `from` through dependents.
    fn reaches(&self, from: Slot, target: Slot) -> bool {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([from]);
        while let Some(slot) = queue.pop_front() {
            if slot == target {
                return true;
            }
            if visited.insert(slot) {
                queue.extend(self.dependents(slot));
            }
        }
        false
    }

    fn link(&mut self, slot: Slot, sources: Vec<Slot>) {
        let mut unique = Vec::with_capacity(sources.len());
        for source in sources {
            if !unique.contains(&source) {
                self.dependents.entry(source).or_default().insert(slot);
                unique.push(source);
            }
        }
        if !unique.is_empty() {
            self.sources.insert(slot, unique);
        }
    }
}
