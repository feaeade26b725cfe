//! Differences between an accession and the encounter built from it

use crate::domain::{Encounter, OpenElisAccession, OpenElisTestDetail};

/// Test details to add to or remove from an encounter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccessionDiff {
    added: Vec<OpenElisTestDetail>,
    removed: Vec<OpenElisTestDetail>,
}

impl AccessionDiff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compares an accession snapshot with the encounter's active orders
    ///
    /// Details are grouped by orderable, so all tests of a panel share one
    /// decision. An orderable is removed when it is actively ordered and every
    /// one of its details is canceled. It is added when some detail is live and
    /// there is no active order. A panel with only some tests canceled keeps its
    /// order. At most one detail per orderable lands in the diff.
    pub fn between(accession: &OpenElisAccession, encounter: &Encounter) -> Self {
        let mut orderables: Vec<(&str, Vec<&OpenElisTestDetail>)> = Vec::new();
        for detail in &accession.test_details {
            let orderable_uuid = detail.orderable_uuid();
            match orderables.iter_mut().find(|(uuid, _)| *uuid == orderable_uuid) {
                Some((_, details)) => details.push(detail),
                None => orderables.push((orderable_uuid, vec![detail])),
            }
        }

        let mut diff = Self::new();
        for (orderable_uuid, details) in orderables {
            let ordered = encounter.has_active_order_for(orderable_uuid);
            let live = details.iter().find(|detail| !detail.is_canceled());
            match (live, ordered) {
                (Some(detail), false) => diff.add_added_test_detail((*detail).clone()),
                (None, true) => diff.add_removed_test_detail(details[0].clone()),
                _ => {}
            }
        }
        diff
    }

    pub fn add_added_test_detail(&mut self, detail: OpenElisTestDetail) {
        self.added.push(detail);
    }

    pub fn add_removed_test_detail(&mut self, detail: OpenElisTestDetail) {
        self.removed.push(detail);
    }

    pub fn added_test_details(&self) -> &[OpenElisTestDetail] {
        &self.added
    }

    pub fn removed_test_details(&self) -> &[OpenElisTestDetail] {
        &self.removed
    }

    pub fn has_difference(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}
