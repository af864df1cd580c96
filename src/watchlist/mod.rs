//! Flagged and quarantined client lists.
//!
//! A device id lives in at most one list. Ids are compared in their
//! canonical form, so `AA:BB` and `aa:bb` are the same device. Lists are
//! small (one entry per device an operator is chasing), so every operation
//! is a linear scan.

use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

use crate::record::{canonical_device_id, ClientRecord, MembershipStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Watchlist {
    Flagged,
    Quarantined,
}

impl Watchlist {
    pub fn name(&self) -> &'static str {
        match self {
            Watchlist::Flagged => "flagged",
            Watchlist::Quarantined => "quarantined",
        }
    }
}

impl fmt::Display for Watchlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What `upsert` did with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    /// Merged into the existing entry on the given list.
    Updated(Watchlist),
}

/// What `move_to_quarantine` found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    AlreadyQuarantined,
    NotFound,
}

#[derive(Debug, Default)]
pub struct WatchlistStore {
    flagged: Vec<ClientRecord>,
    quarantined: Vec<ClientRecord>,
}

impl WatchlistStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new device into the flagged list or refresh an existing entry.
    ///
    /// Quarantined entries are searched first so a routine re-lookup can never
    /// downgrade a quarantined device.
    pub fn upsert(&mut self, mut record: ClientRecord) -> UpsertOutcome {
        record.device_id = canonical_device_id(&record.device_id);
        for list in [Watchlist::Quarantined, Watchlist::Flagged] {
            if let Some(existing) = self
                .list_mut(list)
                .iter_mut()
                .find(|r| r.device_id == record.device_id)
            {
                debug!("Updating {} on {} list", record.device_id, list);
                existing.merge_from(record);
                return UpsertOutcome::Updated(list);
            }
        }

        info!("Flagging {}", record.device_id);
        record.membership_status = MembershipStatus::OnNet;
        self.flagged.push(record);
        UpsertOutcome::Inserted
    }

    /// Transfer a flagged device to the quarantined list.
    pub fn move_to_quarantine(&mut self, device_id: &str) -> MoveOutcome {
        let device_id = canonical_device_id(device_id);
        if let Some(index) = position(&self.flagged, &device_id) {
            let mut record = self.flagged.remove(index);
            record.membership_status = MembershipStatus::Quarantined;
            self.quarantined.push(record);
            info!("Quarantined {}", device_id);
            return MoveOutcome::Moved;
        }

        if position(&self.quarantined, &device_id).is_some() {
            debug!("{} is already quarantined", device_id);
            MoveOutcome::AlreadyQuarantined
        } else {
            MoveOutcome::NotFound
        }
    }

    /// Remove a device from whichever list holds it.
    pub fn purge(&mut self, device_id: &str) -> Option<(Watchlist, ClientRecord)> {
        let device_id = canonical_device_id(device_id);
        for list in [Watchlist::Flagged, Watchlist::Quarantined] {
            let entries = self.list_mut(list);
            if let Some(index) = position(entries, &device_id) {
                let record = entries.remove(index);
                info!("Purged {} from {} list", device_id, list);
                return Some((list, record));
            }
        }

        warn!("Purge: {} is not on any watchlist", device_id);
        None
    }

    pub fn lookup(&self, device_id: &str) -> Option<(Watchlist, &ClientRecord)> {
        let device_id = canonical_device_id(device_id);
        [Watchlist::Flagged, Watchlist::Quarantined]
            .into_iter()
            .find_map(|list| {
                self.list(list)
                    .iter()
                    .find(|r| r.device_id == device_id)
                    .map(|r| (list, r))
            })
    }

    pub fn list(&self, list: Watchlist) -> &[ClientRecord] {
        match list {
            Watchlist::Flagged => &self.flagged,
            Watchlist::Quarantined => &self.quarantined,
        }
    }

    fn list_mut(&mut self, list: Watchlist) -> &mut Vec<ClientRecord> {
        match list {
            Watchlist::Flagged => &mut self.flagged,
            Watchlist::Quarantined => &mut self.quarantined,
        }
    }

    pub fn flagged(&self) -> &[ClientRecord] {
        &self.flagged
    }

    pub fn quarantined(&self) -> &[ClientRecord] {
        &self.quarantined
    }

    pub fn len(&self) -> usize {
        self.flagged.len() + self.quarantined.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All entries with the list they sit on, flagged first.
    pub fn iter(&self) -> impl Iterator<Item = (Watchlist, &ClientRecord)> {
        self.flagged
            .iter()
            .map(|r| (Watchlist::Flagged, r))
            .chain(self.quarantined.iter().map(|r| (Watchlist::Quarantined, r)))
    }
}

fn position(entries: &[ClientRecord], device_id: &str) -> Option<usize> {
    entries.iter().position(|r| r.device_id == device_id)
}
