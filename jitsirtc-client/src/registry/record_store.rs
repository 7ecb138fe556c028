/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

use std::collections::HashMap;

use jitsirtc_types::{ExternalParticipantId, HostUserId, RecordId};

use super::participant_registry::ParticipantRecord;

/// The one place participant records live.
///
/// Records are keyed by an internal [RecordId]; lookups by external id and by
/// host user id are derived indices, only ever updated by `insert` and
/// `remove_*` here. Iteration follows insertion order.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: HashMap<RecordId, ParticipantRecord>,
    order: Vec<RecordId>,
    by_external: HashMap<ExternalParticipantId, RecordId>,
    by_host: HashMap<HostUserId, RecordId>,
    next_id: u64,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    //
    // Lookups
    //

    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut ParticipantRecord> {
        self.records.get_mut(&id)
    }

    pub fn id_by_external(&self, external_id: &ExternalParticipantId) -> Option<RecordId> {
        self.by_external.get(external_id).copied()
    }

    pub fn id_by_host(&self, host_user_id: &HostUserId) -> Option<RecordId> {
        self.by_host.get(host_user_id).copied()
    }

    pub fn by_external(&self, external_id: &ExternalParticipantId) -> Option<&ParticipantRecord> {
        self.id_by_external(external_id)
            .and_then(|id| self.records.get(&id))
    }

    pub fn by_host(&self, host_user_id: &HostUserId) -> Option<&ParticipantRecord> {
        self.id_by_host(host_user_id).and_then(|id| self.records.get(&id))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ParticipantRecord> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    //
    // Mutations, each keeping both indices in step with the records
    //

    /// Insert `record`, displacing any record with the same external id.
    ///
    /// The host index always points at the newest record for a host user;
    /// an older record for the same host user stays reachable by external id
    /// until it leaves.
    pub fn insert(&mut self, record: ParticipantRecord) -> (RecordId, Option<ParticipantRecord>) {
        let displaced = self.remove_by_external(&record.external_id);

        let id = RecordId(self.next_id);
        self.next_id += 1;
        self.by_external.insert(record.external_id.clone(), id);
        self.by_host.insert(record.host_user_id.clone(), id);
        self.records.insert(id, record);
        self.order.push(id);
        (id, displaced)
    }

    /// Remove the record for `external_id`. The host index entry is only
    /// dropped when it still points at this record.
    pub fn remove_by_external(
        &mut self,
        external_id: &ExternalParticipantId,
    ) -> Option<ParticipantRecord> {
        let id = self.by_external.remove(external_id)?;
        self.order.retain(|k| *k != id);
        let record = self.records.remove(&id)?;
        if self.by_host.get(&record.host_user_id) == Some(&id) {
            self.by_host.remove(&record.host_user_id);
            // Fall back to an older record of the same host user, if any.
            if let Some(older) = self
                .order
                .iter()
                .rev()
                .find(|k| {
                    self.records
                        .get(*k)
                        .is_some_and(|r| r.host_user_id == record.host_user_id)
                })
                .copied()
            {
                self.by_host.insert(record.host_user_id.clone(), older);
            }
        }
        Some(record)
    }

    /// Remove every record, in insertion order.
    pub fn drain(&mut self) -> Vec<ParticipantRecord> {
        self.by_external.clear();
        self.by_host.clear();
        let order = std::mem::take(&mut self.order);
        order
            .into_iter()
            .filter_map(|id| self.records.remove(&id))
            .collect()
    }
}
