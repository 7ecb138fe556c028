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

//! Reconciliation of conference participants with host users.
//!
//! Every participant that joins the conference is mapped to a host user:
//! either the one it declares through its participant property, or the one
//! encoded in its display name as `"<name> (<host user id>)"`. Participants
//! that map to no host user are external guests. When guests are allowed they
//! get a temporary host user that lives exactly as long as their records;
//! otherwise the join is rejected and the caller kicks them.
//!
//! The registry expects in-order, non-overlapping calls. The
//! [`EventBridge`](crate::EventBridge) serializes them behind a single mutex.

use std::collections::BTreeSet;
use std::sync::Arc;

use jitsirtc_types::{ExternalParticipantId, HostUserId, MediaKind};
use log::{debug, info, warn};

use super::record_store::RecordStore;
use crate::constants::{DEFAULT_GUEST_NAME, GUEST_ID_LENGTH};
use crate::host::{HostUser, UserDirectory};
use crate::library::TrackRef;
use crate::utils::random_id;

/// Remote tracks currently known for a participant.
#[derive(Clone, Debug, Default)]
pub struct MediaTracks {
    pub audio: Option<TrackRef>,
    pub video: Option<TrackRef>,
}

impl MediaTracks {
    pub fn get(&self, kind: MediaKind) -> Option<&TrackRef> {
        match kind {
            MediaKind::Audio => self.audio.as_ref(),
            MediaKind::Video => self.video.as_ref(),
        }
    }

    fn set(&mut self, kind: MediaKind, track: Option<TrackRef>) {
        match kind {
            MediaKind::Audio => self.audio = track,
            MediaKind::Video => self.video = track,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ParticipantRecord {
    pub external_id: ExternalParticipantId,
    pub host_user_id: HostUserId,
    pub display_name: String,
    /// The host user is a temporary entity created for this guest.
    pub is_external_guest: bool,
    pub is_local: bool,
    pub media: MediaTracks,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JoinOutcome {
    Accepted { host_user_id: HostUserId, guest: bool },
    /// No host user and guests are not allowed; the participant must be kicked.
    Rejected,
    /// Service participant, tracked but never surfaced.
    Hidden,
}

pub struct ParticipantRegistry {
    directory: Arc<dyn UserDirectory>,
    store: RecordStore,
    hidden: BTreeSet<ExternalParticipantId>,
    allow_external_users: bool,
}

impl ParticipantRegistry {
    pub fn new(directory: Arc<dyn UserDirectory>, allow_external_users: bool) -> Self {
        Self {
            directory,
            store: RecordStore::new(),
            hidden: BTreeSet::new(),
            allow_external_users,
        }
    }

    pub fn set_allow_external_users(&mut self, allow: bool) {
        self.allow_external_users = allow;
    }

    pub fn allows_external_users(&self) -> bool {
        self.allow_external_users
    }

    /// Reconcile a joining participant with a host user.
    pub fn on_join(
        &mut self,
        external_id: &ExternalParticipantId,
        display_name: Option<&str>,
        declared: Option<&HostUserId>,
    ) -> JoinOutcome {
        let parsed = display_name.and_then(parse_display_name);
        let known = declared
            .and_then(|id| self.directory.user(id))
            .or_else(|| {
                parsed
                    .as_ref()
                    .and_then(|(_, id)| self.directory.user(id))
            });
        let name = parsed
            .map(|(name, _)| name)
            .or_else(|| display_name.map(str::to_string))
            .filter(|name| !name.is_empty());

        let (host_user_id, guest, name) = match known {
            Some(user) => {
                if !user.active {
                    warn!("Joining user {} is not listed as active. Setting to active.", user.id);
                    self.directory.set_user_active(&user.id, true);
                }
                let name = name.unwrap_or_else(|| user.name.clone());
                (user.id, user.temporary, name)
            }
            None if self.allow_external_users => {
                let name = name.unwrap_or_else(|| DEFAULT_GUEST_NAME.to_string());
                let id = HostUserId::new(random_id(GUEST_ID_LENGTH));
                info!("Adding external user {name} as temporary user {id}");
                self.directory.insert_temporary_user(HostUser {
                    id: id.clone(),
                    name: name.clone(),
                    active: true,
                    temporary: true,
                });
                (id, true, name)
            }
            None => {
                warn!(
                    "Rejecting unauthorized external user: {}",
                    name.as_deref().unwrap_or(DEFAULT_GUEST_NAME)
                );
                return JoinOutcome::Rejected;
            }
        };

        let (_, displaced) = self.store.insert(ParticipantRecord {
            external_id: external_id.clone(),
            host_user_id: host_user_id.clone(),
            display_name: name,
            is_external_guest: guest,
            is_local: false,
            media: MediaTracks::default(),
        });
        if let Some(displaced) = displaced {
            debug!("Participant {external_id} joined again, replacing its record");
            self.release_guest(&displaced);
        }

        JoinOutcome::Accepted {
            host_user_id,
            guest,
        }
    }

    pub fn on_join_hidden(&mut self, external_id: &ExternalParticipantId) -> JoinOutcome {
        info!("Not showing hidden participant {external_id}");
        self.hidden.insert(external_id.clone());
        JoinOutcome::Hidden
    }

    /// Forget a participant that left. Unknown ids are ignored.
    pub fn on_leave(&mut self, external_id: &ExternalParticipantId) -> Option<ParticipantRecord> {
        if self.hidden.remove(external_id) {
            debug!("Hidden participant {external_id} left");
            return None;
        }
        let Some(record) = self.store.remove_by_external(external_id) else {
            debug!("Leave for unknown participant {external_id}, ignoring");
            return None;
        };
        self.release_guest(&record);
        Some(record)
    }

    /// Delete the temporary host user behind a guest record once no record
    /// refers to it.
    fn release_guest(&self, record: &ParticipantRecord) {
        if record.is_external_guest && self.store.by_host(&record.host_user_id).is_none() {
            info!("Removing temporary user {}", record.host_user_id);
            self.directory.remove_user(&record.host_user_id);
        }
    }

    /// Record the local participant under the id the conference assigned it.
    pub fn register_local(&mut self, external_id: &ExternalParticipantId, user: &HostUser) {
        let (_, displaced) = self.store.insert(ParticipantRecord {
            external_id: external_id.clone(),
            host_user_id: user.id.clone(),
            display_name: user.name.clone(),
            is_external_guest: false,
            is_local: true,
            media: MediaTracks::default(),
        });
        if let Some(displaced) = displaced {
            self.release_guest(&displaced);
        }
    }

    pub fn resolve(&self, host_user_id: &HostUserId) -> Option<&ParticipantRecord> {
        self.store.by_host(host_user_id)
    }

    pub fn resolve_by_external_id(
        &self,
        external_id: &ExternalParticipantId,
    ) -> Option<&ParticipantRecord> {
        self.store.by_external(external_id)
    }

    pub fn is_guest(&self, host_user_id: &HostUserId) -> bool {
        self.resolve(host_user_id)
            .is_some_and(|record| record.is_external_guest)
    }

    pub fn is_hidden(&self, external_id: &ExternalParticipantId) -> bool {
        self.hidden.contains(external_id)
    }

    /// Host users present in the conference, local user included, in join
    /// order.
    pub fn connected_users(&self) -> Vec<HostUserId> {
        let mut seen = BTreeSet::new();
        self.store
            .iter()
            .filter(|record| seen.insert(record.host_user_id.clone()))
            .map(|record| record.host_user_id.clone())
            .collect()
    }

    /// External ids of the remote participants.
    pub fn remote_ids(&self) -> Vec<ExternalParticipantId> {
        self.store
            .iter()
            .filter(|record| !record.is_local)
            .map(|record| record.external_id.clone())
            .collect()
    }

    /// Store or clear a remote track on the participant's record. Returns
    /// false when the participant is unknown.
    pub fn set_track(
        &mut self,
        external_id: &ExternalParticipantId,
        kind: MediaKind,
        track: Option<TrackRef>,
    ) -> bool {
        let Some(id) = self.store.id_by_external(external_id) else {
            return false;
        };
        match self.store.get_mut(id) {
            Some(record) => {
                record.media.set(kind, track);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Evict every participant, deleting all temporary guest users.
    pub fn clear(&mut self) {
        self.hidden.clear();
        let mut removed = BTreeSet::new();
        for record in self.store.drain() {
            if record.is_external_guest && removed.insert(record.host_user_id.clone()) {
                info!("Removing temporary user {}", record.host_user_id);
                self.directory.remove_user(&record.host_user_id);
            }
        }
    }
}

/// Split a display name of the form `"<name> (<host user id>)"`.
///
/// The id is taken from the last `" ("`, so names that contain parentheses
/// themselves still parse.
pub fn parse_display_name(display_name: &str) -> Option<(String, HostUserId)> {
    let inner = display_name.strip_suffix(')')?;
    let split = inner.rfind(" (")?;
    let id = &inner[split + 2..];
    if id.is_empty() {
        return None;
    }
    Some((inner[..split].to_string(), HostUserId::from(id)))
}
