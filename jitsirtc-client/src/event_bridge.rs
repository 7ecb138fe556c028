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

//! Translation of library events into registry updates and host callbacks.
//!
//! [EventBridge::subscribe] merges the transport and conference event
//! channels into one stream and handles it on a single task, so handlers never
//! overlap and the registry sees joins and leaves in delivery order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_broadcast::Receiver;
use futures::StreamExt;
use jitsirtc_types::{Callback, ExternalParticipantId, HostUserId, MediaKind, RoomName};
use log::{debug, error, warn};
use serde::Deserialize;

use crate::connection::Subscription;
use crate::constants::{HOST_USER_ID_PROPERTY, MAX_FRAME_RATE};
use crate::debounce::Debouncer;
use crate::events::{ConferenceEvent, TransportEvent};
use crate::host::{HostNotifier, SettingsStore};
use crate::library::{Conference, ParticipantRef, ReceiverConstraints, TrackRef};
use crate::registry::{JoinOutcome, ParticipantRegistry};
use crate::utils::lock;

/// Per-connection state the handlers need.
#[derive(Clone)]
pub struct BridgeContext {
    pub conference: Arc<dyn Conference>,
    pub room: RoomName,
    /// `room` is a breakout room rather than the main room.
    pub in_breakout: bool,
    /// Cleared when the host asked to disconnect.
    pub active: Arc<AtomicBool>,
    pub reconnect: Callback<()>,
}

enum LibraryEvent {
    Transport(TransportEvent),
    Conference(ConferenceEvent),
}

#[derive(Debug, Deserialize)]
struct TranscriptionResult {
    message_id: String,
    participant: TranscriptionParticipant,
    transcript: Vec<Transcript>,
}

#[derive(Debug, Deserialize)]
struct TranscriptionParticipant {
    id: ExternalParticipantId,
}

#[derive(Debug, Deserialize)]
struct Transcript {
    text: String,
}

pub struct EventBridge {
    registry: Arc<Mutex<ParticipantRegistry>>,
    notifier: Arc<dyn HostNotifier>,
    settings: Arc<dyn SettingsStore>,
    render: Debouncer,
    speaking_threshold: f64,
    receiver_height: u32,
}

impl EventBridge {
    pub fn new(
        registry: Arc<Mutex<ParticipantRegistry>>,
        notifier: Arc<dyn HostNotifier>,
        settings: Arc<dyn SettingsStore>,
        render_debounce: Duration,
        speaking_threshold: f64,
        receiver_height: u32,
    ) -> Self {
        let render_target = notifier.clone();
        let render = Debouncer::new(
            render_debounce,
            Callback::from(move |_: ()| render_target.render()),
        );
        Self {
            registry,
            notifier,
            settings,
            render,
            speaking_threshold,
            receiver_height,
        }
    }

    /// Start handling events from both channels until the returned
    /// [Subscription] is dropped.
    pub fn subscribe(
        self: &Arc<Self>,
        ctx: BridgeContext,
        transport: Receiver<TransportEvent>,
        conference: Receiver<ConferenceEvent>,
    ) -> Subscription {
        let mut events = futures::stream::select(
            transport.map(LibraryEvent::Transport),
            conference.map(LibraryEvent::Conference),
        )
        .boxed();
        let bridge = Arc::clone(self);
        let task = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                match event {
                    LibraryEvent::Transport(event) => bridge.handle_transport_event(&ctx, event),
                    LibraryEvent::Conference(event) => bridge.handle_conference_event(&ctx, event),
                }
            }
            debug!("Library event streams closed");
        });
        Subscription::new(task)
    }

    /// Schedule a debounced re-render of the host's A/V UI.
    pub fn request_render(&self) {
        self.render.trigger();
    }

    /// Drop a re-render still waiting out its quiet period.
    pub fn cancel_render(&self) {
        self.render.cancel();
    }

    pub fn handle_transport_event(&self, ctx: &BridgeContext, event: TransportEvent) {
        match event {
            TransportEvent::Established => debug!("Transport established"),
            TransportEvent::Failed { code, message } => {
                error!("Transport failed: {code} {}", message.as_deref().unwrap_or(""));
                self.notifier.report_error(&format!("Connection failed: {code}"));
            }
            TransportEvent::Disconnected(reason) => {
                self.reconnect_if_active(ctx, &format!("Connection disconnected ({reason:?})"));
            }
        }
    }

    pub fn handle_conference_event(&self, ctx: &BridgeContext, event: ConferenceEvent) {
        match event {
            ConferenceEvent::Joined => debug!("Conference joined event"),
            ConferenceEvent::Error(code) => {
                error!("Conference error: {code}");
                self.notifier.report_error(&format!("Conference error: {code}"));
            }
            ConferenceEvent::ConnectionInterrupted => {
                self.reconnect_if_active(ctx, "Connection interrupted");
            }
            ConferenceEvent::SuspendDetected => warn!("Suspend detected"),
            ConferenceEvent::ParticipantJoined(participant) => {
                self.on_participant_joined(ctx, participant)
            }
            ConferenceEvent::ParticipantLeft(id) => self.on_participant_left(ctx, &id),
            ConferenceEvent::ParticipantConnectionStatusChanged {
                participant_id,
                status,
            } => {
                let user = self.host_user(&participant_id);
                debug!("Status changed for participant {participant_id} ({user:?}): {status}");
            }
            ConferenceEvent::TrackAdded(track) => self.on_remote_track(ctx, track, true),
            ConferenceEvent::TrackRemoved(track) => self.on_remote_track(ctx, track, false),
            ConferenceEvent::TrackMuteChanged(track) => self.on_track_mute_changed(ctx, track),
            ConferenceEvent::AudioLevelChanged {
                participant_id,
                level,
            } => self.on_audio_level(&participant_id, level),
            ConferenceEvent::EndpointMessage { from, payload } => {
                self.on_endpoint_message(&from, payload)
            }
            ConferenceEvent::MessageReceived { from, text } => {
                debug!("Message received from {from}: {text}");
            }
        }
    }

    fn reconnect_if_active(&self, ctx: &BridgeContext, reason: &str) {
        if ctx.active.load(Ordering::SeqCst) {
            warn!("{reason}; reconnecting");
            ctx.reconnect.emit(());
        } else {
            debug!("{reason} after disconnect; ignoring");
        }
    }

    fn host_user(&self, external_id: &ExternalParticipantId) -> Option<HostUserId> {
        lock(&self.registry)
            .resolve_by_external_id(external_id)
            .map(|record| record.host_user_id.clone())
    }

    fn on_participant_joined(&self, ctx: &BridgeContext, participant: ParticipantRef) {
        let id = participant.id();
        let (outcome, remote) = {
            let mut registry = lock(&self.registry);
            let outcome = if participant.is_hidden() {
                registry.on_join_hidden(&id)
            } else {
                let declared = participant
                    .property(HOST_USER_ID_PROPERTY)
                    .filter(|value| !value.is_empty())
                    .map(HostUserId::from);
                let display_name = participant.display_name();
                registry.on_join(&id, display_name.as_deref(), declared.as_ref())
            };
            if matches!(outcome, JoinOutcome::Accepted { .. }) {
                // Tracks may have arrived before the join event.
                for kind in MediaKind::ALL {
                    if let Some(track) = participant.tracks_by_media_type(kind).into_iter().next() {
                        registry.set_track(&id, kind, Some(track));
                    }
                }
            }
            (outcome, registry.remote_ids())
        };

        let host_user_id = match outcome {
            JoinOutcome::Hidden => return,
            JoinOutcome::Rejected => {
                warn!("Kicking unauthorized external participant {id}");
                ctx.conference.kick_participant(&id);
                return;
            }
            JoinOutcome::Accepted { host_user_id, .. } => host_user_id,
        };

        if !ctx.in_breakout && self.settings.user_breakout_room(&host_user_id).is_some() {
            self.settings.set_user_breakout_room(&host_user_id, None);
        }

        ctx.conference.select_participants(&remote);
        let constraints = ReceiverConstraints {
            last_n: -1,
            on_stage: remote,
            max_height: self.receiver_height,
            max_frame_rate: MAX_FRAME_RATE,
        };
        if let Err(e) = ctx.conference.set_receiver_constraints(&constraints) {
            debug!("setReceiverConstraints not supported; skipping: {e:?}");
        }

        debug!("User joined: {host_user_id} as {id}");
        self.request_render();
    }

    fn on_participant_left(&self, ctx: &BridgeContext, id: &ExternalParticipantId) {
        let Some(record) = lock(&self.registry).on_leave(id) else {
            return;
        };
        debug!("User left: {}", record.host_user_id);

        if ctx.in_breakout
            && self.settings.user_breakout_room(&record.host_user_id).as_ref() == Some(&ctx.room)
        {
            self.settings.set_user_breakout_room(&record.host_user_id, None);
        }
        self.request_render();
    }

    /// Owner of a remote track, unless the track is local or belongs to a
    /// hidden participant.
    fn visible_owner(&self, ctx: &BridgeContext, track: &TrackRef) -> Option<ExternalParticipantId> {
        if track.is_local() {
            return None;
        }
        let owner = track.participant_id()?;
        let hidden = lock(&self.registry).is_hidden(&owner)
            || ctx
                .conference
                .participant(&owner)
                .is_some_and(|participant| participant.is_hidden());
        if hidden {
            debug!("Ignoring {} track of hidden participant {owner}", track.kind());
            return None;
        }
        Some(owner)
    }

    fn on_remote_track(&self, ctx: &BridgeContext, track: TrackRef, added: bool) {
        let Some(owner) = self.visible_owner(ctx, &track) else {
            return;
        };
        let kind = track.kind();
        let known = lock(&self.registry).set_track(&owner, kind, added.then_some(track));
        debug!(
            "Remote {kind} track {} for participant {owner}{}",
            if added { "added" } else { "removed" },
            if known { "" } else { " (not joined yet)" }
        );
        self.request_render();
    }

    fn on_track_mute_changed(&self, ctx: &BridgeContext, track: TrackRef) {
        let Some(owner) = self.visible_owner(ctx, &track) else {
            return;
        };
        debug!(
            "Mute changed to {} for {} for participant {owner}",
            track.is_muted(),
            track.kind()
        );
        if track.kind() == MediaKind::Video {
            self.request_render();
        }
    }

    fn on_audio_level(&self, participant_id: &ExternalParticipantId, level: f64) {
        let Some(user) = self.host_user(participant_id) else {
            return;
        };
        self.notifier
            .set_user_speaking(&user, level > self.speaking_threshold);
    }

    fn on_endpoint_message(&self, from: &ExternalParticipantId, payload: serde_json::Value) {
        match payload.get("type").and_then(|t| t.as_str()) {
            Some("transcription-result") => self.on_transcription(payload),
            Some("e2e-ping-request") | Some("e2e-ping-response") => {}
            _ => debug!("Unknown endpoint message received from {from}: {payload}"),
        }
    }

    fn on_transcription(&self, payload: serde_json::Value) {
        if !self.settings.settings().client.captions_enabled {
            return;
        }
        let result: TranscriptionResult = match serde_json::from_value(payload) {
            Ok(result) => result,
            Err(e) => {
                debug!("Malformed transcription message: {e}");
                return;
            }
        };
        let Some(user) = self.host_user(&result.participant.id) else {
            debug!("Transcription for unknown participant {}", result.participant.id);
            return;
        };
        if let Some(transcript) = result.transcript.first() {
            self.notifier
                .caption(&result.message_id, &user, &transcript.text);
        }
    }
}
