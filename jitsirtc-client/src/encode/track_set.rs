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

//! Local outbound tracks of the current user.
//!
//! [TrackSet] captures tracks from the selected devices, publishes them into a
//! conference and keeps the outbound mute state (audio enabled, video enabled,
//! audio broadcasting) that the host toggles.

use std::sync::{Arc, Mutex};

use futures::future::join_all;
use jitsirtc_types::{HostUserId, MediaKind, VoiceMode};
use log::{debug, error, warn};

use crate::host::{BroadcastPolicy, HostNotifier, Localizer, Notice};
use crate::library::{Conference, RtcLibrary, TrackRef, TrackRequest};
use crate::utils::lock;

/// The local user's tracks, at most one per kind.
#[derive(Clone, Debug, Default)]
pub struct LocalTrackSet {
    pub audio: Option<TrackRef>,
    pub video: Option<TrackRef>,
}

impl LocalTrackSet {
    /// Keep the first track of each kind. Surplus tracks are returned so the
    /// caller can dispose them.
    pub fn from_tracks(tracks: Vec<TrackRef>) -> (Self, Vec<TrackRef>) {
        let mut set = Self::default();
        let mut surplus = Vec::new();
        for track in tracks {
            let slot = set.slot_mut(track.kind());
            if slot.is_none() {
                *slot = Some(track);
            } else {
                surplus.push(track);
            }
        }
        (set, surplus)
    }

    pub fn get(&self, kind: MediaKind) -> Option<&TrackRef> {
        match kind {
            MediaKind::Audio => self.audio.as_ref(),
            MediaKind::Video => self.video.as_ref(),
        }
    }

    fn slot_mut(&mut self, kind: MediaKind) -> &mut Option<TrackRef> {
        match kind {
            MediaKind::Audio => &mut self.audio,
            MediaKind::Video => &mut self.video,
        }
    }

    pub fn take(&mut self, kind: MediaKind) -> Option<TrackRef> {
        self.slot_mut(kind).take()
    }

    pub fn tracks(&self) -> Vec<TrackRef> {
        self.audio.iter().chain(self.video.iter()).cloned().collect()
    }

    pub fn kinds(&self) -> Vec<MediaKind> {
        MediaKind::ALL
            .into_iter()
            .filter(|kind| self.get(*kind).is_some())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.audio.iter().count() + self.video.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.audio.is_none() && self.video.is_none()
    }

    pub async fn dispose_all(self) {
        dispose(self.tracks()).await;
    }
}

/// Devices requested for capture. `None` means "do not capture this kind".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceSelection {
    pub audio_id: Option<String>,
    pub video_id: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct MediaState {
    audio_enabled: bool,
    video_enabled: bool,
    broadcast_enabled: bool,
}

pub struct TrackSet {
    library: Arc<dyn RtcLibrary>,
    policy: Arc<dyn BroadcastPolicy>,
    notifier: Arc<dyn HostNotifier>,
    localizer: Arc<dyn Localizer>,
    user: HostUserId,
    resolution: u32,
    local: Mutex<LocalTrackSet>,
    state: Mutex<MediaState>,
}

impl TrackSet {
    pub fn new(
        library: Arc<dyn RtcLibrary>,
        policy: Arc<dyn BroadcastPolicy>,
        notifier: Arc<dyn HostNotifier>,
        localizer: Arc<dyn Localizer>,
        user: HostUserId,
        resolution: u32,
    ) -> Self {
        Self {
            library,
            policy,
            notifier,
            localizer,
            user,
            resolution,
            local: Mutex::new(LocalTrackSet::default()),
            state: Mutex::new(MediaState::default()),
        }
    }

    /// Capture tracks for the requested devices the user may broadcast.
    ///
    /// When capturing both kinds fails, audio alone and then video alone are
    /// tried, with a warning naming what was captured. When nothing can be
    /// captured the user is warned and an empty set is returned.
    pub async fn acquire(&self, devices: &DeviceSelection) -> LocalTrackSet {
        let audio = devices
            .audio_id
            .clone()
            .filter(|_| self.policy.can_broadcast(&self.user, MediaKind::Audio));
        let video = devices
            .video_id
            .clone()
            .filter(|_| self.policy.can_broadcast(&self.user, MediaKind::Video));

        if audio.is_none() && video.is_none() {
            debug!("No permitted devices requested, skipping capture");
            return LocalTrackSet::default();
        }

        if let Some(set) = self.create(audio.clone(), video.clone()).await {
            return set;
        }

        if audio.is_some() && video.is_some() {
            if let Some(set) = self.create(audio, None).await {
                self.warn_user(Notice::CaptureAudioOnly);
                return set;
            }
            if let Some(set) = self.create(None, video).await {
                self.warn_user(Notice::CaptureVideoOnly);
                return set;
            }
        }

        self.warn_user(Notice::CaptureFailed);
        LocalTrackSet::default()
    }

    /// Capture the screen. A single track replaces only the local video; a
    /// screen-plus-audio share replaces every local track.
    pub async fn acquire_desktop(&self, conference: &dyn Conference) -> bool {
        let request = TrackRequest {
            desktop: true,
            resolution: self.resolution,
            ..Default::default()
        };
        let Some(set) = self.request(&request).await else {
            warn!("Could not create desktop tracks");
            return false;
        };

        if set.len() == 1 {
            self.release(Some(MediaKind::Video)).await;
        } else {
            self.release(None).await;
        }
        let published = self.publish(conference, set).await;
        self.install(published).await;
        true
    }

    async fn create(&self, audio: Option<String>, video: Option<String>) -> Option<LocalTrackSet> {
        let request = TrackRequest {
            audio_device: audio,
            video_device: video,
            desktop: false,
            resolution: self.resolution,
        };
        self.request(&request).await
    }

    async fn request(&self, request: &TrackRequest) -> Option<LocalTrackSet> {
        debug!("Requesting local tracks: {:?}", request.kinds());
        match self.library.create_local_tracks(request).await {
            Ok(tracks) if tracks.is_empty() => {
                warn!("create_local_tracks returned no tracks");
                None
            }
            Ok(tracks) => {
                let (set, surplus) = LocalTrackSet::from_tracks(tracks);
                dispose(surplus).await;
                Some(set)
            }
            Err(e) => {
                warn!("create_local_tracks error: {e:?}");
                None
            }
        }
    }

    fn warn_user(&self, notice: Notice) {
        let message = self.localizer.localize(notice.i18n_key());
        warn!("{message}");
        self.notifier.notify(notice, &message);
    }

    /// Add `set` to the conference, checking broadcast permission again per
    /// track. Refused tracks are disposed and left out of the returned set;
    /// tracks that fail to publish are logged and kept.
    pub async fn publish(&self, conference: &dyn Conference, set: LocalTrackSet) -> LocalTrackSet {
        let mut allowed = LocalTrackSet::default();
        let mut refused = Vec::new();
        for track in set.tracks() {
            let kind = track.kind();
            if self.policy.can_broadcast(&self.user, kind) {
                *allowed.slot_mut(kind) = Some(track);
            } else {
                warn!("Attempted to add disallowed track of type: {kind}");
                refused.push(track);
            }
        }
        dispose(refused).await;

        let results = join_all(
            allowed
                .tracks()
                .into_iter()
                .map(|track| async move { (track.kind(), conference.add_track(track).await) }),
        )
        .await;
        for (kind, result) in results {
            if let Err(e) = result {
                error!("addTrack error for {kind} track: {e:?}");
            }
        }
        allowed
    }

    /// Make `set` the current local tracks, disposing the tracks it replaces.
    pub async fn install(&self, set: LocalTrackSet) {
        let replaced: Vec<TrackRef> = {
            let mut local = lock(&self.local);
            set.kinds()
                .into_iter()
                .filter_map(|kind| {
                    let replaced = local.take(kind);
                    *local.slot_mut(kind) = set.get(kind).cloned();
                    replaced
                })
                .collect()
        };
        dispose(replaced).await;
    }

    /// Dispose every local track, or only those of `kind`.
    pub async fn release(&self, kind: Option<MediaKind>) {
        let released = {
            let mut local = lock(&self.local);
            match kind {
                Some(kind) => local.take(kind).into_iter().collect(),
                None => std::mem::take(&mut *local).tracks(),
            }
        };
        if !released.is_empty() {
            debug!("Releasing {} local track(s)", released.len());
        }
        dispose(released).await;
    }

    pub fn local(&self, kind: MediaKind) -> Option<TrackRef> {
        lock(&self.local).get(kind).cloned()
    }

    pub fn local_tracks(&self) -> LocalTrackSet {
        lock(&self.local).clone()
    }

    pub fn is_audio_enabled(&self) -> bool {
        lock(&self.state).audio_enabled
    }

    pub fn is_video_enabled(&self) -> bool {
        lock(&self.state).video_enabled
    }

    pub fn is_broadcasting(&self) -> bool {
        lock(&self.state).broadcast_enabled
    }

    /// Enable or disable outbound audio. Ignored in push-to-talk mode while
    /// the user is not broadcasting.
    pub async fn toggle_audio(&self, enable: bool, voice_mode: VoiceMode) {
        {
            let mut state = lock(&self.state);
            if !state.broadcast_enabled && voice_mode == VoiceMode::Ptt {
                debug!("Ignoring audio toggle while push-to-talk is released");
                return;
            }
            state.audio_enabled = enable;
        }
        debug!("Toggling audio: {enable}");
        self.set_muted(MediaKind::Audio, !enable).await;
    }

    pub async fn toggle_broadcast(&self, broadcast: bool) {
        lock(&self.state).broadcast_enabled = broadcast;
        debug!("Toggling broadcast audio: {broadcast}");
        self.set_muted(MediaKind::Audio, !broadcast).await;
    }

    pub async fn toggle_video(&self, enable: bool) {
        lock(&self.state).video_enabled = enable;
        debug!("Toggling video: {enable}");
        self.set_muted(MediaKind::Video, !enable).await;
    }

    /// Mute state right after publishing: audio is live only in "always"
    /// voice mode, video follows the share permission.
    pub async fn apply_initial_state(&self, voice_mode: VoiceMode) {
        let always = voice_mode == VoiceMode::Always;
        let share_audio = self.policy.can_share(&self.user, MediaKind::Audio);
        let share_video = self.policy.can_share(&self.user, MediaKind::Video);
        self.toggle_audio(always && share_audio, voice_mode).await;
        self.toggle_video(share_video).await;
        self.toggle_broadcast(always).await;
    }

    async fn set_muted(&self, kind: MediaKind, muted: bool) {
        let Some(track) = self.local(kind) else {
            return;
        };
        let result = if muted {
            track.mute().await
        } else {
            track.unmute().await
        };
        if let Err(e) = result {
            warn!("Failed to {} local {kind} track: {e:?}", if muted { "mute" } else { "unmute" });
        }
    }
}

async fn dispose(tracks: Vec<TrackRef>) {
    for track in tracks {
        if let Err(e) = track.dispose().await {
            warn!("Failed to dispose {} track: {e:?}", track.kind());
        }
    }
}
