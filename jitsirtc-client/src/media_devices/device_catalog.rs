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

use std::collections::BTreeMap;
use std::sync::Arc;

use jitsirtc_types::MediaKind;
use log::{debug, error};

use crate::constants::i18n;
use crate::host::Localizer;
use crate::library::{DeviceKind, RtcLibrary};

/// Device id to human-readable label.
pub type DeviceMap = BTreeMap<String, String>;

/// [DeviceCatalog] lists the media devices the library can see, as the id to
/// label maps the host's device pickers expect.
///
/// Listing never fails: when enumeration errors, the error is logged and an
/// empty map is returned.
pub struct DeviceCatalog {
    library: Arc<dyn RtcLibrary>,
    localizer: Arc<dyn Localizer>,
}

impl DeviceCatalog {
    pub fn new(library: Arc<dyn RtcLibrary>, localizer: Arc<dyn Localizer>) -> Self {
        Self { library, localizer }
    }

    /// Microphones or cameras.
    pub async fn list_inputs(&self, kind: MediaKind) -> DeviceMap {
        self.list(DeviceKind::from(kind)).await
    }

    /// Speakers and headsets.
    pub async fn list_outputs(&self) -> DeviceMap {
        self.list(DeviceKind::AudioOutput).await
    }

    async fn list(&self, kind: DeviceKind) -> DeviceMap {
        let devices = match self.library.enumerate_devices().await {
            Ok(devices) => devices,
            Err(e) => {
                error!("Failed to enumerate {kind:?} devices: {e:?}");
                return DeviceMap::new();
            }
        };
        let map: DeviceMap = devices
            .into_iter()
            .filter(|device| device.kind == kind)
            .map(|device| {
                let label = if device.label.is_empty() {
                    self.localizer.localize(i18n::UNKNOWN_DEVICE)
                } else {
                    device.label
                };
                (device.device_id, label)
            })
            .collect();
        debug!("Found {} {kind:?} devices", map.len());
        map
    }
}
