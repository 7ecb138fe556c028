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

//! Runtime control of the client's log verbosity.
//!
//! The crate only emits through the `log` facade; installing a logger is left
//! to the embedding application. The module's "debug" setting raises the
//! maximum level so `debug!` output becomes visible.

use log::{info, LevelFilter};

pub fn set_debug(enabled: bool) {
    let level = if enabled {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    log::set_max_level(level);
    info!("jitsirtc debug logging {}", if enabled { "enabled" } else { "disabled" });
}

pub fn debug_enabled() -> bool {
    log::max_level() >= LevelFilter::Debug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_max_level() {
        set_debug(true);
        assert!(debug_enabled());
        set_debug(false);
        assert!(!debug_enabled());
        assert_eq!(log::max_level(), LevelFilter::Info);
    }
}
