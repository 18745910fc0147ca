#![forbid(unsafe_code)]

//! Fullscreen capability naming and floating-widget state.
//!
//! Browsers expose the Fullscreen API under three surviving name families:
//! the standard one, WebKit's (Safari) and Microsoft's (IE11). This module
//! normalizes that soup into one [`FullscreenVendor`] with a per-vendor
//! name table; the actual `Reflect` dispatch lives in the web crate.
//!
//! It also owns the page's two floating widgets — the enter-fullscreen
//! button and the "press Esc" hint — as a pure visibility derivation:
//! exactly one of them is shown depending on whether the page is fullscreen.
//! Escape itself is handled by the browser (it exits fullscreen natively);
//! the client merely re-derives widget visibility shortly afterwards.

/// Vendor name families, in detection preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FullscreenVendor {
    Standard,
    WebKit,
    Ms,
}

/// Per-vendor method/property/event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VendorApi {
    /// Request method, called on the root element.
    pub request_method: &'static str,
    /// Exit method, called on the document.
    pub exit_method: &'static str,
    /// Document property holding the current fullscreen element.
    pub element_property: &'static str,
    /// Vendor's state-change event name.
    pub change_event: &'static str,
}

impl FullscreenVendor {
    /// Detection preference order: standard first, then the prefixes.
    pub const ALL: [Self; 3] = [Self::Standard, Self::WebKit, Self::Ms];

    #[must_use]
    pub const fn api(self) -> VendorApi {
        match self {
            Self::Standard => VendorApi {
                request_method: "requestFullscreen",
                exit_method: "exitFullscreen",
                element_property: "fullscreenElement",
                change_event: "fullscreenchange",
            },
            Self::WebKit => VendorApi {
                request_method: "webkitRequestFullscreen",
                exit_method: "webkitExitFullscreen",
                element_property: "webkitFullscreenElement",
                change_event: "webkitfullscreenchange",
            },
            Self::Ms => VendorApi {
                request_method: "msRequestFullscreen",
                exit_method: "msExitFullscreen",
                element_property: "msFullscreenElement",
                change_event: "msfullscreenchange",
            },
        }
    }
}

/// Change events to listen for. Includes `mozfullscreenchange`: some engines
/// still fire it even though the moz request path is long gone.
pub const CHANGE_EVENT_NAMES: [&str; 4] = [
    "fullscreenchange",
    "webkitfullscreenchange",
    "mozfullscreenchange",
    "msfullscreenchange",
];

/// Delay before re-deriving widget visibility after an Escape keypress. The
/// browser exits fullscreen on its own; the state is not yet observable in
/// the same task.
pub const ESCAPE_RECHECK_DELAY_MS: i32 = 100;

/// Desired visibility of the two floating widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullscreenUiPatch {
    /// The enter-fullscreen button; shown only when NOT fullscreen.
    pub button_visible: bool,
    /// The "press Esc to exit" hint; shown only when fullscreen.
    pub hint_visible: bool,
}

/// Widget visibility derivation, idempotent under repeated change events.
#[derive(Debug, Default, Clone, Copy)]
pub struct FullscreenUi {
    applied: Option<FullscreenUiPatch>,
}

impl FullscreenUi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive visibility for the given state. Returns a patch only when
    /// something actually changed; repeated calls with the same flag are
    /// `None`.
    pub fn apply(&mut self, is_fullscreen: bool) -> Option<FullscreenUiPatch> {
        let next = FullscreenUiPatch {
            button_visible: !is_fullscreen,
            hint_visible: is_fullscreen,
        };
        if self.applied == Some(next) {
            return None;
        }
        self.applied = Some(next);
        Some(next)
    }

    /// Last applied patch, if any.
    #[must_use]
    pub const fn current(&self) -> Option<FullscreenUiPatch> {
        self.applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn vendor_tables_are_consistent() {
        for vendor in FullscreenVendor::ALL {
            let api = vendor.api();
            assert!(api.request_method.ends_with("equestFullscreen"));
            assert!(CHANGE_EVENT_NAMES.contains(&api.change_event));
        }
        assert_eq!(FullscreenVendor::ALL[0], FullscreenVendor::Standard);
    }

    #[test]
    fn first_apply_always_emits() {
        let mut ui = FullscreenUi::new();
        assert_eq!(ui.current(), None);
        let patch = ui.apply(false).expect("first apply emits");
        assert_eq!(patch.button_visible, true);
        assert_eq!(patch.hint_visible, false);
    }

    #[test]
    fn repeated_apply_is_idempotent() {
        let mut ui = FullscreenUi::new();
        assert!(ui.apply(true).is_some());
        assert_eq!(ui.apply(true), None);
        assert_eq!(ui.apply(true), None);
    }

    #[test]
    fn exactly_one_widget_visible_after_apply() {
        let mut ui = FullscreenUi::new();
        for flag in [false, true, false, true, true, false] {
            if let Some(patch) = ui.apply(flag) {
                assert!(patch.button_visible != patch.hint_visible);
            }
            let current = ui.current().expect("applied at least once");
            assert!(current.button_visible != current.hint_visible);
        }
    }
}
