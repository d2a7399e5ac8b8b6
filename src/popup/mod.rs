//! Authorization popup seam
//!
//! The handshake opens the provider consent page in a separate window and
//! then only ever asks the handle whether it has been closed.

pub mod browser;
pub mod watcher;

use serde::{Deserialize, Serialize};

pub use browser::BrowserOpener;
pub use watcher::wait_for_close;

/// Window features for the popup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopupFeatures {
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
    pub scrollbars: bool,
}

impl Default for PopupFeatures {
    fn default() -> Self {
        Self {
            width: 600,
            height: 600,
            resizable: true,
            scrollbars: true,
        }
    }
}

impl PopupFeatures {
    /// `window.open`-style feature string, e.g. `width=600,height=600,resizable,scrollbars`.
    pub fn feature_string(&self) -> String {
        let mut parts = vec![
            format!("width={}", self.width),
            format!("height={}", self.height),
        ];
        if self.resizable {
            parts.push("resizable".to_string());
        }
        if self.scrollbars {
            parts.push("scrollbars".to_string());
        }
        parts.join(",")
    }
}

/// Handle to an opened popup window.
pub trait PopupHandle: Send + Sync {
    /// True once the window is gone. A window that never opened reads closed.
    fn is_closed(&self) -> bool;
}

/// Opens authorization popups.
pub trait PopupOpener: Send + Sync {
    fn open(&self, url: &str, title: &str, features: &PopupFeatures) -> Box<dyn PopupHandle>;
}

/// Handle for a popup that could not be opened.
pub struct ClosedPopup;

impl PopupHandle for ClosedPopup {
    fn is_closed(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_feature_string() {
        assert_eq!(
            PopupFeatures::default().feature_string(),
            "width=600,height=600,resizable,scrollbars"
        );
    }

    #[test]
    fn test_feature_string_without_affordances() {
        let features = PopupFeatures {
            width: 800,
            height: 640,
            resizable: false,
            scrollbars: false,
        };
        assert_eq!(features.feature_string(), "width=800,height=640");
    }
}
