//! Connect button view derived from the connection status

use std::fmt;

use crate::integration::ConnectionStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonColor {
    Primary,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonContent {
    Label(String),
    Spinner,
}

/// What the host should render for the connect button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonView {
    pub content: ButtonContent,
    pub color: ButtonColor,
    /// Clicks are ignored unless enabled
    pub enabled: bool,
}

impl ButtonView {
    pub fn for_status(status: ConnectionStatus, display_name: &str) -> Self {
        match status {
            ConnectionStatus::Connected => Self {
                content: ButtonContent::Label(format!("{} Connected", display_name)),
                color: ButtonColor::Success,
                enabled: false,
            },
            ConnectionStatus::Connecting => Self {
                content: ButtonContent::Spinner,
                color: ButtonColor::Primary,
                enabled: false,
            },
            ConnectionStatus::Disconnected => Self {
                content: ButtonContent::Label(format!("Connect to {}", display_name)),
                color: ButtonColor::Primary,
                enabled: true,
            },
        }
    }
}

impl fmt::Display for ButtonView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match &self.content {
            ButtonContent::Label(label) => label.as_str(),
            ButtonContent::Spinner => "...",
        };
        if self.enabled {
            write!(f, "[ {} ]", text)
        } else {
            write!(f, "( {} )", text)
        }
    }
}
