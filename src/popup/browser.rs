//! System-browser popup for terminal hosts
//!
//! A terminal cannot observe a browser tab closing, so the user confirms it:
//! the handle reads closed once Enter is pressed on stdin.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{ClosedPopup, PopupFeatures, PopupHandle, PopupOpener};

/// Opens the authorization URL in the default browser.
#[derive(Default)]
pub struct BrowserOpener;

impl BrowserOpener {
    pub fn new() -> Self {
        Self
    }
}

impl PopupOpener for BrowserOpener {
    fn open(&self, url: &str, title: &str, features: &PopupFeatures) -> Box<dyn PopupHandle> {
        tracing::debug!("Opening '{}' ({})", title, features.feature_string());

        if let Err(e) = open::that(url) {
            // Same as a blocked popup: the watcher sees it closed on its first tick
            tracing::warn!("Could not open browser: {:#}", e);
            println!("Open this URL to authorize: {}", url);
            return Box::new(ClosedPopup);
        }

        println!();
        println!("{} opened in your browser.", title);
        println!("Press Enter here once you have closed that window.");
        println!();

        let closed = Arc::new(AtomicBool::new(false));
        let flag = closed.clone();
        std::thread::spawn(move || confirm_closed(std::io::stdin().lock(), &flag));

        Box::new(TerminalConfirmedPopup { closed })
    }
}

/// Block until a line is read, then mark the popup closed. EOF and read
/// errors also count as closed so the handshake cannot hang.
fn confirm_closed(mut input: impl BufRead, closed: &AtomicBool) {
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) => tracing::warn!("stdin closed; treating the authorization window as closed"),
        Ok(_) => {}
        Err(e) => tracing::warn!(
            "Could not read stdin ({}); treating the authorization window as closed",
            e
        ),
    }
    closed.store(true, Ordering::SeqCst);
}

/// Popup whose closure is confirmed from the terminal.
pub struct TerminalConfirmedPopup {
    closed: Arc<AtomicBool>,
}

impl PopupHandle for TerminalConfirmedPopup {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmed_popup_reads_flag() {
        let closed = Arc::new(AtomicBool::new(false));
        let popup = TerminalConfirmedPopup {
            closed: closed.clone(),
        };
        assert!(!popup.is_closed());

        closed.store(true, Ordering::SeqCst);
        assert!(popup.is_closed());
    }

    #[test]
    fn test_confirm_closed_on_enter() {
        let closed = AtomicBool::new(false);
        confirm_closed(std::io::Cursor::new("\n"), &closed);
        assert!(closed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_confirm_closed_on_eof_and_error() {
        let closed = AtomicBool::new(false);
        confirm_closed(std::io::empty(), &closed);
        assert!(closed.load(Ordering::SeqCst));

        struct Broken;
        impl std::io::Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "not a tty"))
            }
        }

        let closed = AtomicBool::new(false);
        confirm_closed(std::io::BufReader::new(Broken), &closed);
        assert!(closed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_closed_popup() {
        assert!(ClosedPopup.is_closed());
    }
}
