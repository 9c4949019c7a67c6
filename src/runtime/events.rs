//! Notifications delivered to the shell's event queue.
//!
//! The runtime pushes [`ShellEvent`]s through an [`EventSink`]; the
//! [`Browser`](crate::Browser) drains them one at a time, in arrival order.
//!
//! | Event | Origin |
//! |-------|--------|
//! | `SurfaceCreated` | Runtime, for every new surface in the session |
//! | `NewTarget` | Runtime, when content asks for a new tab or window |
//! | `ContextMenu` | Runtime, on a surface's context-menu request |
//! | `WindowClosed` | Runtime, after a platform window closed |
//! | `WindowAllClosed` | Runtime, after the last platform window closed |
//! | `Activate` | Runtime, when the app is reactivated (dock icon etc.) |
//! | `InitialTab` | Shell, scheduled by window construction |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::debug;

use crate::identifiers::WindowId;

use super::SurfaceHandle;

// ============================================================================
// Disposition
// ============================================================================

/// Requested placement of a new navigation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Let the runtime decide.
    Default,
    /// New tab that takes focus.
    ForegroundTab,
    /// New tab that leaves focus where it is.
    BackgroundTab,
    /// New top-level window.
    NewWindow,
    /// New popup window.
    NewPopup,
    /// Download instead of displaying.
    SaveToDisk,
    /// Any other value the runtime reported.
    Other(String),
}

impl Disposition {
    /// Parses the runtime's disposition string. Unknown values are kept as [`Disposition::Other`].
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "default" => Self::Default,
            "foreground-tab" => Self::ForegroundTab,
            "background-tab" => Self::BackgroundTab,
            "new-window" => Self::NewWindow,
            "new-popup" => Self::NewPopup,
            "save-to-disk" => Self::SaveToDisk,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the runtime's name for this disposition.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Default => "default",
            Self::ForegroundTab => "foreground-tab",
            Self::BackgroundTab => "background-tab",
            Self::NewWindow => "new-window",
            Self::NewPopup => "new-popup",
            Self::SaveToDisk => "save-to-disk",
            Self::Other(value) => value,
        }
    }

    /// Returns `true` for dispositions the shell opens as a tab.
    #[inline]
    #[must_use]
    pub fn opens_tab(&self) -> bool {
        matches!(
            self,
            Self::ForegroundTab | Self::BackgroundTab | Self::NewWindow
        )
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Requests
// ============================================================================

/// A surface asked for a new navigation target (`target=_blank`, `window.open`, ...).
///
/// The shell always takes over: the runtime must not apply its own default
/// handling once this event is queued.
#[derive(Debug, Clone)]
pub struct NewTargetRequest {
    /// Surface that issued the request.
    pub source: SurfaceHandle,
    /// Requested URL.
    pub url: String,
    /// Target frame name, empty when unnamed.
    pub frame_name: String,
    /// Requested placement.
    pub disposition: Disposition,
}

/// Parameters of a context-menu request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContextMenuParams {
    /// X coordinate in surface pixels.
    pub x: i32,
    /// Y coordinate in surface pixels.
    pub y: i32,
    /// URL of the page the menu was opened on.
    pub page_url: String,
    /// URL of the link under the cursor, if any.
    pub link_url: Option<String>,
    /// Source URL of the media element under the cursor, if any.
    pub src_url: Option<String>,
    /// Media kind under the cursor (`image`, `video`, ...).
    pub media_type: Option<String>,
    /// Currently selected text.
    pub selection_text: String,
    /// Whether the target is editable.
    pub is_editable: bool,
}

// ============================================================================
// ShellEvent
// ============================================================================

/// A notification for the shell's event queue.
#[derive(Debug, Clone)]
pub enum ShellEvent {
    /// A surface was created anywhere in the session.
    SurfaceCreated(SurfaceHandle),

    /// A surface requested a new navigation target.
    NewTarget(NewTargetRequest),

    /// A surface requested a context menu.
    ContextMenu {
        /// Surface the menu belongs to.
        surface: SurfaceHandle,
        /// Menu parameters.
        params: ContextMenuParams,
    },

    /// A platform window closed.
    WindowClosed(WindowId),

    /// The last platform window closed.
    WindowAllClosed,

    /// The application was reactivated.
    Activate,

    /// Deferred creation of a window's first tab.
    InitialTab(WindowId),
}

impl ShellEvent {
    /// Short name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SurfaceCreated(_) => "surface-created",
            Self::NewTarget(_) => "new-target",
            Self::ContextMenu { .. } => "context-menu",
            Self::WindowClosed(_) => "window-closed",
            Self::WindowAllClosed => "window-all-closed",
            Self::Activate => "activate",
            Self::InitialTab(_) => "initial-tab",
        }
    }
}

// ============================================================================
// EventSink
// ============================================================================

/// Sending half of the shell's event queue.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<ShellEvent>,
}

impl EventSink {
    /// Creates a sink and the matching receiver.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ShellEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queues an event. Returns `false` if the shell is gone.
    pub fn send(&self, event: ShellEvent) -> bool {
        let name = event.name();
        match self.tx.send(event) {
            Ok(()) => true,
            Err(_) => {
                debug!(event = name, "Event dropped, shell queue closed");
                false
            }
        }
    }

    /// Returns `true` if the receiving side has been dropped.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disposition_parse_known() {
        assert_eq!(Disposition::parse("foreground-tab"), Disposition::ForegroundTab);
        assert_eq!(Disposition::parse("background-tab"), Disposition::BackgroundTab);
        assert_eq!(Disposition::parse("new-window"), Disposition::NewWindow);
        assert_eq!(Disposition::parse("save-to-disk"), Disposition::SaveToDisk);
    }

    #[test]
    fn test_disposition_parse_unknown_kept() {
        let disposition = Disposition::parse("picture-in-picture");
        assert_eq!(disposition, Disposition::Other("picture-in-picture".into()));
        assert_eq!(disposition.as_str(), "picture-in-picture");
        assert!(!disposition.opens_tab());
    }

    #[test]
    fn test_opens_tab() {
        assert!(Disposition::ForegroundTab.opens_tab());
        assert!(Disposition::BackgroundTab.opens_tab());
        assert!(Disposition::NewWindow.opens_tab());
        assert!(!Disposition::NewPopup.opens_tab());
        assert!(!Disposition::SaveToDisk.opens_tab());
        assert!(!Disposition::Default.opens_tab());
    }

    #[test]
    fn test_context_menu_params_from_json() {
        let params: ContextMenuParams = serde_json::from_value(serde_json::json!({
            "x": 10,
            "y": 20,
            "linkUrl": "https://example.com/",
            "isEditable": true
        }))
        .unwrap();
        assert_eq!(params.x, 10);
        assert_eq!(params.link_url.as_deref(), Some("https://example.com/"));
        assert!(params.is_editable);
        assert!(params.selection_text.is_empty());
    }

    #[test]
    fn test_sink_reports_closed_queue() {
        let (sink, rx) = EventSink::channel();
        assert!(sink.send(ShellEvent::Activate));
        drop(rx);
        assert!(sink.is_closed());
        assert!(!sink.send(ShellEvent::WindowAllClosed));
    }
}
