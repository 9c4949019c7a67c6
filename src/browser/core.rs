//! Browser controller.
//!
//! The [`Browser`] owns every [`TabbedWindow`], resolves which window a
//! surface belongs to, and handles the runtime's notifications one at a
//! time from a single queue.
//!
//! # Lifecycle
//!
//! ```text
//! build() ──► init() ──► run() / dispatch_pending() ──► quit
//!               │
//!               ├─ sanitize user agent, menus, preloads
//!               ├─ extension host + bundled UI extension
//!               ├─ installed extensions
//!               └─ first window (new-tab page)
//! ```
//!
//! # Parent-window resolution
//!
//! | Surface type | Parent window |
//! |--------------|---------------|
//! | `window` | the window hosting it |
//! | `browserView`, `webview` | the window owning it |
//! | `backgroundPage` | the focused window |
//! | anything else | error |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::extensions::{ExtensionHost, RequestContext, load_extensions};
use crate::identifiers::{ExtensionId, WindowId};
use crate::menu::MenuBuilder;
use crate::runtime::{
    ContextMenuParams, DevToolsOptions, Disposition, EventSink, NewTargetRequest, Runtime,
    Session, ShellEvent, SurfaceHandle, SurfaceType,
};

use super::builder::{BrowserBuilder, BrowserConfig};
use super::delegate::BrowserDelegate;
use super::user_agent::sanitize_user_agent;
use super::window::{TabbedWindow, WindowConfig};

// ============================================================================
// Constants
// ============================================================================

/// New-tab page inside the bundled UI extension.
pub const NEW_TAB_PAGE: &str = "new-tab.html";

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for the browser.
pub(crate) struct BrowserInner {
    /// Content-hosting runtime.
    pub runtime: Arc<dyn Runtime>,

    /// Validated configuration.
    pub config: BrowserConfig,

    /// Menu collaborator.
    pub menus: Arc<dyn MenuBuilder>,

    /// Shared browsing session.
    pub session: Arc<dyn Session>,

    /// Extension host, set during init.
    pub extensions: RwLock<Option<Arc<dyn ExtensionHost>>>,

    /// Bundled UI extension, set during init.
    pub ui_extension_id: RwLock<Option<ExtensionId>>,

    /// Live windows in creation order.
    pub windows: Mutex<Vec<TabbedWindow>>,

    /// Sending half of the event queue.
    pub events: EventSink,

    /// Receiving half, absent while [`Browser::run`] holds it.
    pub receiver: Mutex<Option<UnboundedReceiver<ShellEvent>>>,

    /// Set while init runs and after it succeeds.
    pub initialized: AtomicBool,

    /// Set once the browser asked the runtime to quit.
    pub quit: AtomicBool,
}

// ============================================================================
// Browser
// ============================================================================

/// The process-wide browser controller.
///
/// There is no global accessor: everything that needs the browser receives
/// a handle. Cloning the handle does not create a new browser.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use tabbed_shell::Browser;
/// use tabbed_shell::runtime::headless::HeadlessRuntime;
///
/// # async fn example() -> tabbed_shell::Result<()> {
/// let browser = Browser::builder()
///     .ui_extension("./ui")
///     .build(Arc::new(HeadlessRuntime::new("shell")))?;
///
/// browser.init().await?;
/// browser.run().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Browser {
    /// Shared inner state.
    pub(crate) inner: Arc<BrowserInner>,
}

// ============================================================================
// Browser - Display
// ============================================================================

impl fmt::Debug for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Browser")
            .field("runtime", &self.inner.runtime.runtime_name())
            .field("window_count", &self.window_count())
            .field("ui_extension_id", &self.ui_extension_id())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Browser - Constructor
// ============================================================================

impl Browser {
    /// Creates a configuration builder for the browser.
    #[inline]
    #[must_use]
    pub fn builder() -> BrowserBuilder {
        BrowserBuilder::new()
    }

    /// Creates the controller and connects the runtime to its event queue.
    pub(crate) fn new(
        runtime: Arc<dyn Runtime>,
        config: BrowserConfig,
        menus: Arc<dyn MenuBuilder>,
    ) -> Self {
        let (events, receiver) = EventSink::channel();
        runtime.set_event_sink(events.clone());
        let session = runtime.default_session();

        debug!(
            runtime = runtime.runtime_name(),
            ui_extension = %config.ui_extension.display(),
            debug = config.debug,
            "Browser created"
        );

        Self {
            inner: Arc::new(BrowserInner {
                runtime,
                config,
                menus,
                session,
                extensions: RwLock::new(None),
                ui_extension_id: RwLock::new(None),
                windows: Mutex::new(Vec::new()),
                events,
                receiver: Mutex::new(Some(receiver)),
                initialized: AtomicBool::new(false),
                quit: AtomicBool::new(false),
            }),
        }
    }
}

// ============================================================================
// Browser - Accessors
// ============================================================================

impl Browser {
    /// Returns the validated configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &BrowserConfig {
        &self.inner.config
    }

    /// Returns the content-hosting runtime.
    #[inline]
    #[must_use]
    pub fn runtime(&self) -> &Arc<dyn Runtime> {
        &self.inner.runtime
    }

    /// Returns the shared browsing session.
    #[inline]
    #[must_use]
    pub fn session(&self) -> &Arc<dyn Session> {
        &self.inner.session
    }

    /// Returns the extension host, once initialized.
    #[must_use]
    pub fn extensions(&self) -> Option<Arc<dyn ExtensionHost>> {
        self.inner.extensions.read().clone()
    }

    /// Returns the bundled UI extension's ID, once loaded.
    #[must_use]
    pub fn ui_extension_id(&self) -> Option<ExtensionId> {
        self.inner.ui_extension_id.read().clone()
    }

    /// Returns the new-tab page URL, once the UI extension is loaded.
    #[must_use]
    pub fn new_tab_url(&self) -> Option<String> {
        let id = self.ui_extension_id()?;
        id.resource_url(NEW_TAB_PAGE).ok()
    }

    /// Returns a sender for the browser's event queue.
    #[inline]
    #[must_use]
    pub fn events(&self) -> EventSink {
        self.inner.events.clone()
    }

    /// Returns the number of live windows.
    #[inline]
    #[must_use]
    pub fn window_count(&self) -> usize {
        self.inner.windows.lock().len()
    }

    /// Returns the live windows in creation order.
    #[must_use]
    pub fn windows(&self) -> Vec<TabbedWindow> {
        self.inner.windows.lock().clone()
    }

    /// Looks up a live window by ID.
    #[must_use]
    pub fn window(&self, id: WindowId) -> Option<TabbedWindow> {
        self.windows().into_iter().find(|window| window.id() == id)
    }

    /// Returns `true` once the browser asked the runtime to quit.
    #[inline]
    #[must_use]
    pub fn is_quit(&self) -> bool {
        self.inner.quit.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Browser - Initialization
// ============================================================================

impl Browser {
    /// Initializes the session, extensions, and first window.
    ///
    /// Runs once, after the runtime is ready. The first window's initial tab
    /// is created when the event queue is next drained. A failed init drops
    /// the extension host and may be retried.
    ///
    /// # Errors
    ///
    /// - [`Error::Runtime`] if init already succeeded or is still running
    /// - [`Error::Extension`] if the bundled UI extension cannot be loaded
    /// - [`Error::Io`] if the installed-extensions root cannot be read
    pub async fn init(&self) -> Result<()> {
        if self.inner.initialized.swap(true, Ordering::SeqCst) {
            return Err(Error::runtime("Browser already initialized"));
        }

        let result = self.init_once().await;
        if let Err(e) = &result {
            warn!(error = %e, "Browser initialization failed");
            *self.inner.extensions.write() = None;
            *self.inner.ui_extension_id.write() = None;
            self.inner.initialized.store(false, Ordering::SeqCst);
        }
        result
    }

    async fn init_once(&self) -> Result<()> {
        self.init_session()?;
        self.inner.menus.setup_menu(self);
        self.inner.session.set_preloads(&self.inner.config.preloads);

        let delegate = Arc::new(BrowserDelegate::new(Arc::downgrade(&self.inner)));
        let extensions = self
            .inner
            .runtime
            .create_extension_host(Arc::clone(&self.inner.session), delegate);
        *self.inner.extensions.write() = Some(Arc::clone(&extensions));

        let ui = self
            .inner
            .session
            .load_extension(&self.inner.config.ui_extension)
            .await?;
        info!(extension_id = %ui.id, name = %ui.name, "UI extension loaded");
        *self.inner.ui_extension_id.write() = Some(ui.id.clone());

        let new_tab_url = ui.id.resource_url(NEW_TAB_PAGE)?;

        let installed =
            load_extensions(self.inner.session.as_ref(), &self.inner.config.extensions_dir)
                .await?;
        for extension in &installed {
            extensions.add_extension(extension);
        }
        info!(count = installed.len(), "Installed extensions loaded");

        self.create_window(Some(new_tab_url))?;
        Ok(())
    }

    /// Strips runtime and application tokens from the session's user agent.
    fn init_session(&self) -> Result<()> {
        let runtime = &self.inner.runtime;
        let user_agent = self.inner.session.user_agent();
        let sanitized =
            sanitize_user_agent(&user_agent, &[runtime.runtime_name(), runtime.app_name()])?;

        debug!(user_agent = %sanitized, "Session user agent set");
        self.inner.session.set_user_agent(&sanitized);
        Ok(())
    }
}

// ============================================================================
// Browser - Window Management
// ============================================================================

impl Browser {
    /// Opens a window whose tabs load `initial_url`.
    ///
    /// Opens a detached inspector on the shell surface in debug mode.
    ///
    /// # Errors
    ///
    /// - [`Error::NotReady`] before the UI extension is loaded
    /// - [`Error::Runtime`] if the platform refuses the window
    pub fn create_window(&self, initial_url: Option<String>) -> Result<TabbedWindow> {
        let ui_extension_id = self.ui_extension_id().ok_or_else(|| {
            Error::not_ready("UI extension must be loaded before windows are created")
        })?;
        let extensions = self
            .extensions()
            .ok_or_else(|| Error::not_ready("Extension host is not initialized"))?;

        let window = TabbedWindow::open(
            self.inner.runtime.as_ref(),
            WindowConfig {
                initial_url,
                options: self.inner.config.window_options.clone(),
                extensions,
                session: Arc::clone(&self.inner.session),
                ui_extension_id,
                events: self.inner.events.clone(),
            },
        )?;

        self.inner.windows.lock().push(window.clone());

        if self.inner.config.debug {
            window.surface().open_devtools(DevToolsOptions::detached());
        }

        info!(window_id = %window.id(), initial_url = ?window.initial_url(), "Window created");
        Ok(window)
    }

    /// Returns the window with input focus, or the first window.
    #[must_use]
    pub fn get_focused_window(&self) -> Option<TabbedWindow> {
        let windows = self.windows();
        let focused = self.inner.runtime.focused_window();

        focused
            .and_then(|id| windows.iter().find(|window| window.id() == id))
            .or_else(|| windows.first())
            .cloned()
    }

    /// Resolves the live window a surface belongs to.
    ///
    /// Returns `Ok(None)` when the parent window is not one of the
    /// browser's windows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedSurface`] for surface types without a
    /// resolution rule.
    pub fn window_from_surface(&self, surface: &SurfaceHandle) -> Result<Option<TabbedWindow>> {
        let parent = match surface.surface_type() {
            SurfaceType::Window => surface.host_window(),
            SurfaceType::BrowserView | SurfaceType::WebView => surface.owner_window(),
            SurfaceType::BackgroundPage => {
                return Ok(self.get_focused_window());
            }
            other => return Err(Error::unsupported_surface(other.as_str())),
        };

        Ok(parent.and_then(|id| self.window(id)))
    }

    /// Resolves the window of the surface that issued a request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedSurface`] if the sender's type cannot be resolved.
    pub fn ipc_window(&self, ctx: &RequestContext) -> Result<Option<TabbedWindow>> {
        match &ctx.sender {
            Some(sender) => self.window_from_surface(sender),
            None => Ok(None),
        }
    }

    /// Asks the runtime to quit.
    pub fn destroy(&self) {
        info!("Quitting");
        self.inner.quit.store(true, Ordering::SeqCst);
        self.inner.runtime.quit();
    }
}

// ============================================================================
// Browser - Event Loop
// ============================================================================

impl Browser {
    /// Handles queued events in arrival order until the browser quits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Runtime`] if the loop is already running.
    ///
    /// Dropping the returned future hands the queue back, so a cancelled
    /// loop can be drained or restarted.
    pub async fn run(&self) -> Result<()> {
        let mut queue = QueueGuard::take(&self.inner.receiver)
            .ok_or_else(|| Error::runtime("Event loop is already running"))?;

        info!("Event loop started");
        while !self.is_quit() {
            let Some(event) = queue.recv().await else {
                break;
            };
            self.dispatch(event);
        }
        info!("Event loop stopped");
        Ok(())
    }

    /// Handles every event queued right now, including events queued while
    /// handling them.
    ///
    /// Returns the number of events handled. Returns 0 while [`run`](Self::run)
    /// owns the queue.
    pub fn dispatch_pending(&self) -> usize {
        let Some(mut queue) = QueueGuard::take(&self.inner.receiver) else {
            return 0;
        };

        let mut handled = 0;
        while let Some(event) = queue.try_recv() {
            self.dispatch(event);
            handled += 1;
        }
        handled
    }

    /// Handles one event, logging failures.
    fn dispatch(&self, event: ShellEvent) {
        let name = event.name();
        if let Err(e) = self.handle_event(event) {
            warn!(event = name, error = %e, "Event handling failed");
        }
    }

    fn handle_event(&self, event: ShellEvent) -> Result<()> {
        match event {
            ShellEvent::SurfaceCreated(surface) => {
                self.on_surface_created(&surface);
                Ok(())
            }
            ShellEvent::NewTarget(request) => self.on_new_target(&request),
            ShellEvent::ContextMenu { surface, params } => {
                self.on_context_menu(&surface, &params);
                Ok(())
            }
            ShellEvent::WindowClosed(id) => {
                self.on_window_closed(id);
                Ok(())
            }
            ShellEvent::WindowAllClosed => {
                self.on_window_all_closed();
                Ok(())
            }
            ShellEvent::Activate => self.on_activate(),
            ShellEvent::InitialTab(id) => self.on_initial_tab(id),
        }
    }
}

// ============================================================================
// QueueGuard
// ============================================================================

/// Borrows the event receiver out of its slot and puts it back on drop.
struct QueueGuard<'a> {
    slot: &'a Mutex<Option<UnboundedReceiver<ShellEvent>>>,
    receiver: Option<UnboundedReceiver<ShellEvent>>,
}

impl<'a> QueueGuard<'a> {
    /// Returns `None` while another guard holds the receiver.
    fn take(slot: &'a Mutex<Option<UnboundedReceiver<ShellEvent>>>) -> Option<Self> {
        let receiver = slot.lock().take()?;
        Some(Self {
            slot,
            receiver: Some(receiver),
        })
    }

    async fn recv(&mut self) -> Option<ShellEvent> {
        match self.receiver.as_mut() {
            Some(receiver) => receiver.recv().await,
            None => None,
        }
    }

    fn try_recv(&mut self) -> Option<ShellEvent> {
        self.receiver.as_mut()?.try_recv().ok()
    }
}

impl Drop for QueueGuard<'_> {
    fn drop(&mut self) {
        if let Some(receiver) = self.receiver.take() {
            *self.slot.lock() = Some(receiver);
        }
    }
}

// ============================================================================
// Browser - Event Handlers
// ============================================================================

impl Browser {
    fn on_surface_created(&self, surface: &SurfaceHandle) {
        let surface_type = surface.surface_type();
        info!(surface_id = %surface.id(), surface_type = %surface_type, url = %surface.url(), "Surface created");

        if surface_type == SurfaceType::BackgroundPage {
            surface.open_devtools(DevToolsOptions::detached_active());
        }
    }

    fn on_new_target(&self, request: &NewTargetRequest) -> Result<()> {
        if !request.disposition.opens_tab() {
            debug!(disposition = %request.disposition, url = %request.url, "Ignoring new target");
            return Ok(());
        }

        let ctx = RequestContext::from_sender(Arc::clone(&request.source));
        let window = self
            .ipc_window(&ctx)?
            .ok_or_else(|| Error::no_target_window("new target"))?;

        let tab = window.tabs().create(None)?;
        tab.load_url(&request.url);

        if request.disposition == Disposition::ForegroundTab {
            window.tabs().select(tab.id());
        }

        debug!(
            window_id = %window.id(),
            tab_id = %tab.id(),
            disposition = %request.disposition,
            "New target opened in tab"
        );
        Ok(())
    }

    fn on_context_menu(&self, surface: &SurfaceHandle, params: &ContextMenuParams) {
        self.inner.menus.setup_context_menu(self, surface, params);
    }

    fn on_window_closed(&self, id: WindowId) {
        let removed = {
            let mut windows = self.inner.windows.lock();
            windows
                .iter()
                .position(|window| window.id() == id)
                .map(|position| windows.remove(position))
        };

        let Some(window) = removed else {
            debug!(window_id = %id, "Closed window was not tracked");
            return;
        };

        let tabs = window.close_tabs();
        if let Some(extensions) = self.extensions() {
            extensions.remove_extension_host(window.surface());
        }
        info!(window_id = %id, tabs, remaining = self.window_count(), "Window closed");
    }

    fn on_window_all_closed(&self) {
        if self.inner.runtime.stays_resident() {
            debug!("All windows closed, staying resident");
        } else {
            self.destroy();
        }
    }

    fn on_activate(&self) -> Result<()> {
        if self.window_count() > 0 {
            return Ok(());
        }
        let Some(new_tab_url) = self.new_tab_url() else {
            debug!("Activated before init, no window created");
            return Ok(());
        };

        self.create_window(Some(new_tab_url))?;
        Ok(())
    }

    fn on_initial_tab(&self, id: WindowId) -> Result<()> {
        match self.window(id) {
            Some(window) => {
                window.bootstrap_initial_tab()?;
                Ok(())
            }
            None => {
                debug!(window_id = %id, "Window closed before its initial tab");
                Ok(())
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::Path;

    use crate::extensions::{CreateTabDetails, MANIFEST_FILE};
    use crate::runtime::headless::{HeadlessRuntime, HostCall};
    use crate::runtime::{ContentSurface, WindowOptions};

    fn write_manifest(dir: &Path, json: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(dir.join(MANIFEST_FILE), json).unwrap();
    }

    /// `ui/` plus one installed extension with a background page.
    fn fixture() -> tempfile::TempDir {
        let root = tempfile::tempdir().expect("create temp dir");
        write_manifest(&root.path().join("ui"), r#"{"name":"Shell UI","version":"1.0"}"#);
        write_manifest(
            &root.path().join("extensions").join("reader"),
            r#"{"name":"Reader","version":"2.0","background":{"scripts":["bg.js"]}}"#,
        );
        root
    }

    async fn start(runtime: &Arc<HeadlessRuntime>, root: &Path) -> Browser {
        let browser = Browser::builder()
            .ui_extension(root.join("ui"))
            .debug(false)
            .build(runtime.clone())
            .unwrap();
        browser.init().await.unwrap();
        browser.dispatch_pending();
        browser
    }

    fn new_target(source: &SurfaceHandle, disposition: Disposition) -> ShellEvent {
        ShellEvent::NewTarget(NewTargetRequest {
            source: Arc::clone(source),
            url: "https://target.example/".to_string(),
            frame_name: String::new(),
            disposition,
        })
    }

    #[tokio::test]
    async fn test_init_opens_one_window_with_new_tab() {
        let root = fixture();
        let runtime = Arc::new(HeadlessRuntime::new("shell"));
        let browser = start(&runtime, root.path()).await;

        assert_eq!(browser.window_count(), 1);
        let window = &browser.windows()[0];
        assert_eq!(window.tab_count(), 1);

        let tab = window.focused_tab().unwrap();
        assert_eq!(Some(tab.url()), browser.new_tab_url());
        assert!(
            window
                .surface()
                .url()
                .ends_with(&format!("{}/webui.html", browser.ui_extension_id().unwrap()))
        );
    }

    #[tokio::test]
    async fn test_init_sanitizes_user_agent() {
        let root = fixture();
        let runtime = Arc::new(HeadlessRuntime::new("shell"));
        let browser = start(&runtime, root.path()).await;

        let user_agent = browser.session().user_agent();
        assert!(!user_agent.contains("Headless/"));
        assert!(!user_agent.contains("shell/"));
        assert!(user_agent.contains("Chrome/"));
    }

    #[tokio::test]
    async fn test_init_registers_extensions_and_tabs_with_host() {
        let root = fixture();
        let runtime = Arc::new(HeadlessRuntime::new("shell"));
        let browser = start(&runtime, root.path()).await;

        let window = &browser.windows()[0];
        let tab = window.focused_tab().unwrap();
        let calls = runtime.extension_host().unwrap().calls();

        assert!(matches!(calls[0], HostCall::AddExtension(_)));
        assert_eq!(calls[1], HostCall::AddExtensionHost(window.surface().id()));
        assert_eq!(
            calls[2..],
            [
                HostCall::AddTab {
                    tab: tab.surface().id(),
                    window: window.id(),
                },
                HostCall::SelectTab(tab.surface().id()),
            ]
        );
    }

    #[tokio::test]
    async fn test_background_page_gets_inspector() {
        let root = fixture();
        let runtime = Arc::new(HeadlessRuntime::new("shell"));
        let _browser = start(&runtime, root.path()).await;

        let pages: Vec<_> = runtime
            .surfaces()
            .into_iter()
            .filter(|surface| surface.surface_type() == SurfaceType::BackgroundPage)
            .collect();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].devtools_opened(), vec![DevToolsOptions::detached_active()]);
    }

    #[tokio::test]
    async fn test_debug_opens_shell_inspector() {
        let root = fixture();
        let runtime = Arc::new(HeadlessRuntime::new("shell"));
        let browser = Browser::builder()
            .ui_extension(root.path().join("ui"))
            .debug(true)
            .build(runtime.clone())
            .unwrap();
        browser.init().await.unwrap();

        let shell = runtime
            .surface(browser.windows()[0].surface().id())
            .unwrap();
        assert_eq!(shell.devtools_opened(), vec![DevToolsOptions::detached()]);
    }

    #[tokio::test]
    async fn test_init_twice_fails() {
        let root = fixture();
        let runtime = Arc::new(HeadlessRuntime::new("shell"));
        let browser = start(&runtime, root.path()).await;

        let err = browser.init().await.unwrap_err();
        assert!(matches!(err, Error::Runtime { .. }));
        assert_eq!(browser.window_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_init_can_be_retried() {
        let root = tempfile::tempdir().expect("create temp dir");
        let ui = root.path().join("ui");
        std::fs::create_dir_all(&ui).unwrap();

        let runtime = Arc::new(HeadlessRuntime::new("shell"));
        let browser = Browser::builder()
            .ui_extension(&ui)
            .debug(false)
            .build(runtime.clone())
            .unwrap();

        let err = browser.init().await.unwrap_err();
        assert!(err.is_extension_error());
        assert!(browser.extensions().is_none());
        assert!(browser.ui_extension_id().is_none());
        assert_eq!(browser.window_count(), 0);

        write_manifest(&ui, r#"{"name":"Shell UI","version":"1.0"}"#);
        browser.init().await.unwrap();
        browser.dispatch_pending();

        assert!(browser.extensions().is_some());
        assert_eq!(browser.window_count(), 1);
        assert_eq!(browser.windows()[0].tab_count(), 1);
    }

    #[test]
    fn test_create_window_before_init_is_not_ready() {
        let root = fixture();
        let runtime = Arc::new(HeadlessRuntime::new("shell"));
        let browser = Browser::builder()
            .ui_extension(root.path().join("ui"))
            .build(runtime)
            .unwrap();

        let err = browser.create_window(None).unwrap_err();
        assert!(matches!(err, Error::NotReady { .. }));
    }

    #[tokio::test]
    async fn test_window_from_surface_inverts_ownership() {
        let root = fixture();
        let runtime = Arc::new(HeadlessRuntime::new("shell"));
        let browser = start(&runtime, root.path()).await;
        let second = browser.create_window(None).unwrap();
        browser.dispatch_pending();

        for window in browser.windows() {
            let shell = browser.window_from_surface(window.surface()).unwrap().unwrap();
            assert_eq!(shell.id(), window.id());

            let tab = window.focused_tab().unwrap();
            let owner = browser.window_from_surface(tab.surface()).unwrap().unwrap();
            assert_eq!(owner.id(), window.id());
        }

        runtime.focus(Some(second.id()));
        let background: SurfaceHandle =
            runtime.create_surface(SurfaceType::BackgroundPage, "", None);
        let focused = browser.window_from_surface(&background).unwrap().unwrap();
        assert_eq!(focused.id(), second.id());
    }

    #[tokio::test]
    async fn test_background_page_falls_back_to_first_window() {
        let root = fixture();
        let runtime = Arc::new(HeadlessRuntime::new("shell"));
        let browser = start(&runtime, root.path()).await;
        runtime.focus(None);

        let background: SurfaceHandle =
            runtime.create_surface(SurfaceType::BackgroundPage, "", None);
        let window = browser.window_from_surface(&background).unwrap().unwrap();
        assert_eq!(window.id(), browser.windows()[0].id());
    }

    #[tokio::test]
    async fn test_window_from_surface_rejects_unknown_type() {
        let root = fixture();
        let runtime = Arc::new(HeadlessRuntime::new("shell"));
        let browser = start(&runtime, root.path()).await;

        let remote: SurfaceHandle = runtime.create_surface(SurfaceType::Remote, "", None);
        let err = browser.window_from_surface(&remote).unwrap_err();
        assert!(err.is_contract_violation());
        assert!(err.to_string().contains("'remote'"));
    }

    #[tokio::test]
    async fn test_window_from_surface_of_foreign_window_is_none() {
        let root = fixture();
        let runtime = Arc::new(HeadlessRuntime::new("shell"));
        let browser = start(&runtime, root.path()).await;

        let foreign = runtime
            .create_window(&WindowOptions::browser_defaults())
            .unwrap();
        let view = foreign.create_view().unwrap();
        assert!(browser.window_from_surface(&view).unwrap().is_none());
        assert!(browser.ipc_window(&RequestContext::detached()).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_focused_window_prefers_focus() {
        let root = fixture();
        let runtime = Arc::new(HeadlessRuntime::new("shell"));
        let browser = start(&runtime, root.path()).await;
        let first = browser.windows()[0].clone();
        let second = browser.create_window(None).unwrap();

        assert_eq!(browser.get_focused_window().unwrap().id(), second.id());
        runtime.focus(Some(first.id()));
        assert_eq!(browser.get_focused_window().unwrap().id(), first.id());
        runtime.focus(None);
        assert_eq!(browser.get_focused_window().unwrap().id(), first.id());
    }

    #[tokio::test]
    async fn test_background_tab_keeps_selection() {
        let root = fixture();
        let runtime = Arc::new(HeadlessRuntime::new("shell"));
        let browser = start(&runtime, root.path()).await;
        let window = browser.windows()[0].clone();
        let first = window.focused_tab().unwrap();

        runtime.emit(new_target(first.surface(), Disposition::BackgroundTab));
        browser.dispatch_pending();

        assert_eq!(window.tab_count(), 2);
        assert_eq!(window.focused_tab(), Some(first));
        let opened = window.tabs().to_vec().pop().unwrap();
        assert_eq!(opened.url(), "https://target.example/");
    }

    #[tokio::test]
    async fn test_foreground_tab_takes_selection() {
        let root = fixture();
        let runtime = Arc::new(HeadlessRuntime::new("shell"));
        let browser = start(&runtime, root.path()).await;
        let window = browser.windows()[0].clone();
        let first = window.focused_tab().unwrap();

        runtime.emit(new_target(first.surface(), Disposition::ForegroundTab));
        browser.dispatch_pending();

        let selected = window.focused_tab().unwrap();
        assert_ne!(selected, first);
        assert_eq!(selected.url(), "https://target.example/");
    }

    #[tokio::test]
    async fn test_new_window_disposition_opens_tab() {
        let root = fixture();
        let runtime = Arc::new(HeadlessRuntime::new("shell"));
        let browser = start(&runtime, root.path()).await;
        let window = browser.windows()[0].clone();
        let first = window.focused_tab().unwrap();

        runtime.emit(new_target(first.surface(), Disposition::NewWindow));
        browser.dispatch_pending();

        assert_eq!(browser.window_count(), 1);
        assert_eq!(window.tab_count(), 2);
    }

    #[tokio::test]
    async fn test_unsupported_disposition_ignored() {
        let root = fixture();
        let runtime = Arc::new(HeadlessRuntime::new("shell"));
        let browser = start(&runtime, root.path()).await;
        let window = browser.windows()[0].clone();
        let first = window.focused_tab().unwrap();

        runtime.emit(new_target(first.surface(), Disposition::SaveToDisk));
        runtime.emit(new_target(first.surface(), Disposition::parse("mystery")));
        browser.dispatch_pending();

        assert_eq!(window.tab_count(), 1);
    }

    #[tokio::test]
    async fn test_last_window_closed_quits() {
        let root = fixture();
        let runtime = Arc::new(HeadlessRuntime::new("shell"));
        let browser = start(&runtime, root.path()).await;
        let window = browser.windows()[0].clone();
        let tab = window.focused_tab().unwrap();

        window.close();
        browser.dispatch_pending();

        assert_eq!(browser.window_count(), 0);
        assert!(tab.surface().is_destroyed());
        assert!(runtime.quit_requested());
        assert!(browser.is_quit());
        let calls = runtime.extension_host().unwrap().calls();
        assert_eq!(
            calls[calls.len() - 2..],
            [
                HostCall::RemoveTab(tab.surface().id()),
                HostCall::RemoveExtensionHost(window.surface().id()),
            ]
        );
    }

    #[tokio::test]
    async fn test_stay_resident_then_activate() {
        let root = fixture();
        let runtime = Arc::new(HeadlessRuntime::new("shell").with_stays_resident(true));
        let browser = start(&runtime, root.path()).await;

        browser.windows()[0].close();
        browser.dispatch_pending();
        assert_eq!(browser.window_count(), 0);
        assert!(!runtime.quit_requested());

        runtime.emit(ShellEvent::Activate);
        browser.dispatch_pending();

        assert_eq!(browser.window_count(), 1);
        let tab = browser.windows()[0].focused_tab().unwrap();
        assert_eq!(Some(tab.url()), browser.new_tab_url());
    }

    #[tokio::test]
    async fn test_initial_tab_of_closed_window_is_skipped() {
        let root = fixture();
        let runtime = Arc::new(HeadlessRuntime::new("shell"));
        let browser = start(&runtime, root.path()).await;

        let gone = WindowId::new(9999).unwrap();
        runtime.emit(ShellEvent::InitialTab(gone));
        assert_eq!(browser.dispatch_pending(), 1);

        assert_eq!(browser.window_count(), 1);
        assert_eq!(browser.windows()[0].tab_count(), 1);
    }

    #[tokio::test]
    async fn test_context_menu_reaches_menu_builder() {
        #[derive(Default)]
        struct RecordingMenus {
            menus: Mutex<usize>,
            context: Mutex<Vec<String>>,
        }

        impl MenuBuilder for RecordingMenus {
            fn setup_menu(&self, _browser: &Browser) {
                *self.menus.lock() += 1;
            }

            fn setup_context_menu(
                &self,
                _browser: &Browser,
                _surface: &SurfaceHandle,
                params: &ContextMenuParams,
            ) {
                self.context.lock().push(params.page_url.clone());
            }
        }

        let root = fixture();
        let runtime = Arc::new(HeadlessRuntime::new("shell"));
        let menus = Arc::new(RecordingMenus::default());
        let browser = Browser::builder()
            .ui_extension(root.path().join("ui"))
            .menus(menus.clone())
            .build(runtime.clone())
            .unwrap();
        browser.init().await.unwrap();
        browser.dispatch_pending();

        let tab = browser.windows()[0].focused_tab().unwrap();
        runtime.emit(ShellEvent::ContextMenu {
            surface: Arc::clone(tab.surface()),
            params: ContextMenuParams {
                page_url: "https://page.example/".to_string(),
                ..ContextMenuParams::default()
            },
        });
        browser.dispatch_pending();

        assert_eq!(*menus.menus.lock(), 1);
        assert_eq!(*menus.context.lock(), vec!["https://page.example/".to_string()]);
    }

    #[tokio::test]
    async fn test_run_stops_after_quit() {
        let root = fixture();
        let runtime = Arc::new(HeadlessRuntime::new("shell"));
        let browser = start(&runtime, root.path()).await;

        browser.windows()[0].close();
        browser.run().await.unwrap();

        assert!(browser.is_quit());
        assert_eq!(browser.dispatch_pending(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_run_returns_queue() {
        let root = fixture();
        let runtime = Arc::new(HeadlessRuntime::new("shell").with_stays_resident(true));
        let browser = start(&runtime, root.path()).await;

        let elapsed =
            tokio::time::timeout(std::time::Duration::from_millis(20), browser.run()).await;
        assert!(elapsed.is_err());

        browser.windows()[0].close();
        assert!(browser.events().send(ShellEvent::Activate));
        assert!(browser.dispatch_pending() >= 3);
        assert_eq!(browser.window_count(), 1);
        assert_eq!(browser.windows()[0].tab_count(), 1);

        browser.destroy();
        browser.run().await.unwrap();
    }

    #[tokio::test]
    async fn test_host_create_tab_inactive_keeps_selection() {
        let root = fixture();
        let runtime = Arc::new(HeadlessRuntime::new("shell"));
        let browser = start(&runtime, root.path()).await;
        let window = browser.windows()[0].clone();
        let first = window.focused_tab().unwrap();

        let details = CreateTabDetails::default()
            .with_window(window.id())
            .with_url("https://example.com")
            .with_active(false);
        let surface = runtime
            .extension_host()
            .unwrap()
            .tabs_create(None, &details)
            .unwrap();

        assert_eq!(window.tab_count(), 2);
        assert_eq!(window.focused_tab(), Some(first));
        assert_eq!(surface.url(), "https://example.com");
    }
}
