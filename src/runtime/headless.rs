//! In-memory runtime.
//!
//! [`HeadlessRuntime`] implements every runtime trait without a display:
//! windows, surfaces, the session, and the extension host are plain records.
//! Every call the shell makes into the extension host is captured as a
//! [`HostCall`], so embedders and tests can check what the host observed.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use tabbed_shell::Browser;
//! use tabbed_shell::runtime::headless::HeadlessRuntime;
//!
//! # async fn example() -> tabbed_shell::Result<()> {
//! let runtime = Arc::new(HeadlessRuntime::new("shell"));
//! let browser = Browser::builder()
//!     .ui_extension("./ui")
//!     .build(runtime.clone())?;
//!
//! browser.init().await?;
//! browser.dispatch_pending();
//! assert_eq!(browser.window_count(), 1);
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::extensions::{
    CreateTabDetails, ExtensionHost, ExtensionInfo, ExtensionsDelegate, Manifest,
    RequestContext,
};
use crate::identifiers::{ExtensionId, IdAllocator, SurfaceId, WindowId};

use super::{
    ContentSurface, DevToolsOptions, EventSink, PlatformWindow, Runtime, Session, ShellEvent,
    SurfaceHandle, SurfaceType, WindowOptions,
};

// ============================================================================
// Constants
// ============================================================================

/// Product token the headless runtime adds to its user agent.
pub const RUNTIME_NAME: &str = "Headless";

/// Resource name of a generated background page.
const BACKGROUND_PAGE: &str = "_generated_background_page.html";

// ============================================================================
// Shared
// ============================================================================

/// State shared by the runtime, its windows, and its session.
struct Shared {
    ids: IdAllocator,
    surfaces: RwLock<FxHashMap<SurfaceId, Arc<HeadlessSurface>>>,
    open_windows: Mutex<Vec<WindowId>>,
    focused: Mutex<Option<WindowId>>,
    sink: Mutex<Option<EventSink>>,
}

impl Shared {
    fn new() -> Self {
        Self {
            ids: IdAllocator::new(),
            surfaces: RwLock::new(FxHashMap::default()),
            open_windows: Mutex::new(Vec::new()),
            focused: Mutex::new(None),
            sink: Mutex::new(None),
        }
    }

    /// Creates, registers, and announces a surface.
    fn new_surface(
        &self,
        kind: SurfaceType,
        url: &str,
        host_window: Option<WindowId>,
        owner_window: Option<WindowId>,
    ) -> Arc<HeadlessSurface> {
        let surface = Arc::new(HeadlessSurface {
            id: self.ids.next_surface(),
            kind,
            url: Mutex::new(url.to_string()),
            history: Mutex::new(Vec::new()),
            host_window,
            owner_window,
            devtools: Mutex::new(Vec::new()),
            destroyed: AtomicBool::new(false),
        });

        self.surfaces.write().insert(surface.id, Arc::clone(&surface));
        self.emit(ShellEvent::SurfaceCreated(surface.clone()));
        surface
    }

    fn emit(&self, event: ShellEvent) -> bool {
        let sink = self.sink.lock().clone();
        match sink {
            Some(sink) => sink.send(event),
            None => false,
        }
    }
}

// ============================================================================
// HeadlessSurface
// ============================================================================

/// An in-memory content-host surface.
pub struct HeadlessSurface {
    id: SurfaceId,
    kind: SurfaceType,
    url: Mutex<String>,
    history: Mutex<Vec<String>>,
    host_window: Option<WindowId>,
    owner_window: Option<WindowId>,
    devtools: Mutex<Vec<DevToolsOptions>>,
    destroyed: AtomicBool,
}

impl HeadlessSurface {
    /// Every URL this surface was asked to load, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.history.lock().clone()
    }

    /// Every inspector panel opened for this surface.
    #[must_use]
    pub fn devtools_opened(&self) -> Vec<DevToolsOptions> {
        self.devtools.lock().clone()
    }
}

impl fmt::Debug for HeadlessSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessSurface")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("url", &*self.url.lock())
            .finish_non_exhaustive()
    }
}

impl ContentSurface for HeadlessSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn surface_type(&self) -> SurfaceType {
        self.kind
    }

    fn url(&self) -> String {
        self.url.lock().clone()
    }

    fn load_url(&self, url: &str) {
        if self.is_destroyed() {
            debug!(surface_id = %self.id, url, "Ignoring navigation of destroyed surface");
            return;
        }
        *self.url.lock() = url.to_string();
        self.history.lock().push(url.to_string());
    }

    fn host_window(&self) -> Option<WindowId> {
        self.host_window
    }

    fn owner_window(&self) -> Option<WindowId> {
        self.owner_window
    }

    fn open_devtools(&self, options: DevToolsOptions) {
        self.devtools.lock().push(options);
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    fn destroy(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
    }
}

// ============================================================================
// HeadlessWindow
// ============================================================================

/// An in-memory platform window.
pub struct HeadlessWindow {
    id: WindowId,
    options: WindowOptions,
    shell: Arc<HeadlessSurface>,
    shared: Arc<Shared>,
    visible_view: Mutex<Option<SurfaceId>>,
    closed: AtomicBool,
}

impl HeadlessWindow {
    /// The options the window was created with.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &WindowOptions {
        &self.options
    }

    /// The view currently shown in front.
    #[must_use]
    pub fn visible_view(&self) -> Option<SurfaceId> {
        *self.visible_view.lock()
    }

    /// Returns `true` once the window has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for HeadlessWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessWindow")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl PlatformWindow for HeadlessWindow {
    fn id(&self) -> WindowId {
        self.id
    }

    fn surface(&self) -> SurfaceHandle {
        self.shell.clone()
    }

    fn is_focused(&self) -> bool {
        *self.shared.focused.lock() == Some(self.id)
    }

    fn create_view(&self) -> Result<SurfaceHandle> {
        if self.is_closed() {
            return Err(Error::runtime(format!("Window {} is closed", self.id)));
        }
        let view = self
            .shared
            .new_surface(SurfaceType::BrowserView, "", None, Some(self.id));
        Ok(view)
    }

    fn show_view(&self, view: &SurfaceHandle) {
        *self.visible_view.lock() = Some(view.id());
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shell.destroy();

        let remaining = {
            let mut open = self.shared.open_windows.lock();
            open.retain(|id| *id != self.id);
            open.len()
        };
        {
            let mut focused = self.shared.focused.lock();
            if *focused == Some(self.id) {
                *focused = None;
            }
        }

        debug!(window_id = %self.id, remaining, "Headless window closed");
        self.shared.emit(ShellEvent::WindowClosed(self.id));
        if remaining == 0 {
            self.shared.emit(ShellEvent::WindowAllClosed);
        }
    }
}

// ============================================================================
// HeadlessSession
// ============================================================================

/// An in-memory browsing session.
pub struct HeadlessSession {
    shared: Arc<Shared>,
    user_agent: Mutex<String>,
    preloads: Mutex<Vec<PathBuf>>,
    extensions: RwLock<Vec<ExtensionInfo>>,
}

impl HeadlessSession {
    fn new(shared: Arc<Shared>, app_name: &str) -> Self {
        let user_agent = format!(
            "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
             {app_name}/0.1.0 Chrome/120.0.6099.291 {RUNTIME_NAME}/1.0.0 Safari/537.36"
        );
        Self {
            shared,
            user_agent: Mutex::new(user_agent),
            preloads: Mutex::new(Vec::new()),
            extensions: RwLock::new(Vec::new()),
        }
    }

    /// Configured preload scripts.
    #[must_use]
    pub fn preloads(&self) -> Vec<PathBuf> {
        self.preloads.lock().clone()
    }

    /// Extensions loaded so far, in load order.
    #[must_use]
    pub fn extensions(&self) -> Vec<ExtensionInfo> {
        self.extensions.read().clone()
    }
}

#[async_trait]
impl Session for HeadlessSession {
    fn user_agent(&self) -> String {
        self.user_agent.lock().clone()
    }

    fn set_user_agent(&self, user_agent: &str) {
        *self.user_agent.lock() = user_agent.to_string();
    }

    fn set_preloads(&self, preloads: &[PathBuf]) {
        *self.preloads.lock() = preloads.to_vec();
    }

    async fn load_extension(&self, path: &Path) -> Result<ExtensionInfo> {
        let manifest = Manifest::read(path).await?;
        let info = ExtensionInfo::from_manifest(generate_extension_id(), &manifest, path);

        if manifest.has_background() {
            let url = info.id.resource_url(BACKGROUND_PAGE)?;
            self.shared
                .new_surface(SurfaceType::BackgroundPage, &url, None, None);
        }

        debug!(extension_id = %info.id, name = %info.name, "Extension loaded");
        self.extensions.write().push(info.clone());
        Ok(info)
    }
}

/// Generates an id in the 32-letter `a`..`p` form used for unpacked extensions.
fn generate_extension_id() -> ExtensionId {
    let id: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .filter_map(|c| c.to_digit(16))
        .filter_map(|d| char::from_u32('a' as u32 + d))
        .collect();
    ExtensionId::new(id)
}

// ============================================================================
// HeadlessExtensionHost
// ============================================================================

/// A call the shell made into the extension host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    /// [`ExtensionHost::add_extension_host`].
    AddExtensionHost(SurfaceId),
    /// [`ExtensionHost::remove_extension_host`].
    RemoveExtensionHost(SurfaceId),
    /// [`ExtensionHost::add_tab`].
    AddTab {
        /// Tab surface.
        tab: SurfaceId,
        /// Owning window.
        window: WindowId,
    },
    /// [`ExtensionHost::select_tab`].
    SelectTab(SurfaceId),
    /// [`ExtensionHost::remove_tab`].
    RemoveTab(SurfaceId),
    /// [`ExtensionHost::add_extension`].
    AddExtension(ExtensionId),
}

/// An extension host that records what it is told and forwards simulated
/// extension API calls to the shell's delegate.
pub struct HeadlessExtensionHost {
    session: Arc<dyn Session>,
    delegate: Arc<dyn ExtensionsDelegate>,
    calls: Mutex<Vec<HostCall>>,
}

impl HeadlessExtensionHost {
    /// The session the host was created for.
    #[inline]
    #[must_use]
    pub fn session(&self) -> &Arc<dyn Session> {
        &self.session
    }

    /// The shell's callbacks.
    #[inline]
    #[must_use]
    pub fn delegate(&self) -> &Arc<dyn ExtensionsDelegate> {
        &self.delegate
    }

    /// Every call received so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().clone()
    }

    /// Forgets recorded calls.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Simulates `chrome.tabs.create` issued from `sender`.
    ///
    /// # Errors
    ///
    /// Propagates the delegate's error.
    pub fn tabs_create(
        &self,
        sender: Option<SurfaceHandle>,
        details: &CreateTabDetails,
    ) -> Result<SurfaceHandle> {
        let ctx = RequestContext { sender };
        self.delegate.create_tab(&ctx, details)
    }

    /// Simulates the host switching its active tab.
    ///
    /// # Errors
    ///
    /// Propagates the delegate's error.
    pub fn emit_active_tab_changed(&self, tab: &SurfaceHandle) -> Result<()> {
        self.delegate.active_tab_changed(tab)
    }

    fn record(&self, call: HostCall) {
        self.calls.lock().push(call);
    }
}

impl ExtensionHost for HeadlessExtensionHost {
    fn add_extension_host(&self, surface: &SurfaceHandle) {
        self.record(HostCall::AddExtensionHost(surface.id()));
    }

    fn remove_extension_host(&self, surface: &SurfaceHandle) {
        self.record(HostCall::RemoveExtensionHost(surface.id()));
    }

    fn add_tab(&self, tab: &SurfaceHandle, window: WindowId) {
        self.record(HostCall::AddTab {
            tab: tab.id(),
            window,
        });
    }

    fn select_tab(&self, tab: &SurfaceHandle) {
        self.record(HostCall::SelectTab(tab.id()));
    }

    fn remove_tab(&self, tab: &SurfaceHandle) {
        self.record(HostCall::RemoveTab(tab.id()));
    }

    fn add_extension(&self, extension: &ExtensionInfo) {
        self.record(HostCall::AddExtension(extension.id.clone()));
    }
}

// ============================================================================
// HeadlessRuntime
// ============================================================================

/// An in-memory content-hosting runtime.
pub struct HeadlessRuntime {
    app_name: String,
    stays_resident: bool,
    shared: Arc<Shared>,
    session: Arc<HeadlessSession>,
    windows: RwLock<FxHashMap<WindowId, Arc<HeadlessWindow>>>,
    host: Mutex<Option<Arc<HeadlessExtensionHost>>>,
    quit: AtomicBool,
}

// ============================================================================
// HeadlessRuntime - Constructor
// ============================================================================

impl HeadlessRuntime {
    /// Creates a runtime that quits when its last window closes.
    #[must_use]
    pub fn new(app_name: impl Into<String>) -> Self {
        let app_name = app_name.into();
        let shared = Arc::new(Shared::new());
        let session = Arc::new(HeadlessSession::new(Arc::clone(&shared), &app_name));

        Self {
            app_name,
            stays_resident: false,
            shared,
            session,
            windows: RwLock::new(FxHashMap::default()),
            host: Mutex::new(None),
            quit: AtomicBool::new(false),
        }
    }

    /// Makes the runtime follow the stay-resident convention.
    #[must_use]
    pub fn with_stays_resident(mut self, stays_resident: bool) -> Self {
        self.stays_resident = stays_resident;
        self
    }
}

// ============================================================================
// HeadlessRuntime - Inspection
// ============================================================================

impl HeadlessRuntime {
    /// The concrete session.
    #[must_use]
    pub fn session(&self) -> Arc<HeadlessSession> {
        Arc::clone(&self.session)
    }

    /// The extension host, once the shell has created it.
    #[must_use]
    pub fn extension_host(&self) -> Option<Arc<HeadlessExtensionHost>> {
        self.host.lock().clone()
    }

    /// Looks up a window by id, including closed ones.
    #[must_use]
    pub fn window(&self, id: WindowId) -> Option<Arc<HeadlessWindow>> {
        self.windows.read().get(&id).cloned()
    }

    /// Looks up a surface by id.
    #[must_use]
    pub fn surface(&self, id: SurfaceId) -> Option<Arc<HeadlessSurface>> {
        self.shared.surfaces.read().get(&id).cloned()
    }

    /// Every surface created so far, ordered by id.
    #[must_use]
    pub fn surfaces(&self) -> Vec<Arc<HeadlessSurface>> {
        let mut surfaces: Vec<_> = self.shared.surfaces.read().values().cloned().collect();
        surfaces.sort_by_key(|surface| surface.id);
        surfaces
    }

    /// Moves input focus to `window`, or clears it.
    pub fn focus(&self, window: Option<WindowId>) {
        *self.shared.focused.lock() = window;
    }

    /// Creates a free-standing surface, as the runtime would for guest views,
    /// background pages, or popups.
    pub fn create_surface(
        &self,
        kind: SurfaceType,
        url: &str,
        owner_window: Option<WindowId>,
    ) -> Arc<HeadlessSurface> {
        let host_window = match kind {
            SurfaceType::Window => owner_window,
            _ => None,
        };
        self.shared.new_surface(kind, url, host_window, owner_window)
    }

    /// Queues an event for the shell. Returns `false` without a shell.
    pub fn emit(&self, event: ShellEvent) -> bool {
        self.shared.emit(event)
    }

    /// Returns `true` once the shell asked the runtime to quit.
    #[must_use]
    pub fn quit_requested(&self) -> bool {
        self.quit.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for HeadlessRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessRuntime")
            .field("app_name", &self.app_name)
            .field("stays_resident", &self.stays_resident)
            .field("window_count", &self.windows.read().len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// HeadlessRuntime - Runtime
// ============================================================================

impl Runtime for HeadlessRuntime {
    fn runtime_name(&self) -> &str {
        RUNTIME_NAME
    }

    fn app_name(&self) -> &str {
        &self.app_name
    }

    fn default_session(&self) -> Arc<dyn Session> {
        self.session.clone()
    }

    fn create_window(&self, options: &WindowOptions) -> Result<Arc<dyn PlatformWindow>> {
        options.validate().map_err(Error::config)?;

        let id = self.shared.ids.next_window();
        let shell = self
            .shared
            .new_surface(SurfaceType::Window, "", Some(id), None);

        let window = Arc::new(HeadlessWindow {
            id,
            options: options.clone(),
            shell,
            shared: Arc::clone(&self.shared),
            visible_view: Mutex::new(None),
            closed: AtomicBool::new(false),
        });

        self.windows.write().insert(id, Arc::clone(&window));
        self.shared.open_windows.lock().push(id);
        *self.shared.focused.lock() = Some(id);

        debug!(window_id = %id, width = options.width, height = options.height, "Headless window created");
        Ok(window)
    }

    fn focused_window(&self) -> Option<WindowId> {
        *self.shared.focused.lock()
    }

    fn stays_resident(&self) -> bool {
        self.stays_resident
    }

    fn create_extension_host(
        &self,
        session: Arc<dyn Session>,
        delegate: Arc<dyn ExtensionsDelegate>,
    ) -> Arc<dyn ExtensionHost> {
        let host = Arc::new(HeadlessExtensionHost {
            session,
            delegate,
            calls: Mutex::new(Vec::new()),
        });
        *self.host.lock() = Some(Arc::clone(&host));
        host
    }

    fn set_event_sink(&self, sink: EventSink) {
        *self.shared.sink.lock() = Some(sink);
    }

    fn quit(&self) {
        debug!("Headless runtime quit requested");
        self.quit.store(true, Ordering::SeqCst);
    }
}

// ============================================================================
// Tests
// ============================================================================
