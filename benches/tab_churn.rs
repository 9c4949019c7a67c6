//! Tab churn benchmark suite.
//!
//! Benchmarks the controller over the headless runtime:
//! - Tab create/remove cycles at different tab counts
//! - New-target routing through the event queue
//! - Surface-to-window resolution across many windows
//!
//! Run with: cargo bench --bench tab_churn
//! Results saved to: target/criterion/

use std::hint::black_box;
use std::sync::Arc;

use anyhow::Context;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use tabbed_shell::runtime::headless::HeadlessRuntime;
use tabbed_shell::runtime::{Disposition, NewTargetRequest, ShellEvent, SurfaceHandle};
use tabbed_shell::{Browser, TabbedWindow};
use tokio::runtime::Runtime;

// ============================================================================
// Benchmark Parameters
// ============================================================================

const TAB_COUNTS: &[usize] = &[10, 100, 500];
const WINDOW_COUNTS: &[usize] = &[1, 10, 50];

// ============================================================================
// Setup
// ============================================================================

struct Fixture {
    _root: tempfile::TempDir,
    runtime: Arc<HeadlessRuntime>,
    browser: Browser,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn fixture(rt: &Runtime, windows: usize) -> anyhow::Result<Fixture> {
    let root = tempfile::tempdir().context("create temp dir")?;
    let ui = root.path().join("ui");
    std::fs::create_dir_all(&ui)?;
    std::fs::write(ui.join("manifest.json"), r#"{"name":"ui","version":"1"}"#)?;

    let runtime = Arc::new(HeadlessRuntime::new("bench").with_stays_resident(true));
    let browser = Browser::builder()
        .ui_extension(&ui)
        .debug(false)
        .build(runtime.clone())?;

    rt.block_on(browser.init())?;
    for _ in 1..windows {
        browser.create_window(None)?;
    }
    browser.dispatch_pending();

    Ok(Fixture {
        _root: root,
        runtime,
        browser,
    })
}

fn first_window(fixture: &Fixture) -> anyhow::Result<TabbedWindow> {
    fixture
        .browser
        .get_focused_window()
        .context("browser has no window")
}

// ============================================================================
// Benchmark: Tab Create/Remove
// ============================================================================

fn bench_tab_churn(c: &mut Criterion) {
    init_tracing();
    let rt = Runtime::new().unwrap();
    let fixture = fixture(&rt, 1).unwrap();
    let window = first_window(&fixture).unwrap();

    let mut group = c.benchmark_group("tab_churn");

    for &count in TAB_COUNTS {
        group.bench_with_input(BenchmarkId::new("create_remove", count), &count, |b, &n| {
            b.iter(|| {
                let ids: Vec<_> = (0..n)
                    .map(|_| window.tabs().create(None).unwrap().id())
                    .collect();
                for id in ids {
                    window.tabs().remove(id);
                }
                black_box(window.tab_count())
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: New-Target Routing
// ============================================================================

fn bench_new_target(c: &mut Criterion) {
    init_tracing();
    let rt = Runtime::new().unwrap();
    let fixture = fixture(&rt, 1).unwrap();
    let window = first_window(&fixture).unwrap();
    let source: SurfaceHandle = window.focused_tab().unwrap().surface().clone();

    let mut group = c.benchmark_group("new_target");

    for &count in TAB_COUNTS {
        group.bench_with_input(BenchmarkId::new("background_tab", count), &count, |b, &n| {
            b.iter(|| {
                for _ in 0..n {
                    fixture.runtime.emit(ShellEvent::NewTarget(NewTargetRequest {
                        source: Arc::clone(&source),
                        url: "https://bench.example/".to_string(),
                        frame_name: String::new(),
                        disposition: Disposition::BackgroundTab,
                    }));
                }
                let handled = fixture.browser.dispatch_pending();

                for id in window.tabs().ids().into_iter().skip(1) {
                    window.tabs().remove(id);
                }
                black_box(handled)
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Surface Resolution
// ============================================================================

fn bench_window_from_surface(c: &mut Criterion) {
    init_tracing();
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("window_from_surface");

    for &count in WINDOW_COUNTS {
        let fixture = fixture(&rt, count).unwrap();
        let surfaces: Vec<SurfaceHandle> = fixture
            .browser
            .windows()
            .iter()
            .filter_map(|window| window.focused_tab())
            .map(|tab| tab.surface().clone())
            .collect();

        group.bench_with_input(BenchmarkId::new("tabs", count), &surfaces, |b, surfaces| {
            b.iter(|| {
                for surface in surfaces {
                    black_box(fixture.browser.window_from_surface(surface).unwrap());
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_tab_churn,
    bench_new_target,
    bench_window_from_surface
);
criterion_main!(benches);
