// CLASSIFICATION: COMMUNITY
// Filename: test_service_startup.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use devsvc::error::DevResult;
use devsvc::runtime::service_locator::DisabledServiceLauncher;
use devsvc::runtime::{ContextId, PortId, ServiceContextState, ServiceLauncher};
use devsvc::{initialize_runtime_env, DevError, Runtime, RuntimeConfig};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn race(runtime: &Arc<Runtime>, callers: usize) -> Vec<ServiceContextState> {
    let barrier = Arc::new(Barrier::new(callers));
    let handles: Vec<_> = (0..callers)
        .map(|_| {
            let runtime = Arc::clone(runtime);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                runtime.locator().wait_for_startup()
            })
        })
        .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

#[test]
fn concurrent_waiters_see_running() {
    init_logger();
    let runtime = Arc::new(initialize_runtime_env(RuntimeConfig::default()));
    let states = race(&runtime, 16);
    assert!(states.iter().all(|s| *s == ServiceContextState::Running));
    assert!(runtime.locator().is_running());
}

#[test]
fn concurrent_waiters_see_unavailable() {
    init_logger();
    let runtime = Arc::new(Runtime::with_launcher(RuntimeConfig::default(), |_, _| {
        let launcher: Box<dyn ServiceLauncher> = Box::new(DisabledServiceLauncher);
        launcher
    }));
    let states = race(&runtime, 16);
    assert!(states
        .iter()
        .all(|s| *s == ServiceContextState::PermanentlyUnavailable));
}

struct SlowFailingLauncher {
    calls: Arc<AtomicUsize>,
}

impl ServiceLauncher for SlowFailingLauncher {
    fn launch(&self, _context: ContextId) -> DevResult<PortId> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(100));
        Err(DevError::ServiceUnavailable("bring-up failed".into()))
    }
}

#[test]
fn failed_startup_runs_once_and_releases_everyone() {
    init_logger();
    let calls = Arc::new(AtomicUsize::new(0));
    let launcher_calls = Arc::clone(&calls);
    let runtime = Arc::new(Runtime::with_launcher(RuntimeConfig::default(), move |_, _| {
        let launcher: Box<dyn ServiceLauncher> = Box::new(SlowFailingLauncher {
            calls: launcher_calls,
        });
        launcher
    }));
    let states = race(&runtime, 8);
    assert!(states
        .iter()
        .all(|s| *s == ServiceContextState::PermanentlyUnavailable));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let (reply, rx) = runtime.open_reply_channel().unwrap();
    runtime.developer().query_server_info(reply);
    assert!(rx.recv_timeout(Duration::from_secs(1)).unwrap().is_null());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn startup_is_lazy() {
    init_logger();
    let runtime = initialize_runtime_env(RuntimeConfig::default());
    assert_eq!(runtime.locator().state(), ServiceContextState::NotStarted);
    assert!(!runtime.locator().is_running());
    assert!(runtime.locator().endpoint().is_none());
}
