// CLASSIFICATION: COMMUNITY
// Filename: test_control_dispatch.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

use std::time::Duration;

use devsvc::runtime::service_locator::DisabledServiceLauncher;
use devsvc::runtime::{Message, PortId, PortReceiver, ServiceContextState, ServiceLauncher};
use devsvc::services::ServerInfo;
use devsvc::{initialize_runtime_env, Runtime, RuntimeConfig};

const WAIT: Duration = Duration::from_secs(5);

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn without_service(config: RuntimeConfig) -> Runtime {
    Runtime::with_launcher(config, |_, _| {
        let launcher: Box<dyn ServiceLauncher> = Box::new(DisabledServiceLauncher);
        launcher
    })
}

fn assert_single(rx: &PortReceiver) -> Message {
    let first = rx.recv_timeout(WAIT).expect("reply");
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    first
}

fn server_info(msg: &Message) -> ServerInfo {
    serde_json::from_value(msg.as_json().expect("non-null reply").clone()).unwrap()
}

#[test]
fn server_info_without_service_context_is_null() {
    init_logger();
    let runtime = without_service(RuntimeConfig::default());
    let (reply, rx) = runtime.open_reply_channel().unwrap();
    runtime.developer().query_server_info(reply);
    assert_eq!(assert_single(&rx), Message::Null);
    assert_eq!(
        runtime.locator().state(),
        ServiceContextState::PermanentlyUnavailable
    );
}

#[test]
fn web_server_control_without_service_context_is_null() {
    init_logger();
    let runtime = without_service(RuntimeConfig::default());
    let (reply, rx) = runtime.open_reply_channel().unwrap();
    runtime.developer().control_web_server(reply, true, Some(false));
    assert_eq!(assert_single(&rx), Message::Null);
}

#[test]
fn product_build_replies_null_without_startup() {
    init_logger();
    let runtime = initialize_runtime_env(RuntimeConfig::product());
    let (reply, rx) = runtime.open_reply_channel().unwrap();
    runtime.developer().query_server_info(reply);
    assert_eq!(assert_single(&rx), Message::Null);
    assert_eq!(runtime.locator().state(), ServiceContextState::NotStarted);
}

#[test]
fn web_server_control_round_trip() {
    init_logger();
    let runtime = initialize_runtime_env(RuntimeConfig::default());
    let dev = runtime.developer();

    let (reply, rx) = runtime.open_reply_channel().unwrap();
    dev.control_web_server(reply, true, Some(false));
    let info = server_info(&assert_single(&rx));
    assert!(info.enabled);
    assert_eq!(info.uri.as_deref(), Some("http://127.0.0.1:8181/"));
    assert!(runtime.service_host().unwrap().web_server_enabled());

    let (reply, rx) = runtime.open_reply_channel().unwrap();
    dev.query_server_info(reply);
    assert!(server_info(&assert_single(&rx)).enabled);

    let (reply, rx) = runtime.open_reply_channel().unwrap();
    dev.control_web_server(reply, false, None);
    let info = server_info(&assert_single(&rx));
    assert!(!info.enabled);
    assert_eq!(info.uri, None);
}

#[test]
fn server_info_reports_protocol_version() {
    init_logger();
    let runtime = initialize_runtime_env(RuntimeConfig::default());
    let (reply, rx) = runtime.open_reply_channel().unwrap();
    runtime.developer().query_server_info(reply);
    let info = server_info(&assert_single(&rx));
    assert!(!info.enabled);
    assert_eq!(
        (info.major, info.minor),
        runtime.developer().service_protocol_version()
    );
}

#[test]
fn context_id_from_port_is_format_stable() {
    init_logger();
    let runtime = initialize_runtime_env(RuntimeConfig::default());
    let dev = runtime.developer();
    let id = dev.context_id_from_port(PortId(42)).unwrap();
    assert_eq!(id, "contexts/42");
    assert_eq!(dev.context_id_from_port(PortId(42)), Some(id));
    assert_eq!(runtime.locator().state(), ServiceContextState::NotStarted);

    let product = initialize_runtime_env(RuntimeConfig::product());
    assert_eq!(product.developer().context_id_from_port(PortId(42)), None);
}

#[test]
fn dropped_reply_receiver_closes_its_port() {
    init_logger();
    let runtime = initialize_runtime_env(RuntimeConfig::default());
    let before = runtime.ports().open_count();
    let (reply, rx) = runtime.open_reply_channel().unwrap();
    assert!(runtime.ports().is_open(reply.port()));
    drop(rx);
    assert!(!runtime.ports().is_open(reply.port()));
    assert_eq!(runtime.ports().open_count(), before);
}
