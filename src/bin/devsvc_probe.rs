// CLASSIFICATION: COMMUNITY
// Filename: devsvc_probe.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Boot a runtime, query the service context and print its replies.

use std::process;
use std::time::Duration;

use devsvc::runtime::{Message, PortReceiver};
use devsvc::{initialize_runtime_env, RuntimeConfig};

const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

fn await_reply(what: &str, rx: &PortReceiver) -> Result<String, String> {
    match rx.recv_timeout(REPLY_TIMEOUT) {
        Ok(Message::Null) => Ok("null".into()),
        Ok(Message::Json(v)) => Ok(v.to_string()),
        Err(_) => Err(format!("no reply to {} within {:?}", what, REPLY_TIMEOUT)),
    }
}

fn run() -> Result<(), String> {
    let runtime = initialize_runtime_env(RuntimeConfig::load_active());
    let developer = runtime.developer();

    let (reply, rx) = runtime.open_reply_channel().map_err(|e| e.to_string())?;
    developer.query_server_info(reply);
    println!("server_info: {}", await_reply("server info", &rx)?);

    let (reply, rx) = runtime.open_reply_channel().map_err(|e| e.to_string())?;
    developer.control_web_server(reply, true, None);
    println!("web_server: {}", await_reply("web server control", &rx)?);

    let (major, minor) = developer.service_protocol_version();
    println!("protocol: {}.{}", major, minor);
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}
