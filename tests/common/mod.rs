//! Common test utilities for httpterm integration tests
//!
//! - Scripted loopback servers built on `std::net::TcpListener`
//! - CLI invocation helpers with an isolated config directory
#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

/// HTTP 200 OK status line for assertions
pub const HTTP_OK: &str = "HTTP/1.1 200 OK";

/// ESC line that returns the menu to the main screen
pub const ESC: &str = "\x1b";

/// One step of a scripted server reply.
#[derive(Debug, Clone)]
pub enum Step {
    /// Write these bytes.
    Send(Vec<u8>),
    /// Sleep before the next step.
    Pause(Duration),
}

pub fn send(bytes: &[u8]) -> Step {
    Step::Send(bytes.to_vec())
}

pub fn pause_ms(ms: u64) -> Step {
    Step::Pause(Duration::from_millis(ms))
}

/// What the server does once its script has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finish {
    /// Close the connection immediately.
    Close,
    /// Keep the connection until the client hangs up.
    WaitForClient,
}

/// Handle to a loopback server accepting a single connection.
pub struct LoopbackServer {
    pub port: u16,
    handle: thread::JoinHandle<Vec<u8>>,
}

impl LoopbackServer {
    /// Accept one connection, read one request, play `script`, then `finish`.
    pub fn start(script: Vec<Step>, finish: Finish) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let port = listener.local_addr().expect("local addr").port();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let request = read_request(&mut stream);
            for step in script {
                match step {
                    Step::Send(bytes) => {
                        // The client may already have given up on a slow script.
                        if stream.write_all(&bytes).is_err() {
                            break;
                        }
                    }
                    Step::Pause(delay) => thread::sleep(delay),
                }
            }
            if finish == Finish::WaitForClient {
                let mut rest = Vec::new();
                let _ = stream.read_to_end(&mut rest);
            }
            request
        });
        Self { port, handle }
    }

    /// Accept one connection and close it without reading.
    pub fn accept_and_close() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let port = listener.local_addr().expect("local addr").port();
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept");
            drop(stream);
            Vec::new()
        });
        Self { port, handle }
    }

    /// Answer with `reply` in one write, then wait for the client to hang up.
    pub fn reply(reply: &[u8]) -> Self {
        Self::start(vec![send(reply)], Finish::WaitForClient)
    }

    pub fn port_string(&self) -> String {
        self.port.to_string()
    }

    /// Wait for the server thread and return the request it read.
    pub fn request(self) -> Vec<u8> {
        self.handle.join().expect("server thread panicked")
    }
}

/// A port on 127.0.0.1 with nothing listening.
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    listener.local_addr().expect("local addr").port()
}

/// Read one request: head plus `Content-Length` body, or until EOF.
pub fn read_request(stream: &mut TcpStream) -> Vec<u8> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&data[..pos]).to_ascii_lowercase();
            let length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if data.len() >= pos + 4 + length {
                return data;
            }
        }
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return data,
            Ok(n) => data.extend_from_slice(&buf[..n]),
        }
    }
}

/// Result of running the httpterm binary
#[derive(Debug)]
pub struct CliResponse {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CliResponse {
    /// Check if stdout contains a substring
    pub fn contains(&self, needle: &str) -> bool {
        self.stdout.contains(needle)
    }

    /// Count occurrences of a substring in stdout
    pub fn count(&self, needle: &str) -> usize {
        self.stdout.matches(needle).count()
    }
}

/// Mock environment for testing
pub struct MockEnvironment {
    /// Temporary config directory
    pub config_dir: TempDir,
    /// Environment variables to set
    pub env_vars: HashMap<String, String>,
}

impl Default for MockEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEnvironment {
    pub fn new() -> Self {
        let config_dir = TempDir::new().expect("Failed to create temp config dir");
        Self {
            config_dir,
            env_vars: HashMap::new(),
        }
    }

    /// Set an environment variable
    pub fn set_env(&mut self, key: &str, value: &str) -> &mut Self {
        self.env_vars.insert(key.to_string(), value.to_string());
        self
    }

    /// Write `config.toml` into the config directory
    pub fn write_config(&self, content: &str) -> PathBuf {
        let path = self.config_dir.path().join("config.toml");
        std::fs::write(&path, content).expect("Failed to write config");
        path
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.path().to_path_buf()
    }
}

/// Run httpterm with `args`, feeding `stdin` to the menu.
pub fn httpterm(args: &[&str], stdin: &str) -> CliResponse {
    httpterm_with_env(args, stdin, &MockEnvironment::new())
}

/// Run httpterm with `args` and `stdin` inside `env`.
pub fn httpterm_with_env(args: &[&str], stdin: &str, env: &MockEnvironment) -> CliResponse {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_httpterm"));
    cmd.args(args);

    cmd.env("HTTPTERM_CONFIG_DIR", env.config_path());
    cmd.env_remove("RUST_LOG");
    for (key, value) in &env.env_vars {
        cmd.env(key, value);
    }

    cmd.stdin(Stdio::piped());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let mut child = cmd.spawn().expect("Failed to spawn command");
    {
        let stdin_pipe = child.stdin.as_mut().expect("Failed to open stdin");
        stdin_pipe
            .write_all(stdin.as_bytes())
            .expect("Failed to write to stdin");
    }
    drop(child.stdin.take());
    let output = child.wait_with_output().expect("Failed to wait for command");
    parse_output(output)
}

fn parse_output(output: Output) -> CliResponse {
    CliResponse {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(1),
    }
}
