//! Interactive menu
//!
//! A line-oriented state machine over any `BufRead`/`Write` pair. Each
//! state prints its screen, reads one line and picks the next state.
//! Entering ESC (`\x1b`) at any prompt returns to the main menu; end of
//! input or an interrupt ends the session.

use std::io::{self, BufRead, Write};
use std::net::Ipv4Addr;
use std::thread;
use std::time::Duration;

use tracing::info;

use crate::client::HttpClient;
use crate::display::{render_request, render_response, separator, LINE_WIDTH};
use crate::encoding::{form_body, FORM_FIELD};
use crate::errors::{ClientError, Result};
use crate::http::Method;
use crate::signals;

/// Line that sends the user back to the main menu.
pub const ESC_KEY: &str = "\x1b";

/// Path POST bodies are sent to.
pub const SUBMIT_PATH: &str = "/submit";

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[1;1H";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    MainMenu,
    RequestMenu,
    HelpMenu,
    EnterIp,
    EnterPort,
    EnterUri,
    EnterPostBody,
    Exit,
}

/// Presentation and startup options for a [`Menu`].
#[derive(Debug, Clone)]
pub struct MenuOptions {
    /// Server used by quick-connect.
    pub default_host: String,
    pub default_port: String,
    /// Server selected before the first screen is shown.
    pub selected: Option<(String, String)>,
    /// Clear the screen between states and colour messages.
    pub styled: bool,
    /// How long transient messages stay up.
    pub message_pause: Duration,
    /// Polled after every read.
    pub interrupted: fn() -> bool,
}

impl Default for MenuOptions {
    fn default() -> Self {
        Self {
            default_host: String::from("127.0.0.1"),
            default_port: String::from("60001"),
            selected: None,
            styled: false,
            message_pause: Duration::ZERO,
            interrupted: signals::was_interrupted,
        }
    }
}

/// Dotted-decimal IPv4 only.
pub fn is_valid_ip(input: &str) -> bool {
    input.parse::<Ipv4Addr>().is_ok()
}

/// Decimal port in `1..=65535`.
pub fn is_valid_port(input: &str) -> bool {
    if !input.starts_with(|c: char| c.is_ascii_digit()) {
        return false;
    }
    matches!(input.parse::<u16>(), Ok(port) if port >= 1)
}

pub fn is_valid_uri(input: &str) -> bool {
    input.starts_with('/')
}

pub struct Menu<R, W> {
    client: HttpClient,
    input: R,
    output: W,
    options: MenuOptions,
    state: MenuState,
    previous: MenuState,
    host: String,
    port: String,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(client: HttpClient, input: R, output: W, options: MenuOptions) -> Self {
        let (host, port) = options.selected.clone().unwrap_or_default();
        Self {
            client,
            input,
            output,
            options,
            state: MenuState::MainMenu,
            previous: MenuState::MainMenu,
            host,
            port,
        }
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn previous_state(&self) -> MenuState {
        self.previous
    }

    /// Selected server, if any.
    pub fn server(&self) -> Option<(&str, &str)> {
        if self.host.is_empty() || self.port.is_empty() {
            None
        } else {
            Some((&self.host, &self.port))
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Run until the user quits or input ends.
    ///
    /// Only I/O errors on the terminal and fatal client errors are returned.
    pub fn run(&mut self) -> Result<()> {
        while self.state != MenuState::Exit {
            if (self.options.interrupted)() {
                info!("Exiting the program...");
                self.switch_to(MenuState::Exit);
                break;
            }

            match self.state {
                MenuState::MainMenu => self.main_menu()?,
                MenuState::RequestMenu => self.request_menu()?,
                MenuState::HelpMenu => self.help_menu()?,
                MenuState::EnterIp => {
                    if let Some(ip) = self.read_input(
                        "Enter the IP address of the server (ex: 127.0.0.1): ",
                        is_valid_ip,
                        "Invalid IP address format. Please try again.",
                    )? {
                        self.host = ip;
                        self.switch_to(MenuState::EnterPort);
                    }
                }
                MenuState::EnterPort => {
                    if let Some(port) = self.read_input(
                        "Enter the port number of the server (ex: 60001): ",
                        is_valid_port,
                        "Invalid port number format. Please enter a number between 1 to 65535.",
                    )? {
                        self.port = port;
                        let next = if self.check_connection()? {
                            MenuState::RequestMenu
                        } else {
                            MenuState::MainMenu
                        };
                        self.switch_to(next);
                    }
                }
                MenuState::EnterUri => {
                    if let Some(uri) = self.read_input(
                        "Enter the URI of the site (ex: /index.html): ",
                        is_valid_uri,
                        "Invalid URI format. Please try again.",
                    )? {
                        self.send(Method::Get, &uri, "")?;
                    }
                }
                MenuState::EnterPostBody => {
                    if let Some(content) = self.read_input(
                        "Enter the form post content: ",
                        |s| !s.is_empty(),
                        "Post cannot be empty. Please try again.",
                    )? {
                        let body = form_body(FORM_FIELD, &content);
                        self.send(Method::Post, SUBMIT_PATH, &body)?;
                    }
                }
                MenuState::Exit => {}
            }
        }

        self.clear_connection();
        Ok(())
    }

    fn switch_to(&mut self, state: MenuState) {
        self.previous = self.state;
        self.state = state;
    }

    fn main_menu(&mut self) -> Result<()> {
        self.clear_screen()?;
        writeln!(self.output, "Welcome to the HTTP Client!\n")?;
        let selected = self
            .server()
            .map(|(host, port)| format!("Selected server: {}:{}\n", host, port));
        match selected {
            Some(line) => writeln!(self.output, "{}", line)?,
            None => writeln!(
                self.output,
                "No server is selected. Please connect to a new server to get started.\n"
            )?,
        }
        writeln!(self.output, "{}", separator("Main Menu", '=', LINE_WIDTH))?;
        writeln!(self.output, "1) Connect to a new server")?;
        writeln!(self.output, "2) Continue browsing")?;
        writeln!(self.output, "3) Set default server info")?;
        writeln!(self.output, "4) Disconnect from server")?;
        writeln!(self.output, "h) Help")?;
        writeln!(self.output, "q) Quit")?;
        writeln!(self.output, "{}", separator("", '=', LINE_WIDTH))?;

        let Some(choice) = self.prompt("Enter your choice: ")? else {
            return Ok(());
        };
        match choice.as_str() {
            "1" => {
                self.clear_screen()?;
                self.clear_connection();
                self.switch_to(MenuState::EnterIp);
            }
            "2" => {
                if self.server().is_none() {
                    self.message("You are not connected to a server. Please connect first.")?;
                    self.switch_to(MenuState::MainMenu);
                } else {
                    self.switch_to(MenuState::RequestMenu);
                }
            }
            "3" => {
                self.quick_connect()?;
                self.switch_to(MenuState::MainMenu);
            }
            "4" => {
                if self.server().is_none() {
                    self.message("You are not connected to a server.")?;
                } else {
                    self.clear_connection();
                }
                self.switch_to(MenuState::MainMenu);
            }
            "h" => self.switch_to(MenuState::HelpMenu),
            "q" => {
                info!("Exiting the program...");
                self.switch_to(MenuState::Exit);
            }
            _ => {
                self.message("Invalid choice. Please try again.")?;
                self.switch_to(MenuState::MainMenu);
            }
        }
        Ok(())
    }

    fn request_menu(&mut self) -> Result<()> {
        self.clear_screen()?;
        writeln!(self.output, "{}", separator("Request Menu", '=', LINE_WIDTH))?;
        writeln!(self.output, "1) Send a GET request")?;
        writeln!(self.output, "2) Send a POST request")?;
        writeln!(self.output, "{}", separator("", '=', LINE_WIDTH))?;

        let Some(choice) = self.prompt("Enter your choice: ")? else {
            return Ok(());
        };
        match choice.as_str() {
            "1" => self.switch_to(MenuState::EnterUri),
            "2" => self.switch_to(MenuState::EnterPostBody),
            ESC_KEY => self.switch_to(MenuState::MainMenu),
            _ => {
                self.message("Invalid choice. Please try again.")?;
                self.switch_to(MenuState::RequestMenu);
            }
        }
        Ok(())
    }

    fn help_menu(&mut self) -> Result<()> {
        self.clear_screen()?;
        writeln!(self.output, "{}", separator("Help Menu", '=', LINE_WIDTH))?;
        writeln!(
            self.output,
            "To navigate the menus, press the corresponding key behind the ')' and hit 'Enter'."
        )?;
        writeln!(
            self.output,
            "To return to the main menu, at any prompt, press the 'ESC' key and hit 'Enter'."
        )?;
        writeln!(self.output, "{}", separator("", '=', LINE_WIDTH))?;

        if self.prompt("\nEnter any key to continue...\n")?.is_some() {
            self.switch_to(MenuState::MainMenu);
        }
        Ok(())
    }

    /// Prompt until the input validates, the user escapes, or input ends.
    fn read_input(
        &mut self,
        prompt: &str,
        validate: fn(&str) -> bool,
        invalid: &str,
    ) -> Result<Option<String>> {
        loop {
            let Some(line) = self.prompt(prompt)? else {
                return Ok(None);
            };
            if line == ESC_KEY {
                self.switch_to(MenuState::MainMenu);
                return Ok(None);
            }
            if validate(&line) {
                return Ok(Some(line));
            }
            self.message(invalid)?;
        }
    }

    /// Print `text` and read one line without its terminator.
    ///
    /// Returns `None` (and moves to `Exit`) on end of input or interrupt.
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        let read = match self.input.read_line(&mut line) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => 0,
            Err(e) => return Err(e.into()),
        };
        if read == 0 || (self.options.interrupted)() {
            writeln!(self.output)?;
            info!("Exiting the program...");
            self.switch_to(MenuState::Exit);
            return Ok(None);
        }

        let trimmed = line.trim_end_matches(['\r', '\n']);
        Ok(Some(trimmed.to_string()))
    }

    /// Show a transient message, then clear it away.
    fn message(&mut self, text: &str) -> Result<()> {
        self.clear_screen()?;
        writeln!(self.output, "{}", text)?;
        self.output.flush()?;
        if !self.options.message_pause.is_zero() {
            thread::sleep(self.options.message_pause);
        }
        self.clear_screen()
    }

    fn clear_screen(&mut self) -> Result<()> {
        if self.options.styled {
            write!(self.output, "{}", CLEAR_SCREEN)?;
        }
        Ok(())
    }

    fn clear_connection(&mut self) {
        self.host.clear();
        self.port.clear();
        self.client.connection().disconnect();
    }

    /// Connect to the selected server unless already connected.
    fn check_connection(&mut self) -> Result<bool> {
        let connection = self.client.connection();
        if !connection.is_connected() {
            if let Err(source) = connection.connect(&self.host, &self.port) {
                let err = ClientError::Connect {
                    host: self.host.clone(),
                    port: self.port.clone(),
                    source,
                };
                if err.is_fatal() {
                    return Err(err.into());
                }
                let text = format!("Failed to connect to {}:{}.", self.host, self.port);
                self.message(&text)?;
                return Ok(false);
            }
        }
        let text = format!(
            "Connection to {}:{} was successful. Server is able to be browsed.",
            self.host, self.port
        );
        self.message(&text)?;
        Ok(true)
    }

    fn quick_connect(&mut self) -> Result<()> {
        self.clear_screen()?;
        if self.host == self.options.default_host && self.port == self.options.default_port {
            let text = format!("Already connected to server: {}:{}", self.host, self.port);
            return self.message(&text);
        }

        self.client.connection().disconnect();
        self.host = self.options.default_host.clone();
        self.port = self.options.default_port.clone();
        if !self.check_connection()? {
            self.clear_connection();
            self.message("Failed to connect to default server.")?;
        }
        Ok(())
    }

    /// Send one request to the selected server and show the exchange.
    fn send(&mut self, method: Method, uri: &str, body: &str) -> Result<()> {
        let request = self.client.build_request(method, uri, body, &self.host, &self.port);
        let (host, port) = (self.host.clone(), self.port.clone());

        match self.client.process_request(&request, &host, &port) {
            Ok(response) => {
                let styled = self.options.styled;
                write!(self.output, "{}", render_request(&request, styled))?;
                write!(self.output, "{}", render_response(&response, styled))?;
            }
            Err(err) if err.is_fatal() => return Err(err.into()),
            Err(ClientError::Connect { .. }) => {
                let text = format!("Failed to reconnect to {}:{}.", host, port);
                self.message(&text)?;
            }
            Err(err) => {
                if matches!(err, ClientError::Receive(_) | ClientError::Parse(_)) {
                    write!(self.output, "{}", render_request(&request, self.options.styled))?;
                }
                writeln!(self.output, "{}", err)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::DEFAULT_USER_AGENT;
    use crate::net::ConnectionManager;
    use std::io::{Cursor, Read};
    use std::net::{TcpListener, TcpStream};

    fn not_interrupted() -> bool {
        false
    }

    fn always_interrupted() -> bool {
        true
    }

    fn options() -> MenuOptions {
        MenuOptions {
            interrupted: not_interrupted,
            ..MenuOptions::default()
        }
    }

    fn run_menu(input: &str, options: MenuOptions) -> String {
        let client = HttpClient::new(ConnectionManager::default(), DEFAULT_USER_AGENT);
        let mut menu = Menu::new(client, Cursor::new(input.to_string()), Vec::new(), options);
        menu.run().unwrap();
        assert_eq!(menu.state(), MenuState::Exit);
        String::from_utf8(menu.into_output()).unwrap()
    }

    /// Read one request (head plus Content-Length body) from `stream`.
    fn read_request(stream: &mut TcpStream) -> Vec<u8> {
        let mut data = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&data[..pos]).to_ascii_lowercase();
                let length = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if data.len() >= pos + 4 + length {
                    return data;
                }
            }
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                return data;
            }
            data.extend_from_slice(&buf[..n]);
        }
    }

    /// Accept one connection, answer one request, then wait for the client to hang up.
    fn serve_one(reply: &'static [u8]) -> (String, thread::JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port().to_string();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            stream.write_all(reply).unwrap();
            let mut rest = Vec::new();
            let _ = stream.read_to_end(&mut rest);
            request
        });
        (port, handle)
    }

    #[test]
    fn test_validators() {
        assert!(is_valid_ip("127.0.0.1"));
        assert!(!is_valid_ip("256.0.0.1"));
        assert!(!is_valid_ip("localhost"));
        assert!(!is_valid_ip("::1"));

        assert!(is_valid_port("1"));
        assert!(is_valid_port("65535"));
        assert!(!is_valid_port("0"));
        assert!(!is_valid_port("65536"));
        assert!(!is_valid_port("-1"));
        assert!(!is_valid_port("+80"));
        assert!(!is_valid_port(""));

        assert!(is_valid_uri("/index.html"));
        assert!(!is_valid_uri("index.html"));
        assert!(!is_valid_uri(""));
    }

    #[test]
    fn test_quit() {
        let out = run_menu("q\n", options());
        assert!(out.contains("Welcome to the HTTP Client!"));
        assert!(out.contains(&separator("Main Menu", '=', LINE_WIDTH)));
        assert!(out.contains("No server is selected"));
    }

    #[test]
    fn test_end_of_input_exits() {
        let out = run_menu("", options());
        assert!(out.contains("Enter your choice: "));
    }

    #[test]
    fn test_interrupt_exits_before_first_screen() {
        let out = run_menu(
            "h\n",
            MenuOptions {
                interrupted: always_interrupted,
                ..MenuOptions::default()
            },
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_help_then_quit() {
        let out = run_menu("h\n\nq\n", options());
        assert!(out.contains("Help Menu"));
        assert!(out.contains("press the 'ESC' key"));
    }

    #[test]
    fn test_browse_without_server() {
        let out = run_menu("2\nq\n", options());
        assert!(out.contains("You are not connected to a server. Please connect first."));
    }

    #[test]
    fn test_disconnect_without_server() {
        let out = run_menu("4\nq\n", options());
        assert!(out.contains("You are not connected to a server."));
    }

    #[test]
    fn test_invalid_choice() {
        let out = run_menu("x\nq\n", options());
        assert!(out.contains("Invalid choice. Please try again."));
    }

    #[test]
    fn test_invalid_ip_then_escape() {
        let out = run_menu("1\n999.1.1.1\n\x1b\nq\n", options());
        assert!(out.contains("Invalid IP address format. Please try again."));
        assert_eq!(out.matches("Welcome to the HTTP Client!").count(), 2);
    }

    #[test]
    fn test_invalid_port_message() {
        let out = run_menu("1\n127.0.0.1\nabc\n\x1b\nq\n", options());
        assert!(out.contains("Please enter a number between 1 to 65535."));
    }

    #[test]
    fn test_escape_tracks_previous_state() {
        let client = HttpClient::new(ConnectionManager::default(), DEFAULT_USER_AGENT);
        let mut menu = Menu::new(client, Cursor::new("1\n\x1b\nq\n"), Vec::new(), options());
        menu.run().unwrap();
        assert_eq!(menu.state(), MenuState::Exit);
        assert_eq!(menu.previous_state(), MenuState::MainMenu);
    }

    #[test]
    fn test_connection_refused_returns_to_main_menu() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let input = format!("1\n127.0.0.1\n{}\nq\n", port);
        let out = run_menu(&input, options());
        assert!(out.contains(&format!("Failed to connect to 127.0.0.1:{}.", port)));
    }

    #[test]
    fn test_get_flow() {
        let (port, server) = serve_one(
            b"HTTP/1.1 200 OK\r\nConnection: keep-alive\r\nContent-Length: 5\r\n\r\nhello",
        );
        let input = format!("1\n127.0.0.1\n{}\n1\n/index.html\n\x1b\nq\n", port);
        let out = run_menu(&input, options());

        assert!(out.contains("was successful. Server is able to be browsed."));
        assert!(out.contains("Request Menu"));
        assert!(out.contains("GET /index.html HTTP/1.1"));
        assert!(out.contains("HTTP/1.1 200 OK"));
        assert!(out.contains("\nhello\n"));

        let request = String::from_utf8(server.join().unwrap()).unwrap();
        assert!(request.starts_with("GET /index.html HTTP/1.1\r\n"));
        assert!(request.contains(&format!("host: 127.0.0.1:{}\r\n", port)));
        assert!(request.contains("connection: keep-alive\r\n"));
    }

    #[test]
    fn test_post_flow() {
        let (port, server) = serve_one(
            b"HTTP/1.1 201 Created\r\nConnection: close\r\nContent-Length: 0\r\n\r\n",
        );
        let input = format!("1\n127.0.0.1\n{}\n2\n\n hello world!\n\x1b\nq\n", port);
        let out = run_menu(&input, options());

        assert!(out.contains("Post cannot be empty. Please try again."));
        assert!(out.contains("HTTP/1.1 201 Created"));

        let request = String::from_utf8(server.join().unwrap()).unwrap();
        assert!(request.starts_with("POST /submit HTTP/1.1\r\n"));
        assert!(request.contains("content-type: application/x-www-form-urlencoded\r\n"));
        assert!(request.ends_with("\r\n\r\ncomment=%20hello%20world%21"));
    }

    #[test]
    fn test_preselected_server_can_browse() {
        let out = run_menu(
            "2\n\x1b\nq\n",
            MenuOptions {
                selected: Some(("10.0.0.1".into(), "8080".into())),
                ..options()
            },
        );
        assert!(out.contains("Selected server: 10.0.0.1:8080"));
        assert!(out.contains("Request Menu"));
    }

    #[test]
    fn test_quick_connect_failure_clears_server() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port().to_string()
        };
        let client = HttpClient::new(ConnectionManager::default(), DEFAULT_USER_AGENT);
        let mut menu = Menu::new(
            client,
            Cursor::new("3\nq\n"),
            Vec::new(),
            MenuOptions {
                default_port: port,
                ..options()
            },
        );
        menu.run().unwrap();
        assert!(menu.server().is_none());
        let out = String::from_utf8(menu.into_output()).unwrap();
        assert!(out.contains("Failed to connect to default server."));
    }

    #[test]
    fn test_quick_connect_drops_open_connection() {
        let (port, server) = serve_one(
            b"HTTP/1.1 200 OK\r\nConnection: keep-alive\r\nContent-Length: 0\r\n\r\n",
        );
        let default_port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port().to_string()
        };
        let input = format!("1\n127.0.0.1\n{}\n1\n/\n\x1b\n3\nq\n", port);
        let out = run_menu(
            &input,
            MenuOptions {
                default_port: default_port.clone(),
                ..options()
            },
        );

        assert!(out.contains(&format!("Failed to connect to 127.0.0.1:{}.", default_port)));
        assert!(out.contains("Failed to connect to default server."));
        assert!(!out.contains(&format!("Connection to 127.0.0.1:{} was successful", default_port)));
        server.join().unwrap();
    }
}
