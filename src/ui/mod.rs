// ui/mod.rs
//
// Operator-facing output. Result lines go to stdout, problems to stderr,
// optionally coloured.
mod styles;

pub use styles::*;

use std::io::Write;
use std::sync::Mutex;

use crossterm::style::{Color, Stylize};

pub const NO_COLOR_ENV: &str = "VAULT_CLI_NO_COLOR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Out,
    Err,
}

#[derive(Debug)]
enum Sink {
    Terminal,
    Buffer(Mutex<Vec<(Channel, String)>>),
}

#[derive(Debug)]
pub struct Ui {
    color: bool,
    sink: Sink,
}

impl Ui {
    pub fn terminal(color: bool) -> Self {
        Ui {
            color,
            sink: Sink::Terminal,
        }
    }

    /// Captures output instead of printing it, without colour.
    pub fn buffer() -> Self {
        Ui {
            color: false,
            sink: Sink::Buffer(Mutex::new(Vec::new())),
        }
    }

    /// Colour is on unless `--no-color`, `VAULT_CLI_NO_COLOR` or `NO_COLOR`
    /// says otherwise.
    pub fn color_enabled(no_color_flag: bool) -> bool {
        let env_set = |name: &str| std::env::var_os(name).is_some_and(|v| !v.is_empty());
        !no_color_flag && !env_set(NO_COLOR_ENV) && !env_set("NO_COLOR")
    }

    pub fn output(&self, message: &str) {
        self.emit(Channel::Out, None, message);
    }

    pub fn success(&self, message: &str) {
        self.emit(Channel::Out, Some(SUCCESS_COLOR), message);
    }

    pub fn highlight(&self, message: &str, color: Color) {
        self.emit(Channel::Out, Some(color), message);
    }

    pub fn warn(&self, message: &str) {
        self.emit(Channel::Err, Some(WARNING_COLOR), message);
    }

    pub fn error(&self, message: &str) {
        self.emit(Channel::Err, Some(ERROR_COLOR), message);
    }

    /// Captured lines, in order, for a buffered `Ui`.
    pub fn lines(&self) -> Vec<String> {
        match &self.sink {
            Sink::Terminal => Vec::new(),
            Sink::Buffer(lines) => lines
                .lock()
                .map(|l| l.iter().map(|(_, m)| m.clone()).collect())
                .unwrap_or_default(),
        }
    }

    pub fn lines_on(&self, channel: Channel) -> Vec<String> {
        match &self.sink {
            Sink::Terminal => Vec::new(),
            Sink::Buffer(lines) => lines
                .lock()
                .map(|l| {
                    l.iter()
                        .filter(|(c, _)| *c == channel)
                        .map(|(_, m)| m.clone())
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    fn emit(&self, channel: Channel, color: Option<Color>, message: &str) {
        match &self.sink {
            Sink::Buffer(lines) => {
                if let Ok(mut lines) = lines.lock() {
                    lines.push((channel, message.to_string()));
                }
            }
            Sink::Terminal => {
                let text = match color {
                    Some(color) if self.color => message.with(color).to_string(),
                    _ => message.to_string(),
                };
                let _ = match channel {
                    Channel::Out => writeln!(std::io::stdout(), "{text}"),
                    Channel::Err => writeln!(std::io::stderr(), "{text}"),
                };
            }
        }
    }
}
