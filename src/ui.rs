// UI layer: the terminal boundary. The session only ever asks for one line
// of input at a time and prints whole lines, so the seam is a small trait
// that tests can script.

use std::io;
use std::time::Duration;

use crossterm::style::Stylize;
use dialoguer::{Input, Password};
use indicatif::{ProgressBar, ProgressStyle};

use crate::format::{Line, Tone};

/// Line-oriented terminal.
pub trait Console {
    /// Show `prompt` and read one line.
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;

    /// Like `read_line`, for values that should not be echoed.
    fn read_secret(&mut self, prompt: &str) -> io::Result<String> {
        self.read_line(prompt)
    }

    fn show(&mut self, line: &Line);

    fn show_all(&mut self, lines: &[Line]) {
        for line in lines {
            self.show(line);
        }
    }

    /// Called right before a blocking remote call.
    fn begin_wait(&mut self, _message: &str) {}

    /// Called as soon as the remote call returns.
    fn end_wait(&mut self) {}
}

/// The interactive terminal: `dialoguer` prompts, coloured output and a
/// spinner while a request is outstanding.
#[derive(Default)]
pub struct Terminal {
    spinner: Option<ProgressBar>,
}

impl Terminal {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Console for Terminal {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        // Empty input is allowed so it reaches the menu as an unknown option.
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
    }

    fn read_secret(&mut self, prompt: &str) -> io::Result<String> {
        Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
    }

    fn show(&mut self, line: &Line) {
        let text = line.text.as_str();
        match line.tone {
            Tone::Plain => println!("{text}"),
            Tone::Heading => println!("{}", text.green().bold()),
            Tone::Menu => println!("{}", text.blue()),
            Tone::Item => println!("{}", text.yellow()),
            Tone::Success => println!("{}", text.green()),
            Tone::Failure => println!("{}", text.red()),
        }
    }

    fn begin_wait(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    fn end_wait(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}
