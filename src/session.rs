//! The session controller: owns the persisted identity, drives the
//! navigation state machine against the console and turns each submitted
//! request into a remote call, rendered output and the next screen.

use std::io;
use std::path::PathBuf;

use log::{debug, warn};

use crate::api::{ApiClient, Request, Transport};
use crate::error::Error;
use crate::format::{self, Line};
use crate::identity::NameLists;
use crate::nav::{Action, Screen, Transition};
use crate::store::{ConfigStore, Key, RecordStore, SessionState};
use crate::types::Reply;
use crate::ui::Console;

const CREDENTIAL_PROMPT: &str = "Please enter your SMS-Activate API Key";
const CONFIRM_PROMPT: &str = "Do you want to use these details? (Yes/No)";

pub struct Session<T, S, C> {
    api: ApiClient<T>,
    store: ConfigStore<S>,
    console: C,
    state: SessionState,
    names_dir: PathBuf,
}

impl<T: Transport, S: RecordStore, C: Console> Session<T, S, C> {
    /// Build a session, loading the persisted identity from `store`.
    pub fn new(api: ApiClient<T>, store: ConfigStore<S>, console: C, names_dir: PathBuf) -> Self {
        let state = store.load();
        debug!(
            "loaded state: credential {}, active email {}",
            if state.credential.is_some() { "present" } else { "absent" },
            state.active_email_id.as_deref().unwrap_or("absent")
        );
        Self {
            api,
            store,
            console,
            state,
            names_dir,
        }
    }

    /// Let values from the process environment override the loaded ones.
    pub fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        self.state = std::mem::take(&mut self.state).overlay(lookup);
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn store(&self) -> &ConfigStore<S> {
        &self.store
    }

    pub fn api(&self) -> &ApiClient<T> {
        &self.api
    }

    /// Run from the main menu until the user quits. Only a console failure
    /// ends the loop early.
    pub fn run(&mut self) -> io::Result<()> {
        self.console.show(&Line::heading(
            "Welcome to the Account Creator/Manager Client",
        ));
        let mut screen = Screen::MainMenu;
        while let Some(next) = self.step(screen)? {
            screen = next;
        }
        Ok(())
    }

    /// Show `screen`, read one line and perform the resulting transition.
    /// Returns the next screen, or `None` once the user quits.
    pub fn step(&mut self, screen: Screen) -> io::Result<Option<Screen>> {
        self.console.show_all(&screen.lines());
        let input = self.console.read_line(screen.prompt())?;

        let next = match screen.accept(&input) {
            Transition::Show(next) => next,
            Transition::Unrecognized(same) => {
                self.console
                    .show(&Line::failure("Invalid option. Please try again."));
                same
            }
            Transition::Start(action) => self.start(action)?,
            Transition::Submit { action, request } => self.submit(action, request)?,
            Transition::Quit => {
                self.console.show(&Line::plain("Goodbye."));
                return Ok(None);
            }
        };
        Ok(Some(next))
    }

    fn start(&mut self, action: Action) -> io::Result<Screen> {
        match action {
            Action::GenerateIdentity => return self.generate_identity(),
            Action::CheckInbox => {
                // Local precondition: nothing to ask the service about.
                let Some(id) = self.state.active_email_id.clone() else {
                    self.report(action, &Error::NoActiveEmail);
                    return Ok(action.home());
                };
                return self.submit(action, Request::CheckInbox { id });
            }
            _ => {}
        }

        if !self.ensure_credential()? {
            return Ok(action.home());
        }
        if !action.params().is_empty() {
            return Ok(Screen::prompting(action, Vec::new()));
        }
        match action.build(Vec::new()) {
            Some(request) => self.submit(action, request),
            None => Ok(action.home()),
        }
    }

    /// Ask for the credential once if none is known yet, persist it, and
    /// report whether the caller may go on.
    fn ensure_credential(&mut self) -> io::Result<bool> {
        if self.state.credential.is_some() {
            return Ok(true);
        }
        let answer = self.console.read_secret(CREDENTIAL_PROMPT)?;
        let key = answer.trim();
        if key.is_empty() {
            self.console
                .show(&Line::failure("An API key is required for this action."));
            return Ok(false);
        }

        self.state.credential = Some(key.to_string());
        match self.store.persist(Key::Credential, key) {
            Ok(()) => self
                .console
                .show(&Line::success("API Key saved successfully.")),
            Err(e) => {
                warn!("credential not persisted: {e}");
                self.console
                    .show(&Line::failure(format!("API Key could not be saved: {e}")));
            }
        }
        Ok(true)
    }

    fn submit(&mut self, action: Action, request: Request) -> io::Result<Screen> {
        if !self.ensure_credential()? {
            return Ok(action.home());
        }
        let credential = self.state.credential.clone().unwrap_or_default();

        self.console.begin_wait(action.progress());
        let outcome = self.api.execute(&credential, &request);
        self.console.end_wait();

        match outcome {
            Ok(reply) => Ok(self.apply(action, request, reply)),
            Err(e) => {
                self.report(action, &e);
                Ok(action.home())
            }
        }
    }

    fn apply(&mut self, action: Action, request: Request, reply: Reply) -> Screen {
        if let Reply::Purchased(purchase) = &reply {
            self.remember_email(&purchase.id);
        }
        self.console.show_all(&format::render(&reply));
        self.console.show(&Line::plain(""));

        match (request, &reply) {
            (Request::Offers { site }, Reply::Offers(_)) => {
                Screen::prompting(Action::BuyEmail, vec![site])
            }
            _ => action.home(),
        }
    }

    /// The newest purchase replaces whatever id was on record.
    fn remember_email(&mut self, id: &str) {
        self.state.active_email_id = Some(id.to_string());
        if let Err(e) = self.store.persist(Key::ActiveEmail, id) {
            warn!("email id not persisted: {e}");
            self.console
                .show(&Line::failure(format!("Email ID could not be saved: {e}")));
        }
    }

    fn report(&mut self, action: Action, err: &Error) {
        let text = match err {
            Error::NoActiveEmail => {
                debug!("{} skipped: no active email", action.failure());
                "No email address saved. Please purchase one first.".to_string()
            }
            Error::Remote(code) => {
                warn!("{} rejected: {code}", action.failure());
                format!("{}: {code}", action.failure())
            }
            other => {
                warn!("{}: {other}", action.failure());
                format!("{}: {other}", action.failure())
            }
        };
        self.console.show(&Line::failure(text));
        self.console.show(&Line::plain(""));
    }

    fn generate_identity(&mut self) -> io::Result<Screen> {
        let action = Action::GenerateIdentity;
        let lists = match NameLists::load(&self.names_dir) {
            Ok(lists) => lists,
            Err(e) => {
                self.report(action, &e);
                return Ok(action.home());
            }
        };

        let mut rng = rand::thread_rng();
        loop {
            let identity = lists.generate(&mut rng);
            self.console.show_all(&[
                Line::success("Data generated! Your details are:"),
                Line::item(format!("First Name: {}", identity.first_name)),
                Line::item(format!("Last Name: {}", identity.last_name)),
                Line::item(format!("Username: {}", identity.username)),
            ]);

            let answer = self.console.read_line(CONFIRM_PROMPT)?;
            if matches!(answer.trim().to_ascii_lowercase().as_str(), "yes" | "y") {
                self.console
                    .show(&Line::success("Returning to the main menu..."));
                return Ok(action.home());
            }
            self.console.show(&Line::item("Generating new details..."));
        }
    }
}
