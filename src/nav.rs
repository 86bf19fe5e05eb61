//! Menu navigation as an explicit state machine.
//!
//! Every screen consumes exactly one line of input and yields a
//! [`Transition`]. Menus are data: each one is a table of
//! [`MenuEntry`] rows, and each action knows the screen it returns to once
//! it finishes, whether it succeeded or not.

use crate::api::Request;
use crate::format::{Line, Tone};

/// The three menus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Menu {
    Main,
    Info,
    Email,
}

/// What the session is currently waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    MainMenu,
    InfoMenu,
    EmailMenu,
    /// Collecting the positional parameters of `action`, in declared order.
    Prompting {
        action: Action,
        collected: Vec<String>,
    },
}

impl From<Menu> for Screen {
    fn from(menu: Menu) -> Self {
        match menu {
            Menu::Main => Screen::MainMenu,
            Menu::Info => Screen::InfoMenu,
            Menu::Email => Screen::EmailMenu,
        }
    }
}

/// Everything a user can launch from a menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Countries,
    Operators,
    Prices,
    RentNumber,
    ActivationStatus,
    GenerateIdentity,
    CheckInbox,
    Balance,
    Offers,
    BuyEmail,
    PurchaseHistory,
    CancelEmail,
}

/// A positional parameter and the prompt asking for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub prompt: &'static str,
}

const COUNTRY: Param = Param {
    name: "country",
    prompt: "Enter the country code",
};
const SERVICE: Param = Param {
    name: "service",
    prompt: "Enter the service code (e.g., wa for WhatsApp, tg for Telegram)",
};
const SITE: Param = Param {
    name: "site",
    prompt: "Enter the site for which you want to obtain email verification",
};

impl Action {
    /// Parameters collected before the call, in the order they are asked.
    pub fn params(&self) -> &'static [Param] {
        match self {
            Action::Operators => &[COUNTRY],
            Action::Prices => &[SERVICE],
            Action::RentNumber => &[SERVICE, COUNTRY],
            Action::ActivationStatus => &[Param {
                name: "id",
                prompt: "Enter the activation ID",
            }],
            Action::Offers => &[SITE],
            Action::BuyEmail => &[
                SITE,
                Param {
                    name: "mail_type",
                    prompt: "Enter the type of email (1 for domains, 2 for popular zones)",
                },
                Param {
                    name: "mail_domain",
                    prompt: "Enter the email domain (e.g., mail.ru)",
                },
            ],
            Action::CancelEmail => &[Param {
                name: "id",
                prompt: "Enter the ID of the purchase to cancel",
            }],
            Action::Countries
            | Action::GenerateIdentity
            | Action::CheckInbox
            | Action::Balance
            | Action::PurchaseHistory => &[],
        }
    }

    /// Screen the action returns to, after success or failure alike.
    pub fn home(&self) -> Screen {
        match self {
            Action::Countries | Action::Operators | Action::Prices => Screen::InfoMenu,
            Action::RentNumber
            | Action::ActivationStatus
            | Action::GenerateIdentity
            | Action::CheckInbox
            | Action::Balance => Screen::MainMenu,
            Action::Offers | Action::BuyEmail | Action::PurchaseHistory | Action::CancelEmail => {
                Screen::EmailMenu
            }
        }
    }

    /// Whether the action talks to the service at all.
    pub fn is_remote(&self) -> bool {
        !matches!(self, Action::GenerateIdentity)
    }

    /// Shown next to the spinner while the call is in flight.
    pub fn progress(&self) -> &'static str {
        match self {
            Action::Countries => "Fetching countries...",
            Action::Operators => "Fetching operators...",
            Action::Prices => "Fetching prices...",
            Action::RentNumber => "Renting a number...",
            Action::ActivationStatus => "Checking activation status...",
            Action::GenerateIdentity => "Generating details...",
            Action::CheckInbox => "Checking inbox...",
            Action::Balance => "Checking balance...",
            Action::Offers => "Fetching offers...",
            Action::BuyEmail => "Purchasing email...",
            Action::PurchaseHistory => "Fetching purchases...",
            Action::CancelEmail => "Canceling purchase...",
        }
    }

    /// Prefix of the line reporting a failure of this action.
    pub fn failure(&self) -> &'static str {
        match self {
            Action::Countries => "Error fetching countries",
            Action::Operators => "Error fetching operators",
            Action::Prices => "Error fetching prices",
            Action::RentNumber => "Error obtaining phone number",
            Action::ActivationStatus => "Error fetching activation status",
            Action::GenerateIdentity => "Error generating details",
            Action::CheckInbox => "Error checking incoming emails",
            Action::Balance => "Error checking account balance",
            Action::Offers => "Error obtaining offer list",
            Action::BuyEmail => "Error purchasing email verification",
            Action::PurchaseHistory => "Error obtaining active purchase list",
            Action::CancelEmail => "Error canceling the purchase",
        }
    }

    /// Build the wire request from fully collected parameters. Actions that
    /// are not driven by prompted parameters yield `None`.
    pub fn build(&self, collected: Vec<String>) -> Option<Request> {
        if collected.len() != self.params().len() {
            return None;
        }
        let mut values = collected.into_iter();
        let mut next = || values.next().unwrap_or_default();
        let request = match self {
            Action::Countries => Request::Countries,
            Action::Operators => Request::Operators { country: next() },
            Action::Prices => Request::Prices { service: next() },
            Action::RentNumber => Request::RentNumber {
                service: next(),
                country: next(),
            },
            Action::ActivationStatus => Request::ActivationStatus { id: next() },
            Action::Balance => Request::Balance,
            Action::Offers => Request::Offers { site: next() },
            Action::BuyEmail => Request::BuyEmail {
                site: next(),
                mail_type: next(),
                mail_domain: next(),
            },
            Action::PurchaseHistory => Request::PurchaseHistory,
            Action::CancelEmail => Request::CancelEmail { id: next() },
            Action::GenerateIdentity | Action::CheckInbox => return None,
        };
        Some(request)
    }
}

/// What selecting a menu row does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Open(Menu),
    Start(Action),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEntry {
    pub key: &'static str,
    pub label: &'static str,
    pub choice: Choice,
}

const fn entry(key: &'static str, label: &'static str, choice: Choice) -> MenuEntry {
    MenuEntry { key, label, choice }
}

const MAIN_MENU: &[MenuEntry] = &[
    entry("1", "Get General Information", Choice::Open(Menu::Info)),
    entry("2", "Rent a Phone Number", Choice::Start(Action::RentNumber)),
    entry("3", "Receive Activation Code", Choice::Start(Action::ActivationStatus)),
    entry(
        "4",
        "Generate Random Name and Username",
        Choice::Start(Action::GenerateIdentity),
    ),
    entry("5", "Manage Email Addresses", Choice::Open(Menu::Email)),
    entry("6", "Check Incoming Emails", Choice::Start(Action::CheckInbox)),
    entry("7", "Check Account Balance", Choice::Start(Action::Balance)),
    entry("8", "Exit", Choice::Quit),
];

const INFO_MENU: &[MenuEntry] = &[
    entry("1", "Check Available Countries", Choice::Start(Action::Countries)),
    entry("2", "Check Available Operators", Choice::Start(Action::Operators)),
    entry("3", "Check Prices", Choice::Start(Action::Prices)),
    entry("4", "Get back to Main Menu", Choice::Open(Menu::Main)),
];

const EMAIL_MENU: &[MenuEntry] = &[
    entry("1", "Purchase Email Verification", Choice::Start(Action::Offers)),
    entry("2", "Get Active Purchase List", Choice::Start(Action::PurchaseHistory)),
    entry("3", "Cancel Email Purchase", Choice::Start(Action::CancelEmail)),
    entry("4", "Get back to Main Menu", Choice::Open(Menu::Main)),
];

impl Menu {
    pub fn entries(&self) -> &'static [MenuEntry] {
        match self {
            Menu::Main => MAIN_MENU,
            Menu::Info => INFO_MENU,
            Menu::Email => EMAIL_MENU,
        }
    }

    pub fn select(&self, input: &str) -> Option<Choice> {
        let input = input.trim();
        self.entries()
            .iter()
            .find(|e| e.key == input)
            .map(|e| e.choice)
    }
}

/// Result of feeding one line of input to a screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Move to another screen without side effects.
    Show(Screen),
    /// Input matched no option; stay on the same screen.
    Unrecognized(Screen),
    /// An action was picked from a menu.
    Start(Action),
    /// All parameters are in; issue the call.
    Submit { action: Action, request: Request },
    Quit,
}

impl Screen {
    /// Start collecting parameters for `action`, optionally with some
    /// already known.
    pub fn prompting(action: Action, collected: Vec<String>) -> Self {
        Screen::Prompting { action, collected }
    }

    pub fn menu(&self) -> Option<Menu> {
        match self {
            Screen::MainMenu => Some(Menu::Main),
            Screen::InfoMenu => Some(Menu::Info),
            Screen::EmailMenu => Some(Menu::Email),
            Screen::Prompting { .. } => None,
        }
    }

    /// Lines displayed before the prompt; empty while collecting parameters.
    pub fn lines(&self) -> Vec<Line> {
        self.menu()
            .map(|menu| {
                menu.entries()
                    .iter()
                    .map(|e| Line::new(Tone::Menu, format!("{}. {}", e.key, e.label)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Text of the single-line prompt for this screen.
    pub fn prompt(&self) -> &'static str {
        match self {
            Screen::Prompting { action, collected } => action
                .params()
                .get(collected.len())
                .map(|p| p.prompt)
                .unwrap_or("Enter a value"),
            _ => "Select an option",
        }
    }

    /// Consume one line of input.
    pub fn accept(self, input: &str) -> Transition {
        match self {
            Screen::Prompting {
                action,
                mut collected,
            } => {
                collected.push(input.trim().to_string());
                if collected.len() < action.params().len() {
                    return Transition::Show(Screen::Prompting { action, collected });
                }
                match action.build(collected) {
                    Some(request) => Transition::Submit { action, request },
                    None => Transition::Show(action.home()),
                }
            }
            menu_screen => {
                let choice = menu_screen.menu().and_then(|m| m.select(input));
                match choice {
                    Some(Choice::Open(menu)) => Transition::Show(menu.into()),
                    Some(Choice::Start(action)) => Transition::Start(action),
                    Some(Choice::Quit) => Transition::Quit,
                    None => Transition::Unrecognized(menu_screen),
                }
            }
        }
    }
}
