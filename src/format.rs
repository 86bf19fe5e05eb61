//! Turns decoded replies into display lines. Pure functions, no I/O.

use crate::types::{
    ActivationStatus, Country, EmailOffer, EmailPurchase, PriceQuote, PurchasedEmail, Rental,
    Reply,
};

/// How a line should be presented; the terminal maps tones to colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Heading,
    Menu,
    Item,
    Success,
    Failure,
}

/// One line of output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub tone: Tone,
    pub text: String,
}

impl Line {
    pub fn new(tone: Tone, text: impl Into<String>) -> Self {
        Self {
            tone,
            text: text.into(),
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(Tone::Plain, text)
    }

    pub fn heading(text: impl Into<String>) -> Self {
        Self::new(Tone::Heading, text)
    }

    pub fn item(text: impl Into<String>) -> Self {
        Self::new(Tone::Item, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(Tone::Success, text)
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self::new(Tone::Failure, text)
    }
}

/// Render any reply.
pub fn render(reply: &Reply) -> Vec<Line> {
    match reply {
        Reply::Countries(countries) => format_countries(countries),
        Reply::Operators { country, operators } => format_operators(country, operators),
        Reply::Prices { service, quotes } => format_prices(service, quotes),
        Reply::Rental(rental) => format_rental(rental),
        Reply::Status(status) => format_status(status),
        Reply::Balance(amount) => vec![Line::success(format!("Account balance: {amount}"))],
        Reply::Offers(offers) => format_offers(offers),
        Reply::Purchased(purchase) => format_purchase(purchase),
        Reply::History(list) => format_history(list),
        Reply::Cancelled => vec![Line::success("Purchase canceled successfully.")],
        Reply::Inbox(message) => format_inbox(message.as_deref()),
    }
}

pub fn format_countries(countries: &[Country]) -> Vec<Line> {
    if countries.is_empty() {
        return vec![Line::failure("No countries available.")];
    }
    let mut lines = vec![Line::heading("Available countries:")];
    lines.extend(
        countries
            .iter()
            .map(|c| Line::item(format!("ID: {} - Country: {}", c.id, c.name))),
    );
    lines
}

pub fn format_operators(country: &str, operators: &[String]) -> Vec<Line> {
    if operators.is_empty() {
        return vec![Line::failure(format!(
            "No operators available for country {country}."
        ))];
    }
    let mut lines = vec![Line::heading(format!("Available operators for country {country}:"))];
    lines.extend(operators.iter().map(|op| Line::item(format!("- Operator: {op}"))));
    lines
}

pub fn format_prices(service: &str, quotes: &[PriceQuote]) -> Vec<Line> {
    if quotes.is_empty() {
        return vec![Line::failure(format!(
            "No prices available for the {service} service."
        ))];
    }
    let mut lines = vec![Line::heading(format!(
        "Available prices for the {service} service:"
    ))];
    for quote in quotes {
        lines.push(Line::item(format!("Country: {}", quote.country)));
        lines.push(Line::item(format!(
            "Quantity available: {}",
            quote.available_count
        )));
        lines.push(Line::item(format!("Price: {}", quote.price)));
    }
    lines
}

pub fn format_rental(rental: &Rental) -> Vec<Line> {
    match rental {
        Rental::NoNumbers => vec![Line::failure(
            "No numbers available for this service and country.",
        )],
        Rental::Number {
            activation_id,
            phone_number,
        } => vec![
            Line::success("Phone number obtained:"),
            Line::item(format!("ACCESS_NUMBER: {activation_id}")),
            Line::item(format!("PHONE_NUMBER: {phone_number}")),
        ],
    }
}

pub fn format_status(status: &ActivationStatus) -> Vec<Line> {
    let mut lines = vec![Line::success(format!("Activation status: {}", status.code))];
    if let Some(detail) = status.detail.as_deref().filter(|d| !d.is_empty()) {
        lines.push(Line::item(format!("Code: {detail}")));
    }
    lines
}

pub fn format_offers(offers: &[EmailOffer]) -> Vec<Line> {
    if offers.is_empty() {
        return vec![Line::failure("No offers available for this site.")];
    }
    let mut lines = vec![Line::heading("Offer list obtained:")];
    lines.extend(
        offers
            .iter()
            .map(|o| Line::item(format!("- Name: {}, Cost: {}", o.name, o.cost))),
    );
    lines
}

pub fn format_purchase(purchase: &PurchasedEmail) -> Vec<Line> {
    vec![
        Line::success(format!("Email purchased: {}", purchase.email)),
        Line::item(format!("ID: {}", purchase.id)),
    ]
}

pub fn format_history(list: &[EmailPurchase]) -> Vec<Line> {
    if list.is_empty() {
        return vec![Line::failure("No active purchases.")];
    }
    let mut lines = vec![Line::heading("Active purchase list:")];
    for (index, purchase) in list.iter().enumerate() {
        lines.push(Line::item(format!("Purchase {}:", index + 1)));
        lines.push(Line::item(format!("ID: {}", purchase.id)));
        lines.push(Line::item(format!("Email: {}", purchase.email)));
        lines.push(Line::item(format!("Site: {}", purchase.site)));
        lines.push(Line::item(format!("Status: {}", purchase.status)));
        lines.push(Line::item(format!("Date: {}", purchase.date)));
    }
    lines
}

/// Blank and absent messages both render as "no message".
pub fn format_inbox(message: Option<&str>) -> Vec<Line> {
    match message.filter(|m| !m.trim().is_empty()) {
        Some(text) => vec![
            Line::heading("Incoming emails:"),
            Line::item("Message content:"),
            Line::item(text),
        ],
        None => vec![Line::failure("No message in the inbox yet.")],
    }
}
