//! Catalog and purchase entities decoded from service replies.
//!
//! Nothing here is cached; every value lives for one formatted reply.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Render a JSON scalar the way it should appear on screen. Ids, counts and
/// prices come back as strings or numbers depending on the endpoint.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub(crate) fn scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_text(&value))
}

/// A country the service rents numbers in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Country {
    #[serde(default, deserialize_with = "scalar")]
    pub id: String,
    /// English name.
    #[serde(default, rename = "eng", deserialize_with = "scalar")]
    pub name: String,
}

/// Availability and price of a service in one country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuote {
    pub country: String,
    pub available_count: String,
    pub price: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PriceRecord {
    #[serde(default, deserialize_with = "scalar")]
    pub count: String,
    #[serde(default, deserialize_with = "scalar")]
    pub price: String,
}

/// Outcome of a number rental.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rental {
    Number {
        activation_id: String,
        phone_number: String,
    },
    /// The service has nothing for this service/country pair.
    NoNumbers,
}

/// Activation status, e.g. `STATUS_WAIT_CODE` or `STATUS_OK` with the code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationStatus {
    pub code: String,
    pub detail: Option<String>,
}

/// One email domain zone offered for a site.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmailOffer {
    #[serde(default, deserialize_with = "scalar")]
    pub name: String,
    #[serde(default, deserialize_with = "scalar")]
    pub cost: String,
}

/// A freshly bought address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PurchasedEmail {
    #[serde(deserialize_with = "scalar")]
    pub id: String,
    #[serde(default, deserialize_with = "scalar")]
    pub email: String,
}

/// An entry of the purchase history.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmailPurchase {
    #[serde(default, deserialize_with = "scalar")]
    pub id: String,
    #[serde(default, deserialize_with = "scalar")]
    pub email: String,
    #[serde(default, deserialize_with = "scalar")]
    pub site: String,
    #[serde(default, deserialize_with = "scalar")]
    pub status: String,
    #[serde(default, deserialize_with = "scalar")]
    pub date: String,
}

/// A decoded, typed reply for one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Countries(Vec<Country>),
    Operators {
        country: String,
        operators: Vec<String>,
    },
    Prices {
        service: String,
        quotes: Vec<PriceQuote>,
    },
    Rental(Rental),
    Status(ActivationStatus),
    Balance(String),
    Offers(Vec<EmailOffer>),
    Purchased(PurchasedEmail),
    History(Vec<EmailPurchase>),
    Cancelled,
    /// Inbox content; `None` when there is no usable message.
    Inbox(Option<String>),
}
