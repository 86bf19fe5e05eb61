// API client module: a small blocking client for the activation service's
// handler endpoint. Every logical action is one GET against the same URL,
// told apart by the `action` query parameter.
//
// The service answers in three different shapes depending on the action:
// colon-delimited text, a flat JSON object keyed by opaque ids, and a
// `{status, response}` envelope. The decoder is picked from the request,
// never guessed from the body.

use std::collections::BTreeMap;
use std::time::Duration;

use log::{debug, warn};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::settings::Settings;
use crate::types::{
    scalar_text, ActivationStatus, Country, EmailOffer, EmailPurchase, PriceQuote, PriceRecord,
    PurchasedEmail, Rental, Reply,
};

/// Plain-text codes the service sends instead of a payload to report a
/// failed action.
const ERROR_SENTINELS: &[&str] = &[
    "BAD_KEY",
    "BAD_ACTION",
    "BAD_SERVICE",
    "NO_BALANCE",
    "ERROR_SQL",
    "WRONG_SERVICE",
    "NO_ACTIVATION",
    "WRONG_ACTIVATION_ID",
    "BANNED",
    "WRONG_MAX_PRICE",
];

/// Reply to `getNumber` when nothing is available.
const NO_NUMBERS: &str = "NO_NUMBERS";

const BALANCE_PREFIX: &str = "ACCESS_BALANCE:";

/// Status code and decoded body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

/// The network collaborator: one GET with query parameters.
pub trait Transport {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpReply>;
}

/// reqwest-backed transport.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpReply> {
        let res = self.client.get(url).query(query).send()?;
        let status = res.status().as_u16();
        let body = res.text()?;
        Ok(HttpReply { status, body })
    }
}

/// Wire shape a given action answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Text,
    Flat,
    Envelope,
}

/// A reply decoded only as far as its wire shape.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResult {
    /// Trimmed text body, already checked against the error sentinels.
    Text(String),
    /// Top-level JSON object keyed by opaque ids.
    Flat(Map<String, Value>),
    /// `response` payload of an `OK` envelope; `Null` when absent.
    Enveloped(Value),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: Value,
    #[serde(default)]
    response: Option<Value>,
}

/// One remote action with its collected parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Countries,
    Operators { country: String },
    Prices { service: String },
    RentNumber { service: String, country: String },
    ActivationStatus { id: String },
    Balance,
    Offers { site: String },
    BuyEmail {
        site: String,
        mail_type: String,
        mail_domain: String,
    },
    PurchaseHistory,
    CancelEmail { id: String },
    CheckInbox { id: String },
}

impl Request {
    /// Value of the `action` query parameter.
    pub fn action(&self) -> &'static str {
        match self {
            Request::Countries => "getCountries",
            Request::Operators { .. } => "getOperators",
            Request::Prices { .. } => "getPricesVerification",
            Request::RentNumber { .. } => "getNumber",
            Request::ActivationStatus { .. } => "getStatus",
            Request::Balance => "getBalance",
            Request::Offers { .. } => "getDomains",
            Request::BuyEmail { .. } => "buyMailActivation",
            Request::PurchaseHistory => "getMailHistory",
            Request::CancelEmail { .. } => "cancelMailActivation",
            Request::CheckInbox { .. } => "checkMailActivation",
        }
    }

    /// Action-specific query parameters, in wire order.
    pub fn params(&self) -> Vec<(&'static str, &str)> {
        match self {
            Request::Countries | Request::Balance => Vec::new(),
            Request::Operators { country } => vec![("country", country.as_str())],
            Request::Prices { service } => vec![("service", service.as_str())],
            Request::RentNumber { service, country } => {
                vec![("service", service.as_str()), ("country", country.as_str())]
            }
            Request::ActivationStatus { id }
            | Request::CancelEmail { id }
            | Request::CheckInbox { id } => vec![("id", id.as_str())],
            Request::Offers { site } => vec![("site", site.as_str())],
            Request::BuyEmail {
                site,
                mail_type,
                mail_domain,
            } => vec![
                ("site", site.as_str()),
                ("mail_type", mail_type.as_str()),
                ("mail_domain", mail_domain.as_str()),
            ],
            Request::PurchaseHistory => vec![("page", "1"), ("per_page", "10")],
        }
    }

    pub fn shape(&self) -> Shape {
        match self {
            Request::RentNumber { .. } | Request::ActivationStatus { .. } | Request::Balance => {
                Shape::Text
            }
            Request::Countries | Request::Operators { .. } | Request::Prices { .. } => Shape::Flat,
            Request::Offers { .. }
            | Request::BuyEmail { .. }
            | Request::PurchaseHistory
            | Request::CancelEmail { .. }
            | Request::CheckInbox { .. } => Shape::Envelope,
        }
    }
}

/// Client for the activation service.
pub struct ApiClient<T = HttpTransport> {
    transport: T,
    base_url: String,
}

impl ApiClient<HttpTransport> {
    /// Create a client for the endpoint and timeout in `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let transport = HttpTransport::new(settings.timeout)?;
        Ok(Self::new(transport, &settings.api_url))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, base_url: &str) -> Self {
        Self {
            transport,
            base_url: base_url.to_string(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Issue one action and decode the body as `shape`. No retries.
    pub fn call(
        &self,
        credential: &str,
        action: &str,
        params: &[(&str, &str)],
        shape: Shape,
    ) -> Result<RawResult> {
        let names: Vec<&str> = params.iter().map(|(k, _)| *k).collect();
        debug!("calling {action} with {names:?}");

        let mut query = Vec::with_capacity(params.len() + 2);
        query.push(("action", action));
        query.extend_from_slice(params);
        query.push(("api_key", credential));

        let reply = self.transport.get(&self.base_url, &query)?;
        if !(200..300).contains(&reply.status) {
            warn!("{action} answered HTTP {}", reply.status);
            return Err(Error::Transport(format!(
                "HTTP {}: {}",
                reply.status,
                reply.body.trim()
            )));
        }
        decode_raw(shape, &reply.body)
    }

    /// Issue `request` and decode the reply into its typed form.
    pub fn execute(&self, credential: &str, request: &Request) -> Result<Reply> {
        let raw = self.call(
            credential,
            request.action(),
            &request.params(),
            request.shape(),
        )?;
        decode_reply(request, raw)
    }
}

/// Code of a known error sentinel at the head of `body`, if any.
fn error_sentinel(body: &str) -> Option<&str> {
    let head = body.split(':').next().unwrap_or_default();
    ERROR_SENTINELS
        .iter()
        .any(|code| *code == head)
        .then_some(head)
}

/// Decode a body as the given wire shape.
pub fn decode_raw(shape: Shape, body: &str) -> Result<RawResult> {
    let body = body.trim();
    if let Some(code) = error_sentinel(body) {
        return Err(Error::Remote(code.to_string()));
    }

    match shape {
        Shape::Text => Ok(RawResult::Text(body.to_string())),
        Shape::Flat => match serde_json::from_str::<Value>(body)? {
            Value::Object(map) => Ok(RawResult::Flat(map)),
            other => Err(Error::Decode(format!(
                "expected a JSON object, got {}",
                kind(&other)
            ))),
        },
        Shape::Envelope => {
            let envelope: Envelope = serde_json::from_str(body)?;
            let status = scalar_text(&envelope.status);
            if status != "OK" {
                return Err(Error::Remote(status));
            }
            Ok(RawResult::Enveloped(envelope.response.unwrap_or(Value::Null)))
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Turn a shape-level result into the typed reply for `request`.
pub fn decode_reply(request: &Request, raw: RawResult) -> Result<Reply> {
    match (request, raw) {
        (Request::Countries, RawResult::Flat(map)) => decode_countries(map),
        (Request::Operators { country }, RawResult::Flat(map)) => {
            decode_operators(country, map)
        }
        (Request::Prices { service }, RawResult::Flat(map)) => decode_prices(service, map),
        (Request::RentNumber { .. }, RawResult::Text(text)) => decode_rental(&text),
        (Request::ActivationStatus { .. }, RawResult::Text(text)) => Ok(decode_status(&text)),
        (Request::Balance, RawResult::Text(text)) => decode_balance(&text),
        (Request::Offers { .. }, RawResult::Enveloped(payload)) => {
            #[derive(Deserialize)]
            struct Zones {
                #[serde(default)]
                zones: Vec<EmailOffer>,
            }
            let zones: Zones = from_payload(payload)?;
            Ok(Reply::Offers(zones.zones))
        }
        (Request::BuyEmail { .. }, RawResult::Enveloped(payload)) => {
            Ok(Reply::Purchased(from_payload::<PurchasedEmail>(payload)?))
        }
        (Request::PurchaseHistory, RawResult::Enveloped(payload)) => {
            #[derive(Deserialize)]
            struct History {
                #[serde(default)]
                list: Vec<EmailPurchase>,
            }
            let history: History = from_payload(payload)?;
            Ok(Reply::History(history.list))
        }
        (Request::CancelEmail { .. }, RawResult::Enveloped(_)) => Ok(Reply::Cancelled),
        (Request::CheckInbox { .. }, RawResult::Enveloped(payload)) => {
            let message = payload
                .get("value")
                .and_then(Value::as_str)
                .filter(|m| !m.trim().is_empty())
                .map(str::to_string);
            Ok(Reply::Inbox(message))
        }
        (request, _) => Err(Error::Decode(format!(
            "unexpected reply shape for {}",
            request.action()
        ))),
    }
}

fn from_payload<T: for<'de> Deserialize<'de>>(payload: Value) -> Result<T> {
    if payload.is_null() {
        return Err(Error::Decode("envelope has no response payload".into()));
    }
    Ok(serde_json::from_value(payload)?)
}

fn decode_countries(map: Map<String, Value>) -> Result<Reply> {
    let mut countries = map
        .into_iter()
        .map(|(key, value)| -> Result<Country> {
            let mut country: Country = serde_json::from_value(value)?;
            if country.id.is_empty() {
                country.id = key;
            }
            Ok(country)
        })
        .collect::<Result<Vec<_>>>()?;
    countries.sort_by(|a, b| {
        match (a.id.parse::<u64>(), b.id.parse::<u64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            _ => a.id.cmp(&b.id),
        }
    });
    Ok(Reply::Countries(countries))
}

fn decode_operators(country: &str, mut map: Map<String, Value>) -> Result<Reply> {
    let operators = match map.remove("countryOperators") {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => {
            let by_country: BTreeMap<String, Vec<Value>> = serde_json::from_value(value)?;
            by_country
                .get(country)
                .map(|names| names.iter().map(scalar_text).collect())
                .unwrap_or_default()
        }
    };
    Ok(Reply::Operators {
        country: country.to_string(),
        operators,
    })
}

fn decode_prices(service: &str, mut map: Map<String, Value>) -> Result<Reply> {
    let quotes = match map.remove(service) {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => {
            let by_country: BTreeMap<String, PriceRecord> = serde_json::from_value(value)?;
            by_country
                .into_iter()
                .map(|(country, record)| PriceQuote {
                    country,
                    available_count: record.count,
                    price: record.price,
                })
                .collect()
        }
    };
    Ok(Reply::Prices {
        service: service.to_string(),
        quotes,
    })
}

/// `STATUS:ID:PHONE`, or the no-availability sentinel. The sentinel is
/// checked before splitting; fewer than three fields is a decode error.
pub fn decode_rental(text: &str) -> Result<Reply> {
    if text.contains(NO_NUMBERS) {
        return Ok(Reply::Rental(Rental::NoNumbers));
    }
    let fields: Vec<&str> = text.split(':').collect();
    if fields.len() < 3 {
        return Err(Error::Decode(format!("malformed number reply: {text}")));
    }
    Ok(Reply::Rental(Rental::Number {
        activation_id: fields[1].to_string(),
        phone_number: fields[2].to_string(),
    }))
}

fn decode_status(text: &str) -> Reply {
    let status = match text.split_once(':') {
        Some((code, detail)) => ActivationStatus {
            code: code.to_string(),
            detail: Some(detail.to_string()),
        },
        None => ActivationStatus {
            code: text.to_string(),
            detail: None,
        },
    };
    Reply::Status(status)
}

fn decode_balance(text: &str) -> Result<Reply> {
    text.strip_prefix(BALANCE_PREFIX)
        .map(|amount| Reply::Balance(amount.to_string()))
        .ok_or_else(|| Error::Decode(format!("malformed balance reply: {text}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct Canned {
        reply: HttpReply,
        seen: RefCell<Vec<Vec<(String, String)>>>,
    }

    impl Canned {
        fn new(status: u16, body: &str) -> Self {
            Self {
                reply: HttpReply {
                    status,
                    body: body.to_string(),
                },
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for Canned {
        fn get(&self, _url: &str, query: &[(&str, &str)]) -> Result<HttpReply> {
            self.seen.borrow_mut().push(
                query
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            );
            Ok(self.reply.clone())
        }
    }

    fn execute(status: u16, body: &str, request: &Request) -> Result<Reply> {
        ApiClient::new(Canned::new(status, body), "http://localhost/handler")
            .execute("key", request)
    }

    #[test]
    fn test_query_carries_action_params_and_key() {
        let client = ApiClient::new(
            Canned::new(200, "ACCESS_NUMBER:1:2"),
            "http://localhost/handler",
        );
        let request = Request::RentNumber {
            service: "wa".into(),
            country: "6".into(),
        };
        client.execute("secret", &request).unwrap();
        let seen = client.transport().seen.borrow();
        let pairs: Vec<(&str, &str)> = seen[0]
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("action", "getNumber"),
                ("service", "wa"),
                ("country", "6"),
                ("api_key", "secret"),
            ]
        );
    }

    #[test]
    fn test_rental_fields() {
        let reply = decode_rental("ACCESS_ACTIVATION:12345:15551234567").unwrap();
        assert_eq!(
            reply,
            Reply::Rental(Rental::Number {
                activation_id: "12345".into(),
                phone_number: "15551234567".into(),
            })
        );
    }

    #[test]
    fn test_rental_extra_fields_are_ignored() {
        let reply = decode_rental("ACCESS_NUMBER:1:2:3").unwrap();
        assert!(matches!(
            reply,
            Reply::Rental(Rental::Number { ref phone_number, .. }) if phone_number == "2"
        ));
    }

    #[test]
    fn test_rental_sentinel_short_circuits() {
        assert_eq!(
            decode_rental("NO_NUMBERS").unwrap(),
            Reply::Rental(Rental::NoNumbers)
        );
    }

    #[test]
    fn test_rental_too_few_fields() {
        assert!(matches!(decode_rental("ACCESS_NUMBER:1"), Err(Error::Decode(_))));
    }

    #[test]
    fn test_text_error_sentinel() {
        let err = execute(200, "BAD_KEY", &Request::Balance).unwrap_err();
        assert!(matches!(err, Error::Remote(ref code) if code == "BAD_KEY"));
    }

    #[test]
    fn test_balance() {
        let reply = execute(200, "ACCESS_BALANCE:12.50\n", &Request::Balance).unwrap();
        assert_eq!(reply, Reply::Balance("12.50".into()));
        assert!(matches!(
            execute(200, "whatever", &Request::Balance),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn test_status_with_code() {
        let reply = execute(
            200,
            "STATUS_OK:4821",
            &Request::ActivationStatus { id: "1".into() },
        )
        .unwrap();
        assert_eq!(
            reply,
            Reply::Status(ActivationStatus {
                code: "STATUS_OK".into(),
                detail: Some("4821".into()),
            })
        );
    }

    #[test]
    fn test_non_success_status_is_transport_error() {
        let err = execute(502, "bad gateway", &Request::Countries).unwrap_err();
        assert!(matches!(err, Error::Transport(ref m) if m.contains("502")));
    }

    #[test]
    fn test_countries_sorted_by_id() {
        let body = r#"{"10":{"id":10,"eng":"Vietnam"},"2":{"id":2,"eng":"Kazakhstan"},"0":{"id":0,"eng":"Russia"}}"#;
        let Reply::Countries(countries) = execute(200, body, &Request::Countries).unwrap() else {
            panic!("expected countries");
        };
        let ids: Vec<&str> = countries.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "2", "10"]);
        assert_eq!(countries[2].name, "Vietnam");
    }

    #[test]
    fn test_country_with_null_name_decodes_unnamed() {
        let body = r#"{"0":{"id":0,"eng":"Russia"},"1":{"id":1,"eng":null}}"#;
        let Reply::Countries(countries) = execute(200, body, &Request::Countries).unwrap() else {
            panic!("expected countries");
        };
        assert_eq!(countries.len(), 2);
        assert_eq!(countries[0].name, "Russia");
        assert_eq!(countries[1].id, "1");
        assert_eq!(countries[1].name, "");
    }

    #[test]
    fn test_flat_shape_rejects_non_object() {
        assert!(matches!(
            execute(200, "[1,2]", &Request::Countries),
            Err(Error::Decode(_))
        ));
        assert!(matches!(
            execute(200, "<html>", &Request::Countries),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn test_operators_for_country() {
        let body = r#"{"status":"success","countryOperators":{"6":["telkomsel","indosat"],"0":[]}}"#;
        let reply = execute(200, body, &Request::Operators { country: "6".into() }).unwrap();
        assert_eq!(
            reply,
            Reply::Operators {
                country: "6".into(),
                operators: vec!["telkomsel".into(), "indosat".into()],
            }
        );
        let reply = execute(200, body, &Request::Operators { country: "9".into() }).unwrap();
        assert!(matches!(reply, Reply::Operators { ref operators, .. } if operators.is_empty()));
    }

    #[test]
    fn test_prices_accept_numbers_and_strings() {
        let body = r#"{"tg":{"0":{"count":120,"price":"18.5"},"6":{"count":"3","price":9}}}"#;
        let Reply::Prices { quotes, .. } =
            execute(200, body, &Request::Prices { service: "tg".into() }).unwrap()
        else {
            panic!("expected prices");
        };
        assert_eq!(
            quotes,
            vec![
                PriceQuote {
                    country: "0".into(),
                    available_count: "120".into(),
                    price: "18.5".into(),
                },
                PriceQuote {
                    country: "6".into(),
                    available_count: "3".into(),
                    price: "9".into(),
                },
            ]
        );
    }

    #[test]
    fn test_envelope_error_status() {
        let request = Request::BuyEmail {
            site: "x".into(),
            mail_type: "1".into(),
            mail_domain: "mail.ru".into(),
        };
        let err = execute(200, r#"{"status":"NO_BALANCE"}"#, &request).unwrap_err();
        assert!(matches!(err, Error::Remote(ref code) if code == "NO_BALANCE"));
    }

    #[test]
    fn test_purchase_payload() {
        let request = Request::BuyEmail {
            site: "x".into(),
            mail_type: "1".into(),
            mail_domain: "mail.ru".into(),
        };
        let body = r#"{"status":"OK","response":{"id":7,"email":"x@y.com"}}"#;
        assert_eq!(
            execute(200, body, &request).unwrap(),
            Reply::Purchased(PurchasedEmail {
                id: "7".into(),
                email: "x@y.com".into(),
            })
        );
        assert!(matches!(
            execute(200, r#"{"status":"OK"}"#, &request),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn test_inbox_blank_message_is_none() {
        let request = Request::CheckInbox { id: "7".into() };
        let blank = r#"{"status":"OK","response":{"value":"   "}}"#;
        assert_eq!(execute(200, blank, &request).unwrap(), Reply::Inbox(None));
        let absent = r#"{"status":"OK"}"#;
        assert_eq!(execute(200, absent, &request).unwrap(), Reply::Inbox(None));
        let full = r#"{"status":"OK","response":{"value":"code 1234"}}"#;
        assert_eq!(
            execute(200, full, &request).unwrap(),
            Reply::Inbox(Some("code 1234".into()))
        );
    }

    #[test]
    fn test_history_list() {
        let body = r#"{"status":"OK","response":{"list":[{"id":1,"email":"a@b.c","site":"x","status":"active","date":"2024-01-01"}]}}"#;
        let Reply::History(list) = execute(200, body, &Request::PurchaseHistory).unwrap() else {
            panic!("expected history");
        };
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "1");
        assert_eq!(list[0].status, "active");
    }
}
