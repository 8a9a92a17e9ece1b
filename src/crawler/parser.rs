//! Page parser for upstream payloads
//!
//! Upstream pages are server-rendered and carry their data as a JSON document
//! in `<script id="__NEXT_DATA__">`. This module locates that document, decodes
//! the parts we need, and maps them onto the domain model. It is the only
//! place that knows the upstream page structure.
//!
//! Schema drift is an error: a record that is missing a required key, has the
//! wrong type, or carries an unknown status label fails the whole page with a
//! [`ParseError`] naming the offending field.

use crate::crawler::url_builder::UrlBuilder;
use crate::model::{ChatMessage, Company, CompanySummary, Complaint, FinalConsideration, Status};
use crate::ParseError;
use scraper::{Html, Selector};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// CSS selector of the embedded payload
const PAYLOAD_SELECTOR: &str = "script#__NEXT_DATA__";

/// Interaction type upstream uses for the consumer's closing evaluation
const FINAL_ANSWER: &str = "FINAL_ANSWER";

/// What the listing parser needs to know about the request
#[derive(Debug, Clone, Copy)]
pub struct ListingContext<'a> {
    pub company_slug: &'a str,
    pub urls: &'a UrlBuilder,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCompany {
    company_name: String,
    shortname: String,
    total_complaints: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSearchCompany {
    company_name: String,
    shortname: String,
}

/// Upstream ids have been served both as strings and as numbers
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s.trim().to_string(),
            RawId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawComplaint {
    id: RawId,
    title: String,
    description: String,
    status: String,
    created: String,
    #[serde(default)]
    user_city: Option<String>,
    #[serde(default)]
    user_state: Option<String>,
    #[serde(default)]
    categories: Option<Vec<String>>,
    #[serde(default)]
    interactions: Option<Vec<RawInteraction>>,
    #[serde(default)]
    evaluation: Option<RawEvaluation>,
    url: String,
}

#[derive(Debug, Deserialize)]
struct RawInteraction {
    #[serde(rename = "type")]
    kind: String,
    author: String,
    created: String,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvaluation {
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    score: Option<u8>,
    #[serde(default)]
    deal_again: Option<bool>,
    #[serde(default)]
    created: Option<String>,
}

/// Parses a company profile page
///
/// # Returns
///
/// * `Ok(Some(Company))` - The slug resolved to a company
/// * `Ok(None)` - The page rendered without a company (unknown slug)
/// * `Err(ParseError)` - The payload is missing or malformed
pub fn parse_company_page(html: &str) -> Result<Option<Company>, ParseError> {
    let props = extract_page_props(html)?;

    let company = match props.get("company") {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => decode::<RawCompany>(value.clone(), "company")?,
    };

    let slug = company.shortname.trim();
    if slug.is_empty() {
        return Err(ParseError::new("company.shortname", "empty slug"));
    }

    Ok(Some(Company {
        name: company.company_name.trim().to_string(),
        slug: slug.to_string(),
        total_complaints: company.total_complaints,
    }))
}

/// Parses one page of a company's complaint listing
///
/// Records are returned in page order. An empty vector means the listing has
/// no more entries.
///
/// # Example
///
/// ```
/// use reclame_relay::crawler::{parse_listing_page, ListingContext, UrlBuilder};
///
/// let html = r#"<html><body><script id="__NEXT_DATA__" type="application/json">
///     {"props":{"pageProps":{"complaints":[]}}}
/// </script></body></html>"#;
/// let urls = UrlBuilder::new("https://www.example.com").unwrap();
/// let context = ListingContext { company_slug: "acme", urls: &urls };
/// assert!(parse_listing_page(html, &context).unwrap().is_empty());
/// ```
pub fn parse_listing_page(
    html: &str,
    context: &ListingContext<'_>,
) -> Result<Vec<Complaint>, ParseError> {
    let props = extract_page_props(html)?;

    let records = match props.get("complaints") {
        Some(Value::Array(records)) => records,
        Some(other) => {
            return Err(ParseError::new(
                "complaints",
                format!("expected an array, found {}", json_type(other)),
            ))
        }
        None => return Err(ParseError::new("complaints", "missing from page payload")),
    };

    records
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let field = format!("complaints[{}]", index);
            let raw = decode::<RawComplaint>(value.clone(), &field)?;
            build_complaint(raw, &field, context)
        })
        .collect()
}

/// Parses a company search results page, in upstream order
pub fn parse_search_results(html: &str) -> Result<Vec<CompanySummary>, ParseError> {
    let props = extract_page_props(html)?;

    let rows = match props.get("companies") {
        Some(Value::Array(rows)) => rows,
        Some(Value::Null) => return Ok(Vec::new()),
        Some(other) => {
            return Err(ParseError::new(
                "companies",
                format!("expected an array, found {}", json_type(other)),
            ))
        }
        None => return Err(ParseError::new("companies", "missing from page payload")),
    };

    rows.iter()
        .enumerate()
        .map(|(index, value)| {
            let raw = decode::<RawSearchCompany>(value.clone(), &format!("companies[{}]", index))?;
            Ok(CompanySummary {
                name: raw.company_name.trim().to_string(),
                slug: raw.shortname.trim().to_string(),
            })
        })
        .collect()
}

/// Maps an upstream status label or code onto [`Status`]
///
/// Upstream has used both machine codes and Portuguese display labels.
/// Anything else is unknown and returns `None`.
pub fn map_status(label: &str) -> Option<Status> {
    let label = label.trim();

    if let Ok(status) = label.parse::<Status>() {
        return Some(status);
    }

    match label.to_lowercase().as_str() {
        "avaliada" | "avaliado" => Some(Status::Evaluated),
        "não resolvida" | "não resolvido" | "nao resolvida" | "nao resolvido" => {
            Some(Status::NotSolved)
        }
        "resolvida" | "resolvido" => Some(Status::Solved),
        _ => None,
    }
}

/// Locates the embedded payload and returns `props.pageProps`
fn extract_page_props(html: &str) -> Result<Value, ParseError> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(PAYLOAD_SELECTOR)
        .map_err(|e| ParseError::new("__NEXT_DATA__", format!("invalid selector: {:?}", e)))?;

    let script = document
        .select(&selector)
        .next()
        .ok_or_else(|| ParseError::new("__NEXT_DATA__", "embedded payload not found"))?;

    let raw: String = script.text().collect();
    let mut root: Value = serde_json::from_str(raw.trim())
        .map_err(|e| ParseError::new("__NEXT_DATA__", format!("invalid JSON: {}", e)))?;

    match root.pointer_mut("/props/pageProps") {
        Some(props) if props.is_object() => Ok(props.take()),
        Some(other) => Err(ParseError::new(
            "props.pageProps",
            format!("expected an object, found {}", json_type(other)),
        )),
        None => Err(ParseError::new("props.pageProps", "missing from payload")),
    }
}

fn decode<T: DeserializeOwned>(value: Value, field: &str) -> Result<T, ParseError> {
    serde_json::from_value(value).map_err(|e| ParseError::new(field, e.to_string()))
}

fn build_complaint(
    raw: RawComplaint,
    field: &str,
    context: &ListingContext<'_>,
) -> Result<Complaint, ParseError> {
    let id = raw.id.into_string();
    if id.is_empty() {
        return Err(ParseError::new(format!("{}.id", field), "empty id"));
    }

    let title = raw.title.trim().to_string();
    if title.is_empty() {
        return Err(ParseError::new(format!("{}.title", field), "empty title"));
    }

    let status = map_status(&raw.status).ok_or_else(|| {
        ParseError::new(
            format!("{}.status", field),
            format!("unrecognized status label '{}'", raw.status),
        )
    })?;

    let url = context.urls.resolve(&raw.url).ok_or_else(|| {
        ParseError::new(
            format!("{}.url", field),
            format!("cannot resolve '{}' for company '{}'", raw.url, context.company_slug),
        )
    })?;

    let chat = raw
        .interactions
        .unwrap_or_default()
        .into_iter()
        .filter(|interaction| interaction.kind != FINAL_ANSWER)
        .map(|interaction| ChatMessage {
            owner: interaction.author.trim().to_string(),
            date: interaction.created.trim().to_string(),
            message: interaction.message.trim().to_string(),
        })
        .collect();

    let final_consideration = match raw.evaluation {
        Some(evaluation) => Some(build_final_consideration(evaluation, field)?),
        None => None,
    };

    let tags = raw
        .categories
        .unwrap_or_default()
        .into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect();

    Ok(Complaint {
        id,
        title,
        description: raw.description.trim().to_string(),
        status,
        date: raw.created.trim().to_string(),
        location: format_location(raw.user_city.as_deref(), raw.user_state.as_deref()),
        tags,
        chat,
        final_consideration,
        url: url.to_string(),
    })
}

fn build_final_consideration(
    evaluation: RawEvaluation,
    field: &str,
) -> Result<FinalConsideration, ParseError> {
    if let Some(score) = evaluation.score {
        if score > 10 {
            return Err(ParseError::new(
                format!("{}.evaluation.score", field),
                format!("expected 0 to 10, got {}", score),
            ));
        }
    }

    Ok(FinalConsideration {
        message: non_empty(evaluation.comment),
        service_note: evaluation.score,
        would_do_business_again: evaluation.deal_again,
        date: non_empty(evaluation.created),
    })
}

/// "City - ST", or whichever half is present
fn format_location(city: Option<&str>, state: Option<&str>) -> Option<String> {
    let city = city.map(str::trim).filter(|s| !s.is_empty());
    let state = state.map(str::trim).filter(|s| !s.is_empty());

    match (city, state) {
        (Some(city), Some(state)) => Some(format!("{} - {}", city, state)),
        (Some(part), None) | (None, Some(part)) => Some(part.to_string()),
        (None, None) => None,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
