//! HubSpot CRM contacts
//!
//! Lists contacts with the access token from the connected credentials and
//! maps them to `IntegrationItem`s.

use std::collections::HashMap;

use anyhow::Context;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::error::ContactsError;
use crate::models::IntegrationItem;

const PAGE_LIMIT: &str = "10";
const MAX_PAGES: usize = 10;
const PROPERTIES: &[&str] = &[
    "hs_object_id",
    "firstname",
    "lastname",
    "email",
    "createdate",
    "lastmodifieddate",
    "lifecyclestage",
];

#[derive(Debug, Deserialize)]
struct ContactsPage {
    #[serde(default)]
    results: Vec<Contact>,
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
struct Contact {
    #[serde(default)]
    properties: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct Paging {
    next: Option<PagingNext>,
}

#[derive(Debug, Deserialize)]
struct PagingNext {
    after: Option<String>,
}

/// Client for the HubSpot public API.
pub struct ContactsClient {
    http: reqwest::Client,
    contacts_url: Url,
}

impl ContactsClient {
    pub fn new(api_base: &str) -> Result<Self, ContactsError> {
        let mut base = Url::parse(api_base)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            http: reqwest::Client::new(),
            contacts_url: base.join("crm/v3/objects/contacts")?,
        })
    }

    /// Fetch up to `MAX_PAGES` pages of contacts. A failing page ends
    /// pagination; contacts from earlier pages are still returned.
    pub async fn list_contacts(
        &self,
        credentials: &Value,
    ) -> Result<Vec<IntegrationItem>, ContactsError> {
        let token = access_token(credentials)?;
        let properties = PROPERTIES.join(",");

        let mut contacts = Vec::new();
        let mut after: Option<String> = None;

        for page in 1..=MAX_PAGES {
            let mut query = vec![("limit", PAGE_LIMIT), ("properties", properties.as_str())];
            if let Some(ref cursor) = after {
                query.push(("after", cursor.as_str()));
            }

            tracing::debug!("HubSpot GET {} (page {})", self.contacts_url, page);
            let page_data = match self.fetch_page(&token, &query).await {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!("HubSpot contacts request failed: {:#}", e);
                    break;
                }
            };

            contacts.extend(page_data.results);

            match page_data.paging.and_then(|p| p.next).and_then(|n| n.after) {
                Some(cursor) if !cursor.is_empty() => after = Some(cursor),
                _ => break,
            }
        }

        let items: Vec<IntegrationItem> = contacts
            .iter()
            .map(|c| contact_to_item(&c.properties))
            .collect();

        tracing::info!("Loaded {} HubSpot contacts", items.len());
        for item in &items {
            tracing::debug!(
                "  {} {} ({})",
                item.id.as_deref().unwrap_or("(no id)"),
                item.name,
                item.item_type
            );
        }

        Ok(items)
    }

    async fn fetch_page(
        &self,
        token: &str,
        query: &[(&str, &str)],
    ) -> anyhow::Result<ContactsPage> {
        let resp = self
            .http
            .get(self.contacts_url.clone())
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("HTTP {}: {}", status.as_u16(), body);
        }

        resp.json()
            .await
            .context("Failed to parse contacts page")
    }
}

/// Pull `access_token` out of credentials stored as a JSON object or as a
/// string holding one.
fn access_token(credentials: &Value) -> Result<String, ContactsError> {
    let parsed;
    let object = match credentials {
        Value::String(s) => {
            parsed = serde_json::from_str::<Value>(s)
                .map_err(|e| ContactsError::InvalidCredentials(e.to_string()))?;
            &parsed
        }
        other => other,
    };

    object
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .ok_or(ContactsError::MissingAccessToken)
}

/// Non-empty string property. Other value types read as absent.
fn prop<'a>(props: &'a HashMap<String, Value>, key: &str) -> Option<&'a str> {
    props
        .get(key)
        .and_then(Value::as_str)
        .filter(|v| !v.trim().is_empty())
}

fn contact_to_item(props: &HashMap<String, Value>) -> IntegrationItem {
    let contact_id = prop(props, "hs_object_id");

    let name_parts: Vec<&str> = [prop(props, "firstname"), prop(props, "lastname")]
        .into_iter()
        .flatten()
        .collect();
    let name = if !name_parts.is_empty() {
        name_parts.join(" ")
    } else if let Some(email) = prop(props, "email") {
        email.to_string()
    } else {
        format!("Contact {}", contact_id.unwrap_or("N/A"))
    };

    IntegrationItem {
        id: contact_id.map(|id| format!("hs_contact_{}", id)),
        item_type: prop(props, "lifecyclestage")
            .unwrap_or("HubSpot Contact")
            .to_string(),
        name,
        creation_time: prop(props, "createdate").and_then(parse_hubspot_date),
        last_modified_time: prop(props, "lastmodifieddate").and_then(parse_hubspot_date),
        directory: false,
        parent_id: None,
        url: None,
    }
}

/// RFC 3339 timestamps, or naive ISO timestamps taken as UTC.
fn parse_hubspot_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    tracing::warn!("Could not parse date string '{}'", s);
    None
}
