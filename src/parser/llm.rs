//! LLM extraction boundary for unstructured posts.
//!
//! The model call is a black box that returns a loosely-typed JSON field
//! map; `listing_from_extracted` is the only place that coerces it into a
//! typed `Listing`, so missing or malformed keys never propagate further.

use chrono::NaiveDate;
use serde_json::{Value, json};
use tracing::warn;

use crate::model::{Borough, Listing, ListingSource, ListingType, LlmError};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";

// Posts shorter than this carry too little signal to be worth a model call.
const MIN_POST_CHARS: usize = 20;
const MAX_POST_CHARS: usize = 2000;

const EXTRACTION_PROMPT: &str = r#"You are a data extraction assistant. Given a post about an NYC apartment sublet/rental, extract the following fields as JSON.

If a field cannot be determined from the text, use null. Be conservative — only extract what is clearly stated.

Return ONLY valid JSON with these exact keys:
{
  "price_monthly": <integer or null — monthly rent in USD. Convert weekly (×4.33) or nightly (×30) to monthly.>,
  "price_raw": "<original price string as written in the post>",
  "neighborhood": "<NYC neighborhood name, e.g. 'Midtown East', 'Lower East Side', 'Williamsburg'>",
  "borough": "<Manhattan|Brooklyn|Queens|Bronx|Staten Island|null>",
  "address": "<exact street address if mentioned, else null>",
  "listing_type": "<studio|1br|2br|3br+|room_in_shared|hotel_extended_stay|null>",
  "apartment_details": "<e.g. '2b1ba', 'studio', '3br/2ba', or null>",
  "is_furnished": <true|false|null>,
  "available_from": "<YYYY-MM-DD or null>",
  "available_to": "<YYYY-MM-DD or null>",
  "description_summary": "<1-2 sentence summary of the listing>",
  "contact_info": "<email, phone, or 'DM' if they say to message them, else null>",
  "is_iso": <true if this is someone LOOKING for housing (not offering), false if offering>
}

Post text:
---
"#;

/// Thin client for the extraction model endpoint.
pub struct LlmExtractor {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl LlmExtractor {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Extracts structured fields from a free-form post.
    ///
    /// Returns `Ok(None)` when the post is too short or the model reply is
    /// not parseable; transport failures surface as `Err`.
    pub async fn extract(&self, post_text: &str) -> Result<Option<Value>, LlmError> {
        if post_text.trim().len() < MIN_POST_CHARS {
            return Ok(None);
        }

        let truncated: String = post_text.chars().take(MAX_POST_CHARS).collect();
        let prompt = format!("{EXTRACTION_PROMPT}{truncated}\n---");

        let body = json!({
            "model": self.model,
            "max_tokens": 500,
            "temperature": 0.0,
            "messages": [{"role": "user", "content": prompt}],
        });

        let response = self
            .client
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        let payload: Value = response.json().await?;
        let text = payload
            .get("content")
            .and_then(|c| c.get(0))
            .and_then(|block| block.get("text"))
            .and_then(Value::as_str)
            .ok_or_else(|| LlmError::MalformedResponse("missing content text".into()))?;

        let cleaned = strip_code_fences(text);
        match serde_json::from_str::<Value>(cleaned) {
            Ok(fields) => Ok(Some(fields)),
            Err(e) => {
                warn!("LLM returned invalid JSON: {e}");
                Ok(None)
            }
        }
    }
}

/// Models occasionally wrap the JSON reply in a markdown code block.
pub(crate) fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    let inner = trimmed
        .split("```")
        .nth(1)
        .unwrap_or(trimmed);
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.trim()
}

fn field_str<'a>(fields: &'a Value, key: &str) -> &'a str {
    fields.get(key).and_then(Value::as_str).unwrap_or("")
}

fn field_date(fields: &Value, key: &str) -> Option<NaiveDate> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

fn parse_listing_type(raw: &str) -> ListingType {
    match raw.trim().to_lowercase().as_str() {
        "studio" => ListingType::Studio,
        "1br" => ListingType::OneBedroom,
        "2br" => ListingType::TwoBedroom,
        "3br+" => ListingType::ThreePlusBedroom,
        "room_in_shared" => ListingType::RoomInShared,
        "hotel_extended_stay" => ListingType::HotelExtendedStay,
        _ => ListingType::Unknown,
    }
}

/// Converts the loosely-typed extraction output into a typed `Listing`.
/// Every key is optional; anything missing or malformed degrades to the
/// field default.
pub fn listing_from_extracted(fields: &Value, source: ListingSource) -> Listing {
    let mut listing = Listing::new(source);

    listing.price_monthly = fields.get("price_monthly").and_then(Value::as_i64);
    listing.price_raw = field_str(fields, "price_raw").to_string();
    listing.neighborhood = field_str(fields, "neighborhood").to_string();
    listing.borough = Borough::parse(field_str(fields, "borough"));
    listing.address = field_str(fields, "address").to_string();
    listing.listing_type = parse_listing_type(field_str(fields, "listing_type"));
    listing.apartment_details = field_str(fields, "apartment_details").to_string();
    listing.is_furnished = fields.get("is_furnished").and_then(Value::as_bool);
    listing.available_from = field_date(fields, "available_from");
    listing.available_to = field_date(fields, "available_to");
    listing.description = field_str(fields, "description_summary").to_string();
    listing.contact_info = field_str(fields, "contact_info").to_string();

    listing
}

/// True when the extraction flagged the post as an "in search of" request.
pub fn is_iso_post(fields: &Value) -> bool {
    fields
        .get("is_iso")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}
