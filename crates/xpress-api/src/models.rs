// Backend wire types
//
// Models for the marketplace backend's JSON API. Responses are wrapped in
// the `Envelope<T>` shape. Fields use `#[serde(default)]` liberally because
// records written by older admin builds use different field names
// (`quantity` vs `stock`, `category` vs `categoryId`) and numeric fields
// sometimes arrive as strings.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ── Response Envelope ────────────────────────────────────────────────

/// Standard backend response envelope.
///
/// ```json
/// { "success": true, "data": [...], "message": "optional" }
/// ```
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body shape: only `message` is relied upon.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<Value>,
}

// ── Products ─────────────────────────────────────────────────────────

/// An image reference: either a bare URL or an object with a `url` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageRef {
    Url(String),
    Object {
        url: String,
        #[serde(flatten)]
        extra: serde_json::Map<String, Value>,
    },
}

impl ImageRef {
    pub fn url(&self) -> &str {
        match self {
            Self::Url(url) | Self::Object { url, .. } => url,
        }
    }
}

/// A labelled specification row (e.g. `Material: Ceramic`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificationRecord {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: String,
}

/// Product object from `GET /products` and friends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub stock: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub quantity: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub vendor_id: Option<String>,
    #[serde(default)]
    pub vendor_name: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub part_number: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub specifications: Option<Vec<SpecificationRecord>>,
    #[serde(default)]
    pub compatibility: Option<Vec<String>>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub new_product: Option<bool>,
    #[serde(default)]
    pub hot_product: Option<bool>,
    #[serde(default)]
    pub show_on_home: Option<bool>,
    #[serde(default)]
    pub display_on_page: Option<bool>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub priority: Option<i64>,
    #[serde(default)]
    pub main_image: Option<ImageRef>,
    #[serde(default)]
    pub additional_images: Option<Vec<ImageRef>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub date_posted: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<String>,
    /// Explicit stock status; overrides the stock-derived value when set.
    #[serde(default)]
    pub status: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

// ── Vendors ──────────────────────────────────────────────────────────

/// Vendor object from `GET /vendors`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub uid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub date_published: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Body for `POST /vendors` and `PUT /vendors/:id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorPayload {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub company: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub website: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub notes: String,
    pub priority: String,
    pub is_active: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub category: String,
}

// ── Users ────────────────────────────────────────────────────────────

/// User object from `GET /users`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub uid: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Body for `POST /users/role`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleAssignment {
    pub uid: String,
    pub role: String,
}

// ── Auth ─────────────────────────────────────────────────────────────

/// Response from `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<UserRecord>,
}

// ── Lenient field decoding ──────────────────────────────────────────

fn lenient_f64<'de, D: Deserializer<'de>>(de: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<Value>::deserialize(de)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_i64<'de, D: Deserializer<'de>>(de: D) -> Result<Option<i64>, D::Error> {
    Ok(match Option::<Value>::deserialize(de)? {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(de)? {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Accepts an ISO string, epoch milliseconds, or a `{ _seconds }` /
/// `{ seconds }` timestamp object, normalizing the latter two to RFC 3339.
fn lenient_timestamp<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    let from_secs = |secs: i64| {
        chrono::DateTime::from_timestamp(secs, 0).map(|dt| dt.to_rfc3339())
    };
    Ok(match Option::<Value>::deserialize(de)? {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(chrono::DateTime::from_timestamp_millis)
            .map(|dt| dt.to_rfc3339()),
        Some(Value::Object(map)) => map
            .get("_seconds")
            .or_else(|| map.get("seconds"))
            .and_then(Value::as_i64)
            .and_then(from_secs),
        _ => None,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn product_accepts_legacy_field_names_and_string_numbers() {
        let rec: ProductRecord = serde_json::from_value(json!({
            "id": 7,
            "itemName": "Brake Pads",
            "price": "89.99",
            "quantity": "4",
            "category": "body-chassis",
            "mainImage": { "url": "https://cdn/x.png", "publicId": "x" },
            "additionalImages": ["https://cdn/y.png"]
        }))
        .unwrap();

        assert_eq!(rec.id.as_deref(), Some("7"));
        assert_eq!(rec.price, Some(89.99));
        assert_eq!(rec.quantity, Some(4));
        assert_eq!(rec.stock, None);
        assert_eq!(rec.main_image.unwrap().url(), "https://cdn/x.png");
        assert_eq!(rec.additional_images.unwrap()[0].url(), "https://cdn/y.png");
    }

    #[test]
    fn timestamp_objects_normalize_to_rfc3339() {
        let rec: ProductRecord = serde_json::from_value(json!({
            "datePosted": { "_seconds": 1_700_000_000, "_nanoseconds": 0 },
            "createdAt": 1_700_000_000_000_i64
        }))
        .unwrap();
        assert_eq!(rec.date_posted.as_deref(), Some("2023-11-14T22:13:20+00:00"));
        assert_eq!(rec.created_at, rec.date_posted);
    }

    #[test]
    fn envelope_without_data_is_none() {
        let env: Envelope<Vec<ProductRecord>> =
            serde_json::from_value(json!({ "success": true })).unwrap();
        assert!(env.data.is_none());
    }

    #[test]
    fn unknown_fields_land_in_extra() {
        let rec: VendorRecord =
            serde_json::from_value(json!({ "id": "v1", "taxId": "TX-9" })).unwrap();
        assert_eq!(rec.extra.get("taxId"), Some(&json!("TX-9")));
    }
}
