use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};
use ulid::Ulid;

use crate::engine::{BookingService, EngineError, ItemFilter};
use crate::limits::{MAX_DESCRIPTION_LEN, MAX_NAME_LEN};
use crate::model::{Booking, ItemView, Ms, Span};
use crate::observability;

type App = State<Arc<BookingService>>;

pub fn router(service: Arc<BookingService>) -> Router {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/{item_id}", get(get_item))
        .route("/items/{item_id}/rentals", post(rent_item))
        .route("/rentals/{rental_id}", delete(return_rental))
        .with_state(service)
}

// ── Error mapping ────────────────────────────────────────────────

struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl ApiError {
    fn bad_request(message: &'static str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message,
        }
    }

    fn not_found(message: &'static str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::ItemNotFound(_) => Self::not_found("Item not found"),
            EngineError::BookingNotFound(_) => Self::not_found("Rental not found"),
            EngineError::RangeConflict { .. } => {
                Self::bad_request("Item not available during those dates")
            }
        }
    }
}

// ── Wire types ───────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RentalBody {
    rental_id: Ulid,
    item_id: Ulid,
    start_date: String,
    end_date: String,
}

impl From<Booking> for RentalBody {
    fn from(b: Booking) -> Self {
        Self {
            rental_id: b.id,
            item_id: b.item_id,
            start_date: to_iso(b.span.start),
            end_date: to_iso(b.span.end),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ItemBody {
    item_id: Ulid,
    name: String,
    description: String,
    price_per_day: f64,
    rentals: Vec<RentalBody>,
}

impl From<ItemView> for ItemBody {
    fn from(view: ItemView) -> Self {
        Self {
            item_id: view.id,
            name: view.name,
            description: view.description,
            price_per_day: view.price_per_day,
            rentals: view.rentals.into_iter().map(RentalBody::from).collect(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateItemRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    price_per_day: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RentRequest {
    start_date: Option<String>,
    end_date: Option<String>,
}

// ── Instant conversion ───────────────────────────────────────────

fn to_iso(ms: Ms) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
fn parse_instant(raw: &str) -> Option<Ms> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc).timestamp_millis());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc().timestamp_millis())
}

fn parse_item_id(raw: &str) -> Result<Ulid, ApiError> {
    // An id that doesn't even parse cannot name an item.
    Ulid::from_string(raw).map_err(|_| ApiError::not_found("Item not found"))
}

// ── Handlers ─────────────────────────────────────────────────────

async fn list_items(
    State(service): App,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<ItemBody>>, ApiError> {
    let filters = parse_filters(&params)?;
    let items = service.list_items(&filters).await;
    Ok(Json(items.into_iter().map(ItemBody::from).collect()))
}

fn parse_filters(params: &HashMap<String, String>) -> Result<Vec<ItemFilter>, ApiError> {
    let mut filters = Vec::new();
    for (key, value) in params {
        match key.as_str() {
            "name" => filters.push(ItemFilter::Name(value.clone())),
            "price" | "priceGT" | "priceLT" | "priceGTE" | "priceLTE" => {
                let price: f64 = value
                    .parse()
                    .map_err(|_| ApiError::bad_request("Prices must be numbers"))?;
                filters.push(match key.as_str() {
                    "price" => ItemFilter::Price(price),
                    "priceGT" => ItemFilter::PriceGt(price),
                    "priceLT" => ItemFilter::PriceLt(price),
                    "priceGTE" => ItemFilter::PriceGte(price),
                    _ => ItemFilter::PriceLte(price),
                });
            }
            // Unknown query parameters are ignored.
            _ => {}
        }
    }
    Ok(filters)
}

async fn get_item(
    State(service): App,
    Path(item_id): Path<String>,
) -> Result<Json<ItemBody>, ApiError> {
    let item_id = parse_item_id(&item_id)?;
    let view = service.get_item(item_id).await?;
    Ok(Json(view.into()))
}

async fn create_item(
    State(service): App,
    Json(req): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<ItemBody>), ApiError> {
    let raw_price = match req.price_per_day {
        Some(v) if !req.name.is_empty() => v,
        _ => return Err(ApiError::bad_request("Name and price per day are required")),
    };
    let price_per_day = coerce_price(&raw_price)
        .ok_or_else(|| ApiError::bad_request("Price per day must be a number"))?;
    if req.name.len() > MAX_NAME_LEN || req.description.len() > MAX_DESCRIPTION_LEN {
        return Err(ApiError::bad_request("Name or description too long"));
    }

    let view = service.create_item(req.name, req.description, price_per_day);
    metrics::counter!(observability::ITEMS_TOTAL).increment(1);
    info!(item_id = %view.id, "item listed");
    Ok((StatusCode::CREATED, Json(view.into())))
}

/// The source API accepted prices as numbers or numeric strings.
fn coerce_price(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

async fn rent_item(
    State(service): App,
    Path(item_id): Path<String>,
    Json(req): Json<RentRequest>,
) -> Result<(StatusCode, Json<RentalBody>), ApiError> {
    let start = req.start_date.as_deref().and_then(parse_instant);
    let end = req.end_date.as_deref().and_then(parse_instant);
    let (Some(start), Some(end)) = (start, end) else {
        return Err(ApiError::bad_request("Not a valid date"));
    };
    if start >= end {
        return Err(ApiError::bad_request(
            "Start date must be earlier than end date",
        ));
    }
    let item_id = parse_item_id(&item_id)?;

    match service.book_item(item_id, Span::new(start, end)).await {
        Ok(booking) => {
            metrics::counter!(observability::BOOKINGS_TOTAL).increment(1);
            metrics::gauge!(observability::BOOKINGS_ACTIVE).increment(1.0);
            info!(rental_id = %booking.id, item_id = %booking.item_id, "rental accepted");
            Ok((StatusCode::CREATED, Json(booking.into())))
        }
        Err(e) => {
            if matches!(e, EngineError::RangeConflict { .. }) {
                metrics::counter!(observability::BOOKING_CONFLICTS_TOTAL).increment(1);
                debug!(%item_id, "rental rejected: {e}");
            }
            Err(e.into())
        }
    }
}

async fn return_rental(
    State(service): App,
    Path(rental_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let rental_id =
        Ulid::from_string(&rental_id).map_err(|_| ApiError::not_found("Rental not found"))?;
    let item_id = service.cancel_booking(rental_id).await?;
    metrics::counter!(observability::CANCELLATIONS_TOTAL).increment(1);
    metrics::gauge!(observability::BOOKINGS_ACTIVE).decrement(1.0);
    info!(%rental_id, %item_id, "rental returned");
    Ok(StatusCode::NO_CONTENT)
}
