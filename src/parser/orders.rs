//! Flattens the paginated orders payload into one row per ordered product.
//!
//! Decoding is lenient the way the upstream data requires: absent or null
//! text fields become empty strings, prices accept numbers or numeric
//! strings, and anything unparseable falls back to a neutral default.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::cache::reference_cache::ReasonMap;
use crate::error::ProxyError;

/// One CSV row: an order paired with one of its products.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub order_id: String,
    pub customer_name: String,
    pub customer_number: String,
    pub address: String,
    pub products: String,
    pub price: Decimal,
    pub status: String,
    pub delivery_date: Option<String>,
    pub comments: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrdersPage {
    #[serde(default)]
    orders: Option<Vec<RawOrder>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawOrder {
    #[serde(deserialize_with = "text")]
    order_client_id: String,
    #[serde(deserialize_with = "text")]
    customer_name: String,
    #[serde(deserialize_with = "text")]
    customer_phone_1: String,
    #[serde(deserialize_with = "text")]
    customer_address: String,
    #[serde(deserialize_with = "price")]
    total_price: Decimal,
    #[serde(deserialize_with = "text")]
    note: String,
    #[serde(deserialize_with = "display_name")]
    confirmation_status: String,
    #[serde(deserialize_with = "display_name")]
    shipping_status: String,
    #[serde(deserialize_with = "text")]
    delivered_at: String,
    #[serde(deserialize_with = "text")]
    shipped_at: String,
    #[serde(deserialize_with = "text")]
    shipping_date: String,
    #[serde(deserialize_with = "text")]
    pending_since: String,
    #[serde(deserialize_with = "integer")]
    cancellation_reason_id: Option<i64>,
    #[serde(deserialize_with = "text")]
    cancelled_at: String,
    order_items: Option<Vec<RawItem>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawItem {
    #[serde(deserialize_with = "product_name")]
    product: String,
    #[serde(deserialize_with = "integer")]
    quantity: Option<i64>,
}

/// Decodes `orders_json` and emits one record per (order, line item).
/// An order without items still yields a single record with no products.
pub fn flatten(orders_json: &str, reasons: &ReasonMap) -> Result<Vec<OrderRecord>, ProxyError> {
    let page: OrdersPage =
        serde_json::from_str(orders_json).map_err(|e| ProxyError::Decode(e.to_string()))?;

    let mut records = Vec::new();
    for order in page.orders.unwrap_or_default() {
        let status = resolve_status(&order);
        let base = OrderRecord {
            delivery_date: delivery_date(&order, &status),
            comments: comments(&order, &status, reasons),
            order_id: order.order_client_id,
            customer_name: order.customer_name,
            customer_number: order.customer_phone_1,
            address: order.customer_address,
            products: String::new(),
            price: order.total_price,
            status,
        };

        match order.order_items.filter(|items| !items.is_empty()) {
            Some(items) => records.extend(items.iter().map(|item| OrderRecord {
                products: product_label(item),
                ..base.clone()
            })),
            None => records.push(base),
        }
    }
    Ok(records)
}

/// Shipping status once the order is confirmed, the confirmation status before that.
fn resolve_status(order: &RawOrder) -> String {
    if order.confirmation_status.to_lowercase() == "confirmed" {
        order.shipping_status.to_owned()
    } else {
        order.confirmation_status.to_owned()
    }
}

fn delivery_date(order: &RawOrder, status: &str) -> Option<String> {
    let date = match status.to_lowercase().as_str() {
        "delivered" => &order.delivered_at,
        "in transit" | "shipped" => &order.shipped_at,
        "awaiting dispatch" | "scheduled" => &order.shipping_date,
        "pending" => &order.pending_since,
        _ if !order.shipping_date.is_empty() => &order.shipping_date,
        _ => &order.shipped_at,
    };
    non_empty(date)
}

/// Cancelled orders get `Reason: (..). Cancelled at: (..)`; others keep their note.
fn comments(order: &RawOrder, status: &str, reasons: &ReasonMap) -> Option<String> {
    if status.to_lowercase() != "cancelled" {
        return non_empty(&order.note);
    }

    let mut segments = Vec::with_capacity(2);
    if let Some(reason_id) = order.cancellation_reason_id {
        let reason = reasons.get(&reason_id).map(String::as_str).unwrap_or("Unknown");
        segments.push(format!("Reason: ({})", reason));
    }
    if !order.cancelled_at.is_empty() {
        segments.push(format!("Cancelled at: ({})", order.cancelled_at));
    }
    non_empty(&segments.join(". "))
}

fn product_label(item: &RawItem) -> String {
    match item.quantity.unwrap_or(0) {
        quantity if quantity > 1 => format!("{} (x{})", item.product, quantity),
        _ => item.product.to_owned(),
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_owned())
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Value::deserialize(deserializer).map(value_to_text)
}

fn nested_text(value: Value, key: &str) -> String {
    match value {
        Value::Object(mut map) => map.remove(key).map(value_to_text).unwrap_or_default(),
        _ => String::new(),
    }
}

fn display_name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Value::deserialize(deserializer).map(|v| nested_text(v, "display_name"))
}

fn product_name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Value::deserialize(deserializer).map(|v| nested_text(v, "name"))
}

/// Numbers or numeric strings, scale kept as sent; anything else or negative is 0.
fn price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    let parsed = match Value::deserialize(deserializer)? {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    };
    Ok(parsed.filter(|p| *p >= Decimal::ZERO).unwrap_or(Decimal::ZERO))
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Integral JSON numbers only.
fn integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Value::deserialize(deserializer).map(|v| v.as_i64())
}
