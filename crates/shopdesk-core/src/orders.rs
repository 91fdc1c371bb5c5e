use serde::{Deserialize, Serialize};

use crate::validation::{self, ValidationError};

/// Fulfilment status of an order.
///
/// Any status may follow any other; there is no transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = ValidationError;

    /// Case-insensitive; stored documents contain both `"shipped"` and `"Shipped"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnknownStatus(s.to_owned()))
    }
}

/// An order line as shown in listings: the `orderItems` document joined
/// with its product's title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItemView {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::documents::lenient::opt_f64")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "crate::documents::lenient::opt_i64")]
    pub quantity: Option<i64>,
}

fn order_kind() -> String {
    crate::documents::ORDER_TYPE.to_owned()
}

/// An `orders` document as read from the store, items expanded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDocument {
    #[serde(rename = "_id")]
    pub doc_id: String,
    #[serde(rename = "_type", default = "order_kind")]
    pub doc_type: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Raw stored value; see [`OrderDocument::status`] for the parsed form.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "crate::documents::lenient::opt_f64")]
    pub total: Option<f64>,
    #[serde(default, deserialize_with = "crate::documents::lenient::vec_skip_nulls")]
    pub items: Vec<OrderItemView>,
}

impl OrderDocument {
    /// Parsed status, `None` when the stored value is missing or unknown.
    #[must_use]
    pub fn status(&self) -> Option<OrderStatus> {
        self.status.as_deref().and_then(|s| s.parse().ok())
    }

    /// Case-insensitive substring match on email address or status.
    #[must_use]
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        let contains = |field: &Option<String>| {
            field
                .as_deref()
                .is_some_and(|v| v.to_lowercase().contains(&term))
        };
        contains(&self.email_address) || contains(&self.status)
    }
}

/// One requested order line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderItemFields {
    /// Store id of the ordered product.
    pub product: Option<String>,
    pub quantity: Option<i64>,
    /// Unit price at the time of ordering.
    pub price: Option<f64>,
}

/// Order fields as submitted by a caller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFields {
    pub full_name: Option<String>,
    pub email_address: Option<String>,
    pub shipping_address: Option<String>,
    pub phone_number: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItemFields>,
    pub total: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
    pub product_id: String,
    pub quantity: u32,
    pub unit_price: f64,
}

/// A validated order ready to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub full_name: String,
    pub email_address: String,
    pub shipping_address: Option<String>,
    pub phone_number: Option<String>,
    pub status: OrderStatus,
    pub items: Vec<NewOrderItem>,
    pub total: f64,
}

impl NewOrder {
    /// Sum of `unit_price * quantity` over all items.
    #[must_use]
    pub fn items_subtotal(&self) -> f64 {
        self.items
            .iter()
            .map(|item| item.unit_price * f64::from(item.quantity))
            .sum()
    }
}

impl OrderItemFields {
    fn validate(self) -> Result<NewOrderItem, ValidationError> {
        let product_id = validation::require_text("items.product", self.product)?;
        let quantity = self
            .quantity
            .ok_or(ValidationError::Missing {
                field: "items.quantity",
            })?;
        if quantity < 1 {
            return Err(ValidationError::OutOfRange {
                field: "items.quantity",
                min: 1,
                max: i64::from(u32::MAX),
                value: quantity,
            });
        }
        let quantity = validation::count("items.quantity", quantity)?;
        let unit_price = validation::amount(
            "items.price",
            self.price.ok_or(ValidationError::Missing {
                field: "items.price",
            })?,
        )?;
        Ok(NewOrderItem {
            product_id,
            quantity,
            unit_price,
        })
    }
}

impl OrderFields {
    /// Validate a new order. `status` defaults to [`OrderStatus::Pending`];
    /// `total` is taken as given.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered.
    pub fn into_new_order(self) -> Result<NewOrder, ValidationError> {
        let full_name = validation::require_text("fullName", self.full_name)?;
        let email_address = validation::require_text("emailAddress", self.email_address)?;
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => OrderStatus::Pending,
            Some(s) => s.parse()?,
        };
        let total = validation::amount(
            "total",
            self.total.ok_or(ValidationError::Missing { field: "total" })?,
        )?;
        let items = self
            .items
            .into_iter()
            .map(OrderItemFields::validate)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NewOrder {
            full_name,
            email_address,
            shipping_address: self.shipping_address.filter(|v| !v.trim().is_empty()),
            phone_number: self.phone_number.filter(|v| !v.trim().is_empty()),
            status,
            items,
            total,
        })
    }
}
