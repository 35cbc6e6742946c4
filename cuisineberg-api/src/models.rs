//! API request and response types for the Cuisineberg retail backend.
//!
//! Wire field names are the backend's camelCase names (`itemName`,
//! `publicCode`, ...), with two oddballs renamed explicitly: the MongoDB
//! item id `_id` and the all-caps `photoURL`.

use std::fmt::{self, Display};

#[cfg(any(test, feature = "test-utils"))]
use proptest_derive::Arbitrary;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Photo sent when a draft leaves the photo URL empty.
pub const PLACEHOLDER_PHOTO_URL: &str =
    "https://placehold.co/100x100/A0E7E5/000000?text=No+Image";

/// Category sent when a draft leaves the food category unset.
pub const DEFAULT_FOOD_CATEGORY: &str = "Uncategorized";

/// The canonical food category set shown in the category picker.
pub const FOOD_CATEGORIES: [&str; 28] = [
    "Starters",
    "Main Course",
    "Biryani & Rice",
    "Indian Breads",
    "Curries & Gravies",
    "Snacks",
    "Breakfast",
    "Desserts",
    "Salads",
    "Soups",
    "Chinese",
    "South Indian",
    "North Indian",
    "Fast Food",
    "Burgers",
    "Pizzas",
    "Wraps & Rolls",
    "Sandwiches",
    "Beverages",
    "Milkshakes",
    "Mocktails",
    "Ice Creams",
    "Combos & Thalis",
    "Tandoori",
    "Seafood Specials",
    "Egg Specials",
    "Veg Specials",
    "Non-Veg Specials",
];

/// A struct denoting an empty API request or response.
///
/// This type should serialize/deserialize in such a way that we have room to
/// add optional fields in the future without causing old clients to reject
/// the message (backwards-compatible changes).
///
/// Always prefer this type over `()` (unit) to avoid API upgrade hazards. In
/// JSON, unit will only deserialize from `"null"`, meaning we can't add new
/// optional fields without breaking old clients.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[cfg_attr(any(test, feature = "test-utils"), derive(Arbitrary))]
pub struct Empty {}

/// A server-assigned menu item id (a MongoDB ObjectId in practice, but
/// opaque to the app). Immutable and unique within a restaurant's menu.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[derive(Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "test-utils"), derive(Arbitrary))]
pub struct MenuItemId(pub String);

/// The stable identifier for a restaurant, required when creating menu items.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "test-utils"), derive(Arbitrary))]
pub struct PublicCode(pub String);

/// Veg/non-veg dish tag.
///
/// The backend encodes vegetarian as `"V"` and non-vegetarian as `"NV"`;
/// anything else (including a missing field) reads as [`Unknown`], which is
/// also the value sent for an unset draft.
///
/// [`Unknown`]: DishType::Unknown
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "test-utils"), derive(Arbitrary))]
pub enum DishType {
    #[serde(rename = "V")]
    Veg,
    #[serde(rename = "NV")]
    NonVeg,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A single sellable dish record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "test-utils"), derive(Arbitrary))]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    #[serde(rename = "_id")]
    pub id: MenuItemId,
    pub item_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[cfg_attr(
        any(test, feature = "test-utils"),
        proptest(strategy = "arbitrary::any_price()")
    )]
    pub price: Decimal,
    #[serde(rename = "photoURL")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_category: Option<String>,
    #[serde(default)]
    pub dish_type: DishType,
}

/// A restaurant's street address. The backend may return any subset of the
/// fields; missing ones read as empty.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "test-utils"), derive(Arbitrary))]
#[serde(rename_all = "camelCase")]
pub struct RestaurantAddress {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub country: String,
}

/// The authenticated account's business info plus its full menu.
///
/// GET /api/cuisineberg/retail/info response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub restaurant_name: String,
    #[serde(default)]
    pub restaurant_address: RestaurantAddress,
    #[serde(default)]
    pub mobile_number: String,
    #[serde(default)]
    pub public_code: PublicCode,
    #[serde(default)]
    pub menu: Vec<MenuItem>,
}

// --- Menu CRUD --- //

/// POST /api/cuisineberg/restaurant/addmenu request.
///
/// Unset draft fields must already be defaulted to the sentinels
/// ([`PLACEHOLDER_PHOTO_URL`], [`DEFAULT_FOOD_CATEGORY`],
/// [`DishType::Unknown`]) by the caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMenuItemRequest {
    pub public_code: PublicCode,
    pub item_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(rename = "photoURL")]
    pub photo_url: String,
    pub food_category: String,
    pub dish_type: DishType,
}

/// POST /api/cuisineberg/restaurant/addmenu response: the restaurant's
/// updated menu, with the newly created item as the last element.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AddMenuItemResponse {
    #[serde(default)]
    pub menu: Vec<MenuItem>,
}

/// PUT /api/cuisineberg/restaurant/menu/{id} request. The response is the
/// updated [`MenuItem`] itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMenuItemRequest {
    pub item_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(rename = "photoURL")]
    pub photo_url: String,
    pub food_category: String,
    pub dish_type: DishType,
}

// --- Auth --- //

/// POST /api/cuisineberg/retail/login request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/cuisineberg/retail/login response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// The session token. A 2xx response without a token does NOT count as a
    /// successful login.
    #[serde(default)]
    pub token: Option<String>,
}

/// POST /api/cuisineberg/retail/register request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub restaurant_name: String,
    pub mobile_number: String,
    pub restaurant_address: RestaurantAddress,
}

// --- impl MenuItemId --- //

impl MenuItemId {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MenuItemId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl Display for MenuItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// --- impl PublicCode --- //

impl From<&str> for PublicCode {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl Display for PublicCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// --- impl MenuItem --- //

impl MenuItem {
    /// The price formatted for display with two decimal places, e.g.
    /// "299.50".
    pub fn display_price(&self) -> String {
        format!("{:.2}", self.price)
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod arbitrary {
    use proptest::strategy::Strategy;
    use rust_decimal::Decimal;

    /// An arbitrary non-negative price with two decimal places.
    pub fn any_price() -> impl Strategy<Value = Decimal> {
        (0i64..=1_000_000_00)
            .prop_map(|cents| Decimal::new(cents, 2))
    }
}
