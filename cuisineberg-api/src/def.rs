//! # API Definitions
//!
//! This module, as closely as possible, defines the HTTP APIs this client
//! consumes. We have no compile-time guarantee that the backend matches the
//! definitions below, but keeping every endpoint in one place makes it
//! straightforward to compare against the backend's route table.
//!
//! ## Guidelines
//!
//! If an API method takes or returns nothing, make the type [`Empty`] and NOT
//! `()` (unit type). Using `()` makes it impossible to add optional fields in
//! a backwards-compatible way.
//!
//! Each endpoint should be documented with:
//! - 1) HTTP method e.g. `GET`
//! - 2) Endpoint e.g. `/api/cuisineberg/retail/info`
//! - 3) Data used to make the request e.g. [`AddMenuItemRequest`]
//! - 4) The return type e.g. [`RestaurantProfile`]
//!
//! The methods below should resemble the data actually sent across the wire.

#![deny(missing_docs)]
// We don't export our traits currently so auto trait stability is not
// relevant.
#![allow(async_fn_in_trait)]

use crate::{
    error::RestError,
    geo::{GeoCity, GeoCountry, GeoState},
    models::{
        AddMenuItemRequest, AddMenuItemResponse, Empty, LoginRequest,
        LoginResponse, MenuItem, MenuItemId, RegisterRequest,
        RestaurantProfile, UpdateMenuItemRequest,
    },
};

/// The authenticated api the backend exposes to a signed-in retail account.
/// All methods attach `Authorization: Bearer <token>`.
pub trait AppRetailApi {
    /// GET /api/cuisineberg/retail/info [`Empty`] -> [`RestaurantProfile`]
    async fn retail_info(&self) -> Result<RestaurantProfile, RestError>;

    /// POST /api/cuisineberg/restaurant/addmenu [`AddMenuItemRequest`]
    ///                                       -> [`AddMenuItemResponse`]
    async fn add_menu_item(
        &self,
        req: &AddMenuItemRequest,
    ) -> Result<AddMenuItemResponse, RestError>;

    /// PUT /api/cuisineberg/restaurant/menu/{id} [`UpdateMenuItemRequest`]
    ///                                        -> [`MenuItem`]
    async fn update_menu_item(
        &self,
        id: &MenuItemId,
        req: &UpdateMenuItemRequest,
    ) -> Result<MenuItem, RestError>;

    /// DELETE /api/cuisineberg/restaurant/menu/{id} [`Empty`] -> [`Empty`]
    async fn delete_menu_item(
        &self,
        id: &MenuItemId,
    ) -> Result<Empty, RestError>;
}

/// The unauthenticated auth api the backend exposes to the retail app.
pub trait RetailAuthApi {
    /// POST /api/cuisineberg/retail/login [`LoginRequest`]
    ///                                 -> [`LoginResponse`]
    async fn login(&self, req: &LoginRequest)
    -> Result<LoginResponse, RestError>;

    /// POST /api/cuisineberg/retail/register [`RegisterRequest`] -> [`Empty`]
    async fn register(&self, req: &RegisterRequest)
    -> Result<Empty, RestError>;
}

/// The static reference-data host the registration flow reads country/state/
/// city lists from. Unauthenticated; each method fetches one whole dataset.
pub trait GeoDataApi {
    /// GET {geo_url}/countries.json -> [`Vec<GeoCountry>`]
    async fn countries(&self) -> Result<Vec<GeoCountry>, RestError>;

    /// GET {geo_url}/states.json -> [`Vec<GeoState>`]
    async fn states(&self) -> Result<Vec<GeoState>, RestError>;

    /// GET {geo_url}/cities.json -> [`Vec<GeoCity>`]
    async fn cities(&self) -> Result<Vec<GeoCity>, RestError>;
}
