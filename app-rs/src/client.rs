//! This module contains the code for the [`RetailAuthClient`], the
//! [`RetailClient`] and the [`GeoClient`] that the app uses to talk to the
//! Cuisineberg backend and the static geo dataset host respectively.
//!
//! [`RetailAuthClient`]: crate::client::RetailAuthClient
//! [`RetailClient`]: crate::client::RetailClient
//! [`GeoClient`]: crate::client::GeoClient

use std::borrow::Cow;

use cuisineberg_api::{
    auth::SessionToken,
    def::{AppRetailApi, GeoDataApi, RetailAuthApi},
    env::DeployEnv,
    error::RestError,
    geo::{GEO_DATA_URL, GeoCity, GeoCountry, GeoExport, GeoState},
    models::{
        AddMenuItemRequest, AddMenuItemResponse, Empty, LoginRequest,
        LoginResponse, MenuItem, MenuItemId, RegisterRequest,
        RestaurantProfile, UpdateMenuItemRequest,
    },
    rest::{RequestBuilderExt, RestClient},
};

/// The user agent sent with every request, e.g. "cuisineberg-app-v0.1.0".
pub const USER_AGENT: &str =
    concat!("cuisineberg-app-v", env!("CARGO_PKG_VERSION"));

/// The client for the unauthenticated auth endpoints (login and register).
/// Requests carry no credentials.
#[derive(Clone)]
pub struct RetailAuthClient {
    rest: RestClient,
    api_url: Cow<'static, str>,
}

/// The client for the authenticated retail endpoints. Holds the session
/// token and attaches it as a bearer header to every request; the backend is
/// the sole judge of whether the token is still good.
#[derive(Clone)]
pub struct RetailClient {
    rest: RestClient,
    api_url: Cow<'static, str>,
    token: SessionToken,
}

/// The client for the static country/state/city datasets the registration
/// flow reads. Unauthenticated; the host is not the Cuisineberg backend.
#[derive(Clone)]
pub struct GeoClient {
    rest: RestClient,
}

// --- impl RetailAuthClient --- //

impl RetailAuthClient {
    pub fn new(
        deploy_env: DeployEnv,
        dev_api_url: Option<Cow<'static, str>>,
    ) -> Self {
        let rest = RestClient::new(USER_AGENT, "backend");
        let api_url = deploy_env.api_url(dev_api_url);
        Self { rest, api_url }
    }
}

impl RetailAuthApi for RetailAuthClient {
    async fn login(
        &self,
        req: &LoginRequest,
    ) -> Result<LoginResponse, RestError> {
        let api_url = &self.api_url;
        let url = format!("{api_url}/api/cuisineberg/retail/login");
        let req = self.rest.post(url, req);
        self.rest.send(req).await
    }

    async fn register(
        &self,
        req: &RegisterRequest,
    ) -> Result<Empty, RestError> {
        let api_url = &self.api_url;
        let url = format!("{api_url}/api/cuisineberg/retail/register");
        let req = self.rest.post(url, req);
        self.rest.send(req).await
    }
}

// --- impl RetailClient --- //

impl RetailClient {
    pub fn new(
        deploy_env: DeployEnv,
        dev_api_url: Option<Cow<'static, str>>,
        token: SessionToken,
    ) -> Self {
        let rest = RestClient::new(USER_AGENT, "backend");
        let api_url = deploy_env.api_url(dev_api_url);
        Self {
            rest,
            api_url,
            token,
        }
    }

    fn item_url(&self, id: &MenuItemId) -> String {
        let api_url = &self.api_url;
        format!("{api_url}/api/cuisineberg/restaurant/menu/{id}")
    }
}

impl AppRetailApi for RetailClient {
    async fn retail_info(&self) -> Result<RestaurantProfile, RestError> {
        let api_url = &self.api_url;
        let url = format!("{api_url}/api/cuisineberg/retail/info");
        let req = self.rest.get(url, &Empty {}).bearer(&self.token);
        self.rest.send(req).await
    }

    async fn add_menu_item(
        &self,
        req: &AddMenuItemRequest,
    ) -> Result<AddMenuItemResponse, RestError> {
        let api_url = &self.api_url;
        let url = format!("{api_url}/api/cuisineberg/restaurant/addmenu");
        let req = self.rest.post(url, req).bearer(&self.token);
        self.rest.send(req).await
    }

    async fn update_menu_item(
        &self,
        id: &MenuItemId,
        req: &UpdateMenuItemRequest,
    ) -> Result<MenuItem, RestError> {
        let url = self.item_url(id);
        let req = self.rest.put(url, req).bearer(&self.token);
        self.rest.send(req).await
    }

    async fn delete_menu_item(
        &self,
        id: &MenuItemId,
    ) -> Result<Empty, RestError> {
        let url = self.item_url(id);
        let req = self.rest.delete(url, &Empty {}).bearer(&self.token);
        self.rest.send(req).await
    }
}

// --- impl GeoClient --- //

impl GeoClient {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            rest: RestClient::new(USER_AGENT, "geo"),
        }
    }
}

impl GeoDataApi for GeoClient {
    async fn countries(&self) -> Result<Vec<GeoCountry>, RestError> {
        let url = format!("{GEO_DATA_URL}/countries.json");
        let req = self.rest.get(url, &Empty {});
        let export: GeoExport = self.rest.send(req).await?;
        export.table_rows(GeoCountry::TABLE)
    }

    async fn states(&self) -> Result<Vec<GeoState>, RestError> {
        let url = format!("{GEO_DATA_URL}/states.json");
        let req = self.rest.get(url, &Empty {});
        let export: GeoExport = self.rest.send(req).await?;
        export.table_rows(GeoState::TABLE)
    }

    async fn cities(&self) -> Result<Vec<GeoCity>, RestError> {
        let url = format!("{GEO_DATA_URL}/cities.json");
        let req = self.rest.get(url, &Empty {});
        let export: GeoExport = self.rest.send(req).await?;
        export.table_rows(GeoCity::TABLE)
    }
}
