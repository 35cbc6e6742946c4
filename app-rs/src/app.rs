//! [`App`] construction and the session lifecycle.
//!
//! One [`App`] is one signed-in session. It is built three ways: restored
//! from a stored token on startup ([`App::load`]), or freshly signed in
//! ([`App::login`]). Registration ([`App::register`]) creates the account
//! server-side but does not sign in; the user proceeds to the login screen.
//!
//! [`App::logout`] ends the session: it fires the session's cancel signal
//! (any in-flight menu operation resolves `Cancelled` without touching
//! local state) and clears the stored token. The shell then drops the
//! [`App`] and returns to sign-in.

use std::{borrow::Cow, path::PathBuf, sync::Mutex};

use anyhow::Context;
use cuisineberg_api::{
    auth::SessionToken,
    def::RetailAuthApi,
    env::DeployEnv,
    models::{Empty, LoginRequest, MenuItemId, RegisterRequest},
};
use tracing::{info, warn};

use crate::{
    client::{RetailAuthClient, RetailClient},
    error::SessionError,
    form,
    menu::{self, MenuDb, MenuItemDraft},
    notify_once::NotifyOnce,
    secret_store::SecretStore,
};

/// Everything the shell decides at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Which backend deployment to talk to.
    pub deploy_env: DeployEnv,
    /// Overrides the backend url in dev. Ignored outside dev.
    pub dev_api_url: Option<String>,
    /// Base directory for app data. Each deploy env gets its own
    /// subdirectory so a dev session token never leaks into prod.
    pub base_app_data_dir: PathBuf,
    /// Use the on-disk mock secret store instead of the platform keychain.
    pub use_mock_secret_store: bool,
}

/// One signed-in retail session.
pub struct App {
    secret_store: SecretStore,
    client: RetailClient,
    menu_db: Mutex<MenuDb>,
    cancel: NotifyOnce,
}

// --- impl AppConfig --- //

impl AppConfig {
    /// The app data dir scoped to this deploy env.
    pub fn env_data_dir(&self) -> PathBuf {
        self.base_app_data_dir.join(self.deploy_env.as_str())
    }

    fn secret_store(&self) -> SecretStore {
        SecretStore::new(
            self.use_mock_secret_store,
            self.deploy_env,
            &self.env_data_dir(),
        )
    }

    fn dev_api_url(&self) -> Option<Cow<'static, str>> {
        self.dev_api_url.clone().map(Cow::Owned)
    }
}

// --- impl App --- //

impl App {
    /// Restore the session from local storage. Returns `None` if no token
    /// is stored, i.e. the user has to sign in (or register) first.
    pub async fn load(config: &AppConfig) -> anyhow::Result<Option<Self>> {
        let secret_store = config.secret_store();
        let maybe_token = secret_store
            .read_token()
            .context("Failed to read stored session token")?;
        let token = match maybe_token {
            Some(token) => token,
            None => return Ok(None),
        };
        info!("Restored existing session");
        Ok(Some(Self::new(config, secret_store, token)))
    }

    /// Sign in with an email and password. On success the returned token is
    /// persisted and the session is ready; the first profile load still has
    /// to be triggered by the menu screen.
    pub async fn login(
        config: &AppConfig,
        email: &str,
        password: &str,
    ) -> Result<Self, SessionError> {
        let secret_store = config.secret_store();
        let auth =
            RetailAuthClient::new(config.deploy_env, config.dev_api_url());
        let token = login_inner(&auth, &secret_store, email, password).await?;
        info!("Signed in");
        Ok(Self::new(config, secret_store, token))
    }

    /// Create a new retail account. Does not sign in; the user is sent to
    /// the login screen afterwards.
    pub async fn register(
        config: &AppConfig,
        req: &RegisterRequest,
    ) -> Result<(), SessionError> {
        let auth =
            RetailAuthClient::new(config.deploy_env, config.dev_api_url());
        register_inner(&auth, req).await
    }

    fn new(
        config: &AppConfig,
        secret_store: SecretStore,
        token: SessionToken,
    ) -> Self {
        let client =
            RetailClient::new(config.deploy_env, config.dev_api_url(), token);
        Self {
            secret_store,
            client,
            menu_db: Mutex::new(MenuDb::default()),
            cancel: NotifyOnce::new(),
        }
    }

    /// The session's menu state, for the shell to render from.
    pub fn menu_db(&self) -> &Mutex<MenuDb> {
        &self.menu_db
    }

    /// See [`menu::load_profile`].
    pub async fn load_profile(&self) -> Result<(), SessionError> {
        menu::load_profile(
            &self.menu_db,
            &self.client,
            &self.secret_store,
            self.cancel.clone(),
        )
        .await
    }

    /// See [`menu::add_menu_item`].
    pub async fn add_menu_item(
        &self,
        draft: &MenuItemDraft,
    ) -> Result<(), SessionError> {
        menu::add_menu_item(
            &self.menu_db,
            &self.client,
            &self.secret_store,
            draft,
            self.cancel.clone(),
        )
        .await
    }

    /// See [`menu::update_menu_item`].
    pub async fn update_menu_item(
        &self,
        id: &MenuItemId,
        draft: &MenuItemDraft,
    ) -> Result<(), SessionError> {
        menu::update_menu_item(
            &self.menu_db,
            &self.client,
            &self.secret_store,
            id,
            draft,
            self.cancel.clone(),
        )
        .await
    }

    /// See [`menu::delete_menu_item`].
    pub async fn delete_menu_item(
        &self,
        id: &MenuItemId,
    ) -> Result<(), SessionError> {
        menu::delete_menu_item(
            &self.menu_db,
            &self.client,
            id,
            self.cancel.clone(),
        )
        .await
    }

    /// End the session. Cancels any in-flight menu operation and clears the
    /// stored token; the shell drops the [`App`] right after.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.cancel.send();
        self.secret_store
            .delete_token()
            .map_err(|err| SessionError::Storage(format!("{err:#}")))?;
        info!("Signed out");
        Ok(())
    }
}

// --- login / register --- //

async fn login_inner(
    auth: &impl RetailAuthApi,
    secret_store: &SecretStore,
    email: &str,
    password: &str,
) -> Result<SessionToken, SessionError> {
    form::validate_required("Email", email)
        .map_err(SessionError::Validation)?;
    form::validate_required("Password", password)
        .map_err(SessionError::Validation)?;

    let req = LoginRequest {
        email: email.to_owned(),
        password: password.to_owned(),
    };
    // A failed attempt also drops any token a previous session left behind,
    // so a bad sign-in can't fall back into the old session on relaunch.
    let resp = match auth.login(&req).await {
        Ok(resp) => resp,
        Err(err) => {
            clear_stored_token(secret_store);
            return Err(SessionError::from_auth(err));
        }
    };

    // A 2xx response without a token is still a failed login.
    let token = match resp.token {
        Some(token) => SessionToken::new(token),
        None => {
            clear_stored_token(secret_store);
            return Err(SessionError::AuthRejected("Login failed".to_owned()));
        }
    };

    secret_store
        .write_token(&token)
        .map_err(|err| SessionError::Storage(format!("{err:#}")))?;
    Ok(token)
}

fn clear_stored_token(secret_store: &SecretStore) {
    if let Err(err) = secret_store.delete_token() {
        warn!("Failed to clear stored session token: {err:#}");
    }
}

async fn register_inner(
    auth: &impl RetailAuthApi,
    req: &RegisterRequest,
) -> Result<(), SessionError> {
    // `area` is the one optional address field.
    let required = [
        ("Name", req.name.as_str()),
        ("Email", req.email.as_str()),
        ("Password", req.password.as_str()),
        ("Restaurant name", req.restaurant_name.as_str()),
        ("Mobile number", req.mobile_number.as_str()),
        ("Street", req.restaurant_address.street.as_str()),
        ("City", req.restaurant_address.city.as_str()),
        ("State", req.restaurant_address.state.as_str()),
        ("Zip code", req.restaurant_address.zip_code.as_str()),
        ("Country", req.restaurant_address.country.as_str()),
    ];
    for (field_name, value) in required {
        form::validate_required(field_name, value)
            .map_err(SessionError::Validation)?;
    }

    let Empty {} =
        auth.register(req).await.map_err(SessionError::from_mutation)?;
    Ok(())
}
