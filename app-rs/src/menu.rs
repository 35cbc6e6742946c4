//! App-local menu state and the authenticated menu session operations.
//!
//! ### [`MenuDb`]
//!
//! The app's [`MenuDb`] holds a local mirror of the signed-in restaurant's
//! profile and menu. The backend is the source-of-truth; the mirror only
//! changes by applying whole server responses. A profile load replaces it
//! outright (never a merge), a confirmed add or update applies the server's
//! echo of the item, and a confirmed delete filters that id out locally.
//!
//! ### Operations
//!
//! The operations in this module drive one signed-in session. Each validates
//! locally and issues at most one request; there are no retries, a failed
//! operation just waits for the user to try again. Responses are applied
//! under a short [`Mutex`] lock that is never held across an await. Add and
//! update follow up with a full profile re-fetch so local state converges
//! with the server; delete does not.
//!
//! A rejected *profile load* is treated as an expired session: the stored
//! token is cleared and the caller is expected to return to sign-in. The
//! backend doesn't distinguish "bad token" from other load failures, so
//! neither do we. Rejected *mutations* only surface their server message.
//!
//! ### Cancellation
//!
//! Every operation races its request against a [`NotifyOnce`] clone.
//! [`App::logout`] sends the signal; a cancelled operation resolves
//! [`SessionError::Cancelled`] and leaves local state untouched.
//!
//! [`App::logout`]: crate::app::App::logout

use std::sync::Mutex;

use cuisineberg_api::{
    def::AppRetailApi,
    models::{
        AddMenuItemRequest, DEFAULT_FOOD_CATEGORY, DishType, Empty, MenuItem,
        MenuItemId, PLACEHOLDER_PHOTO_URL, PublicCode, RestaurantProfile,
        UpdateMenuItemRequest,
    },
};
use tracing::warn;

use crate::{
    error::SessionError, form, notify_once::NotifyOnce,
    secret_store::SecretStore,
};

/// Load (or reload) the restaurant profile and menu from the backend.
///
/// Requires a stored session token; without one the session is over and the
/// caller should return to sign-in. A successful response replaces the whole
/// local profile. A rejected request (any non-2xx) also ends the session:
/// the stored token is cleared so the next load short-circuits.
pub async fn load_profile(
    db: &Mutex<MenuDb>,
    api: &impl AppRetailApi,
    secret_store: &SecretStore,
    cancel: NotifyOnce,
) -> Result<(), SessionError> {
    // The first load shows the full-screen spinner; reloads of an already
    // visible menu show the pull-to-refresh indicator instead.
    let is_refresh;
    {
        let mut locked_db = db.lock().unwrap();
        is_refresh = locked_db.profile.is_some();
        if is_refresh {
            locked_db.refreshing = true;
        } else {
            locked_db.loading = true;
        }
    }

    let res = load_profile_inner(db, api, secret_store, cancel).await;

    let mut locked_db = db.lock().unwrap();
    if is_refresh {
        locked_db.refreshing = false;
    } else {
        locked_db.loading = false;
    }
    locked_db.record_result(&res);
    res
}

async fn load_profile_inner(
    db: &Mutex<MenuDb>,
    api: &impl AppRetailApi,
    secret_store: &SecretStore,
    mut cancel: NotifyOnce,
) -> Result<(), SessionError> {
    // Re-check the stored token on every load; a prior rejected request (or
    // a sign-out elsewhere) may have cleared it since this session started.
    let have_token = match secret_store.read_token() {
        Ok(token) => token.is_some(),
        Err(err) => {
            warn!("Failed to read stored session token: {err:#}");
            false
        }
    };
    if !have_token {
        return Err(SessionError::Unauthenticated);
    }

    let res = tokio::select! {
        biased;
        () = cancel.recv() => return Err(SessionError::Cancelled),
        res = api.retail_info() => res,
    };

    match res {
        Ok(profile) => {
            db.lock().unwrap().replace_profile(profile);
            Ok(())
        }
        Err(err) => {
            let err = SessionError::from_auth(err);
            if matches!(err, SessionError::AuthRejected(_)) {
                // The session is over; clear the token so the next load sees
                // a signed-out app rather than replaying the bad credential.
                if let Err(err) = secret_store.delete_token() {
                    warn!("Failed to clear rejected session token: {err:#}");
                }
            }
            Err(err)
        }
    }
}

/// Validate a draft and create it as a new menu item.
///
/// Validation failures never reach the network. On success the server
/// returns the restaurant's updated menu; the created item is its last
/// element and is appended locally, then the whole profile is re-fetched.
pub async fn add_menu_item(
    db: &Mutex<MenuDb>,
    api: &impl AppRetailApi,
    secret_store: &SecretStore,
    draft: &MenuItemDraft,
    cancel: NotifyOnce,
) -> Result<(), SessionError> {
    db.lock().unwrap().mutating = true;

    let res = add_menu_item_inner(db, api, secret_store, draft, cancel).await;

    let mut locked_db = db.lock().unwrap();
    locked_db.mutating = false;
    locked_db.record_result(&res);
    res
}

async fn add_menu_item_inner(
    db: &Mutex<MenuDb>,
    api: &impl AppRetailApi,
    secret_store: &SecretStore,
    draft: &MenuItemDraft,
    mut cancel: NotifyOnce,
) -> Result<(), SessionError> {
    let public_code = db.lock().unwrap().public_code()?;
    let req = draft.validate_add(public_code)?;

    let res = tokio::select! {
        biased;
        () = cancel.recv() => return Err(SessionError::Cancelled),
        res = api.add_menu_item(&req) => res,
    };
    let resp = res.map_err(SessionError::from_mutation)?;

    // The newly created item is the last element of the response's menu.
    let created = resp.menu.into_iter().next_back();
    db.lock().unwrap().apply_added(created);

    refresh_after_mutation(db, api, secret_store, cancel).await;
    Ok(())
}

/// Validate a draft and rewrite the menu item with the given id.
///
/// Same validation as [`add_menu_item`]. On success the server echoes the
/// updated item, which replaces the matching local item by id, then the
/// whole profile is re-fetched.
pub async fn update_menu_item(
    db: &Mutex<MenuDb>,
    api: &impl AppRetailApi,
    secret_store: &SecretStore,
    id: &MenuItemId,
    draft: &MenuItemDraft,
    cancel: NotifyOnce,
) -> Result<(), SessionError> {
    db.lock().unwrap().mutating = true;

    let res =
        update_menu_item_inner(db, api, secret_store, id, draft, cancel).await;

    let mut locked_db = db.lock().unwrap();
    locked_db.mutating = false;
    locked_db.record_result(&res);
    res
}

async fn update_menu_item_inner(
    db: &Mutex<MenuDb>,
    api: &impl AppRetailApi,
    secret_store: &SecretStore,
    id: &MenuItemId,
    draft: &MenuItemDraft,
    mut cancel: NotifyOnce,
) -> Result<(), SessionError> {
    let req = draft.validate_update()?;

    let res = tokio::select! {
        biased;
        () = cancel.recv() => return Err(SessionError::Cancelled),
        res = api.update_menu_item(id, &req) => res,
    };
    let updated = res.map_err(SessionError::from_mutation)?;

    // Merge keyed by the *response's* id, like the menu that comes back
    // from a load. A response for an id we no longer hold is a no-op.
    db.lock().unwrap().apply_updated(updated);

    refresh_after_mutation(db, api, secret_store, cancel).await;
    Ok(())
}

/// Delete the menu item with the given id.
///
/// On success the item is filtered out of the local menu. Unlike add and
/// update there is no follow-up re-fetch. On a rejected request (e.g. the
/// item was already deleted server-side) local state is left unchanged.
pub async fn delete_menu_item(
    db: &Mutex<MenuDb>,
    api: &impl AppRetailApi,
    id: &MenuItemId,
    cancel: NotifyOnce,
) -> Result<(), SessionError> {
    db.lock().unwrap().mutating = true;

    let res = delete_menu_item_inner(db, api, id, cancel).await;

    let mut locked_db = db.lock().unwrap();
    locked_db.mutating = false;
    locked_db.record_result(&res);
    res
}

async fn delete_menu_item_inner(
    db: &Mutex<MenuDb>,
    api: &impl AppRetailApi,
    id: &MenuItemId,
    mut cancel: NotifyOnce,
) -> Result<(), SessionError> {
    let res = tokio::select! {
        biased;
        () = cancel.recv() => return Err(SessionError::Cancelled),
        res = api.delete_menu_item(id) => res,
    };
    let Empty {} = res.map_err(SessionError::from_mutation)?;

    db.lock().unwrap().apply_deleted(id);
    Ok(())
}

/// Re-fetch the profile after a successful add/update. The mutation itself
/// already succeeded, so a failed re-fetch only logs; local state keeps the
/// applied change until the next successful load.
async fn refresh_after_mutation(
    db: &Mutex<MenuDb>,
    api: &impl AppRetailApi,
    secret_store: &SecretStore,
    cancel: NotifyOnce,
) {
    match load_profile_inner(db, api, secret_store, cancel).await {
        Ok(()) | Err(SessionError::Cancelled) => (),
        Err(err) => warn!("Post-mutation profile refresh failed: {err}"),
    }
}

/// A menu item form as the user typed it: free text in, a validated wire
/// request out. `price` stays a string until validation so the form can
/// round-trip whatever was entered.
#[derive(Clone, Debug, Default)]
pub struct MenuItemDraft {
    pub item_name: String,
    pub price: String,
    pub photo_url: String,
    pub food_category: String,
    pub dish_type: DishType,
}

/// The app-local mirror of the restaurant profile and menu, plus the
/// in-flight and error flags the UI renders from.
#[derive(Debug, Default)]
pub struct MenuDb {
    profile: Option<RestaurantProfile>,
    loading: bool,
    refreshing: bool,
    mutating: bool,
    last_error: Option<String>,
}

// --- impl MenuItemDraft --- //

impl MenuItemDraft {
    /// Validate the draft and build the create request. The restaurant's
    /// `public_code` comes from the loaded profile.
    fn validate_add(
        &self,
        public_code: PublicCode,
    ) -> Result<AddMenuItemRequest, SessionError> {
        let update = self.validate_update()?;
        Ok(AddMenuItemRequest {
            public_code,
            item_name: update.item_name,
            price: update.price,
            photo_url: update.photo_url,
            food_category: update.food_category,
            dish_type: update.dish_type,
        })
    }

    /// Validate the draft and build the update request, filling unset
    /// optional fields with the wire defaults.
    fn validate_update(&self) -> Result<UpdateMenuItemRequest, SessionError> {
        form::validate_item_name(&self.item_name)
            .map_err(SessionError::Validation)?;
        let price = form::validate_price(&self.price)
            .map_err(SessionError::Validation)?;

        Ok(UpdateMenuItemRequest {
            item_name: self.item_name.clone(),
            price,
            photo_url: form::non_empty_or(
                &self.photo_url,
                PLACEHOLDER_PHOTO_URL,
            ),
            food_category: form::non_empty_or(
                &self.food_category,
                DEFAULT_FOOD_CATEGORY,
            ),
            dish_type: self.dish_type,
        })
    }
}

// --- impl MenuDb --- //

impl MenuDb {
    /// The loaded profile, if the first load has completed.
    pub fn profile(&self) -> Option<&RestaurantProfile> {
        self.profile.as_ref()
    }

    /// The current menu. Empty until the first successful load.
    pub fn menu(&self) -> &[MenuItem] {
        self.profile
            .as_ref()
            .map(|profile| profile.menu.as_slice())
            .unwrap_or_default()
    }

    /// True while the first profile load is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// True while a reload of an already loaded profile is in flight.
    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    /// True while an add/update/delete is in flight.
    pub fn is_mutating(&self) -> bool {
        self.mutating
    }

    /// The display message of the most recent failed operation. Cleared by
    /// the next successful one.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Filter the menu by case-insensitive substring match on the item
    /// name. A derived view only; the stored menu is untouched.
    pub fn search(&self, query: &str) -> Vec<&MenuItem> {
        let query = query.to_lowercase();
        self.menu()
            .iter()
            .filter(|item| item.item_name.to_lowercase().contains(&query))
            .collect()
    }

    fn public_code(&self) -> Result<PublicCode, SessionError> {
        // Items can't be created until the restaurant profile is loaded.
        self.profile
            .as_ref()
            .map(|profile| profile.public_code.clone())
            .ok_or_else(|| {
                SessionError::Validation("No restaurant loaded".to_owned())
            })
    }

    fn record_result(&mut self, res: &Result<(), SessionError>) {
        match res {
            Ok(()) => self.last_error = None,
            // Cancelled ops were abandoned (logout); nothing to display.
            Err(SessionError::Cancelled) => (),
            Err(err) => self.last_error = Some(err.to_string()),
        }
    }

    fn replace_profile(&mut self, profile: RestaurantProfile) {
        self.profile = Some(profile);
    }

    fn apply_added(&mut self, item: Option<MenuItem>) {
        let Some(profile) = self.profile.as_mut() else {
            return;
        };
        // A 2xx add whose response menu was somehow empty; the follow-up
        // refresh will reconcile.
        let Some(item) = item else {
            return;
        };
        // Ids are unique within a menu; replace if the server re-sent one
        // we already hold.
        match profile.menu.iter_mut().find(|cur| cur.id == item.id) {
            Some(cur) => *cur = item,
            None => profile.menu.push(item),
        }
    }

    fn apply_updated(&mut self, item: MenuItem) {
        let Some(profile) = self.profile.as_mut() else {
            return;
        };
        if let Some(cur) =
            profile.menu.iter_mut().find(|cur| cur.id == item.id)
        {
            *cur = item;
        }
    }

    fn apply_deleted(&mut self, id: &MenuItemId) {
        if let Some(profile) = self.profile.as_mut() {
            profile.menu.retain(|item| &item.id != id);
        }
    }

    /// Check the integrity of the in-memory state.
    #[cfg(test)]
    fn debug_assert_invariants(&self) {
        use std::collections::HashSet;

        if cfg!(not(debug_assertions)) {
            return;
        }

        // No two items share an id.
        let menu = self.menu();
        let ids = menu.iter().map(|item| &item.id).collect::<HashSet<_>>();
        assert_eq!(ids.len(), menu.len());
    }
}

#[cfg(test)]
mod test_utils {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use cuisineberg_api::{
        auth::SessionToken,
        error::{CLIENT_404_NOT_FOUND, ErrorResponse, RestError},
        models::{AddMenuItemResponse, RestaurantAddress},
    };
    use rust_decimal::Decimal;

    use super::*;

    /// An in-memory stand-in for the backend. It owns the authoritative
    /// profile, mints item ids, and counts the requests it serves.
    pub(super) struct MockBackend {
        pub(super) state: Mutex<RestaurantProfile>,
        next_id: AtomicUsize,
        num_requests: AtomicUsize,
        /// When set, `retail_info` fails with this error.
        fail_info: Mutex<Option<RestError>>,
    }

    impl MockBackend {
        pub(super) fn new(profile: RestaurantProfile) -> Self {
            Self {
                state: Mutex::new(profile),
                next_id: AtomicUsize::new(1),
                num_requests: AtomicUsize::new(0),
                fail_info: Mutex::new(None),
            }
        }

        pub(super) fn menu(&self) -> Vec<MenuItem> {
            self.state.lock().unwrap().menu.clone()
        }

        pub(super) fn num_requests(&self) -> usize {
            self.num_requests.load(Ordering::SeqCst)
        }

        pub(super) fn fail_info_with(&self, err: RestError) {
            *self.fail_info.lock().unwrap() = Some(err);
        }

        pub(super) fn clear_fail_info(&self) {
            *self.fail_info.lock().unwrap() = None;
        }

        fn bump(&self) {
            self.num_requests.fetch_add(1, Ordering::SeqCst);
        }

        fn mint_id(&self) -> MenuItemId {
            let n = self.next_id.fetch_add(1, Ordering::SeqCst);
            MenuItemId(format!("mock-{n}"))
        }
    }

    impl AppRetailApi for MockBackend {
        async fn retail_info(&self) -> Result<RestaurantProfile, RestError> {
            self.bump();
            if let Some(err) = self.fail_info.lock().unwrap().clone() {
                return Err(err);
            }
            Ok(self.state.lock().unwrap().clone())
        }

        async fn add_menu_item(
            &self,
            req: &AddMenuItemRequest,
        ) -> Result<AddMenuItemResponse, RestError> {
            self.bump();
            let item = MenuItem {
                id: self.mint_id(),
                item_name: req.item_name.clone(),
                price: req.price,
                photo_url: Some(req.photo_url.clone()),
                food_category: Some(req.food_category.clone()),
                dish_type: req.dish_type,
            };
            let mut state = self.state.lock().unwrap();
            state.menu.push(item);
            Ok(AddMenuItemResponse {
                menu: state.menu.clone(),
            })
        }

        async fn update_menu_item(
            &self,
            id: &MenuItemId,
            req: &UpdateMenuItemRequest,
        ) -> Result<MenuItem, RestError> {
            self.bump();
            let mut state = self.state.lock().unwrap();
            let item = state
                .menu
                .iter_mut()
                .find(|item| &item.id == id)
                .ok_or_else(not_found)?;
            item.item_name = req.item_name.clone();
            item.price = req.price;
            item.photo_url = Some(req.photo_url.clone());
            item.food_category = Some(req.food_category.clone());
            item.dish_type = req.dish_type;
            Ok(item.clone())
        }

        async fn delete_menu_item(
            &self,
            id: &MenuItemId,
        ) -> Result<Empty, RestError> {
            self.bump();
            let mut state = self.state.lock().unwrap();
            let len_before = state.menu.len();
            state.menu.retain(|item| &item.id != id);
            if state.menu.len() == len_before {
                return Err(not_found());
            }
            Ok(Empty {})
        }
    }

    /// An api whose requests never complete. Drives the in-flight flag and
    /// mid-flight cancellation tests.
    pub(super) struct HangingApi;

    impl AppRetailApi for HangingApi {
        async fn retail_info(&self) -> Result<RestaurantProfile, RestError> {
            std::future::pending().await
        }

        async fn add_menu_item(
            &self,
            _req: &AddMenuItemRequest,
        ) -> Result<AddMenuItemResponse, RestError> {
            std::future::pending().await
        }

        async fn update_menu_item(
            &self,
            _id: &MenuItemId,
            _req: &UpdateMenuItemRequest,
        ) -> Result<MenuItem, RestError> {
            std::future::pending().await
        }

        async fn delete_menu_item(
            &self,
            _id: &MenuItemId,
        ) -> Result<Empty, RestError> {
            std::future::pending().await
        }
    }

    pub(super) fn not_found() -> RestError {
        let body = ErrorResponse {
            message: Some("Item not found".to_owned()),
            error: None,
        };
        RestError::from_response(CLIENT_404_NOT_FOUND, body)
    }

    pub(super) fn dummy_item(id: &str, name: &str, price: Decimal) -> MenuItem {
        MenuItem {
            id: MenuItemId::from(id),
            item_name: name.to_owned(),
            price,
            photo_url: None,
            food_category: None,
            dish_type: DishType::Unknown,
        }
    }

    pub(super) fn dummy_profile(menu: Vec<MenuItem>) -> RestaurantProfile {
        RestaurantProfile {
            name: "Asha Rao".to_owned(),
            email: "asha@masaladarbar.example".to_owned(),
            restaurant_name: "Masala Darbar".to_owned(),
            restaurant_address: RestaurantAddress {
                street: "14 MG Road".to_owned(),
                area: "Indiranagar".to_owned(),
                city: "Bengaluru".to_owned(),
                state: "Karnataka".to_owned(),
                zip_code: "560038".to_owned(),
                country: "India".to_owned(),
            },
            mobile_number: "+91 98450 12345".to_owned(),
            public_code: PublicCode::from("MD1234"),
            menu,
        }
    }

    /// A mock secret store with a session token already in it.
    pub(super) fn signed_in_store() -> SecretStore {
        let store = SecretStore::mock();
        let token = SessionToken::new("test-session-token".to_owned());
        store.write_token(&token).unwrap();
        store
    }

    pub(super) fn draft(name: &str, price: &str) -> MenuItemDraft {
        MenuItemDraft {
            item_name: name.to_owned(),
            price: price.to_owned(),
            ..Default::default()
        }
    }
}
