//! The country/state/city picker backing the registration form.
//!
//! Three dependent dropdowns. Selecting a country loads the states scoped to
//! its id; selecting a state loads its cities. Changing a higher selection
//! clears every selection and option list below it. Option lists are sorted
//! case-insensitively by name.
//!
//! Unlike the menu session ops there is no cancel signal here; registration
//! runs before sign-in and the picker is dropped with its screen, which
//! abandons any in-flight fetch.

use cuisineberg_api::{
    def::GeoDataApi,
    geo::{GeoCity, GeoCountry, GeoState},
};

use crate::error::SessionError;

/// Selection state for one mount of the registration screen.
#[derive(Debug, Default)]
pub struct LocationPicker {
    countries: Vec<GeoCountry>,
    states: Vec<GeoState>,
    cities: Vec<GeoCity>,
    selected_country: Option<GeoCountry>,
    selected_state: Option<GeoState>,
    selected_city: Option<GeoCity>,
    loading: bool,
}

impl LocationPicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The country options. Empty until [`Self::load_countries`] succeeds.
    pub fn countries(&self) -> &[GeoCountry] {
        &self.countries
    }

    /// The state options scoped to the selected country.
    pub fn states(&self) -> &[GeoState] {
        &self.states
    }

    /// The city options scoped to the selected state.
    pub fn cities(&self) -> &[GeoCity] {
        &self.cities
    }

    pub fn selected_country(&self) -> Option<&GeoCountry> {
        self.selected_country.as_ref()
    }

    pub fn selected_state(&self) -> Option<&GeoState> {
        self.selected_state.as_ref()
    }

    pub fn selected_city(&self) -> Option<&GeoCity> {
        self.selected_city.as_ref()
    }

    /// True while one of the reference datasets is being fetched.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Fetch the country list. Called once when the screen mounts; a
    /// success resets the whole cascade under the fresh option list.
    pub async fn load_countries(
        &mut self,
        geo: &impl GeoDataApi,
    ) -> Result<(), SessionError> {
        self.loading = true;
        let res = geo.countries().await;
        self.loading = false;

        let mut countries = res.map_err(SessionError::from_mutation)?;
        sort_by_name_ci(&mut countries, |country| country.name.as_str());

        self.countries = countries;
        self.states = Vec::new();
        self.cities = Vec::new();
        self.selected_country = None;
        self.selected_state = None;
        self.selected_city = None;
        Ok(())
    }

    /// Select a country by name and load its states. Clears any state and
    /// city selection. On a failed fetch the previous cascade is kept so
    /// the user can re-select.
    pub async fn select_country(
        &mut self,
        geo: &impl GeoDataApi,
        name: &str,
    ) -> Result<(), SessionError> {
        let country = self
            .countries
            .iter()
            .find(|country| country.name == name)
            .cloned()
            .ok_or_else(|| {
                SessionError::Validation(format!("Unknown country '{name}'"))
            })?;

        self.loading = true;
        let res = geo.states().await;
        self.loading = false;

        let mut states = res
            .map_err(SessionError::from_mutation)?
            .into_iter()
            .filter(|state| state.country_id == country.id)
            .collect::<Vec<_>>();
        sort_by_name_ci(&mut states, |state| state.name.as_str());

        self.selected_country = Some(country);
        self.states = states;
        self.cities = Vec::new();
        self.selected_state = None;
        self.selected_city = None;
        Ok(())
    }

    /// Select a state by name and load its cities. Clears any city
    /// selection.
    pub async fn select_state(
        &mut self,
        geo: &impl GeoDataApi,
        name: &str,
    ) -> Result<(), SessionError> {
        let state = self
            .states
            .iter()
            .find(|state| state.name == name)
            .cloned()
            .ok_or_else(|| {
                SessionError::Validation(format!("Unknown state '{name}'"))
            })?;

        self.loading = true;
        let res = geo.cities().await;
        self.loading = false;

        let mut cities = res
            .map_err(SessionError::from_mutation)?
            .into_iter()
            .filter(|city| city.state_id == state.id)
            .collect::<Vec<_>>();
        sort_by_name_ci(&mut cities, |city| city.name.as_str());

        self.selected_state = Some(state);
        self.cities = cities;
        self.selected_city = None;
        Ok(())
    }

    /// Select a city by name. The city list is already local; no fetch.
    pub fn select_city(&mut self, name: &str) -> Result<(), SessionError> {
        let city = self
            .cities
            .iter()
            .find(|city| city.name == name)
            .cloned()
            .ok_or_else(|| {
                SessionError::Validation(format!("Unknown city '{name}'"))
            })?;
        self.selected_city = Some(city);
        Ok(())
    }
}

fn sort_by_name_ci<T>(items: &mut [T], name: fn(&T) -> &str) {
    items.sort_by_key(|item| name(item).to_lowercase());
}

#[cfg(test)]
mod test {
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use cuisineberg_api::error::{RestError, RestErrorKind};

    use super::*;

    /// Serves a small fixed dataset and counts requests.
    struct MockGeo {
        num_requests: AtomicUsize,
        /// When set, every fetch fails with this error.
        fail_with: Mutex<Option<RestError>>,
    }

    impl MockGeo {
        fn new() -> Self {
            Self {
                num_requests: AtomicUsize::new(0),
                fail_with: Mutex::new(None),
            }
        }

        fn num_requests(&self) -> usize {
            self.num_requests.load(Ordering::SeqCst)
        }

        fn fail_with(&self, err: RestError) {
            *self.fail_with.lock().unwrap() = Some(err);
        }

        fn clear_fail_with(&self) {
            *self.fail_with.lock().unwrap() = None;
        }

        fn bump(&self) -> Result<(), RestError> {
            self.num_requests.fetch_add(1, Ordering::SeqCst);
            match self.fail_with.lock().unwrap().clone() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }
    }

    fn country(id: &str, name: &str) -> GeoCountry {
        GeoCountry {
            id: id.to_owned(),
            name: name.to_owned(),
        }
    }

    fn state(id: &str, name: &str, country_id: &str) -> GeoState {
        GeoState {
            id: id.to_owned(),
            name: name.to_owned(),
            country_id: country_id.to_owned(),
        }
    }

    fn city(id: &str, name: &str, state_id: &str) -> GeoCity {
        GeoCity {
            id: id.to_owned(),
            name: name.to_owned(),
            state_id: state_id.to_owned(),
        }
    }

    impl GeoDataApi for MockGeo {
        async fn countries(&self) -> Result<Vec<GeoCountry>, RestError> {
            self.bump()?;
            Ok(vec![
                country("231", "united states"),
                country("101", "India"),
                country("31", "Brazil"),
            ])
        }

        async fn states(&self) -> Result<Vec<GeoState>, RestError> {
            self.bump()?;
            Ok(vec![
                state("4023", "Maharashtra", "101"),
                state("1416", "California", "231"),
                state("4026", "Karnataka", "101"),
            ])
        }

        async fn cities(&self) -> Result<Vec<GeoCity>, RestError> {
            self.bump()?;
            Ok(vec![
                city("57606", "Mumbai", "4023"),
                city("58000", "Mysuru", "4026"),
                city("57992", "Bengaluru", "4026"),
            ])
        }
    }

    fn names<'a, T>(
        items: &'a [T],
        name: fn(&'a T) -> &'a str,
    ) -> Vec<&'a str> {
        items.iter().map(name).collect()
    }

    #[tokio::test]
    async fn cascade_scopes_and_sorts() {
        let geo = MockGeo::new();
        let mut picker = LocationPicker::new();

        picker.load_countries(&geo).await.unwrap();
        assert_eq!(
            names(picker.countries(), |c| &c.name),
            ["Brazil", "India", "united states"],
        );

        picker.select_country(&geo, "India").await.unwrap();
        assert_eq!(picker.selected_country().unwrap().id, "101");
        assert_eq!(
            names(picker.states(), |s| &s.name),
            ["Karnataka", "Maharashtra"],
        );
        assert!(picker.cities().is_empty());

        picker.select_state(&geo, "Karnataka").await.unwrap();
        assert_eq!(picker.selected_state().unwrap().id, "4026");
        assert_eq!(
            names(picker.cities(), |c| &c.name),
            ["Bengaluru", "Mysuru"],
        );

        picker.select_city("Bengaluru").unwrap();
        assert_eq!(picker.selected_city().unwrap().id, "57992");
        assert!(!picker.is_loading());
    }

    #[tokio::test]
    async fn reselecting_country_clears_below() {
        let geo = MockGeo::new();
        let mut picker = LocationPicker::new();
        picker.load_countries(&geo).await.unwrap();
        picker.select_country(&geo, "India").await.unwrap();
        picker.select_state(&geo, "Karnataka").await.unwrap();
        picker.select_city("Mysuru").unwrap();

        picker.select_country(&geo, "united states").await.unwrap();
        assert_eq!(picker.selected_country().unwrap().id, "231");
        assert_eq!(names(picker.states(), |s| &s.name), ["California"]);
        assert!(picker.selected_state().is_none());
        assert!(picker.cities().is_empty());
        assert!(picker.selected_city().is_none());
    }

    #[tokio::test]
    async fn unknown_names_are_rejected_locally() {
        let geo = MockGeo::new();
        let mut picker = LocationPicker::new();
        picker.load_countries(&geo).await.unwrap();
        let num_requests = geo.num_requests();

        let err = picker.select_country(&geo, "Atlantis").await.unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));
        // rejected before any fetch
        assert_eq!(geo.num_requests(), num_requests);

        // No country selected yet, so every state name is unknown.
        let err = picker.select_state(&geo, "Karnataka").await.unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));
        let err = picker.select_city("Bengaluru").unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));
        assert_eq!(geo.num_requests(), num_requests);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_cascade() {
        let geo = MockGeo::new();
        let mut picker = LocationPicker::new();
        picker.load_countries(&geo).await.unwrap();
        picker.select_country(&geo, "India").await.unwrap();

        geo.fail_with(RestError::new(
            RestErrorKind::Timeout,
            "Request timed out".to_owned(),
        ));
        let err = picker
            .select_country(&geo, "united states")
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Network(_)));
        assert!(!picker.is_loading());

        // Still on the old selection; the user can just pick again.
        assert_eq!(picker.selected_country().unwrap().name, "India");
        assert_eq!(
            names(picker.states(), |s| &s.name),
            ["Karnataka", "Maharashtra"],
        );

        geo.clear_fail_with();
        picker.select_country(&geo, "united states").await.unwrap();
        assert_eq!(names(picker.states(), |s| &s.name), ["California"]);
    }
}
