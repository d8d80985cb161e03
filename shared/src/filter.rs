//! City filter: the URL query string is the only store of the selection.
//!
//! The selection lives in the `city` query parameter as a comma-joined list.
//! Every read re-derives it from the current query, and [`FilterController::toggle_city`]
//! is the only writer. Commas inside city names are not supported.

use std::collections::BTreeSet;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::catalog::EventRecord;

pub const CITY_PARAM: &str = "city";
pub const MAP_PATH: &str = "/map";

/// Bytes left unescaped by `application/x-www-form-urlencoded` serialization.
const FORM_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'*')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_');

fn form_encode(raw: &str) -> String {
    utf8_percent_encode(raw, FORM_VALUE)
        .to_string()
        .replace("%20", "+")
}

fn form_decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// Ordered query parameters with `URLSearchParams`-like semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parse a query string, with or without the leading `?`.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (form_decode(key), form_decode(value))
            })
            .collect();
        Self { pairs }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replace the first `key` in place and drop any later duplicates; append if absent.
    pub fn set(&mut self, key: &str, value: &str) {
        let mut seen = false;
        self.pairs.retain_mut(|(k, v)| {
            if k.as_str() != key {
                return true;
            }
            if seen {
                return false;
            }
            seen = true;
            *v = value.to_string();
            true
        });
        if !seen {
            self.pairs.push((key.to_string(), value.to_string()));
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k.as_str() != key);
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Serialize without the leading `?`.
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", form_encode(k), form_encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Selected cities in URL order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CitySelection {
    cities: Vec<String>,
}

impl CitySelection {
    pub fn from_params(params: &QueryParams) -> Self {
        let cities = params
            .get(CITY_PARAM)
            .map(|raw| {
                raw.split(',')
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Self { cities }
    }

    pub fn from_query(query: &str) -> Self {
        Self::from_params(&QueryParams::parse(query))
    }

    pub fn contains(&self, city: &str) -> bool {
        self.cities.iter().any(|c| c == city)
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    /// Remove `city` if present, append it otherwise.
    pub fn toggled(&self, city: &str) -> Self {
        let mut cities = self.cities.clone();
        if self.contains(city) {
            cities.retain(|c| c != city);
        } else {
            cities.push(city.to_string());
        }
        Self { cities }
    }

    /// Write the selection into `params`, dropping the parameter when empty.
    pub fn write_to(&self, params: &mut QueryParams) {
        if self.cities.is_empty() {
            params.remove(CITY_PARAM);
        } else {
            params.set(CITY_PARAM, &self.cities.join(","));
        }
    }
}

/// `/map` plus the serialized query, or bare `/map` when there is none.
pub fn map_href(params: &QueryParams) -> String {
    let query = params.to_query_string();
    if query.is_empty() {
        MAP_PATH.to_string()
    } else {
        format!("{MAP_PATH}?{query}")
    }
}

/// Target of toggling `city` from the page at `query`.
pub fn toggle_href(query: &str, city: &str) -> String {
    let mut params = QueryParams::parse(query);
    CitySelection::from_params(&params)
        .toggled(city)
        .write_to(&mut params);
    map_href(&params)
}

/// Distinct cities across the catalog, ascending and case-sensitive.
pub fn available_cities(events: &[EventRecord]) -> Vec<&'static str> {
    events
        .iter()
        .map(|e| e.city)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Cities containing `query` case-insensitively. An empty query keeps everything.
pub fn narrow_cities<'a>(cities: &[&'a str], query: &str) -> Vec<&'a str> {
    if query.is_empty() {
        return cities.to_vec();
    }
    let needle = query.to_lowercase();
    cities
        .iter()
        .copied()
        .filter(|city| city.to_lowercase().contains(&needle))
        .collect()
}

/// Records whose city is selected, in catalog order. No selection shows everything.
pub fn filter_events<'a>(
    events: &'a [EventRecord],
    selection: &CitySelection,
) -> Vec<&'a EventRecord> {
    if selection.is_empty() {
        return events.iter().collect();
    }
    events
        .iter()
        .filter(|e| selection.contains(e.city))
        .collect()
}

/// Access to the page URL.
pub trait Navigation {
    /// Current query string, without the leading `?`.
    fn query(&self) -> String;
    /// Commit `href` as a new history entry.
    fn push(&mut self, href: &str);
}

/// Reads and writes the city selection through a [`Navigation`].
#[derive(Debug, Clone, Copy)]
pub struct FilterController<N> {
    nav: N,
}

impl<N: Navigation> FilterController<N> {
    pub fn new(nav: N) -> Self {
        Self { nav }
    }

    pub fn navigation(&self) -> &N {
        &self.nav
    }

    pub fn selection(&self) -> CitySelection {
        CitySelection::from_query(&self.nav.query())
    }

    pub fn is_selected(&self, city: &str) -> bool {
        self.selection().contains(city)
    }

    pub fn toggle_city(&mut self, city: &str) {
        let href = toggle_href(&self.nav.query(), city);
        self.nav.push(&href);
    }

    pub fn filtered_events<'a>(&self, events: &'a [EventRecord]) -> Vec<&'a EventRecord> {
        filter_events(events, &self.selection())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EVENTS;

    /// In-memory history stack with back support.
    #[derive(Default, Clone)]
    struct MemoryHistory {
        entries: Vec<String>,
        cursor: usize,
    }

    impl MemoryHistory {
        fn at(href: &str) -> Self {
            Self {
                entries: vec![href.to_string()],
                cursor: 0,
            }
        }

        fn current(&self) -> &str {
            self.entries.get(self.cursor).map(String::as_str).unwrap_or("/map")
        }

        fn back(&mut self) {
            self.cursor = self.cursor.saturating_sub(1);
        }
    }

    impl Navigation for MemoryHistory {
        fn query(&self) -> String {
            self.current()
                .split_once('?')
                .map(|(_, q)| q.to_string())
                .unwrap_or_default()
        }

        fn push(&mut self, href: &str) {
            self.entries.truncate(self.cursor + 1);
            self.entries.push(href.to_string());
            self.cursor = self.entries.len() - 1;
        }
    }

    fn record(city: &'static str) -> EventRecord {
        EventRecord {
            name: city,
            latitude: 0.0,
            longitude: 0.0,
            location_label: "",
            city,
            logo_url: "",
        }
    }

    #[test]
    fn toggle_twice_restores_selection_and_url() {
        for start in ["/map", "/map?city=Bangkok", "/map?city=Chennai%2CChicago"] {
            for city in ["Chennai", "Bangkok", "San Francisco", "Nowhere"] {
                let mut ctl = FilterController::new(MemoryHistory::at(start));
                let before = ctl.selection();
                let was_selected = ctl.is_selected(city);
                ctl.toggle_city(city);
                assert_eq!(ctl.is_selected(city), !was_selected, "{start} {city}");
                ctl.toggle_city(city);
                assert_eq!(ctl.is_selected(city), was_selected);
                assert_eq!(ctl.selection().cities().len(), before.cities().len());
                assert!(before.cities().iter().all(|c| ctl.is_selected(c)));
            }
        }
    }

    #[test]
    fn toggle_from_unfiltered_round_trips_to_bare_path() {
        let mut ctl = FilterController::new(MemoryHistory::at("/map"));
        ctl.toggle_city("San Francisco");
        assert_eq!(ctl.navigation().current(), "/map?city=San+Francisco");
        ctl.toggle_city("San Francisco");
        assert_eq!(ctl.navigation().current(), "/map");
    }

    #[test]
    fn toggle_appends_in_click_order() {
        let mut ctl = FilterController::new(MemoryHistory::at("/map"));
        ctl.toggle_city("Chennai");
        ctl.toggle_city("Bangkok");
        assert_eq!(ctl.navigation().current(), "/map?city=Chennai%2CBangkok");
        assert_eq!(ctl.selection().cities(), &["Chennai", "Bangkok"]);
    }

    #[test]
    fn toggle_pushes_history_entries() {
        let mut ctl = FilterController::new(MemoryHistory::at("/map"));
        ctl.toggle_city("Chennai");
        ctl.toggle_city("Bangkok");
        assert_eq!(ctl.navigation().entries.len(), 3);

        let mut nav = ctl.navigation().clone();
        nav.back();
        let ctl = FilterController::new(nav);
        assert!(ctl.is_selected("Chennai"));
        assert!(!ctl.is_selected("Bangkok"));
    }

    #[test]
    fn toggle_preserves_other_parameters() {
        let href = toggle_href("lang=en&city=Chennai&ref=home", "Chennai");
        assert_eq!(href, "/map?lang=en&ref=home");
        let href = toggle_href("lang=en", "Chennai");
        assert_eq!(href, "/map?lang=en&city=Chennai");
    }

    #[test]
    fn empty_segments_are_dropped() {
        let selection = CitySelection::from_query("?city=,Chennai,,Bangkok,");
        assert_eq!(selection.cities(), &["Chennai", "Bangkok"]);
        assert!(CitySelection::from_query("city=").is_empty());
        assert!(CitySelection::from_query("").is_empty());
    }

    #[test]
    fn removing_last_city_drops_parameter() {
        assert_eq!(toggle_href("city=Chennai", "Chennai"), "/map");
        assert_eq!(toggle_href("city=Chennai,", "Chennai"), "/map");
    }

    #[test]
    fn available_cities_are_distinct_and_sorted() {
        assert_eq!(
            available_cities(EVENTS),
            vec![
                "Bangkok",
                "Cape Town",
                "Chennai",
                "Chiang Mai",
                "Chicago",
                "San Francisco"
            ]
        );
    }

    #[test]
    fn available_cities_keep_case_variants_apart() {
        let events = [record("chennai"), record("Chennai"), record("Bangkok")];
        assert_eq!(
            available_cities(&events),
            vec!["Bangkok", "Chennai", "chennai"]
        );
    }

    #[test]
    fn narrowing_is_case_insensitive_substring() {
        let cities = available_cities(EVENTS);
        assert_eq!(narrow_cities(&cities, "CH"), vec!["Chennai", "Chiang Mai", "Chicago"]);
        assert_eq!(narrow_cities(&cities, "an"), vec!["Bangkok", "Chiang Mai", "San Francisco"]);
        assert_eq!(narrow_cities(&cities, ""), cities);
        assert!(narrow_cities(&cities, "zzz").is_empty());
    }

    #[test]
    fn narrowing_never_changes_selection() {
        let ctl = FilterController::new(MemoryHistory::at("/map?city=Chennai%2CChicago"));
        let cities = available_cities(EVENTS);
        let before: Vec<bool> = cities.iter().map(|c| ctl.is_selected(c)).collect();
        for query in ["ban", "x", "Chi", ""] {
            let visible = narrow_cities(&cities, query);
            assert!(visible.len() <= cities.len());
            let now: Vec<bool> = cities.iter().map(|c| ctl.is_selected(c)).collect();
            assert_eq!(now, before, "query {query:?}");
        }
    }

    #[test]
    fn filter_matches_every_subset_of_cities() {
        let cities = available_cities(EVENTS);
        for mask in 0u32..(1 << cities.len()) {
            let chosen: Vec<&str> = cities
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, c)| *c)
                .collect();
            let mut params = QueryParams::default();
            let mut selection = CitySelection::default();
            for c in &chosen {
                selection = selection.toggled(c);
            }
            selection.write_to(&mut params);
            let selection = CitySelection::from_params(&params);
            let filtered = filter_events(EVENTS, &selection);

            let expected: Vec<&EventRecord> = if chosen.is_empty() {
                EVENTS.iter().collect()
            } else {
                EVENTS.iter().filter(|e| chosen.contains(&e.city)).collect()
            };
            assert_eq!(filtered, expected, "mask {mask:#b}");
        }
    }

    #[test]
    fn selection_is_case_sensitive() {
        let selection = CitySelection::from_query("city=chennai");
        assert!(filter_events(EVENTS, &selection).is_empty());
        assert!(!selection.contains("Chennai"));
    }

    #[test]
    fn unknown_city_yields_empty_result() {
        let selection = CitySelection::from_query("city=Atlantis");
        assert!(filter_events(EVENTS, &selection).is_empty());
    }

    #[test]
    fn query_params_decode_form_encoding() {
        let params = QueryParams::parse("?city=San+Francisco%2CCape%20Town&x");
        assert_eq!(params.get("city"), Some("San Francisco,Cape Town"));
        assert_eq!(params.get("x"), Some(""));
        assert_eq!(params.get("y"), None);
    }

    #[test]
    fn query_params_set_collapses_duplicates() {
        let mut params = QueryParams::parse("city=A&page=2&city=B");
        params.set("city", "C");
        assert_eq!(params.to_query_string(), "city=C&page=2");
    }
}
