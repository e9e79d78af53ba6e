//! In-memory city catalog and suggestion filtering

use crate::City;

/// Maximum number of suggestions shown in a dropdown
pub const MAX_SUGGESTIONS: usize = 8;

/// Cities fetched from the search service, in service order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityCatalog {
    cities: Vec<City>,
}

impl CityCatalog {
    pub fn new(cities: Vec<City>) -> Self {
        Self { cities }
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn find(&self, code: &str) -> Option<&City> {
        self.cities.iter().find(|city| city.code == code)
    }

    /// Suggestions for `query`.
    ///
    /// Case-insensitive substring match on the city name or the country,
    /// skipping the city coded `exclude`, capped at [`MAX_SUGGESTIONS`] in
    /// catalog order. An empty query matches every city.
    pub fn filter(&self, query: &str, exclude: Option<&str>) -> Vec<City> {
        let query = query.to_lowercase();
        self.cities
            .iter()
            .filter(|city| Some(city.code.as_str()) != exclude)
            .filter(|city| {
                query.is_empty()
                    || city.name.to_lowercase().contains(&query)
                    || city.country.to_lowercase().contains(&query)
            })
            .take(MAX_SUGGESTIONS)
            .cloned()
            .collect()
    }
}

impl From<Vec<City>> for CityCatalog {
    fn from(cities: Vec<City>) -> Self {
        Self::new(cities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_catalog() -> CityCatalog {
        CityCatalog::new(vec![
            City::new("LON", "London", "UK"),
            City::new("PAR", "Paris", "France"),
        ])
    }

    fn large_catalog() -> CityCatalog {
        CityCatalog::new(
            (0..12)
                .map(|i| City::new(&format!("C{:02}", i), &format!("City {}", i), "Land"))
                .collect(),
        )
    }

    fn codes(cities: &[City]) -> Vec<&str> {
        cities.iter().map(|c| c.code.as_str()).collect()
    }

    #[test]
    fn test_empty_query_returns_catalog() {
        assert_eq!(small_catalog().filter("", None), small_catalog().cities());
    }

    #[test]
    fn test_empty_query_is_capped() {
        let result = large_catalog().filter("", None);
        assert_eq!(result.len(), MAX_SUGGESTIONS);
        assert_eq!(result[0].code, "C00");
        assert_eq!(result[7].code, "C07");
    }

    #[test]
    fn test_matches_country() {
        assert_eq!(codes(&small_catalog().filter("fr", None)), vec!["PAR"]);
    }

    #[test]
    fn test_case_permutations() {
        let catalog = small_catalog();
        for query in ["lon", "LON", "Lon", "lOn", "uk", "UK"] {
            assert_eq!(codes(&catalog.filter(query, None)), vec!["LON"], "{}", query);
            assert!(catalog.filter(query, Some("LON")).is_empty(), "{}", query);
        }
    }

    #[test]
    fn test_exclusion_applies_to_empty_query() {
        assert_eq!(codes(&small_catalog().filter("", Some("PAR"))), vec!["LON"]);
    }

    #[test]
    fn test_cyrillic_is_case_insensitive() {
        let catalog = CityCatalog::new(vec![
            City::new("MOW", "Москва", "Россия"),
            City::new("PAR", "Париж", "Франция"),
        ]);
        assert_eq!(codes(&catalog.filter("МОС", None)), vec!["MOW"]);
        assert_eq!(codes(&catalog.filter("франц", None)), vec!["PAR"]);
    }

    #[test]
    fn test_cap_keeps_catalog_order() {
        let result = large_catalog().filter("city 1", Some("C10"));
        assert_eq!(codes(&result), vec!["C01", "C11"]);
    }

    #[test]
    fn test_find() {
        let catalog = small_catalog();
        assert_eq!(catalog.find("PAR").map(|c| c.name.as_str()), Some("Paris"));
        assert!(catalog.find("XXX").is_none());
    }
}
