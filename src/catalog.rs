//! The item catalog: loaded once from a JSON file, read-only afterwards.
//!
//! A [`Catalog`] is built before the listener binds and handed to handlers as
//! an `Arc<Catalog>`. Nothing mutates it after construction, so concurrent
//! requests share it without locking.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One catalog record.
///
/// Fields missing from the file default to zero / empty; unknown fields are
/// ignored. `sku` is meant to be unique but this is not checked.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Item {
    pub name: String,
    pub size: i64,
    pub price: i64,
    pub year: i64,
    pub sku: i64,
}

/// Optional per-request filter constraints. `None` means "no constraint".
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Criteria {
    /// Lower-cased substring the item name must contain.
    pub name: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<i64>,
    /// Inclusive upper price bound.
    pub max_price: Option<i64>,
    /// Exact year.
    pub year: Option<i64>,
}

impl Criteria {
    /// Builds criteria from `/api/items` query parameters.
    ///
    /// `get` returns the first value of a parameter. An empty `name` is no
    /// constraint; a numeric parameter that is empty or not an integer is
    /// silently treated as absent. Surrounding whitespace makes a number
    /// unparsable.
    pub fn from_query<'a>(get: impl Fn(&str) -> Option<&'a str>) -> Self {
        let number = |key: &str| get(key).and_then(|v| v.parse::<i64>().ok());
        Self {
            name: get("name")
                .filter(|n| !n.is_empty())
                .map(str::to_lowercase),
            min_price: number("minPrice"),
            max_price: number("maxPrice"),
            year: number("year"),
        }
    }

    /// `true` when every present constraint holds for `item`.
    pub fn matches(&self, item: &Item) -> bool {
        if let Some(name) = &self.name {
            if !item.name.to_lowercase().contains(name.as_str()) {
                return false;
            }
        }
        if self.min_price.is_some_and(|min| item.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| item.price > max) {
            return false;
        }
        if self.year.is_some_and(|year| item.year != year) {
            return false;
        }
        true
    }
}

/// The immutable, ordered item sequence.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    items: Vec<Item>,
}

impl Catalog {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// Reads and parses the catalog file at `path`.
    ///
    /// Either failure is fatal for the caller; there is no partial catalog.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let raw = tokio::fs::read(path).await.map_err(|source| Error::CatalogRead {
            path: path.to_path_buf(),
            source,
        })?;
        let items = serde_json::from_slice(&raw).map_err(|source| Error::CatalogParse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { items })
    }

    pub fn items(&self) -> &[Item] { &self.items }
    pub fn len(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    /// Items matching `criteria`, in catalog order.
    pub fn filter(&self, criteria: &Criteria) -> Vec<&Item> {
        self.items.iter().filter(|item| criteria.matches(item)).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn item(name: &str, price: i64, year: i64, sku: i64) -> Item {
        Item { name: name.to_owned(), size: sku, price, year, sku }
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            item("Widget A", 15, 2020, 1),
            item("Gadget B", 25, 2021, 2),
            item("Big WIDGET", 10, 2019, 3),
            item("Sprocket", 20, 2020, 4),
            item("Free sample", 0, 0, 5),
        ])
    }

    fn criteria(pairs: &[(&str, &str)]) -> Criteria {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        Criteria::from_query(|k| map.get(k).copied())
    }

    fn skus(items: &[&Item]) -> Vec<i64> {
        items.iter().map(|i| i.sku).collect()
    }

    #[test]
    fn no_criteria_returns_everything_in_order() {
        let cat = catalog();
        assert_eq!(skus(&cat.filter(&Criteria::default())), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn name_is_case_insensitive_substring() {
        let cat = catalog();
        let found = cat.filter(&criteria(&[("name", "WiDgEt")]));
        assert_eq!(skus(&found), vec![1, 3]);
        for excluded in cat.items().iter().filter(|i| !found.contains(i)) {
            assert!(!excluded.name.to_lowercase().contains("widget"));
        }
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let cat = catalog();
        let found = cat.filter(&criteria(&[("minPrice", "10"), ("maxPrice", "20")]));
        assert_eq!(skus(&found), vec![1, 3, 4]);
    }

    #[test]
    fn year_is_exact() {
        let cat = catalog();
        assert_eq!(skus(&cat.filter(&criteria(&[("year", "2020")]))), vec![1, 4]);
        assert!(cat.filter(&criteria(&[("year", "202")])).is_empty());
    }

    #[test]
    fn criteria_combine_with_and() {
        let cat = catalog();
        let found = cat.filter(&criteria(&[("name", "widget"), ("year", "2019")]));
        assert_eq!(skus(&found), vec![3]);
    }

    #[test]
    fn malformed_numbers_are_no_constraint() {
        let c = criteria(&[("minPrice", "cheap"), ("maxPrice", ""), ("year", "20x0")]);
        assert_eq!(c, Criteria::default());
        assert_eq!(catalog().filter(&c).len(), 5);
    }

    #[test]
    fn padded_numbers_are_no_constraint() {
        let c = criteria(&[("minPrice", " 10"), ("maxPrice", "20 "), ("year", "\t2020")]);
        assert_eq!(c, Criteria::default());
        assert_eq!(criteria(&[("minPrice", "+10")]).min_price, Some(10));
    }

    #[test]
    fn explicit_zero_is_a_real_constraint() {
        let cat = catalog();
        assert_eq!(skus(&cat.filter(&criteria(&[("year", "0")]))), vec![5]);
        assert_eq!(skus(&cat.filter(&criteria(&[("maxPrice", "0")]))), vec![5]);
    }

    #[test]
    fn empty_name_is_no_constraint() {
        assert_eq!(criteria(&[("name", "")]).name, None);
        assert_eq!(criteria(&[("name", "Gadget")]).name.as_deref(), Some("gadget"));
    }

    #[tokio::test]
    async fn load_reads_items_in_file_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name":"Widget A","size":1,"price":15,"year":2020,"sku":1}},
               {{"name":"Gadget B","price":25,"extra":true}}]"#
        )
        .unwrap();

        let cat = Catalog::load(file.path()).await.unwrap();
        assert_eq!(cat.len(), 2);
        assert_eq!(cat.items()[0], item("Widget A", 15, 2020, 1));
        assert_eq!(cat.items()[1].sku, 0);
    }

    #[tokio::test]
    async fn load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Catalog::load(dir.path().join("data.json")).await.unwrap_err();
        assert!(matches!(err, Error::CatalogRead { .. }), "{err}");
    }

    #[tokio::test]
    async fn load_malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"name":"not an array"}}"#).unwrap();
        let err = Catalog::load(file.path()).await.unwrap_err();
        assert!(matches!(err, Error::CatalogParse { .. }), "{err}");
    }
}
