//! Survey vintages: which dataset and CBSA delineation each data year uses,
//! and which categories are available at block-group level.

use std::collections::BTreeMap;
use std::fmt;

use super::categories::Category;
use crate::error::ConfigError;

/// Census product a vintage is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    /// American Community Survey 5-year estimates
    Acs5,
    /// Decennial Summary File 1
    Sf1,
    /// Decennial SF1 for race, SF3 for income/education/employment
    Sf1Sf3,
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dataset::Acs5 => "acs5",
            Dataset::Sf1 => "sf1",
            Dataset::Sf1Sf3 => "sf1+sf3",
        })
    }
}

/// One data year
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vintage {
    pub key: &'static str,
    pub dataset: Dataset,
    /// Vintage of the CBSA delineation file the year is joined against
    pub delineation_year: u16,
    pub categories: &'static [Category],
}

impl Vintage {
    pub fn supports(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }
}

const ALL: &[Category] = &Category::ALL;
const RACE_ONLY: &[Category] = &[Category::Race];

/// Immutable year → vintage table
#[derive(Debug, Clone)]
pub struct VintageRegistry {
    vintages: BTreeMap<&'static str, Vintage>,
}

impl VintageRegistry {
    /// The supported vintages
    ///
    /// 1990 block groups are not offered; the API's tract numbering for that
    /// year is unreliable.
    pub fn standard() -> Self {
        let table = [
            ("2009", Dataset::Acs5, 2009, ALL),
            ("2010", Dataset::Acs5, 2009, ALL),
            ("2015", Dataset::Acs5, 2015, ALL),
            ("2020", Dataset::Acs5, 2020, ALL),
            ("2021", Dataset::Acs5, 2020, ALL),
            ("2022", Dataset::Acs5, 2020, ALL),
            ("2023", Dataset::Acs5, 2020, ALL),
            ("2010dec", Dataset::Sf1, 2009, RACE_ONLY),
            ("2000dec", Dataset::Sf1Sf3, 2003, ALL),
        ];

        let vintages = table
            .into_iter()
            .map(|(key, dataset, delineation_year, categories)| {
                (key, Vintage { key, dataset, delineation_year, categories })
            })
            .collect();

        Self { vintages }
    }

    pub fn get(&self, key: &str) -> Result<&Vintage, ConfigError> {
        self.vintages
            .get(key)
            .ok_or_else(|| ConfigError::UnknownVintage(key.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vintage> {
        self.vintages.values()
    }

    pub fn len(&self) -> usize {
        self.vintages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vintages.is_empty()
    }

    pub fn supports(&self, key: &str, category: Category) -> Result<bool, ConfigError> {
        self.get(key).map(|v| v.supports(category))
    }
}

impl Default for VintageRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
