//! Demographic categories and their ACS bin labels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A demographic dimension; DKL and MI are computed independently per category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "race")]
    Race,
    #[serde(rename = "income")]
    Income,
    #[serde(rename = "educ")]
    Education,
    #[serde(rename = "empl")]
    Employment,
}

const RACE_BINS: &[&str] = &[
    "White alone",
    "Black or African American alone",
    "American Indian and Alaska Native alone",
    "Asian alone",
    "Native Hawaiian and Other Pacific Islander alone",
    "Some other race alone",
    "Two or more races",
    "Hispanic or Latino (any race)",
];

const INCOME_BINS: &[&str] = &[
    "Less than $10,000",
    "$10,000 to $14,999",
    "$15,000 to $19,999",
    "$20,000 to $24,999",
    "$25,000 to $29,999",
    "$30,000 to $34,999",
    "$35,000 to $39,999",
    "$40,000 to $44,999",
    "$45,000 to $49,999",
    "$50,000 to $59,999",
    "$60,000 to $74,999",
    "$75,000 to $99,999",
    "$100,000 to $124,999",
    "$125,000 to $149,999",
    "$150,000 to $199,999",
    "$200,000 or more",
];

const EDUCATION_BINS: &[&str] = &[
    "No schooling completed",
    "Nursery school",
    "Kindergarten",
    "1st grade",
    "2nd grade",
    "3rd grade",
    "4th grade",
    "5th grade",
    "6th grade",
    "7th grade",
    "8th grade",
    "9th grade",
    "10th grade",
    "11th grade",
    "12th grade, no diploma",
    "Regular high school diploma",
    "GED or alternative credential",
    "Some college, less than 1 year",
    "Some college, 1 or more years, no degree",
    "Associate's degree",
    "Bachelor's degree",
    "Master's degree",
    "Professional school degree",
    "Doctorate degree",
];

const EMPLOYMENT_BINS: &[&str] = &[
    "In labor force",
    "Civilian labor force",
    "Employed",
    "Unemployed",
    "Armed Forces",
    "Not in labor force",
];

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Race,
        Category::Income,
        Category::Education,
        Category::Employment,
    ];

    /// Short name used in file names and on the command line
    pub fn slug(&self) -> &'static str {
        match self {
            Category::Race => "race",
            Category::Income => "income",
            Category::Education => "educ",
            Category::Employment => "empl",
        }
    }

    /// Value written to the `category_group` column
    pub fn group_label(&self) -> &'static str {
        match self {
            Category::Race => "Race/Ethnicity",
            Category::Income => "Household Income",
            Category::Education => "Education attainment",
            Category::Employment => "Employment",
        }
    }

    /// ACS 5-year detail table
    pub fn acs_table(&self) -> &'static str {
        match self {
            Category::Race => "B03002",
            Category::Income => "B19001",
            Category::Education => "B15003",
            Category::Employment => "B23025",
        }
    }

    /// Bin labels, table total excluded
    pub fn bins(&self) -> &'static [&'static str] {
        match self {
            Category::Race => RACE_BINS,
            Category::Income => INCOME_BINS,
            Category::Education => EDUCATION_BINS,
            Category::Employment => EMPLOYMENT_BINS,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Category {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.slug().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_round_trip() {
        for category in Category::ALL {
            assert_eq!(category.slug().parse::<Category>().unwrap(), category);
        }
        assert_eq!("INCOME".parse::<Category>().unwrap(), Category::Income);
        assert!(matches!(
            "housing".parse::<Category>(),
            Err(ConfigError::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_bin_counts() {
        assert_eq!(Category::Race.bins().len(), 8);
        assert_eq!(Category::Income.bins().len(), 16);
        assert_eq!(Category::Education.bins().len(), 24);
        assert_eq!(Category::Employment.bins().len(), 6);
    }

    #[test]
    fn test_serde_uses_slugs() {
        let json = serde_json::to_string(&Category::Education).unwrap();
        assert_eq!(json, "\"educ\"");
        let back: Category = serde_json::from_str("\"empl\"").unwrap();
        assert_eq!(back, Category::Employment);
    }
}
