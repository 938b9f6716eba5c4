//! Fixed vocabularies offered to users
//!
//! The encoder tolerates values outside these lists; the presentation
//! surfaces use them to constrain what users can pick.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Education levels in ordinal order
pub const EDUCATION_LEVELS: [&str; 4] = ["High School", "Bachelor's", "Master's", "PhD"];

/// Genders in the order the form lists them
pub const GENDERS: [&str; 3] = ["Male", "Female", "Other"];

/// Accepted age in years
pub const AGE_RANGE: RangeInclusive<u32> = 18..=65;

/// Accepted professional experience in years
pub const EXPERIENCE_RANGE: RangeInclusive<f64> = 0.0..=40.0;

/// Experience granularity in years
pub const EXPERIENCE_STEP: f64 = 0.5;

pub const DEFAULT_AGE: u32 = 30;
pub const DEFAULT_EXPERIENCE: f64 = 5.0;

/// Job titles seen in training, sorted alphabetically
pub const JOB_TITLES: [&str; 60] = [
    "Account Manager",
    "Accountant",
    "Administrative Assistant",
    "Back end Developer",
    "Business Analyst",
    "Business Development Manager",
    "Business Intelligence Analyst",
    "CEO",
    "Chief Data Officer",
    "Chief Technology Officer",
    "Content Marketing Manager",
    "Copywriter",
    "Creative Director",
    "Customer Service Manager",
    "Customer Service Rep",
    "Data Analyst",
    "Data Entry Clerk",
    "Data Scientist",
    "Delivery Driver",
    "Digital Marketing Manager",
    "Director",
    "Director of Engineering",
    "Director of Finance",
    "Director of HR",
    "Director of Marketing",
    "Director of Operations",
    "Event Coordinator",
    "Financial Advisor",
    "Financial Analyst",
    "Financial Manager",
    "Front End Developer",
    "Full Stack Engineer",
    "Graphic Designer",
    "HR Generalist",
    "HR Manager",
    "IT Manager",
    "IT Support",
    "Junior Data Analyst",
    "Junior Software Engineer",
    "Marketing Analyst",
    "Marketing Director",
    "Marketing Manager",
    "Network Engineer",
    "Office Manager",
    "Operations Manager",
    "Product Manager",
    "Project Manager",
    "Receptionist",
    "Recruiter",
    "Research Scientist",
    "Sales Manager",
    "Sales Representative",
    "Senior Data Scientist",
    "Senior Software Engineer",
    "Software Developer",
    "Software Engineer",
    "UX Designer",
    "VP of Finance",
    "VP of Operations",
    "Web Developer",
];

/// One of the two pre-trained regressors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelChoice {
    #[serde(rename = "Linear Regression", alias = "linear")]
    LinearRegression,
    #[serde(rename = "Random Forest Regression", alias = "random_forest")]
    RandomForest,
}

impl ModelChoice {
    pub const ALL: [ModelChoice; 2] = [ModelChoice::LinearRegression, ModelChoice::RandomForest];

    /// Display label used by the form
    pub fn label(&self) -> &'static str {
        match self {
            ModelChoice::LinearRegression => "Linear Regression",
            ModelChoice::RandomForest => "Random Forest Regression",
        }
    }

    /// Reported accuracy on the evaluation set, in percent
    pub fn accuracy_percent(&self) -> u8 {
        match self {
            ModelChoice::LinearRegression => 80,
            ModelChoice::RandomForest => 98,
        }
    }

    pub fn accuracy_rating(&self) -> &'static str {
        if self.accuracy_percent() > 90 {
            "OPTIMAL"
        } else {
            "GOOD"
        }
    }
}

impl Default for ModelChoice {
    fn default() -> Self {
        ModelChoice::LinearRegression
    }
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a model name matches neither regressor
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown model '{0}', expected \"Linear Regression\" or \"Random Forest Regression\"")]
pub struct UnknownModel(pub String);

impl FromStr for ModelChoice {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linear regression" | "linear" => Ok(ModelChoice::LinearRegression),
            "random forest regression" | "random_forest" | "random-forest" | "rf" => {
                Ok(ModelChoice::RandomForest)
            }
            _ => Err(UnknownModel(s.to_string())),
        }
    }
}
