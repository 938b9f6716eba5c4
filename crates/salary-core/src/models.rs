//! Core data models for the salary predictor

use crate::catalog::{ModelChoice, AGE_RANGE, EXPERIENCE_RANGE, EXPERIENCE_STEP};
use crate::error::InputError;
use crate::output::format_monthly_salary;
use serde::{Deserialize, Serialize};

/// Number of features the regressors were trained on
pub const FEATURE_COUNT: usize = 7;

/// Feature names in training order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "age_scaled",
    "education_encoded",
    "experience_scaled",
    "job_title_mean_scaled",
    "gender_female",
    "gender_male",
    "gender_other",
];

/// Attributes entered by a user for one prediction
///
/// Categorical fields are kept as strings so that values outside the
/// catalog reach the encoder and take its fallbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInput {
    pub age: u32,
    pub education: String,
    pub experience: f64,
    pub job_title: String,
    pub gender: String,
}

impl RawInput {
    pub fn new(
        age: u32,
        education: impl Into<String>,
        experience: f64,
        job_title: impl Into<String>,
        gender: impl Into<String>,
    ) -> Self {
        Self {
            age,
            education: education.into(),
            experience,
            job_title: job_title.into(),
            gender: gender.into(),
        }
    }

    /// Check the numeric fields against the form's bounds
    pub fn validate(&self) -> Result<(), InputError> {
        if !AGE_RANGE.contains(&self.age) {
            return Err(InputError::AgeOutOfRange(self.age));
        }
        if !self.experience.is_finite() || !EXPERIENCE_RANGE.contains(&self.experience) {
            return Err(InputError::ExperienceOutOfRange(self.experience));
        }
        let steps = self.experience / EXPERIENCE_STEP;
        if (steps - steps.round()).abs() > 1e-9 {
            return Err(InputError::ExperienceStep(self.experience));
        }
        Ok(())
    }
}

/// Highest qualification, ordered by credential level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Education {
    HighSchool,
    Bachelors,
    Masters,
    Phd,
}

impl Education {
    pub const ALL: [Education; 4] = [
        Education::HighSchool,
        Education::Bachelors,
        Education::Masters,
        Education::Phd,
    ];

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "High School" => Some(Education::HighSchool),
            "Bachelor's" => Some(Education::Bachelors),
            "Master's" => Some(Education::Masters),
            "PhD" => Some(Education::Phd),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Education::HighSchool => "High School",
            Education::Bachelors => "Bachelor's",
            Education::Masters => "Master's",
            Education::Phd => "PhD",
        }
    }

    pub fn ordinal(&self) -> u8 {
        match self {
            Education::HighSchool => 0,
            Education::Bachelors => 1,
            Education::Masters => 2,
            Education::Phd => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Male" => Some(Gender::Male),
            "Female" => Some(Gender::Female),
            "Other" => Some(Gender::Other),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }

    /// One-hot triple in (female, male, other) order
    pub fn one_hot(&self) -> [f64; 3] {
        match self {
            Gender::Female => [1.0, 0.0, 0.0],
            Gender::Male => [0.0, 1.0, 0.0],
            Gender::Other => [0.0, 0.0, 1.0],
        }
    }
}

/// Feature vector for regressor inference
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub age_scaled: f64,
    pub education_encoded: f64,
    pub experience_scaled: f64,
    pub job_title_mean_scaled: f64,
    pub gender_female: f64,
    pub gender_male: f64,
    pub gender_other: f64,
}

impl FeatureVector {
    /// Features in training order. Reordering corrupts predictions.
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.age_scaled,
            self.education_encoded,
            self.experience_scaled,
            self.job_title_mean_scaled,
            self.gender_female,
            self.gender_male,
            self.gender_other,
        ]
    }
}

/// Predicted monthly salary and the regressor that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_salary: f64,
    pub model: ModelChoice,
}

impl PredictionResult {
    pub fn formatted(&self) -> String {
        format_monthly_salary(self.predicted_salary)
    }
}
