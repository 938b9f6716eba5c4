//! Feature encoding for regressor inference
//!
//! Turns raw user attributes into the 7-element vector the regressors were
//! trained on. Categorical values outside the catalog never fail: education
//! falls back to ordinal 0, gender to the all-zero triple and job titles to
//! whatever the job-title resolver gives for an unseen title.

use crate::artifacts::Artifacts;
use crate::models::{Education, FeatureVector, Gender, RawInput};
use tracing::debug;

/// Ordinal code for an education label, 0 when unrecognized
pub fn encode_education(education: &str) -> f64 {
    match Education::from_label(education) {
        Some(level) => level.ordinal() as f64,
        None => {
            debug!(education = %education, "Unrecognized education, encoding as 0");
            0.0
        }
    }
}

/// One-hot (female, male, other) triple, all zero when unrecognized
pub fn encode_gender(gender: &str) -> [f64; 3] {
    match Gender::from_label(gender) {
        Some(g) => g.one_hot(),
        None => {
            debug!(gender = %gender, "Unrecognized gender, encoding as all-zero");
            [0.0; 3]
        }
    }
}

/// Encode one request against the loaded artifacts
pub fn encode(input: &RawInput, artifacts: &Artifacts) -> FeatureVector {
    let education_encoded = encode_education(&input.education);

    let job_mean = artifacts.job_titles().resolve(&input.job_title);
    let job_title_mean_scaled = artifacts.scaler_job().transform(job_mean);

    let [gender_female, gender_male, gender_other] = encode_gender(&input.gender);

    let age_scaled = artifacts.scaler_age().transform(input.age as f64);
    let experience_scaled = artifacts.scaler_experience().transform(input.experience);

    FeatureVector {
        age_scaled,
        education_encoded,
        experience_scaled,
        job_title_mean_scaled,
        gender_female,
        gender_male,
        gender_other,
    }
}
