//! Trained artifacts: two regressors, the job-title table and three scalers
//!
//! Loading is all-or-nothing. Once loaded the set is immutable and shared
//! read-only between requests.

mod job_title;
mod scaler;
mod store;

pub use job_title::{JobTitleResolver, FALLBACK_JOB_MEAN};
pub use scaler::StandardScaler;
pub use store::{ArtifactLoader, ArtifactStore};

use crate::catalog::ModelChoice;
use crate::error::ArtifactError;
use crate::predictor::{load_regressor, Regressor};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Artifact keys
pub mod keys {
    pub const LINEAR: &str = "linear";
    pub const RANDOM_FOREST: &str = "random_forest";
    pub const JOB_TITLE_MAP: &str = "job_title_map";
    pub const SCALER_AGE: &str = "scaler_age";
    pub const SCALER_EXPERIENCE: &str = "scaler_experience";
    pub const SCALER_JOB: &str = "scaler_job";
}

/// Default file names inside an artifact directory
pub mod files {
    pub const LINEAR: &str = "linear_regression_model.json";
    pub const RANDOM_FOREST: &str = "random_forest_regression_model.json";
    pub const JOB_TITLE_MAP: &str = "job_title_mean_salary_map.json";
    pub const SCALER_AGE: &str = "scaler_age.json";
    pub const SCALER_EXPERIENCE: &str = "scaler_years_experience.json";
    pub const SCALER_JOB: &str = "scaler_job_title_mean_encoded.json";
    pub const MANIFEST: &str = "manifest.json";
}

/// The loaded artifact set
pub struct Artifacts {
    linear: Box<dyn Regressor>,
    random_forest: Box<dyn Regressor>,
    job_titles: JobTitleResolver,
    scaler_age: StandardScaler,
    scaler_experience: StandardScaler,
    scaler_job: StandardScaler,
}

impl Artifacts {
    pub fn from_parts(
        linear: Box<dyn Regressor>,
        random_forest: Box<dyn Regressor>,
        job_titles: JobTitleResolver,
        scaler_age: StandardScaler,
        scaler_experience: StandardScaler,
        scaler_job: StandardScaler,
    ) -> Self {
        Self {
            linear,
            random_forest,
            job_titles,
            scaler_age,
            scaler_experience,
            scaler_job,
        }
    }

    pub fn regressor(&self, model: ModelChoice) -> &dyn Regressor {
        match model {
            ModelChoice::LinearRegression => self.linear.as_ref(),
            ModelChoice::RandomForest => self.random_forest.as_ref(),
        }
    }

    pub fn job_titles(&self) -> &JobTitleResolver {
        &self.job_titles
    }

    pub fn scaler_age(&self) -> &StandardScaler {
        &self.scaler_age
    }

    pub fn scaler_experience(&self) -> &StandardScaler {
        &self.scaler_experience
    }

    pub fn scaler_job(&self) -> &StandardScaler {
        &self.scaler_job
    }
}

impl fmt::Debug for Artifacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artifacts")
            .field("linear", &self.linear.describe())
            .field("random_forest", &self.random_forest.describe())
            .field("job_titles", &self.job_titles.variant_name())
            .field("scaler_age", &self.scaler_age)
            .field("scaler_experience", &self.scaler_experience)
            .field("scaler_job", &self.scaler_job)
            .finish()
    }
}

/// Locations of the six artifact files
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub linear: PathBuf,
    pub random_forest: PathBuf,
    pub job_title_map: PathBuf,
    pub scaler_age: PathBuf,
    pub scaler_experience: PathBuf,
    pub scaler_job: PathBuf,
    /// Optional SHA-256 manifest; skipped when the file does not exist
    pub manifest: Option<PathBuf>,
}

impl ArtifactPaths {
    /// Default file names under one directory
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            linear: dir.join(files::LINEAR),
            random_forest: dir.join(files::RANDOM_FOREST),
            job_title_map: dir.join(files::JOB_TITLE_MAP),
            scaler_age: dir.join(files::SCALER_AGE),
            scaler_experience: dir.join(files::SCALER_EXPERIENCE),
            scaler_job: dir.join(files::SCALER_JOB),
            manifest: Some(dir.join(files::MANIFEST)),
        }
    }

    pub fn with_linear(mut self, path: impl Into<PathBuf>) -> Self {
        self.linear = path.into();
        self
    }

    pub fn with_random_forest(mut self, path: impl Into<PathBuf>) -> Self {
        self.random_forest = path.into();
        self
    }

    /// Load every artifact; any single failure fails the whole set
    pub fn load(&self) -> Result<Artifacts, ArtifactError> {
        let manifest = match &self.manifest {
            Some(path) if path.exists() => Some(Manifest::read(path)?),
            _ => None,
        };
        let read = |key: &'static str, path: &Path| read_artifact(key, path, manifest.as_ref());

        let linear = load_regressor(
            keys::LINEAR,
            &self.linear,
            &read(keys::LINEAR, &self.linear)?,
        )?;
        let random_forest = load_regressor(
            keys::RANDOM_FOREST,
            &self.random_forest,
            &read(keys::RANDOM_FOREST, &self.random_forest)?,
        )?;

        let table_bytes = read(keys::JOB_TITLE_MAP, &self.job_title_map)?;
        let table: serde_json::Value =
            serde_json::from_slice(&table_bytes).map_err(|e| ArtifactError::Parse {
                key: keys::JOB_TITLE_MAP,
                path: self.job_title_map.clone(),
                message: e.to_string(),
            })?;
        let job_titles = JobTitleResolver::from_value(&table);

        let scaler_age = StandardScaler::from_json(
            keys::SCALER_AGE,
            &read(keys::SCALER_AGE, &self.scaler_age)?,
        )?;
        let scaler_experience = StandardScaler::from_json(
            keys::SCALER_EXPERIENCE,
            &read(keys::SCALER_EXPERIENCE, &self.scaler_experience)?,
        )?;
        let scaler_job = StandardScaler::from_json(
            keys::SCALER_JOB,
            &read(keys::SCALER_JOB, &self.scaler_job)?,
        )?;

        info!(
            linear = %linear.describe(),
            random_forest = %random_forest.describe(),
            job_titles = %job_titles.variant_name(),
            verified = manifest.is_some(),
            "Artifacts loaded"
        );

        Ok(Artifacts::from_parts(
            linear,
            random_forest,
            job_titles,
            scaler_age,
            scaler_experience,
            scaler_job,
        ))
    }
}

/// File name to lowercase hex SHA-256
struct Manifest {
    checksums: HashMap<String, String>,
}

impl Manifest {
    fn read(path: &Path) -> Result<Self, ArtifactError> {
        let bytes = std::fs::read(path).map_err(|e| ArtifactError::Io {
            key: "manifest",
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let checksums: HashMap<String, String> =
            serde_json::from_slice(&bytes).map_err(|e| ArtifactError::Parse {
                key: "manifest",
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(Self { checksums })
    }

    fn expected(&self, path: &Path) -> Option<&str> {
        let name = path.file_name()?.to_str()?;
        self.checksums.get(name).map(|s| s.as_str())
    }
}

fn read_artifact(
    key: &'static str,
    path: &Path,
    manifest: Option<&Manifest>,
) -> Result<Vec<u8>, ArtifactError> {
    let bytes = std::fs::read(path).map_err(|e| ArtifactError::Io {
        key,
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    if let Some(expected) = manifest.and_then(|m| m.expected(path)) {
        let actual = compute_checksum(&bytes);
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(ArtifactError::ChecksumMismatch {
                key,
                expected: expected.to_string(),
                actual,
            });
        }
        debug!(key = %key, checksum = %actual, "Artifact checksum validated");
    }

    Ok(bytes)
}

/// Compute SHA256 checksum of data
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
