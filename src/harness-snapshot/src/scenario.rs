//! Scenario identification and lookup in Gherkin feature files.

use crate::tag::SnapshotTag;
use crate::{Result, SnapshotError};
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

static FEATURE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Feature:\s+(.*)$").expect("Invalid feature regex"));
static SCENARIO_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Scenario(?: Outline)?:\s+(.*)$").expect("Invalid scenario regex")
});

/// A scenario named by its feature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScenarioRef {
    pub feature: String,
    pub scenario: String,
}

impl ScenarioRef {
    pub fn new(feature: impl Into<String>, scenario: impl Into<String>) -> Self {
        Self {
            feature: feature.into(),
            scenario: scenario.into(),
        }
    }

    /// Tag under which this scenario's state is snapshotted.
    pub fn tag(&self) -> SnapshotTag {
        SnapshotTag::for_scenario(&self.feature, &self.scenario)
    }
}

impl fmt::Display for ScenarioRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.feature, self.scenario)
    }
}

/// How a scenario ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioOutcome {
    Passed,
    Failed,
}

impl ScenarioOutcome {
    pub fn from_passed(passed: bool) -> Self {
        if passed { Self::Passed } else { Self::Failed }
    }

    pub fn is_passed(self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// A feature and its scenario names, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub name: String,
    pub scenarios: Vec<String>,
}

/// The features declared in one feature file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureFile {
    pub path: PathBuf,
    pub features: Vec<Feature>,
}

impl FeatureFile {
    /// Read and index a feature file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SnapshotError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(path, &content))
    }

    /// Index `content` as the feature file at `path`.
    pub fn parse(path: impl Into<PathBuf>, content: &str) -> Self {
        let mut features: Vec<Feature> = Vec::new();

        for (number, line) in content.lines().enumerate() {
            let line = line.trim();
            if let Some(caps) = FEATURE_LINE.captures(line) {
                features.push(Feature {
                    name: caps[1].trim().to_string(),
                    scenarios: Vec::new(),
                });
            } else if let Some(caps) = SCENARIO_LINE.captures(line) {
                match features.last_mut() {
                    Some(feature) => feature.scenarios.push(caps[1].trim().to_string()),
                    None => debug!(line = number + 1, "ignoring scenario declared before any feature"),
                }
            }
        }

        Self {
            path: path.into(),
            features,
        }
    }

    /// Every scenario of the file, in order.
    pub fn scenarios(&self) -> impl Iterator<Item = ScenarioRef> + '_ {
        self.features.iter().flat_map(|feature| {
            feature
                .scenarios
                .iter()
                .map(move |scenario| ScenarioRef::new(&feature.name, scenario))
        })
    }

    /// Resolve a scenario by a regular expression on its name.
    ///
    /// Without a pattern, the first scenario of the file is returned. A
    /// pattern must match exactly one scenario across all features.
    pub fn find(&self, pattern: Option<&str>) -> Result<ScenarioRef> {
        let Some(pattern) = pattern else {
            return self.scenarios().next().ok_or_else(|| SnapshotError::NoScenarios {
                file: self.path.clone(),
            });
        };

        let rx = Regex::new(pattern).map_err(|source| SnapshotError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        let mut matches: Vec<ScenarioRef> = self
            .scenarios()
            .filter(|s| rx.is_match(&s.scenario))
            .collect();

        match matches.len() {
            0 => Err(SnapshotError::ScenarioNotFound {
                pattern: pattern.to_string(),
                file: self.path.clone(),
            }),
            1 => Ok(matches.remove(0)),
            _ => Err(SnapshotError::Ambiguous {
                pattern: pattern.to_string(),
                file: self.path.clone(),
                candidates: matches.iter().map(ToString::to_string).collect(),
            }),
        }
    }
}

/// Load `feature_file` and resolve a scenario in it.
pub fn find_scenario(feature_file: impl AsRef<Path>, pattern: Option<&str>) -> Result<ScenarioRef> {
    FeatureFile::load(feature_file)?.find(pattern)
}
