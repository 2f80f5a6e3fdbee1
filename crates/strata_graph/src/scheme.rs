//! Schemes: named build/test/run configurations that reference targets.

use crate::target::TargetReference;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A named collection of actions over targets.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Scheme {
    /// Scheme name.
    pub name: String,
    /// Targets built by the scheme.
    #[serde(default)]
    pub build_action: Option<BuildAction>,
    /// Targets tested by the scheme.
    #[serde(default)]
    pub test_action: Option<TestAction>,
    /// What the scheme runs.
    #[serde(default)]
    pub run_action: Option<RunAction>,
}

impl Scheme {
    /// Creates a scheme with no actions.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            build_action: None,
            test_action: None,
            run_action: None,
        }
    }

    /// Sets the build action.
    pub fn with_build_action(mut self, action: BuildAction) -> Self {
        self.build_action = Some(action);
        self
    }

    /// Sets the test action.
    pub fn with_test_action(mut self, action: TestAction) -> Self {
        self.test_action = Some(action);
        self
    }

    /// Sets the run action.
    pub fn with_run_action(mut self, action: RunAction) -> Self {
        self.run_action = Some(action);
        self
    }

    /// Build targets, or an empty slice when there is no build action.
    pub fn build_targets(&self) -> &[TargetReference] {
        self.build_action
            .as_ref()
            .map(|a| a.targets.as_slice())
            .unwrap_or(&[])
    }

    /// Targets under test, or an empty slice when there is no test action.
    pub fn test_targets(&self) -> &[TestableTarget] {
        self.test_action
            .as_ref()
            .map(|a| a.targets.as_slice())
            .unwrap_or(&[])
    }

    /// Test plans, or an empty slice when there is no test action.
    pub fn test_plans(&self) -> &[TestPlan] {
        self.test_action
            .as_ref()
            .map(|a| a.test_plans.as_slice())
            .unwrap_or(&[])
    }

    /// Every target reference the scheme's build and test actions name,
    /// including coverage targets. May contain duplicates.
    pub fn referenced_targets(&self) -> impl Iterator<Item = &TargetReference> {
        let build = self.build_targets().iter();
        let tests = self.test_targets().iter().map(|t| &t.target);
        let coverage = self
            .test_action
            .iter()
            .flat_map(|a| a.code_coverage_targets.iter());
        build.chain(tests).chain(coverage)
    }

    /// Keeps only the references accepted by `keep` in the build targets,
    /// test targets, and coverage targets. Every other field is untouched.
    pub fn retain_targets(&mut self, mut keep: impl FnMut(&TargetReference) -> bool) {
        if let Some(build) = self.build_action.as_mut() {
            build.targets.retain(|t| keep(t));
        }
        if let Some(test) = self.test_action.as_mut() {
            test.targets.retain(|t| keep(&t.target));
            test.code_coverage_targets.retain(|t| keep(t));
        }
    }
}

/// The build action of a scheme.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct BuildAction {
    /// Targets to build, in order.
    #[serde(default)]
    pub targets: Vec<TargetReference>,
}

impl BuildAction {
    /// Creates a build action over `targets`.
    pub fn new(targets: Vec<TargetReference>) -> Self {
        Self { targets }
    }
}

/// A target referenced by a test action.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct TestableTarget {
    /// The test target.
    pub target: TargetReference,
    /// Whether the target is skipped by default.
    #[serde(default)]
    pub skipped: bool,
}

impl TestableTarget {
    /// Wraps a reference as a non-skipped testable target.
    pub fn new(target: TargetReference) -> Self {
        Self {
            target,
            skipped: false,
        }
    }
}

/// A test plan file attached to a test action.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct TestPlan {
    /// Path to the test plan file.
    pub path: PathBuf,
    /// Targets the plan runs.
    #[serde(default)]
    pub test_targets: Vec<TestableTarget>,
    /// Whether this is the default plan of the scheme.
    #[serde(default)]
    pub is_default: bool,
}

/// The test action of a scheme.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct TestAction {
    /// Test bundles to run, in order.
    #[serde(default)]
    pub targets: Vec<TestableTarget>,
    /// Test plans; a scheme with plans is meaningful even without targets.
    #[serde(default)]
    pub test_plans: Vec<TestPlan>,
    /// Whether code coverage is gathered.
    #[serde(default)]
    pub coverage: bool,
    /// Targets coverage is gathered for.
    #[serde(default)]
    pub code_coverage_targets: Vec<TargetReference>,
    /// Target whose build settings are used to expand variables.
    #[serde(default)]
    pub expand_variable_from_target: Option<TargetReference>,
}

impl TestAction {
    /// Creates a test action over `targets` with no plans and no coverage.
    pub fn new(targets: Vec<TestableTarget>) -> Self {
        Self {
            targets,
            ..Self::default()
        }
    }
}

/// The run action of a scheme.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct RunAction {
    /// The target that is launched.
    #[serde(default)]
    pub executable: Option<TargetReference>,
    /// An executable launched by path instead of a target.
    #[serde(default)]
    pub file_path: Option<PathBuf>,
    /// Target whose build settings are used to expand variables.
    #[serde(default)]
    pub expand_variable_from_target: Option<TargetReference>,
}
