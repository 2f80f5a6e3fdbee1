//! The graph of projects, targets, and dependency edges for one invocation.

use crate::dependency::GraphDependency;
use crate::project::Project;
use crate::target::{Target, TargetReference};
use crate::workspace::Workspace;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Outgoing dependency edges keyed by the depending target.
pub type Dependencies = BTreeMap<TargetReference, BTreeSet<GraphDependency>>;

/// The full in-memory model of one invocation.
///
/// Targets live inside their [`Project`]; the per-project target map is the
/// project's ordered target list, so every referenced project path of a
/// target is a key of [`projects`](Self::projects) by construction.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Graph {
    /// Graph name, usually the workspace name.
    pub name: String,
    /// Root directory the graph was loaded from.
    pub path: PathBuf,
    /// The workspace that groups the projects.
    pub workspace: Workspace,
    /// Projects keyed by path. Shared so unchanged projects are not copied
    /// from one mapper stage to the next.
    #[serde(default)]
    pub projects: BTreeMap<PathBuf, Arc<Project>>,
    /// Outgoing edges of every target that has dependencies.
    #[serde(
        default,
        serialize_with = "serialize_dependencies",
        deserialize_with = "deserialize_dependencies"
    )]
    pub dependencies: Dependencies,
}

impl Graph {
    /// Creates an empty graph rooted at `path`.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let name = name.into();
        let path = path.into();
        Self {
            workspace: Workspace::new(path.clone(), name.clone()),
            name,
            path,
            projects: BTreeMap::new(),
            dependencies: BTreeMap::new(),
        }
    }

    /// Inserts (or replaces) a project and lists it in the workspace.
    pub fn with_project(mut self, project: Project) -> Self {
        if !self.workspace.projects.contains(&project.path) {
            self.workspace.projects.push(project.path.clone());
        }
        self.projects.insert(project.path.clone(), Arc::new(project));
        self
    }

    /// Adds a dependency edge from `from` to `to`.
    pub fn with_dependency(mut self, from: TargetReference, to: GraphDependency) -> Self {
        self.dependencies.entry(from).or_default().insert(to);
        self
    }

    /// Looks up a target by reference.
    pub fn target(&self, reference: &TargetReference) -> Option<&Target> {
        self.projects
            .get(&reference.project_path)?
            .target(&reference.name)
    }

    /// Iterates over every target with the path of the project defining it,
    /// project by project in path order, targets in declaration order.
    pub fn all_targets(&self) -> impl Iterator<Item = (&Path, &Target)> {
        self.projects
            .iter()
            .flat_map(|(path, project)| project.targets.iter().map(move |t| (path.as_path(), t)))
    }

    /// Iterates over the references of every target in the graph.
    pub fn target_references(&self) -> impl Iterator<Item = TargetReference> + '_ {
        self.all_targets()
            .map(|(path, target)| TargetReference::new(path, target.name.clone()))
    }

    /// Returns the sorted, de-duplicated names of every target in the graph.
    pub fn target_names(&self) -> Vec<String> {
        let names: BTreeSet<&str> = self.all_targets().map(|(_, t)| t.name.as_str()).collect();
        names.into_iter().map(str::to_string).collect()
    }

    /// Returns the per-project target map: project path to target name to target.
    pub fn targets(&self) -> BTreeMap<&Path, BTreeMap<&str, &Target>> {
        self.projects
            .iter()
            .map(|(path, project)| {
                let targets = project
                    .targets
                    .iter()
                    .map(|t| (t.name.as_str(), t))
                    .collect();
                (path.as_path(), targets)
            })
            .collect()
    }

    /// Outgoing edges of `reference`, empty when it has none.
    pub fn dependencies_of(&self, reference: &TargetReference) -> impl Iterator<Item = &GraphDependency> {
        self.dependencies.get(reference).into_iter().flatten()
    }
}

/// One serialized adjacency entry. JSON object keys must be strings, so the
/// dependency map is written as a list of entries instead.
#[derive(Serialize, Deserialize)]
struct DependencyEntry {
    from: TargetReference,
    to: BTreeSet<GraphDependency>,
}

fn serialize_dependencies<S: Serializer>(deps: &Dependencies, s: S) -> Result<S::Ok, S::Error> {
    s.collect_seq(deps.iter().map(|(from, to)| DependencyEntry {
        from: from.clone(),
        to: to.clone(),
    }))
}

fn deserialize_dependencies<'de, D: Deserializer<'de>>(d: D) -> Result<Dependencies, D::Error> {
    let entries = Vec::<DependencyEntry>::deserialize(d)?;
    Ok(entries.into_iter().map(|e| (e.from, e.to)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{Platform, Product};

    fn sample() -> Graph {
        let mut project = Project::new("/app", "App");
        project.targets = vec![
            Target::new("App", Product::App, Platform::Ios),
            Target::new("Core", Product::Framework, Platform::Ios),
        ];
        let mut other = Project::new("/libs", "Libs");
        other.targets = vec![Target::new("Core", Product::Framework, Platform::Ios)];
        Graph::new("App", "/app")
            .with_project(project)
            .with_project(other)
            .with_dependency(
                TargetReference::new("/app", "App"),
                GraphDependency::target("Core", "/app"),
            )
    }

    #[test]
    fn with_project_registers_in_workspace_once() {
        let graph = sample().with_project(Project::new("/app", "App"));
        assert_eq!(
            graph.workspace.projects,
            vec![PathBuf::from("/app"), PathBuf::from("/libs")]
        );
    }

    #[test]
    fn lookup_by_reference() {
        let graph = sample();
        let core = graph.target(&TargetReference::new("/libs", "Core")).unwrap();
        assert_eq!(core.name, "Core");
        assert!(graph.target(&TargetReference::new("/libs", "App")).is_none());
        assert!(graph.target(&TargetReference::new("/nope", "App")).is_none());
    }

    #[test]
    fn target_names_are_sorted_and_unique() {
        assert_eq!(sample().target_names(), vec!["App", "Core"]);
    }

    #[test]
    fn all_targets_preserves_declaration_order() {
        let graph = sample();
        let names: Vec<&str> = graph
            .all_targets()
            .filter(|(path, _)| *path == Path::new("/app"))
            .map(|(_, t)| t.name.as_str())
            .collect();
        assert_eq!(names, vec!["App", "Core"]);
    }

    #[test]
    fn targets_map_keys_match_projects() {
        let graph = sample();
        let targets = graph.targets();
        assert_eq!(targets.len(), 2);
        assert!(targets[Path::new("/app")].contains_key("App"));
        assert!(targets[Path::new("/libs")].contains_key("Core"));
    }

    #[test]
    fn dependencies_of_missing_is_empty() {
        let graph = sample();
        assert_eq!(
            graph
                .dependencies_of(&TargetReference::new("/app", "Core"))
                .count(),
            0
        );
        assert_eq!(
            graph
                .dependencies_of(&TargetReference::new("/app", "App"))
                .count(),
            1
        );
    }

    #[test]
    fn serde_roundtrip() {
        let graph = sample();
        let json = serde_json::to_string(&graph).unwrap();
        let back: Graph = serde_json::from_str(&json).unwrap();
        assert_eq!(graph, back);
    }
}
