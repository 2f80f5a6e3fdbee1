//! In-memory collaborator doubles for mapper tests.

use crate::collaborators::{
    CacheCategory, CacheDirectoriesProvider, CacheStorage, CacheSubstitution, ContentHasher,
    ContentHashes, FileExistence, GraphMutator, HashRequest,
};
use crate::error::CollaboratorError;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use strata_graph::{Graph, TargetReference};

type HashStub = Box<dyn Fn(&Graph, &HashRequest) -> Result<ContentHashes, CollaboratorError> + Send + Sync>;

/// Hasher that returns each target's name as its hash unless stubbed.
pub struct MockContentHasher {
    stub: HashStub,
    pub requests: Mutex<Vec<HashRequest>>,
}

impl MockContentHasher {
    pub fn names_as_hashes() -> Self {
        Self::with_stub(|graph, request| {
            Ok(graph
                .target_references()
                .filter(|r| request.includes(r))
                .map(|r| {
                    let hash = r.name.clone();
                    (r, hash)
                })
                .collect())
        })
    }

    pub fn with_stub(
        stub: impl Fn(&Graph, &HashRequest) -> Result<ContentHashes, CollaboratorError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            stub: Box::new(stub),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl ContentHasher for MockContentHasher {
    fn content_hashes(
        &self,
        graph: &Graph,
        request: &HashRequest,
    ) -> Result<ContentHashes, CollaboratorError> {
        self.requests.lock().unwrap().push(request.clone());
        (self.stub)(graph, request)
    }
}

/// Storage backed by a map of `(name, hash)` to fetch results.
#[derive(Default)]
pub struct MockCacheStorage {
    pub artifacts: BTreeMap<(String, String), Result<PathBuf, CollaboratorError>>,
    pub exists_calls: Mutex<Vec<(String, String)>>,
    pub fetch_calls: Mutex<Vec<(String, String)>>,
}

impl MockCacheStorage {
    pub fn with_artifact(mut self, name: &str, hash: &str, path: &str) -> Self {
        self.artifacts
            .insert((name.to_string(), hash.to_string()), Ok(PathBuf::from(path)));
        self
    }

    pub fn with_failing_fetch(mut self, name: &str, hash: &str, message: &str) -> Self {
        self.artifacts.insert(
            (name.to_string(), hash.to_string()),
            Err(CollaboratorError::new(message)),
        );
        self
    }

    pub fn calls_made(&self) -> usize {
        self.exists_calls.lock().unwrap().len() + self.fetch_calls.lock().unwrap().len()
    }
}

impl CacheStorage for MockCacheStorage {
    fn exists(&self, name: &str, hash: &str) -> Result<bool, CollaboratorError> {
        let key = (name.to_string(), hash.to_string());
        self.exists_calls.lock().unwrap().push(key.clone());
        Ok(self.artifacts.contains_key(&key))
    }

    fn fetch(&self, name: &str, hash: &str) -> Result<PathBuf, CollaboratorError> {
        let key = (name.to_string(), hash.to_string());
        self.fetch_calls.lock().unwrap().push(key.clone());
        self.artifacts
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Err(CollaboratorError::new(format!("no artifact for {name}"))))
    }
}

/// Mutator that records its input and prunes every substituted target.
#[derive(Default)]
pub struct MockGraphMutator {
    pub received: Mutex<Vec<BTreeMap<TargetReference, PathBuf>>>,
    pub received_sources: Mutex<Vec<BTreeSet<String>>>,
    pub received_pruned: Mutex<Vec<BTreeSet<TargetReference>>>,
}

impl GraphMutator for MockGraphMutator {
    fn apply(
        &self,
        graph: Graph,
        substitutions: &BTreeMap<TargetReference, PathBuf>,
        sources: &BTreeSet<String>,
        pruned: &BTreeSet<TargetReference>,
    ) -> Result<CacheSubstitution, CollaboratorError> {
        self.received.lock().unwrap().push(substitutions.clone());
        self.received_sources.lock().unwrap().push(sources.clone());
        self.received_pruned.lock().unwrap().push(pruned.clone());
        Ok(CacheSubstitution {
            graph,
            pruned: substitutions.keys().cloned().collect(),
        })
    }
}

/// Fixed cache layout under a root directory.
pub struct MockCacheDirectories {
    pub root: PathBuf,
}

impl CacheDirectoriesProvider for MockCacheDirectories {
    fn cache_directory(&self, category: CacheCategory) -> PathBuf {
        match category {
            CacheCategory::Tests => self.root.join("tests"),
            CacheCategory::Hashes => self.root.join("hashes"),
            CacheCategory::Binaries => self.root.join("binaries"),
        }
    }
}

/// A fake filesystem that only knows the paths it was given.
#[derive(Default)]
pub struct MockFileSystem {
    pub existing: BTreeSet<PathBuf>,
}

impl MockFileSystem {
    pub fn touch(mut self, path: impl Into<PathBuf>) -> Self {
        self.existing.insert(path.into());
        self
    }
}

impl FileExistence for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.existing.contains(path)
    }
}
