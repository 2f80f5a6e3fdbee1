//! Content hashing of graph targets.
//!
//! A target's hash covers its own identity (name, product, platform), the
//! cache profile and output type it is built for, and the hashes of
//! everything it depends on. Dependencies are hashed first and memoized,
//! so a change in any transitive dependency changes every dependent hash.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use strata_graph::{Graph, GraphDependency, TargetReference};
use strata_mapper::{CollaboratorError, ContentHasher, ContentHashes, HashRequest};

use crate::error::CacheError;
use crate::hash::ContentHash;

/// XXH3-128 implementation of [`ContentHasher`].
#[derive(Clone, Copy, Debug, Default)]
pub struct XxhContentHasher;

impl XxhContentHasher {
    /// Creates a hasher.
    pub fn new() -> Self {
        Self
    }

    /// Hashes every target selected by `request`.
    ///
    /// Targets excluded by the request are still hashed when something
    /// selected depends on them; they are only left out of the result.
    pub fn hash_graph(
        &self,
        graph: &Graph,
        request: &HashRequest,
    ) -> Result<BTreeMap<TargetReference, ContentHash>, CacheError> {
        let mut state = HashState::new(graph, request)?;
        let mut hashes = BTreeMap::new();
        for reference in graph.target_references() {
            if request.includes(&reference) {
                let hash = state.hash_target(&reference)?;
                hashes.insert(reference, hash);
            }
        }
        Ok(hashes)
    }
}

impl ContentHasher for XxhContentHasher {
    fn content_hashes(
        &self,
        graph: &Graph,
        request: &HashRequest,
    ) -> Result<ContentHashes, CollaboratorError> {
        let hashes = self.hash_graph(graph, request)?;
        Ok(hashes
            .into_iter()
            .map(|(reference, hash)| (reference, hash.to_string()))
            .collect())
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, CacheError> {
    serde_json::to_string(value).map_err(|e| CacheError::Serialization {
        reason: e.to_string(),
    })
}

struct HashState<'a> {
    graph: &'a Graph,
    /// Profile and output type fields mixed into every hash.
    variant: Vec<String>,
    memo: BTreeMap<TargetReference, ContentHash>,
    visiting: BTreeSet<TargetReference>,
}

impl<'a> HashState<'a> {
    fn new(graph: &'a Graph, request: &HashRequest) -> Result<Self, CacheError> {
        let mut variant = Vec::new();
        if let Some(profile) = &request.profile {
            variant.push(profile.name.clone());
            variant.push(profile.configuration.clone());
            variant.push(to_json(&profile.platforms)?);
        }
        if let Some(output_type) = request.output_type {
            variant.push(output_type.to_string());
        }
        Ok(Self {
            graph,
            variant,
            memo: BTreeMap::new(),
            visiting: BTreeSet::new(),
        })
    }

    fn hash_target(&mut self, reference: &TargetReference) -> Result<ContentHash, CacheError> {
        if let Some(hash) = self.memo.get(reference) {
            return Ok(*hash);
        }
        if !self.visiting.insert(reference.clone()) {
            return Err(CacheError::DependencyCycle {
                target: reference.to_string(),
            });
        }

        let graph = self.graph;
        let mut fields = vec![reference.name.clone()];
        if let Some(target) = graph.target(reference) {
            fields.push(to_json(&target.product)?);
            fields.push(to_json(&target.platform)?);
        }
        fields.extend(self.variant.iter().cloned());

        let edges: Vec<&GraphDependency> = graph.dependencies_of(reference).collect();
        let mut dependency_fields = Vec::with_capacity(edges.len());
        for edge in edges {
            let field = match edge.target_reference() {
                Some(dependency) if graph.target(&dependency).is_some() => {
                    self.hash_target(&dependency)?.to_string()
                }
                _ => to_json(edge)?,
            };
            dependency_fields.push(field);
        }
        dependency_fields.sort();
        fields.extend(dependency_fields);

        let hash = ContentHash::from_fields(&fields);
        self.visiting.remove(reference);
        self.memo.insert(reference.clone(), hash);
        Ok(hash)
    }
}
