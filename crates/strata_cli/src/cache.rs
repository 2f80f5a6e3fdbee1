//! `strata cache print-hashes`: prints the cache key of every target.

use std::io::Write;

use strata_cache::XxhContentHasher;
use strata_graph::Graph;
use strata_mapper::HashRequest;

use crate::pipeline::{load_graph, ProjectContext};
use crate::GlobalArgs;

/// Runs `strata cache print-hashes`.
///
/// Hashes are computed for the configured profile and output type, so they
/// match the keys `strata build` looks up.
pub fn print_hashes(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let context = ProjectContext::load(global)?;
    let graph = load_graph(&context.graph_path(global))?;
    let request = HashRequest::default()
        .with_profile(context.config.cache_profile()?)
        .with_output_type(context.config.cache.output_type);

    let stdout = std::io::stdout();
    write_hashes(&mut stdout.lock(), &graph, &request)?;
    Ok(0)
}

/// Writes one `name hash` line per target, in graph order.
fn write_hashes(
    out: &mut impl Write,
    graph: &Graph,
    request: &HashRequest,
) -> Result<(), Box<dyn std::error::Error>> {
    let hashes = XxhContentHasher::new().hash_graph(graph, request)?;
    for reference in graph.target_references() {
        if let Some(hash) = hashes.get(&reference) {
            writeln!(out, "{} {hash}", reference.name)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fixtures;
    use strata_mapper::CacheProfile;

    fn lines(request: &HashRequest) -> Vec<String> {
        let mut out = Vec::new();
        write_hashes(&mut out, &fixtures::graph(), request).unwrap();
        String::from_utf8(out).unwrap().lines().map(String::from).collect()
    }

    #[test]
    fn one_line_per_target() {
        let lines = lines(&HashRequest::default());
        let names: Vec<&str> = lines
            .iter()
            .map(|l| l.split_once(' ').unwrap().0)
            .collect();
        assert_eq!(names, vec!["App", "Core", "Utils", "CoreTests", "Extra"]);
        assert!(lines.iter().all(|l| l.split_once(' ').unwrap().1.len() == 32));
    }

    #[test]
    fn profile_changes_every_hash() {
        let plain = lines(&HashRequest::default());
        let profiled = lines(&HashRequest::default().with_profile(CacheProfile::development()));
        assert!(plain.iter().zip(&profiled).all(|(a, b)| a != b));
    }

    #[test]
    fn print_hashes_loads_the_project() {
        let tmp = tempfile::TempDir::new().unwrap();
        let global = fixtures::project_dir(tmp.path());
        assert_eq!(print_hashes(&global).unwrap(), 0);
    }
}
