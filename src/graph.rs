//! Incremental topic/repository graph building.
//!
//! The explorer keeps one in-memory `TopicGraph` per server: nodes are
//! topics and repositories, edges connect a repo to a topic it carries.
//! The store is deduplicated and append-only between seeds; a fresh seed
//! clears it completely. All layout and drawing happen client-side in D3,
//! which only ever sees full snapshots.

use crate::models::{
    repo_id, topic_id, GraphEdge, GraphNode, GraphSnapshot, GraphStats, NodeKind, RepoRecord,
};
use std::collections::{HashMap, HashSet};

// ============================================================================
// Graph Store
// ============================================================================

/// Deduplicated node/edge store with insertion order preserved.
#[derive(Debug, Default)]
pub struct TopicGraph {
    nodes: Vec<GraphNode>,
    index: HashMap<String, usize>,
    edges: Vec<GraphEdge>,
    edge_keys: HashSet<String>,
}

fn edge_key(source: &str, target: &str) -> String {
    format!("{}->{}", source, target)
}

impl TopicGraph {
    pub fn new() -> Self {
        TopicGraph::default()
    }

    /// Insert a node if its id is not already present. Later additions with
    /// the same id are no-ops; the first write wins. Returns the stored node.
    pub fn add_node(&mut self, node: GraphNode) -> &GraphNode {
        if let Some(&i) = self.index.get(&node.id) {
            return &self.nodes[i];
        }
        let i = self.nodes.len();
        self.index.insert(node.id.clone(), i);
        self.nodes.push(node);
        &self.nodes[i]
    }

    /// Insert the edge `source -> target` unless the same ordered pair was
    /// already seen. Both endpoints must exist in the node store; an edge to
    /// a missing endpoint is dropped. Returns whether an edge was inserted.
    pub fn add_edge(&mut self, source: &str, target: &str) -> bool {
        if !self.index.contains_key(source) || !self.index.contains_key(target) {
            return false;
        }
        let key = edge_key(source, target);
        if self.edge_keys.contains(&key) {
            return false;
        }
        self.edge_keys.insert(key);
        self.edges.push(GraphEdge {
            source: source.to_string(),
            target: target.to_string(),
        });
        true
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.edges.clear();
        self.edge_keys.clear();
    }

    pub fn get(&self, id: &str) -> Option<&GraphNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn stats(&self) -> GraphStats {
        let topic_count = self
            .nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Topic)
            .count();
        GraphStats {
            topic_count,
            repo_count: self.nodes.len() - topic_count,
            edge_count: self.edges.len(),
        }
    }

    /// Full copy for the renderer. Re-rendering from a snapshot is
    /// idempotent; the client rebuilds the SVG from scratch each time.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            stats: self.stats(),
        }
    }
}

// ============================================================================
// Explorer Controller
// ============================================================================

/// Counts from one merge pass, used for status messages and invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Repo nodes that did not exist before this merge.
    pub new_nodes: usize,
    /// Edges inserted by this merge (includes edges linking pre-existing
    /// repos to a newly expanded topic).
    pub new_edges: usize,
}

/// Owns the graph and applies seed/expand semantics. One per application,
/// held behind the state mutex; never a process-wide singleton.
#[derive(Debug, Default)]
pub struct Explorer {
    graph: TopicGraph,
}

impl Explorer {
    pub fn new() -> Self {
        Explorer::default()
    }

    pub fn graph(&self) -> &TopicGraph {
        &self.graph
    }

    /// Start a fresh exploration: drop everything, insert the base topic
    /// node, and return its id.
    pub fn seed(&mut self, topic: &str) -> String {
        self.graph.clear();
        self.graph.add_node(GraphNode::topic(topic));
        topic_id(topic)
    }

    /// Merge search results under a topic. The topic node is created if the
    /// graph does not have it yet (first expansion of a topic discovered via
    /// some repo). Already-known repos are not duplicated, but a missing
    /// edge to this topic is still added.
    pub fn merge_repos(&mut self, topic: &str, repos: &[RepoRecord]) -> MergeOutcome {
        let tid = topic_id(topic);
        self.graph.add_node(GraphNode::topic(topic));

        let mut outcome = MergeOutcome {
            new_nodes: 0,
            new_edges: 0,
        };
        for record in repos {
            let rid = repo_id(&record.full_name);
            if !self.graph.contains_node(&rid) {
                outcome.new_nodes += 1;
            }
            self.graph.add_node(GraphNode::repo(record));
            if self.graph.add_edge(&rid, &tid) {
                outcome.new_edges += 1;
            }
        }
        outcome
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(full_name: &str) -> RepoRecord {
        RepoRecord {
            full_name: full_name.to_string(),
            html_url: format!("https://github.com/{}", full_name),
            description: None,
            stargazers_count: None,
        }
    }

    fn records(names: &[&str]) -> Vec<RepoRecord> {
        names.iter().map(|n| record(n)).collect()
    }

    #[test]
    fn test_add_node_first_write_wins() {
        let mut graph = TopicGraph::new();
        graph.add_node(GraphNode {
            id: "repo:a/b".into(),
            kind: NodeKind::Repo,
            label: "a/b".into(),
            url: Some("https://github.com/a/b".into()),
        });
        graph.add_node(GraphNode {
            id: "repo:a/b".into(),
            kind: NodeKind::Repo,
            label: "overwritten?".into(),
            url: None,
        });

        assert_eq!(graph.node_count(), 1);
        let stored = graph.get("repo:a/b").unwrap();
        assert_eq!(stored.label, "a/b");
        assert_eq!(stored.url.as_deref(), Some("https://github.com/a/b"));
    }

    #[test]
    fn test_add_edge_deduplicates_ordered_pair() {
        let mut graph = TopicGraph::new();
        graph.add_node(GraphNode::topic("rust"));
        graph.add_node(GraphNode::repo(&record("a/b")));

        assert!(graph.add_edge("repo:a/b", "topic:rust"));
        assert!(!graph.add_edge("repo:a/b", "topic:rust"));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_add_edge_requires_existing_endpoints() {
        let mut graph = TopicGraph::new();
        graph.add_node(GraphNode::topic("rust"));

        assert!(!graph.add_edge("repo:ghost/ship", "topic:rust"));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_seed_fully_clears_prior_state() {
        let mut explorer = Explorer::new();
        explorer.seed("threejs");
        explorer.merge_repos("threejs", &records(&["mrdoob/three.js", "pmndrs/drei"]));
        assert_eq!(explorer.graph().node_count(), 3);

        explorer.seed("webgl");
        assert_eq!(explorer.graph().node_count(), 1);
        assert_eq!(explorer.graph().edge_count(), 0);
        assert!(explorer.graph().contains_node("topic:webgl"));
        assert!(!explorer.graph().contains_node("topic:threejs"));
    }

    #[test]
    fn test_seed_scenario_one_topic_plus_limited_repos() {
        let mut explorer = Explorer::new();
        explorer.seed("threejs");
        let names: Vec<String> = (0..50).map(|i| format!("owner{}/repo{}", i, i)).collect();
        let repos: Vec<RepoRecord> = names.iter().map(|n| record(n)).collect();
        let outcome = explorer.merge_repos("threejs", &repos);

        assert_eq!(outcome.new_nodes, 50);
        assert_eq!(outcome.new_edges, 50);
        let stats = explorer.graph().stats();
        assert_eq!(stats.topic_count, 1);
        assert_eq!(stats.repo_count, 50);
        assert_eq!(stats.edge_count, 50);
    }

    #[test]
    fn test_expand_merges_without_duplicating_known_repos() {
        let mut explorer = Explorer::new();
        explorer.seed("threejs");
        explorer.merge_repos(
            "threejs",
            &records(&["a/one", "b/two", "c/three", "d/four", "e/five"]),
        );

        // 30 results for a second topic, 5 of which are already known.
        let mut names: Vec<String> = vec![
            "a/one".into(),
            "b/two".into(),
            "c/three".into(),
            "d/four".into(),
            "e/five".into(),
        ];
        for i in 0..25 {
            names.push(format!("new{}/repo{}", i, i));
        }
        let repos: Vec<RepoRecord> = names.iter().map(|n| record(n)).collect();
        let outcome = explorer.merge_repos("graphics", &repos);

        assert_eq!(outcome.new_nodes, 25);
        assert_eq!(outcome.new_edges, 30);
        let stats = explorer.graph().stats();
        assert_eq!(stats.topic_count, 2);
        assert_eq!(stats.repo_count, 30);
        assert_eq!(stats.edge_count, 35);
    }

    #[test]
    fn test_merge_is_monotonic() {
        let mut explorer = Explorer::new();
        explorer.seed("rust");
        let mut prev_nodes = explorer.graph().node_count();
        let mut prev_edges = explorer.graph().edge_count();

        for batch in [
            records(&["a/one", "b/two"]),
            records(&["b/two", "c/three"]),
            records(&[]),
            records(&["a/one"]),
        ] {
            explorer.merge_repos("rust", &batch);
            assert!(explorer.graph().node_count() >= prev_nodes);
            assert!(explorer.graph().edge_count() >= prev_edges);
            prev_nodes = explorer.graph().node_count();
            prev_edges = explorer.graph().edge_count();
        }
    }

    #[test]
    fn test_snapshot_preserves_insertion_order() {
        let mut explorer = Explorer::new();
        explorer.seed("rust");
        explorer.merge_repos("rust", &records(&["z/last-starred", "a/first"]));

        let snapshot = explorer.graph().snapshot();
        let ids: Vec<&str> = snapshot.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["topic:rust", "repo:z/last-starred", "repo:a/first"]);
    }
}
