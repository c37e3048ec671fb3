//! Link graph builder
//!
//! Resolves crawled page links to node indices. Nodes are registered first,
//! then links are resolved against the complete URL table, so a link to a
//! page that appears later in the input is still kept.

use crate::types::Record;
use rustc_hash::FxHashMap;

/// A node in the graph builder
#[derive(Debug, Clone)]
pub struct BuilderNode {
    /// The page URL for this node
    pub url: String,
    /// Resolved link targets, in link order. Duplicates and self-links are kept.
    pub edges: Vec<u32>,
}

impl BuilderNode {
    /// Create a new node
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            edges: Vec::new(),
        }
    }
}

/// A mutable link graph under construction
#[derive(Debug, Default)]
pub struct GraphBuilder {
    /// Maps url -> node ID
    url_to_id: FxHashMap<String, u32>,
    /// Node storage, indexed by node ID
    nodes: Vec<BuilderNode>,
    /// Links whose target is not a known node
    dropped_links: usize,
}

impl GraphBuilder {
    /// Create a new empty graph builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a graph builder with pre-allocated capacity
    pub fn with_capacity(node_capacity: usize) -> Self {
        Self {
            url_to_id: FxHashMap::with_capacity_and_hasher(node_capacity, Default::default()),
            nodes: Vec::with_capacity(node_capacity),
            dropped_links: 0,
        }
    }

    /// Append a node for `url` and return its ID.
    ///
    /// IDs are handed out in call order. URLs are expected to be unique; a
    /// repeated URL still gets its own node, but lookups by URL resolve to
    /// the most recent one.
    ///
    /// # Panics
    ///
    /// Panics if the graph already holds `u32::MAX + 1` nodes.
    pub fn add_node(&mut self, url: &str) -> u32 {
        let id = node_id(self.nodes.len());
        if self.url_to_id.insert(url.to_string(), id).is_some() {
            #[cfg(feature = "tracing")]
            tracing::warn!(url, node = id, "duplicate url in record store");
        }
        self.nodes.push(BuilderNode::new(url));
        id
    }

    /// Add an edge from `from` to the node registered for `target`.
    ///
    /// Returns `false` and records nothing when `target` is not in the graph.
    pub fn add_link(&mut self, from: u32, target: &str) -> bool {
        let Some(&to) = self.url_to_id.get(target) else {
            self.dropped_links += 1;
            return false;
        };
        match self.nodes.get_mut(from as usize) {
            Some(node) => {
                node.edges.push(to);
                true
            }
            None => false,
        }
    }

    /// Build a graph from records, one node per record in input order.
    pub fn from_records(records: &[Record]) -> Self {
        let mut builder = Self::with_capacity(records.len());

        for record in records {
            builder.add_node(&record.url);
        }

        for (id, record) in records.iter().enumerate() {
            for link in &record.links {
                builder.add_link(node_id(id), link);
            }
        }

        builder
    }

    /// Get the number of nodes in the graph
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the total number of resolved edges
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum()
    }

    /// Number of links discarded because their target is outside the corpus
    pub fn dropped_links(&self) -> usize {
        self.dropped_links
    }

    /// Get a node by ID
    pub fn get_node(&self, id: u32) -> Option<&BuilderNode> {
        self.nodes.get(id as usize)
    }

    /// Get a node ID by url
    pub fn get_node_id(&self, url: &str) -> Option<u32> {
        self.url_to_id.get(url).copied()
    }

    /// Iterate over all nodes
    pub fn nodes(&self) -> impl Iterator<Item = (u32, &BuilderNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (i as u32, n))
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn url_table(&self) -> &FxHashMap<String, u32> {
        &self.url_to_id
    }
}

/// Node IDs are `u32`; a corpus past that size cannot be indexed.
fn node_id(index: usize) -> u32 {
    u32::try_from(index)
        .unwrap_or_else(|_| panic!("node index {index} exceeds the u32 id space"))
}
