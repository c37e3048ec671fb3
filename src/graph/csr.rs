//! Compressed Sparse Row (CSR) link graph
//!
//! CSR is optimized for iteration over neighbors, which is exactly what
//! PageRank needs during power iteration. The transpose is stored alongside
//! so the solver can also pull contributions per target.

use super::builder::GraphBuilder;
use crate::types::Record;
use rustc_hash::FxHashMap;

/// An immutable directed link graph in Compressed Sparse Row format
///
/// Node `i` is the `i`-th record of the store it was built from. Out-degree
/// and the dangling set are fixed at construction and never recomputed.
#[derive(Debug, Clone)]
pub struct LinkGraph {
    /// Number of nodes
    pub num_nodes: usize,
    /// Row pointers: node i's out-edges are at indices row_ptr[i]..row_ptr[i+1]
    pub row_ptr: Vec<usize>,
    /// Column indices (target nodes) for each out-edge
    pub col_idx: Vec<u32>,
    /// Transposed row pointers: node j's in-edges are at in_ptr[j]..in_ptr[j+1]
    pub in_ptr: Vec<usize>,
    /// Source nodes for each in-edge, ascending per target
    pub in_idx: Vec<u32>,
    /// Out-degree for each node
    pub out_degree: Vec<u32>,
    /// Nodes with no out-edges, ascending
    dangling: Vec<u32>,
    /// URL for each node
    urls: Vec<String>,
    url_to_index: FxHashMap<String, u32>,
}

impl LinkGraph {
    /// Convert a GraphBuilder into CSR format
    pub fn from_builder(builder: &GraphBuilder) -> Self {
        let num_nodes = builder.node_count();
        let mut row_ptr = Vec::with_capacity(num_nodes + 1);
        let mut col_idx = Vec::with_capacity(builder.edge_count());
        let mut out_degree = Vec::with_capacity(num_nodes);
        let mut urls = Vec::with_capacity(num_nodes);

        row_ptr.push(0);

        for (_, node) in builder.nodes() {
            urls.push(node.url.clone());
            out_degree.push(node.edges.len() as u32);
            col_idx.extend_from_slice(&node.edges);
            row_ptr.push(col_idx.len());
        }

        let (in_ptr, in_idx) = transpose(num_nodes, &row_ptr, &col_idx);

        let dangling = (0..num_nodes as u32)
            .filter(|&n| out_degree[n as usize] == 0)
            .collect();

        Self {
            num_nodes,
            row_ptr,
            col_idx,
            in_ptr,
            in_idx,
            out_degree,
            dangling,
            urls,
            url_to_index: builder.url_table().clone(),
        }
    }

    /// Build the graph for a record store in one step
    pub fn from_records(records: &[Record]) -> Self {
        Self::from_builder(&GraphBuilder::from_records(records))
    }

    /// Out-neighbors of a node, in link order
    pub fn neighbors(&self, node: u32) -> &[u32] {
        let start = self.row_ptr[node as usize];
        let end = self.row_ptr[node as usize + 1];
        &self.col_idx[start..end]
    }

    /// In-neighbors of a node, ascending by source
    pub fn in_neighbors(&self, node: u32) -> &[u32] {
        let start = self.in_ptr[node as usize];
        let end = self.in_ptr[node as usize + 1];
        &self.in_idx[start..end]
    }

    /// Get the out-degree of a node
    pub fn degree(&self, node: u32) -> u32 {
        self.out_degree[node as usize]
    }

    /// Nodes with no outgoing edges
    pub fn dangling_nodes(&self) -> &[u32] {
        &self.dangling
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.num_nodes == 0
    }

    /// Get the total number of intra-corpus edges
    pub fn num_edges(&self) -> usize {
        self.col_idx.len()
    }

    /// Get the URL for a node
    pub fn url(&self, node: u32) -> &str {
        &self.urls[node as usize]
    }

    /// Get the node index for a URL
    pub fn index_of(&self, url: &str) -> Option<u32> {
        self.url_to_index.get(url).copied()
    }

    pub fn url_to_index(&self) -> &FxHashMap<String, u32> {
        &self.url_to_index
    }
}

impl Default for LinkGraph {
    fn default() -> Self {
        Self {
            num_nodes: 0,
            row_ptr: vec![0],
            col_idx: Vec::new(),
            in_ptr: vec![0],
            in_idx: Vec::new(),
            out_degree: Vec::new(),
            dangling: Vec::new(),
            urls: Vec::new(),
            url_to_index: FxHashMap::default(),
        }
    }
}

/// Counting-sort the out-edge CSR into an in-edge CSR.
///
/// Sources are visited in ascending order, so each target's in-edge list is
/// sorted by source.
fn transpose(num_nodes: usize, row_ptr: &[usize], col_idx: &[u32]) -> (Vec<usize>, Vec<u32>) {
    let mut in_ptr = vec![0usize; num_nodes + 1];
    for &target in col_idx {
        in_ptr[target as usize + 1] += 1;
    }
    for i in 0..num_nodes {
        in_ptr[i + 1] += in_ptr[i];
    }

    let mut cursor = in_ptr.clone();
    let mut in_idx = vec![0u32; col_idx.len()];
    for source in 0..num_nodes {
        for &target in &col_idx[row_ptr[source]..row_ptr[source + 1]] {
            let slot = &mut cursor[target as usize];
            in_idx[*slot] = source as u32;
            *slot += 1;
        }
    }

    (in_ptr, in_idx)
}
