/// Failures while decoding a mixed element connectivity buffer.
///
/// Every variant is fatal: decoding stops at the first one and no partial
/// list of polygons is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("element {element} at buffer offset {offset} has unrecognized type tag {tag} (expected 3, 4, or 5)")]
    MalformedTag {
        element: usize,
        tag: i64,
        offset: usize,
    },
    #[error("element {element} with tag {tag} needs {needed} integers but only {remaining} remain in the connectivity buffer")]
    BufferUnderrun {
        element: usize,
        tag: i64,
        needed: usize,
        remaining: usize,
    },
    #[error("connectivity buffer ended before element {element} of {num_elems} could be read")]
    Exhausted { element: usize, num_elems: usize },
    #[error("element {element} references node {node}, but the node table only has {num_nodes} rows")]
    NodeOutOfRange {
        element: usize,
        node: i64,
        num_nodes: usize,
    },
    #[error("element {element} references negative node id {node}")]
    NegativeNode { element: usize, node: i64 },
    #[error("decoding consumed {consumed} integers of a {len} integer connectivity buffer")]
    TrailingData { consumed: usize, len: usize },
    #[error("node table must have 2 or 3 coordinate columns, found {columns}")]
    NodeDimension { columns: usize },
}
