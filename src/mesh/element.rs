use super::DecodeError;

/// Maximum number of node references a single mixed element can carry
pub const MAX_ELEMENT_NODES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The type tag leading each record of a mixed element buffer
pub enum ElementKind {
    /// tag `3`: a general polygon, one lead integer then five node slots. A 0 or -1
    /// in either of the last two slots is padding.
    Polygon,
    /// tag `4`: three node ids
    Triangle,
    /// tag `5`: four node ids
    Quadrilateral,
}

impl ElementKind {
    /// map a raw tag onto an element kind, `None` if the tag is not understood
    pub fn from_tag(tag: i64) -> Option<Self> {
        match tag {
            3 => Some(Self::Polygon),
            4 => Some(Self::Triangle),
            5 => Some(Self::Quadrilateral),
            _ => None,
        }
    }

    pub fn tag(&self) -> i64 {
        match self {
            Self::Polygon => 3,
            Self::Triangle => 4,
            Self::Quadrilateral => 5,
        }
    }

    /// total number of integers a record of this kind occupies, the tag included
    pub fn record_len(&self) -> usize {
        match self {
            Self::Polygon => 7,
            Self::Triangle => 4,
            Self::Quadrilateral => 5,
        }
    }

    /// number of integers between the tag and the first node id
    pub(crate) fn lead_len(&self) -> usize {
        match self {
            Self::Polygon => 1,
            Self::Triangle | Self::Quadrilateral => 0,
        }
    }

    /// number of node id slots in the record
    pub(crate) fn slots(&self) -> usize {
        self.record_len() - 1 - self.lead_len()
    }

    /// VTK cell type id used when exporting this element
    pub fn vtk_cell_type(&self) -> u8 {
        match self {
            Self::Polygon => 7,
            Self::Triangle => 5,
            Self::Quadrilateral => 9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A single decoded element: its kind and the ordered node ids that bound it.
///
/// Node ids live in a fixed capacity buffer and `len` says how many of them are
/// real. Padding never survives decoding, so there is no reserved node id.
pub struct ElementRecord {
    kind: ElementKind,
    nodes: [usize; MAX_ELEMENT_NODES],
    len: usize,
}

impl ElementRecord {
    /// build a record from a list of node ids. Fails if more than
    /// [`MAX_ELEMENT_NODES`] ids are given.
    pub fn new(kind: ElementKind, ids: &[usize]) -> Option<Self> {
        if ids.len() > MAX_ELEMENT_NODES {
            return None;
        }

        let mut nodes = [0; MAX_ELEMENT_NODES];
        nodes[..ids.len()].copy_from_slice(ids);

        Some(Self {
            kind,
            nodes,
            len: ids.len(),
        })
    }

    /// `len` must not exceed the slot count of `kind`
    pub(crate) fn from_parts(kind: ElementKind, nodes: [usize; MAX_ELEMENT_NODES], len: usize) -> Self {
        debug_assert!(len <= kind.slots());
        Self { kind, nodes, len }
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// the ordered node ids of this element. The order defines the ring winding.
    pub fn nodes(&self) -> &[usize] {
        &self.nodes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// ensure every node id of this record indexes into a table of `num_nodes` rows
    pub(crate) fn check_bounds(&self, element: usize, num_nodes: usize) -> Result<(), DecodeError> {
        match self.nodes().iter().find(|id| **id >= num_nodes) {
            Some(id) => Err(DecodeError::NodeOutOfRange {
                element,
                node: *id as i64,
                num_nodes,
            }),
            None => Ok(()),
        }
    }
}
