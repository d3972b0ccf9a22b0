//! decoding of flat, type tagged connectivity buffers
//!
//! A mixed element buffer stores its elements back to back, each record led by
//! a type tag:
//!
//! ```text
//! 3 x a b c d e    polygon: one unused lead integer, then five node slots
//! 4 a b c          triangle
//! 5 a b c d        quadrilateral
//! ```
//!
//! The number of records is not encoded in the buffer. It is taken from the
//! length of the element map and is authoritative: exactly that many records
//! are read, and the buffer must be used up by them.

use super::element::{ElementKind, ElementRecord, MAX_ELEMENT_NODES};
use super::polygon::{Point, Polygon};
use super::DecodeError;

use ndarray::ArrayView2;

/// Decode `num_elems` records from a mixed element connectivity buffer.
///
/// Records are returned in buffer order. Node ids are not checked against a
/// node table here, see [`mesh_polygons`] for that.
pub fn decode_mixed_elements(
    buffer: &[i64],
    num_elems: usize,
) -> Result<Vec<ElementRecord>, DecodeError> {
    let mut records = Vec::with_capacity(num_elems);
    let mut cursor = 0;

    for element in 0..num_elems {
        let tag = *buffer
            .get(cursor)
            .ok_or(DecodeError::Exhausted { element, num_elems })?;

        let kind = ElementKind::from_tag(tag).ok_or(DecodeError::MalformedTag {
            element,
            tag,
            offset: cursor,
        })?;

        let needed = kind.record_len();
        let remaining = buffer.len() - cursor;

        let record = buffer
            .get(cursor..cursor + needed)
            .ok_or(DecodeError::BufferUnderrun {
                element,
                tag,
                needed,
                remaining,
            })?;

        records.push(read_record(element, kind, record)?);
        cursor += needed;
    }

    if cursor != buffer.len() {
        return Err(DecodeError::TrailingData {
            consumed: cursor,
            len: buffer.len(),
        });
    }

    tracing::debug!(
        elements = num_elems,
        integers = buffer.len(),
        "decoded mixed element buffer"
    );

    Ok(records)
}

/// read the node ids out of a single record. `record` includes the tag.
fn read_record(
    element: usize,
    kind: ElementKind,
    record: &[i64],
) -> Result<ElementRecord, DecodeError> {
    let slots = &record[1 + kind.lead_len()..];

    let mut ids = [0usize; MAX_ELEMENT_NODES];
    let mut len = 0;

    match kind {
        ElementKind::Triangle | ElementKind::Quadrilateral => {
            for raw in slots {
                ids[len] = node_id(element, *raw)?;
                len += 1;
            }
        }
        ElementKind::Polygon => {
            // the lead integer is skipped. Node ids always fill the five slots and
            // a 0 or -1 in the last two of them marks padding.
            let padded_from = slots.len() - 2;

            for (slot, raw) in slots.iter().enumerate() {
                if slot >= padded_from && (*raw == 0 || *raw == -1) {
                    if *raw == 0 {
                        tracing::warn!(
                            element,
                            slot,
                            "dropping zero node id in a polygon padding slot; \
                             a real reference to node 0 here cannot be told apart from padding"
                        );
                    }
                    continue;
                }

                ids[len] = node_id(element, *raw)?;
                len += 1;
            }
        }
    }

    Ok(ElementRecord::from_parts(kind, ids, len))
}

fn node_id(element: usize, raw: i64) -> Result<usize, DecodeError> {
    usize::try_from(raw).map_err(|_| DecodeError::NegativeNode { element, node: raw })
}

/// Sorted, distinct node ids referenced by any of the records
pub fn referenced_nodes(records: &[ElementRecord]) -> Vec<usize> {
    let mut nodes: Vec<usize> = records
        .iter()
        .flat_map(|record| record.nodes().iter().copied())
        .collect();

    nodes.sort_unstable();
    nodes.dedup();
    nodes
}

/// Decode a mixed element buffer and build one polygon per element.
///
/// `nodes` is the node coordinate table, one row per node with either 2 or 3
/// columns. The returned polygons are index aligned with the element map:
/// polygon `i` is built from record `i`.
pub fn mesh_polygons(
    nodes: ArrayView2<'_, f64>,
    buffer: &[i64],
    num_elems: usize,
) -> Result<Vec<Polygon>, DecodeError> {
    let columns = nodes.ncols();
    if columns != 2 && columns != 3 {
        return Err(DecodeError::NodeDimension { columns });
    }

    let records = decode_mixed_elements(buffer, num_elems)?;
    polygons_from_records(nodes, &records)
}

/// Build polygons for already decoded records
pub fn polygons_from_records(
    nodes: ArrayView2<'_, f64>,
    records: &[ElementRecord],
) -> Result<Vec<Polygon>, DecodeError> {
    let num_nodes = nodes.nrows();
    let columns = nodes.ncols();

    records
        .iter()
        .enumerate()
        .map(|(element, record)| {
            record.check_bounds(element, num_nodes)?;

            let ring: Vec<Point> = record
                .nodes()
                .iter()
                .map(|id| {
                    let row = nodes.row(*id);
                    let z = if columns == 3 { row[2] } else { 0.0 };
                    [row[0], row[1], z]
                })
                .collect();

            Ok(Polygon::new(ring))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn nodes() -> ndarray::Array2<f64> {
        array![
            [0., 0., 0.],
            [1., 0., 0.],
            [1., 1., 0.],
            [0., 1., 0.],
            [2., 2., 0.],
            [2., 2., 1.],
            [2., 3., 1.],
            [2., 3., 0.],
        ]
    }

    #[test]
    fn one_of_each_tag() {
        let buffer = [4, 0, 1, 2, 5, 0, 1, 2, 3, 3, 5, 3, 4, 5, 6, 7];
        let polygons = mesh_polygons(nodes().view(), &buffer, 3).unwrap();

        assert_eq!(polygons.len(), 3);
        assert_eq!(
            polygons[0].ring(),
            &[[0., 0., 0.], [1., 0., 0.], [1., 1., 0.]]
        );
        assert_eq!(polygons[1].len(), 4);
        assert_eq!(
            polygons[2].ring(),
            &[
                [0., 1., 0.],
                [2., 2., 0.],
                [2., 2., 1.],
                [2., 3., 1.],
                [2., 3., 0.]
            ]
        );
    }

    #[test]
    fn polygon_lead_integer_is_ignored() {
        let buffer = [3, 4, 4, 5, 6, 0, 7];
        let records = decode_mixed_elements(&buffer, 1).unwrap();
        assert_eq!(records[0].nodes(), &[4, 5, 6, 7]);

        let buffer = [3, 3, 1, 2, 3, 4, 5];
        let records = decode_mixed_elements(&buffer, 1).unwrap();
        assert_eq!(records[0].nodes(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn polygon_sentinel_padding() {
        let buffer = [3, 0, 4, 5, 6, -1, 0];
        let records = decode_mixed_elements(&buffer, 1).unwrap();
        assert_eq!(records[0].nodes(), &[4, 5, 6]);

        // -1 outside the padding slots is not a sentinel
        let err = decode_mixed_elements(&[3, 0, -1, 5, 6, 7, 0], 1).unwrap_err();
        assert_eq!(err, DecodeError::NegativeNode { element: 0, node: -1 });
    }

    #[test]
    fn polygon_zero_padding() {
        let buffer = [3, 0, 4, 5, 6, 7, 0];
        let records = decode_mixed_elements(&buffer, 1).unwrap();
        assert_eq!(records[0].nodes(), &[4, 5, 6, 7]);

        let buffer = [3, 0, 4, 5, 6, 0, 0];
        let records = decode_mixed_elements(&buffer, 1).unwrap();
        assert_eq!(records[0].nodes(), &[4, 5, 6]);
    }

    #[test]
    fn leading_zero_is_never_padding() {
        let buffer = [3, 0, 0, 5, 6, 7, 0];
        let records = decode_mixed_elements(&buffer, 1).unwrap();
        assert_eq!(records[0].nodes(), &[0, 5, 6, 7]);
    }

    #[test]
    fn quad_keeps_zero_in_last_slot() {
        let buffer = [5, 1, 2, 3, 0];
        let records = decode_mixed_elements(&buffer, 1).unwrap();
        assert_eq!(records[0].nodes(), &[1, 2, 3, 0]);
    }

    #[test]
    fn malformed_tag() {
        let buffer = [4, 0, 1, 2, 9, 0, 1, 2];
        let err = decode_mixed_elements(&buffer, 2).unwrap_err();
        assert_eq!(
            err,
            DecodeError::MalformedTag {
                element: 1,
                tag: 9,
                offset: 4
            }
        );
        assert!(err.to_string().contains("element 1"));
        assert!(err.to_string().contains("tag 9"));
    }

    #[test]
    fn truncated_record() {
        let buffer = [4, 0, 1, 2, 5, 0, 1];
        let err = decode_mixed_elements(&buffer, 2).unwrap_err();
        assert_eq!(
            err,
            DecodeError::BufferUnderrun {
                element: 1,
                tag: 5,
                needed: 5,
                remaining: 3
            }
        );
    }

    #[test]
    fn too_few_records() {
        let buffer = [4, 0, 1, 2];
        let err = decode_mixed_elements(&buffer, 2).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Exhausted {
                element: 1,
                num_elems: 2
            }
        );
    }

    #[test]
    fn leftover_integers() {
        let buffer = [4, 0, 1, 2, 4];
        let err = decode_mixed_elements(&buffer, 1).unwrap_err();
        assert_eq!(err, DecodeError::TrailingData { consumed: 4, len: 5 });
    }

    #[test]
    fn node_out_of_range() {
        let buffer = [4, 0, 1, 8];
        let err = mesh_polygons(nodes().view(), &buffer, 1).unwrap_err();
        assert_eq!(
            err,
            DecodeError::NodeOutOfRange {
                element: 0,
                node: 8,
                num_nodes: 8
            }
        );
    }

    #[test]
    fn negative_node() {
        let buffer = [4, 0, -3, 1];
        let err = decode_mixed_elements(&buffer, 1).unwrap_err();
        assert_eq!(err, DecodeError::NegativeNode { element: 0, node: -3 });
    }

    #[test]
    fn two_dimensional_nodes() {
        let nodes = array![[0., 0.], [1., 0.], [0., 1.]];
        let polygons = mesh_polygons(nodes.view(), &[4, 0, 1, 2], 1).unwrap();
        assert_eq!(polygons[0].ring()[1], [1., 0., 0.]);
    }

    #[test]
    fn bad_node_columns() {
        let nodes = ndarray::Array2::<f64>::zeros((3, 4));
        let err = mesh_polygons(nodes.view(), &[4, 0, 1, 2], 1).unwrap_err();
        assert_eq!(err, DecodeError::NodeDimension { columns: 4 });
    }

    #[test]
    fn unique_nodes() {
        let buffer = [4, 2, 1, 0, 5, 0, 1, 2, 3];
        let records = decode_mixed_elements(&buffer, 2).unwrap();
        assert_eq!(referenced_nodes(&records), vec![0, 1, 2, 3]);
    }

    #[test]
    fn empty_mesh() {
        let polygons = mesh_polygons(nodes().view(), &[], 0).unwrap();
        assert!(polygons.is_empty());
    }
}
