use crate::error::FoamError;
use crate::ply;
use crate::test_util::{encode_cloud, ring_cloud};

use super::*;

/// Encode a file with explicit (possibly inconsistent) offsets and targets,
/// for invariant-violation tests.
fn encode_raw(offsets: &[u32], targets: &[u32], declared_adjacency: usize) -> Vec<u8> {
  let mut header = String::new();
  header.push_str("ply\nformat binary_little_endian 1.0\n");
  header.push_str(&format!("element vertex {}\n", offsets.len()));
  header.push_str("property float x\nproperty float y\nproperty float z\n");
  header.push_str("property uint adjacency_offset\n");
  header.push_str(&format!("element adjacency {declared_adjacency}\n"));
  header.push_str("property uint adjacency\n");
  header.push_str("end_header\n");

  let mut bytes = header.into_bytes();
  for (i, &off) in offsets.iter().enumerate() {
    for c in [i as f32, 0.0, 0.0] {
      bytes.extend_from_slice(&c.to_le_bytes());
    }
    bytes.extend_from_slice(&off.to_le_bytes());
  }
  for &t in targets {
    bytes.extend_from_slice(&t.to_le_bytes());
  }
  bytes
}

/// Ring cloud: neighbors of 0 are {1}, neighbors of 3 are {2}.
#[test]
fn test_ring_neighbors() {
  let model = ply::parse(&ring_cloud()).unwrap();
  let graph = AdjacencyGraph::from_model(&model).unwrap();

  assert_eq!(graph.vertex_count(), 4);
  assert_eq!(graph.edge_count(), 4);
  assert_eq!(graph.neighbors(0).collect::<Vec<_>>(), vec![1]);
  assert_eq!(graph.neighbors(1).collect::<Vec<_>>(), vec![0]);
  assert_eq!(graph.neighbors(3).collect::<Vec<_>>(), vec![2]);
  assert_eq!(graph.degree(2), 1);
}

#[test]
fn test_multi_neighbor_ranges() {
  let bytes = encode_cloud(
    &[[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
    None,
    &[vec![1, 2], vec![0], vec![0]],
  );
  let model = ply::parse(&bytes).unwrap();
  let graph = AdjacencyGraph::from_model(&model).unwrap();
  assert_eq!(graph.neighbor_range(0), 0..2);
  assert_eq!(graph.neighbor_range(1), 2..3);
  assert_eq!(graph.neighbors(0).collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn test_empty_graph_without_adjacency_element() {
  let bytes = encode_cloud(&[[0.0; 3], [1.0; 3]], None, &[vec![], vec![]]);
  let model = ply::parse(&bytes).unwrap();
  let graph = AdjacencyGraph::from_model(&model).unwrap();
  assert_eq!(graph.edge_count(), 0);
  assert_eq!(graph.neighbors(0).count(), 0);
  assert_eq!(graph.neighbors(1).count(), 0);
}

#[test]
fn test_non_monotonic_offsets_fail_fast() {
  let bytes = encode_raw(&[2, 1, 3], &[1, 2, 0], 3);
  let model = ply::parse(&bytes).unwrap();
  match AdjacencyGraph::from_model(&model) {
    Err(FoamError::Index(msg)) => assert!(msg.contains("decreases")),
    other => panic!("expected Index error, got {other:?}"),
  }
}

#[test]
fn test_offset_count_mismatch_fails_fast() {
  // Final offset says 2 edges, adjacency element declares 3.
  let bytes = encode_raw(&[1, 2], &[1, 0, 0], 3);
  let model = ply::parse(&bytes).unwrap();
  assert!(matches!(
    AdjacencyGraph::from_model(&model),
    Err(FoamError::Index(_))
  ));
}

#[test]
fn test_out_of_range_neighbor_fails_fast() {
  let bytes = encode_raw(&[1, 2], &[1, 9], 2);
  let model = ply::parse(&bytes).unwrap();
  match AdjacencyGraph::from_model(&model) {
    Err(FoamError::Index(msg)) => assert!(msg.contains("exceeds vertex count")),
    other => panic!("expected Index error, got {other:?}"),
  }
}

#[test]
fn test_missing_vertex_element_is_schema_error() {
  let bytes = b"ply\nformat binary_little_endian 1.0\nelement adjacency 0\nproperty uint adjacency\nend_header\n";
  let model = ply::parse(bytes).unwrap();
  assert!(matches!(
    AdjacencyGraph::from_model(&model),
    Err(FoamError::Schema(_))
  ));
}

/// An `adjacency_offset` declared as the wrong scalar type must fail
/// construction instead of decoding garbage offsets.
#[test]
fn test_wrong_typed_offset_is_schema_error() {
  let mut bytes = b"ply\nformat binary_little_endian 1.0\n\
element vertex 1\n\
property float x\n\
property float y\n\
property float z\n\
property float adjacency_offset\n\
end_header\n"
    .to_vec();
  bytes.extend_from_slice(&[0u8; 16]);
  let model = ply::parse(&bytes).unwrap();
  match AdjacencyGraph::from_model(&model) {
    Err(FoamError::Schema(msg)) => assert!(msg.contains("adjacency_offset")),
    other => panic!("expected Schema error, got {other:?}"),
  }
}

#[test]
fn test_missing_offset_property_is_schema_error() {
  let bytes = b"ply\nformat binary_little_endian 1.0\nelement vertex 0\nproperty float x\nend_header\n";
  let model = ply::parse(bytes).unwrap();
  assert!(matches!(
    AdjacencyGraph::from_model(&model),
    Err(FoamError::Schema(_))
  ));
}

/// CSR invariant on a well-formed parse: offsets non-decreasing, final
/// offset equals the adjacency count, all targets in range.
#[test]
fn test_csr_invariant_holds_for_valid_cloud() {
  let bytes = encode_cloud(
    &[[0.0; 3], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [3.0, 0.0, 0.0]],
    None,
    &[vec![1], vec![0, 2], vec![1, 3], vec![2]],
  );
  let model = ply::parse(&bytes).unwrap();
  let graph = AdjacencyGraph::from_model(&model).unwrap();
  assert_eq!(graph.edge_count(), 6);
  for v in 0..graph.vertex_count() {
    for n in graph.neighbors(v) {
      assert!((n as usize) < graph.vertex_count());
    }
  }
}
