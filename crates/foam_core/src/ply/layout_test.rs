use crate::ply::header::{ElementDecl, PropertyDecl};
use crate::types::PropertyType;

use super::*;

fn decl(name: &str, count: u32, props: &[(&str, PropertyType)]) -> ElementDecl {
  ElementDecl {
    name: name.to_string(),
    count,
    properties: props
      .iter()
      .map(|(n, ty)| PropertyDecl {
        name: n.to_string(),
        ty: *ty,
      })
      .collect(),
  }
}

#[test]
fn test_stride_is_sum_of_widths() {
  let decls = [decl(
    "vertex",
    10,
    &[
      ("x", PropertyType::Float32),
      ("y", PropertyType::Float32),
      ("z", PropertyType::Float32),
      ("red", PropertyType::UInt8),
      ("green", PropertyType::UInt8),
      ("blue", PropertyType::UInt8),
      ("adjacency_offset", PropertyType::UInt32),
    ],
  )];
  let layouts = compute_layout(&decls);
  assert_eq!(layouts[0].stride, 4 + 4 + 4 + 1 + 1 + 1 + 4);
  let width_sum: usize = layouts[0].properties.iter().map(|p| p.ty.width()).sum();
  assert_eq!(layouts[0].stride, width_sum);
}

#[test]
fn test_property_offsets_accumulate_in_order() {
  let decls = [decl(
    "vertex",
    1,
    &[
      ("x", PropertyType::Float32),
      ("red", PropertyType::UInt8),
      ("adjacency_offset", PropertyType::UInt32),
    ],
  )];
  let layouts = compute_layout(&decls);
  let props = &layouts[0].properties;
  assert_eq!(props[0].offset, 0);
  assert_eq!(props[1].offset, 4);
  assert_eq!(props[2].offset, 5);
}

#[test]
fn test_base_offsets_are_running_totals() {
  let decls = [
    decl("vertex", 3, &[("x", PropertyType::Float32), ("y", PropertyType::Float32)]),
    decl("adjacency", 7, &[("adjacency", PropertyType::UInt32)]),
    decl("extra", 2, &[("flag", PropertyType::UInt8)]),
  ];
  let layouts = compute_layout(&decls);
  assert_eq!(layouts[0].base_offset, 0);
  assert_eq!(layouts[1].base_offset, 3 * 8);
  assert_eq!(layouts[2].base_offset, 3 * 8 + 7 * 4);
  assert_eq!(total_size(&layouts), 3 * 8 + 7 * 4 + 2);
}

#[test]
fn test_empty_element_contributes_no_bytes() {
  let decls = [
    decl("vertex", 0, &[("x", PropertyType::Float32)]),
    decl("adjacency", 5, &[("adjacency", PropertyType::UInt32)]),
  ];
  let layouts = compute_layout(&decls);
  assert_eq!(layouts[0].byte_size(), 0);
  assert_eq!(layouts[1].base_offset, 0);
  assert_eq!(total_size(&layouts), 20);
}

#[test]
fn test_property_lookup() {
  let decls = [decl("vertex", 1, &[("x", PropertyType::Float32), ("y", PropertyType::Float32)])];
  let layouts = compute_layout(&decls);
  assert_eq!(layouts[0].property("y").unwrap().offset, 4);
  assert!(layouts[0].property("w").is_none());
}
