//! Tests for BoundingBox operations used by region subsetting.

use aqhi_common::bbox::BoundingBox;
use aqhi_common::AqhiError;

// ============================================================================
// Constructor tests
// ============================================================================

#[test]
fn test_bbox_new() {
    let bbox = BoundingBox::new(-120.0, 49.0, -110.0, 60.0);
    assert_eq!(bbox.min_x, -120.0);
    assert_eq!(bbox.min_y, 49.0);
    assert_eq!(bbox.max_x, -110.0);
    assert_eq!(bbox.max_y, 60.0);
}

#[test]
fn test_bbox_copy() {
    let bbox1 = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    let bbox2 = bbox1;
    assert_eq!(bbox1, bbox2);
}

#[test]
fn test_bbox_try_new_error_message() {
    let err = BoundingBox::try_new(5.0, 0.0, 1.0, 1.0).unwrap_err();
    assert!(matches!(err, AqhiError::InvalidBbox(_)));
    assert!(err.to_string().contains("5,0,1,1"));
}

#[test]
fn test_bbox_degenerate_point_is_valid() {
    let bbox = BoundingBox::new(-113.5, 53.5, -113.5, 53.5);
    assert!(bbox.is_valid());
    assert!(bbox.contains_point(-113.5, 53.5));
}

// ============================================================================
// Containment tests
// ============================================================================

#[test]
fn test_contains_point_inside() {
    let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    assert!(bbox.contains_point(5.0, 5.0));
}

#[test]
fn test_contains_point_edges_inclusive() {
    let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    assert!(bbox.contains_point(0.0, 0.0));
    assert!(bbox.contains_point(10.0, 10.0));
    assert!(bbox.contains_point(0.0, 10.0));
}

#[test]
fn test_contains_point_outside() {
    let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    assert!(!bbox.contains_point(-0.001, 5.0));
    assert!(!bbox.contains_point(5.0, 10.001));
}

// ============================================================================
// Expansion tests
// ============================================================================

#[test]
fn test_expand_admits_margin_points() {
    let bbox = BoundingBox::new(-114.0, 51.0, -113.0, 52.0);
    assert!(!bbox.contains_point(-114.1, 51.5));
    assert!(bbox.expand(0.2).contains_point(-114.1, 51.5));
    assert!(!bbox.expand(0.2).contains_point(-114.3, 51.5));
}

#[test]
fn test_expand_zero_is_identity() {
    let bbox = BoundingBox::new(-114.0, 51.0, -113.0, 52.0);
    assert_eq!(bbox.expand(0.0), bbox);
}
