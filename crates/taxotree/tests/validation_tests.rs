//! Structural validation tests

use pretty_assertions::assert_eq;
use taxotree::*;

fn ids(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

// ═══════════════════════════════════════════════════════════════════════
// Duplicate Identifiers
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_duplicate_identifier() {
    let err = HierarchyBuilder::new()
        .validate(vec![TaxonomyElement::root("A"), TaxonomyElement::root("A")])
        .unwrap_err();

    assert_eq!(
        err,
        StructuralError::DuplicateIdentifier {
            identifier: "A".to_string()
        }
    );
}

#[test]
fn test_duplicate_caught_before_cycle() {
    let err = HierarchyBuilder::new()
        .validate(vec![
            TaxonomyElement::root("A"),
            TaxonomyElement::child("B", "A"),
            TaxonomyElement::child("A", "B"),
        ])
        .unwrap_err();

    assert_eq!(
        err,
        StructuralError::DuplicateIdentifier {
            identifier: "A".to_string()
        }
    );
}

#[test]
fn test_duplicate_caught_before_dangling_reference() {
    let err = HierarchyBuilder::new()
        .validate(vec![
            TaxonomyElement::root("R"),
            TaxonomyElement::child("B", "Z"),
            TaxonomyElement::child("R", "B"),
        ])
        .unwrap_err();

    assert!(matches!(err, StructuralError::DuplicateIdentifier { .. }));
}

// ═══════════════════════════════════════════════════════════════════════
// Dangling References
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_dangling_parent_reference() {
    let err = HierarchyBuilder::new()
        .validate(vec![TaxonomyElement::root("R"), TaxonomyElement::child("B", "Z")])
        .unwrap_err();

    assert_eq!(
        err,
        StructuralError::DanglingParentReference {
            child: "B".to_string(),
            parent: "Z".to_string(),
        }
    );
}

#[test]
fn test_dangling_caught_before_root_count() {
    // Two roots and a dangling reference: the dangling reference wins.
    let err = HierarchyBuilder::new()
        .validate(vec![
            TaxonomyElement::root("R"),
            TaxonomyElement::root("S"),
            TaxonomyElement::child("B", "Z"),
        ])
        .unwrap_err();

    assert!(matches!(err, StructuralError::DanglingParentReference { .. }));
}

// ═══════════════════════════════════════════════════════════════════════
// Root Count
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_two_roots_with_single_root_expected() {
    let err = HierarchyBuilder::new()
        .validate(vec![
            TaxonomyElement::root("R"),
            TaxonomyElement::child("A", "R"),
            TaxonomyElement::root("S"),
        ])
        .unwrap_err();

    assert_eq!(
        err,
        StructuralError::RootCountMismatch {
            expected: 1,
            roots: ids(&["R", "S"]),
        }
    );
}

#[test]
fn test_expected_root_count_two() {
    let builder = HierarchyBuilder::with_config(BuilderConfig::with_expected_root_count(2));
    let set = builder
        .validate(vec![TaxonomyElement::root("R"), TaxonomyElement::root("S")])
        .unwrap();
    assert_eq!(set.roots().count(), 2);

    let err = builder.validate(vec![TaxonomyElement::root("R")]).unwrap_err();
    assert_eq!(
        err,
        StructuralError::RootCountMismatch {
            expected: 2,
            roots: ids(&["R"]),
        }
    );
}

#[test]
fn test_forest_accepts_many_roots() {
    let set = HierarchyBuilder::with_config(BuilderConfig::forest())
        .validate(vec![
            TaxonomyElement::root("R"),
            TaxonomyElement::root("S"),
            TaxonomyElement::root("T"),
        ])
        .unwrap();
    assert_eq!(set.len(), 3);
}

// ═══════════════════════════════════════════════════════════════════════
// Cycles
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_two_element_cycle() {
    let err = HierarchyBuilder::new()
        .validate(vec![
            TaxonomyElement::root("R"),
            TaxonomyElement::child("A", "B"),
            TaxonomyElement::child("B", "A"),
        ])
        .unwrap_err();

    assert_eq!(
        err,
        StructuralError::CycleDetected {
            members: ids(&["A", "B"]),
        }
    );
}

#[test]
fn test_rootless_cycle_in_forest_mode() {
    // Without a root the single-root check fires first; in forest mode
    // the cycle itself is reported.
    let records = vec![TaxonomyElement::child("A", "B"), TaxonomyElement::child("B", "A")];

    let err = HierarchyBuilder::new().validate(records.clone()).unwrap_err();
    assert!(matches!(err, StructuralError::RootCountMismatch { .. }));

    let err = HierarchyBuilder::with_config(BuilderConfig::forest())
        .validate(records)
        .unwrap_err();
    assert_eq!(
        err,
        StructuralError::CycleDetected {
            members: ids(&["A", "B"]),
        }
    );
}

#[test]
fn test_long_cycle_members_in_walk_order() {
    let err = HierarchyBuilder::new()
        .validate(vec![
            TaxonomyElement::root("R"),
            TaxonomyElement::child("A", "C"),
            TaxonomyElement::child("B", "A"),
            TaxonomyElement::child("C", "B"),
        ])
        .unwrap_err();

    assert_eq!(
        err,
        StructuralError::CycleDetected {
            members: ids(&["A", "C", "B"]),
        }
    );
}

// ═══════════════════════════════════════════════════════════════════════
// Validated Set
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_validated_set_lookup() {
    let set = HierarchyBuilder::new()
        .validate(vec![
            TaxonomyElement::root("R").with_label("Root"),
            TaxonomyElement::child("A", "R"),
        ])
        .unwrap();

    assert_eq!(set.get("R").and_then(|e| e.label()), Some("Root"));
    assert!(set.get("missing").is_none());
    assert_eq!(set.config(), &BuilderConfig::default());
    assert_eq!(set.into_elements().len(), 2);
}

#[test]
fn test_validation_is_pure() {
    let records = vec![
        TaxonomyElement::root("R"),
        TaxonomyElement::child("A", "R").with_metadata("Type", "abstract"),
    ];
    let set = HierarchyBuilder::new().validate(records.clone()).unwrap();
    assert_eq!(set.elements(), records.as_slice());
}
