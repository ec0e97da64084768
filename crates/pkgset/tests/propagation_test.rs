//! Integration tests for propagating setters between packages.

mod common;

use std::path::{Path, PathBuf};

use common::TestPackage;
use pkgset::setter::{list_setters, propagate_all};
use pkgset::{SchemaRegistry, SetterError, SetterValue};

#[test]
fn test_propagates_every_setter_to_every_destination() {
    let source = TestPackage::from_fixture("app");
    let first = TestPackage::from_fixture("consumer");
    let second = TestPackage::from_fixture("consumer");
    let source_before = source.snapshot();

    let mut registry = SchemaRegistry::new();
    let report = propagate_all(
        &mut registry,
        source.schema_path(),
        source.path(),
        &[first.path(), second.path()],
    )
    .expect("Should propagate setters");

    let passes: Vec<(&str, &Path)> = report
        .entries
        .iter()
        .map(|e| (e.setter.as_str(), e.destination.as_path()))
        .collect();
    assert_eq!(
        passes,
        vec![
            ("args", first.path()),
            ("args", second.path()),
            ("env", first.path()),
            ("env", second.path()),
            ("image-tag", first.path()),
            ("image-tag", second.path()),
            ("replicas", first.path()),
            ("replicas", second.path()),
        ]
    );
    assert_eq!(report.count_for("env", first.path()), Some(0));
    assert_eq!(report.count_for("image-tag", second.path()), Some(1));
    assert_eq!(report.total(), 6);

    for destination in [&first, &second] {
        let job = destination.read("job.yaml");
        assert!(job.contains("        image: v1 # {\"$kpt-set\":\"image-tag\"}\n"));
        assert!(job.contains("        args: [--port=8080] # {\"$kpt-set\":\"args\"}\n"));
        assert_eq!(
            destination.read("overlays/replicas.yaml"),
            "- op: replace\n  path: /spec/replicas\n  value: 3 # {\"$kpt-set\":\"replicas\"}\n"
        );
    }

    // Neither the source package nor the destination schemas are rewritten
    assert!(source.changed_since(&source_before).is_empty());
    assert_eq!(
        first.read("Kptfile"),
        std::fs::read_to_string(common::fixtures_path().join("consumer/Kptfile")).unwrap()
    );
    assert_eq!(
        registry.get("image-tag").map(|d| d.value.clone()),
        Some(SetterValue::scalar("v1"))
    );
}

#[test]
fn test_failure_stops_remaining_passes() {
    let source = TestPackage::from_fixture("app");
    let good = TestPackage::from_fixture("consumer");
    let bad = TestPackage::from_fixture("consumer");
    bad.write("broken.yaml", "kind: [unclosed\n");
    let bad_before = bad.snapshot();

    let mut registry = SchemaRegistry::new();
    let err = propagate_all(
        &mut registry,
        source.schema_path(),
        source.path(),
        &[good.path(), bad.path()],
    )
    .unwrap_err();

    match &err {
        SetterError::Propagation {
            setter,
            destination,
            ..
        } => {
            assert_eq!(setter, "args");
            assert_eq!(destination, &PathBuf::from(bad.path()));
        }
        other => panic!("expected propagation error, got {:?}", other),
    }
    assert!(matches!(err.stage(), SetterError::Pipeline(_)));

    // The first pass was applied, later setters never ran
    let job = good.read("job.yaml");
    assert!(job.contains("args: [--port=8080]"));
    assert!(job.contains("image: old"));
    assert!(bad.changed_since(&bad_before).is_empty());
}

#[test]
fn test_later_setter_failure_keeps_earlier_passes() {
    let source = TestPackage::from_fixture("app");
    let first = TestPackage::from_fixture("consumer");
    let second = TestPackage::from_fixture("consumer");
    second.write("sidecar.yaml", "replicas: # {\"$kpt-set\":\"replicas\"}\n- 1\n");

    let mut registry = SchemaRegistry::new();
    let err = propagate_all(
        &mut registry,
        source.schema_path(),
        source.path(),
        &[first.path(), second.path()],
    )
    .unwrap_err();

    match &err {
        SetterError::Propagation {
            setter,
            destination,
            ..
        } => {
            assert_eq!(setter, "replicas");
            assert_eq!(destination, &PathBuf::from(second.path()));
        }
        other => panic!("expected propagation error, got {:?}", other),
    }
    assert!(matches!(err.stage(), SetterError::Pipeline(_)));

    // Every earlier setter reached both destinations
    for destination in [&first, &second] {
        let job = destination.read("job.yaml");
        assert!(job.contains("image: v1 # {\"$kpt-set\":\"image-tag\"}"));
        assert!(job.contains("args: [--port=8080] # {\"$kpt-set\":\"args\"}"));
    }

    // The failing setter was applied to the first destination only
    assert!(first
        .read("overlays/replicas.yaml")
        .contains("value: 3 # {\"$kpt-set\":\"replicas\"}"));
    assert!(second
        .read("overlays/replicas.yaml")
        .contains("value: 1 # {\"$kpt-set\":\"replicas\"}"));
    assert_eq!(
        second.read("sidecar.yaml"),
        "replicas: # {\"$kpt-set\":\"replicas\"}\n- 1\n"
    );
}

#[test]
fn test_no_destinations() {
    let source = TestPackage::from_fixture("app");
    let mut registry = SchemaRegistry::new();
    let destinations: Vec<PathBuf> = Vec::new();

    let report = propagate_all(
        &mut registry,
        source.schema_path(),
        source.path(),
        &destinations,
    )
    .unwrap();

    assert!(report.is_empty());
}

#[test]
fn test_missing_source_schema() {
    let source = TestPackage::empty();
    let destination = TestPackage::from_fixture("consumer");
    let mut registry = SchemaRegistry::new();

    let result = propagate_all(
        &mut registry,
        source.schema_path(),
        source.path(),
        &[destination.path()],
    );

    assert!(matches!(result, Err(SetterError::List(_))));
}

#[test]
fn test_list_setters_counts_source_references() {
    let source = TestPackage::from_fixture("app");

    let listed = list_setters(source.schema_path(), Some(source.path())).unwrap();

    let counts: Vec<(&str, usize)> = listed.iter().map(|l| (l.name(), l.count)).collect();
    assert_eq!(
        counts,
        vec![("args", 1), ("env", 2), ("image-tag", 2), ("replicas", 1)]
    );
    assert_eq!(
        listed[2].definition.description,
        "image tag of the app containers"
    );
}
