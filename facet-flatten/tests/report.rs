//! Omission reports and strict flattening.

mod common;

use std::collections::HashMap;

use common::render;
use facet::Facet;
use facet_core::Opaque;
use facet_flatten::{ArrayPolicy, Flattener, Omission, OmissionReason};
use facet_value::{Value, value};

#[derive(Facet)]
struct Directory {
    name: String,
    by_id: HashMap<u32, String>,
}

fn directory() -> Directory {
    Directory {
        name: "staff".into(),
        by_id: HashMap::from([(1, "ann".to_string())]),
    }
}

#[test]
fn test_report_does_not_change_result() {
    facet_testhelpers::setup();

    let v = value!({"tags": ["a", null, "b"], "n": 1});
    let flattener = Flattener::new();
    let (flat, omissions) = flattener.flatten_with_report(&v, "");

    assert_eq!(flat, flattener.flatten(&v));
    assert_eq!(
        omissions,
        vec![Omission {
            path: "tags".into(),
            reason: OmissionReason::NilElement { index: 1 },
        }]
    );
}

#[test]
fn test_non_string_keys_are_reported() {
    facet_testhelpers::setup();

    let (flat, omissions) = Flattener::new().flatten_with_report(&directory(), "");

    insta::assert_snapshot!(render(&flat), @r#""name" = "staff""#);
    assert_eq!(omissions.len(), 1);
    assert_eq!(omissions[0].path, "by_id");
    assert!(matches!(
        omissions[0].reason,
        OmissionReason::NonStringKeys { .. }
    ));
}

#[test]
fn test_unkeyed_root_values_are_reported() {
    facet_testhelpers::setup();

    let (flat, omissions) = Flattener::new().flatten_with_report(&5u8, "");
    assert!(flat.is_empty());
    assert_eq!(
        omissions,
        vec![Omission {
            path: String::new(),
            reason: OmissionReason::UnkeyedScalar,
        }]
    );

    let (flat, omissions) = Flattener::new().flatten_with_report(&Value::NULL, "");
    assert!(flat.is_empty());
    assert_eq!(omissions[0].reason, OmissionReason::UnkeyedNil);

    let none: Option<u8> = None;
    let (_, omissions) = Flattener::new().flatten_with_report(&none, "");
    assert_eq!(omissions[0].reason, OmissionReason::UnkeyedNil);
}

#[test]
fn test_indexed_nil_elements_are_not_omissions() {
    facet_testhelpers::setup();

    let v = value!({"tags": ["a", null]});
    let (flat, omissions) = Flattener::new()
        .with_array_policy(ArrayPolicy::Indexed)
        .flatten_with_report(&v, "");

    insta::assert_snapshot!(render(&flat), @r#"
    "tags.0" = "a"
    "tags.1" = null
    "#);
    assert!(omissions.is_empty());
}

#[test]
fn test_try_flatten_succeeds_without_omissions() {
    facet_testhelpers::setup();

    let flat = Flattener::new()
        .try_flatten(&value!({"a": {"b": 1}}), "")
        .unwrap();
    assert_eq!(Value::from(flat), value!({"a.b": 1}));
}

#[test]
fn test_try_flatten_fails_with_every_omission() {
    facet_testhelpers::setup();

    let err = Flattener::new()
        .try_flatten(&directory(), "dir")
        .unwrap_err();

    insta::assert_snapshot!(
        err.to_string(),
        @"could not flatten dir.by_id: map keys of type u32 are not strings"
    );
    assert_eq!(err.omissions().len(), 1);

    let err: Box<dyn std::error::Error> = Box::new(err);
    assert!(err.source().is_none());
}

#[test]
fn test_try_flatten_counts_extra_omissions() {
    facet_testhelpers::setup();

    let v = value!({"xs": [null, null, 1]});
    let err = Flattener::new().try_flatten(&v, "").unwrap_err();

    insta::assert_snapshot!(
        err.to_string(),
        @"could not flatten xs: element 0 is nil (and 1 more omissions)"
    );
    assert_eq!(
        err.into_omissions()
            .into_iter()
            .map(|omission| omission.reason)
            .collect::<Vec<_>>(),
        vec![
            OmissionReason::NilElement { index: 0 },
            OmissionReason::NilElement { index: 1 },
        ]
    );
}

/// Has neither `Display` nor `Debug`.
struct Secret;

#[derive(Facet)]
struct Vault {
    label: String,
    #[facet(opaque)]
    key: Secret,
    sealed: Vec<Opaque<Secret>>,
}

fn vault() -> Vault {
    Vault {
        label: "vault".into(),
        key: Secret,
        sealed: vec![Opaque(Secret), Opaque(Secret)],
    }
}

#[test]
fn test_unrepresentable_values_elementwise() {
    facet_testhelpers::setup();

    let (flat, omissions) = Flattener::new()
        .with_array_policy(ArrayPolicy::Elementwise)
        .flatten_with_report(&vault(), "");

    insta::assert_snapshot!(render(&flat), @r#"
    "label" = "vault"
    "sealed" = []
    "#);

    let summary: Vec<(String, &'static str)> = omissions
        .iter()
        .map(|omission| {
            let kind = match omission.reason {
                OmissionReason::UnrepresentableLeaf { .. } => "leaf",
                OmissionReason::UnrepresentableElement { .. } => "element",
                _ => "other",
            };
            (omission.path.clone(), kind)
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("key".to_string(), "leaf"),
            ("sealed".to_string(), "element"),
            ("sealed".to_string(), "element"),
        ]
    );
    assert!(matches!(
        omissions[2].reason,
        OmissionReason::UnrepresentableElement { index: 1, .. }
    ));
}

#[test]
fn test_unrepresentable_values_indexed() {
    facet_testhelpers::setup();

    let flattener = Flattener::new().with_array_policy(ArrayPolicy::Indexed);
    let (flat, omissions) = flattener.flatten_with_report(&vault(), "");

    insta::assert_snapshot!(render(&flat), @r#""label" = "vault""#);

    let paths: Vec<&str> = omissions.iter().map(|omission| omission.path.as_str()).collect();
    assert_eq!(paths, vec!["key", "sealed.0", "sealed.1"]);
    assert!(
        omissions
            .iter()
            .all(|omission| matches!(omission.reason, OmissionReason::UnrepresentableLeaf { .. }))
    );

    let err = flattener.try_flatten(&vault(), "").unwrap_err();
    assert_eq!(err.omissions().len(), 3);
}
