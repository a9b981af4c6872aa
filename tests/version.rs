use std::cmp::Ordering;

use host_proxy::ipc::EndpointNamespace;
use host_proxy::version::{ApiVersion, Qualifier};

const SAMPLES: &[&str] = &[
    "v1alpha1", "v1alpha2", "v1alpha10", "v1beta1", "v1beta3", "v1", "v2alpha97", "v2alpha98",
    "v2beta8", "v2", "v7beta12", "v7", "v8alpha1", "v975beta986654",
];

fn samples() -> Vec<ApiVersion> {
    SAMPLES.iter().map(|s| ApiVersion::must(s)).collect()
}

#[test]
fn rendered_versions_parse_back_to_equal_values() {
    for version in samples() {
        let rendered = version.to_string();
        let reparsed = ApiVersion::parse(&rendered).unwrap();

        assert_eq!(reparsed, version);
        assert_eq!(reparsed.to_string(), rendered);
    }
}

#[test]
fn compare_is_antisymmetric_and_reflexive() {
    let versions = samples();
    for a in &versions {
        assert_eq!(a.cmp(a), Ordering::Equal);
        for b in &versions {
            assert_eq!(a.cmp(b), b.cmp(a).reverse(), "{a} vs {b}");
        }
    }
}

#[test]
fn compare_is_transitive() {
    let versions = samples();
    for a in &versions {
        for b in &versions {
            for c in &versions {
                if a < b && b < c {
                    assert!(a < c, "{a} < {b} < {c}");
                }
            }
        }
    }
}

#[test]
fn samples_are_listed_in_ascending_order() {
    let versions = samples();
    assert!(versions.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn qualifier_fields_match_the_literal() {
    let v = ApiVersion::must("v975beta986654");
    assert_eq!(v.major(), 975);
    assert!(matches!(v.qualifier(), Qualifier::Beta(n) if n.get() == 986654));
    assert!(!v.is_stable());

    let stable = ApiVersion::must("v1");
    assert_eq!(stable.qualifier(), Qualifier::Stable);
    assert_eq!(stable.qualifier().number(), 0);
}

#[test]
fn every_sample_gets_a_distinct_address() {
    let ns = EndpointNamespace::new("/run/");
    let mut addresses: Vec<String> = samples()
        .iter()
        .map(|v| ns.address("volume", v))
        .collect();
    addresses.sort();
    addresses.dedup();

    assert_eq!(addresses.len(), SAMPLES.len());
}
