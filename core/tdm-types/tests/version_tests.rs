use proptest::prelude::*;
use tdm_types::{Error, VersionRange};

#[test]
fn range_rejects_inverted_bounds() {
    assert_eq!(
        VersionRange::new(3, 2),
        Err(Error::InvalidVersionRange { min: 3, max: 2 })
    );
}

#[test]
fn range_contains_bounds() {
    let range = VersionRange::new(1, 3).unwrap();
    assert!(range.contains(1));
    assert!(range.contains(3));
    assert!(!range.contains(0));
    assert!(!range.contains(4));
}

#[test]
fn range_intersection() {
    let a = VersionRange::new(1, 4).unwrap();
    let b = VersionRange::new(3, 6).unwrap();
    assert_eq!(a.intersect(&b), Some(VersionRange::new(3, 4).unwrap()));
    assert_eq!(
        a.intersect(&VersionRange::single(5)),
        None
    );
}

#[test]
fn range_default_is_version_one() {
    assert_eq!(VersionRange::default(), VersionRange::single(1));
}

#[test]
fn range_display() {
    assert_eq!(VersionRange::single(2).to_string(), "v2");
    assert_eq!(VersionRange::new(1, 2).unwrap().to_string(), "v1..=v2");
}

proptest! {
    #[test]
    fn intersection_is_commutative(a in 0u16..50, b in 0u16..50, c in 0u16..50, d in 0u16..50) {
        let r1 = VersionRange::new(a.min(b), a.max(b)).unwrap();
        let r2 = VersionRange::new(c.min(d), c.max(d)).unwrap();
        prop_assert_eq!(r1.intersect(&r2), r2.intersect(&r1));
        if let Some(both) = r1.intersect(&r2) {
            prop_assert!(r1.contains(both.min()) && r2.contains(both.max()));
        }
    }
}
