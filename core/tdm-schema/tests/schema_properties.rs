//! Property tests over randomly shaped (but valid) schemas.

use proptest::prelude::*;
use tdm_schema::{PropertyInfo, SchemaBuilder, TraitSchemaEngine};
use tdm_types::{ProfileId, PropertyHandle};

/// Generates a valid table: each property's parent is the root or an
/// earlier handle, and sibling tags are unique by construction.
fn arb_table() -> impl Strategy<Value = Vec<PropertyInfo>> {
    prop::collection::vec(any::<prop::sample::Index>(), 0..40).prop_map(|picks| {
        let mut next_tag = std::collections::HashMap::<u32, u32>::new();
        picks
            .iter()
            .enumerate()
            .map(|(index, pick)| {
                // handle = index + 2, so eligible parents are 1..=index+1
                let parent = pick.index(index + 1) as u32 + 1;
                let tag = next_tag.entry(parent).or_insert(0);
                *tag += 1;
                PropertyInfo::new(parent, *tag)
            })
            .collect()
    })
}

fn build(table: &[PropertyInfo]) -> TraitSchemaEngine {
    SchemaBuilder::new(ProfileId::new(0, 0x7300), "Random")
        .properties(table)
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn tag_path_resolves_back(table in arb_table()) {
        let schema = build(&table);
        for handle in schema.handles().collect::<Vec<_>>() {
            let tags = schema.tag_path(handle).unwrap();
            prop_assert_eq!(schema.resolve_tag_path(&tags).unwrap(), handle);
            prop_assert!(tags.len() <= schema.tree_depth());
        }
    }

    #[test]
    fn every_property_has_exactly_one_parent_listing_it(table in arb_table()) {
        let schema = build(&table);
        let mut listed = 0;
        for handle in schema.handles().collect::<Vec<_>>() {
            for child in schema.children(handle).unwrap() {
                prop_assert_eq!(schema.parent(child).unwrap(), handle);
                prop_assert!(schema.is_ancestor(handle, child).unwrap());
                listed += 1;
            }
        }
        prop_assert_eq!(listed, table.len());
    }

    #[test]
    fn unknown_handles_never_panic(raw in any::<u32>(), table in arb_table()) {
        let schema = build(&table);
        let handle = PropertyHandle::new(raw);
        let known = raw >= 1 && (raw as usize) <= table.len() + 1;
        prop_assert_eq!(schema.tag_for_handle(handle).is_ok(), known);
        prop_assert_eq!(schema.tag_path(handle).is_ok(), known);
        let _ = schema.is_optional(handle);
    }
}
