//! Classification properties
//!
//! `classify` depends only on the trimmed token and the configured logical
//! kinds, never on surrounding whitespace or registry contents.

use mpf_schema::prelude::*;
use mpf_schema::{LogicalKinds, TableFixture};
use proptest::prelude::*;
use std::sync::Arc;

fn resolver(config: ResolverConfig) -> SchemaResolver {
    SchemaResolver::with_config(Arc::new(StaticSchemaRegistry::new()), config)
}

fn padding() -> impl Strategy<Value = String> {
    "[ \t\r\n]{0,3}"
}

fn kind() -> impl Strategy<Value = String> {
    "[A-Z][A-Z_]{0,11}"
}

proptest! {
    #[test]
    fn prop_classify_ignores_surrounding_whitespace(
        token in any::<String>(),
        before in padding(),
        after in padding(),
    ) {
        let resolver = resolver(ResolverConfig::new());
        let padded = format!("{before}{token}{after}");

        prop_assert_eq!(resolver.classify(&padded), resolver.classify(&token));
        prop_assert_eq!(resolver.classify(&token), resolver.classify(&token));
    }

    #[test]
    fn prop_blank_tokens_are_unresolved(token in padding()) {
        prop_assert_eq!(resolver(ResolverConfig::new()).classify(&token), Classification::Unresolved);
    }

    #[test]
    fn prop_configured_kinds_win_over_tables(
        kinds in proptest::collection::btree_set(kind(), 1..6),
        token in kind(),
    ) {
        let logical = kinds
            .iter()
            .fold(LogicalKinds::empty(), |acc, kind| acc.with_kind(kind.clone(), "gid"));
        let resolver = resolver(ResolverConfig::new().with_logical_kinds(logical));

        for kind in &kinds {
            prop_assert_eq!(resolver.classify(kind), Classification::Logical(kind.clone()));
        }

        let expected = if kinds.contains(&token) {
            Classification::Logical(token.clone())
        } else {
            Classification::SchemaBacked(token.clone())
        };
        prop_assert_eq!(resolver.classify(&token), expected);
    }

    #[test]
    fn prop_registry_contents_do_not_matter(token in kind()) {
        let listed = StaticSchemaRegistry::new().with_table(&token, TableFixture::default());
        let with_table = SchemaResolver::new(Arc::new(listed));
        let without = resolver(ResolverConfig::new());

        prop_assert_eq!(with_table.classify(&token), without.classify(&token));
    }
}
