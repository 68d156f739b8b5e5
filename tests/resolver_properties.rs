// tests/resolver_properties.rs

mod common;
use crate::common::{OUT, SRC, mock_resolver};

use proptest::prelude::*;
use specwatch::errors::ResolveError;

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,8}(\\.(html|css|js|json))?"
}

proptest! {
    #[test]
    fn resolution_follows_source_order(
        name in name_strategy(),
        out_content in proptest::option::of("[a-zA-Z0-9 ]{0,32}"),
        src_content in proptest::option::of("[a-zA-Z0-9 ]{0,32}"),
    ) {
        let (fs, resolver) = mock_resolver();
        if let Some(content) = &out_content {
            fs.add_file(format!("{OUT}/{name}"), content.as_str());
        }
        if let Some(content) = &src_content {
            fs.add_file(format!("{SRC}/{name}"), content.as_str());
        }

        let result = resolver.resolve(&name);
        match (out_content, src_content) {
            (Some(out), _) => prop_assert_eq!(result.ok(), Some(out)),
            (None, Some(src)) => prop_assert_eq!(result.ok(), Some(src)),
            (None, None) => match result {
                Err(ResolveError::NotFound { tried, .. }) => prop_assert_eq!(tried.len(), 2),
                Ok(content) => prop_assert!(false, "unexpected content {:?}", content),
            },
        }
    }

    #[test]
    fn resolution_is_idempotent(
        name in name_strategy(),
        content in "[a-zA-Z0-9 ]{0,32}",
        in_output in any::<bool>(),
    ) {
        let (fs, resolver) = mock_resolver();
        let dir = if in_output { OUT } else { SRC };
        fs.add_file(format!("{dir}/{name}"), content.as_str());

        let first = resolver.resolve(&name).ok();
        let second = resolver.resolve(&name).ok();
        prop_assert_eq!(first.as_deref(), Some(content.as_str()));
        prop_assert_eq!(first, second);
    }
}
