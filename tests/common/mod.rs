#![allow(dead_code)]

pub use specwatch_test_utils::builders;
pub use specwatch_test_utils::fake_backend;
pub use specwatch_test_utils::fake_builder;
pub use specwatch_test_utils::{init_tracing, with_timeout};

use std::sync::Arc;

use specwatch::fs::mock::MockFileSystem;
use specwatch::resolve::Resolver;

pub const OUT: &str = "/project/docs";
pub const SRC: &str = "/project/src";

/// Resolver over an in-memory filesystem rooted at `/project`.
pub fn mock_resolver() -> (MockFileSystem, Resolver) {
    let fs = MockFileSystem::new();
    let resolver = Resolver::new(Arc::new(fs.clone()), OUT, SRC);
    (fs, resolver)
}
