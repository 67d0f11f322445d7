//! Generators shipped with fgen.

mod query_type;

pub use query_type::{QUERY_TAG, QUERY_TYPE_NAME, QueryTypeGenerator};

use crate::registry::GeneratorDescriptor;

/// Every builtin generator, in registration order.
pub static BUILTIN: &[GeneratorDescriptor] = &[GeneratorDescriptor::new(
    "query-type",
    0,
    QueryTypeGenerator::boxed,
)];
