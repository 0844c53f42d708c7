pub mod apply;
pub mod ast;
pub mod window;

pub use apply::apply_filters;
pub use ast::{FieldFilter, FilterExpr, FilterField};
pub use window::{DEFAULT_MAX_HOURS, TimeWindow};
