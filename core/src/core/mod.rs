pub mod context;
pub mod param;
pub mod properties;

pub use context::RunContext;
pub use param::Param;
pub use properties::{is_active, Condition, Properties};
