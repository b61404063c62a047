// Static template catalog: starting sources for each supported dialect.
// Pure data lookups; nothing here touches the compiler pipeline.

pub mod catalog;
pub mod handlers;

pub use catalog::list_templates;
