// Resume compiler: dialect detection, identity extraction, segmentation,
// entry parsing, inline markup and HTML rendering behind one `compile` call.
// Pure CPU work; HTTP handlers must run it inside tokio::task::spawn_blocking.

pub mod dialect;
pub mod entries;
pub mod error;
pub mod facade;
pub mod handlers;
pub mod identity;
pub mod inline;
pub mod model;
pub mod render;
pub mod scanner;
pub mod segment;
pub mod stylesheet;

pub use model::Dialect;
