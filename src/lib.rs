mod engine;
mod model;
mod player;
mod timeline_builder;
mod util;

pub use engine::*;
pub use model::chord::*;
pub use model::config::*;
pub use model::timeline::*;
pub use player::*;
pub use timeline_builder::*;
pub use util::*;
