pub mod builder;
pub mod layout;
pub mod resolver;
pub mod style;
pub mod time;

pub use builder::{BuiltGraph, GraphBuilder, build_graph};
pub use layout::{
    CircularLayouter, GridLayouter, LayoutAlgorithm, Layouter, Positions, RandomLayouter,
    SmartLayouter,
};
pub use resolver::{IdentityResolver, strip_domain};
pub use style::{Color, edge_color, jet, node_color, node_size, style_graph};
pub use time::{local_timestamp, parse_event_time};
