pub mod neighbors;
pub mod search;

pub use neighbors::{Adjacency, NeighborProvider};
pub use search::{dijkstra, find_path, PathResult, SearchResult};
