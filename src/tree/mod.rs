//! Arena-backed domain and path trees
//!
//! Hosts live in a tree keyed by DNS labels, walked from the top-level
//! domain towards the leaf (`org` → `example` → `www`). Every host node owns
//! the root of a path tree whose nodes are `/`-separated path segments.
//! Nodes are addressed by copyable indices into arenas owned by the database
//! and are never removed individually, so an index stays valid for the
//! lifetime of the database.

mod host;
mod path;

pub use host::{HostNode, HostTree};
pub use path::{PathNode, PathTree, Walk};
pub(crate) use path::split_segments;

/// Index of a node in the domain tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostId(pub(crate) usize);

/// Index of a node in the path tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathId(pub(crate) usize);
