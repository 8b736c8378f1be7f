//! Host search index
//!
//! Fully-qualified hosts are indexed in 27 balanced trees: one for IP
//! literals and one per initial letter. The index supports exact lookup and
//! label-wise prefix search for autocompletion.

mod aa_tree;
mod index;

pub use aa_tree::{AaTree, Iter};
pub use index::{bucket_for, HostKey, SearchIndex, BUCKET_COUNT, IP_BUCKET};
