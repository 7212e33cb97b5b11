pub mod fences;
pub mod io;

// Re-export key types for easier usage
pub use fences::{
    BlockKind, FenceLine, FenceNormalizer, FenceRules, Normalized, Rewrite, normalize,
    normalize_opt,
};
