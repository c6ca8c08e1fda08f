// File: mtree-spec/src/lib.rs
use serde::{Deserialize, Serialize};

/// Tree parameters as read from a TOML file. Unset fields fall back to
/// the command line or to the library defaults.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Params {
    /// Digest name, e.g. "sha3-256", "keccak256", "shake256-384"
    pub hash: Option<String>,
    /// Worker threads when running in parallel (0 = all hardware threads)
    pub workers: Option<usize>,
    /// "proof-gen", "tree-build" or "proof-gen-and-tree-build"
    pub mode: Option<String>,
    pub parallel: Option<bool>,
    pub sort_sibling_pairs: Option<bool>,
    pub disable_leaf_hashing: Option<bool>,
}

/// Parse tree parameters from TOML text
pub fn load_params_toml(input: &str) -> Result<Params, toml::de::Error> {
    toml::from_str::<Params>(input)
}
