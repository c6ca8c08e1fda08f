// File: mtree-cli/src/main.rs
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use mtree_merkle::{verify, Config, HashAlgorithm, MerkleTree, Mode, Proof};
use mtree_spec as spec;
use std::{fs, path::PathBuf, sync::Arc};
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "mtree", version, about = "Merkle roots and inclusion proofs over line-delimited data")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Args, Clone, Default)]
struct TreeOpts {
    /// Optional params file (toml); flags below override it
    #[arg(long)]
    params: Option<PathBuf>,
    /// proof-gen | tree-build | proof-gen-and-tree-build
    #[arg(long)]
    mode: Option<String>,
    /// sha3-256 | keccak256 | shake256-384
    #[arg(long)]
    hash: Option<String>,
    #[arg(long)]
    parallel: bool,
    /// Worker threads, 0 = all hardware threads
    #[arg(long)]
    workers: Option<usize>,
    /// Sort sibling pairs before hashing
    #[arg(long)]
    sort_pairs: bool,
    /// Use raw lines as leaves instead of their digests
    #[arg(long)]
    raw_leaves: bool,
}

#[derive(Subcommand)]
enum Cmd {
    /// Print depth and root of the tree over every line of a file
    Root {
        #[arg(long)]
        input: PathBuf,
        #[command(flatten)]
        opts: TreeOpts,
    },
    /// Write the inclusion proof of one line
    Prove {
        #[arg(long)]
        input: PathBuf,
        /// Zero-based line number
        #[arg(long)]
        index: usize,
        #[arg(long, default_value = "proof.bin")]
        out: PathBuf,
        #[command(flatten)]
        opts: TreeOpts,
    },
    /// Check a line against a proof and a root
    Verify {
        #[arg(long)]
        block: String,
        #[arg(long, default_value = "proof.bin")]
        proof: PathBuf,
        /// Root in hex
        #[arg(long)]
        root: String,
        #[command(flatten)]
        opts: TreeOpts,
    },
}

fn config_from(opts: &TreeOpts) -> Result<Config> {
    let params = match &opts.params {
        Some(p) => {
            let txt = fs::read_to_string(p).with_context(|| format!("read params {}", p.display()))?;
            spec::load_params_toml(&txt).context("parse params")?
        }
        None => spec::Params::default(),
    };
    let mut cfg = Config::default();
    if let Some(name) = opts.hash.as_ref().or(params.hash.as_ref()) {
        let alg: HashAlgorithm = name.parse()?;
        cfg.hash = Arc::new(alg);
    }
    if let Some(mode) = opts.mode.as_ref().or(params.mode.as_ref()) {
        cfg.mode = mode.parse::<Mode>()?;
    }
    cfg.workers = opts.workers.or(params.workers).unwrap_or(0);
    cfg.parallel = opts.parallel || params.parallel.unwrap_or(false);
    cfg.sort_sibling_pairs = opts.sort_pairs || params.sort_sibling_pairs.unwrap_or(false);
    cfg.disable_leaf_hashing = opts.raw_leaves || params.disable_leaf_hashing.unwrap_or(false);
    debug!(?cfg, "tree configuration");
    Ok(cfg)
}

fn read_blocks(input: &PathBuf) -> Result<Vec<String>> {
    let txt = fs::read_to_string(input).with_context(|| format!("read {}", input.display()))?;
    Ok(txt.lines().map(str::to_owned).collect())
}

fn print_proof(proof: &Proof) {
    println!("path={:#b}", proof.path);
    for (i, sib) in proof.siblings.iter().enumerate() {
        println!("sibling[{}]={}", i, hex::encode(sib));
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mtree_cli=warn,mtree_merkle=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Root { input, opts } => {
            let blocks = read_blocks(&input)?;
            let tree = MerkleTree::new(config_from(&opts)?, &blocks)?;
            info!(leaves = tree.num_leaves(), "tree built");
            println!("depth={}", tree.depth());
            println!("root={}", hex::encode(tree.root()));
        }
        Cmd::Prove { input, index, out, opts } => {
            let blocks = read_blocks(&input)?;
            let Some(block) = blocks.get(index) else {
                bail!("line {} out of range, file has {} lines", index, blocks.len());
            };
            let tree = MerkleTree::new(config_from(&opts)?, &blocks)?;
            let proof = if tree.mode().retains_tree() {
                tree.proof_for(block)?
            } else {
                tree.proofs()[index].clone()
            };
            let f = fs::File::create(&out).with_context(|| format!("create {}", out.display()))?;
            bincode::serialize_into(f, &proof).context("encode proof")?;
            println!("wrote {}", out.display());
            println!("root={}", hex::encode(tree.root()));
            print_proof(&proof);
        }
        Cmd::Verify { block, proof, root, opts } => {
            let f = fs::File::open(&proof).with_context(|| format!("open {}", proof.display()))?;
            let proof: Proof = bincode::deserialize_from(f).context("decode proof")?;
            let root = hex::decode(root.trim()).context("root hex")?;
            let ok = verify(Some(block.as_str()), Some(&proof), &root, &config_from(&opts)?)?;
            println!("{}", if ok { "valid" } else { "invalid" });
        }
    }
    Ok(())
}
