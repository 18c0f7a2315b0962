use bigfold::engine::config::ShortFragmentPolicy;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "bigfold - split long protein sequences for structure prediction and stitch the predicted fragments back into one chain.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Number of threads used to parse fragment files.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cut the sequences of a FASTA file into overlapping chunks for prediction.
    Segment(SegmentArgs),
    /// Reassemble predicted fragment structures into one continuous chain.
    Assemble(AssembleArgs),
    /// Print a per-residue report of a PDB structure.
    Inspect(InspectArgs),
    /// Truncate selected residues of a PDB structure, prolines to alanines by default.
    Mutate(MutateArgs),
}

/// Arguments for the `segment` subcommand.
#[derive(Args, Debug)]
pub struct SegmentArgs {
    /// FASTA file with one or more sequences.
    #[arg(required = true, value_name = "FASTA")]
    pub input: PathBuf,

    /// Directory receiving one chunk file per sequence.
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Maximum residues per chunk.
    #[arg(short = 's', long, value_name = "INT")]
    pub segment_length: Option<usize>,

    /// Residues shared by consecutive chunks.
    #[arg(short = 'l', long, value_name = "INT")]
    pub overlap_length: Option<usize>,

    /// Residues per sequence line in the chunk files.
    #[arg(long, value_name = "INT")]
    pub line_width: Option<usize>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S segmentation.segment-length=1000
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `assemble` subcommand.
#[derive(Args, Debug)]
pub struct AssembleArgs {
    /// Sequence identifier the fragment files are named after
    /// (`{PREFIX}_seg{N}_*.pdb`).
    #[arg(required = true, value_name = "PREFIX")]
    pub prefix: String,

    /// Directory containing the predicted fragment files.
    #[arg(short = 'd', long, default_value = ".", value_name = "DIR")]
    pub input_dir: PathBuf,

    /// Output PDB file. Defaults to `{PREFIX}.pdb`; with `--no-combine` each
    /// fragment is written next to it with a `_seg{N}` suffix.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Residues each fragment shares with its predecessor.
    #[arg(short = 'l', long, value_name = "INT")]
    pub overlap_length: Option<usize>,

    /// Trailing residues used to superpose the next fragment.
    #[arg(short = 'a', long, value_name = "INT")]
    pub align_span: Option<usize>,

    /// Override `assembly.combine` from the config file.
    #[command(flatten)]
    pub combine: CombineFragments,

    /// Chain identifier of the assembled model.
    #[arg(long, value_name = "CHAR")]
    pub chain_id: Option<char>,

    /// What to do with a fragment not longer than the overlap.
    #[arg(long, value_name = "skip|halt")]
    pub short_fragment_policy: Option<ShortFragmentPolicy>,

    /// Write a TOML run report (junctions, confidence changes, issues).
    #[arg(short, long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S assembly.align-span=8
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Mutually exclusive flags for joining fragments into a single chain.
#[derive(Args, Debug, Clone, Copy)]
#[group(required = false, multiple = false)]
pub struct CombineFragments {
    /// Join consecutive fragments with peptide bonds into one chain.
    #[arg(long)]
    pub combine: bool,
    /// Keep the aligned fragments separate and write one file per fragment.
    #[arg(long)]
    pub no_combine: bool,
}

impl CombineFragments {
    pub fn as_override(&self) -> Option<bool> {
        match (self.combine, self.no_combine) {
            (true, false) => Some(true),
            (false, true) => Some(false),
            _ => None,
        }
    }
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// PDB structure to report on.
    #[arg(required = true, value_name = "PDB")]
    pub input: PathBuf,

    /// Also write the report as CSV.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

/// Arguments for the `mutate` subcommand.
#[derive(Args, Debug)]
pub struct MutateArgs {
    /// PDB structure to mutate.
    #[arg(required = true, value_name = "PDB")]
    pub input: PathBuf,

    /// Output PDB file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Restrict the selection to one chain.
    #[arg(long, value_name = "CHAR")]
    pub chain: Option<char>,

    /// First residue number of the selection (inclusive).
    #[arg(long = "from", value_name = "INT", allow_negative_numbers = true)]
    pub first: Option<isize>,

    /// Last residue number of the selection (inclusive).
    #[arg(long = "to", value_name = "INT", allow_negative_numbers = true)]
    pub last: Option<isize>,

    /// Residue type to replace.
    #[arg(long, default_value = "PRO", value_name = "NAME")]
    pub from_name: String,

    /// Residue type to truncate to (ALA or GLY).
    #[arg(long, default_value = "ALA", value_name = "NAME")]
    pub to_name: String,
}
