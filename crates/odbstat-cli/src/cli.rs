use clap::Parser;

/// Count unpacked objects and their disk consumption.
///
/// The object directory comes from `GIT_OBJECT_DIRECTORY`, else
/// `$GIT_DIR/objects`, else the repository containing the current directory.
#[derive(Parser, Debug)]
#[command(name = "odbstat", version)]
pub struct Cli {
    /// Also report packs, prune-packable objects and garbage
    #[arg(short, long)]
    pub verbose: bool,

    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
