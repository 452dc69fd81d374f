use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use grove_types::ObjectKind;

#[derive(Parser)]
#[command(
    name = "grove",
    about = "grove: content-addressed object database and revision resolver",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Start repository discovery from this directory
    #[arg(short = 'C', long = "dir", global = true, default_value = ".", env = "GROVE_DIR")]
    pub dir: PathBuf,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Object kinds as accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum KindArg {
    Blob,
    Tree,
    Commit,
    Tag,
}

impl From<KindArg> for ObjectKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Blob => ObjectKind::Blob,
            KindArg::Tree => ObjectKind::Tree,
            KindArg::Commit => ObjectKind::Commit,
            KindArg::Tag => ObjectKind::Tag,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the payload of an object, peeled to the given type
    CatFile(CatFileArgs),
    /// Compute an object id from a file, optionally storing it
    HashObject(HashObjectArgs),
    /// Resolve a name to an object id
    RevParse(RevParseArgs),
    /// List the entries of a tree
    LsTree(LsTreeArgs),
    /// Write a commit's tree into an empty directory
    Checkout(CheckoutArgs),
    /// List references
    ShowRef(ShowRefArgs),
    /// List tags, or create one
    Tag(TagArgs),
    /// Print commit ancestry as a Graphviz digraph
    Log(LogArgs),
}

#[derive(Args)]
pub struct CatFileArgs {
    #[arg(value_enum)]
    pub kind: KindArg,
    pub object: String,
}

#[derive(Args)]
pub struct HashObjectArgs {
    #[arg(short = 't', long = "type", value_enum, default_value = "blob")]
    pub kind: KindArg,
    /// Write the object into the repository
    #[arg(short, long)]
    pub write: bool,
    pub path: PathBuf,
}

#[derive(Args)]
pub struct RevParseArgs {
    /// Peel the result to this type
    #[arg(long = "type", value_enum)]
    pub kind: Option<KindArg>,
    /// Do not follow tags and commits when the type differs
    #[arg(long)]
    pub no_follow: bool,
    pub name: String,
}

#[derive(Args)]
pub struct LsTreeArgs {
    pub object: String,
}

#[derive(Args)]
pub struct CheckoutArgs {
    pub commit: String,
    pub path: PathBuf,
}

#[derive(Args)]
pub struct ShowRefArgs {
    /// Only list refs under refs/<namespace>
    pub namespace: Option<String>,
}

#[derive(Args)]
pub struct TagArgs {
    /// Create an annotated tag object
    #[arg(short = 'a')]
    pub annotate: bool,
    #[arg(short, long)]
    pub message: Option<String>,
    /// Tagger identity for annotated tags
    #[arg(long, env = "GROVE_TAGGER", default_value = "grove <grove@localhost>")]
    pub tagger: String,
    pub name: Option<String>,
    #[arg(default_value = "HEAD")]
    pub object: String,
}

#[derive(Args)]
pub struct LogArgs {
    #[arg(default_value = "HEAD")]
    pub commit: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_cat_file() {
        let cli = Cli::try_parse_from(["grove", "cat-file", "commit", "HEAD"]).unwrap();
        match cli.command {
            Command::CatFile(args) => {
                assert_eq!(args.kind, KindArg::Commit);
                assert_eq!(args.object, "HEAD");
            }
            _ => panic!("expected cat-file"),
        }
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn parses_global_options_after_subcommand() {
        let cli =
            Cli::try_parse_from(["grove", "rev-parse", "--type", "tree", "v1", "-C", "/tmp", "--format", "json"])
                .unwrap();
        assert_eq!(cli.dir, PathBuf::from("/tmp"));
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Command::RevParse(args) => {
                assert_eq!(args.kind, Some(KindArg::Tree));
                assert!(!args.no_follow);
            }
            _ => panic!("expected rev-parse"),
        }
    }

    #[test]
    fn tag_defaults_to_head() {
        let cli = Cli::try_parse_from(["grove", "tag", "-a", "-m", "release", "v1"]).unwrap();
        match cli.command {
            Command::Tag(args) => {
                assert!(args.annotate);
                assert_eq!(args.name.as_deref(), Some("v1"));
                assert_eq!(args.object, "HEAD");
            }
            _ => panic!("expected tag"),
        }
    }

    #[test]
    fn hash_object_defaults_to_blob() {
        let cli = Cli::try_parse_from(["grove", "hash-object", "-w", "file.txt"]).unwrap();
        match cli.command {
            Command::HashObject(args) => {
                assert_eq!(args.kind, KindArg::Blob);
                assert!(args.write);
            }
            _ => panic!("expected hash-object"),
        }
    }

    #[test]
    fn kind_arg_maps_to_object_kind() {
        assert_eq!(ObjectKind::from(KindArg::Tag), ObjectKind::Tag);
        assert!(Cli::try_parse_from(["grove", "cat-file", "snapshot", "HEAD"]).is_err());
    }
}
