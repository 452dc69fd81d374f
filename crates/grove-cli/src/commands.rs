use std::fs;
use std::io::Write;

use anyhow::Context;
use colored::Colorize;
use grove_refs::flatten;
use grove_repo::{HistoryEntry, Object, RepoConfig, Repository, TagAnnotation};
use grove_store::Tree;
use grove_types::{ObjectId, ObjectKind};
use serde_json::json;
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        // Hashing without writing works outside a repository.
        Command::HashObject(args) if !args.write => cmd_hash_object(None, args, format),
        command => {
            let repo = Repository::discover(&cli.dir, RepoConfig::default())
                .with_context(|| format!("opening repository from {}", cli.dir.display()))?;
            debug!(git_dir = %repo.git_dir().display(), "repository opened");
            match command {
                Command::CatFile(args) => cmd_cat_file(&repo, args, format),
                Command::HashObject(args) => cmd_hash_object(Some(&repo), args, format),
                Command::RevParse(args) => cmd_rev_parse(&repo, args, format),
                Command::LsTree(args) => cmd_ls_tree(&repo, args, format),
                Command::Checkout(args) => cmd_checkout(&repo, args, format),
                Command::ShowRef(args) => cmd_show_ref(&repo, args, format),
                Command::Tag(args) => cmd_tag(&repo, args, format),
                Command::Log(args) => cmd_log(&repo, args, format),
            }
        }
    }
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_cat_file(repo: &Repository, args: CatFileArgs, format: OutputFormat) -> anyhow::Result<()> {
    let id = repo.resolve_as(&args.object, args.kind.into())?;
    let object = repo.read_object(&id)?;
    let payload = object.payload();

    match format {
        OutputFormat::Text => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&payload)?;
            stdout.flush()?;
        }
        OutputFormat::Json => print_json(&json!({
            "id": id,
            "kind": object.kind(),
            "size": payload.len(),
            "content": String::from_utf8_lossy(&payload),
        }))?,
    }
    Ok(())
}

fn cmd_hash_object(
    repo: Option<&Repository>,
    args: HashObjectArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let data = fs::read(&args.path)
        .with_context(|| format!("reading {}", args.path.display()))?;
    let kind = ObjectKind::from(args.kind);

    let id = match repo {
        Some(repo) => repo.hash_object(kind, &data, args.write)?,
        None => Object::from_payload(kind, &data)?.id(),
    };

    match format {
        OutputFormat::Text => println!("{id}"),
        OutputFormat::Json => print_json(&json!({
            "id": id,
            "kind": kind,
            "written": args.write,
        }))?,
    }
    Ok(())
}

fn cmd_rev_parse(repo: &Repository, args: RevParseArgs, format: OutputFormat) -> anyhow::Result<()> {
    let resolved = repo.resolve(&args.name, args.kind.map(ObjectKind::from), !args.no_follow)?;

    match format {
        OutputFormat::Text => {
            if let Some(id) = resolved {
                println!("{id}");
            }
        }
        OutputFormat::Json => print_json(&json!({
            "name": args.name,
            "id": resolved,
        }))?,
    }
    Ok(())
}

/// Kind implied by an entry mode, as `ls-tree` prints it.
fn mode_kind(entry: &grove_store::TreeEntry) -> ObjectKind {
    if entry.mode.is_tree() {
        ObjectKind::Tree
    } else if entry.mode.is_gitlink() {
        ObjectKind::Commit
    } else {
        ObjectKind::Blob
    }
}

fn cmd_ls_tree(repo: &Repository, args: LsTreeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let id = repo.resolve_as(&args.object, ObjectKind::Tree)?;
    let object = repo.read_object(&id)?;
    let tree: &Tree = object
        .as_tree()
        .with_context(|| format!("{id} is not a tree"))?;

    match format {
        OutputFormat::Text => {
            for entry in &tree.entries {
                let kind = mode_kind(entry);
                let kind = match kind {
                    ObjectKind::Tree => kind.as_str().blue(),
                    ObjectKind::Commit => kind.as_str().magenta(),
                    _ => kind.as_str().normal(),
                };
                println!(
                    "{} {} {}\t{}",
                    entry.mode.padded(),
                    kind,
                    entry.target,
                    entry.name_lossy()
                );
            }
        }
        OutputFormat::Json => {
            let entries: Vec<_> = tree
                .entries
                .iter()
                .map(|e| {
                    json!({
                        "mode": e.mode.as_str(),
                        "kind": mode_kind(e),
                        "id": e.target,
                        "name": e.name_lossy(),
                    })
                })
                .collect();
            print_json(&json!(entries))?;
        }
    }
    Ok(())
}

fn cmd_checkout(repo: &Repository, args: CheckoutArgs, format: OutputFormat) -> anyhow::Result<()> {
    let summary = repo.checkout(&args.commit, &args.path)?;
    match format {
        OutputFormat::Text => println!(
            "{} Checked out {} into {} ({} files, {} directories{})",
            "✓".green().bold(),
            args.commit.yellow(),
            args.path.display().to_string().bold(),
            summary.files,
            summary.directories,
            if summary.skipped > 0 {
                format!(", {} skipped", summary.skipped)
            } else {
                String::new()
            }
        ),
        OutputFormat::Json => print_json(&serde_json::to_value(&summary)?)?,
    }
    Ok(())
}

fn cmd_show_ref(repo: &Repository, args: ShowRefArgs, format: OutputFormat) -> anyhow::Result<()> {
    let namespace = args.namespace.as_deref();
    let listing = repo.list_refs(namespace)?;

    match format {
        OutputFormat::Text => {
            let prefix = match namespace {
                Some(ns) => format!("refs/{}", ns.trim_matches('/')),
                None => "refs".to_string(),
            };
            for (name, id) in flatten(&listing, &prefix) {
                println!("{id} {name}");
            }
        }
        OutputFormat::Json => print_json(&serde_json::to_value(&listing)?)?,
    }
    Ok(())
}

/// `<tagger> <unix seconds> <+hhmm>` for the current local time.
fn tagger_line(tagger: &str) -> String {
    let now = chrono::Local::now();
    format!("{} {} {}", tagger, now.timestamp(), now.format("%z"))
}

fn cmd_tag(repo: &Repository, args: TagArgs, format: OutputFormat) -> anyhow::Result<()> {
    let Some(name) = args.name else {
        let listing = repo.list_refs(Some("tags"))?;
        let tags = flatten(&listing, "");
        match format {
            OutputFormat::Text => {
                for (name, _) in &tags {
                    println!("{name}");
                }
            }
            OutputFormat::Json => print_json(&serde_json::to_value(&listing)?)?,
        }
        return Ok(());
    };

    let annotation = args.annotate.then(|| TagAnnotation {
        tagger: tagger_line(&args.tagger),
        message: args.message.clone().unwrap_or_default(),
    });
    let id = repo.create_tag(&name, &args.object, annotation.as_ref())?;

    match format {
        OutputFormat::Text => println!(
            "{} Created {}tag {} → {}",
            "✓".green().bold(),
            if args.annotate { "annotated " } else { "" },
            name.yellow(),
            id.short_hex().dimmed()
        ),
        OutputFormat::Json => print_json(&json!({
            "name": name,
            "id": id,
            "annotated": args.annotate,
        }))?,
    }
    Ok(())
}

/// Quote a commit summary for a Graphviz label.
fn dot_label(id: &ObjectId, summary: &str) -> String {
    let escaped = summary.replace('\\', "\\\\").replace('"', "\\\"");
    format!("{}: {}", id.short_hex(), escaped)
}

fn render_dot(entries: &[HistoryEntry]) -> String {
    let mut out = String::from("digraph grovelog {\n  node[shape=rect]\n");
    for entry in entries {
        out.push_str(&format!(
            "  c_{} [label=\"{}\"]\n",
            entry.id,
            dot_label(&entry.id, &entry.summary)
        ));
        for parent in &entry.parents {
            out.push_str(&format!("  c_{} -> c_{};\n", entry.id, parent));
        }
    }
    out.push_str("}\n");
    out
}

fn cmd_log(repo: &Repository, args: LogArgs, format: OutputFormat) -> anyhow::Result<()> {
    let entries = repo.ancestry(&args.commit)?;
    match format {
        OutputFormat::Text => print!("{}", render_dot(&entries)),
        OutputFormat::Json => print_json(&serde_json::to_value(&entries)?)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_output_has_nodes_and_edges() {
        let parent = ObjectId::hash(b"parent");
        let child = ObjectId::hash(b"child");
        let entries = vec![
            HistoryEntry {
                id: child,
                parents: vec![parent],
                summary: "say \"hi\"".into(),
            },
            HistoryEntry {
                id: parent,
                parents: vec![],
                summary: "root".into(),
            },
        ];
        let dot = render_dot(&entries);
        assert!(dot.starts_with("digraph grovelog {"));
        assert!(dot.contains(&format!("c_{child} -> c_{parent};")));
        assert!(dot.contains("say \\\"hi\\\""));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn tagger_line_has_timestamp_and_offset() {
        let line = tagger_line("A <a@b>");
        let parts: Vec<_> = line.rsplitn(3, ' ').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[0].starts_with('+') || parts[0].starts_with('-'));
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2], "A <a@b>");
    }
}
