use clap::{Parser, Subcommand};
use loam::context::SiteContext;
use loam::name::Name;
use loam::tree::ContentTree;
use loam::walk::DirWalker;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "loam")]
#[command(about = "Content tree inspector for static site sources")]
#[command(long_about = "\
Content tree inspector for static site sources

Builds the in-memory content tree a site generator would see: every file in
the source directory is dispatched to a parser by extension (markdown and
HTML become fragments, JSON and TOML become data, images and everything else
are kept as bytes) and stored under its hierarchical name.

Metadata comes from TOML sidecar files next to the content:

  content/
  ├── index.md                     # home page (resolved for the root name)
  ├── about.md
  ├── blog/
  │   ├── index.md                 # fallback for the name 'blog'
  │   ├── post1.md
  │   └── post1.meta.toml          # published = false, content_type = ...
  └── gallery/
      └── photo[2].png             # bracketed suffix = indexed name token

'loam scan' lists the tree; 'loam resolve <name>' answers the same query a
renderer would ask, including index fallback and publish filtering.")]
#[command(version)]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the content tree and list every node
    Scan {
        /// Emit the listing as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve one name the way a renderer would
    Resolve {
        /// Hierarchical name, e.g. "blog/post1" ("" for the home page)
        name: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let ctx = SiteContext::default();
    let tree = ContentTree::build(&ctx, DirWalker::new(&cli.source))?;

    match cli.command {
        Command::Scan { json } => {
            if json {
                let nodes: Vec<serde_json::Value> = tree
                    .iter()
                    .map(|(name, node)| {
                        serde_json::json!({
                            "name": name,
                            "web_path": name.web_path(),
                            "kind": node.artifact.kind(),
                            "published": node.meta.published(),
                            "content_type": node.meta.get_str("content_type"),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&nodes)?);
            } else {
                println!("{} nodes from {}", tree.len(), cli.source.display());
                for (name, node) in tree.iter() {
                    let published = if node.meta.published() { "" } else { "  [unpublished]" };
                    println!("  /{}  ({}){published}", name.web_path(), node.artifact.kind());
                }
            }
        }
        Command::Resolve { name } => {
            let name = Name::parse(&name)?;
            match tree.resolve(&name) {
                Some(node) => {
                    println!("/{}  ({})", node.name.web_path(), node.artifact.kind());
                    if let Some(html) = node.artifact.as_html() {
                        println!("{html}");
                    }
                }
                None => {
                    println!("not found: /{}", name.web_path());
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
