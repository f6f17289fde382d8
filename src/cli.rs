use anyhow::{Context, Result, bail};
use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

use mindmap::files::{create_map, discover_maps, load_map, save_map};
use mindmap::{EditError, MindMapConfig, MindMapData, MindMapStore, new_node_id};

#[derive(Debug, Parser)]
#[command(
    name = "mindmap",
    version,
    about = "Inspect, validate and edit mind-map documents."
)]
pub struct Cli {
    /// Extra configuration file layered over the user configuration.
    #[arg(long = "config", global = true)]
    config: Option<PathBuf>,

    /// Log file operations and edits to stderr.
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::SetTrue)]
    pub verbose: bool,

    /// Suppress informational output.
    #[arg(short = 'q', long = "quiet", global = true, action = ArgAction::SetTrue)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check mind-map files, or directories of them, for structural errors.
    Validate(ValidateArgs),
    /// Print a mind map as an indented outline.
    Show(ShowArgs),
    /// Create a mind map holding a single root node.
    New(NewArgs),
    /// Add a node under a parent, or as a new root.
    Add(AddArgs),
    /// Remove a node together with its subtree.
    Remove(NodeArgs),
    /// Move a subtree under another node or to the top level.
    Move(MoveArgs),
    /// Change text, position, size or collapsed state of a node.
    Set(SetArgs),
    /// Flip the collapsed state of a node.
    Toggle(NodeArgs),
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Mind-map files or directories to search for `*.json` files.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Report every violation instead of the first one.
    #[arg(long = "all", action = ArgAction::SetTrue)]
    all: bool,
}

#[derive(Debug, Args)]
struct ShowArgs {
    /// Path to the mind-map file.
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Also print the subtrees of collapsed nodes.
    #[arg(long = "all", action = ArgAction::SetTrue)]
    all: bool,
}

#[derive(Debug, Args)]
struct NewArgs {
    /// Path of the mind-map file to create.
    path: PathBuf,

    /// Text of the root node.
    #[arg(long = "text", default_value = "Root")]
    text: String,

    /// Id of the root node (random when omitted).
    #[arg(long = "id")]
    id: Option<String>,
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Path to the mind-map file.
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Parent node id. The node becomes a root when omitted.
    #[arg(long = "parent")]
    parent: Option<String>,

    /// Text of the new node.
    #[arg(long = "text")]
    text: String,

    /// Id of the new node (random when omitted).
    #[arg(long = "id")]
    id: Option<String>,

    /// Position among the siblings (appended when omitted).
    #[arg(long = "index")]
    index: Option<usize>,

    #[arg(long = "x", default_value_t = 0.0, allow_negative_numbers = true)]
    x: f64,

    #[arg(long = "y", default_value_t = 0.0, allow_negative_numbers = true)]
    y: f64,

    /// Width of the new node (configured default when omitted).
    #[arg(long = "width")]
    width: Option<f64>,

    /// Height of the new node (configured default when omitted).
    #[arg(long = "height")]
    height: Option<f64>,
}

#[derive(Debug, Args)]
struct NodeArgs {
    /// Path to the mind-map file.
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Id of the node.
    id: String,
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("destination").required(true).args(["parent", "root"])))]
struct MoveArgs {
    /// Path to the mind-map file.
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Id of the node to move.
    id: String,

    /// New parent node id.
    #[arg(long = "parent")]
    parent: Option<String>,

    /// Make the node a top-level root.
    #[arg(long = "root", action = ArgAction::SetTrue)]
    root: bool,

    /// Position among the new siblings (appended when omitted).
    #[arg(long = "index")]
    index: Option<usize>,
}

#[derive(Debug, Args)]
struct SetArgs {
    /// Path to the mind-map file.
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Id of the node to change.
    id: String,

    #[arg(long = "text")]
    text: Option<String>,

    #[arg(long = "x", allow_negative_numbers = true)]
    x: Option<f64>,

    #[arg(long = "y", allow_negative_numbers = true)]
    y: Option<f64>,

    #[arg(long = "width")]
    width: Option<f64>,

    #[arg(long = "height")]
    height: Option<f64>,

    #[arg(long = "collapsed")]
    collapsed: Option<bool>,
}

pub fn run(cli: Cli) -> Result<()> {
    let config = MindMapConfig::load(cli.config.as_deref())
        .context("failed to load configuration")?;
    let quiet = cli.quiet;

    match cli.command {
        Command::Validate(args) => run_validate(args, quiet),
        Command::Show(args) => run_show(args),
        Command::New(args) => run_new(args, &config, quiet),
        Command::Add(args) => run_add(args, &config),
        Command::Remove(args) => edit_map(&args.input, &config, quiet, |store| {
            let removed = store.remove(&args.id)?;
            Ok(format!("Removed {} node(s) starting at '{}'", removed.len(), args.id))
        }),
        Command::Move(args) => edit_map(&args.input, &config, quiet, |store| {
            let parent = if args.root { None } else { args.parent.as_deref() };
            store.reparent(&args.id, parent, args.index)?;
            Ok(match parent {
                Some(parent) => format!("Moved '{}' under '{parent}'", args.id),
                None => format!("Moved '{}' to the top level", args.id),
            })
        }),
        Command::Set(args) => run_set(args, &config, quiet),
        Command::Toggle(args) => edit_map(&args.input, &config, quiet, |store| {
            let collapsed = store.toggle_collapsed(&args.id)?;
            let state = if collapsed { "collapsed" } else { "expanded" };
            Ok(format!("'{}' is now {state}", args.id))
        }),
    }
}

fn run_validate(args: ValidateArgs, quiet: bool) -> Result<()> {
    let mut files = Vec::new();
    for path in &args.paths {
        files.extend(discover_maps(path)?);
    }
    if files.is_empty() {
        bail!("no mind maps found");
    }

    let mut failed = 0usize;
    for path in &files {
        let data = match load_map(path) {
            Ok(data) => data,
            Err(err) => {
                failed += 1;
                println!("error {}: {err:#}", path.display());
                continue;
            }
        };

        let violations = data.violations();
        if violations.is_empty() {
            if !quiet {
                println!("ok {}", path.display());
            }
            continue;
        }

        failed += 1;
        println!("invalid {}", path.display());
        let shown = if args.all { violations.len() } else { 1 };
        for violation in violations.iter().take(shown) {
            println!("  - {violation}");
        }
    }

    if failed > 0 {
        bail!("{failed} of {} mind map(s) failed validation", files.len());
    }
    Ok(())
}

fn run_show(args: ShowArgs) -> Result<()> {
    let store = load_store(&args.input)?;
    let walk = if args.all { store.walk() } else { store.visible() };

    for (depth, node) in walk {
        let marker = if node.collapsed && !node.is_leaf() {
            " [+]"
        } else {
            ""
        };
        println!(
            "{}{} ({}){marker}",
            "  ".repeat(depth),
            node.text,
            node.id
        );
    }
    Ok(())
}

fn run_new(args: NewArgs, config: &MindMapConfig, quiet: bool) -> Result<()> {
    let id = args.id.unwrap_or_else(new_node_id);
    let mut store = MindMapStore::new();
    store.insert_root(config.node(id, args.text), None)?;

    create_map(&args.path, store.data(), config.pretty)?;
    info!(path = %args.path.display(), "created mind map");
    if !quiet {
        println!("Created mind map -> {}", args.path.display());
    }
    Ok(())
}

fn run_add(args: AddArgs, config: &MindMapConfig) -> Result<()> {
    let id = args.id.clone().unwrap_or_else(new_node_id);

    // The id is the command's output, so it is printed even with --quiet.
    edit_map(&args.input, config, true, |store| {
        let node = config.node(id.clone(), args.text.clone());
        let (width, height) = (
            args.width.unwrap_or(node.width),
            args.height.unwrap_or(node.height),
        );
        match args.parent.as_deref() {
            Some(parent) => store.insert_child(parent, node, args.index)?,
            None => store.insert_root(node, args.index)?,
        }
        store.move_to(&id, args.x, args.y)?;
        store.resize(&id, width, height)?;
        Ok(String::new())
    })?;

    println!("{id}");
    Ok(())
}

fn run_set(args: SetArgs, config: &MindMapConfig, quiet: bool) -> Result<()> {
    let SetArgs {
        input,
        id,
        text,
        x,
        y,
        width,
        height,
        collapsed,
    } = args;

    if text.is_none()
        && x.is_none()
        && y.is_none()
        && width.is_none()
        && height.is_none()
        && collapsed.is_none()
    {
        bail!("nothing to change; pass at least one of --text, --x, --y, --width, --height, --collapsed");
    }

    edit_map(&input, config, quiet, |store| {
        let node = store
            .get(&id)
            .ok_or_else(|| EditError::UnknownNode(id.clone()))?;
        let (old_x, old_y, old_width, old_height) = (node.x, node.y, node.width, node.height);

        if let Some(text) = &text {
            store.set_text(&id, text.as_str())?;
        }
        if x.is_some() || y.is_some() {
            store.move_to(&id, x.unwrap_or(old_x), y.unwrap_or(old_y))?;
        }
        if width.is_some() || height.is_some() {
            store.resize(&id, width.unwrap_or(old_width), height.unwrap_or(old_height))?;
        }
        if let Some(collapsed) = collapsed {
            store.set_collapsed(&id, collapsed)?;
        }
        Ok(format!("Updated '{id}'"))
    })
}

fn load_store(path: &Path) -> Result<MindMapStore> {
    let data: MindMapData = load_map(path)?;
    MindMapStore::from_data(data)
        .with_context(|| format!("'{}' is not a valid mind map", path.display()))
}

/// Loads a valid map, applies `edit`, and writes the result back. Nothing is
/// written when the edit is refused.
fn edit_map<F>(path: &Path, config: &MindMapConfig, quiet: bool, edit: F) -> Result<()>
where
    F: FnOnce(&mut MindMapStore) -> Result<String>,
{
    let mut store = load_store(path)?;
    let message = edit(&mut store)?;

    save_map(path, store.data(), config.pretty)?;
    info!(path = %path.display(), nodes = store.len(), "saved edit");
    if !quiet && !message.is_empty() {
        println!("{message}");
    }
    Ok(())
}
