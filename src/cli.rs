//! Command-line surface.
//!
//! A `clap` derive `Cli`/`Commands` pair, with bold-green headers and
//! bold-cyan literals in generated help.

use clap::builder::styling::{AnsiColor, Color, Styles};
use clap::{Parser, Subcommand};

use machete::hosting::IntroStyle;
use machete::ops::Direction;

fn help_styles() -> Styles {
    Styles::styled()
        .header(anstyle::Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Green))))
        .usage(anstyle::Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Green))))
        .literal(anstyle::Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
        .placeholder(anstyle::Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
        .error(anstyle::Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Red))))
}

/// `status --color=<…>` tri-state, matching the upstream Python CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorMode {
    Always,
    Never,
    Auto,
}

#[derive(Parser)]
#[command(name = "git-machete")]
#[command(about = "Tame your branching strategy - rebase/merge, traverse, and sync a tree of dependent branches", long_about = None)]
#[command(version)]
#[command(styles = help_styles())]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Skip interactive confirmations
    #[arg(short = 'y', long, global = true, help_heading = "Global Options")]
    pub yes: bool,

    /// Show debug logging (also controlled by RUST_LOG)
    #[arg(short, long, global = true, help_heading = "Global Options")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a branch to the layout
    Add {
        branch: String,
        #[arg(long)]
        onto: Option<String>,
        #[arg(long, conflicts_with = "onto")]
        as_root: bool,
    },
    /// Show or edit the branch layout file
    Edit,
    /// Print the layout file's path
    FilePath,
    /// Automatically discover a sensible branch layout
    Discover {
        #[arg(long)]
        roots: Vec<String>,
        /// Only consider branches checked out on or after this date (YYYY-MM-DD)
        #[arg(long)]
        checked_out_since: Option<String>,
    },
    /// Display the forest of managed branches
    Status {
        #[arg(long)]
        list_commits: bool,
        /// Control ANSI colors in the rendered tree
        #[arg(long, value_enum, default_value = "auto")]
        color: ColorMode,
    },
    /// Show or set a branch's annotation
    Anno {
        text: Vec<String>,
        #[arg(long)]
        branch: Option<String>,
    },
    /// Move in the given direction within the layout
    Go { direction: Direction },
    /// Print the branch in the given direction without checking it out
    Show { direction: Direction },
    /// Rebase or merge the current branch onto its parent
    Update {
        #[arg(long)]
        merge: bool,
        #[arg(long)]
        fork_point: Option<String>,
    },
    /// Interactively rebase the current branch onto its own fork point
    Reapply {
        #[arg(long)]
        fork_point: Option<String>,
    },
    /// Squash the current branch's unique commits into one
    Squash {
        #[arg(long)]
        fork_point: Option<String>,
    },
    /// Fast-forward-merge the current branch's unique managed child
    Advance {
        #[arg(long)]
        push: bool,
    },
    /// Remove branches from the layout, reparenting their children
    SlideOut {
        branches: Vec<String>,
        #[arg(long)]
        merge: bool,
    },
    /// Delete local branches not tracked by the layout
    DeleteUnmanaged,
    /// Delete unmanaged branches, optionally checking out your open GitHub PRs first
    Clean {
        #[arg(short = 'H', long = "checkout-my-github-prs")]
        checkout_my_github_prs: bool,
    },
    /// Walk the whole layout, applying the usual fixes one branch at a time
    Traverse {
        #[arg(long)]
        fetch: bool,
        #[arg(long)]
        merge: bool,
        #[arg(long)]
        push: bool,
        #[arg(long)]
        push_untracked: bool,
        #[arg(long)]
        start_from: Option<String>,
    },
    /// Show the diff between a branch and its fork point
    Diff {
        branch: Option<String>,
        #[arg(long)]
        stat: bool,
    },
    /// Show the log between a branch and its fork point
    Log { branch: Option<String> },
    /// GitHub-backed pull-request operations
    Github {
        #[command(subcommand)]
        action: HostingAction,
    },
    /// GitLab-backed merge-request operations
    Gitlab {
        #[command(subcommand)]
        action: HostingAction,
    },
}

#[derive(Subcommand)]
pub enum HostingAction {
    /// Create a pull/merge request for the current branch
    CreatePr {
        #[arg(long)]
        draft: bool,
        #[arg(long, default_value = "full")]
        intro_style: IntroStyle,
    },
    /// Retarget the current branch's PR/MR to its layout parent
    RetargetPr,
    /// Check out a PR/MR by number
    CheckoutPr { number: u64 },
    /// Annotate managed branches with their PR/MR numbers
    AnnoPrs,
}
