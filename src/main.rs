use std::process;

use clap::Parser;

use machete::hosting::{CodeHostingClient, GitHubClient, GitLabClient, Provider, discover_token, resolve_repo};
use machete::ops::{AddOptions, Session};
use machete::render;
use machete::traverse::{self, ReturnTo, TraversalPolicy};
use machete::{MacheteError, branch::LocalBranchShortName, config::HostingSettings};

mod cli;

use cli::{Cli, Commands, HostingAction};

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(if cli.verbose { "debug" } else { "off" })).init();

    if let Err(err) = run(cli) {
        if let Some(machete_err) = err.downcast_ref::<MacheteError>() {
            eprintln!("{machete_err}");
        } else {
            eprintln!("Error: {err:#}");
        }
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // `status`/`show`/`diff`/`log` never mutate, but opening a Session still
    // parses the layout file, which is all of them need.
    let mut session = Session::open(cli.yes)?;

    match cli.command {
        Commands::Add { branch, onto, as_root } => {
            let onto = onto.map(LocalBranchShortName::new).transpose()?;
            session.add(
                LocalBranchShortName::new(branch)?,
                AddOptions {
                    onto,
                    as_root,
                    as_first_child: false,
                    switch_head: false,
                },
            )
        }
        Commands::Edit => {
            let path = machete::layout::machete_file_path(&session.repo, session.settings.use_top_level_machete_file)?;
            let editor = machete::editor::resolve_editor(&session.repo)?;
            let (program, args) = editor.split_first().ok_or_else(|| MacheteError::internal("empty editor command"))?;
            let status = std::process::Command::new(program)
                .args(args)
                .arg(&path)
                .current_dir(session.repo.discovery_path())
                .status()?;
            if status.success() {
                Ok(())
            } else {
                Err(MacheteError::git_state(format!("{program} exited with a non-zero status"), None).into())
            }
        }
        Commands::FilePath => {
            let path = machete::layout::machete_file_path(&session.repo, session.settings.use_top_level_machete_file)?;
            println!("{}", path.display());
            Ok(())
        }
        Commands::Discover { roots, checked_out_since } => {
            let checked_out_since = checked_out_since
                .map(|s| {
                    chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                        .map(|d| d.and_hms_opt(0, 0, 0).expect("midnight is a valid time").and_utc().timestamp())
                        .map_err(|_| MacheteError::user_input(format!("--checked-out-since expects YYYY-MM-DD, got '{s}'")))
                })
                .transpose()?;
            session.discover(machete::ops::DiscoverOptions {
                roots: roots.into_iter().map(LocalBranchShortName::new).collect::<anyhow::Result<_>>()?,
                checked_out_since,
                yes: cli.yes,
            })
        }
        Commands::Status { list_commits, color } => {
            machete::styling::apply_color_mode(match color {
                cli::ColorMode::Always => "always",
                cli::ColorMode::Never => "never",
                cli::ColorMode::Auto => "auto",
            });
            let options = render::RenderOptions {
                use_overrides: true,
                squash_mode: session.settings.squash_merge_detection,
                list_commits,
                extra_space_before_branch_name: session.settings.extra_space_before_branch_name,
            };
            let (rendered, fork_point_off) = render::render_status(&session.repo, &session.layout, &options)?;
            print!("{rendered}");
            for branch in fork_point_off {
                machete::warn::warn(format!("{branch}'s fork point is off; run `git machete update` or pass `--fork-point` to override it"));
            }
            Ok(())
        }
        Commands::Anno { text, branch } => {
            let branch = resolve_branch(&session, branch)?;
            if text.is_empty() {
                session.anno_show(&branch)
            } else {
                session.anno_set(&branch, &text.join(" "))
            }
        }
        Commands::Go { direction } => session.go(direction),
        Commands::Show { direction } => session.show(direction),
        Commands::Update { merge, fork_point } => session.update(merge, fork_point.as_deref()),
        Commands::Reapply { fork_point } => session.reapply(fork_point.as_deref()),
        Commands::Squash { fork_point } => session.squash(fork_point.as_deref()),
        Commands::Advance { push } => session.advance(push, true),
        Commands::SlideOut { branches, merge } => {
            let branches: Vec<LocalBranchShortName> = branches.into_iter().map(LocalBranchShortName::new).collect::<anyhow::Result<_>>()?;
            session.slide_out(&branches, merge)
        }
        Commands::DeleteUnmanaged => session.delete_unmanaged(),
        Commands::Clean { checkout_my_github_prs } => {
            if checkout_my_github_prs {
                let (client, _settings) = build_client(&session, Provider::GitHub)?;
                session.clean(true, Some(client.as_ref()))
            } else {
                session.clean(false, None)
            }
        }
        Commands::Traverse {
            fetch,
            merge,
            push,
            push_untracked,
            start_from,
        } => {
            let policy = TraversalPolicy {
                fetch,
                use_merge: merge,
                push: push || session.settings.traverse_push,
                push_untracked,
                start_from: start_from.map(LocalBranchShortName::new).transpose()?,
                return_to: ReturnTo::Here,
                yes: cli.yes,
            };
            traverse::traverse(&mut session, policy, None)
        }
        Commands::Diff { branch, stat } => session.diff(branch.map(LocalBranchShortName::new).transpose()?, stat),
        Commands::Log { branch } => session.log(branch.map(LocalBranchShortName::new).transpose()?),
        Commands::Github { action } => dispatch_hosting(&mut session, Provider::GitHub, action),
        Commands::Gitlab { action } => dispatch_hosting(&mut session, Provider::GitLab, action),
    }
}

fn resolve_branch(session: &Session, explicit: Option<String>) -> anyhow::Result<LocalBranchShortName> {
    match explicit {
        Some(b) => LocalBranchShortName::new(b),
        None => session.repo.require_current_branch("anno").and_then(LocalBranchShortName::new),
    }
}

fn build_client(session: &Session, provider: Provider) -> anyhow::Result<(Box<dyn CodeHostingClient>, HostingSettings)> {
    let resolved = resolve_repo(&session.repo, provider)?;
    let settings = HostingSettings::load(&session.repo, provider.key())?;
    let token = discover_token(provider.key(), &resolved.domain).ok_or_else(|| {
        MacheteError::user_input(format!(
            "no {} token found; set {}_TOKEN, ~/.{}-token, or log in with the provider's CLI",
            provider.key(),
            provider.key().to_uppercase(),
            provider.key()
        ))
    })?;
    let client: Box<dyn CodeHostingClient> = match provider {
        Provider::GitHub => Box::new(GitHubClient::new(&resolved.domain, &resolved.organization, &resolved.repository, &token)),
        Provider::GitLab => Box::new(GitLabClient::new(&resolved.domain, &resolved.organization, &resolved.repository, &token)),
    };
    Ok((client, settings))
}

fn dispatch_hosting(session: &mut Session, provider: Provider, action: HostingAction) -> anyhow::Result<()> {
    let (client, settings) = build_client(session, provider)?;
    match action {
        HostingAction::CreatePr { draft, intro_style } => session.create_pr(client.as_ref(), &settings, draft, intro_style),
        HostingAction::RetargetPr => session.retarget_pr(client.as_ref()),
        HostingAction::CheckoutPr { number } => session.checkout_pr(client.as_ref(), number),
        HostingAction::AnnoPrs => session.anno_sync_prs(client.as_ref()),
    }
}
