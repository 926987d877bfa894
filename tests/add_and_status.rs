mod common;

use common::TestRepo;
use machete::branch::LocalBranchShortName;
use machete::ops::{AddOptions, Session};

fn branch(name: &str) -> LocalBranchShortName {
    LocalBranchShortName::new(name.to_string()).unwrap()
}

#[test]
fn add_infers_parent_from_fork_point() {
    let repo = TestRepo::new();
    repo.commit_file("README.md", "root commit");
    repo.checkout_new_branch("develop");
    repo.commit_file("develop.txt", "on develop");

    let mut session = Session::open_at(repo.handle(), true).unwrap();
    session
        .add(
            branch("main"),
            AddOptions {
                onto: None,
                as_root: true,
                as_first_child: false,
                switch_head: false,
            },
        )
        .unwrap();
    session
        .add(
            branch("develop"),
            AddOptions {
                onto: None,
                as_root: false,
                as_first_child: false,
                switch_head: false,
            },
        )
        .unwrap();

    assert!(session.layout.is_managed(&branch("develop")));
    assert_eq!(session.layout.parent_of(&branch("develop")), Some(&branch("main")));

    // Re-opening the session must see the persisted layout.
    let reopened = Session::open_at(repo.handle(), true).unwrap();
    assert_eq!(reopened.layout.managed, vec![branch("main"), branch("develop")]);
}

#[test]
fn add_onto_explicit_parent_is_honored() {
    let repo = TestRepo::new();
    repo.commit_file("README.md", "root commit");
    repo.checkout_new_branch("feature");
    repo.commit_file("feature.txt", "on feature");
    repo.checkout("main");
    repo.checkout_new_branch("other");
    repo.commit_file("other.txt", "unrelated");

    let mut session = Session::open_at(repo.handle(), true).unwrap();
    session
        .add(
            branch("main"),
            AddOptions {
                onto: None,
                as_root: true,
                as_first_child: false,
                switch_head: false,
            },
        )
        .unwrap();
    session
        .add(
            branch("other"),
            AddOptions {
                onto: Some(branch("main")),
                as_root: false,
                as_first_child: false,
                switch_head: false,
            },
        )
        .unwrap();

    assert_eq!(session.layout.parent_of(&branch("other")), Some(&branch("main")));
}

#[test]
fn status_renders_one_line_per_managed_branch() {
    let repo = TestRepo::new();
    repo.commit_file("README.md", "root commit");
    repo.checkout_new_branch("develop");
    repo.commit_file("develop.txt", "on develop");

    let mut session = Session::open_at(repo.handle(), true).unwrap();
    session
        .add(
            branch("main"),
            AddOptions {
                onto: None,
                as_root: true,
                as_first_child: false,
                switch_head: false,
            },
        )
        .unwrap();
    session
        .add(
            branch("develop"),
            AddOptions {
                onto: None,
                as_root: false,
                as_first_child: false,
                switch_head: false,
            },
        )
        .unwrap();

    let options = machete::render::RenderOptions {
        use_overrides: true,
        squash_mode: session.settings.squash_merge_detection,
        list_commits: false,
        extra_space_before_branch_name: false,
    };
    let (rendered, fork_point_off) = machete::render::render_status(&session.repo, &session.layout, &options).unwrap();
    assert!(rendered.contains("main"));
    assert!(rendered.contains("develop"));
    assert!(fork_point_off.is_empty());
}
