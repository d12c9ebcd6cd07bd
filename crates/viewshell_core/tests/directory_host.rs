use futures::executor::block_on;
use std::fs;
use viewshell_core::{
    DirectoryHost, Document, NavigationOutcome, RouteError, Shell, ShellConfig, ShellEvent,
    ShellHost, WidgetRegistry,
};

fn site() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::create_dir_all(dir.path().join("views")).expect("views dir");
    fs::write(
        dir.path().join("index.html"),
        r#"<html><body><a id="about" data-route href="views/about.html">About</a>
           <div id="view"></div></body></html>"#,
    )
    .expect("shell");
    fs::write(
        dir.path().join("views/hero.html"),
        r#"<html><body><main data-view="hero"><h1>Hero</h1></main></body></html>"#,
    )
    .expect("hero");
    fs::write(
        dir.path().join("views/about.html"),
        r#"<html><body><div id="page"><p>About us</p></div></body></html>"#,
    )
    .expect("about");
    dir
}

fn boot(dir: &tempfile::TempDir) -> Shell<DirectoryHost> {
    let host = DirectoryHost::new(dir.path(), "index.html").expect("host");
    let document = Document::parse_html(&host.read_shell().expect("shell source"));
    Shell::new(
        ShellConfig::default(),
        host,
        document,
        WidgetRegistry::with_defaults(None),
    )
}

fn mount_html(shell: &Shell<DirectoryHost>) -> String {
    shell.document().inner_html(shell.mount().expect("mount"))
}

#[test]
fn boots_and_follows_links_from_a_site_directory() {
    let dir = site();
    let mut shell = boot(&dir);

    let initial = block_on(shell.boot()).expect("initial navigation");
    assert!(initial.is_completed(), "{initial}");
    assert!(mount_html(&shell).contains("<h1>Hero</h1>"));

    let about = shell.document().get_element_by_id("about").expect("link");
    assert!(shell.dispatch(ShellEvent::click(about, 0.0)).default_prevented);
    let outcomes = block_on(shell.run_pending_navigations());

    assert!(outcomes[0].is_completed());
    assert_eq!(
        mount_html(&shell),
        r#"<main data-view="about"><p>About us</p></main>"#
    );
    assert_eq!(shell.host().history_len(), 2);
    assert!(shell.host().location_href().ends_with("index.html#/views/about.html"));
    assert_eq!(shell.host().scroll_resets(), 2);
}

#[test]
fn back_navigation_restores_previous_view_without_new_entry() {
    let dir = site();
    let mut shell = boot(&dir);
    block_on(shell.boot());
    block_on(shell.load_view("views/about.html"));

    assert!(shell.host().go_back().is_some());
    shell.dispatch(ShellEvent::PopState);
    block_on(shell.run_pending_navigations());

    assert!(mount_html(&shell).contains("<h1>Hero</h1>"));
    assert_eq!(shell.host().history_len(), 1);
}

#[test]
fn fragments_outside_the_site_are_refused() {
    let dir = site();
    let mut shell = boot(&dir);

    let outcome = block_on(shell.load_view("../secret.html"));

    assert!(matches!(
        outcome,
        NavigationOutcome::Aborted {
            error: RouteError::HttpStatus { status: 403, .. },
            ..
        }
    ));
    assert_eq!(mount_html(&shell), "");
}
