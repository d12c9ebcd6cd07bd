mod common;

use common::{by_id, mount_html, shell, view_page, FakeHost};
use futures::executor::block_on;
use std::time::Duration;
use viewshell_core::tone::current_tone;
use viewshell_core::{Document, Shell, ShellConfig, ShellEvent, Tone, WidgetRegistry};

fn host_at(href: &str) -> FakeHost {
    FakeHost::at(href)
        .with_page("views/hero.html", &view_page("hero", "", "<h1>Hero</h1>"))
        .with_page(
            "views/work.html",
            &view_page("work", r#"data-ui="light""#, "<h1>Work</h1>"),
        )
}

fn has_class(shell: &Shell<FakeHost>, id: &str, class: &str) -> bool {
    shell.document().has_class(by_id(shell, id), class)
}

fn body_has(shell: &Shell<FakeHost>, class: &str) -> bool {
    let body = shell.document().body().expect("body");
    shell.document().has_class(body, class)
}

#[test]
fn boot_reveals_page_and_loads_view_from_hash_without_pushing() {
    let mut shell = shell(host_at("https://site.test/index.html#/views/work.html"));

    let outcome = block_on(shell.boot()).expect("initial navigation");

    assert!(outcome.is_completed());
    assert_eq!(outcome.view().as_str(), "views/work.html");
    assert!(body_has(&shell, "page-in"));
    assert!(mount_html(&shell).contains("<h1>Work</h1>"));
    assert_eq!(shell.host().history().len(), 1);
    assert_eq!(current_tone(shell.document()), Some(Tone::Light));
}

#[test]
fn boot_without_hash_loads_default_view() {
    let mut shell = shell(host_at("https://site.test/index.html"));

    let outcome = block_on(shell.boot()).expect("initial navigation");

    assert_eq!(outcome.view().as_str(), "views/hero.html");
    assert!(mount_html(&shell).contains("<h1>Hero</h1>"));
}

#[test]
fn boot_keeps_prerendered_view_and_initializes_it() {
    let document = Document::parse_html(
        r#"<html><body><div id="view">
             <main data-view="home" data-tone="light"><p>ready</p></main>
           </div></body></html>"#,
    );
    let mut shell = Shell::new(
        ShellConfig::default(),
        host_at("https://site.test/index.html"),
        document,
        WidgetRegistry::with_defaults(None),
    );

    let outcome = block_on(shell.boot());

    assert!(outcome.is_none());
    assert!(shell.host().requests().is_empty());
    assert!(mount_html(&shell).contains("<p>ready</p>"));
    assert_eq!(current_tone(shell.document()), Some(Tone::Light));
}

#[test]
fn boot_accepts_deeply_nested_prerendered_view() {
    let depth = 50_000;
    let document = Document::parse_html(&format!(
        "<html><body><div id=\"view\">{}deep{}</div></body></html>",
        "<span>".repeat(depth),
        "</span>".repeat(depth)
    ));
    let mut shell = Shell::new(
        ShellConfig::default(),
        host_at("https://site.test/index.html"),
        document,
        WidgetRegistry::with_defaults(None),
    );

    assert!(block_on(shell.boot()).is_none());
    assert!(shell.host().requests().is_empty());
    let mount = shell.mount().expect("mount");
    assert_eq!(shell.document().text_content(mount), "deep");
}

#[test]
fn boot_treats_whitespace_and_comments_as_an_empty_mount() {
    let document = Document::parse_html(
        "<html><body><div id=\"view\">\n  <!-- filled by the router -->\n</div></body></html>",
    );
    let mut shell = Shell::new(
        ShellConfig::default(),
        host_at("https://site.test/index.html"),
        document,
        WidgetRegistry::with_defaults(None),
    );

    let outcome = block_on(shell.boot()).expect("initial navigation");

    assert_eq!(outcome.view().as_str(), "views/hero.html");
    assert!(mount_html(&shell).contains("<h1>Hero</h1>"));
}

#[test]
fn splash_click_hides_it_once() {
    let mut shell = shell(host_at("https://site.test/index.html"));
    block_on(shell.boot());
    assert!(body_has(&shell, "splash-lock"));

    let logo = by_id(&shell, "splash-logo");
    shell.dispatch(ShellEvent::click(logo, 5.0));

    assert!(has_class(&shell, "splash", "is-hidden"));
    assert!(!body_has(&shell, "splash-lock"));

    let body = shell.document().body().expect("body");
    shell.document_mut().add_class(body, "splash-lock");
    shell.host().advance(Duration::from_millis(5000));
    shell.run_due_timers();
    assert!(body_has(&shell, "splash-lock"), "dismissal must run only once");
}

#[test]
fn splash_times_out_after_its_delay() {
    let mut shell = shell(host_at("https://site.test/index.html").with_exit_signal());
    block_on(shell.boot());

    shell.host().advance(Duration::from_millis(2199));
    shell.run_due_timers();
    assert!(!has_class(&shell, "splash", "is-hidden"));

    shell.host().advance(Duration::from_millis(1));
    shell.run_due_timers();
    assert!(has_class(&shell, "splash", "is-hidden"));
    assert!(!body_has(&shell, "splash-lock"));
}

#[test]
fn boot_without_mount_point_does_not_navigate() {
    let document = Document::parse_html("<html><body><p>static</p></body></html>");
    let mut shell = Shell::new(
        ShellConfig::default(),
        host_at("https://site.test/index.html"),
        document,
        WidgetRegistry::with_defaults(None),
    );

    assert!(block_on(shell.boot()).is_none());
    assert!(shell.host().requests().is_empty());
    assert!(body_has(&shell, "page-in"));
}
