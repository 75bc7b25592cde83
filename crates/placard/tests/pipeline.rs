//! End-to-end rendering: directory on disk -> loader -> cache -> environment.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use insta::assert_snapshot;
use placard::{
    bindings_from_json, Bindings, Environment, LoaderConfig, Prefixed, SharedNamespaceRegistry,
    SharedProvider, TemplateCache, TemplateLoader, Text,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

// ============================================================================
// Fixtures
// ============================================================================

fn create_file(dir: &Path, relative_path: &str, content: &str) {
    let path = dir.join(relative_path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn site() -> TempDir {
    let dir = TempDir::new().unwrap();
    create_file(
        dir.path(),
        "layout.html",
        concat!(
            "<title><@ title @></title>\n",
            "<@-require partials/header.html@>\n",
            "<ul>\n",
            "<@-each users partials/user.html@></ul>\n",
            "<p><@-each users.companies partials/company.html@></p>\n",
            "<a href=\"/search?q=<@-url query@>\">search</a>\n",
            "<script>var owner = <@-js owner@>;</script>\n",
        ),
    );
    create_file(dir.path(), "partials/header.html", "<h1><@ company @></h1>");
    create_file(dir.path(), "partials/user.html", "<li><@ firstname @></li>\n");
    create_file(dir.path(), "partials/company.html", "<span><@ name @></span>");
    create_file(dir.path(), "notes.txt", "<@ not a template @>");
    create_file(dir.path(), ".git/HEAD.html", "ignored");
    dir
}

fn load(dir: &Path) -> Environment {
    let config = LoaderConfig::new(dir, "html").ignore_dirs(r"^\.git$").unwrap();
    let sources = TemplateLoader::new(config).load().unwrap();
    Environment::new(Arc::new(TemplateCache::from_sources(&sources)))
}

fn data() -> Bindings {
    bindings_from_json(json!({
        "title": "Staff",
        "company": "Donald & Sons",
        "query": "ducks & mice",
        "owner": "Scrooge \"Uncle\" McDuck",
        "users": [
            {"firstname": "Donald", "companies": [{"name": "Walt Disney"}]},
            {"firstname": "Mickey", "companies": [{"name": "Universal"}, {"name": "Disney+"}]}
        ]
    }))
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn loads_only_wanted_sources() {
    let dir = site();
    let env = load(dir.path());
    assert_eq!(
        env.cache().names(),
        vec![
            "layout.html",
            "partials/company.html",
            "partials/header.html",
            "partials/user.html",
        ]
    );
}

#[test]
fn renders_composed_page() {
    let dir = site();
    let env = load(dir.path());
    let output = env.render_named("layout.html", data()).unwrap();

    assert_snapshot!(output.trim_end(), @r###"
    <title>Staff</title>
    <h1>Donald &amp; Sons</h1>
    <ul>
    <li>Donald</li>
    <li>Mickey</li>
    </ul>
    <p><span>Walt Disney</span><span>Universal</span><span>Disney+</span></p>
    <a href="/search?q=ducks%20%26%20mice">search</a>
    <script>var owner = "Scrooge \"Uncle\" McDuck";</script>
    "###);
}

#[test]
fn missing_data_renders_empty() {
    let dir = site();
    let env = load(dir.path());
    let output = env.render_named("layout.html", Bindings::new()).unwrap();
    assert_eq!(
        output,
        concat!(
            "<title></title>\n",
            "<h1></h1>\n",
            "<ul>\n",
            "</ul>\n",
            "<p></p>\n",
            "<a href=\"/search?q=\">search</a>\n",
            "<script>var owner = ;</script>\n",
        )
    );
}

#[test]
fn concurrent_renders_keep_their_own_bindings() {
    let dir = site();
    let env = load(dir.path());

    let outputs: Vec<(String, String)> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let env = &env;
                scope.spawn(move || {
                    let title = format!("page {i}");
                    let mut bindings = data();
                    let provider: SharedProvider = Arc::new(Text::new(title.clone()));
                    bindings.insert("title".to_string(), provider);
                    (title, env.render_named("layout.html", bindings).unwrap())
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (title, output) in outputs {
        assert!(output.starts_with(&format!("<title>{title}</title>")));
        assert!(output.contains("<li>Donald</li>\n<li>Mickey</li>"));
    }
}

#[test]
fn namespaces_registered_while_rendering() {
    let dir = TempDir::new().unwrap();
    create_file(dir.path(), "logo.html", "<img src=\"<@-img logo.png@>\">");
    let registry = Arc::new(SharedNamespaceRegistry::new());
    let namespaces: SharedProvider = registry.clone();
    let env = load(dir.path()).with_namespaces(namespaces);

    assert_eq!(
        env.render_named("logo.html", Bindings::new()).unwrap(),
        "<img src=\"\">"
    );

    registry.add("img", Arc::new(Prefixed::new("static/"))).unwrap();
    assert_eq!(
        env.render_named("logo.html", Bindings::new()).unwrap(),
        "<img src=\"static&#x2f;logo.png\">"
    );
}
