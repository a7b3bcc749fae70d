use serde_json::json;
use siebel_webtemplate::assemble::{RunDirectory, RunDirectoryProvider};
use siebel_webtemplate::tools::{ToolContext, ToolRegistry};
use siebel_webtemplate::{Config, DomTree, Result, TemplateError, Workspace, decompose, generate_templates, load_manifest};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Always hands out the same directory
struct FixedRun {
    root: PathBuf,
}

impl FixedRun {
    const NAME: &'static str = "fixed";
}

impl RunDirectoryProvider for FixedRun {
    fn create_run(&self) -> Result<RunDirectory> {
        fs::create_dir_all(self.root.join(Self::NAME)).map_err(|e| TemplateError::io(&self.root, e))?;
        RunDirectory::open(&self.root, Self::NAME)
    }

    fn open_run(&self, name: &str) -> Result<RunDirectory> {
        RunDirectory::open(&self.root, name)
    }
}

const REPLY: &str = r#"Here is the converted screen.

```json
{
  "containers": [
    {
      "name": "Top Bar",
      "role": "banner",
      "selector": ".topbar",
      "children": [
        { "name": "Logo", "selector": ".logo" },
        { "name": "Main Menu", "role": "navigation", "selector": "nav > ul" },
      ]
    },
    {
      "name": "Workspace",
      "selector": "main",
      "children": [
        { "name": "Account List", "role": "list", "selector": "table.accounts", "item_selector": "tr" },
        { "name": "Detail Form", "role": "form", "selector": "form#detail" },
        { "name": "Chart", "selector": ".chart" }
      ]
    }
  ]
}
```

```html
<!DOCTYPE html>
<html>
<head><link rel="stylesheet" href="style.css"></head>
<body>
<header class="topbar">
<div class="logo">ACME</div>
<nav><ul><li>Home</li><li>Accounts</li></ul></nav>
</header>
<main>
<table class="accounts"><tr><td>Acme Corp</td></tr></table>
<form id="detail"><input name="account" value="Acme &amp; Co"></form>
</main>
</body>
</html>
```

```css
.topbar { display: flex; }
```
"#;

fn workspace(root: &Path) -> Workspace {
    Workspace::with_provider(
        Config::new().output_root(root),
        FixedRun {
            root: root.to_path_buf(),
        },
    )
}

fn read(path: PathBuf) -> String {
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e))
}

#[test]
fn test_reply_to_templates_through_registry() {
    let dir = tempfile::tempdir().unwrap();
    let workspace = workspace(dir.path());
    let registry = ToolRegistry::with_defaults();
    let mut context = ToolContext::new(&workspace);

    let ingested = registry.execute("ingest", json!({ "response": REPLY }), &mut context).unwrap();
    assert_eq!(ingested.data.as_ref().unwrap()["run"], "fixed");

    let validated = registry.execute("validate", json!({ "run": "fixed" }), &mut context).unwrap();
    let report = validated.data.unwrap();
    assert_eq!(report["valid"], false);
    assert_eq!(report["missing"], json!(["main .chart"]));

    let generated = registry.execute("generate", json!({ "run": "fixed" }), &mut context).unwrap();
    let data = generated.data.unwrap();
    assert_eq!(data["shape"], "hierarchical");
    let names: Vec<&str> = data["components"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["normalized_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["logo", "main_menu", "account_list", "detail_form"]);

    let run = workspace.open_run("fixed").unwrap();
    let menu = read(run.webtemplate_dir().join("applet_main_menu.swt"));
    assert_eq!(
        menu,
        concat!(
            "<siebel:Applet name=\"main_menu\" type=\"List\">\n",
            "  <siebel:ListHeader/>\n",
            "  <siebel:ListRows>\n",
            "    <li>Home</li><li>Accounts</li>\n",
            "  </siebel:ListRows>\n",
            "</siebel:Applet>\n"
        )
    );
    let form = read(run.webtemplate_dir().join("applet_detail_form.swt"));
    assert!(form.contains("<input name=\"account\" value=\"Acme &amp; Co\">"));

    let view = read(run.webtemplate_dir().join("view_template.swt"));
    assert!(view.starts_with("<!DOCTYPE html><html>"));
    assert!(view.contains(concat!(
        "<header class=\"topbar\">",
        "<siebel:IncludeApplet name=\"logo\" file=\"applet_logo.swt\"></siebel:IncludeApplet>",
        "<siebel:IncludeApplet name=\"main_menu\" file=\"applet_main_menu.swt\"></siebel:IncludeApplet>",
        "</header>"
    )));
    assert!(!view.contains("Acme Corp"));

    let mut archive = zip::ZipArchive::new(fs::File::open(run.archive_path()).unwrap()).unwrap();
    let mut names: Vec<String> = archive.file_names().map(String::from).collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "applet_account_list.swt",
            "applet_detail_form.swt",
            "applet_logo.swt",
            "applet_main_menu.swt",
            "view_template.swt"
        ]
    );
    let mut zipped_view = String::new();
    archive
        .by_name("view_template.swt")
        .unwrap()
        .read_to_string(&mut zipped_view)
        .unwrap();
    assert_eq!(zipped_view, view);
}

#[test]
fn test_preview_inlines_stylesheet() {
    let dir = tempfile::tempdir().unwrap();
    let workspace = workspace(dir.path());
    let registry = ToolRegistry::with_defaults();
    let mut context = ToolContext::new(&workspace);
    registry.execute("ingest", json!({ "response": REPLY }), &mut context).unwrap();

    let result = registry.execute("preview", json!({ "run": "fixed" }), &mut context).unwrap();

    let html = result.data.unwrap()["html"].as_str().unwrap().to_string();
    assert!(html.contains("<head><style>.topbar { display: flex; }</style></head>"));
    assert!(!html.contains("<link"));
}

#[test]
fn test_generation_is_repeatable() {
    let dir = tempfile::tempdir().unwrap();
    let workspace = workspace(dir.path());
    let registry = ToolRegistry::with_defaults();
    let mut context = ToolContext::new(&workspace);
    registry.execute("ingest", json!({ "response": REPLY }), &mut context).unwrap();
    let run = workspace.open_run("fixed").unwrap();

    generate_templates(&run, false).unwrap();
    let first = read(run.webtemplate_dir().join("view_template.swt"));
    generate_templates(&run, false).unwrap();
    let second = read(run.webtemplate_dir().join("view_template.swt"));

    assert_eq!(first, second);
}

#[test]
fn test_flat_manifest_marks_missing_components() {
    let tree = DomTree::parse("<div id=\"a\">A</div>");
    let manifest = load_manifest(
        r##"[{"name": "A", "selector": "#a"}, {"name": "B", "selector": "#b", "role": "form"}]"##,
    )
    .unwrap();

    let result = decompose(&tree, &manifest);

    let statuses: Vec<_> = result
        .entries
        .iter()
        .map(|e| serde_json::to_value(e.status).unwrap())
        .collect();
    assert_eq!(statuses, vec![json!("ok"), json!("not found")]);
    assert_eq!(result.fragments.len(), 1);
}

#[test]
fn test_missing_run_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let workspace = workspace(dir.path());
    let mut context = ToolContext::new(&workspace);

    let err = ToolRegistry::with_defaults()
        .execute("generate", json!({ "run": "nope" }), &mut context)
        .unwrap_err();

    assert!(matches!(err, TemplateError::RunNotFound(_)));
}
