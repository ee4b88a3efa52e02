use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const EXPORT: &str = r#"
section:
  - sys: { id: sec-press }
    slug: Press
    title: Press
    parentSection: { sys: { id: sec-news } }
  - sys: { id: sec-news }
    slug: news
    title: News
page:
  - sys: { id: page-release }
    slug: release-1
    title: Release One
    redirectFrom: /old/release-1/
    section: { sys: { id: sec-press } }
  - sys: { id: page-imprint }
    slug: imprint
    title: Imprint
pressRelease:
  - sys: { id: pr-launch }
    slug: launch
    title: Launch
    date: 2020-03-12T02:00:00+02:00
"#;

const SITE_TOML: &str = r#"
[[defaults]]
scope = { path = "", type = "sections" }
values = { layout = "section" }

[[defaults]]
scope = { path = "", type = "orphans" }
values = { layout = "page" }
"#;

fn contentgen(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_contentgen"))
        .args(args)
        .output()
        .expect("contentgen should run")
}

fn write_site(root: &Path, export: &str) {
    let data = root.join("_data/contentful/spaces");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("acc.yaml"), export).unwrap();
    fs::write(root.join("site.toml"), SITE_TOML).unwrap();
}

#[test]
fn test_generate_writes_manifest() {
    let dir = tempfile::tempdir().unwrap();
    write_site(dir.path(), EXPORT);
    let manifest_path = dir.path().join("out/manifest.yaml");

    let output = contentgen(&[
        "generate",
        dir.path().to_str().unwrap(),
        "--output",
        manifest_path.to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "generate failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let manifest: serde_yaml_ng::Value =
        serde_yaml_ng::from_str(&fs::read_to_string(&manifest_path).unwrap()).unwrap();
    let collections = manifest["collections"].as_sequence().unwrap();
    let labels: Vec<_> = collections
        .iter()
        .map(|c| c["label"].as_str().unwrap())
        .collect();
    assert_eq!(
        labels,
        vec!["sections", "orphans", "press-releases", "templates", "press", "news"]
    );

    let press = collections.iter().find(|c| c["label"] == "press").unwrap();
    assert_eq!(press["permalink"], "/news/press/:slug/");
    assert_eq!(press["index"], "/news/press/");

    let release = &press["documents"][0];
    assert_eq!(release["url"], "/news/press/release-1/");
    assert_eq!(release["breadcrumbs"].as_sequence().unwrap().len(), 3);
    assert_eq!(release["contentful"]["sys"]["id"], "page-release");

    let sections = &collections[0];
    assert_eq!(sections["documents"][0]["url"], "/news/");
    assert_eq!(sections["documents"][0]["layout"], "section");
    assert_eq!(sections["documents"][0]["docs"], "news");

    let imprint = &collections[1]["documents"][0];
    assert_eq!(imprint["url"], "/imprint/");
    assert_eq!(imprint["layout"], "page");

    let launch = &collections[2]["documents"][0];
    assert_eq!(launch["date"], "2020-03-12T00:00:00+00:00");

    let redirects = manifest["redirects"].as_sequence().unwrap();
    assert_eq!(redirects.len(), 1);
    assert_eq!(redirects[0]["from"], "/old/release-1/");
    assert_eq!(redirects[0]["to"], "/news/press/release-1/");
}

#[test]
fn test_validate_reports_dangling_parent() {
    let dir = tempfile::tempdir().unwrap();
    write_site(
        dir.path(),
        "section:\n  - sys: { id: s }\n    slug: x\n    title: X\n    parentSection: { sys: { id: ghost } }\n",
    );

    let output = contentgen(&["validate", dir.path().to_str().unwrap()]);
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("✗ section s references unknown parent section ghost"), "{}", stdout);
}

#[test]
fn test_page_with_unknown_section_lands_in_orphans() {
    let dir = tempfile::tempdir().unwrap();
    write_site(
        dir.path(),
        "page:\n  - sys: { id: p }\n    slug: x\n    title: X\n    section: { sys: { id: ghost } }\n",
    );

    let output = contentgen(&["validate", dir.path().to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("⚠ page p references unknown section ghost"), "{}", stdout);

    let manifest_path = dir.path().join("manifest.yaml");
    let output = contentgen(&[
        "generate",
        dir.path().to_str().unwrap(),
        "--output",
        manifest_path.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let manifest: serde_yaml_ng::Value =
        serde_yaml_ng::from_str(&fs::read_to_string(&manifest_path).unwrap()).unwrap();
    let orphans = manifest["collections"]
        .as_sequence()
        .unwrap()
        .iter()
        .find(|c| c["label"] == "orphans")
        .unwrap();
    assert_eq!(orphans["documents"][0]["url"], "/x/");
}

#[test]
fn test_generate_fails_on_missing_slug() {
    let dir = tempfile::tempdir().unwrap();
    write_site(dir.path(), "section:\n  - sys: { id: s }\n    title: No Slug\n");

    let output = contentgen(&[
        "generate",
        dir.path().to_str().unwrap(),
        "--output",
        dir.path().join("manifest.yaml").to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("slug"));
    assert!(!dir.path().join("manifest.yaml").exists());
}

#[test]
fn test_tree_prints_nesting() {
    let dir = tempfile::tempdir().unwrap();
    write_site(dir.path(), EXPORT);

    let output = contentgen(&["tree", dir.path().to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("  News /news/"));
    assert!(stdout.contains("    Press /news/press/"));
    assert!(stdout.contains("      Release One /news/press/release-1/"));
}
