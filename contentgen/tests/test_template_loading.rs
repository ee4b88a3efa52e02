use std::fs;
use std::process::Command;

/// A file under _templates whose URL matches a generated page replaces it
#[test]
fn test_custom_template_takes_over_page() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let export = root.join("export.yaml");
    fs::write(
        &export,
        "page:\n  - sys: { id: home }\n    slug: welcome\n    title: Welcome\n  - sys: { id: plain }\n    slug: plain\n    title: Plain\n",
    )
    .unwrap();

    fs::create_dir_all(root.join("_templates")).unwrap();
    fs::write(root.join("_templates/welcome.html"), "---\nlayout: splash\n---\n").unwrap();
    fs::write(root.join("_templates/unrelated.html"), "").unwrap();

    let manifest_path = root.join("manifest.yaml");
    let output = Command::new(env!("CARGO_BIN_EXE_contentgen"))
        .args([
            "generate",
            root.to_str().unwrap(),
            "--export",
            export.to_str().unwrap(),
            "--output",
            manifest_path.to_str().unwrap(),
        ])
        .output()
        .expect("contentgen should run");
    assert!(
        output.status.success(),
        "generate failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let manifest: serde_yaml_ng::Value =
        serde_yaml_ng::from_str(&fs::read_to_string(&manifest_path).unwrap()).unwrap();
    let collections = manifest["collections"].as_sequence().unwrap();

    let orphans = collections.iter().find(|c| c["label"] == "orphans").unwrap();
    let docs = orphans["documents"].as_sequence().unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0]["path"], "_templates/welcome.html");
    assert_eq!(docs[0]["url"], "/welcome/");
    assert_eq!(docs[0]["title"], "Welcome");
    assert_eq!(docs[1]["path"], "_orphans/plain.html");

    let templates = collections.iter().find(|c| c["label"] == "templates").unwrap();
    let remaining = templates["documents"].as_sequence().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["path"], "_templates/unrelated.html");
}
