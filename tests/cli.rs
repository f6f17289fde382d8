use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

use mindmap::MindMapData;

fn mindmap() -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("mindmap")?;
    cmd.env_remove("RUST_LOG")
        .env_remove("MINDMAP_DEFAULT_WIDTH")
        .env_remove("MINDMAP_DEFAULT_HEIGHT")
        .env_remove("MINDMAP_PRETTY");
    Ok(cmd)
}

fn read_map(path: &Path) -> Result<MindMapData, Box<dyn std::error::Error>> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

#[test]
fn new_add_and_show_outline() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let map = tmp.path().join("ideas.json");

    mindmap()?
        .arg("new")
        .arg(&map)
        .args(["--id", "root", "--text", "Ideas"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created mind map"));

    mindmap()?
        .arg("add")
        .arg("-i")
        .arg(&map)
        .args(["--parent", "root", "--id", "rust", "--text", "Rust", "--x", "-40"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rust"));

    mindmap()?
        .arg("add")
        .arg("-i")
        .arg(&map)
        .args(["--parent", "rust", "--id", "serde", "--text", "Serde"])
        .assert()
        .success();

    mindmap()?
        .arg("show")
        .arg("-i")
        .arg(&map)
        .assert()
        .success()
        .stdout("Ideas (root)\n  Rust (rust)\n    Serde (serde)\n");

    let data = read_map(&map)?;
    data.validate()?;
    assert_eq!(data.nodes["rust"].x, -40.0);
    assert_eq!(data.nodes["rust"].width, 80.0);
    Ok(())
}

#[test]
fn add_without_id_prints_generated_id() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let map = tmp.path().join("map.json");

    mindmap()?.arg("new").arg(&map).arg("--quiet").assert().success();

    let output = mindmap()?
        .arg("add")
        .arg("-i")
        .arg(&map)
        .args(["--text", "Another root", "--quiet"])
        .output()?;
    assert!(output.status.success());

    let id = String::from_utf8(output.stdout)?.trim().to_string();
    let data = read_map(&map)?;
    assert_eq!(data.root_ids.len(), 2);
    assert_eq!(data.root_ids[1], id);
    assert_eq!(data.nodes[&id].text, "Another root");
    Ok(())
}

#[test]
fn toggle_hides_subtree_until_show_all() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let map = tmp.path().join("map.json");

    mindmap()?
        .arg("new")
        .arg(&map)
        .args(["--id", "r", "--text", "Root"])
        .assert()
        .success();
    mindmap()?
        .arg("add")
        .arg("-i")
        .arg(&map)
        .args(["--parent", "r", "--id", "a", "--text", "A"])
        .assert()
        .success();

    mindmap()?
        .arg("toggle")
        .arg("-i")
        .arg(&map)
        .arg("r")
        .assert()
        .success()
        .stdout(predicate::str::contains("collapsed"));

    mindmap()?
        .arg("show")
        .arg("-i")
        .arg(&map)
        .assert()
        .success()
        .stdout("Root (r) [+]\n");

    mindmap()?
        .arg("show")
        .arg("-i")
        .arg(&map)
        .arg("--all")
        .assert()
        .success()
        .stdout("Root (r) [+]\n  A (a)\n");
    Ok(())
}

#[test]
fn move_set_and_remove_edit_the_file() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let map = tmp.path().join("map.json");

    mindmap()?
        .arg("new")
        .arg(&map)
        .args(["--id", "r", "--text", "Root"])
        .assert()
        .success();
    for (parent, id) in [("r", "a"), ("r", "b"), ("a", "c")] {
        mindmap()?
            .arg("add")
            .arg("-i")
            .arg(&map)
            .args(["--parent", parent, "--id", id, "--text", id])
            .assert()
            .success();
    }

    mindmap()?
        .args(["move", "-i"])
        .arg(&map)
        .args(["c", "--parent", "b"])
        .assert()
        .success();
    mindmap()?
        .args(["set", "-i"])
        .arg(&map)
        .args(["b", "--text", "Bee", "--width", "140", "--y", "60"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated 'b'"));

    let data = read_map(&map)?;
    data.validate()?;
    assert_eq!(data.nodes["c"].parent_id.as_deref(), Some("b"));
    assert_eq!(data.nodes["b"].text, "Bee");
    assert_eq!(data.nodes["b"].width, 140.0);
    assert_eq!(data.nodes["b"].height, 30.0);
    assert_eq!(data.nodes["b"].y, 60.0);

    mindmap()?
        .args(["remove", "-i"])
        .arg(&map)
        .arg("b")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 2 node(s)"));

    let data = read_map(&map)?;
    data.validate()?;
    assert_eq!(data.nodes.len(), 2);
    Ok(())
}

#[test]
fn refused_edit_leaves_file_untouched() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let map = tmp.path().join("map.json");

    mindmap()?
        .arg("new")
        .arg(&map)
        .args(["--id", "r", "--text", "Root"])
        .assert()
        .success();
    mindmap()?
        .arg("add")
        .arg("-i")
        .arg(&map)
        .args(["--parent", "r", "--id", "a", "--text", "A"])
        .assert()
        .success();
    let before = fs::read_to_string(&map)?;

    mindmap()?
        .args(["move", "-i"])
        .arg(&map)
        .args(["r", "--parent", "a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("its own ancestor"));

    mindmap()?
        .arg("new")
        .arg(&map)
        .assert()
        .failure()
        .stderr(predicate::str::contains("refusing to overwrite"));

    assert_eq!(fs::read_to_string(&map)?, before);
    Ok(())
}

#[test]
fn validate_reports_broken_maps_in_directory() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let good = tmp.path().join("good.json");
    let bad = tmp.path().join("nested").join("bad.json");

    mindmap()?
        .arg("new")
        .arg(&good)
        .args(["--id", "r"])
        .assert()
        .success();
    fs::create_dir_all(bad.parent().unwrap())?;
    fs::write(
        &bad,
        r#"{"nodes": {"r": {"id": "r", "text": "R", "x": 0, "y": 0, "width": 80, "height": 30,
            "parentId": null, "children": ["ghost"], "collapsed": false}}, "rootIds": ["r", "missing"]}"#,
    )?;

    mindmap()?
        .arg("validate")
        .arg(&good)
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"));

    mindmap()?
        .arg("validate")
        .arg(tmp.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("invalid"))
        .stdout(predicate::str::contains("root 'missing' is not present in nodes"))
        .stdout(predicate::str::contains("ghost").not())
        .stderr(predicate::str::contains("1 of 2 mind map(s) failed validation"));

    mindmap()?
        .args(["validate", "--all"])
        .arg(&bad)
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "node 'r' lists child 'ghost' which is not present in nodes",
        ));
    Ok(())
}

#[test]
fn config_file_sets_default_node_size() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let config = tmp.path().join("mindmap.toml");
    let map = tmp.path().join("map.json");
    fs::write(&config, "default_width = 200.0\ndefault_height = 50.0\npretty = false\n")?;

    mindmap()?
        .arg("--config")
        .arg(&config)
        .arg("new")
        .arg(&map)
        .args(["--id", "r"])
        .assert()
        .success();

    let text = fs::read_to_string(&map)?;
    assert_eq!(text.lines().count(), 1);
    let data = read_map(&map)?;
    assert_eq!(data.nodes["r"].width, 200.0);
    assert_eq!(data.nodes["r"].height, 50.0);
    Ok(())
}
