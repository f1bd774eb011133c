//! 命令行集成测试

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::sample_content_list;

/// 在临时目录中运行，避免读到工作区的配置文件
fn cli(dir: &TempDir) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_paper-translator"));
    command
        .current_dir(dir.path())
        .env_remove("PAPER_API_KEY")
        .env_remove("OPENAI_API_KEY")
        .env_remove("PAPER_BATCH_SIZE")
        .env("NO_COLOR", "1");
    command
}

#[test]
fn test_help() {
    let dir = TempDir::new().unwrap();

    cli(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--no-translate"));
}

#[test]
fn test_no_translate_writes_json() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("paper_content_list.json");
    fs::write(&input, sample_content_list()).unwrap();

    cli(&dir)
        .arg(&input)
        .arg("--no-translate")
        .arg("--markdown")
        .assert()
        .success()
        .stdout(predicate::str::contains("4 段落"));

    let json = fs::read_to_string(dir.path().join("paper.translated.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["document"]["paragraphs"].as_array().unwrap().len(), 4);
    assert_eq!(value["statuses"][0]["status"], "skipped");

    let markdown = fs::read_to_string(dir.path().join("paper.translated.md")).unwrap();
    assert!(markdown.contains("Sparse Attention at Scale"));
    assert!(markdown.contains("## Tables"));
}

#[test]
fn test_explicit_output_path() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("paper_content_list.json");
    fs::write(&input, sample_content_list()).unwrap();

    cli(&dir)
        .arg(&input)
        .arg("--no-translate")
        .arg("-o")
        .arg("out/%stem%.json")
        .assert()
        .success();

    assert!(dir.path().join("out/paper.json").exists());
}

#[test]
fn test_missing_input_fails() {
    let dir = TempDir::new().unwrap();

    cli(&dir)
        .arg("absent_content_list.json")
        .arg("--no-translate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent_content_list.json"));
}

#[test]
fn test_translation_without_key_fails() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("paper_content_list.json");
    fs::write(&input, sample_content_list()).unwrap();

    cli(&dir).arg(&input).assert().failure();
    assert!(!dir.path().join("paper.translated.json").exists());
}

#[test]
fn test_invalid_batch_size_fails() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("paper_content_list.json");
    fs::write(&input, sample_content_list()).unwrap();

    cli(&dir)
        .arg(&input)
        .arg("--no-translate")
        .arg("--batch-size")
        .arg("0")
        .assert()
        .failure();
}

#[test]
fn test_excessive_concurrency_fails() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("paper_content_list.json");
    fs::write(&input, sample_content_list()).unwrap();

    cli(&dir)
        .arg(&input)
        .arg("--no-translate")
        .arg("--concurrency")
        .arg("18446744073709551615")
        .assert()
        .failure();
}

#[test]
fn test_env_docs() {
    let dir = TempDir::new().unwrap();

    cli(&dir)
        .arg("--env-docs")
        .assert()
        .success()
        .stdout(predicate::str::contains("PAPER_BATCH_SIZE"));
}

#[test]
fn test_init_config() {
    let dir = TempDir::new().unwrap();

    cli(&dir)
        .arg("--init-config")
        .arg("translation-config.toml")
        .assert()
        .success();

    let content = fs::read_to_string(dir.path().join("translation-config.toml")).unwrap();
    assert!(content.contains("batch_size = 25"));
}
