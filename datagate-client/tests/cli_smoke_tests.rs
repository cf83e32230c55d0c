use clap::Parser;
use datagate_client::cli::{self, Cli, CliError};
use datagate_client::{DataAccess, ErrorKind};
use datagate_core::DataGateConfig;
use datagate_test_utils::fixtures;
use serde_json::json;
use std::path::{Path, PathBuf};

const ORDER_FILTERS: &str = "[[filters.orders]]\nname = \"status\"\ntype = \"select\"\n\n";

fn write_config_with(dir: &Path, filters: &str, extra: &str) -> PathBuf {
    let path = dir.join("datagate.toml");
    let contents = format!(
        "environment = \"production\"\nfixtures_dir = '{}'\n\n{filters}{extra}",
        dir.display()
    );
    std::fs::write(&path, contents).unwrap();
    path
}

fn write_config(dir: &Path, extra: &str) -> PathBuf {
    write_config_with(dir, ORDER_FILTERS, extra)
}

async fn run_line(line: &str) -> Result<serde_json::Value, CliError> {
    let cli = Cli::try_parse_from(std::iter::once("datagate").chain(line.split_whitespace()))
        .unwrap();
    let config = DataGateConfig::load(cli.config.as_deref())?;
    let access = DataAccess::from_config(config)?;
    cli::run(&access, cli.command).await
}

#[tokio::test]
async fn get_serves_fixture_page() {
    let dir = fixtures::fixture_dir(&[("orders", fixtures::orders())]);
    let config = write_config(dir.path(), "");

    let output = run_line(&format!(
        "--config {} get orders --filter status=Active --limit 3 --sort amount:desc",
        config.display()
    ))
    .await
    .unwrap();
    assert_eq!(output["total"], json!(10));
    assert_eq!(output["items"].as_array().map(Vec::len), Some(3));
    assert_eq!(output["nextCursor"], json!(3));
    assert_eq!(output["items"][0]["id"], json!(22));
}

#[tokio::test]
async fn undescribed_filter_matches_by_substring() {
    let dir = fixtures::fixture_dir(&[("orders", fixtures::orders())]);
    let config = write_config_with(dir.path(), "", "");

    // "Active" is also a substring of "Inactive".
    let output = run_line(&format!(
        "--config {} get orders --filter status=Active --limit 3 --sort amount:desc",
        config.display()
    ))
    .await
    .unwrap();
    assert_eq!(output["total"], json!(20));
    assert_eq!(output["items"][0]["id"], json!(24));
}

#[tokio::test]
async fn count_reports_local_total() {
    let dir = fixtures::fixture_dir(&[("orders", fixtures::orders())]);
    let config = write_config(dir.path(), "");

    let output = run_line(&format!(
        "--config {} count orders --filter status=Inactive",
        config.display()
    ))
    .await
    .unwrap();
    assert_eq!(output, json!({"section": "orders", "count": 10}));
}

#[tokio::test]
async fn resolve_prints_declared_url() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        "[base_urls]\nproduction = \"https://api.example.com\"\n\n\
         [endpoints.orders.production]\nendpoint = \"/v2/orders\"\n",
    );

    let output = run_line(&format!("--config {} resolve shop/orders count", config.display()))
        .await
        .unwrap();
    assert_eq!(
        output,
        json!({"section": "shop/orders", "url": "https://api.example.com/v2/orders/count"})
    );

    let output = run_line(&format!("--config {} resolve invoices", config.display()))
        .await
        .unwrap();
    assert_eq!(output["url"], json!(null));
}

#[tokio::test]
async fn missing_fixture_surfaces_data_access_error() {
    let dir = fixtures::fixture_dir(&[]);
    let config = write_config(dir.path(), "");

    let err = run_line(&format!("--config {} get orders", config.display()))
        .await
        .unwrap_err();
    match err {
        CliError::DataAccess(err) => assert_eq!(err.kind(), ErrorKind::FixtureNotFound),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unreadable_config_is_config_error() {
    let err = run_line("--config /nonexistent/datagate.toml get orders")
        .await
        .unwrap_err();
    assert!(matches!(err, CliError::Config(_)));
}
