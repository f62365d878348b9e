use clap::CommandFactory;
use serde_json::json;

use super::*;

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn global_flags_parse_after_subcommand() {
    let cli = Cli::try_parse_from(["topodot", "render", "dc.yaml", "--rankdir", "lr", "-vv", "--no-ports"]).unwrap();
    let overrides = cli.overrides();
    assert_eq!(overrides.rankdir, Some(RankDir::LeftRight));
    assert_eq!(overrides.verbose, 2);
    assert!(overrides.no_ports);
    assert!(matches!(cli.command, Command::Render(RenderArgs { ref input, .. }) if input == Path::new("dc.yaml")));
}

#[test]
fn unknown_rankdir_is_rejected() {
    assert!(Cli::try_parse_from(["topodot", "classify", "dc.yaml", "--rankdir", "sideways"]).is_err());
}

#[test]
fn batch_requires_inputs() {
    assert!(Cli::try_parse_from(["topodot", "batch", "--out-dir", "out"]).is_err());
}

#[test]
fn id_map_report_omits_dot() {
    let document = json!({"sites": [{"id": "tokyo", "label": "Tokyo DC"}]});
    let generated = topology::generate(&document, &RenderOptions::default()).unwrap();
    let report: serde_json::Value = serde_json::from_str(&id_map_json(&generated).unwrap()).unwrap();

    assert_eq!(report["kind"], "site_topology");
    assert_eq!(report["nodeIds"]["tokyo"]["label"], "Tokyo DC");
    assert!(report["diagnostics"].as_array().unwrap().is_empty());
    assert!(report.get("dot").is_none());
}

#[test]
fn warnings_only_fail_when_denied() {
    assert!(check_warnings(3, false).is_ok());
    assert!(check_warnings(0, true).is_ok());
    assert!(matches!(check_warnings(2, true), Err(CliError::DeniedWarnings { count: 2 })));
}
