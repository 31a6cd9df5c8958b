use std::fs;

use serde_json::json;
use tempfile::tempdir;

mod common;

use common::{
    assert_error_type, assert_success, copy_fixture, fixture_path, fixture_text, path_arg,
    run_websso, run_websso_with_env, stdout_json,
};

const CONFIGURED_SETTINGS: &str = r#"import os

from django.utils.translation import gettext_lazy as _

DEBUG = False



TIME_ZONE = "UTC"

WEBSSO_ENABLED = True

WEBSSO_CHOICES = (
    ("credentials", _("Keystone Credentials")),
    ("alpha", "alpha.example.org"),
    ("beta", "beta.example.org")
)

WEBSSO_IDP_MAPPING = {
    "alpha": ("kc-alpha", "saml2"),
    "beta": ("kc-beta", "saml2")
}

WEBSSO_INITIAL_CHOICE = "credentials"
"#;

#[test]
fn configure_rewrites_settings_from_idp_table() {
    let directory = tempdir().expect("tempdir should be created");
    let settings = copy_fixture(&directory, "local_settings.py");
    let table = fixture_path("idp_list.csv");

    let output = run_websso(&[
        "configure",
        "--settings",
        path_arg(&settings),
        "--idp-table",
        path_arg(&table),
        "--json",
    ]);
    assert_success(&output);

    let response = stdout_json(&output);
    assert_eq!(response["providers_loaded"], 2);
    assert_eq!(response["dry_run"], false);
    assert_eq!(
        response["message"],
        "Horizon SSO configuration updated successfully."
    );

    let steps = response["steps"].as_array().expect("steps should be an array");
    let summary = steps
        .iter()
        .map(|step| (step["entry"].clone(), step["action"].clone()))
        .collect::<Vec<_>>();
    assert_eq!(
        summary,
        vec![
            (json!("WEBSSO_ENABLED"), json!("added")),
            (json!("WEBSSO_CHOICES"), json!("replaced")),
            (json!("WEBSSO_IDP_MAPPING"), json!("replaced")),
            (json!("WEBSSO_INITIAL_CHOICE"), json!("added")),
        ]
    );
    assert_eq!(steps[1]["previous_span"], json!({"start": 6, "end": 9}));
    assert_eq!(steps[2]["previous_span"], json!({"start": 7, "end": 9}));
    assert!(steps.iter().all(|step| step["written"] == true));

    let written = fs::read_to_string(&settings).expect("settings should be readable");
    assert_eq!(written, CONFIGURED_SETTINGS);
}

#[test]
fn configure_twice_keeps_single_definitions() {
    let directory = tempdir().expect("tempdir should be created");
    let settings = copy_fixture(&directory, "local_settings.py");
    let table = fixture_path("idp_list.csv");
    let args = [
        "configure",
        "--settings",
        path_arg(&settings),
        "--idp-table",
        path_arg(&table),
        "--json",
    ];

    assert_success(&run_websso(&args));
    let output = run_websso(&args);
    assert_success(&output);

    let response = stdout_json(&output);
    assert_eq!(response["steps"][0]["action"], "already_present");
    assert_eq!(response["steps"][0]["written"], false);
    assert_eq!(response["steps"][1]["action"], "replaced");
    assert_eq!(
        response["steps"][1]["previous_span"],
        json!({"start": 12, "end": 16})
    );
    assert_eq!(response["steps"][3]["action"], "already_present");

    let written = fs::read_to_string(&settings).expect("settings should be readable");
    for entry in [
        "WEBSSO_ENABLED =",
        "WEBSSO_CHOICES =",
        "WEBSSO_IDP_MAPPING =",
        "WEBSSO_INITIAL_CHOICE =",
    ] {
        assert_eq!(written.matches(entry).count(), 1, "{entry} should appear once");
    }
    assert!(!written.contains("old_idp"));
    assert!(!written.contains("OpenID Connect"));
}

#[test]
fn configure_text_output_reports_each_step() {
    let directory = tempdir().expect("tempdir should be created");
    let settings = copy_fixture(&directory, "local_settings.py");
    let table = fixture_path("idp_list.csv");

    let output = run_websso(&[
        "configure",
        "--settings",
        path_arg(&settings),
        "--idp-table",
        path_arg(&table),
    ]);
    assert_success(&output);

    let text = String::from_utf8(output.stdout).expect("stdout should be utf-8");
    assert!(text.contains("WEBSSO_ENABLED: added"));
    assert!(text.contains("WEBSSO_CHOICES: replaced (previous definition at lines 7-10)"));
    assert!(text.contains("WEBSSO_IDP_MAPPING: replaced (previous definition at lines 8-10)"));
    assert!(
        text.trim_end()
            .ends_with("Horizon SSO configuration updated successfully.")
    );
}

#[test]
fn configure_reads_paths_from_environment() {
    let directory = tempdir().expect("tempdir should be created");
    let settings = copy_fixture(&directory, "local_settings.py");
    let table = fixture_path("idp_list.csv");

    let output = run_websso_with_env(
        &["configure", "--json"],
        &[
            ("WEBSSO_SETTINGS_PATH", settings.as_path()),
            ("WEBSSO_IDP_TABLE", table.as_path()),
        ],
    );
    assert_success(&output);

    let written = fs::read_to_string(&settings).expect("settings should be readable");
    assert_eq!(written, CONFIGURED_SETTINGS);
}

#[test]
fn configure_dry_run_leaves_file_untouched_and_predicts_hash() {
    let directory = tempdir().expect("tempdir should be created");
    let settings = copy_fixture(&directory, "local_settings.py");
    let table = fixture_path("idp_list.csv");
    let before = fs::read_to_string(&settings).expect("settings should be readable");

    let preview = run_websso(&[
        "configure",
        "--settings",
        path_arg(&settings),
        "--idp-table",
        path_arg(&table),
        "--dry-run",
        "--json",
    ]);
    assert_success(&preview);
    let preview = stdout_json(&preview);
    assert_eq!(preview["dry_run"], true);
    assert_eq!(
        preview["message"],
        "Dry run: Horizon SSO configuration was not written."
    );
    assert!(
        preview["steps"]
            .as_array()
            .expect("steps should be an array")
            .iter()
            .all(|step| step["written"] == false)
    );
    assert_eq!(
        fs::read_to_string(&settings).expect("settings should be readable"),
        before
    );

    let applied = run_websso(&[
        "configure",
        "--settings",
        path_arg(&settings),
        "--idp-table",
        path_arg(&table),
        "--json",
    ]);
    assert_success(&applied);
    assert_eq!(stdout_json(&applied)["content_hash"], preview["content_hash"]);
}

#[test]
fn configure_with_empty_table_skips_initial_choice() {
    let directory = tempdir().expect("tempdir should be created");
    let settings = copy_fixture(&directory, "local_settings.py");
    let table = directory.path().join("empty.csv");
    fs::write(&table, "idp_horizon_name;idp_keystone_name;fqdn\n")
        .expect("table write should succeed");

    let output = run_websso(&[
        "configure",
        "--settings",
        path_arg(&settings),
        "--idp-table",
        path_arg(&table),
        "--json",
    ]);
    assert_success(&output);

    let response = stdout_json(&output);
    assert_eq!(response["providers_loaded"], 0);
    assert_eq!(
        response["steps"]
            .as_array()
            .expect("steps should be an array")
            .len(),
        3
    );

    let written = fs::read_to_string(&settings).expect("settings should be readable");
    assert!(!written.contains("WEBSSO_INITIAL_CHOICE"));
    assert!(written.ends_with("WEBSSO_IDP_MAPPING = {\n    \n}\n"));
    assert!(written.contains(
        "WEBSSO_CHOICES = (\n    (\"credentials\", _(\"Keystone Credentials\"))\n)\n"
    ));
}

#[test]
fn configure_with_malformed_table_does_not_touch_settings() {
    let directory = tempdir().expect("tempdir should be created");
    let settings = copy_fixture(&directory, "local_settings.py");
    let table = fixture_path("idp_list_malformed.csv");

    let output = run_websso(&[
        "configure",
        "--settings",
        path_arg(&settings),
        "--idp-table",
        path_arg(&table),
    ]);
    let response = assert_error_type(&output, "malformed_record");
    assert!(
        response["error"]["message"]
            .as_str()
            .expect("message should be a string")
            .contains("line 3"),
        "unexpected message: {}",
        response["error"]["message"]
    );

    assert_eq!(
        fs::read_to_string(&settings).expect("settings should be readable"),
        fixture_text("local_settings.py")
    );
}

#[test]
fn configure_reports_missing_settings_file() {
    let directory = tempdir().expect("tempdir should be created");
    let settings = directory.path().join("absent_settings.py");
    let table = fixture_path("idp_list.csv");

    let output = run_websso(&[
        "configure",
        "--settings",
        path_arg(&settings),
        "--idp-table",
        path_arg(&table),
    ]);
    assert_error_type(&output, "missing_file");
    assert!(!settings.exists());
}

#[test]
fn configure_reports_missing_idp_table() {
    let directory = tempdir().expect("tempdir should be created");
    let settings = copy_fixture(&directory, "local_settings.py");
    let table = directory.path().join("absent.csv");

    let output = run_websso(&[
        "configure",
        "--settings",
        path_arg(&settings),
        "--idp-table",
        path_arg(&table),
    ]);
    assert_error_type(&output, "missing_file");
    assert_eq!(
        fs::read_to_string(&settings).expect("settings should be readable"),
        fixture_text("local_settings.py")
    );
}

#[test]
fn configure_honors_profile_and_delimiter_override() {
    let directory = tempdir().expect("tempdir should be created");
    let settings = copy_fixture(&directory, "local_settings.py");
    let table = directory.path().join("idp_list.csv");
    fs::write(
        &table,
        "fqdn,idp_keystone_name,idp_horizon_name\nsso.example.org,kc-sso,sso\n",
    )
    .expect("table write should succeed");
    let profile = directory.path().join("profile.toml");
    fs::write(
        &profile,
        "protocol = \"openid\"\ntranslate_credentials_label = false\n",
    )
    .expect("profile write should succeed");

    let output = run_websso(&[
        "configure",
        "--settings",
        path_arg(&settings),
        "--idp-table",
        path_arg(&table),
        "--profile",
        path_arg(&profile),
        "--delimiter",
        ",",
        "--json",
    ]);
    assert_success(&output);

    let written = fs::read_to_string(&settings).expect("settings should be readable");
    assert!(written.contains("    (\"credentials\", \"Keystone Credentials\"),\n"));
    assert!(written.contains("    (\"sso\", \"sso.example.org\")\n"));
    assert!(written.contains("    \"sso\": (\"kc-sso\", \"openid\")\n"));
}

#[test]
fn configure_rejects_invalid_profile() {
    let directory = tempdir().expect("tempdir should be created");
    let settings = copy_fixture(&directory, "local_settings.py");
    let table = fixture_path("idp_list.csv");
    let profile = directory.path().join("profile.toml");
    fs::write(&profile, "unknown_key = true\n").expect("profile write should succeed");

    let output = run_websso(&[
        "configure",
        "--settings",
        path_arg(&settings),
        "--idp-table",
        path_arg(&table),
        "--profile",
        path_arg(&profile),
    ]);
    assert_error_type(&output, "invalid_profile");
    assert_eq!(
        fs::read_to_string(&settings).expect("settings should be readable"),
        fixture_text("local_settings.py")
    );
}

#[test]
fn render_prints_generated_literals() {
    let table = fixture_path("idp_list.csv");

    let output = run_websso(&["render", "--idp-table", path_arg(&table)]);
    assert_success(&output);

    let text = String::from_utf8(output.stdout).expect("stdout should be utf-8");
    assert_eq!(
        text,
        "WEBSSO_CHOICES = (\n    (\"credentials\", _(\"Keystone Credentials\")),\n    (\"alpha\", \"alpha.example.org\"),\n    (\"beta\", \"beta.example.org\")\n)\n\nWEBSSO_IDP_MAPPING = {\n    \"alpha\": (\"kc-alpha\", \"saml2\"),\n    \"beta\": (\"kc-beta\", \"saml2\")\n}\n"
    );
}

#[test]
fn render_json_lists_records_by_column_name() {
    let table = fixture_path("idp_list.csv");

    let output = run_websso(&["render", "--idp-table", path_arg(&table), "--json"]);
    assert_success(&output);

    let response = stdout_json(&output);
    assert_eq!(
        response["records"][1],
        json!({
            "idp_horizon_name": "beta",
            "idp_keystone_name": "kc-beta",
            "fqdn": "beta.example.org"
        })
    );
    assert!(
        response["mapping"]
            .as_str()
            .expect("mapping should be a string")
            .starts_with("{\n")
    );
}
