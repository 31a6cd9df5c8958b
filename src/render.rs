use crate::idp::IdentityProviderRecord;
use crate::profile::SsoProfile;

pub const CREDENTIALS_CHOICE: &str = "credentials";

const ITEM_INDENT: &str = "    ";

/// Double-quoted Python string literal.
pub fn python_str(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// Renders the login-form choices as a tuple of `(key, label)` pairs, the
/// keystone credentials choice first, then one pair per record in table order.
pub fn render_choices(records: &[IdentityProviderRecord], profile: &SsoProfile) -> String {
    let credentials_label = if profile.translate_credentials_label {
        format!("_({})", python_str(&profile.credentials_label))
    } else {
        python_str(&profile.credentials_label)
    };

    let mut items = Vec::with_capacity(records.len() + 1);
    items.push(format!(
        "({}, {credentials_label})",
        python_str(CREDENTIALS_CHOICE)
    ));
    items.extend(records.iter().map(|record| {
        format!(
            "({}, {})",
            python_str(&record.horizon_name),
            python_str(&record.display_name)
        )
    }));

    render_multiline('(', &items, ')')
}

/// Collapses records into `(horizon_name, keystone_name)` pairs. A repeated key
/// keeps its first position and takes the later record's value.
pub fn idp_mapping(records: &[IdentityProviderRecord]) -> Vec<(&str, &str)> {
    let mut mapping: Vec<(&str, &str)> = Vec::with_capacity(records.len());
    for record in records {
        match mapping
            .iter()
            .position(|(key, _)| *key == record.horizon_name)
        {
            Some(index) => mapping[index].1 = record.keystone_name.as_str(),
            None => mapping.push((record.horizon_name.as_str(), record.keystone_name.as_str())),
        }
    }
    mapping
}

pub fn render_idp_mapping(records: &[IdentityProviderRecord], profile: &SsoProfile) -> String {
    let protocol = python_str(&profile.protocol);
    let items = idp_mapping(records)
        .into_iter()
        .map(|(key, keystone_name)| {
            format!(
                "{}: ({}, {protocol})",
                python_str(key),
                python_str(keystone_name)
            )
        })
        .collect::<Vec<_>>();

    render_multiline('{', &items, '}')
}

// The opener stays on the assignment line and the closer on its own line, the
// only shape the locator can find again.
fn render_multiline(open: char, items: &[String], close: char) -> String {
    let separator = format!(",\n{ITEM_INDENT}");
    format!("{open}\n{ITEM_INDENT}{}\n{close}", items.join(separator.as_str()))
}
