use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

static HOST_RULE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Host\(`([^`]+)`\)").unwrap());

static DOMAIN_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{DOMAIN[^}]*\}").unwrap());

const DESCRIPTION_LABEL: &str = "homepage.description";
const DOMAIN_PLACEHOLDER: &str = "DOMAIN";

/// Compose `labels`, which may be written as a mapping or as a list of `key=value`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(untagged)]
pub enum Labels {
    #[default]
    Empty,
    Map(serde_yaml::Mapping),
    List(Vec<String>),
}

impl Labels {
    /// Key/value pairs in declaration order.
    pub fn pairs(&self) -> Vec<(String, String)> {
        match self {
            Labels::Empty => Vec::new(),
            Labels::Map(map) => map
                .iter()
                .filter_map(|(k, v)| Some((scalar_to_string(k)?, scalar_to_string(v)?)))
                .collect(),
            Labels::List(items) => items
                .iter()
                .filter_map(|item| {
                    let (key, value) = item.split_once('=').or_else(|| item.split_once(':'))?;
                    Some((key.trim().to_string(), value.trim().to_string()))
                })
                .collect(),
        }
    }
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Human description from the `homepage.description` label, or empty.
pub fn description(labels: &Labels) -> String {
    labels
        .pairs()
        .into_iter()
        .find(|(key, _)| key == DESCRIPTION_LABEL)
        .map(|(_, value)| value)
        .unwrap_or_default()
}

/// Text of a `# comment` on the line directly above the `key:` line, for
/// manifests that describe services in comments rather than labels.
///
/// A leading list marker is dropped; `#!` lines and empty comments do not count.
pub fn comment_above(content: &str, key: &str) -> Option<String> {
    let header = format!("{key}:");
    let lines: Vec<&str> = content.lines().collect();
    let idx = lines.iter().position(|line| {
        let trimmed = line.trim_start();
        line.len() > trimmed.len() && trimmed.starts_with(&header)
    })?;
    let above = lines.get(idx.checked_sub(1)?)?.trim();
    let comment = above.strip_prefix('#')?.trim();
    let comment = comment
        .strip_prefix("- ")
        .or_else(|| comment.strip_prefix("* "))
        .unwrap_or(comment)
        .trim();
    (!comment.is_empty() && !comment.starts_with('!')).then(|| comment.to_string())
}

/// Public URL from the first Traefik router rule carrying a `Host(...)` matcher.
pub fn public_url(labels: &Labels) -> Option<String> {
    labels
        .pairs()
        .into_iter()
        .filter(|(key, _)| key.contains("traefik.http.routers") && key.contains(".rule"))
        .find_map(|(_, rule)| {
            let caps = HOST_RULE_RE.captures(&rule)?;
            let host = DOMAIN_VAR_RE.replace_all(&caps[1], DOMAIN_PLACEHOLDER);
            Some(format!("https://{host}"))
        })
}
