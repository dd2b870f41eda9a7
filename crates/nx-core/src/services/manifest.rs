use std::path::Path;

use serde::Deserialize;

use crate::error::{NexusError, Result};
use crate::models::{ManifestEntry, RootManifest};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// An `include:` item in either the short (`- path`) or long (`- path: ...`) form.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IncludeItem {
    Short(String),
    Long {
        path: OneOrMany,
        #[serde(default)]
        env_file: Option<OneOrMany>,
    },
}

fn invalid(reason: impl Into<String>) -> NexusError {
    NexusError::InvalidManifest(reason.into())
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Index of the top-level `include:` key, if any.
fn find_include(lines: &[String]) -> Result<Option<usize>> {
    for (idx, line) in lines.iter().enumerate() {
        let Some(rest) = line.strip_prefix("include:") else {
            continue;
        };
        let rest = rest.trim();
        if rest.is_empty() || rest.starts_with('#') {
            return Ok(Some(idx));
        }
        return Err(invalid(format!(
            "line {}: inline include lists are not supported",
            idx + 1
        )));
    }
    Ok(None)
}

/// Decode the typed fields of one include item from its original lines.
fn decode_item(raw: &[String], indent: usize) -> Result<(String, Vec<String>)> {
    let text = raw
        .iter()
        .map(|line| match line.get(..indent) {
            Some(prefix) if prefix.trim().is_empty() => &line[indent..],
            _ => line.trim_start(),
        })
        .collect::<Vec<_>>()
        .join("\n");

    let first = raw.first().map(|l| l.trim()).unwrap_or_default();
    let mut items: Vec<IncludeItem> = serde_yaml::from_str(&text)
        .map_err(|e| invalid(format!("include item '{first}': {e}")))?;
    if items.len() != 1 {
        return Err(invalid(format!(
            "include item '{first}' must be a single list entry"
        )));
    }

    match items.remove(0) {
        IncludeItem::Short(path) => Ok((path, Vec::new())),
        IncludeItem::Long { path, env_file } => {
            let path = path
                .into_vec()
                .into_iter()
                .next()
                .ok_or_else(|| invalid(format!("include item '{first}' has an empty path")))?;
            Ok((path, env_file.map(OneOrMany::into_vec).unwrap_or_default()))
        }
    }
}

fn render_entry(entry: &ManifestEntry, indent: usize) -> Vec<String> {
    let pad = " ".repeat(indent);
    let mut lines = vec![format!("{pad}- path: {}", entry.path)];
    if !entry.env_files.is_empty() {
        lines.push(format!("{pad}  env_file:"));
        for env_file in &entry.env_files {
            lines.push(format!("{pad}    - {env_file}"));
        }
    }
    lines
}

struct OpenItem {
    leading: Vec<String>,
    raw: Vec<String>,
}

impl RootManifest {
    /// Split manifest text around its top-level `include:` block.
    ///
    /// Comment and blank lines directly above an item belong to that item;
    /// those after the last item belong to the trailer.
    pub fn parse(text: &str) -> Result<Self> {
        let lines: Vec<String> = text.lines().map(str::to_string).collect();
        let mut manifest = RootManifest {
            trailing_newline: text.is_empty() || text.ends_with('\n'),
            line_ending: if text.contains("\r\n") { "\r\n" } else { "\n" },
            ..Default::default()
        };

        let Some(include_idx) = find_include(&lines)? else {
            manifest.preamble = lines;
            return Ok(manifest);
        };
        manifest.preamble = lines[..include_idx].to_vec();
        manifest.include_line = Some(lines[include_idx].clone());

        let mut pending: Vec<String> = Vec::new();
        let mut items: Vec<OpenItem> = Vec::new();
        let mut item_indent: Option<usize> = None;
        let mut end = lines.len();

        for (idx, line) in lines.iter().enumerate().skip(include_idx + 1) {
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                pending.push(line.clone());
                continue;
            }
            let indent = indent_of(line);
            let is_marker = trimmed == "-" || trimmed.starts_with("- ");
            if indent == 0 && !is_marker {
                end = idx;
                break;
            }

            match item_indent {
                None if is_marker => {
                    item_indent = Some(indent);
                    items.push(OpenItem {
                        leading: std::mem::take(&mut pending),
                        raw: vec![line.clone()],
                    });
                }
                None => {
                    return Err(invalid(format!(
                        "line {}: include must be a list",
                        idx + 1
                    )))
                }
                Some(col) if indent == col && is_marker => {
                    items.push(OpenItem {
                        leading: std::mem::take(&mut pending),
                        raw: vec![line.clone()],
                    });
                }
                Some(col) if indent > col => {
                    let item = items.last_mut().ok_or_else(|| {
                        invalid(format!("line {}: continuation without an item", idx + 1))
                    })?;
                    item.raw.append(&mut pending);
                    item.raw.push(line.clone());
                }
                Some(_) => {
                    return Err(invalid(format!(
                        "line {}: unexpected indentation in include block",
                        idx + 1
                    )))
                }
            }
        }

        let col = item_indent.unwrap_or(manifest.item_indent);
        manifest.item_indent = col;
        for item in items {
            let (path, env_files) = decode_item(&item.raw, col)?;
            manifest.entries.push(ManifestEntry {
                path,
                env_files,
                leading: item.leading,
                raw: Some(item.raw),
            });
        }

        pending.extend(lines[end..].iter().cloned());
        manifest.trailer = pending;
        Ok(manifest)
    }

    /// Serialize back to text. Entries read from disk are emitted verbatim.
    pub fn render(&self) -> String {
        let mut lines = self.preamble.clone();
        if self.include_line.is_some() || !self.entries.is_empty() {
            lines.push(
                self.include_line
                    .clone()
                    .unwrap_or_else(|| "include:".to_string()),
            );
            for entry in &self.entries {
                lines.extend(entry.leading.iter().cloned());
                match &entry.raw {
                    Some(raw) => lines.extend(raw.iter().cloned()),
                    None => lines.extend(render_entry(entry, self.item_indent)),
                }
            }
        }
        lines.extend(self.trailer.iter().cloned());

        let mut out = lines.join(self.line_ending);
        if self.trailing_newline && !out.is_empty() {
            out.push_str(self.line_ending);
        }
        out
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.path.as_str())
    }

    /// Insert before the first tracked entry whose service name sorts after
    /// `name`, or right after the last tracked entry.
    pub fn insert_sorted<F>(&mut self, entry: ManifestEntry, name: &str, service_of: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut last_tracked = None;
        let mut position = None;
        for (idx, existing) in self.entries.iter().enumerate() {
            if let Some(existing_name) = service_of(&existing.path) {
                if existing_name.as_str() > name {
                    position = Some(idx);
                    break;
                }
                last_tracked = Some(idx);
            }
        }
        let index = position
            .or(last_tracked.map(|idx| idx + 1))
            .unwrap_or(self.entries.len());
        self.entries.insert(index, entry);
    }

    /// Remove every entry whose path is exactly `path`. Returns how many were removed.
    pub fn remove_path(&mut self, path: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.path != path);
        before - self.entries.len()
    }
}

/// Read and parse the root manifest; a missing file is `ManifestNotFound`.
pub async fn read(path: &Path) -> Result<(String, RootManifest)> {
    if !path.exists() {
        return Err(NexusError::ManifestNotFound(path.to_path_buf()));
    }
    let text = tokio::fs::read_to_string(path).await?;
    let manifest = RootManifest::parse(&text)?;
    Ok((text, manifest))
}

/// Write the whole manifest back, only if its rendered text differs from `original`.
pub async fn write_if_changed(path: &Path, original: &str, manifest: &RootManifest) -> Result<bool> {
    let rendered = manifest.render();
    if rendered == original {
        return Ok(false);
    }
    tokio::fs::write(path, rendered).await?;
    tracing::debug!("rewrote {}", path.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
name: homelab

# core services
include:
  # reverse proxy
  - path: stacks/alpha/compose.yaml
    env_file:
      - .env
      - stacks/alpha/.env
  - path: stacks/gamma/compose.yaml
    env_file:
      - .env
  - extras/monitoring.yaml

networks:
  proxy:
    external: true
";

    fn service_of(path: &str) -> Option<String> {
        let rest = path.strip_prefix("stacks/")?;
        rest.split_once('/').map(|(name, _)| name.to_string())
    }

    #[test]
    fn parse_render_is_identity() {
        let manifest = RootManifest::parse(SAMPLE).unwrap();
        assert_eq!(manifest.render(), SAMPLE);
    }

    #[test]
    fn parse_extracts_typed_entries() {
        let manifest = RootManifest::parse(SAMPLE).unwrap();
        assert_eq!(manifest.entries.len(), 3);
        assert_eq!(manifest.entries[0].path, "stacks/alpha/compose.yaml");
        assert_eq!(
            manifest.entries[0].env_files,
            vec![".env", "stacks/alpha/.env"]
        );
        assert_eq!(manifest.entries[0].leading, vec!["  # reverse proxy"]);
        assert_eq!(manifest.entries[2].path, "extras/monitoring.yaml");
        assert!(manifest.entries[2].env_files.is_empty());
        assert_eq!(manifest.preamble, vec!["name: homelab", "", "# core services"]);
        assert_eq!(manifest.trailer[0], "");
        assert_eq!(manifest.trailer[1], "networks:");
    }

    #[test]
    fn single_env_file_and_path_list() {
        let text = "include:\n- path:\n    - stacks/a/compose.yaml\n    - stacks/a/extra.yaml\n  env_file: .env\n";
        let manifest = RootManifest::parse(text).unwrap();
        assert_eq!(manifest.item_indent, 0);
        assert_eq!(manifest.entries[0].path, "stacks/a/compose.yaml");
        assert_eq!(manifest.entries[0].env_files, vec![".env"]);
        assert_eq!(manifest.render(), text);
    }

    #[test]
    fn file_without_include_round_trips() {
        let text = "services:\n  web:\n    image: nginx\n";
        let manifest = RootManifest::parse(text).unwrap();
        assert!(manifest.include_line.is_none());
        assert!(manifest.entries.is_empty());
        assert_eq!(manifest.render(), text);
    }

    #[test]
    fn missing_trailing_newline_is_preserved() {
        let text = "include:\n  - path: stacks/a/compose.yaml";
        let manifest = RootManifest::parse(text).unwrap();
        assert_eq!(manifest.render(), text);
    }

    #[test]
    fn crlf_line_endings_are_kept() {
        let text = SAMPLE.replace('\n', "\r\n");
        let mut manifest = RootManifest::parse(&text).unwrap();
        assert_eq!(manifest.line_ending, "\r\n");
        assert_eq!(manifest.entries[0].path, "stacks/alpha/compose.yaml");
        assert_eq!(manifest.entries[0].env_files, vec![".env", "stacks/alpha/.env"]);
        assert_eq!(manifest.render(), text);

        manifest.insert_sorted(
            ManifestEntry::new("stacks/beta/compose.yaml", vec![".env".into()]),
            "beta",
            service_of,
        );
        let rendered = manifest.render();
        assert!(rendered.contains("  - path: stacks/beta/compose.yaml\r\n    env_file:\r\n      - .env\r\n"));
        assert!(!rendered.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn inline_include_is_rejected() {
        let err = RootManifest::parse("include: [a.yaml]\n").unwrap_err();
        assert!(matches!(err, NexusError::InvalidManifest(_)));
    }

    #[test]
    fn non_list_include_is_rejected() {
        let err = RootManifest::parse("include:\n  path: a.yaml\n").unwrap_err();
        assert!(matches!(err, NexusError::InvalidManifest(_)));
    }

    #[test]
    fn insert_sorted_places_entry_by_name() {
        let mut manifest = RootManifest::parse(SAMPLE).unwrap();
        manifest.insert_sorted(
            ManifestEntry::new("stacks/beta/compose.yaml", vec![".env".into()]),
            "beta",
            service_of,
        );
        manifest.insert_sorted(
            ManifestEntry::new("stacks/zulu/compose.yaml", vec![".env".into()]),
            "zulu",
            service_of,
        );
        let paths: Vec<_> = manifest.paths().collect();
        assert_eq!(
            paths,
            vec![
                "stacks/alpha/compose.yaml",
                "stacks/beta/compose.yaml",
                "stacks/gamma/compose.yaml",
                "stacks/zulu/compose.yaml",
                "extras/monitoring.yaml",
            ]
        );
        let rendered = manifest.render();
        assert!(rendered.contains(
            "      - stacks/alpha/.env\n  - path: stacks/beta/compose.yaml\n    env_file:\n      - .env\n  - path: stacks/gamma/compose.yaml\n"
        ));
    }

    #[test]
    fn insert_into_empty_manifest_creates_include_block() {
        let mut manifest = RootManifest::parse("name: homelab\n").unwrap();
        manifest.insert_sorted(
            ManifestEntry::new("stacks/a/compose.yaml", vec![".env".into()]),
            "a",
            service_of,
        );
        assert_eq!(
            manifest.render(),
            "name: homelab\ninclude:\n  - path: stacks/a/compose.yaml\n    env_file:\n      - .env\n"
        );
    }

    #[test]
    fn remove_path_drops_item_and_its_comments_only() {
        let mut manifest = RootManifest::parse(SAMPLE).unwrap();
        assert_eq!(manifest.remove_path("stacks/alpha/compose.yaml"), 1);
        assert_eq!(manifest.remove_path("stacks/alpha/compose.yaml"), 0);
        let rendered = manifest.render();
        assert!(!rendered.contains("alpha"));
        assert!(!rendered.contains("# reverse proxy"));
        assert!(rendered.contains("  - path: stacks/gamma/compose.yaml\n    env_file:\n      - .env\n"));
        assert!(rendered.contains("networks:\n  proxy:\n    external: true\n"));
    }

    #[test]
    fn add_then_remove_is_byte_identical() {
        let mut manifest = RootManifest::parse(SAMPLE).unwrap();
        manifest.insert_sorted(
            ManifestEntry::new("stacks/beta/compose.yaml", vec![".env".into()]),
            "beta",
            service_of,
        );
        let reparsed = RootManifest::parse(&manifest.render()).unwrap();
        let mut manifest = reparsed;
        manifest.remove_path("stacks/beta/compose.yaml");
        assert_eq!(manifest.render(), SAMPLE);
    }

    #[tokio::test]
    async fn write_skips_unchanged_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compose.yaml");
        std::fs::write(&path, SAMPLE).unwrap();

        let (text, manifest) = read(&path).await.unwrap();
        assert!(!write_if_changed(&path, &text, &manifest).await.unwrap());
    }

    #[tokio::test]
    async fn read_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let err = read(&dir.path().join("compose.yaml")).await.unwrap_err();
        assert!(matches!(err, NexusError::ManifestNotFound(_)));
    }
}
