use color_eyre::Result;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use nx_core::services::resolver;

use crate::cli::OutputFormat;
use crate::render;
use crate::workspace::Workspace;

/// Keep names that fuzzy-match `filter`, preserving their order.
pub fn filter_names(names: Vec<String>, filter: Option<&str>) -> Vec<String> {
    let Some(filter) = filter.filter(|f| !f.is_empty()) else {
        return names;
    };
    let matcher = SkimMatcherV2::default();
    names
        .into_iter()
        .filter(|name| matcher.fuzzy_match(name, filter).is_some())
        .collect()
}

pub async fn run(workspace: &Workspace, filter: Option<&str>, format: OutputFormat) -> Result<bool> {
    let (services, failures) = resolver::resolve_all(&workspace.registry).await?;
    let keep = filter_names(
        services.iter().map(|s| s.name().to_string()).collect(),
        filter,
    );
    let services: Vec<_> = services
        .into_iter()
        .filter(|s| keep.iter().any(|k| k == s.name()))
        .collect();
    let failures: Vec<_> = failures
        .into_iter()
        .filter(|(name, _)| !filter_names(vec![name.clone()], filter).is_empty())
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&services)?),
        OutputFormat::Table => println!("{}", render::service_table(&services)),
    }

    if !failures.is_empty() {
        eprint!("{}", render::failures(&failures));
    }
    Ok(failures.is_empty())
}
