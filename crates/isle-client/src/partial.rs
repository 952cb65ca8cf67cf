//! Partial response reconciliation
//!
//! A partial response is a full HTML document whose body holds only
//! partial regions. Each region is merged into the live instance that owns
//! the partial of the same name, and only that instance renders again.

use crate::page::read_props;
use crate::{collect_partials, merge_children, merge_head, ClientError, Host, ModuleLoader, Page};
use futures::future::try_join_all;
use isle_core::{IslandId, IslandSpec, Response};
use isle_dom::Document;
use isle_html::HtmlParser;
use std::fmt;

/// Progress of a partial merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartialPhase {
    #[default]
    Fetching,
    Parsed,
    Merging,
    Done,
}

impl fmt::Display for PartialPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PartialPhase::Fetching => "fetching",
            PartialPhase::Parsed => "parsed",
            PartialPhase::Merging => "merging",
            PartialPhase::Done => "done",
        })
    }
}

/// Outcome of [`apply_partials`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Partials merged into a live owner, in response order
    pub updated: Vec<String>,
    /// Partials without a live owner
    pub skipped: Vec<String>,
    pub phase: PartialPhase,
}

impl MergeReport {
    fn advance(&mut self, phase: PartialPhase) {
        tracing::debug!(from = %self.phase, to = %phase, "Partial phase");
        self.phase = phase;
    }
}

/// Merge a fetched partial response into a live page.
///
/// Island modules named by the response are loaded concurrently and
/// registered before any region is merged. Regions whose partial has no
/// live owner are skipped with a warning.
pub async fn apply_partials<H: Host>(
    page: &mut Page<H>,
    response: &Response,
    loader: &dyn ModuleLoader,
) -> Result<MergeReport, ClientError> {
    let mut report = MergeReport::default();
    tracing::debug!(status = response.status, phase = %report.phase, "Applying partial response");

    if !response.is_html() {
        return Err(ClientError::NotAPartialResponse(response.content_type().map(str::to_string)));
    }
    let body = response.text()?;
    let incoming = HtmlParser::new().parse_with_url(body, page.document.url())?;
    report.advance(PartialPhase::Parsed);

    preload_islands(page, &incoming, loader).await?;

    let props = read_props(&incoming, &page.config, &page.factories)?;
    let updates = collect_partials(&incoming, &page.islands, &props)?;
    if updates.is_empty() {
        return Err(ClientError::NoPartialsFound);
    }

    report.advance(PartialPhase::Merging);
    merge_head(&mut page.document, &incoming, &page.config)?;

    for update in updates {
        let Some(owner) = page.host.partial_owner(&update.name) else {
            tracing::warn!(partial = %update.name, "No live owner for partial, skipping");
            report.skipped.push(update.name);
            continue;
        };

        let current = page.host.partial_children(owner)?.to_vec();
        let merged = merge_children(&current, update.mode, update.content);
        page.host.set_partial_children(owner, merged)?;
        page.host.rerender(&mut page.document, owner)?;

        tracing::trace!(partial = %update.name, mode = %update.mode, instance = %owner, "Merged partial");
        report.updated.push(update.name);
    }

    report.advance(PartialPhase::Done);
    tracing::info!(
        updated = report.updated.len(),
        skipped = report.skipped.len(),
        "Partial merge complete"
    );
    Ok(report)
}

/// Load and register every island the response's registry block names
/// that the page does not know yet
async fn preload_islands<H: Host>(
    page: &mut Page<H>,
    incoming: &Document,
    loader: &dyn ModuleLoader,
) -> Result<(), ClientError> {
    let Some(block) = incoming.get_element_by_id(&page.config.islands_element_id) else {
        return Ok(());
    };
    let text = incoming.tree().text_content(block);
    let manifest: Vec<IslandSpec> =
        serde_json::from_str(&text).map_err(ClientError::InvalidManifest)?;

    let missing: Vec<(IslandId, String)> = manifest.into_iter()
        .filter(|spec| !page.islands.contains(&spec.island, &spec.export))
        .map(|spec| (spec.id(), spec.url))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }

    tracing::debug!(count = missing.len(), "Preloading island modules");
    let components = try_join_all(
        missing.iter().map(|(id, url)| loader.load(url, &id.export)),
    ).await?;

    for ((id, _), component) in missing.into_iter().zip(components) {
        page.islands.insert(id, component);
    }
    Ok(())
}
