//! Building dependency nodes from a Helm `Chart.yaml` (+ optional
//! `Chart.lock` for pinned versions).
//!
//! A chart's dependencies are already fully declared in `Chart.yaml` — there
//! is no separate native "resolve" step to shell out to, short of `helm
//! dependency update`, which only downloads, it does not change the
//! declared graph. Local subcharts (`file://` references) recurse by the
//! caller reading that subchart's own `Chart.yaml` and calling this
//! function again with the subchart's id as `parent_id`.

use buildinfo_manifest::helm::{ChartLock, ChartYaml};
use buildinfo_model::{Id, Scope};

use crate::ParsedNode;

pub fn build_helm_nodes(
    chart: &ChartYaml,
    lock: Option<&ChartLock>,
    parent_id: Option<Id>,
) -> Vec<ParsedNode> {
    chart
        .dependencies
        .iter()
        .map(|dep| {
            let version = lock
                .and_then(|l| l.dependencies.iter().find(|l| l.name == dep.name))
                .map(|locked| locked.version.clone())
                .unwrap_or_else(|| dep.version.clone());

            ParsedNode {
                id: Id(format!("{}:{}", dep.name, version)),
                name: dep.name.clone(),
                version,
                scope: Scope::Runtime,
                parent_id: parent_id.clone(),
                omitted_for_duplicate: false,
                checksum: None,
            }
        })
        .collect()
}
