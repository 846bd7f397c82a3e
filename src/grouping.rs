use std::collections::BTreeMap;

use crate::coverage::{ProjectCoverage, ProjectGroup};

/// Partitions records by parent label.
///
/// Groups come back sorted by label; members keep the order in which they
/// were passed in. Metrics are not combined across members.
pub fn group_by_parent(records: Vec<ProjectCoverage>) -> Vec<ProjectGroup> {
    let mut clusters: BTreeMap<String, Vec<ProjectCoverage>> = BTreeMap::new();
    for record in records {
        clusters
            .entry(record.project.parent_label().to_owned())
            .or_default()
            .push(record);
    }

    clusters
        .into_iter()
        .map(|(parent, projects)| ProjectGroup { parent, projects })
        .collect()
}
