//! Service-tree report.
//!
//! Builds the area → service name → service type → metric → probe version
//! tree a UI renders as a table with merged cells; `rowspan` at each node is
//! the number of probe-version leaves beneath it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::ops::store::TenantStore;

/// A metric leaf: metric name plus the probe version it resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricLeaf {
    pub metric: String,
    pub probeversion: String,
}

/// Service type node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavourNode {
    pub name: String,
    pub rowspan: usize,
    pub metrics: Vec<MetricLeaf>,
}

/// Service name node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceNode {
    pub name: String,
    pub rowspan: usize,
    pub flavours: Vec<FlavourNode>,
}

/// Service area node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaNode {
    pub name: String,
    pub rowspan: usize,
    pub services: Vec<ServiceNode>,
}

/// The full report tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceTree {
    pub areas: Vec<AreaNode>,
    pub rowspan: usize,
}

/// Build the service-tree report for one tenant.
///
/// For each service row, the distinct metrics bound to its service type via
/// metric instances are resolved against the tenant's local metrics; only
/// metrics carrying a probe key appear. Children are ordered by name at
/// every level.
pub fn service_tree(store: &TenantStore) -> ServiceTree {
    // area -> service name -> service type -> metric -> probe version
    let mut tree: BTreeMap<String, BTreeMap<String, BTreeMap<String, BTreeMap<String, String>>>> =
        BTreeMap::new();

    for service in &store.services {
        let bound: BTreeSet<&str> = store
            .instances
            .iter()
            .filter(|i| i.service_flavour == service.service_type)
            .map(|i| i.metric.as_str())
            .collect();

        let mut leaves: BTreeMap<String, String> = BTreeMap::new();
        for name in bound {
            if let Ok(metric) = store.get_metric(name) {
                if let Some(probekey) = &metric.probekey {
                    leaves.insert(metric.name.clone(), probekey.display());
                }
            }
        }
        if leaves.is_empty() {
            continue;
        }

        tree.entry(service.service_area.clone())
            .or_default()
            .entry(service.service_name.clone())
            .or_default()
            .entry(service.service_type.clone())
            .or_default()
            .extend(leaves);
    }

    let mut areas = Vec::new();
    let mut total = 0;
    for (area_name, services) in tree {
        let mut service_nodes = Vec::new();
        let mut area_rowspan = 0;
        for (service_name, flavours) in services {
            let mut flavour_nodes = Vec::new();
            let mut service_rowspan = 0;
            for (flavour_name, metrics) in flavours {
                let leaves: Vec<MetricLeaf> = metrics
                    .into_iter()
                    .map(|(metric, probeversion)| MetricLeaf {
                        metric,
                        probeversion,
                    })
                    .collect();
                let rowspan = leaves.len();
                service_rowspan += rowspan;
                flavour_nodes.push(FlavourNode {
                    name: flavour_name,
                    rowspan,
                    metrics: leaves,
                });
            }
            area_rowspan += service_rowspan;
            service_nodes.push(ServiceNode {
                name: service_name,
                rowspan: service_rowspan,
                flavours: flavour_nodes,
            });
        }
        total += area_rowspan;
        areas.push(AreaNode {
            name: area_name,
            rowspan: area_rowspan,
            services: service_nodes,
        });
    }

    ServiceTree {
        areas,
        rowspan: total,
    }
}
