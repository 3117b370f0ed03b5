//! Wire documents of the profile-synchronization web API.

use metricat_core::ops::FetchedProfile;
use serde::{Deserialize, Serialize};

/// One service group inside a profile: a service type and its metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEntry {
    pub service: String,
    pub metrics: Vec<String>,
}

/// A profile as stored in the web API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDocument {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub services: Vec<ServiceEntry>,
}

impl ProfileDocument {
    /// True if any service group lists the metric.
    pub fn contains_metric(&self, name: &str) -> bool {
        self.services
            .iter()
            .any(|entry| entry.metrics.iter().any(|m| m == name))
    }

    /// Rewrite every occurrence of `old` to `new`.
    ///
    /// Returns true if the document changed; renaming to the same name or
    /// a name that does not occur changes nothing.
    pub fn rename_metric(&mut self, old: &str, new: &str) -> bool {
        if old == new {
            return false;
        }
        let mut changed = false;
        for entry in &mut self.services {
            for metric in &mut entry.metrics {
                if metric == old {
                    *metric = new.to_string();
                    changed = true;
                }
            }
        }
        changed
    }

    /// Strip the given metrics from every service group and drop groups
    /// left without metrics. Returns true if the document changed.
    pub fn remove_metrics(&mut self, metrics: &[String]) -> bool {
        let mut changed = false;
        for entry in &mut self.services {
            let before = entry.metrics.len();
            entry.metrics.retain(|m| !metrics.contains(m));
            changed |= entry.metrics.len() != before;
        }
        self.services.retain(|entry| !entry.metrics.is_empty());
        changed
    }

    /// Flatten into the reduced form the local store mirrors.
    pub fn to_fetched(&self) -> FetchedProfile {
        let mut instances = Vec::new();
        for entry in &self.services {
            for metric in &entry.metrics {
                instances.push((entry.service.clone(), metric.clone()));
            }
        }
        FetchedProfile {
            apiid: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            metricinstances: instances,
        }
    }
}

/// List response wrapper: the API nests profile rows under `data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileList {
    pub data: Vec<ProfileDocument>,
}
