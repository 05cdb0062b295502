//! Mapping from oracle groups to library capabilities

use std::collections::BTreeSet;

use crate::{config::GroupsConfig, models::identity::Capabilities};

#[derive(Debug, Clone)]
pub struct CapabilityMapper {
    groups: GroupsConfig,
}

impl CapabilityMapper {
    pub fn new(groups: GroupsConfig) -> Self {
        Self { groups }
    }

    /// Admin grants everything; each other capability needs its own group.
    pub fn derive(&self, groups: &BTreeSet<String>) -> Capabilities {
        let admin = groups.contains(&self.groups.admin);

        Capabilities {
            admin,
            modify: admin || groups.contains(&self.groups.modify),
            delete: admin || groups.contains(&self.groups.delete),
            lend: admin || groups.contains(&self.groups.lend),
        }
    }
}
