//! SDK materialization: expanding an SDK pointer into the package records
//! it references.

use std::collections::BTreeMap;

use crate::records::{MaterializedSdk, SdkRecord};
use crate::registry::Registry;
use crate::version::LATEST;

impl Registry {
    /// Resolve every package an SDK declares.
    ///
    /// An SDK without an explicit package map stands for its own canonical id
    /// at `latest`. References that do not resolve are dropped; the main
    /// package is looked up among the ones that did.
    pub fn materialize_sdk(&self, sdk: &SdkRecord) -> MaterializedSdk {
        let declared: Vec<(&str, &str)> = if sdk.packages.is_empty() {
            vec![(sdk.canonical.as_str(), LATEST)]
        } else {
            sdk.packages
                .iter()
                .map(|(c, v)| (c.as_str(), v.as_str()))
                .collect()
        };

        let mut packages = BTreeMap::new();
        for (canonical, version) in declared {
            if let Some(record) = self.get_package(canonical, version) {
                packages.insert(canonical.to_string(), record);
            }
        }

        let main_id = sdk.main_package.as_deref().unwrap_or(&sdk.canonical);
        let main_package = packages
            .get(main_id)
            .or_else(|| packages.values().find(|p| p.canonical == main_id))
            .cloned();

        MaterializedSdk {
            key: sdk.key.clone(),
            name: sdk.name.clone(),
            packages,
            main_package,
        }
    }
}
