//! Lookup table of label definitions visible to one schema resolution.
//!
//! A registry is built from the global element types, then narrowed per schema
//! with that schema's local element types. A local definition replaces a
//! global one of the same name outright; the two are never merged.

use std::collections::{BTreeMap, HashSet};

use log::debug;

use super::ast::LabelDefinition;
use super::errors::{DefinitionKind, GraphDdlError, Result};

#[derive(Debug, Clone, Default)]
pub struct LabelRegistry<'a> {
    labels: BTreeMap<&'a str, &'a LabelDefinition>,
}

impl<'a> LabelRegistry<'a> {
    /// Registry holding only the global element types
    pub fn global<I>(definitions: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a LabelDefinition>,
    {
        let labels = collect_unique(definitions)?;
        Ok(LabelRegistry { labels })
    }

    /// Registry for one schema: this registry overlaid with the schema's local
    /// element types, local definitions winning on name clashes.
    pub fn with_local<I>(&self, definitions: I) -> Result<LabelRegistry<'a>>
    where
        I: IntoIterator<Item = &'a LabelDefinition>,
    {
        let local = collect_unique(definitions)?;
        let mut labels = self.labels.clone();
        for (name, definition) in local {
            if labels.insert(name, definition).is_some() {
                debug!("Local element type `{}` shadows the global definition", name);
            }
        }
        Ok(LabelRegistry { labels })
    }

    /// Convenience for `global(global)?.with_local(local)`
    pub fn register<G, L>(global: G, local: L) -> Result<Self>
    where
        G: IntoIterator<Item = &'a LabelDefinition>,
        L: IntoIterator<Item = &'a LabelDefinition>,
    {
        Self::global(global)?.with_local(local)
    }

    pub fn lookup(&self, name: &str) -> Result<&'a LabelDefinition> {
        self.labels
            .get(name)
            .copied()
            .ok_or_else(|| GraphDdlError::undefined_label(name, self.names()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.labels.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.labels.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

fn collect_unique<'a, I>(definitions: I) -> Result<BTreeMap<&'a str, &'a LabelDefinition>>
where
    I: IntoIterator<Item = &'a LabelDefinition>,
{
    let mut labels = BTreeMap::new();
    for definition in definitions {
        validate_key(definition)?;
        if labels.insert(definition.name.as_str(), definition).is_some() {
            return Err(GraphDdlError::DuplicateDefinition {
                kind: DefinitionKind::ElementType,
                name: definition.name.clone(),
            });
        }
    }
    Ok(labels)
}

/// A key must name at least one property, without repeats, all declared by
/// the label itself.
fn validate_key(definition: &LabelDefinition) -> Result<()> {
    let Some(key) = &definition.key else {
        return Ok(());
    };
    let invalid = |reason: String| GraphDdlError::InvalidKey {
        label: definition.name.clone(),
        key: key.name.clone(),
        reason,
    };

    if key.properties.is_empty() {
        return Err(invalid("a key needs at least one property".to_string()));
    }

    let mut seen = HashSet::new();
    for property in &key.properties {
        if !seen.insert(property.as_str()) {
            return Err(invalid(format!("property `{}` is listed twice", property)));
        }
        if !definition.properties.contains_key(property) {
            return Err(invalid(format!(
                "property `{}` is not declared on the label",
                property
            )));
        }
    }
    Ok(())
}
