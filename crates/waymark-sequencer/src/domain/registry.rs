//! In-memory template registry, optionally loaded from YAML.

use std::collections::BTreeMap;

use serde::Deserialize;
use waymark_core::error::TourError;
use waymark_core::model::{TemplateId, TourTemplate};
use waymark_core::ports::TemplateRegistry;

/// Top-level shape of a template document.
///
/// ```yaml
/// templates:
///   - scenario_id: prayer
///     ordered_steps:
///       - id: wall
///         title: Prayer wall
///         description: Post a request
///         target_location: /prayers
///         preferred_anchor: right
/// ```
#[derive(Debug, Deserialize)]
struct TemplateDocument {
    templates: Vec<TourTemplate>,
}

/// Immutable snapshot of validated templates keyed by scenario id.
#[derive(Debug, Clone, Default)]
pub struct StaticTemplateRegistry {
    templates: BTreeMap<TemplateId, TourTemplate>,
}

impl StaticTemplateRegistry {
    /// Builds a registry from `templates`, validating each one.
    ///
    /// # Errors
    ///
    /// Returns `TourError::TemplateEmpty` or `TourError::InvalidTemplate` if a
    /// template fails validation or a scenario id appears twice.
    pub fn from_templates(templates: Vec<TourTemplate>) -> Result<Self, TourError> {
        let mut map = BTreeMap::new();
        for template in templates {
            template.validate()?;
            let scenario_id = template.scenario_id.clone();
            if map.insert(scenario_id.clone(), template).is_some() {
                return Err(TourError::InvalidTemplate(format!(
                    "scenario `{scenario_id}` is defined more than once"
                )));
            }
        }
        Ok(Self { templates: map })
    }

    /// Parses and validates a YAML template document.
    ///
    /// # Errors
    ///
    /// Returns `TourError::InvalidTemplate` if the document does not parse,
    /// plus any error from [`StaticTemplateRegistry::from_templates`].
    pub fn from_yaml(source: &str) -> Result<Self, TourError> {
        let document: TemplateDocument = serde_yaml::from_str(source)
            .map_err(|e| TourError::InvalidTemplate(format!("template document: {e}")))?;
        Self::from_templates(document.templates)
    }

    /// Number of registered templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Registered scenario ids in sorted order.
    pub fn scenario_ids(&self) -> impl Iterator<Item = &TemplateId> {
        self.templates.keys()
    }
}

impl TemplateRegistry for StaticTemplateRegistry {
    fn resolve(&self, scenario_id: &str) -> Option<TourTemplate> {
        self.templates.get(&TemplateId::new(scenario_id)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_core::model::{AnchorPosition, TourStep};

    const DOCUMENT: &str = r"
templates:
  - scenario_id: prayer
    ordered_steps:
      - id: wall
        title: Prayer wall
        description: Post a request
        target_location: /prayers
        preferred_anchor: right
      - id: answered
        title: Answered prayers
        description: Celebrate answered prayers
        target_location: /prayers/answered
        narration: Here you can celebrate answered prayers.
  - scenario_id: study
    ordered_steps:
      - id: guides
        title: Study guides
        description: Pick a guide
        target_location: /study-guides
";

    #[test]
    fn test_from_yaml_loads_all_templates() {
        // Act
        let registry = StaticTemplateRegistry::from_yaml(DOCUMENT).unwrap();

        // Assert
        assert_eq!(registry.len(), 2);
        let prayer = registry.resolve("prayer").unwrap();
        assert_eq!(prayer.len(), 2);
        assert_eq!(prayer.ordered_steps[0].preferred_anchor, AnchorPosition::Right);
        assert_eq!(prayer.ordered_steps[1].preferred_anchor, AnchorPosition::Bottom);
        assert_eq!(
            prayer.ordered_steps[1].narration.as_deref(),
            Some("Here you can celebrate answered prayers.")
        );
        let ids: Vec<&str> = registry.scenario_ids().map(TemplateId::as_str).collect();
        assert_eq!(ids, vec!["prayer", "study"]);
    }

    #[test]
    fn test_from_yaml_rejects_malformed_document() {
        let result = StaticTemplateRegistry::from_yaml("templates: [ {scenario_id: 3");

        assert!(matches!(result, Err(TourError::InvalidTemplate(_))));
    }

    #[test]
    fn test_from_yaml_rejects_empty_template() {
        let result = StaticTemplateRegistry::from_yaml(
            "templates:\n  - scenario_id: hollow\n    ordered_steps: []\n",
        );

        assert!(matches!(result, Err(TourError::TemplateEmpty(id)) if id == "hollow"));
    }

    #[test]
    fn test_duplicate_scenario_is_rejected() {
        let template = TourTemplate::new("dup", vec![TourStep::new("a", "A", "a", "/")]);

        let result = StaticTemplateRegistry::from_templates(vec![template.clone(), template]);

        assert!(matches!(result, Err(TourError::InvalidTemplate(_))));
    }

    #[test]
    fn test_unknown_scenario_resolves_to_none() {
        let registry = StaticTemplateRegistry::default();

        assert!(registry.is_empty());
        assert!(registry.resolve("prayer").is_none());
    }
}
