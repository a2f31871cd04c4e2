//! Built-in entity types and their detector configs.

pub mod github;
pub mod obsidian;

use crate::detector::IdNormalization;

/// Identifier normalisation of a built-in entity type; `Exact` for any
/// other type.
pub fn id_normalization(entity_type: &str) -> IdNormalization {
    match entity_type {
        obsidian::PLUGIN_ENTITY_TYPE => obsidian::PLUGIN_ID_NORMALIZATION,
        obsidian::THEME_ENTITY_TYPE => obsidian::THEME_ID_NORMALIZATION,
        github::REPOSITORY_ENTITY_TYPE => github::REPOSITORY_ID_NORMALIZATION,
        _ => IdNormalization::Exact,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_folded_types() {
        assert_eq!(
            id_normalization("obsidian-theme"),
            IdNormalization::CaseInsensitive
        );
        assert_eq!(
            id_normalization("github-repository"),
            IdNormalization::CaseInsensitive
        );
        assert_eq!(id_normalization("obsidian-plugin"), IdNormalization::Exact);
        assert_eq!(id_normalization("gitlab-project"), IdNormalization::Exact);
    }
}
