//! Entry point for lookups: picks the dictionaries for a request and starts it.

use crate::backend::Backend;
use crate::config::LookupConfig;
use crate::error::ConfigError;
use crate::markup::{DOCUMENT_FOOTER, document_header, not_found_body};
use crate::request::{ArticleRequest, InputPhrase, LookupRequest};
use std::collections::HashMap;

/// A named, ordered selection of dictionaries.
#[derive(Clone)]
pub struct Group {
    pub id: u32,
    pub name: String,
    pub icon: Option<String>,
    pub dictionaries: Vec<Backend>,
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("icon", &self.icon)
            .field(
                "dictionaries",
                &self.dictionaries.iter().map(|d| d.id()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Presentation settings applied to requests when they are created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MakerSettings {
    pub collapse_threshold: Option<usize>,
    pub expand_optional_parts: bool,
}

/// Creates [`ArticleRequest`]s against a fixed set of dictionaries and groups.
pub struct ArticleMaker {
    dictionaries: Vec<Backend>,
    groups: Vec<Group>,
    settings: MakerSettings,
}

impl std::fmt::Debug for ArticleMaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArticleMaker")
            .field(
                "dictionaries",
                &self.dictionaries.iter().map(|d| d.id()).collect::<Vec<_>>(),
            )
            .field("groups", &self.groups)
            .field("settings", &self.settings)
            .finish()
    }
}

impl ArticleMaker {
    pub fn new(dictionaries: Vec<Backend>, groups: Vec<Group>, settings: MakerSettings) -> Self {
        Self {
            dictionaries,
            groups,
            settings,
        }
    }

    /// Builds the groups described by `config` out of the loaded dictionaries.
    pub fn from_config(config: &LookupConfig, dictionaries: Vec<Backend>) -> Result<Self, ConfigError> {
        let groups = config
            .groups
            .iter()
            .map(|group| {
                let members = group
                    .dictionaries
                    .iter()
                    .map(|id| {
                        dictionaries
                            .iter()
                            .find(|d| d.id() == id)
                            .cloned()
                            .ok_or_else(|| ConfigError::UnknownDictionary {
                                group: group.name.clone(),
                                dictionary: id.clone(),
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Group {
                    id: group.id,
                    name: group.name.clone(),
                    icon: group.icon.clone(),
                    dictionaries: members,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let settings = MakerSettings {
            collapse_threshold: config.collapse_threshold(),
            expand_optional_parts: config.expand_optional_parts,
        };

        Ok(Self::new(dictionaries, groups, settings))
    }

    pub fn dictionaries(&self) -> &[Backend] {
        &self.dictionaries
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn settings(&self) -> MakerSettings {
        self.settings
    }

    pub fn group(&self, id: u32) -> Option<&Group> {
        self.groups.iter().find(|group| group.id == id)
    }

    /// Only affects requests created afterwards.
    pub fn set_expand_optional_parts(&mut self, expand: bool) {
        self.settings.expand_optional_parts = expand;
    }

    /// Only affects requests created afterwards. A disabled collapse ignores
    /// the size limit.
    pub fn set_collapse_parameters(&mut self, enabled: bool, size_limit: usize) {
        self.settings.collapse_threshold = enabled.then_some(size_limit);
    }

    /// Starts looking `phrase` up.
    ///
    /// When `dict_ids` is non-empty the lookup covers exactly those
    /// dictionaries, in their global order, with every article expanded and
    /// no group icon. Otherwise it covers the dictionaries of group
    /// `group_id` (all dictionaries if there is no such group) except the
    /// `muted` ones, and the document header links the group's icon.
    pub fn make_definition_for(
        &self,
        phrase: impl Into<InputPhrase>,
        group_id: u32,
        contexts: HashMap<String, String>,
        muted: &[String],
        dict_ids: &[String],
        ignore_diacritics: bool,
    ) -> ArticleRequest {
        let group = self.group(group_id);
        let group_name = group.map(|g| g.name.clone()).unwrap_or_default();
        let group_icon = group.and_then(|g| g.icon.clone());

        let request = if dict_ids.is_empty() {
            let candidates = group.map_or(&self.dictionaries, |g| &g.dictionaries);
            let backends = candidates
                .iter()
                .filter(|d| !muted.iter().any(|id| id == d.id()))
                .cloned()
                .collect();
            LookupRequest::new(phrase, backends)
                .with_icon(group_icon)
                .with_collapse_threshold(self.settings.collapse_threshold)
                .with_expand_optional_parts(self.settings.expand_optional_parts)
        } else {
            let backends = self
                .dictionaries
                .iter()
                .filter(|d| dict_ids.iter().any(|id| id == d.id()))
                .cloned()
                .collect();
            LookupRequest::new(phrase, backends)
                .with_collapse_threshold(None)
                .with_expand_optional_parts(true)
        };

        tracing::debug!(
            "lookup in group {} ({:?}) with {} dictionaries",
            group_id,
            group_name,
            request.backends.len()
        );

        ArticleRequest::start(
            request
                .with_group(group_name)
                .with_contexts(contexts)
                .with_ignore_diacritics(ignore_diacritics),
        )
    }

    /// A finished request holding only the not-found notice.
    pub fn make_not_found_text_for(&self, word: &str, group: &str) -> ArticleRequest {
        let document = format!(
            "{}{}{}",
            document_header(word, None),
            not_found_body(word, group),
            DOCUMENT_FOOTER
        );
        ArticleRequest::instant(document)
    }

    /// A finished request holding an empty page.
    pub fn make_blank_page(&self) -> ArticleRequest {
        ArticleRequest::instant(format!("{}{}", document_header("", None), DOCUMENT_FOOTER))
    }
}
