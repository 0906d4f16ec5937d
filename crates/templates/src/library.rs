use crate::error::{Result, TemplateError};
use crate::template::{LetterTemplate, TemplateQuery};
use lru::LruCache;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Mutex;

pub const TEMPLATE_SCHEMA_VERSION: u32 = 1;

const RESOLUTION_CACHE_CAPACITY: usize = 256;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LibrarySeed {
    #[serde(default = "default_schema_version")]
    schema_version: u32,
    /// Administrator-assigned revision label (e.g. a date or release tag).
    #[serde(default)]
    revision: String,
    templates: Vec<LetterTemplate>,
}

const fn default_schema_version() -> u32 {
    TEMPLATE_SCHEMA_VERSION
}

/// Immutable, versioned collection of letter templates.
///
/// Loaded once from seed data and only replaced wholesale via [`reload`];
/// resolution results are memoized in an LRU cache that reloading clears.
///
/// [`reload`]: TemplateLibrary::reload_from_toml_str
pub struct TemplateLibrary {
    revision: String,
    templates: Vec<LetterTemplate>,
    fingerprint: String,
    cache: Mutex<LruCache<TemplateQuery, Option<usize>>>,
}

impl std::fmt::Debug for TemplateLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateLibrary")
            .field("revision", &self.revision)
            .field("templates", &self.templates.len())
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

impl TemplateLibrary {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let seed: LibrarySeed = toml::from_str(raw)?;
        Self::from_seed(seed)
    }

    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        log::info!("Loading template library from {:?}", path.as_ref());
        Self::from_toml_str(&raw)
    }

    /// The built-in seed set: one generic template per methodology plus the
    /// higher-specificity variants the default letter flows use.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_toml_str(BUILTIN_SEED).expect("built-in template seed must be valid")
    }

    fn from_seed(seed: LibrarySeed) -> Result<Self> {
        if seed.schema_version != TEMPLATE_SCHEMA_VERSION {
            return Err(TemplateError::SchemaVersion {
                found: seed.schema_version,
                expected: TEMPLATE_SCHEMA_VERSION,
            });
        }
        for (idx, template) in seed.templates.iter().enumerate() {
            validate_template(template)?;
            if seed.templates[..idx]
                .iter()
                .any(|prior| prior.slug == template.slug)
            {
                return Err(TemplateError::InvalidTemplate {
                    slug: template.slug.clone(),
                    reason: "duplicate slug".to_string(),
                });
            }
        }
        let fingerprint = compute_fingerprint(&seed)?;
        log::info!(
            "Template library loaded: revision='{}', {} templates, fingerprint={}",
            seed.revision,
            seed.templates.len(),
            &fingerprint[..12]
        );
        Ok(Self {
            revision: seed.revision,
            templates: seed.templates,
            fingerprint,
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(RESOLUTION_CACHE_CAPACITY).expect("capacity is non-zero"),
            )),
        })
    }

    /// Replace the whole library from a new seed and drop the resolution
    /// cache. Seed data is admin-maintained; there is no in-place mutation.
    pub fn reload_from_toml_str(&mut self, raw: &str) -> Result<()> {
        let next = Self::from_toml_str(raw)?;
        self.revision = next.revision;
        self.templates = next.templates;
        self.fingerprint = next.fingerprint;
        self.invalidate_cache();
        Ok(())
    }

    pub fn invalidate_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    /// Best-matching template for a query.
    ///
    /// Strict pass first (all filters honored, highest specificity wins, ties
    /// broken by declaration order), then the methodology's generic template
    /// for the same recipient regardless of round range. `None` only when the
    /// methodology has no generic fallback at all.
    #[must_use]
    pub fn resolve(&self, query: &TemplateQuery) -> Option<&LetterTemplate> {
        if let Ok(mut cache) = self.cache.lock() {
            if let Some(&cached) = cache.get(query) {
                return cached.and_then(|idx| self.templates.get(idx));
            }
        }
        let resolved = self.resolve_uncached(query);
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(query.clone(), resolved);
        }
        resolved.and_then(|idx| self.templates.get(idx))
    }

    fn resolve_uncached(&self, query: &TemplateQuery) -> Option<usize> {
        let mut best: Option<(u32, usize)> = None;
        for (idx, template) in self.templates.iter().enumerate() {
            let Some(score) = template.match_score(query) else {
                continue;
            };
            if best.is_none_or(|(best_score, _)| score > best_score) {
                best = Some((score, idx));
            }
        }
        if let Some((_, idx)) = best {
            return Some(idx);
        }
        // Generic fallback: same methodology and recipient, no filters, any
        // round.
        self.templates.iter().position(|template| {
            template.methodology == query.methodology
                && template.recipient == query.recipient
                && template.is_generic()
        })
    }

    #[must_use]
    pub fn get(&self, slug: &str) -> Option<&LetterTemplate> {
        self.templates.iter().find(|t| t.slug == slug)
    }

    #[must_use]
    pub fn templates(&self) -> &[LetterTemplate] {
        &self.templates
    }

    #[must_use]
    pub fn revision(&self) -> &str {
        &self.revision
    }

    /// Stable hex digest of the loaded seed; recorded on every generated
    /// dispute so audited letters can be tied to their template revision.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn validate_template(template: &LetterTemplate) -> Result<()> {
    let invalid = |reason: &str| TemplateError::InvalidTemplate {
        slug: template.slug.clone(),
        reason: reason.to_string(),
    };
    if template.slug.trim().is_empty() {
        return Err(invalid("empty slug"));
    }
    if template.body.trim().is_empty() {
        return Err(invalid("empty body"));
    }
    if template.min_round == 0 {
        return Err(invalid("min_round must be >= 1"));
    }
    if template
        .max_round
        .is_some_and(|max| max < template.min_round)
    {
        return Err(invalid("max_round is below min_round"));
    }
    let openers = template.body.matches("{{#if").count();
    let closers = template.body.matches("{{/if}}").count();
    if openers != closers {
        return Err(invalid("unbalanced conditional markers"));
    }

    // Declared-variable mismatches degrade at render time (unknowns become
    // empty strings), so they warn instead of failing the load.
    let referenced = redress_render::extract_placeholders(&template.body);
    for name in &referenced {
        if !template.variables.iter().any(|declared| declared == name) {
            log::warn!(
                "Template '{}' references undeclared variable '{}'",
                template.slug,
                name
            );
        }
    }
    for declared in &template.variables {
        if !referenced.iter().any(|name| name == declared) {
            log::warn!(
                "Template '{}' declares unused variable '{}'",
                template.slug,
                declared
            );
        }
    }
    Ok(())
}

fn compute_fingerprint(seed: &LibrarySeed) -> Result<String> {
    let canonical = serde_json::to_vec(seed)?;
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    Ok(out)
}

const BUILTIN_SEED: &str = include_str!("builtin_templates.toml");
