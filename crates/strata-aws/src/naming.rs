//! Derived identifier helpers
//!
//! Synthesis never calls the provider, so exported attributes are identifiers
//! derived from the stack and resource names. They are concrete, stable
//! across runs, and unique as long as stack/resource ids are.

use strata_core::SynthContext;

/// Lowercase a name to the characters allowed in a derived id
pub fn slug(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

/// `<prefix>-<stack>-<resource>` for the resource being synthesized
pub fn derived_id(prefix: &str, ctx: &SynthContext<'_>) -> String {
    format!("{}-{}-{}", prefix, slug(ctx.stack()), slug(ctx.resource()))
}
