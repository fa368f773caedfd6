//! Internal helpers for input validation and normalization.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so the engine enforces consistent invariants on every write.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{EngineError, IngredientAmount, RecipeDraft, ResultEngine};

pub(crate) const MAX_NAME_LEN: usize = 150;
pub(crate) const MAX_RECIPE_NAME_LEN: usize = 256;
pub(crate) const MAX_EMAIL_LEN: usize = 254;
pub(crate) const MAX_UNIT_LEN: usize = 20;
const MAX_SLUG_LEN: usize = 50;
const RESERVED_USERNAME: &str = "me";

/// Trim `value` and reject it when empty or longer than `max_len` chars.
pub(crate) fn normalize_required_name(
    value: &str,
    label: &str,
    max_len: usize,
) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} must not be empty"
        )));
    }
    if trimmed.chars().count() > max_len {
        return Err(EngineError::InvalidName(format!(
            "{label} must be at most {max_len} characters"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Validate a username: non-empty, only `[\w.@+-]`, and not the reserved `me`.
pub(crate) fn normalize_username(value: &str) -> ResultEngine<String> {
    let username = normalize_required_name(value, "username", MAX_NAME_LEN)?;
    if username.eq_ignore_ascii_case(RESERVED_USERNAME) {
        return Err(EngineError::InvalidName(format!(
            "username \"{username}\" is reserved"
        )));
    }
    if !username
        .chars()
        .all(|ch| ch.is_alphanumeric() || matches!(ch, '_' | '.' | '@' | '+' | '-'))
    {
        return Err(EngineError::InvalidName(format!(
            "username \"{username}\" contains invalid characters"
        )));
    }
    Ok(username)
}

pub(crate) fn normalize_email(value: &str) -> ResultEngine<String> {
    let email = normalize_required_name(value, "email", MAX_EMAIL_LEN)?;
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(EngineError::InvalidName(format!(
            "invalid email: {email}"
        )));
    }
    Ok(email.to_lowercase())
}

pub(crate) fn validate_slug(value: &str) -> ResultEngine<String> {
    let slug = normalize_required_name(value, "tag slug", MAX_SLUG_LEN)?;
    if !slug
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
    {
        return Err(EngineError::InvalidName(format!("invalid slug: {slug}")));
    }
    Ok(slug)
}

/// Accept `#RRGGBB` colors and store them uppercase.
pub(crate) fn validate_color(value: &str) -> ResultEngine<String> {
    let color = value.trim();
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|ch| ch.is_ascii_hexdigit());
    if !valid {
        return Err(EngineError::InvalidName(format!(
            "invalid color: {color}"
        )));
    }
    Ok(color.to_uppercase())
}

/// Build the search key of an ingredient name.
///
/// Decomposes, drops combining marks, lowercases and collapses every run of
/// non-alphanumeric characters into a single space.
pub(crate) fn normalize_search_key(input: &str) -> String {
    let mut out = String::new();
    let mut prev_space = false;
    for ch in input.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    if out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Validated form of a [`RecipeDraft`], with tags and ingredients still to be
/// checked against the store.
pub(crate) struct ValidDraft {
    pub(crate) name: String,
    pub(crate) text: String,
    pub(crate) image: Option<String>,
    pub(crate) cooking_time: i32,
    pub(crate) tags: Vec<i32>,
    pub(crate) ingredients: Vec<IngredientAmount>,
}

pub(crate) fn validate_draft(draft: &RecipeDraft) -> ResultEngine<ValidDraft> {
    let name = normalize_required_name(&draft.name, "recipe name", MAX_RECIPE_NAME_LEN)?;
    let text = draft.text.trim();
    if text.is_empty() {
        return Err(EngineError::InvalidName(
            "recipe text must not be empty".to_string(),
        ));
    }
    if draft.cooking_time < 1 {
        return Err(EngineError::InvalidAmount(
            "cooking time must be at least 1 minute".to_string(),
        ));
    }

    if draft.tags.is_empty() {
        return Err(EngineError::InvalidName(
            "a recipe needs at least one tag".to_string(),
        ));
    }
    let mut tags = draft.tags.clone();
    tags.sort_unstable();
    if tags.windows(2).any(|pair| pair[0] == pair[1]) {
        return Err(EngineError::InvalidName(
            "a tag can be listed only once".to_string(),
        ));
    }

    if draft.ingredients.is_empty() {
        return Err(EngineError::InvalidAmount(
            "a recipe needs at least one ingredient".to_string(),
        ));
    }
    let mut seen = Vec::with_capacity(draft.ingredients.len());
    for item in &draft.ingredients {
        if seen.contains(&item.ingredient_id) {
            return Err(EngineError::InvalidAmount(format!(
                "ingredient {} listed more than once",
                item.ingredient_id
            )));
        }
        if item.amount <= 0 {
            return Err(EngineError::InvalidAmount(format!(
                "amount of ingredient {} must be greater than 0",
                item.ingredient_id
            )));
        }
        seen.push(item.ingredient_id);
    }

    Ok(ValidDraft {
        name,
        text: text.to_string(),
        image: normalize_optional_text(draft.image.as_deref()),
        cooking_time: draft.cooking_time,
        tags,
        ingredients: draft.ingredients.clone(),
    })
}
