use std::collections::{HashMap, HashSet};

use crate::{
    catalog::model::{Catalog, Trait},
    foundation::error::{TraitgenError, TraitgenResult},
};

/// One generated combination: an optional character plus one value per trait
/// of the character's pool, in pool declaration order. `None` means absent.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Token {
    pub character: Option<String>,
    pub traits: Vec<Option<String>>,
}

impl Token {
    /// True when the token carries neither a character nor any trait variant.
    pub fn is_all_absent(&self) -> bool {
        self.character.is_none() && self.traits.iter().all(Option::is_none)
    }

    /// Pair each value with the trait it was drawn from.
    pub fn trait_values<'a>(
        &'a self,
        catalog: &'a Catalog,
    ) -> impl Iterator<Item = (&'a Trait, Option<&'a str>)> + 'a {
        let character = self
            .character
            .as_deref()
            .and_then(|name| catalog.character(name));
        catalog
            .pool(character)
            .iter()
            .zip(self.traits.iter().map(Option::as_deref))
    }
}

/// Frozen set of unique tokens in acceptance order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeneratedSet {
    tokens: Vec<Token>,
}

impl GeneratedSet {
    /// Freeze an explicit token list. Tokens must fit `catalog` (known character,
    /// one value per trait of its pool) and be distinct and not all-absent.
    pub fn from_tokens(catalog: &Catalog, tokens: Vec<Token>) -> TraitgenResult<Self> {
        let mut seen = HashSet::with_capacity(tokens.len());
        for (idx, token) in tokens.iter().enumerate() {
            let character = match token.character.as_deref() {
                Some(name) => Some(catalog.character(name).ok_or_else(|| {
                    TraitgenError::config(format!(
                        "token #{idx} references unknown character '{name}'"
                    ))
                })?),
                None if catalog.characters.is_present() => {
                    return Err(TraitgenError::config(format!(
                        "token #{idx} carries no character but the catalog declares characters"
                    )));
                }
                None => None,
            };
            let pool = catalog.pool(character);
            if token.traits.len() != pool.len() {
                return Err(TraitgenError::config(format!(
                    "token #{idx} has {} trait values but its pool declares {} traits",
                    token.traits.len(),
                    pool.len()
                )));
            }
            if token.is_all_absent() {
                return Err(TraitgenError::config(format!(
                    "token #{idx} carries no character and no trait"
                )));
            }
            if !seen.insert(token) {
                return Err(TraitgenError::config(format!(
                    "token #{idx} duplicates an earlier token"
                )));
            }
        }
        Ok(Self { tokens })
    }

    pub(crate) fn from_unique(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Output index of every token: position within its character group, or
    /// within the whole run when tokens have no character.
    pub fn output_indices(&self) -> Vec<usize> {
        let mut next = HashMap::<Option<&str>, usize>::new();
        self.tokens
            .iter()
            .map(|t| {
                let slot = next.entry(t.character.as_deref()).or_insert(0);
                let idx = *slot;
                *slot += 1;
                idx
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a GeneratedSet {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/token.rs"]
mod tests;
