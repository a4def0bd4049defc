//! Message translation for titles, placeholders and labels.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use smol_str::SmolStr;

/// Translates user-facing messages.
pub trait Translator {
    fn translate(&self, message: &str) -> String;
}

/// Shared catalogs stay configurable after being handed to a context.
impl<T: Translator> Translator for Rc<RefCell<T>> {
    fn translate(&self, message: &str) -> String {
        self.borrow().translate(message)
    }
}

/// Per-locale message maps with a fallback chain.
#[derive(Debug, Clone)]
pub struct Catalog {
    locale: SmolStr,
    fallbacks: HashMap<SmolStr, SmolStr>,
    messages: HashMap<SmolStr, HashMap<String, String>>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            locale: SmolStr::new_static("en"),
            fallbacks: HashMap::new(),
            messages: HashMap::new(),
        }
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn set_locale(&mut self, locale: impl Into<SmolStr>) {
        self.locale = locale.into();
    }

    /// Replace the fallback map (`{"de-CH": "en"}`).
    pub fn set_fallbacks<I, K, V>(&mut self, fallbacks: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<SmolStr>,
        V: Into<SmolStr>,
    {
        self.fallbacks = fallbacks
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
    }

    /// Merge messages into a locale's map.
    pub fn add<I, K, V>(&mut self, locale: impl Into<SmolStr>, messages: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.messages
            .entry(locale.into())
            .or_default()
            .extend(messages.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    /// Translate in `locale`, walking the fallback chain. Returns the message
    /// itself when no locale in the chain knows it.
    pub fn translate_in(&self, message: &str, locale: &str) -> String {
        let mut visited: Vec<&str> = Vec::new();
        let mut current = locale;
        loop {
            if let Some(translated) = self.messages.get(current).and_then(|m| m.get(message)) {
                return translated.clone();
            }
            visited.push(current);
            match self.fallbacks.get(current) {
                Some(next) if !visited.contains(&next.as_str()) => current = next.as_str(),
                _ => return message.to_string(),
            }
        }
    }
}

impl Translator for Catalog {
    fn translate(&self, message: &str) -> String {
        self.translate_in(message, &self.locale)
    }
}
