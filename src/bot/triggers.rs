//! Message predicates attached to registry entries.

use regex::Regex;
use signalbot_core::message::{Message, MessageType};
use std::sync::Arc;

/// Decides whether an entry acts on a message. Evaluated after the
/// contact/group gates.
pub type Predicate = Arc<dyn Fn(&Message) -> bool + Send + Sync>;

/// Match when the whole message text equals one of `words`, ignoring case.
pub fn triggered(words: &[&str]) -> Predicate {
    triggered_with_case(words, false)
}

/// Like [`triggered`], with explicit case handling.
pub fn triggered_with_case(words: &[&str], case_sensitive: bool) -> Predicate {
    let words: Vec<String> = words
        .iter()
        .map(|w| {
            if case_sensitive {
                w.to_string()
            } else {
                w.to_lowercase()
            }
        })
        .collect();

    Arc::new(move |message: &Message| {
        let Some(text) = message.text.as_deref() else {
            return false;
        };
        if case_sensitive {
            words.iter().any(|w| w == text)
        } else {
            let text = text.to_lowercase();
            words.iter().any(|w| *w == text)
        }
    })
}

/// Match when any pattern is found anywhere in the message text.
pub fn regex_triggered(patterns: &[&str]) -> Result<Predicate, regex::Error> {
    let patterns = patterns
        .iter()
        .map(|p| Regex::new(p))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Arc::new(move |message: &Message| {
        message
            .text
            .as_deref()
            .is_some_and(|text| patterns.iter().any(|re| re.is_match(text)))
    }))
}

/// Match messages of the given kind.
pub fn of_kind(kind: MessageType) -> Predicate {
    Arc::new(move |message: &Message| message.kind == kind)
}
