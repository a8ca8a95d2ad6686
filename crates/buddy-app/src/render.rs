//! Plain-text rendering of view events for the terminal.

use buddy_chat::message::{WELCOME_TAGLINE, WELCOME_TIPS, WELCOME_TITLE};
use buddy_chat::ViewEvent;
use buddy_core::Role;

/// Convert formatter markup back to terminal text.
///
/// Line breaks become newlines, tags are dropped and entities decoded.
pub fn plain_text(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;
    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let Some(end) = rest[start..].find('>') else {
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };
        if &rest[start..start + end + 1] == "<br>" {
            out.push('\n');
        }
        rest = &rest[start + end + 1..];
    }
    out.push_str(rest);
    out.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn welcome() -> String {
    let tips: Vec<String> = WELCOME_TIPS.iter().map(|t| format!("  - {t}")).collect();
    format!("{WELCOME_TITLE}\n{WELCOME_TAGLINE}\n{}", tips.join("\n"))
}

/// Terminal text for an event, or `None` if nothing should be printed.
pub fn format_event(event: &ViewEvent) -> Option<String> {
    let text = match event {
        ViewEvent::MessageAppended(message) => {
            let who = match message.role {
                Role::User => "you",
                Role::Assistant => "buddy",
            };
            let mut text = format!("[{who}] {}", plain_text(&message.markup));
            if !message.citations.is_empty() {
                text.push_str("\n  Official Resources:");
                for citation in &message.citations {
                    text.push_str(&format!("\n    {} <{}>", citation.label, citation.url));
                }
            }
            text
        }
        ViewEvent::TranscriptReset => welcome(),
        ViewEvent::PendingChanged(true) => "... thinking".to_string(),
        ViewEvent::PendingChanged(false) => return None,
        ViewEvent::CatalogChanged(schemes) if schemes.is_empty() => {
            "No schemes found.".to_string()
        }
        ViewEvent::CatalogChanged(schemes) => schemes
            .iter()
            .map(|s| format!("{:>4}  {}  {}", s.id, s.name, s.preview()))
            .collect::<Vec<_>>()
            .join("\n"),
        ViewEvent::CategoriesChanged(categories) => {
            format!("Categories: {}", categories.join(", "))
        }
        ViewEvent::SchemeSelected(scheme) => {
            let mut text = format!("Selected: {}\n{}", scheme.name, scheme.description);
            if let Some(ref site) = scheme.official_website {
                text.push_str(&format!("\nWebsite: {site}"));
            }
            if let Some(ref helpline) = scheme.helpline {
                text.push_str(&format!("\nHelpline: {helpline}"));
            }
            text
        }
        ViewEvent::UnlistedSchemeSelected(id) => {
            format!("Scheme {id} is not in the current listing; questions will reference it anyway.")
        }
        ViewEvent::LanguageChanged(language) => format!("Language: {language}"),
    };
    Some(text)
}

/// Text printed once at startup.
pub fn banner() -> String {
    welcome()
}
