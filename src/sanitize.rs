use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ammonia::Builder;
use url::Url;

use crate::error::{AppError, AppResult};

const IFRAME_ATTRIBUTES: &[&str] = &[
    "src",
    "width",
    "height",
    "frameborder",
    "allowfullscreen",
    "loading",
    "referrerpolicy",
    "style",
];

/// Clean a post's map-embed field. Only `<iframe>` elements survive, and only
/// with a Google Maps embed `src`; every other tag is stripped (text content
/// kept). An iframe pointing anywhere else rejects the whole value.
pub fn clean_embed(raw: &str) -> AppResult<Option<String>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }

    // The filter closure is boxed by ammonia, so the flag rides an Arc.
    let rejected = Arc::new(AtomicBool::new(false));
    let rejected_flag = Arc::clone(&rejected);

    let cleaned = Builder::default()
        .tags(HashSet::from(["iframe"]))
        .tag_attributes(HashMap::from([(
            "iframe",
            IFRAME_ATTRIBUTES.iter().copied().collect::<HashSet<_>>(),
        )]))
        .generic_attributes(HashSet::new())
        .attribute_filter(move |element, attribute, value| {
            if element == "iframe" && attribute == "src" && !allowed_embed_src(value) {
                rejected_flag.store(true, Ordering::Relaxed);
                return None;
            }
            Some(Cow::Borrowed(value))
        })
        .clean(raw)
        .to_string();

    if rejected.load(Ordering::Relaxed) {
        return Err(AppError::BadRequest(
            "location may only contain a Google Maps embed".to_string(),
        ));
    }

    if cleaned.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(cleaned))
}

fn allowed_embed_src(value: &str) -> bool {
    let Ok(url) = Url::parse(value) else {
        return false;
    };
    url.scheme() == "https"
        && url.host_str() == Some("www.google.com")
        && (url.path() == "/maps/embed" || url.path().starts_with("/maps/embed/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_maps_iframe_passes() {
        let raw = r#"<iframe src="https://www.google.com/maps/embed?pb=!1m18" width="600" height="450" loading="lazy"></iframe>"#;
        let cleaned = clean_embed(raw).unwrap().unwrap();
        assert!(cleaned.contains("<iframe"));
        assert!(cleaned.contains("https://www.google.com/maps/embed?pb=!1m18"));
        assert!(cleaned.contains("width=\"600\""));
    }

    #[test]
    fn foreign_iframe_src_is_rejected() {
        let raw = r#"<iframe src="https://evil.example.com/maps/embed"></iframe>"#;
        assert!(matches!(
            clean_embed(raw),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn plain_http_src_is_rejected() {
        let raw = r#"<iframe src="http://www.google.com/maps/embed?pb=x"></iframe>"#;
        assert!(clean_embed(raw).is_err());
    }

    #[test]
    fn lookalike_path_is_rejected() {
        let raw = r#"<iframe src="https://www.google.com/maps/embedded?pb=x"></iframe>"#;
        assert!(clean_embed(raw).is_err());
    }

    #[test]
    fn script_tags_are_stripped_silently() {
        let cleaned = clean_embed("<script>alert(1)</script>here").unwrap();
        assert_eq!(cleaned.as_deref(), Some("here"));
    }

    #[test]
    fn event_handler_attributes_are_dropped() {
        let raw = r#"<iframe src="https://www.google.com/maps/embed?pb=x" onload="alert(1)"></iframe>"#;
        let cleaned = clean_embed(raw).unwrap().unwrap();
        assert!(!cleaned.contains("onload"));
        assert!(cleaned.contains("src="));
    }

    #[test]
    fn plain_text_passes_through() {
        let cleaned = clean_embed("Meet at the east gate").unwrap();
        assert_eq!(cleaned.as_deref(), Some("Meet at the east gate"));
    }

    #[test]
    fn empty_input_stores_null() {
        assert_eq!(clean_embed("").unwrap(), None);
        assert_eq!(clean_embed("   ").unwrap(), None);
    }

    #[test]
    fn markup_that_cleans_to_nothing_stores_null() {
        assert_eq!(clean_embed("<div></div>").unwrap(), None);
    }

    #[test]
    fn src_allowlist_checks() {
        assert!(allowed_embed_src(
            "https://www.google.com/maps/embed?pb=!1m18!2m3"
        ));
        assert!(allowed_embed_src("https://www.google.com/maps/embed/v1/place"));
        assert!(!allowed_embed_src("https://maps.google.com/maps/embed"));
        assert!(!allowed_embed_src("javascript:alert(1)"));
        assert!(!allowed_embed_src("not a url"));
    }
}
