//! Pulls JSON payloads out of attributes on custom elements, e.g.
//! `<video-player anime="{&quot;id&quot;:1}" episodes_count="12">`.

use once_cell::sync::Lazy;
use regex::Regex;

static START_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)<([a-z][a-z0-9_:-]*)((?:\s+[^\s=/>]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'>]+))?)*)\s*/?>"#,
    )
    .expect("start tag pattern is valid")
});

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([^\s=/>]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
        .expect("attribute pattern is valid")
});

/// Returns the decoded value of `attribute` on the first `<element>` start tag.
pub fn element_attribute(html: &str, element: &str, attribute: &str) -> Option<String> {
    let tag = start_tag(html, element)?;
    ATTRIBUTE
        .captures_iter(tag)
        .find(|c| c[1].eq_ignore_ascii_case(attribute))
        .map(|c| {
            let raw = c
                .get(2)
                .or_else(|| c.get(3))
                .or_else(|| c.get(4))
                .map(|m| m.as_str())
                .unwrap_or_default();
            decode_html_entities(raw)
        })
}

/// Attribute section of the first start tag named `element`.
fn start_tag<'a>(html: &'a str, element: &str) -> Option<&'a str> {
    START_TAG
        .captures_iter(html)
        .find(|c| c[1].eq_ignore_ascii_case(element))
        .and_then(|c| c.get(2))
        .map(|m| m.as_str())
}

/// Decodes named and numeric (decimal/hex) entities. Unknown entities are kept as-is.
pub fn decode_html_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '&' {
            out.push(ch);
            continue;
        }
        let mut entity = String::new();
        let mut terminated = false;
        while let Some(&c) = chars.peek() {
            if c == ';' {
                chars.next();
                terminated = true;
                break;
            }
            if !(c.is_ascii_alphanumeric() || c == '#') || entity.len() > 32 {
                break;
            }
            entity.push(c);
            chars.next();
        }
        let decoded = if terminated {
            match entity.as_str() {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ if entity.starts_with("#x") || entity.starts_with("#X") => {
                    u32::from_str_radix(&entity[2..], 16)
                        .ok()
                        .and_then(char::from_u32)
                }
                _ if entity.starts_with('#') => {
                    entity[1..].parse::<u32>().ok().and_then(char::from_u32)
                }
                _ => None,
            }
        } else {
            None
        };
        match decoded {
            Some(c) => out.push(c),
            None => {
                out.push('&');
                out.push_str(&entity);
                if terminated {
                    out.push(';');
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
<div id="app">
  <video-player
      anime="{&quot;id&quot;:4821,&quot;slug&quot;:&quot;nana&quot;,&quot;plot&quot;:&quot;Due ragazze &amp; Tokyo&quot;}"
      episodes_count="47"
      embed_url=""></video-player>
</div>
</body></html>"#;

    #[test]
    fn extracts_and_decodes_json_attribute() {
        let json = element_attribute(PAGE, "video-player", "anime").unwrap();
        assert_eq!(
            json,
            r#"{"id":4821,"slug":"nana","plot":"Due ragazze & Tokyo"}"#
        );
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["id"], 4821);
    }

    #[test]
    fn reads_sibling_attributes_and_empty_values() {
        assert_eq!(
            element_attribute(PAGE, "video-player", "episodes_count").as_deref(),
            Some("47")
        );
        assert_eq!(
            element_attribute(PAGE, "video-player", "embed_url").as_deref(),
            Some("")
        );
    }

    #[test]
    fn missing_element_or_attribute_is_none() {
        assert_eq!(element_attribute(PAGE, "archivio", "records"), None);
        assert_eq!(element_attribute(PAGE, "video-player", "records"), None);
    }

    #[test]
    fn does_not_match_element_name_prefix() {
        let html = r#"<video-player-extra anime="x"></video-player-extra>"#;
        assert_eq!(element_attribute(html, "video-player", "anime"), None);
    }

    #[test]
    fn skips_other_tags_and_ignores_name_case() {
        let html = r#"<div data-x="1"><span anime="no"></span><Video-Player anime="yes"></Video-Player></div>"#;
        assert_eq!(
            element_attribute(html, "video-player", "anime").as_deref(),
            Some("yes")
        );
    }

    #[test]
    fn decodes_numeric_entities_and_keeps_unknown() {
        assert_eq!(decode_html_entities("l&#039;anime &#x41;"), "l'anime A");
        assert_eq!(decode_html_entities("a &bogus; b"), "a &bogus; b");
        assert_eq!(decode_html_entities("fish & chips"), "fish & chips");
    }
}
