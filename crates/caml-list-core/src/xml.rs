//! XML text helpers: the entity unescape applied to every inbound wire
//! string and the narrow escape required for outbound payload text.

/// Decodes the XML entities the list service emits in attribute values.
///
/// Unrecognized entity-like sequences are copied through literally; the
/// wire is not trusted to be well-formed.
///
/// # Examples
///
/// ```
/// use caml_list_core::xml::unescape_entities;
///
/// assert_eq!(unescape_entities("a &lt; b &amp;&amp; c &gt; d"), "a < b && c > d");
/// assert_eq!(unescape_entities("&quot;quoted&quot;"), "\"quoted\"");
/// assert_eq!(unescape_entities("AT&T"), "AT&T");
/// ```
pub fn unescape_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let mut matched = None;
        for (entity, ch) in [
            ("&lt;", '<'),
            ("&gt;", '>'),
            ("&quot;", '"'),
            ("&apos;", '\''),
            ("&#39;", '\''),
            ("&amp;", '&'),
        ] {
            if rest.starts_with(entity) {
                matched = Some((entity.len(), ch));
                break;
            }
        }
        match matched {
            Some((len, ch)) => {
                out.push(ch);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Escapes outbound payload text for embedding in the request XML.
///
/// Only the characters the transport actually chokes on are escaped.
///
/// # Examples
///
/// ```
/// use caml_list_core::xml::escape_text;
///
/// assert_eq!(escape_text("Smith & Sons <est. 1900>"), "Smith &amp; Sons &lt;est. 1900&gt;");
/// ```
pub fn escape_text(s: &str) -> String {
    if !s.contains(['&', '<', '>']) {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}
