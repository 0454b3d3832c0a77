//! Wire name to identifier mapping.

/// Derives the stable identifier for a wire header name.
///
/// The rules, in order:
///
/// 1. Three explicit overrides keep their lowercase wire spelling but get a
///    conventional identifier: `baggage`, `traceparent`, `tracestate`. These
///    are not derivable from the general rule and stay an explicit list.
/// 2. Every `-` is stripped.
/// 3. A leading `:` (pseudo headers) is dropped and the following character
///    upper-cased.
/// 4. Anything else keeps the case of the registered spelling.
pub fn identifier_for(name: &str) -> String {
    match name {
        "baggage" => return "Baggage".to_string(),
        "traceparent" => return "TraceParent".to_string(),
        "tracestate" => return "TraceState".to_string(),
        _ => {}
    }

    let stripped: String = name.chars().filter(|&c| c != '-').collect();
    match stripped.strip_prefix(':') {
        Some(rest) => {
            let mut chars = rest.chars();
            match chars.next() {
                Some(first) => {
                    let mut out = String::with_capacity(rest.len());
                    out.push(first.to_ascii_uppercase());
                    out.push_str(chars.as_str());
                    out
                }
                None => String::new(),
            }
        }
        None => stripped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_dashes() {
        assert_eq!(identifier_for("Content-Length"), "ContentLength");
        assert_eq!(identifier_for("WWW-Authenticate"), "WWWAuthenticate");
        assert_eq!(identifier_for("Content-MD5"), "ContentMD5");
    }

    #[test]
    fn pseudo_headers_drop_the_colon() {
        assert_eq!(identifier_for(":authority"), "Authority");
        assert_eq!(identifier_for(":method"), "Method");
        assert_eq!(identifier_for(":status"), "Status");
    }

    #[test]
    fn lowercase_overrides() {
        assert_eq!(identifier_for("baggage"), "Baggage");
        assert_eq!(identifier_for("traceparent"), "TraceParent");
        assert_eq!(identifier_for("tracestate"), "TraceState");
    }

    #[test]
    fn case_is_otherwise_preserved() {
        assert_eq!(identifier_for("ETag"), "ETag");
        assert_eq!(identifier_for("TE"), "TE");
    }
}
