/// Resolve a possibly-relative href against the page it came from.
pub fn absolute_url(base_url: &str, href: &str) -> String {
    match href {
        h if h.starts_with("//") => format!("https:{}", h),
        h if h.starts_with("http") => h.to_string(),
        h => {
            if let Some(scheme_end) = base_url.find("://") {
                let rest = &base_url[scheme_end + 3..];
                let host_end = rest.find('/').unwrap_or(rest.len());
                let scheme = &base_url[..scheme_end];
                let host = &rest[..host_end];
                if h.starts_with('/') {
                    format!("{}://{}{}", scheme, host, h)
                } else {
                    format!("{}://{}/{}", scheme, host, h)
                }
            } else {
                h.to_string()
            }
        }
    }
}

/// Collapse runs of whitespace into single spaces and trim. Scraped text
/// nodes keep the page's indentation otherwise.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// "8.4", "8.4 / 10" and "N/A" all show up in rating slots.
pub fn parse_rating(text: &str) -> Option<f64> {
    text.split(&['/', ' '][..])
        .find(|part| !part.is_empty())
        .and_then(|part| part.trim().parse::<f64>().ok())
}

/// Trailing numeric id from a watch path like "/movie/watch-free-guy-19921".
pub fn trailing_id(path: &str) -> Option<&str> {
    let tail = path.rsplit('-').next()?;
    if !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) {
        Some(tail)
    } else {
        None
    }
}
