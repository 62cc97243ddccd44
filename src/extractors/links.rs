use url::Url;

/// What a user-supplied URL points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    Video,
    Playlist,
    Invalid,
}

const SHORT_HOST: &str = "youtu.be";
const WATCH_URL: &str = "https://www.youtube.com/watch";

/// Parse a URL, accepting input that omits the scheme (`youtu.be/abc`)
fn parse_lenient(raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let parsed = if raw.contains("://") {
        Url::parse(raw)
    } else {
        Url::parse(&format!("https://{}", raw))
    };

    parsed
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

fn is_short_host(url: &Url) -> bool {
    url.host_str()
        .map(|host| {
            let host = host.to_ascii_lowercase();
            host == SHORT_HOST || host == format!("www.{}", SHORT_HOST)
        })
        .unwrap_or(false)
}

/// First non-empty value of a query parameter
fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, v)| k == key && !v.trim().is_empty())
        .map(|(_, v)| v.into_owned())
}

/// Rewrite shortened `youtu.be/<id>` links to the canonical `watch?v=<id>` form.
///
/// A `list` query parameter on the short link is carried over. Anything else is
/// returned unchanged.
pub fn normalize(url: &str) -> String {
    let Some(parsed) = parse_lenient(url) else {
        return url.to_string();
    };

    if !is_short_host(&parsed) {
        return url.to_string();
    }

    let video_id = parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string);

    let Some(video_id) = video_id else {
        return url.to_string();
    };

    let mut canonical = match Url::parse(WATCH_URL) {
        Ok(base) => base,
        Err(_) => return url.to_string(),
    };
    {
        let mut query = canonical.query_pairs_mut();
        query.append_pair("v", &video_id);
        if let Some(list) = query_value(&parsed, "list") {
            query.append_pair("list", &list);
        }
    }

    canonical.to_string()
}

/// Classify a URL as a playlist, a single video or neither.
///
/// A `list` parameter wins over `v` when both are present.
pub fn classify(url: &str) -> UrlKind {
    let normalized = normalize(url);
    let Some(parsed) = parse_lenient(&normalized) else {
        return UrlKind::Invalid;
    };

    if query_value(&parsed, "list").is_some() {
        UrlKind::Playlist
    } else if query_value(&parsed, "v").is_some() {
        UrlKind::Video
    } else {
        UrlKind::Invalid
    }
}

/// Extract the video id from a watch URL or a shortened link
pub fn video_id(url: &str) -> Option<String> {
    parse_lenient(&normalize(url)).and_then(|parsed| query_value(&parsed, "v"))
}
