use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum UrlError {
    #[error("not a URL: {0}")]
    Parse(#[from] url::ParseError),
    #[error("could not encode query parameters: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),
    #[error("path segment is not valid UTF-8: {0}")]
    Segment(#[from] std::string::FromUtf8Error),
    #[error("{0} cannot take a path")]
    NotABase(String),
}

/// `base` with each of `segments` appended as exactly one path segment.
/// Segments arrive as they appear in a request path and are decoded first, so
/// an escaped `/` stays inside its segment and `..` cannot climb out of `base`.
pub fn join_segments<'a>(
    base: &str,
    segments: impl IntoIterator<Item = &'a str>,
) -> Result<Url, UrlError> {
    let decoded = segments
        .into_iter()
        .map(|s| urlencoding::decode(s).map(|d| d.into_owned()))
        .collect::<Result<Vec<_>, _>>()?;

    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| UrlError::NotABase(base.to_string()))?
        .pop_if_empty()
        .extend(decoded.iter().filter(|s| !matches!(s.as_str(), "." | "..")));
    Ok(url)
}

/// Appends the url-encoded form of `params` to the query of `base`, keeping
/// whatever query it already has.
pub fn append_params(base: &str, params: impl serde::Serialize) -> Result<Url, UrlError> {
    let mut url = Url::parse(base)?;
    let new_qs = serde_urlencoded::to_string(params)?;
    if !new_qs.is_empty() {
        let pairs = form_urlencoded::parse(new_qs.as_bytes());
        url.query_pairs_mut().extend_pairs(pairs);
    }
    Ok(url)
}
