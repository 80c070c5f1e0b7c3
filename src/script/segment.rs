use regex::Regex;

/// Split a presentation script into per-slide text blocks.
///
/// Lines matching `Slide <number>:` (case-insensitive) act as headers; each
/// slide's content is the text strictly between the end of one header and the
/// start of the next. Bodies that trim to nothing are kept as empty strings so
/// slide numbering stays aligned with the headers' own numbering.
///
/// When no header is present anywhere, the script is instead split on lines
/// consisting solely of `---`. Separator mode drops empty segments: without
/// headers there is no externally visible numbering to preserve.
pub fn split_script(text: &str) -> Vec<String> {
    let header_re = Regex::new(r"(?im)^\s*slide\s+\d+\s*:.*$").expect("Invalid regex");
    let headers: Vec<_> = header_re.find_iter(text).collect();

    if !headers.is_empty() {
        let mut slides = Vec::with_capacity(headers.len());
        for (idx, header) in headers.iter().enumerate() {
            let start = header.end();
            let end = headers
                .get(idx + 1)
                .map_or(text.len(), |next| next.start());
            slides.push(text[start..end].trim().to_string());
        }
        return slides;
    }

    let separator_re = Regex::new(r"(?m)^\s*---\s*$").expect("Invalid regex");
    separator_re
        .split(text)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
