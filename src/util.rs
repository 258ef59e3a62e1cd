//! Small helpers shared across modules.

/// Last path segment of a URL, without query string or fragment.
///
/// Used to tell whether a completed image load belongs to the image the
/// widget currently expects.
pub fn file_name(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let path = &url[..end];
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("https://host/a/b/frame.png"), "frame.png");
        assert_eq!(file_name("frame.png"), "frame.png");
        assert_eq!(file_name("/img/frame.png?v=2#top"), "frame.png");
        assert_eq!(file_name("blob:https://host/1234-abcd"), "1234-abcd");
    }
}
