//! Resolve Drive file and folder ids from user input.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{DriveError, Result};

/// Drive sharing links that embed an id.
static LINK_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        r"^https?://drive\.google\.com/drive/(?:u/[0-9]+/)?folders/(?P<id>[a-zA-Z0-9_-]+)",
        r"^https?://drive\.google\.com/file/d/(?P<id>[a-zA-Z0-9_-]+)",
        r"^https?://drive\.google\.com/open\?(?:.*&)?id=(?P<id>[a-zA-Z0-9_-]+)",
    ]
    .map(|pattern| Regex::new(pattern).expect("invalid Drive link regex"))
});

static RAW_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("invalid id regex"));

/// Accept a raw id or a Drive link and return the id.
///
/// ```
/// use drive_client::ids::resolve_id;
///
/// let id = resolve_id("https://drive.google.com/file/d/1abc123/view").unwrap();
/// assert_eq!(id, "1abc123");
/// assert_eq!(resolve_id("1abc123").unwrap(), "1abc123");
/// ```
pub fn resolve_id(input: &str) -> Result<String> {
    let input = input.trim();

    let from_link = LINK_PATTERNS
        .iter()
        .find_map(|re| re.captures(input))
        .and_then(|caps| caps.name("id"));
    if let Some(id) = from_link {
        return Ok(id.as_str().to_string());
    }

    if RAW_ID.is_match(input) {
        Ok(input.to_string())
    } else {
        Err(DriveError::InvalidUrlOrId(input.to_string()))
    }
}
