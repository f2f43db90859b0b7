//! Listing entities and the page envelope of the reference API.

use serde::{Deserialize, Serialize};

/// One page of a paginated collection.
///
/// The collection is followed through `next` until the server omits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, next: Option<String>) -> Self {
        Self {
            count: None,
            next,
            previous: None,
            results,
        }
    }

    /// URL of the following page. An empty string counts as "no next page".
    pub fn next_url(&self) -> Option<&str> {
        self.next.as_deref().filter(|url| !url.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    #[serde(default)]
    pub hair_color: Option<String>,
    #[serde(default)]
    pub eye_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    pub name: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub average_lifespan: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_deserializes_swapi_shape() {
        let json = r#"{
            "count": 82,
            "next": "https://swapi.dev/api/people/?page=2",
            "previous": null,
            "results": [
                {"name": "Luke Skywalker", "hair_color": "blond", "eye_color": "blue", "height": "172"}
            ]
        }"#;
        let page: Page<Person> = serde_json::from_str(json).unwrap();
        assert_eq!(page.count, Some(82));
        assert_eq!(page.next_url(), Some("https://swapi.dev/api/people/?page=2"));
        assert_eq!(page.results[0].hair_color.as_deref(), Some("blond"));
    }

    #[test]
    fn test_empty_next_is_last_page() {
        let page: Page<Species> = Page::new(Vec::new(), Some(String::new()));
        assert_eq!(page.next_url(), None);
    }
}
