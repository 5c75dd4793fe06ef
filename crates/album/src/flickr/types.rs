//! Search response shapes.

use serde::Deserialize;

use super::FlickrError;

/// Top level of a `flickr.photos.search` JSON response.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    stat: Option<String>,
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
    photos: Option<PhotoPage>,
}

#[derive(Debug, Deserialize)]
struct PhotoPage {
    photo: Vec<PhotoRecord>,
}

#[derive(Debug, Deserialize)]
struct PhotoRecord {
    #[serde(default)]
    url_m: Option<String>,
}

/// Extract the `url_m` values from a search response body.
///
/// Records without a `url_m` are skipped. A page with no usable records is
/// [`FlickrError::NoResults`], never an empty success.
///
/// # Errors
///
/// - `EmptyBody` if `body` is empty
/// - `Parse` if the JSON is malformed or lacks `photos.photo`
/// - `Api` if Flickr answered `"stat": "fail"`
/// - `NoResults` if no record carries a URL
pub fn parse_search_response(body: &[u8]) -> Result<Vec<String>, FlickrError> {
    if body.is_empty() {
        return Err(FlickrError::EmptyBody);
    }

    let response: SearchResponse = serde_json::from_slice(body)
        .map_err(|e| FlickrError::Parse(format!("invalid search response: {e}")))?;

    if response.stat.as_deref() == Some("fail") {
        return Err(FlickrError::Api {
            code: response.code.unwrap_or_default(),
            message: response.message.unwrap_or_default(),
        });
    }

    let page = response
        .photos
        .ok_or_else(|| FlickrError::Parse("missing photos.photo".to_string()))?;

    let urls: Vec<String> = page
        .photo
        .into_iter()
        .filter_map(|record| record.url_m)
        .filter(|url| !url.is_empty())
        .collect();

    if urls.is_empty() {
        return Err(FlickrError::NoResults);
    }

    Ok(urls)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_urls() {
        let body = br#"{
            "photos": {
                "page": 1,
                "photo": [
                    {"id": "1", "url_m": "https://live.staticflickr.com/65535/1_a_m.jpg"},
                    {"id": "2", "url_m": "https://live.staticflickr.com/65535/2_b_m.jpg"}
                ]
            },
            "stat": "ok"
        }"#;

        let urls = parse_search_response(body).unwrap();
        assert_eq!(
            urls,
            vec![
                "https://live.staticflickr.com/65535/1_a_m.jpg",
                "https://live.staticflickr.com/65535/2_b_m.jpg",
            ]
        );
    }

    #[test]
    fn test_parse_skips_records_without_url() {
        let body = br#"{"photos":{"photo":[{"id":"1"},{"url_m":""},{"url_m":"https://x/3_m.jpg"}]}}"#;
        assert_eq!(parse_search_response(body).unwrap(), vec!["https://x/3_m.jpg"]);
    }

    #[test]
    fn test_parse_empty_array_is_no_results() {
        let body = br#"{"photos":{"photo":[]},"stat":"ok"}"#;
        assert!(matches!(
            parse_search_response(body),
            Err(FlickrError::NoResults)
        ));
    }

    #[test]
    fn test_parse_only_urlless_records_is_no_results() {
        let body = br#"{"photos":{"photo":[{"id":"1"},{"id":"2"}]}}"#;
        assert!(matches!(
            parse_search_response(body),
            Err(FlickrError::NoResults)
        ));
    }

    #[test]
    fn test_parse_empty_body() {
        assert!(matches!(
            parse_search_response(b""),
            Err(FlickrError::EmptyBody)
        ));
    }

    #[test]
    fn test_parse_malformed_json() {
        assert!(matches!(
            parse_search_response(b"jsonFlickrApi({})"),
            Err(FlickrError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_missing_photos_key() {
        let err = parse_search_response(br#"{"stat":"ok"}"#).unwrap_err();
        assert!(err.to_string().contains("photos.photo"));
    }

    #[test]
    fn test_parse_api_failure() {
        let body = br#"{"stat":"fail","code":100,"message":"Invalid API Key (Key has invalid format)"}"#;
        match parse_search_response(body) {
            Err(FlickrError::Api { code, message }) => {
                assert_eq!(code, 100);
                assert!(message.starts_with("Invalid API Key"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
