//! Cache key derivation for tracker API requests.

/// Builds a canonical cache key from a request URL and its query parameters.
///
/// Parameters are sorted before serialization so that semantically identical
/// requests produce identical keys regardless of argument order. An empty
/// parameter set yields the bare URL. Keys stay plaintext so resource paths
/// remain matchable by [`ResponseCache::invalidate`](super::ResponseCache::invalidate).
pub fn cache_key(url: &str, params: &[(&str, &str)]) -> String {
  if params.is_empty() {
    return url.to_string();
  }

  let mut pairs = params.to_vec();
  pairs.sort_unstable();

  let query = pairs
    .iter()
    .map(|(k, v)| format!("{}={}", k, v))
    .collect::<Vec<_>>()
    .join("&");

  format!("{}?{}", url, query)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_key_ignores_parameter_order() {
    let a = cache_key("/releases", &[("a", "1"), ("b", "2")]);
    let b = cache_key("/releases", &[("b", "2"), ("a", "1")]);
    assert_eq!(a, b);
  }

  #[test]
  fn test_key_differs_when_a_value_differs() {
    let a = cache_key("/releases", &[("a", "1")]);
    let b = cache_key("/releases", &[("a", "2")]);
    assert_ne!(a, b);
  }

  #[test]
  fn test_empty_params_yield_bare_url() {
    assert_eq!(cache_key("/releases/123", &[]), "/releases/123");
  }

  #[test]
  fn test_full_request_key_shape() {
    let url = "https://x/api/v1/releases/123/features";
    let key = cache_key(url, &[("per_page", "200"), ("fields", "id,name,score")]);
    assert_eq!(
      key,
      "https://x/api/v1/releases/123/features?fields=id,name,score&per_page=200"
    );
    // Stable across calls, distinct when any parameter changes.
    assert_eq!(
      key,
      cache_key(url, &[("fields", "id,name,score"), ("per_page", "200")])
    );
    assert_ne!(
      key,
      cache_key(url, &[("fields", "id,name,score"), ("per_page", "100")])
    );
  }
}
