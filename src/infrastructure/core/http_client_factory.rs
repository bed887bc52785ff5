use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use std::time::Duration;

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Retry policy: exponential backoff, max 3 retries.
    pub fn create_client(timeout: Duration) -> ClientWithMiddleware {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);

        let client = Client::builder()
            .pool_max_idle_per_host(5)
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build()
    }
}

/// Builds a URL with query parameters. reqwest-middleware does not
/// expose `.query()`, so the query string is built and appended here.
pub fn build_url_with_query<K, V>(base_url: &str, params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if params.is_empty() {
        return base_url.to_string();
    }

    let query_string: String = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding_encode(k.as_ref()), urlencoding_encode(v.as_ref())))
        .collect::<Vec<_>>()
        .join("&");

    if base_url.contains('?') {
        format!("{base_url}&{query_string}")
    } else {
        format!("{base_url}?{query_string}")
    }
}

fn urlencoding_encode(s: &str) -> String {
    let mut encoded = String::new();
    for c in s.chars() {
        match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' | '.' | '~' => encoded.push(c),
            _ => {
                for byte in c.to_string().as_bytes() {
                    encoded.push_str(&format!("%{byte:02X}"));
                }
            }
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_query_params_to_bare_url() {
        let url = build_url_with_query("https://api.example.com/pools", &[("limit", "50"), ("aggregate", "1")]);
        assert_eq!(url, "https://api.example.com/pools?limit=50&aggregate=1");
    }

    #[test]
    fn encodes_reserved_characters() {
        let url = build_url_with_query("https://api.example.com", &[("include", "base_token,quote_token")]);
        assert!(url.contains("base_token%2Cquote_token"));
    }
}
