use std::collections::BTreeMap;
use std::mem;
use std::str::FromStr;
use std::time::Duration;

use http::header::HeaderName;
use http::uri::Authority;
use http::uri::PathAndQuery;
use http::uri::Scheme;
use http::HeaderMap;
use http::Method;
use http::Uri;

use crate::Error;
use crate::Result;

/// The facts about an outbound request that take part in signing.
///
/// Built from `http::request::Parts`, mutated by a signer (headers and query
/// pairs added) and applied back. Query keys and values are held
/// percent-decoded.
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// HTTP path.
    pub path: String,
    /// HTTP query parameters.
    pub query: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Build a signing request from http::request::Parts.
    ///
    /// The headers are taken out of `parts`; give them back with
    /// [`SigningRequest::apply`] or [`SigningRequest::restore`]. The uri is
    /// left in place until `apply` succeeds.
    pub fn build(parts: &mut http::request::Parts) -> Result<Self> {
        let uri = parts.uri.clone().into_parts();
        let paq = uri
            .path_and_query
            .unwrap_or_else(|| PathAndQuery::from_static("/"));

        Ok(SigningRequest {
            method: parts.method.clone(),
            scheme: uri.scheme.unwrap_or(Scheme::HTTP),
            authority: uri.authority.ok_or_else(|| {
                Error::signature_input("request without authority is invalid for signing")
            })?,
            path: paq.path().to_string(),
            query: paq
                .query()
                .map(|v| {
                    form_urlencoded::parse(v.as_bytes())
                        .map(|(k, v)| (k.into_owned(), v.into_owned()))
                        .collect()
                })
                .unwrap_or_default(),

            // Take the headers out of the request to avoid copy.
            // We will return it back when apply the context.
            headers: mem::take(&mut parts.headers),
        })
    }

    /// Apply the signing request back to http::request::Parts.
    ///
    /// Query pairs are written as they are: callers that need encoding
    /// must encode keys and values before applying. On error only the
    /// headers are given back.
    pub fn apply(self, parts: &mut http::request::Parts) -> Result<()> {
        let SigningRequest {
            method,
            scheme,
            authority,
            path,
            query,
            headers,
        } = self;

        match Self::build_uri(&parts.uri, scheme, authority, path, &query) {
            Ok(uri) => {
                parts.headers = headers;
                parts.method = method;
                parts.uri = uri;
                Ok(())
            }
            Err(err) => {
                parts.headers = headers;
                Err(err)
            }
        }
    }

    fn build_uri(
        base: &Uri,
        scheme: Scheme,
        authority: Authority,
        mut path: String,
        query: &[(String, String)],
    ) -> Result<Uri> {
        if !query.is_empty() {
            let query_size: usize = query.iter().map(|(k, v)| k.len() + v.len() + 2).sum();
            path.reserve(query_size);

            path.push('?');
            for (i, (k, v)) in query.iter().enumerate() {
                if i > 0 {
                    path.push('&');
                }

                path.push_str(k);
                if !v.is_empty() {
                    path.push('=');
                    path.push_str(v);
                }
            }
        }

        let mut uri_parts = base.clone().into_parts();
        uri_parts.scheme = Some(scheme);
        uri_parts.authority = Some(authority);
        uri_parts.path_and_query = Some(PathAndQuery::from_str(&path)?);
        Ok(Uri::from_parts(uri_parts)?)
    }

    /// Give the headers taken by [`SigningRequest::build`] back to `parts`
    /// without applying anything else.
    pub fn restore(self, parts: &mut http::request::Parts) {
        parts.headers = self.headers;
    }

    /// Get query size.
    #[inline]
    pub fn query_size(&self) -> usize {
        self.query
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum::<usize>()
    }

    /// Push a new query pair into query list.
    #[inline]
    pub fn query_push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query.push((key.into(), value.into()));
    }

    /// Push an already encoded query string into query list.
    #[inline]
    pub fn query_append(&mut self, query: &str) {
        self.query.push((query.to_string(), "".to_string()));
    }

    /// Get the first query value whose lower-cased key equals `key`.
    pub fn query_get(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Group query pairs by lower-cased key.
    ///
    /// Keys come out sorted, values of a repeated key sorted and joined
    /// with `,`.
    ///
    /// ```shell
    /// [(comp, list), (B, 2), (b, 1)] => [(b, "1,2"), (comp, "list")]
    /// ```
    pub fn query_to_sorted_groups(&self) -> Vec<(String, String)> {
        let mut groups: BTreeMap<String, Vec<&str>> = BTreeMap::new();
        for (k, v) in &self.query {
            groups.entry(k.to_lowercase()).or_default().push(v);
        }

        groups
            .into_iter()
            .map(|(k, mut vs)| {
                vs.sort_unstable();
                (k, vs.join(","))
            })
            .collect()
    }

    /// Get header value by name.
    ///
    /// Returns empty string if header not found.
    #[inline]
    pub fn header_get_or_default(&self, key: &HeaderName) -> Result<&str> {
        match self.headers.get(key) {
            Some(v) => Ok(v.to_str()?),
            None => Ok(""),
        }
    }

    /// Get headers with given prefix.
    ///
    /// Names are lower-cased and sorted; values of a repeated header are
    /// joined with `,` in the order they were inserted.
    pub fn header_to_vec_with_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>> {
        let mut headers = Vec::new();
        for name in self.headers.keys() {
            let name = name.as_str();
            if !name.starts_with(prefix) {
                continue;
            }

            let values = self
                .headers
                .get_all(name)
                .iter()
                .map(|v| v.to_str())
                .collect::<std::result::Result<Vec<_>, _>>()?;
            headers.push((name.to_lowercase(), values.join(",")));
        }
        headers.sort();

        Ok(headers)
    }

    /// Convert sorted headers to string.
    ///
    /// ```shell
    /// [(a, b), (c, d)] => "a:b\nc:d"
    /// ```
    pub fn header_to_string(mut headers: Vec<(String, String)>, sep: &str, join: &str) -> String {
        let mut s = String::with_capacity(16);

        // Sort via header name.
        headers.sort();

        for (idx, (k, v)) in headers.into_iter().enumerate() {
            if idx != 0 {
                s.push_str(join);
            }

            s.push_str(&k);
            s.push_str(sep);
            s.push_str(&v);
        }

        s
    }
}

/// SigningMethod is the method that used in signing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SigningMethod {
    /// Signing with header.
    Header,
    /// Signing with query.
    Query(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parts(uri: &str) -> http::request::Parts {
        http::Request::get(uri)
            .header("x-ms-meta-b", "2")
            .header("X-MS-Date", "Tue, 01 Mar 2022 08:12:34 GMT")
            .header("x-ms-meta-b", "1")
            .header("content-type", "text/plain")
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[test]
    fn test_build_and_apply() {
        let mut parts = parts("https://acc.blob.core.windows.net/c/b%20x?comp=list&prefix=a%2Fb");
        let mut req = SigningRequest::build(&mut parts).unwrap();
        assert_eq!(req.path, "/c/b%20x");
        assert_eq!(req.query_get("COMP"), Some("list"));
        assert_eq!(req.query_get("prefix"), Some("a/b"));

        req.query_push("sig", "abc");
        req.apply(&mut parts).unwrap();
        assert_eq!(
            parts.uri.to_string(),
            "https://acc.blob.core.windows.net/c/b%20x?comp=list&prefix=a/b&sig=abc"
        );
        assert_eq!(parts.headers.len(), 4);
    }

    #[test]
    fn test_build_without_authority() {
        let mut parts = http::Request::get("/path").body(()).unwrap().into_parts().0;
        let err = SigningRequest::build(&mut parts).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::SignatureInput);
        assert_eq!(parts.uri, "/path");
    }

    #[test]
    fn test_restore_keeps_request_intact() {
        let mut parts = parts("https://acc.blob.core.windows.net/c?comp=list");
        let req = SigningRequest::build(&mut parts).unwrap();
        assert!(parts.headers.is_empty());
        assert_eq!(parts.uri, "https://acc.blob.core.windows.net/c?comp=list");

        req.restore(&mut parts);
        assert_eq!(parts.headers.len(), 4);
        assert_eq!(parts.uri, "https://acc.blob.core.windows.net/c?comp=list");
    }

    #[test]
    fn test_failed_apply_keeps_request_intact() {
        let mut parts = parts("https://acc.blob.core.windows.net/c");
        let mut req = SigningRequest::build(&mut parts).unwrap();
        req.query_push("bad key", "1");

        assert!(req.apply(&mut parts).is_err());
        assert_eq!(parts.uri, "https://acc.blob.core.windows.net/c");
        assert_eq!(parts.headers.len(), 4);
    }

    #[test]
    fn test_header_to_vec_with_prefix() {
        let mut parts = parts("https://acc.blob.core.windows.net/c");
        let req = SigningRequest::build(&mut parts).unwrap();
        let headers = req.header_to_vec_with_prefix("x-ms-").unwrap();
        assert_eq!(
            headers,
            vec![
                (
                    "x-ms-date".to_string(),
                    "Tue, 01 Mar 2022 08:12:34 GMT".to_string()
                ),
                ("x-ms-meta-b".to_string(), "2,1".to_string()),
            ]
        );
        assert_eq!(
            SigningRequest::header_to_string(headers, ":", "\n"),
            "x-ms-date:Tue, 01 Mar 2022 08:12:34 GMT\nx-ms-meta-b:2,1"
        );
    }

    #[test]
    fn test_query_to_sorted_groups() {
        let mut parts = parts("https://acc.blob.core.windows.net/c?restype=container&B=2&comp=list&b=1");
        let req = SigningRequest::build(&mut parts).unwrap();
        assert_eq!(
            req.query_to_sorted_groups(),
            vec![
                ("b".to_string(), "1,2".to_string()),
                ("comp".to_string(), "list".to_string()),
                ("restype".to_string(), "container".to_string()),
            ]
        );
    }
}
