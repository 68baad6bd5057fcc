//! Page address conventions.
//!
//! A table lives at `http(s)://host/<session id>`; the bare host is the
//! home page, where the server is asked for a fresh table. Whatever the
//! page, the WebSocket endpoint is `ws(s)://host/websession`.

use fourcards_protocol::SessionId;
use url::Url;

use crate::ClientError;

/// Path of the WebSocket endpoint on the game server.
pub const WEBSOCKET_PATH: &str = "/websession";

/// What a page address says about where to connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// The `ws://` or `wss://` endpoint to dial.
    pub endpoint: String,
    /// The table named by the path, if any.
    pub session_id: Option<SessionId>,
}

/// Parses a page address into its endpoint and routed table.
///
/// # Errors
/// Returns [`ClientError::InvalidUrl`] for unparsable addresses, addresses
/// without a host, or schemes other than http(s)/ws(s).
pub fn route(page_url: &str) -> Result<Route, ClientError> {
    let page = parse(page_url)?;

    let session_id = page
        .path_segments()
        .and_then(|mut segments| segments.next())
        .filter(|segment| !segment.is_empty())
        .map(SessionId::new);

    let mut endpoint = page.clone();
    let scheme = match page.scheme() {
        "https" | "wss" => "wss",
        _ => "ws",
    };
    endpoint
        .set_scheme(scheme)
        .map_err(|()| ClientError::InvalidUrl(page_url.to_string()))?;
    endpoint.set_path(WEBSOCKET_PATH);

    Ok(Route {
        endpoint: endpoint.to_string(),
        session_id,
    })
}

/// The shareable address of a table, on the same host as `page_url`.
pub fn session_url(page_url: &str, session_id: &SessionId) -> Result<String, ClientError> {
    let mut page = parse(page_url)?;
    page.set_path(&format!("/{session_id}"));
    Ok(page.to_string())
}

/// The home page on the same host as `page_url`.
pub fn home_url(page_url: &str) -> Result<String, ClientError> {
    let mut page = parse(page_url)?;
    page.set_path("/");
    Ok(page.to_string())
}

fn parse(page_url: &str) -> Result<Url, ClientError> {
    let mut page =
        Url::parse(page_url).map_err(|e| ClientError::InvalidUrl(format!("{page_url}: {e}")))?;
    if !matches!(page.scheme(), "http" | "https" | "ws" | "wss") || page.host_str().is_none() {
        return Err(ClientError::InvalidUrl(page_url.to_string()));
    }
    page.set_query(None);
    page.set_fragment(None);
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_page_has_no_session() {
        let route = route("http://cards.example:4000/").unwrap();
        assert_eq!(route.endpoint, "ws://cards.example:4000/websession");
        assert_eq!(route.session_id, None);
    }

    #[test]
    fn test_table_page_routes_session_id() {
        let route = route("https://cards.example/k3x9?utm=qr#top").unwrap();
        assert_eq!(route.endpoint, "wss://cards.example/websession");
        assert_eq!(route.session_id, Some(SessionId::new("k3x9")));
    }

    #[test]
    fn test_session_and_home_urls() {
        let page = "https://cards.example/";
        let id = SessionId::new("k3x9");
        assert_eq!(session_url(page, &id).unwrap(), "https://cards.example/k3x9");
        assert_eq!(
            home_url("https://cards.example/k3x9").unwrap(),
            "https://cards.example/"
        );
    }

    #[test]
    fn test_rejects_non_web_addresses() {
        assert!(matches!(
            route("mailto:someone@example.com"),
            Err(ClientError::InvalidUrl(_))
        ));
        assert!(matches!(route("not a url"), Err(ClientError::InvalidUrl(_))));
    }
}
