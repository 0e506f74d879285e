// src/middleware/client_info.rs

use std::{convert::Infallible, net::SocketAddr};

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts, Extensions, HeaderMap},
};

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// IP e user-agent de quem fez a requisição, usados em logs e na auditoria.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientInfo {
    pub fn from_parts(headers: &HeaderMap, extensions: &Extensions) -> Self {
        // Atrás de proxy vale o primeiro IP do X-Forwarded-For
        let forwarded = headers
            .get(FORWARDED_FOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|ip| ip.trim().to_string())
            .filter(|ip| !ip.is_empty());

        let ip_address = forwarded.or_else(|| {
            extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        });

        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Self { ip_address, user_agent }
    }
}

impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientInfo::from_parts(&parts.headers, &parts.extensions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn forwarded_for_wins_over_socket_address() {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR_HEADER, HeaderValue::from_static("10.0.0.7, 172.16.0.1"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static("forecast-ui/1.0"));

        let mut extensions = Extensions::new();
        extensions.insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))));

        let info = ClientInfo::from_parts(&headers, &extensions);
        assert_eq!(info.ip_address.as_deref(), Some("10.0.0.7"));
        assert_eq!(info.user_agent.as_deref(), Some("forecast-ui/1.0"));
    }

    #[test]
    fn falls_back_to_socket_address() {
        let mut extensions = Extensions::new();
        extensions.insert(ConnectInfo(SocketAddr::from(([192, 168, 1, 20], 4000))));

        let info = ClientInfo::from_parts(&HeaderMap::new(), &extensions);
        assert_eq!(info.ip_address.as_deref(), Some("192.168.1.20"));
        assert!(info.user_agent.is_none());
    }
}
