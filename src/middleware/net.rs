// src/middleware/net.rs

use axum::{extract::FromRequestParts, http::request::Parts};

// O endereço do cliente visto pelos proxies, para a lista de IPs do
// check-in. Nem sempre dá para saber (rede instável, proxy sem header);
// nesse caso o valor é None e a política do check-in decide o que fazer.
pub struct ClientIp(pub Option<String>);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        // x-forwarded-for carrega a cadeia completa; o primeiro salto é o
        // cliente original.
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|chain| chain.split(',').next())
            .map(|ip| ip.trim().to_string())
            .filter(|ip| !ip.is_empty());

        let ip = forwarded.or_else(|| {
            parts
                .headers
                .get("x-real-ip")
                .and_then(|value| value.to_str().ok())
                .map(|ip| ip.trim().to_string())
                .filter(|ip| !ip.is_empty())
        });

        Ok(ClientIp(ip))
    }
}
