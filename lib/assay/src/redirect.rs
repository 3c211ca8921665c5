//! Redirect following for client actions.
//!
//! A client follows `301`, `302`, `303`, `307` and `308` responses that carry
//! a `Location` header. The jar absorbs `Set-Cookie` on every hop, so the
//! next hop is rebuilt with a fresh `Cookie` header.

use url::Url;

use crate::{CookieStore, Error, Method, Request, Response, Result};

/// Redirects followed before an action fails.
pub(crate) const MAX_REDIRECTS: usize = 10;

fn is_redirect(status: u16) -> bool {
    matches!(status, 301 | 302 | 303 | 307 | 308)
}

/// `307` and `308` keep the method and body. The others switch to `GET`,
/// except for `HEAD`, and drop the body.
fn redirect_method(status: u16, original: Method) -> Method {
    match (status, original) {
        (307 | 308, method) | (_, method @ (Method::Get | Method::Head)) => method,
        _ => Method::Get,
    }
}

fn resolve_redirect_url(base_url: &Url, location: &str) -> Result<Url> {
    base_url
        .join(location)
        .map_err(|e| Error::from(e).context(format!("following redirect to {location:?}")))
}

fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
}

/// The request to send after `response`, or `None` if `response` is final.
///
/// A redirect without a `Location` header is final.
pub(crate) fn next_request(
    previous: Request,
    response: &Response,
    cookies: Option<&CookieStore>,
) -> Result<Option<Request>> {
    let status = response.status();
    if !is_redirect(status) {
        return Ok(None);
    }
    let Some(location) = response.headers().and_then(|headers| headers.get("Location")) else {
        return Ok(None);
    };

    let url = resolve_redirect_url(previous.url(), location)?;
    let method = redirect_method(status, previous.method());
    let keep_body = matches!(status, 307 | 308);
    let cross_origin = !same_origin(previous.url(), &url);

    tracing::debug!(status, from = %previous.url(), to = %url, "following redirect");

    let (_, _, mut headers, body) = previous.into_parts();
    headers.remove("Cookie");
    if !keep_body {
        headers.remove("Content-Type");
    }
    if cross_origin {
        headers.remove("Authorization");
    }
    if let Some(cookie) = cookies.and_then(CookieStore::cookie_header) {
        headers.set("Cookie", cookie);
    }

    let mut builder = Request::builder(method, url).headers(headers.iter());
    if keep_body && let Some(body) = body {
        builder = builder.body(body);
    }
    Ok(Some(builder.build()))
}
