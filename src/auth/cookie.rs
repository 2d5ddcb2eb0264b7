use axum::http::{
    HeaderMap, HeaderValue,
    header::{COOKIE, SET_COOKIE},
};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE_NAME: &str = "session";

/// SameSite attribute values the session cookie may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
}

impl SameSite {
    fn as_str(self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
        }
    }
}

/// CookiePolicy
///
/// Attributes applied to every session cookie directive. `secure` is on in production.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    pub secure: bool,
    pub same_site: SameSite,
}

impl CookiePolicy {
    pub fn new(secure: bool) -> Self {
        Self {
            secure,
            same_site: SameSite::Lax,
        }
    }
}

fn directive(value: &str, max_age_secs: i64, policy: CookiePolicy) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={value}; Path=/; HttpOnly; SameSite={}; Max-Age={}",
        policy.same_site.as_str(),
        max_age_secs.max(0)
    );
    if policy.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// attach
///
/// Writes the `Set-Cookie` directive binding `token` to the session cookie. A second
/// call replaces the first directive.
///
/// Returns `false` if the token contains bytes that cannot appear in a header, in
/// which case nothing is written.
pub fn attach(headers: &mut HeaderMap, token: &str, max_age_secs: i64, policy: CookiePolicy) -> bool {
    match HeaderValue::from_str(&directive(token, max_age_secs, policy)) {
        Ok(value) => {
            headers.insert(SET_COOKIE, value);
            true
        }
        Err(err) => {
            tracing::warn!("refusing to set session cookie: {err}");
            false
        }
    }
}

/// clear
///
/// Writes an empty, already-expired session cookie so the browser drops it.
pub fn clear(headers: &mut HeaderMap, policy: CookiePolicy) {
    headers.insert(
        SET_COOKIE,
        HeaderValue::from_str(&directive("", 0, policy))
            .unwrap_or_else(|_| HeaderValue::from_static("session=; Path=/; Max-Age=0")),
    );
}

/// extract
///
/// Reads the session token from the request's `Cookie` header(s). Empty `session`
/// pairs are skipped, so a stale cleared cookie does not hide a live one. No
/// non-empty session cookie is `None`; it is the normal state of an anonymous visitor.
pub fn extract(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            let value = value.trim();
            (name.trim() == SESSION_COOKIE_NAME && !value.is_empty()).then(|| value.to_string())
        })
}
