//! One-shot user notices carried in a flash cookie.
//!
//! A denied navigation pushes the notice in the same response that redirects,
//! and the login page takes it on the next render. Cookie values must stay in
//! the ASCII-safe subset while the notice text is not, so the payload is hex
//! encoded.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::auth::session::bytes_to_hex;

const NOTICE_COOKIE: &str = "notice";

/// Queue `text` for display on the next page render.
#[must_use]
pub fn push(jar: CookieJar, text: &str) -> CookieJar {
    let cookie = Cookie::build((NOTICE_COOKIE, encode(text)))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::minutes(5));
    jar.add(cookie)
}

/// Take the pending notice, clearing it from the jar.
#[must_use]
pub fn take(jar: CookieJar) -> (CookieJar, Option<String>) {
    let text = jar
        .get(NOTICE_COOKIE)
        .and_then(|cookie| decode(cookie.value()));
    let cleared = Cookie::build((NOTICE_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::ZERO);
    (jar.add(cleared), text)
}

fn encode(text: &str) -> String {
    bytes_to_hex(text.as_bytes())
}

fn decode(hex: &str) -> Option<String> {
    if hex.is_empty() || hex.len() % 2 != 0 {
        return None;
    }
    let mut bytes = Vec::with_capacity(hex.len() / 2);
    for pair in hex.as_bytes().chunks(2) {
        let pair = std::str::from_utf8(pair).ok()?;
        bytes.push(u8::from_str_radix(pair, 16).ok()?);
    }
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
#[path = "notice_test.rs"]
mod tests;
