use axum_extra::extract::cookie::{Cookie, CookieJar};

use super::*;
use crate::auth::session::bytes_to_hex;
use crate::guard::LOGIN_REQUIRED_NOTICE;

// =============================================================================
// escape_html
// =============================================================================

#[test]
fn escape_html_neutralizes_markup() {
    assert_eq!(
        escape_html(r#"<script>alert("x")</script>"#),
        "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;"
    );
}

#[test]
fn escape_html_passes_plain_text_through() {
    assert_eq!(escape_html(LOGIN_REQUIRED_NOTICE), LOGIN_REQUIRED_NOTICE);
}

#[test]
fn escape_html_handles_ampersand_and_quotes() {
    assert_eq!(escape_html(r#"a & 'b'"#), "a &amp; &#39;b&#39;");
}

// =============================================================================
// Login page banner
// =============================================================================

#[tokio::test]
async fn login_page_renders_the_pending_notice() {
    let jar = crate::notice::push(CookieJar::new(), LOGIN_REQUIRED_NOTICE);
    let (_, Html(body)) = login(jar).await;
    assert!(body.contains(LOGIN_REQUIRED_NOTICE));
}

#[tokio::test]
async fn login_page_without_notice_has_no_banner() {
    let (_, Html(body)) = login(CookieJar::new()).await;
    assert!(!body.contains("class=\"notice\""));
}

// The notice cookie is client-writable; a forged value must render as inert
// text, never as markup, on the page where credentials are typed.
#[tokio::test]
async fn forged_notice_cookie_cannot_inject_markup() {
    let payload = "<script>alert(1)</script>";
    let jar = CookieJar::new().add(Cookie::new("notice", bytes_to_hex(payload.as_bytes())));
    let (_, Html(body)) = login(jar).await;
    assert!(!body.contains("<script>"));
    assert!(body.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
}
