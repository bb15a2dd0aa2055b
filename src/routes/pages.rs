//! Page handlers and the navigation guard middleware.
//!
//! Pages are deliberately thin placeholders; the data views live client-side
//! against the cloud store. The guard middleware is the piece with teeth: it
//! wraps every page route and fully gates the response on the guard's
//! decision.

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;

use crate::guard::{Decision, NavigationIntent};
use crate::notice;
use crate::routes::{session, table};
use crate::state::AppState;

/// Guard middleware for page routes. Builds a [`NavigationIntent`] from the
/// request, checks it, and either forwards to the page handler or redirects
/// to the login page with a notice.
pub async fn guard_navigation(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let target = request.uri().path().to_owned();
    let source = request
        .headers()
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned);

    let intent = NavigationIntent::new(&target, source.as_deref(), table::matched(&target));
    let provider = state.provider_for(session::session_token(&jar));
    let decision = state.guard.check(&intent, &provider).await;

    match decision {
        Decision::Allowed => next.run(request).await,
        Decision::Denied { redirect_to, notice } => {
            let jar = notice::push(CookieJar::new(), notice);
            (jar, Redirect::temporary(&redirect_to)).into_response()
        }
    }
}

/// Escape text for interpolation into HTML. The notice cookie is
/// client-writable, so its decoded content is never trusted as markup.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html lang=\"pt-BR\">\n<head><meta charset=\"utf-8\"><title>{title} — fintrack</title></head>\n<body>{body}</body>\n</html>"
    ))
}

/// `GET /` — login page; renders any pending flash notice.
pub async fn login(jar: CookieJar) -> (CookieJar, Html<String>) {
    let (jar, pending) = notice::take(jar);
    let banner = pending
        .map(|text| format!("<p class=\"notice\">{}</p>", escape_html(&text)))
        .unwrap_or_default();
    let body = format!("{banner}<h1>Entrar</h1><form id=\"login\"></form>");
    (jar, page("Login", &body))
}

/// `GET /Home` — landing page, behind the guard.
pub async fn home() -> Html<String> {
    page("Home", "<h1>Resumo financeiro</h1><div id=\"app\"></div>")
}

/// `GET /dashboard` — charts page, behind the guard.
pub async fn dashboard() -> Html<String> {
    page("Dashboard", "<h1>Dashboard</h1><div id=\"charts\"></div>")
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
