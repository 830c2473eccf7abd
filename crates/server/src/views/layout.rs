use std::fmt::Write as _;

use axum::response::Html;
use inkpost_core::domain::SessionUser;
use inkpost_core::html::{css_url, escape};

pub const SITE_NAME: &str = "Inkpost";

/// What every page needs to know about the request.
#[derive(Debug, Default)]
pub struct PageContext<'a> {
    pub viewer: Option<&'a SessionUser>,
    pub is_admin: bool,
    pub flash: Option<String>,
}

impl<'a> PageContext<'a> {
    pub fn new(viewer: Option<&'a SessionUser>, admin_user_id: i64, flash: Option<String>) -> Self {
        Self {
            viewer,
            is_admin: viewer.is_some_and(|u| u.is_admin(admin_user_id)),
            flash,
        }
    }

    pub fn logged_in(&self) -> bool {
        self.viewer.is_some()
    }
}

pub struct Masthead<'a> {
    pub image: Option<&'a str>,
    pub heading: &'a str,
    pub subheading: &'a str,
    pub meta: Option<String>,
}

pub fn render(ctx: &PageContext<'_>, title: &str, masthead: &Masthead<'_>, content: &str) -> Html<String> {
    let mut out = String::with_capacity(4096 + content.len());

    let _ = write!(
        out,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1, shrink-to-fit=no">
<title>{title} | {site}</title>
<link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap@4.6.2/dist/css/bootstrap.min.css">
<link rel="stylesheet" href="/static/styles.css">
</head>
<body>
"#,
        title = escape(title),
        site = SITE_NAME,
    );

    out.push_str(&nav(ctx));
    out.push_str(&header(masthead));

    if let Some(message) = ctx.flash.as_deref() {
        let _ = write!(
            out,
            r#"<div class="container"><div class="alert alert-info flash" role="alert">{}</div></div>
"#,
            escape(message)
        );
    }

    out.push_str(content);
    out.push_str(FOOTER);
    Html(out)
}

fn nav(ctx: &PageContext<'_>) -> String {
    let account = if ctx.logged_in() {
        r#"<li class="nav-item"><a class="nav-link" href="/logout">Log Out</a></li>"#.to_string()
    } else {
        concat!(
            r#"<li class="nav-item"><a class="nav-link" href="/login">Login</a></li>"#,
            r#"<li class="nav-item"><a class="nav-link" href="/register">Register</a></li>"#,
        )
        .to_string()
    };

    format!(
        r#"<nav class="navbar navbar-expand-lg navbar-light fixed-top" id="mainNav">
<div class="container">
<a class="navbar-brand" href="/">{site}</a>
<ul class="navbar-nav ml-auto">
<li class="nav-item"><a class="nav-link" href="/">Home</a></li>
{account}
<li class="nav-item"><a class="nav-link" href="/about">About</a></li>
<li class="nav-item"><a class="nav-link" href="/contact">Contact</a></li>
</ul>
</div>
</nav>
"#,
        site = SITE_NAME,
    )
}

fn header(masthead: &Masthead<'_>) -> String {
    let style = masthead
        .image
        .map(|img| format!(r#" style="background-image: url('{}')""#, escape(&css_url(img))))
        .unwrap_or_default();
    let meta = masthead
        .meta
        .as_deref()
        .map(|m| format!(r#"<span class="meta">{}</span>"#, escape(m)))
        .unwrap_or_default();

    format!(
        r#"<header class="masthead"{style}>
<div class="overlay"></div>
<div class="container">
<div class="site-heading">
<h1>{heading}</h1>
<span class="subheading">{subheading}</span>
{meta}
</div>
</div>
</header>
"#,
        heading = escape(masthead.heading),
        subheading = escape(masthead.subheading),
    )
}

const FOOTER: &str = r#"<hr>
<footer>
<div class="container">
<p class="copyright text-muted">Copyright &copy; Inkpost</p>
</div>
</footer>
</body>
</html>
"#;
