use std::fmt::Write as _;

use inkpost_core::forms::{CommentForm, FieldErrors, LoginForm, PostForm, RegisterForm};
use inkpost_core::html::escape;

pub enum InputKind {
    Text,
    Email,
    Password,
    Url,
}

impl InputKind {
    fn as_str(&self) -> &'static str {
        match self {
            InputKind::Text => "text",
            InputKind::Email => "email",
            InputKind::Password => "password",
            InputKind::Url => "url",
        }
    }
}

fn error_for(errors: &FieldErrors, name: &str) -> String {
    errors
        .get(name)
        .map(|e| format!(r#"<div class="invalid-feedback d-block">{}</div>"#, escape(e)))
        .unwrap_or_default()
}

pub fn input(label: &str, name: &str, kind: InputKind, value: &str, errors: &FieldErrors) -> String {
    // Passwords never echo back.
    let value = match kind {
        InputKind::Password => "",
        _ => value,
    };
    let invalid = if errors.contains_key(name) { " is-invalid" } else { "" };
    format!(
        r#"<div class="form-group">
<label for="{name}">{label}</label>
<input class="form-control{invalid}" id="{name}" name="{name}" type="{kind}" value="{value}">
{error}
</div>
"#,
        label = escape(label),
        kind = kind.as_str(),
        value = escape(value),
        error = error_for(errors, name),
    )
}

pub fn textarea(label: &str, name: &str, value: &str, rows: u32, errors: &FieldErrors) -> String {
    let invalid = if errors.contains_key(name) { " is-invalid" } else { "" };
    format!(
        r#"<div class="form-group">
<label for="{name}">{label}</label>
<textarea class="form-control{invalid}" id="{name}" name="{name}" rows="{rows}">{value}</textarea>
{error}
</div>
"#,
        label = escape(label),
        value = escape(value),
        error = error_for(errors, name),
    )
}

fn form(action: &str, fields: &[String], submit: &str) -> String {
    let mut out = format!(r#"<form method="post" action="{}" novalidate>"#, escape(action));
    out.push('\n');
    for field in fields {
        out.push_str(field);
    }
    let _ = write!(
        out,
        r#"<button class="btn btn-primary" type="submit">{}</button>
</form>
"#,
        escape(submit)
    );
    out
}

pub fn register_form(values: &RegisterForm, errors: &FieldErrors) -> String {
    form(
        "/register",
        &[
            input("Email", "email", InputKind::Email, &values.email, errors),
            input("Password", "password", InputKind::Password, "", errors),
            input("Name", "name", InputKind::Text, &values.name, errors),
        ],
        "Sign Me Up!",
    )
}

pub fn login_form(values: &LoginForm, errors: &FieldErrors) -> String {
    form(
        "/login",
        &[
            input("Email", "email", InputKind::Email, &values.email, errors),
            input("Password", "password", InputKind::Password, "", errors),
        ],
        "Let Me In!",
    )
}

/// The post editor. The author field only shows when editing.
pub fn post_form(action: &str, values: &PostForm, show_author: bool, errors: &FieldErrors) -> String {
    let mut fields = vec![
        input("Blog Post Title", "title", InputKind::Text, &values.title, errors),
        input("Subtitle", "subtitle", InputKind::Text, &values.subtitle, errors),
    ];
    if show_author {
        fields.push(input(
            "Your Name",
            "author",
            InputKind::Text,
            values.author.as_deref().unwrap_or_default(),
            errors,
        ));
    }
    fields.push(input("Blog Image URL", "img_url", InputKind::Url, &values.img_url, errors));
    fields.push(textarea("Blog Content", "body", &values.body, 12, errors));
    form(action, &fields, "Submit Post")
}

pub fn comment_form(post_id: i64, values: &CommentForm, errors: &FieldErrors) -> String {
    form(
        &format!("/post/{post_id}"),
        &[textarea("Comment", "body", &values.body, 4, errors)],
        "Submit Comment",
    )
}
