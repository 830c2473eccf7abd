use std::fmt::Write as _;

use axum::http::StatusCode;
use axum::response::Html;
use inkpost_core::forms::{CommentForm, FieldErrors, LoginForm, PostForm, RegisterForm};
use inkpost_core::gravatar::GravatarOptions;
use inkpost_core::html::{escape, text_to_html};

use super::forms;
use super::layout::{render, Masthead, PageContext};
use crate::models::{CommentRow, PostDetail, PostSummary};

const UNKNOWN_AUTHOR: &str = "a former member";

fn byline(author: Option<&str>, date: &str) -> String {
    format!("Posted by {} on {}", author.unwrap_or(UNKNOWN_AUTHOR), date)
}

fn column(content: &str) -> String {
    format!(
        r#"<div class="container">
<div class="row">
<div class="col-lg-8 col-md-10 mx-auto">
{content}
</div>
</div>
</div>
"#
    )
}

pub fn index(ctx: &PageContext<'_>, posts: &[PostSummary]) -> Html<String> {
    let mut content = String::new();

    if posts.is_empty() {
        content.push_str(r#"<p class="text-muted">Nothing has been posted yet.</p>"#);
    }

    for post in posts {
        let _ = write!(
            content,
            r#"<div class="post-preview">
<a href="/post/{id}">
<h2 class="post-title">{title}</h2>
<h3 class="post-subtitle">{subtitle}</h3>
</a>
<p class="post-meta">{meta}"#,
            id = post.id,
            title = escape(&post.title),
            subtitle = escape(&post.subtitle),
            meta = escape(&byline(post.author_name.as_deref(), &post.date)),
        );
        if ctx.is_admin {
            let _ = write!(
                content,
                r#"
<form class="d-inline" method="post" action="/delete/{}"><button class="btn btn-link p-0 delete" type="submit" title="Delete post">&#10008;</button></form>"#,
                post.id
            );
        }
        content.push_str("</p>\n</div>\n<hr>\n");
    }

    if ctx.is_admin {
        content.push_str(
            r#"<div class="clearfix"><a class="btn btn-primary float-right" href="/new-post">Create New Post</a></div>
"#,
        );
    }

    render(
        ctx,
        "Home",
        &Masthead {
            image: None,
            heading: "Inkpost",
            subheading: "A collection of random musings.",
            meta: None,
        },
        &column(&content),
    )
}

pub fn post(
    ctx: &PageContext<'_>,
    post: &PostDetail,
    comments: &[CommentRow],
    gravatar: &GravatarOptions,
    form: &CommentForm,
    errors: &FieldErrors,
) -> Html<String> {
    // Post bodies are written by the admin in the rich editor and kept as HTML.
    let mut content = post.body.clone();
    content.push_str("\n<hr>\n");

    if ctx.is_admin {
        let _ = write!(
            content,
            r#"<div class="clearfix"><a class="btn btn-primary float-right" href="/edit-post/{}">Edit Post</a></div>
"#,
            post.id
        );
    }

    content.push_str(&forms::comment_form(post.id, form, errors));

    content.push_str(r#"<div class="comment"><ul class="commentList">"#);
    content.push('\n');
    for comment in comments {
        let avatar = comment
            .author_email
            .as_deref()
            .map(|email| gravatar.avatar_url(email))
            .unwrap_or_else(|| gravatar.avatar_url(""));
        let _ = write!(
            content,
            r#"<li id="comment-{id}">
<div class="commenterImage"><img src="{avatar}" alt=""></div>
<div class="commentText">
<p>{text}</p>
<span class="date sub-text">{author}</span>
</div>
</li>
"#,
            id = comment.id,
            avatar = escape(&avatar),
            text = text_to_html(&comment.text),
            author = escape(comment.author_name.as_deref().unwrap_or(UNKNOWN_AUTHOR)),
        );
    }
    content.push_str("</ul></div>\n");

    render(
        ctx,
        &post.title,
        &Masthead {
            image: Some(&post.img_url),
            heading: &post.title,
            subheading: &post.subtitle,
            meta: Some(byline(post.author_name.as_deref(), &post.date)),
        },
        &column(&content),
    )
}

pub fn about(ctx: &PageContext<'_>) -> Html<String> {
    render(
        ctx,
        "About",
        &Masthead {
            image: None,
            heading: "About Me",
            subheading: "This is what I do.",
            meta: None,
        },
        &column(
            "<p>Inkpost is a small blog. One person writes the posts; anyone with an \
             account can join the conversation underneath them.</p>\n\
             <p>Register to leave comments, or just read along.</p>",
        ),
    )
}

pub fn contact(ctx: &PageContext<'_>) -> Html<String> {
    render(
        ctx,
        "Contact",
        &Masthead {
            image: None,
            heading: "Contact Me",
            subheading: "Have questions? I have answers.",
            meta: None,
        },
        &column(
            "<p>Want to get in touch? Leave a comment on any post and I will get back \
             to you as soon as possible.</p>",
        ),
    )
}

pub fn register(ctx: &PageContext<'_>, values: &RegisterForm, errors: &FieldErrors) -> Html<String> {
    render(
        ctx,
        "Register",
        &Masthead {
            image: None,
            heading: "Register",
            subheading: "Start contributing to the blog!",
            meta: None,
        },
        &column(&forms::register_form(values, errors)),
    )
}

pub fn login(ctx: &PageContext<'_>, values: &LoginForm, errors: &FieldErrors) -> Html<String> {
    render(
        ctx,
        "Log In",
        &Masthead {
            image: None,
            heading: "Log In",
            subheading: "Welcome back!",
            meta: None,
        },
        &column(&forms::login_form(values, errors)),
    )
}

/// CKEditor 4 takes over the body textarea.
const RICH_EDITOR: &str = r#"<script src="https://cdn.ckeditor.com/4.22.1/standard/ckeditor.js"></script>
<script>CKEDITOR.replace('body');</script>
"#;

/// Editor for a new post (`post_id` is `None`) or an existing one.
pub fn editor(ctx: &PageContext<'_>, post_id: Option<i64>, values: &PostForm, errors: &FieldErrors) -> Html<String> {
    let (heading, action) = match post_id {
        Some(id) => ("Edit Post", format!("/edit-post/{id}")),
        None => ("New Post", "/new-post".to_string()),
    };
    render(
        ctx,
        heading,
        &Masthead {
            image: None,
            heading,
            subheading: "You're going to make a great blog post!",
            meta: None,
        },
        &column(&format!(
            "{}{RICH_EDITOR}",
            forms::post_form(&action, values, post_id.is_some(), errors)
        )),
    )
}

pub fn error_page(ctx: &PageContext<'_>, status: StatusCode, message: &str) -> Html<String> {
    let heading = format!("{} {}", status.as_u16(), status.canonical_reason().unwrap_or("Error"));
    render(
        ctx,
        &heading,
        &Masthead {
            image: None,
            heading: &heading,
            subheading: message,
            meta: None,
        },
        &column(r#"<p><a href="/">Back to the front page</a></p>"#),
    )
}
