use chrono::NaiveDate;
use inkpost_core::dates::format_post_date;
use inkpost_core::flash;
use inkpost_core::gravatar::GravatarOptions;
use inkpost_core::html::{css_url, escape, text_to_html};

#[test]
fn post_date_uses_long_month_format() {
    let date = NaiveDate::from_ymd_opt(2026, 10, 7).unwrap();
    assert_eq!(format_post_date(date), "October 07, 2026");
}

#[test]
fn escape_covers_markup_and_quotes() {
    assert_eq!(
        escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
        "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
    );
}

#[test]
fn comment_text_keeps_line_breaks_escaped() {
    assert_eq!(
        text_to_html("first <b>line</b>\r\nsecond\n"),
        "first &lt;b&gt;line&lt;/b&gt;<br>\nsecond"
    );
}

#[test]
fn css_url_cannot_close_the_quoted_url() {
    assert_eq!(
        css_url("https://example.com/a.jpg'); color: red; ('"),
        "https://example.com/a.jpg%27%29;%20color:%20red;%20%28%27"
    );
    assert_eq!(css_url(" https://example.com/x.png\n "), "https://example.com/x.png%5Cn");
    assert_eq!(css_url("https://example.com/plain.jpg"), "https://example.com/plain.jpg");
}

#[test]
fn gravatar_defaults_match_plain_http_retro() {
    let opts = GravatarOptions::default();
    let url = opts.avatar_url("MyEmailAddress@example.com ");
    let hash = format!("{:x}", md5::compute("MyEmailAddress@example.com ".as_bytes()));
    assert_eq!(
        url,
        format!("http://www.gravatar.com/avatar/{hash}?s=100&d=retro&r=g")
    );
}

#[test]
fn gravatar_options_change_the_link() {
    let opts = GravatarOptions {
        size: 40,
        default: "https://example.com/a b.png".to_string(),
        force_default: true,
        force_lower: true,
        use_ssl: true,
        ..GravatarOptions::default()
    };
    let url = opts.avatar_url("Someone@Example.com");
    let hash = format!("{:x}", md5::compute("someone@example.com".as_bytes()));
    assert!(url.starts_with(&format!("https://secure.gravatar.com/avatar/{hash}?s=40&d=")));
    assert!(url.contains("https%3A%2F%2Fexample.com%2Fa%20b.png"));
    assert!(url.ends_with("&r=g&f=y"));

    let custom = GravatarOptions {
        base_url: Some("https://avatars.example.org/".to_string()),
        ..GravatarOptions::default()
    };
    assert!(custom
        .avatar_url("a@b.c")
        .starts_with("https://avatars.example.org/avatar/"));
}

#[test]
fn flash_survives_a_cookie_round_trip() {
    let encoded = flash::encode("Invalid password, please try again");
    assert!(encoded.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(
        flash::decode(&encoded).as_deref(),
        Some("Invalid password, please try again")
    );
    assert_eq!(flash::decode("zz"), None);
    assert_eq!(flash::decode(""), None);
}
