use inkpost_core::forms::{check, CommentForm, LoginForm, PostForm, RegisterForm};

fn post_form() -> PostForm {
    PostForm {
        title: "  The Life of Cactus ".to_string(),
        subtitle: "Who knew that cacti lived such interesting lives.".to_string(),
        img_url: "https://images.example.com/cactus.jpg".to_string(),
        author: Some("   ".to_string()),
        body: "<p>Nori grape silver beet broccoli kombu beet greens.</p>".to_string(),
    }
}

#[test]
fn register_requires_email_password_and_name() {
    let form = RegisterForm {
        email: "not-an-email".to_string(),
        password: String::new(),
        name: "   ".to_string(),
    }
    .normalized();

    let errors = check(&form).unwrap_err();
    assert!(errors.contains_key("email"));
    assert!(errors.contains_key("password"));
    assert!(errors.contains_key("name"));
}

#[test]
fn register_trims_but_keeps_password_as_typed() {
    let form = RegisterForm {
        email: " angela@example.com ".to_string(),
        password: " secret ".to_string(),
        name: " Angela ".to_string(),
    }
    .normalized();

    assert!(check(&form).is_ok());
    assert_eq!(form.email, "angela@example.com");
    assert_eq!(form.name, "Angela");
    assert_eq!(form.password, " secret ");
}

#[test]
fn login_rejects_bad_email() {
    let form = LoginForm {
        email: "nobody".to_string(),
        password: "pw".to_string(),
    };
    let errors = check(&form).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(errors["email"].contains("valid email"));
}

#[test]
fn post_form_normalizes_blank_author_to_none() {
    let form = post_form().normalized();
    assert!(check(&form).is_ok());
    assert_eq!(form.title, "The Life of Cactus");
    assert_eq!(form.author, None);
}

#[test]
fn post_form_checks_lengths_and_url() {
    let mut form = post_form();
    form.title = "x".repeat(251);
    form.img_url = "cactus.jpg".to_string();
    let errors = check(&form.normalized()).unwrap_err();
    assert!(errors.contains_key("title"));
    assert!(errors.contains_key("img_url"));
    assert!(!errors.contains_key("subtitle"));
}

#[test]
fn empty_comment_is_rejected() {
    let form = CommentForm {
        body: " \n ".to_string(),
    }
    .normalized();
    let errors = check(&form).unwrap_err();
    assert_eq!(errors["body"], "Comment cannot be empty");
}

#[test]
fn missing_fields_deserialize_as_empty() {
    let form: LoginForm = serde_json::from_str("{}").unwrap();
    assert!(form.email.is_empty());
    assert!(check(&form).is_err());
}
