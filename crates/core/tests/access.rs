use inkpost_core::domain::{
    comment_access, post_management_access, Access, Role, SessionUser,
};

fn user(id: i64) -> SessionUser {
    SessionUser {
        id,
        email: format!("user{id}@example.com"),
        name: format!("User {id}"),
    }
}

#[test]
fn first_account_is_admin_by_default() {
    assert_eq!(Role::of(1, 1), Role::Admin);
    assert_eq!(Role::of(2, 1), Role::Reader);
    assert!(user(7).is_admin(7));
}

#[test]
fn post_management_requires_admin() {
    assert_eq!(post_management_access(None, 1), Access::NeedsLogin);
    assert_eq!(post_management_access(Some(&user(2)), 1), Access::Forbidden);
    assert_eq!(post_management_access(Some(&user(1)), 1), Access::Allowed);
}

#[test]
fn any_logged_in_user_can_comment() {
    assert_eq!(comment_access(None), Access::NeedsLogin);
    assert_eq!(comment_access(Some(&user(2))), Access::Allowed);
    assert_eq!(comment_access(Some(&user(1))), Access::Allowed);
}
