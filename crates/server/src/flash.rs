use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use inkpost_core::flash;

pub const FLASH_COOKIE: &str = "flash";

/// Queue a message for the next rendered page.
pub fn push(jar: CookieJar, message: &str) -> CookieJar {
    let cookie = Cookie::build((FLASH_COOKIE, flash::encode(message)))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Pop the pending message, if any, clearing the cookie.
pub fn take(jar: CookieJar) -> (CookieJar, Option<String>) {
    let Some(message) = jar.get(FLASH_COOKIE).map(|c| flash::decode(c.value())) else {
        return (jar, None);
    };
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), message)
}
