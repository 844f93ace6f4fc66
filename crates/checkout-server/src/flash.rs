//! Flash message carried across one redirect in a cookie

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use checkout_core::Flash;

pub const FLASH_COOKIE: &str = "error_details";

/// Attach the flash to the redirect response
pub fn set(jar: CookieJar, flash: &Flash) -> CookieJar {
    // hex keeps newlines and separators cookie-safe
    let cookie = Cookie::build((FLASH_COOKIE, hex::encode(&flash.error_details)))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    jar.add(cookie)
}

/// Read the flash, if any, and clear it so it shows only once
pub fn take(jar: CookieJar) -> (CookieJar, Option<String>) {
    let Some(value) = jar.get(FLASH_COOKIE).map(|c| c.value().to_string()) else {
        return (jar, None);
    };

    let message = hex::decode(value)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok());
    if message.is_none() {
        tracing::debug!("Discarding malformed flash cookie");
    }

    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), message)
}
