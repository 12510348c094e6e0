use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use rand::RngCore;

pub const FLASH_COOKIE: &str = "tinyblog_flash";

/// Minimum key material accepted from config.
const MIN_SECRET_LEN: usize = 64;

/// Build the cookie signing key from the configured secret, or generate a
/// random one (sessions then only last as long as the process).
pub fn signing_key(secret: Option<&str>) -> Key {
    match secret {
        Some(secret) if secret.len() >= MIN_SECRET_LEN => Key::from(secret.as_bytes()),
        Some(_) => {
            tracing::warn!(
                "auth.secret_key is shorter than {} bytes, using a random key",
                MIN_SECRET_LEN
            );
            random_key()
        }
        None => {
            tracing::warn!("No auth.secret_key configured, sessions will not survive a restart");
            random_key()
        }
    }
}

fn random_key() -> Key {
    let mut bytes = [0u8; MIN_SECRET_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    Key::from(&bytes)
}

fn cookie(name: &str, value: String) -> Cookie<'static> {
    Cookie::build((name.to_owned(), value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

/// The user id carried by the session cookie, if it is present and signed
/// by us.
pub fn user_id(jar: &SignedCookieJar, cookie_name: &str) -> Option<i64> {
    jar.get(cookie_name)?.value().parse().ok()
}

/// Replace whatever session the client had with one bound to `user_id`.
pub fn start(jar: SignedCookieJar, cookie_name: &str, user_id: i64) -> SignedCookieJar {
    jar.add(cookie(cookie_name, user_id.to_string()))
}

pub fn end(jar: SignedCookieJar, cookie_name: &str) -> SignedCookieJar {
    jar.remove(cookie(cookie_name, String::new()))
}

/// Queue a message for the next rendered page.
pub fn flash(jar: SignedCookieJar, message: &str) -> SignedCookieJar {
    jar.add(cookie(FLASH_COOKIE, message.to_owned()))
}

/// Pop the pending flash message, if any.
pub fn take_flash(jar: SignedCookieJar) -> (SignedCookieJar, Vec<String>) {
    match jar.get(FLASH_COOKIE) {
        Some(c) => {
            let message = c.value().to_owned();
            (jar.remove(cookie(FLASH_COOKIE, String::new())), vec![message])
        }
        None => (jar, Vec::new()),
    }
}
