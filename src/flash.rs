use axum_extra::extract::cookie::{Cookie, CookieJar};

const COOKIE_NAME: &str = "flash";

/// Attach a one-time message to the outgoing response.
pub fn set(jar: CookieJar, message: &str) -> CookieJar {
    let mut cookie = Cookie::new(COOKIE_NAME, message.to_owned());
    cookie.set_path("/");
    cookie.set_http_only(true);
    jar.add(cookie)
}

/// Read the pending message, removing it so it is rendered exactly once.
pub fn take(jar: CookieJar) -> (CookieJar, Option<String>) {
    match jar.get(COOKIE_NAME).map(|c| c.value().to_owned()) {
        Some(message) => {
            let jar = jar.remove(Cookie::build(COOKIE_NAME).path("/"));
            (jar, Some(message))
        }
        None => (jar, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_readable_exactly_once() {
        let jar = set(CookieJar::new(), "Post created successfully.");

        let (jar, message) = take(jar);
        assert_eq!(message.as_deref(), Some("Post created successfully."));

        let (_, message) = take(jar);
        assert_eq!(message, None);
    }

    #[test]
    fn empty_jar_yields_nothing() {
        let (_, message) = take(CookieJar::new());
        assert_eq!(message, None);
    }
}
