//! Builders for outbound portal URLs
//!
//! Pure functions constructing the three URLs this application sends browsers
//! to on the portal: login, per-application launch, and logout. The `redirect`
//! argument is expected to be an already-sanitized absolute URL on this
//! application's origin (see [`crate::utils::redirect`]); no validation
//! happens here.

use url::Url;

/// Portal login page with a return redirect
#[must_use]
pub fn login_url(base: &str, redirect: &str) -> String {
    portal_url(base, &["login"], &[("redirect", redirect)])
}

/// Portal launch page for a specific downstream application
#[must_use]
pub fn launch_url(base: &str, app_id: &str, redirect: &str) -> String {
    portal_url(base, &["launch", app_id], &[("redirect", redirect)])
}

/// Portal logout, which lands back on the login page
#[must_use]
pub fn logout_url(base: &str, redirect: &str) -> String {
    portal_url(base, &["login"], &[("redirect", redirect), ("logout", "1")])
}

/// Append path segments and query parameters to the portal base URL
///
/// The base URL is validated at startup (see
/// [`crate::settings::RamsgateSettings::validate`]); if it still fails to
/// parse here the base is returned unchanged rather than panicking in a
/// request path.
fn portal_url(base: &str, segments: &[&str], params: &[(&str, &str)]) -> String {
    let Ok(mut url) = Url::parse(base) else {
        return base.to_string();
    };
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in params {
            pairs.append_pair(name, value);
        }
    }
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://portal.example";

    #[test]
    fn test_login_url() {
        assert_eq!(
            login_url(BASE, "https://app.example/"),
            "https://portal.example/login?redirect=https%3A%2F%2Fapp.example%2F"
        );
    }

    #[test]
    fn test_launch_url() {
        assert_eq!(
            launch_url(BASE, "rams", "https://app.example/dashboard"),
            "https://portal.example/launch/rams?redirect=https%3A%2F%2Fapp.example%2Fdashboard"
        );
    }

    #[test]
    fn test_logout_url_flags_logout() {
        let url = logout_url(BASE, "https://app.example/");
        assert!(url.starts_with("https://portal.example/login?redirect="));
        assert!(url.ends_with("&logout=1"));
    }

    #[test]
    fn test_base_with_trailing_slash() {
        assert_eq!(
            login_url("http://localhost:4000/", "http://localhost:8080/"),
            "http://localhost:4000/login?redirect=http%3A%2F%2Flocalhost%3A8080%2F"
        );
    }

    #[test]
    fn test_redirect_query_is_encoded() {
        let url = login_url(BASE, "https://app.example/x?a=1&b=2");
        // The embedded redirect must survive as a single query parameter.
        assert!(url.contains("redirect=https%3A%2F%2Fapp.example%2Fx%3Fa%3D1%26b%3D2"));
    }
}
