use crate::config::{Credentials, SiteConfig};
use crate::error::{Error, Result};
use crate::extract;
use crate::fetch::Fetcher;

/// Performs the login handshake on the fetcher's session.
///
/// Fetches the login form, lifts the anti-forgery token out of it and posts
/// the form back with the credentials. The session cookie ends up in the
/// fetcher's cookie store, so every later fetch is authenticated. A missing
/// token means the fetch failed or the site changed its form; either way the
/// run cannot proceed, so this is the one fatal failure of the pipeline.
pub async fn login(fetcher: &Fetcher, site: &SiteConfig, creds: &Credentials) -> Result<()> {
    let login_url = site.login_url()?;

    let (form_url, body) = fetcher
        .get_text(login_url.clone())
        .await
        .map_err(|e| Error::Auth(format!("could not fetch the login page: {e}")))?;

    let token = extract::csrf_token(&body).ok_or_else(|| {
        Error::Auth("no csrfmiddlewaretoken field on the login page".to_string())
    })?;

    let form = [
        ("csrfmiddlewaretoken", token.as_str()),
        ("username", creds.username.as_str()),
        ("password", creds.password.as_str()),
        ("next", "/"),
    ];
    fetcher
        .post_form(login_url, &form_url, &form)
        .await
        .map_err(|e| Error::Auth(format!("login submission failed: {e}")))?;

    log::info!("authenticated as {}", creds.username);
    Ok(())
}
