use std::io::{self, BufRead};

use crate::{error, extension::Extension, info, success, warning};

/// Runs the settings flow from a terminal.
///
/// Opens the authorization page, then waits for the user to paste the
/// address the browser was redirected to. A custom-scheme redirect cannot be
/// loaded by a regular browser, but its address stays visible in the
/// location bar (or the browser's error page).
pub fn auth(extension: &mut Extension) {
    if !extension
        .service()
        .borrow()
        .client
        .tokens()
        .uses_user_authorization()
    {
        warning!("A client secret is configured, the app-only flow needs no authorization.");
        return;
    }

    let auth_url = extension.open_settings();

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    info!("After granting access, paste the address you were redirected to:");

    let mut redirect = String::new();
    if let Err(e) = io::stdin().lock().read_line(&mut redirect) {
        error!("Cannot read redirect address. Err: {}", e);
    }
    let redirect = redirect.trim();

    if !extension.is_redirect(redirect) {
        error!("{} is not the authorization callback.", redirect);
    }

    match extension.complete_authorization(redirect) {
        Ok(()) => success!("Authentication successful!"),
        Err(e) => error!("Authentication failed: {}", e),
    }
}
