//! Server-rendered HTML pages

use chrono::SecondsFormat;
use html_escape::encode_text;

use crate::models::{City, User};

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        encode_text(title),
        body
    )
}

fn credentials_form(action: &str, submit: &str) -> String {
    format!(
        r#"<form method="post" action="{action}">
<label>Username <input name="username" required></label>
<label>Password <input name="password" type="password" required></label>
<button type="submit">{submit}</button>
</form>"#
    )
}

/// Login form
pub fn login_page() -> String {
    let body = format!(
        "<h1>Log in</h1>\n{}\n<p><a href=\"/register\">Create an account</a></p>",
        credentials_form("/login", "Log in")
    );
    layout("Log in", &body)
}

/// Registration form
pub fn register_page() -> String {
    let body = format!(
        "<h1>Register</h1>\n{}\n<p><a href=\"/login\">Already registered?</a></p>",
        credentials_form("/register", "Register")
    );
    layout("Register", &body)
}

/// The user's city list, in the order given
pub fn index_page(user: &User, cities: &[City]) -> String {
    let rows: String = cities
        .iter()
        .map(|city| {
            let temperature = city
                .temperature
                .map(|t| format!("{t:.1}"))
                .unwrap_or_else(|| "&ndash;".to_string());
            let updated = city
                .updated_at
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
                .unwrap_or_else(|| "never".to_string());

            format!(
                r#"<tr><td>{}</td><td>{:.4}</td><td>{:.4}</td><td>{}</td><td>{}</td><td><form method="post" action="/cities/remove/{}"><button type="submit">Remove</button></form></td></tr>"#,
                encode_text(&city.name),
                city.latitude,
                city.longitude,
                temperature,
                updated,
                city.id
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let body = format!(
        r#"<h1>Cities for {username}</h1>
<form method="post" action="/logout"><button type="submit">Log out</button></form>
<table>
<thead><tr><th>City</th><th>Latitude</th><th>Longitude</th><th>Temperature</th><th>Updated</th><th></th></tr></thead>
<tbody>
{rows}
</tbody>
</table>
<form method="post" action="/cities/update"><button type="submit">Update temperatures</button></form>
<form method="post" action="/cities/reset"><button type="submit">Reset to defaults</button></form>
<h2>Add a city</h2>
<form method="post" action="/cities/add">
<label>Name <input name="name" required></label>
<label>Latitude <input name="latitude" required></label>
<label>Longitude <input name="longitude" required></label>
<button type="submit">Add</button>
</form>"#,
        username = encode_text(&user.username),
    );

    layout("Cities", &body)
}
