//! Login and registration page.

use maud::{html, Markup};

use crate::components::{Alert, BaseLayout, Form, FormGroup, Input, Label};

/// Render the combined login/register page.
///
/// One form, two submit buttons; the `action` field distinguishes them.
#[must_use]
pub fn render_login_page(error: Option<&str>) -> Markup {
    let form_content = html! {
        (FormGroup::new(
            Label::new("username-input", "Username"),
            html! {
                (Input::text("username")
                    .required()
                    .id("username-input")
                    .autocomplete("username"))
            },
        ))
        (FormGroup::new(
            Label::new("password-input", "Password"),
            html! {
                (Input::password("password")
                    .required()
                    .id("password-input")
                    .autocomplete("current-password"))
            },
        ))
        div class="auth-buttons" {
            button type="submit" name="action" value="login" { "Log In" }
            button type="submit" name="action" value="register" class="secondary" {
                "Register"
            }
        }
    };

    let content = html! {
        div class="auth-container" {
            h1 { "Login" }
            @if let Some(e) = error {
                (Alert::error(e))
            }
            (Form::post("/login", form_content).class("login-form"))
            p class="auth-hint" {
                "New here? Pick a username and password, then hit Register."
            }
        }
    };

    BaseLayout::new("Login", None).render(content)
}
