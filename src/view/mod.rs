//! Server-rendered HTML for the profile page and the sign-in page.
//!
//! SYSTEM CONTEXT
//! ==============
//! Route handlers call [`render_profile_page`] / [`render_login_page`] and
//! wrap the string in `Html`. Components are plain Leptos views rendered once
//! per request; no hydration bundle is shipped, and the only interactive
//! control (sign-out) is an HTML form.

pub mod pages;
pub mod profile_card;

use leptos::prelude::*;
use leptos::tachys::view::RenderHtml;

use crate::model::{Identity, ProfileRecord};
use pages::{LoginPage, NOT_AVAILABLE, ProfilePage};

/// Text for the "Signed in as" line.
#[must_use]
pub fn signed_in_label(identity: Option<&Identity>) -> String {
    identity
        .and_then(Identity::display_name)
        .unwrap_or(NOT_AVAILABLE)
        .to_owned()
}

#[must_use]
pub fn render_profile_page(identity: Option<&Identity>, profiles: &[ProfileRecord]) -> String {
    let signed_in_as = signed_in_label(identity);
    let profiles = profiles.to_vec();
    render(move || view! { <ProfilePage signed_in_as=signed_in_as profiles=profiles/> })
}

#[must_use]
pub fn render_login_page(sign_in_enabled: bool) -> String {
    render(move || view! { <LoginPage sign_in_enabled=sign_in_enabled/> })
}

/// Render under a throwaway reactive owner so components have a scope.
fn render<F, V>(build: F) -> String
where
    F: FnOnce() -> V,
    V: RenderHtml,
{
    let owner = Owner::new();
    owner.with(|| build().to_html())
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
