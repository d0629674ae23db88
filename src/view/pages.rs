//! Full-page components: the signed-in profile page and the sign-in page.

use leptos::prelude::*;

use super::profile_card::ProfileGrid;
use crate::model::ProfileRecord;

pub const APP_TITLE: &str = "Simple Auth App";
pub const NOT_AVAILABLE: &str = "Not available";

const STYLES: &str = "
body { margin: 0; font-family: system-ui, sans-serif; color: #1f2328; background: #fafafa; }
.app { padding: 1rem; display: flex; flex-direction: column; gap: 1rem; }
.app__header { display: flex; justify-content: space-between; align-items: center; }
.app__header h3 { margin: 0; }
.app__signout button { padding: 0.5rem 1rem; border: 0; border-radius: 4px; background: #047d95; color: #fff; cursor: pointer; }
.profile-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(220px, 1fr)); gap: 1rem; }
.profile-card, .profile-grid__empty { padding: 1rem; border: 1px solid #d0d7de; border-radius: 6px; background: #fff; }
.profile-card__title { margin: 0; }
.profile-card__attributes { white-space: pre-wrap; margin-top: 8px; }
";

#[component]
fn Shell(children: Children) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <title>{APP_TITLE}</title>
                <style>{STYLES}</style>
            </head>
            <body>
                <main class="app">{children()}</main>
            </body>
        </html>
    }
}

/// Signed-in landing page: header, identity line, profile grid.
#[component]
pub fn ProfilePage(signed_in_as: String, profiles: Vec<ProfileRecord>) -> impl IntoView {
    view! {
        <Shell>
            <header class="app__header">
                <h3>{APP_TITLE}</h3>
                <form class="app__signout" method="post" action="/auth/logout">
                    <button type="submit">"Sign out"</button>
                </form>
            </header>
            <hr/>
            <h4>"Signed in as"</h4>
            <div class="app__identity">{signed_in_as}</div>
            <hr/>
            <h4>"User profiles"</h4>
            <ProfileGrid profiles=profiles/>
        </Shell>
    }
}

/// Shown to signed-out visitors. `sign_in_enabled` is false when the backend
/// outputs carry no hosted-UI section.
#[component]
pub fn LoginPage(sign_in_enabled: bool) -> impl IntoView {
    let action = if sign_in_enabled {
        view! { <a class="app__signin" href="/auth/login">"Sign in"</a> }.into_any()
    } else {
        view! { <p class="app__signin-disabled">"Sign-in is not configured."</p> }.into_any()
    };

    view! {
        <Shell>
            <header class="app__header">
                <h3>{APP_TITLE}</h3>
            </header>
            <hr/>
            {action}
        </Shell>
    }
}
