//! Card and grid components for the profile list.
//!
//! DESIGN
//! ======
//! The grid is CSS-only responsive (`auto-fit` columns), so the server renders
//! the same markup for every viewport. An empty list renders one placeholder
//! card and no profile cards.

use leptos::prelude::*;
use serde_json::{Map, Value};

use crate::model::ProfileRecord;

pub const EMPTY_PLACEHOLDER: &str = "No profiles found";

/// Card heading: the username, or a 1-based positional label when empty.
#[must_use]
pub fn card_title(index: usize, profile: &ProfileRecord) -> String {
    if profile.username.is_empty() {
        format!("Profile {}", index + 1)
    } else {
        profile.username.clone()
    }
}

/// Two-space indented JSON dump of an attribute mapping.
#[must_use]
pub fn pretty_attributes(attributes: &Map<String, Value>) -> String {
    serde_json::to_string_pretty(attributes).unwrap_or_else(|_| "{}".to_owned())
}

/// One profile record.
#[component]
pub fn ProfileCard(index: usize, profile: ProfileRecord) -> impl IntoView {
    let title = card_title(index, &profile);
    let attributes = pretty_attributes(&profile.attributes);

    view! {
        <article class="profile-card">
            <h5 class="profile-card__title">{title}</h5>
            <pre class="profile-card__attributes">{attributes}</pre>
        </article>
    }
}

/// Responsive grid of profile cards, or the empty placeholder.
#[component]
pub fn ProfileGrid(profiles: Vec<ProfileRecord>) -> impl IntoView {
    let cards = if profiles.is_empty() {
        view! { <div class="profile-grid__empty">{EMPTY_PLACEHOLDER}</div> }.into_any()
    } else {
        profiles
            .into_iter()
            .enumerate()
            .map(|(index, profile)| view! { <ProfileCard index=index profile=profile/> })
            .collect_view()
            .into_any()
    };

    view! { <section class="profile-grid">{cards}</section> }
}
