//! Application root: who is signed in, plus sign-out.

use leptos::prelude::*;
#[cfg(feature = "csr")]
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::net::types::SessionUser;
use crate::state::query_cache::QueryCache;

const SESSION_QUERY: &str = "session";

fn cached_user(cache: &QueryCache) -> Option<SessionUser> {
    cache
        .get(SESSION_QUERY)
        .and_then(|value| serde_json::from_value(value.clone()).ok())
}

#[component]
pub fn HomePage() -> impl IntoView {
    let cache = expect_context::<RwSignal<QueryCache>>();
    let navigate = StoredValue::new_local(use_navigate());
    let user = move || cache.with(cached_user);

    #[cfg(feature = "csr")]
    if cache.with_untracked(|c| c.get(SESSION_QUERY).is_none()) {
        let ticket = cache.with_untracked(|c| c.begin(SESSION_QUERY));
        leptos::task::spawn_local(async move {
            let value = crate::net::api::fetch_session()
                .await
                .and_then(|user| serde_json::to_value(user).ok())
                .unwrap_or(serde_json::Value::Null);
            cache.try_update(|c| c.complete(ticket, value));
        });
    }

    let sign_out_error = RwSignal::new(None::<String>);

    let on_sign_out = move |_| {
        sign_out_error.set(None);
        #[cfg(feature = "csr")]
        leptos::task::spawn_local(async move {
            match crate::net::api::sign_out().await {
                Ok(()) => {
                    cache.try_update(QueryCache::invalidate_all);
                    navigate.try_with_value(|nav| nav("/auth/signin", NavigateOptions::default()));
                }
                Err(e) => {
                    log::warn!("{e}");
                    sign_out_error.try_set(Some(e));
                }
            }
        });
        #[cfg(not(feature = "csr"))]
        {
            let _ = navigate;
        }
    };

    view! {
        <div class="home-page">
            <h1>"Finnance"</h1>
            <Show
                when=move || user().is_some()
                fallback=|| {
                    view! {
                        <p class="home-message">
                            "You are not signed in. "
                            <a href="/auth/signin">"Sign in"</a>
                        </p>
                    }
                }
            >
                <p class="home-message">
                    "Signed in as "
                    <strong>{move || user().map(|u| u.name).unwrap_or_default()}</strong>
                </p>
                <button class="home-button" type="button" on:click=on_sign_out>
                    "Sign out"
                </button>
                <Show when=move || sign_out_error.with(Option::is_some)>
                    <p class="home-error">{move || sign_out_error.get().unwrap_or_default()}</p>
                </Show>
            </Show>
        </div>
    }
}
