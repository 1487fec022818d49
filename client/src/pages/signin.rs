//! Two-step credentials sign-in page.
//!
//! The page owns the network calls; `state::signin::SignInForm` decides what
//! to call and what the answers mean.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::state::query_cache::QueryCache;
use crate::state::signin::{SignInEffect, SignInForm, SignInRequest, SignInStep};

/// Run sign-in effects in order: cache invalidation first, then navigation.
#[cfg_attr(not(feature = "csr"), allow(dead_code))]
fn apply_effects<N>(effects: Vec<SignInEffect>, cache: RwSignal<QueryCache>, navigate: StoredValue<N, LocalStorage>)
where
    N: Fn(&str, NavigateOptions) + 'static,
{
    for effect in effects {
        match effect {
            SignInEffect::InvalidateQueries => {
                cache.try_update(QueryCache::invalidate_all);
            }
            SignInEffect::Navigate(path) => {
                navigate.try_with_value(|nav| nav(&path, NavigateOptions::default()));
            }
        }
    }
}

/// Send `request` and feed the answer back into `form`.
fn dispatch<N>(
    request: SignInRequest,
    form: RwSignal<SignInForm>,
    cache: RwSignal<QueryCache>,
    navigate: StoredValue<N, LocalStorage>,
) where
    N: Fn(&str, NavigateOptions) + 'static,
{
    #[cfg(feature = "csr")]
    leptos::task::spawn_local(async move {
        match request {
            SignInRequest::CheckUsername(username) => {
                let result = crate::net::api::username_exists(&username).await;
                form.try_update(|f| f.resolve_username_check(result));
            }
            SignInRequest::Login { username, password } => {
                let outcome = crate::net::api::login(&username, &password).await;
                log::info!("sign-in outcome: {outcome:?}");
                let effects = form.try_update(|f| f.resolve_login(outcome)).unwrap_or_default();
                apply_effects(effects, cache, navigate);
            }
        }
    });
    #[cfg(not(feature = "csr"))]
    {
        let _ = (request, form, cache, navigate);
    }
}

#[component]
pub fn SignInPage() -> impl IntoView {
    let form = RwSignal::new(SignInForm::new());
    let cache = expect_context::<RwSignal<QueryCache>>();
    let navigate = StoredValue::new_local(use_navigate());

    let on_submit_username = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if let Some(request) = form.try_update(SignInForm::submit_username).flatten() {
            dispatch(request, form, cache, navigate);
        }
    };

    let on_submit_password = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if let Some(request) = form.try_update(SignInForm::submit_password).flatten() {
            dispatch(request, form, cache, navigate);
        }
    };

    let busy = move || form.with(SignInForm::is_loading);
    let on_password_step = move || form.with(|f| f.step() == SignInStep::CollectingPassword);

    view! {
        <div class="signin-page">
            <div class="signin-card">
                <h1>"Finnance"</h1>
                <Show
                    when=on_password_step
                    fallback=move || {
                        view! {
                            <form class="signin-form" on:submit=on_submit_username>
                                <label class="signin-label" for="username">"Username"</label>
                                <input
                                    id="username"
                                    class="signin-input"
                                    type="text"
                                    autocomplete="username"
                                    prop:value=move || form.with(|f| f.username().to_owned())
                                    on:input=move |ev| form.update(|f| f.set_username(event_target_value(&ev)))
                                    disabled=busy
                                />
                                <Show when=move || form.with(|f| f.username_error().is_some())>
                                    <p class="signin-error">
                                        {move || form.with(|f| f.username_error().unwrap_or_default().to_owned())}
                                    </p>
                                </Show>
                                <button class="signin-button" type="submit" disabled=busy>
                                    "Continue"
                                </button>
                            </form>
                        }
                    }
                >
                    <form class="signin-form" on:submit=on_submit_password>
                        <p class="signin-user">
                            {move || form.with(|f| f.confirmed_username().unwrap_or_default().to_owned())}
                            <button
                                class="signin-link"
                                type="button"
                                disabled=busy
                                on:click=move |_| form.update(SignInForm::change_username)
                            >
                                "Change username"
                            </button>
                        </p>
                        <label class="signin-label" for="password">"Password"</label>
                        <input
                            id="password"
                            class="signin-input"
                            type="password"
                            autocomplete="current-password"
                            prop:value=move || form.with(|f| f.password().to_owned())
                            on:input=move |ev| form.update(|f| f.set_password(event_target_value(&ev)))
                            disabled=busy
                        />
                        <Show when=move || form.with(|f| f.password_error().is_some())>
                            <p class="signin-error">
                                {move || form.with(|f| f.password_error().unwrap_or_default().to_owned())}
                            </p>
                        </Show>
                        <button class="signin-button" type="submit" disabled=busy>
                            "Sign in"
                        </button>
                    </form>
                </Show>
                <div class="signin-divider"></div>
                <a href="/api/auth/signin/github" rel="external" class="signin-button signin-button--github">
                    "Sign in with GitHub"
                </a>
            </div>
        </div>
    }
}
