//! Root application component with routing and context providers.

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};

use crate::pages::{home::HomePage, signin::SignInPage};
use crate::state::query_cache::QueryCache;

/// Root application component.
///
/// Provides the shared query cache and sets up client-side routing.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();
    provide_context(RwSignal::new(QueryCache::default()));

    view! {
        <Title text="Finnance"/>

        <Router>
            <Routes fallback=|| "Page not found.".into_view()>
                <Route path=StaticSegment("") view=HomePage/>
                <Route path=(StaticSegment("auth"), StaticSegment("signin")) view=SignInPage/>
            </Routes>
        </Router>
    }
}
