//! Sidebar listing the encryption methods advertised by the backend.

use leptos::prelude::*;

use crate::state::methods::MethodState;

#[component]
pub fn MethodList(methods: RwSignal<MethodState>) -> impl IntoView {
    view! {
        <nav class="method-list">
            <h2 class="method-list__title">"Encryption"</h2>
            <Show
                when=move || methods.with(|m| !m.methods().is_empty())
                fallback=|| view! { <p class="method-list__empty">"No encryption methods available"</p> }
            >
                <ul class="method-list__items">
                    {move || {
                        methods
                            .with(|m| m.methods().to_vec())
                            .into_iter()
                            .map(|method| {
                                let id = method.id.clone();
                                let selected_id = method.id.clone();
                                view! {
                                    <li>
                                        <button
                                            class="method-list__item"
                                            class:method-list__item--active=move || methods.with(|m| m.is_selected(&selected_id))
                                            on:click=move |_| {
                                                methods.update(|m| {
                                                    m.select(&id);
                                                });
                                            }
                                        >
                                            {method.label}
                                            {method.requires_key.then(|| view! { <span class="method-list__badge">"key"</span> })}
                                        </button>
                                    </li>
                                }
                            })
                            .collect::<Vec<_>>()
                    }}
                </ul>
            </Show>
        </nav>
    }
}
