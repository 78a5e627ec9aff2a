use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(feature = "ssr")] {
        use axum::extract::FromRef;
        use leptos::prelude::LeptosOptions;

        use crate::services::SharedBackend;

        /// Shared by every request. Nothing here is mutated after startup.
        #[derive(FromRef, Clone)]
        pub struct AppState {
            pub leptos_options: LeptosOptions,
            pub backend: SharedBackend,
        }

        impl AppState {
            pub fn new(leptos_options: LeptosOptions, backend: SharedBackend) -> Self {
                Self {
                    leptos_options,
                    backend,
                }
            }
        }
    }
}
