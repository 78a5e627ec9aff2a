#![recursion_limit = "256"]

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(feature = "ssr")] {
        use axum::{
            body::Body as AxumBody,
            extract::State,
            http::Request,
            middleware,
            response::IntoResponse,
            routing::get,
            Router,
        };
        use contentgen::app::*;
        use contentgen::config::Config;
        use contentgen::handlers::generate_routes;
        use contentgen::middleware::log_requests;
        use contentgen::state::AppState;
        use dotenv::dotenv;
        use env_logger::Env;
        use leptos::prelude::*;
        use leptos_axum::{generate_route_list, handle_server_fns_with_context, LeptosRoutes};
        use std::net::SocketAddr;

        #[tokio::main]
        async fn main() {
            dotenv().ok();
            env_logger::init_from_env(Env::default().default_filter_or("info"));

            let conf = get_configuration(None).expect("failed to read leptos configuration");
            let addr = conf.leptos_options.site_addr;
            let leptos_options = conf.leptos_options;

            let config = Config::from_env();
            let app_state = AppState::new(leptos_options.clone(), config.backend());

            let routes = generate_route_list(App);

            async fn server_fn_handler(
                State(app_state): State<AppState>,
                request: Request<AxumBody>,
            ) -> impl IntoResponse {
                handle_server_fns_with_context(
                    move || {
                        provide_context(app_state.clone());
                    },
                    request,
                )
                .await
            }

            // /api/generate is a static path, so it takes priority over the
            // server fn wildcard
            let app = Router::new()
                .merge(generate_routes())
                .route(
                    "/api/{*fn_name}",
                    get(server_fn_handler).post(server_fn_handler),
                )
                .leptos_routes_with_handler(routes, get(|State(app_state): State<AppState>, request: Request<AxumBody>| async move {
                    let handler = leptos_axum::render_app_to_stream_with_context(
                        move || {
                            provide_context(app_state.clone());
                        },
                        move || shell(leptos_options.clone())
                    );
                    handler(request).await.into_response()
                }))
                .fallback(leptos_axum::file_and_error_handler::<AppState, _>(shell))
                .layer(middleware::from_fn(log_requests))
                .with_state(app_state);

            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .expect("failed to bind listener");
            log::info!("listening on http://{}", &addr);
            axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
                .await
                .expect("server error");
        }
    } else {
        pub fn main() {
            // no client-side main function; see lib.rs for hydration
        }
    }
}
