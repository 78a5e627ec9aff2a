use leptos::prelude::*;

use crate::types::GenerationMode;

/// Reports whether the server streams from the upstream model or from the
/// local templates.
#[server(GetGenerationMode, "/api")]
pub async fn get_generation_mode() -> Result<GenerationMode, ServerFnError> {
    use crate::state::AppState;

    let state = use_context::<AppState>()
        .ok_or_else(|| ServerFnError::new("application state not provided"))?;
    Ok(state.backend.mode())
}
