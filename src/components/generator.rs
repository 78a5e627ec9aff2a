use chrono::Utc;
use leptos::leptos_dom::helpers::TimeoutHandle;
use leptos::{prelude::*, task::spawn_local};
use leptos_icons::Icon;
use std::time::Duration;

use crate::client::{
    confirm, copy_to_clipboard, download_text, read_chunks, start_generation, FAILURE_MESSAGE,
};
use crate::components::history_panel::HistoryPanel;
use crate::components::toast::{Notice, Toast};
use crate::consumer::consume;
use crate::history::{download_name, HistoryEntry, HistoryStore, LocalStorage, StorageError};
use crate::server_fn::get_generation_mode;
use crate::session::{settle, GenerationEvent, GenerationState, Settled};
use crate::types::{
    ContentType, GenerationMode, GenerationRequest, Length, MAX_PROMPT_CHARS, TONES,
};

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Applies `op` to the history, persists it and republishes the entries.
fn update_history(
    store: StoredValue<HistoryStore<LocalStorage>>,
    set_history: WriteSignal<Vec<HistoryEntry>>,
    op: impl FnOnce(&mut HistoryStore<LocalStorage>) -> Result<(), StorageError>,
) {
    store.update_value(|history_store| {
        if let Err(e) = op(history_store) {
            log::warn!("Failed to persist history: {e}");
        }
        set_history.set(history_store.entries().to_vec());
    });
}

#[component]
pub fn Generator() -> impl IntoView {
    let content_type = RwSignal::new(ContentType::Blog);
    let prompt = RwSignal::new(String::new());
    let tone = RwSignal::new(TONES[0].to_string());
    let length = RwSignal::new(Length::Medium);

    let state = RwSignal::new(GenerationState::Idle);
    let (output, set_output) = signal(String::new());
    // content type of whatever is in the output panel, for downloads
    let output_kind = RwSignal::new(ContentType::Blog);

    let (history, set_history) = signal(Vec::<HistoryEntry>::new());
    let store = StoredValue::new(HistoryStore::empty(LocalStorage));

    let (notice, set_notice) = signal(None::<Notice>);

    let mode = Resource::new(|| (), |_| get_generation_mode());
    let simulated = move || matches!(mode.get(), Some(Ok(GenerationMode::Fallback)));

    // local storage only exists after hydration
    Effect::new(move |_| {
        let loaded = HistoryStore::load(LocalStorage);
        set_history.set(loaded.entries().to_vec());
        store.set_value(loaded);
    });

    let notice_timeout = StoredValue::new(None::<TimeoutHandle>);

    let show_toast = move |raised: Notice| {
        set_notice.set(Some(raised));
        if let Some(handle) = notice_timeout.get_value() {
            handle.clear();
        }
        match set_timeout_with_handle(move || set_notice.set(None), Duration::from_secs(2)) {
            Ok(handle) => notice_timeout.set_value(Some(handle)),
            Err(e) => log::warn!("Failed to schedule toast dismissal: {e:?}"),
        }
    };

    let advance = move |event: GenerationEvent| {
        state.update(|current| match current.transition(event) {
            Ok(next) => *current = next,
            Err(e) => log::warn!("{e}"),
        });
    };

    let submit = move || {
        if !state.get_untracked().can_submit() || prompt.with_untracked(|p| p.trim().is_empty()) {
            return;
        }

        let request = GenerationRequest {
            content_type: content_type.get_untracked(),
            prompt: prompt.get_untracked(),
            tone: tone.get_untracked(),
            length: length.get_untracked(),
        };

        advance(GenerationEvent::Submit);
        set_output.set(String::new());
        output_kind.set(request.content_type);

        spawn_local(async move {
            let reader = match start_generation(&request).await {
                Ok(reader) => reader,
                Err(e) => {
                    log::error!("Generation request failed: {e}");
                    advance(GenerationEvent::Failed);
                    return;
                }
            };
            advance(GenerationEvent::ResponseStarted);

            let result = consume(read_chunks(reader), |text| set_output.set(text.to_string())).await;

            let mut settled = None;
            store.update_value(|history_store| {
                settled = Some(settle(
                    state.get_untracked(),
                    result,
                    &request,
                    history_store,
                    Utc::now(),
                ));
                set_history.set(history_store.entries().to_vec());
            });
            match settled {
                Some(Ok(Settled { state: next, text })) => {
                    set_output.set(text);
                    state.set(next);
                }
                Some(Err(e)) => log::warn!("{e}"),
                None => log::warn!("History store dropped before the stream finished"),
            }
        });
    };

    let copy_output = move || {
        let text = output.get_untracked();
        spawn_local(async move {
            match copy_to_clipboard(&text).await {
                Ok(()) => show_toast(Notice::Copied),
                Err(e) => log::warn!("Copy failed: {e}"),
            }
        });
    };

    let download = move |text: String, file_name: String| match download_text(&text, &file_name) {
        Ok(()) => show_toast(Notice::Downloaded),
        Err(e) => log::warn!("Download failed: {e}"),
    };

    let select_entry = move |entry: HistoryEntry| {
        if state.get_untracked().is_busy() {
            return;
        }
        output_kind.set(entry.content_type);
        set_output.set(entry.text);
    };

    let delete_entry = move |id: String| update_history(store, set_history, |h| h.remove(&id));

    let clear_history = move |_: ()| {
        if confirm("Are you sure you want to clear your history?") {
            update_history(store, set_history, |h| h.clear());
        }
    };

    let generate_disabled =
        move || state.get().is_busy() || prompt.with(|p| p.trim().is_empty());

    view! {
        <div class="w-full max-w-6xl mx-auto p-4 grid grid-cols-1 lg:grid-cols-3 gap-6">
            <div class="lg:col-span-2 space-y-6">
                <div class="p-6 rounded-xl bg-gray-200 dark:bg-teal-800 border border-gray-300 dark:border-teal-600 space-y-5">
                    <div class="flex items-center justify-between">
                        <h2 class="text-lg font-semibold text-gray-800 dark:text-gray-200">
                            "Create Content"
                        </h2>
                        <Transition fallback=|| ()>
                            <Show when=simulated>
                                <span class="text-[10px] font-bold uppercase px-2 py-1 rounded-full bg-mint-100 dark:bg-teal-700 text-teal-700 dark:text-mint-300">
                                    "Simulated AI Engine"
                                </span>
                            </Show>
                        </Transition>
                    </div>

                    <div>
                        <label class="block text-xs font-bold uppercase mb-2 text-gray-600 dark:text-gray-400">
                            "Format"
                        </label>
                        <div class="grid grid-cols-2 md:grid-cols-4 gap-2">
                            {ContentType::ALL
                                .into_iter()
                                .map(|kind| {
                                    view! {
                                        <button
                                            class=move || {
                                                if content_type.get() == kind {
                                                    "p-2 rounded-lg text-sm bg-seafoam-600 text-white"
                                                } else {
                                                    "p-2 rounded-lg text-sm bg-gray-100 dark:bg-teal-700 text-gray-700 dark:text-gray-300 hover:bg-gray-50 dark:hover:bg-teal-600"
                                                }
                                            }
                                            on:click=move |_| content_type.set(kind)
                                        >
                                            {kind.display_name()}
                                        </button>
                                    }
                                })
                                .collect_view()}
                        </div>
                    </div>

                    <div>
                        <label class="block text-xs font-bold uppercase mb-2 text-gray-600 dark:text-gray-400">
                            "Topic"
                        </label>
                        <textarea
                            class="w-full h-32 p-3 rounded-lg resize-none bg-gray-100 dark:bg-teal-700 text-gray-800 dark:text-gray-200 border border-gray-300 dark:border-teal-600 focus:outline-none focus:border-seafoam-500"
                            placeholder="What would you like to write about?"
                            maxlength=MAX_PROMPT_CHARS.to_string()
                            prop:value=move || prompt.get()
                            on:input=move |ev| prompt.set(event_target_value(&ev))
                        ></textarea>
                        <div class="text-right text-[10px] text-gray-500">
                            {move || prompt.with(|p| p.encode_utf16().count().to_string())}
                            {format!("/{MAX_PROMPT_CHARS}")}
                        </div>
                    </div>

                    <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
                        <div>
                            <label class="block text-xs font-bold uppercase mb-2 text-gray-600 dark:text-gray-400">
                                "Tone"
                            </label>
                            <select
                                class="w-full p-2 rounded-lg bg-gray-100 dark:bg-teal-700 text-gray-800 dark:text-gray-200 border border-gray-300 dark:border-teal-600"
                                prop:value=move || tone.get()
                                on:change=move |ev| tone.set(event_target_value(&ev))
                            >
                                {TONES
                                    .into_iter()
                                    .map(|t| view! { <option value=t>{capitalize(t)}</option> })
                                    .collect_view()}
                            </select>
                        </div>
                        <div>
                            <label class="block text-xs font-bold uppercase mb-2 text-gray-600 dark:text-gray-400">
                                "Length"
                            </label>
                            <div class="flex gap-2">
                                {Length::ALL
                                    .into_iter()
                                    .map(|l| {
                                        view! {
                                            <button
                                                class=move || {
                                                    if length.get() == l {
                                                        "flex-1 p-2 rounded-lg text-sm bg-seafoam-600 text-white"
                                                    } else {
                                                        "flex-1 p-2 rounded-lg text-sm bg-gray-100 dark:bg-teal-700 text-gray-700 dark:text-gray-300"
                                                    }
                                                }
                                                on:click=move |_| length.set(l)
                                            >
                                                {capitalize(l.as_str())}
                                            </button>
                                        }
                                    })
                                    .collect_view()}
                            </div>
                        </div>
                    </div>

                    <button
                        class="w-full flex items-center justify-center gap-2 p-3 rounded-lg font-semibold bg-seafoam-600 hover:bg-seafoam-700 text-white disabled:opacity-50 disabled:cursor-not-allowed"
                        disabled=generate_disabled
                        on:click=move |_| submit()
                    >
                        <Icon icon=icondata_bs::BsStars width="16" height="16" />
                        {move || if state.get().is_busy() { "Generating..." } else { "Generate" }}
                    </button>
                </div>

                <Show when=move || state.get() == GenerationState::Failed>
                    <div class="p-3 rounded-lg text-sm bg-salmon-100 text-salmon-700 border border-salmon-300">
                        {FAILURE_MESSAGE}
                    </div>
                </Show>

                <div class="p-6 rounded-xl min-h-[300px] bg-gray-200 dark:bg-teal-800 border border-gray-300 dark:border-teal-600">
                    <div class="flex items-center justify-between mb-4">
                        <h2 class="text-sm font-semibold text-gray-800 dark:text-gray-200">"Output"</h2>
                        <Show when=move || !output.with(String::is_empty) && !state.get().is_busy()>
                            <div class="flex gap-2 text-gray-600 dark:text-gray-300">
                                <button title="Copy" on:click=move |_| copy_output()>
                                    <Icon icon=icondata_bs::BsClipboard width="16" height="16" />
                                </button>
                                <button
                                    title="Download"
                                    on:click=move |_| {
                                        download(
                                            output.get_untracked(),
                                            download_name(output_kind.get_untracked(), Utc::now()),
                                        )
                                    }
                                >
                                    <Icon icon=icondata_bs::BsDownload width="16" height="16" />
                                </button>
                            </div>
                        </Show>
                    </div>
                    <Show
                        when=move || !output.with(String::is_empty) || state.get().is_busy()
                        fallback=|| {
                            view! {
                                <p class="text-center py-16 text-sm text-gray-400">
                                    "Your generated content will appear here"
                                </p>
                            }
                        }
                    >
                        <div class="whitespace-pre-wrap text-sm leading-relaxed text-gray-800 dark:text-gray-200">
                            {move || output.get()}
                            <Show when=move || state.get() == GenerationState::Streaming>
                                <span class="inline-block w-2 h-4 ml-1 align-middle bg-seafoam-500 animate-pulse"></span>
                            </Show>
                        </div>
                    </Show>
                </div>
            </div>

            <HistoryPanel
                entries=history
                on_select=select_entry
                on_download=move |entry: HistoryEntry| download(entry.text.clone(), entry.download_name())
                on_delete=delete_entry
                on_clear=clear_history
            />

            <Toast notice=notice on_close=move |_: ()| set_notice.set(None) />
        </div>
    }
}
