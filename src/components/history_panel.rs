use leptos::prelude::*;
use leptos_icons::Icon;

use crate::history::HistoryEntry;

#[component]
pub fn HistoryPanel(
    entries: ReadSignal<Vec<HistoryEntry>>,
    #[prop(into)] on_select: Callback<HistoryEntry>,
    #[prop(into)] on_download: Callback<HistoryEntry>,
    #[prop(into)] on_delete: Callback<String>,
    #[prop(into)] on_clear: Callback<()>,
) -> impl IntoView {
    view! {
        <div class="p-4 rounded-xl bg-gray-200 dark:bg-teal-800 border border-gray-300 dark:border-teal-600">
            <div class="flex items-center justify-between mb-4">
                <div class="flex items-center gap-2 text-gray-800 dark:text-gray-200">
                    <Icon icon=icondata_bs::BsClockHistory width="16" height="16" />
                    <h2 class="font-semibold text-sm">"Recent History"</h2>
                </div>
                <Show when=move || !entries.get().is_empty()>
                    <button
                        class="text-gray-500 hover:text-salmon-600"
                        title="Clear history"
                        on:click=move |_| on_clear.run(())
                    >
                        <Icon icon=icondata_bs::BsTrash width="16" height="16" />
                    </button>
                </Show>
            </div>

            <div class="space-y-3 max-h-[500px] overflow-y-auto pr-2">
                <For
                    each=move || entries.get()
                    key=|entry| entry.id.clone()
                    children=move |entry| {
                        let select_entry = entry.clone();
                        let download_entry = entry.clone();
                        let entry_id = entry.id.clone();
                        view! {
                            <div
                                class="group p-3 rounded-lg cursor-pointer bg-gray-100 dark:bg-teal-700 hover:bg-gray-50 dark:hover:bg-teal-600 transition-colors"
                                on:click=move |_| on_select.run(select_entry.clone())
                            >
                                <div class="flex items-start justify-between mb-1">
                                    <span class="text-[10px] font-bold uppercase text-seafoam-600 dark:text-mint-400">
                                        {entry.content_type.as_str()}
                                    </span>
                                    <div class="flex gap-1 opacity-0 group-hover:opacity-100">
                                        <button
                                            title="Download"
                                            on:click=move |ev| {
                                                ev.stop_propagation();
                                                on_download.run(download_entry.clone());
                                            }
                                        >
                                            <Icon icon=icondata_bs::BsDownload width="12" height="12" />
                                        </button>
                                        <button
                                            class="text-salmon-600"
                                            title="Delete"
                                            on:click=move |ev| {
                                                ev.stop_propagation();
                                                on_delete.run(entry_id.clone());
                                            }
                                        >
                                            <Icon icon=icondata_bs::BsTrash width="12" height="12" />
                                        </button>
                                    </div>
                                </div>
                                <p class="text-xs italic line-clamp-2 mb-2 text-gray-700 dark:text-gray-300">
                                    {format!("\"{}\"", entry.prompt)}
                                </p>
                                <div class="text-[9px] text-gray-500 dark:text-gray-400">
                                    {entry.created_at.format("%Y-%m-%d %H:%M").to_string()}
                                </div>
                            </div>
                        }
                    }
                />
                <Show when=move || entries.get().is_empty()>
                    <p class="text-center py-8 text-xs text-gray-400">"No history yet"</p>
                </Show>
            </div>
        </div>
    }
}
