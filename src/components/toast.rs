use leptos::prelude::*;

/// Confirmations the output panel can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Copied,
    Downloaded,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::Copied => "Copied to clipboard",
            Notice::Downloaded => "Download started",
        }
    }
}

/// Shows the current notice in the corner; `None` fades it out. The last
/// message is kept while fading so the box never renders empty.
#[component]
pub fn Toast(
    notice: ReadSignal<Option<Notice>>,
    #[prop(into)] on_close: Callback<()>,
) -> impl IntoView {
    let message = Memo::new(move |prev: Option<&&'static str>| {
        notice
            .get()
            .map(|n| n.message())
            .or_else(|| prev.copied())
            .unwrap_or("")
    });

    view! {
        <div class=move || {
            format!(
                "{} fixed bottom-4 right-4 px-4 py-2 rounded-lg shadow-lg text-xs font-bold uppercase bg-gray-100 dark:bg-teal-800 text-teal-600 dark:text-mint-300 transition-opacity duration-300",
                if notice.get().is_some() { "opacity-100" } else { "opacity-0 pointer-events-none" },
            )
        }>
            {message}
            <button
                class="ml-2 text-salmon-600 hover:text-salmon-700"
                on:click=move |_| on_close.run(())
            >
                "×"
            </button>
        </div>
    }
}
