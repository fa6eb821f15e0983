use maud::{Markup, Render, html};

pub fn render_table<const N: usize>(titles: [&'static str; N], items: Vec<[Markup; N]>) -> Markup {
    html! {
        div class="overflow-x-auto" {
            table class="min-w-full bg-gray-800 rounded shadow-md" {
                thead class="bg-gray-700" {
                    tr {
                        @for title in titles {
                            th class="py-2 px-4 text-left font-semibold text-gray-300" {(title)}
                        }
                    }
                }
                tbody {
                    @for row in items {
                        tr {
                            @for col in row {
                                td class="py-2 px-4 border-b border-gray-600 text-gray-200" {(col)}
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn title(s: impl Render) -> Markup {
    html! {
        h1 class="text-2xl font-semibold mb-4" {(s)}
    }
}

pub fn subtitle(s: impl Render) -> Markup {
    html! {
        h2 class="text-xl font-semibold mb-2" {(s)}
    }
}

pub fn stat_card(label: &'static str, value: usize) -> Markup {
    html! {
        div class="bg-gray-800 rounded-lg shadow-md p-4 flex flex-col" {
            p class="text-gray-400 text-sm font-medium" {(label)}
            p class="text-3xl font-bold mt-2" {(value)}
        }
    }
}

pub fn error_text(error: Option<&str>) -> Markup {
    html! {
        @if let Some(error) = error {
            p class="text-red-400 text-sm mt-1" {(error)}
        }
    }
}

pub fn form_element(id: &'static str, label: &'static str, input: Markup, error: Option<&str>) -> Markup {
    html! {
        div class="mb-4" {
            label for=(id) class="block text-sm font-bold mb-2 text-gray-300" {(label)}
            (input)
            (error_text(error))
        }
    }
}

pub fn simple_form_element(
    id: &'static str,
    label: &'static str,
    ty: &'static str,
    value: &str,
    error: Option<&str>,
) -> Markup {
    let border = if error.is_some() {
        "border-red-500"
    } else {
        "border-gray-600"
    };

    form_element(
        id,
        label,
        html! {
            input type=(ty) id=(id) name=(id) value=(value) class={"shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 " (border)} {}
        },
        error,
    )
}
