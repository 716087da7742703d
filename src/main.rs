use leptos::prelude::*;
use mindmap_studio_ui::App;

fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("mounting mindmap studio");

    leptos::mount::mount_to_body(|| view! { <App/> })
}
