mod components;

use components::app::App;

fn main() {
    dioxus::logger::initialize_default();
    tracing::info!(api = %components::assistant_client::chat_config().api_base_url, "starting Sara widget");
    dioxus::launch(App);
}
