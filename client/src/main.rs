use leptos::mount::mount_to;
use std::any::Any;
use std::cell::RefCell;

use landgrid_client::web::App;

thread_local! {
    static APP_MOUNT_HANDLE: RefCell<Option<Box<dyn Any>>> = RefCell::new(None);
}

fn main() {
    console_error_panic_hook::set_once();
    let Some(body) = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.body())
    else {
        return;
    };

    // Held for the page lifetime; dropping it would tear down the grid and feed.
    APP_MOUNT_HANDLE.with(|slot| {
        *slot.borrow_mut() = Some(Box::new(mount_to(body, App)));
    });
}
