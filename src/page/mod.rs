pub mod controller;
pub mod links;
pub mod listener;
pub mod route;
pub mod scope;
pub mod surface;

pub use controller::PageController;
pub use links::{ClickOutcome, LinkClick, NAVIGATION_DELAY};
pub use route::PageRoute;
pub use scope::PageScope;
pub use surface::{ActivityKind, BrowserEvent, EventSurface};
