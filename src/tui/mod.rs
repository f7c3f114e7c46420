pub mod theme;
pub mod command;
pub mod element;
pub mod subscription;
pub mod app;
pub mod renderer;
pub mod resource;
pub mod runtime;
pub mod apps;

pub use theme::{Theme, ThemeVariant};
pub use command::Command;
pub use element::{Element, LayoutConstraint};
pub use subscription::Subscription;
pub use app::App;
pub use renderer::Renderer;
pub use resource::Resource;
pub use runtime::Runtime;
