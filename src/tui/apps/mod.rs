pub mod custom_properties;

pub use custom_properties::CustomPropertiesApp;
