pub mod fields;
pub mod statuses;
pub mod update;
pub mod view;

pub use fields::FieldsArgs;
pub use statuses::StatusesArgs;
pub use update::UpdateArgs;
pub use view::ViewArgs;
