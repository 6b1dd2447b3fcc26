pub mod method;
pub mod path;

pub use method::IntoMethodFilter;
pub use path::{decode_component, decode_path, normalize_request_path, strip_front_controller};
