mod info;
mod receiver;
mod request;

pub use info::*;
pub use receiver::*;
pub use request::*;
