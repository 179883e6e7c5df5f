mod binding;
mod func;
mod outputs;
mod service;

pub use binding::Lifecycle;
pub(crate) use binding::{Binding, ResolverOutput};
pub use func::*;
pub use outputs::*;
pub use service::*;
