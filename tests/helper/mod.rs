pub mod endpoint;
pub mod listener;

#[allow(unused_imports)]
pub use endpoint::*;
#[allow(unused_imports)]
pub use listener::*;
