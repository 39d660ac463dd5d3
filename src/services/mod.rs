pub mod collaborators;
pub mod droid;
pub mod lead_generator;
pub mod openai_client;
pub mod serper;
#[cfg(test)]
pub(crate) mod testing;

pub use collaborators::*;
pub use droid::*;
pub use lead_generator::*;
pub use openai_client::*;
pub use serper::*;
