mod codec;
mod message;
mod types;

pub use codec::*;
pub use message::*;
pub use types::*;

pub extern crate euclid;
pub extern crate serde;
pub extern crate serde_json;
