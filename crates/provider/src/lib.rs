pub mod client;
pub mod endpoints;
pub mod wecom;

pub use client::{ApiData, TushareClient};
pub use wecom::WecomChannel;
