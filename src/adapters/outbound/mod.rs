mod http_prober;
mod report;

pub use http_prober::HttpProber;
pub use report::{render_json, render_text};
