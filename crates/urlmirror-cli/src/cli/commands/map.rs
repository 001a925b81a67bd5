//! `urlmirror map` – show where URLs would be stored.

use urlmirror_core::url_model::LocalPath;

pub fn run_map(urls: &[String]) {
    for url in urls {
        println!("{}  {}", LocalPath::from_url(url), url);
    }
}
