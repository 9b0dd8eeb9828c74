//! Connect an icy session and print what the headers reveal.
//!
//! ```sh
//! cargo run --example icy_session -- http://radio.example.com:8000/stream
//! ```

use pmoybrid::{Capability, IcyDriver, Request, Session};
use std::sync::Arc;
use url::Url;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("pmoybrid=debug")
        .init();

    let base = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://radio.example.com:8000/stream".to_string());

    let driver = Arc::new(IcyDriver::new(Url::parse(&base)?));

    // An audio player would feed the real response headers of the stream
    // here; this demo uses a canned set.
    driver.apply_headers([
        ("icy-name", "Radio X"),
        ("ice-genre", "Jazz"),
        ("icy-description", "Late night jazz, all night"),
    ]);

    let session = Session::new(driver);
    let connect = session.execute(Request::connect())?;
    connect.assert_success()?;

    let service = session.bouquet().default_service().clone();
    println!("station : {}", service.display_name());
    println!("genre   : {}", service.genre().unwrap_or("-"));
    println!("stream  : {}", session.stream_uri()?);

    if session.player_capabilities().contains(Capability::Playback) {
        println!("ready for live playback");
    }

    Ok(())
}
